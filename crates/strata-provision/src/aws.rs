//! Shared AWS SDK configuration.

use aws_config::{BehaviorVersion, Region, SdkConfig};

use strata_core::config::AwsConfig;

/// Loads the SDK configuration for the deployment's region.
///
/// Credentials come from the SDK's default provider chain; the optional
/// endpoint override exists for localstack-style test deployments.
pub async fn sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));
    if let Some(endpoint) = &aws.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}
