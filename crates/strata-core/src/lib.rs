//! # strata-core
//!
//! Foundation crate for the strata warehouse tooling. Everything here is
//! pure and I/O-free:
//!
//! - **Error Types**: shared error definitions and result alias
//! - **Configuration**: the deployment description loaded from `strata.toml`
//! - **Polling Policy**: bounded, backoff-bearing wait loops for cloud
//!   resources that only expose a pollable status field
//! - **Schema**: DDL for the staging tables, dimensions, and the fact table
//! - **SQL**: the bulk-load and transform statements the ETL sequences run
//!
//! The crates that talk to the outside world (`strata-provision`,
//! `strata-etl`, `strata-cli`) consume these definitions; none of them
//! define SQL or configuration of their own.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod poll;
pub mod schema;
pub mod sql;

pub use config::WarehouseConfig;
pub use error::{Error, Result};
pub use poll::{PollPolicy, PollState};
