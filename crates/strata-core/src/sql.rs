//! Bulk-load and transform statements.
//!
//! [`copy_statements`] parameterizes the staging loads from configuration —
//! values are interpolated into the SQL text, which is acceptable only
//! because the configuration file is operator-trusted. [`insert_statements`]
//! is the fixed transform sequence: dimensions first (users, song, artist,
//! time), then the fact table whose foreign keys they satisfy.
//!
//! Two long-standing behaviors are deliberate and preserved:
//!
//! - The `songplay` insert joins staging events to the catalog by artist
//!   *name* and song *title* string equality. Events whose text does not
//!   exactly match a catalog row are silently dropped by the inner join.
//! - The `not in` subquery on (user, session, start_time) is the only guard
//!   against duplicate fact rows when a load is re-run over overlapping
//!   data.

use crate::config::{AwsConfig, StorageConfig};

/// Builds the staging `copy` statements: events first, then songs.
///
/// The event files need the JSONPaths mapping because their attribute names
/// do not match the staging columns; the song files are regular enough for
/// `'auto'`.
#[must_use]
pub fn copy_statements(storage: &StorageConfig, aws: &AwsConfig, role_arn: &str) -> Vec<String> {
    let region = &aws.region;
    vec![
        format!(
            "copy staging_events from '{events}'\n\
             credentials 'aws_iam_role={role_arn}'\n\
             region '{region}'\n\
             format as json '{jsonpaths}'",
            events = storage.events_uri,
            jsonpaths = storage.events_jsonpaths,
        ),
        format!(
            "copy staging_songs from '{songs}'\n\
             credentials 'aws_iam_role={role_arn}'\n\
             region '{region}'\n\
             format as json 'auto'",
            songs = storage.songs_uri,
        ),
    ]
}

const USERS_INSERT: &str = "\
insert into users (user_id, first_name, last_name, gender, level)
select distinct userId, firstName, lastName, gender, level
from staging_events
where userId is not null";

const SONG_INSERT: &str = "\
insert into song (song_id, title, artist_id, year, duration)
select distinct song_id, title, artist_id, year, duration
from staging_songs
where song_id is not null";

const ARTIST_INSERT: &str = "\
insert into artist (artist_id, name, location, latitude, longitude)
select distinct artist_id, artist_name, artist_location, artist_latitude, artist_longitude
from staging_songs
where artist_id is not null";

// Grouping by ts first guarantees one time row per distinct source
// timestamp; the calendar parts are derived from the epoch-millisecond
// value converted to a date.
const TIME_INSERT: &str = "\
insert into time (start_time, hour, day, week, month, year, weekday)
select start_time,
       date_part(hour, date_time) as hour,
       date_part(day, date_time) as day,
       date_part(week, date_time) as week,
       date_part(month, date_time) as month,
       date_part(year, date_time) as year,
       date_part(weekday, date_time) as weekday
from (select ts as start_time,
             '1970-01-01'::date + ts / 1000 * interval '1 second' as date_time
      from staging_events
      group by ts) as distinct_ts
order by start_time";

const SONGPLAY_INSERT: &str = "\
insert into songplay (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
select timestamp 'epoch' + ts * interval '0.001 seconds' as start_time,
       userId,
       level,
       song.song_id as song_id,
       artist.artist_id as artist_id,
       sessionId,
       staging_events.location as location,
       userAgent
from staging_events
inner join artist on artist.name = staging_events.artist
inner join song on song.title = staging_events.song
where page = 'NextSong'
and userId not in
    (select distinct user_id
     from songplay sp
     where sp.user_id = userId
     and sp.session_id = sessionId
     and sp.start_time = start_time)";

/// The transform sequence, in the only order that satisfies the fact
/// table's foreign keys: users, song, artist, time, then songplay.
#[must_use]
pub fn insert_statements() -> [&'static str; 5] {
    [
        USERS_INSERT,
        SONG_INSERT,
        ARTIST_INSERT,
        TIME_INSERT,
        SONGPLAY_INSERT,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage() -> StorageConfig {
        StorageConfig {
            events_uri: "s3://udacity-dend/log_data".to_string(),
            events_jsonpaths: "s3://udacity-dend/log_json_path.json".to_string(),
            songs_uri: "s3://udacity-dend/song_data".to_string(),
        }
    }

    #[test]
    fn copies_interpolate_config() {
        let statements = copy_statements(
            &test_storage(),
            &AwsConfig::default(),
            "arn:aws:iam::123456789012:role/dwhRole",
        );
        assert_eq!(statements.len(), 2);

        let events = &statements[0];
        assert!(events.starts_with("copy staging_events from 's3://udacity-dend/log_data'"));
        assert!(events.contains("aws_iam_role=arn:aws:iam::123456789012:role/dwhRole"));
        assert!(events.contains("region 'us-west-2'"));
        assert!(events.contains("format as json 's3://udacity-dend/log_json_path.json'"));

        let songs = &statements[1];
        assert!(songs.starts_with("copy staging_songs from 's3://udacity-dend/song_data'"));
        assert!(songs.contains("format as json 'auto'"));
        assert!(!songs.contains("log_json_path"));
    }

    #[test]
    fn transform_order_satisfies_foreign_keys() {
        let statements = insert_statements();
        assert!(statements[0].starts_with("insert into users"));
        assert!(statements[1].starts_with("insert into song"));
        assert!(statements[2].starts_with("insert into artist"));
        assert!(statements[3].starts_with("insert into time"));
        assert!(statements[4].starts_with("insert into songplay"));
    }

    #[test]
    fn dimension_inserts_filter_null_keys_and_duplicates() {
        for (statement, key) in [
            (USERS_INSERT, "userId"),
            (SONG_INSERT, "song_id"),
            (ARTIST_INSERT, "artist_id"),
        ] {
            assert!(statement.contains("select distinct"));
            assert!(statement.contains(&format!("where {key} is not null")));
        }
    }

    #[test]
    fn time_insert_derives_one_row_per_timestamp() {
        assert!(TIME_INSERT.contains("group by ts"));
        assert!(TIME_INSERT.contains("order by start_time"));
        for part in ["hour", "day", "week", "month", "year", "weekday"] {
            assert!(TIME_INSERT.contains(&format!("date_part({part}, date_time)")));
        }
    }

    #[test]
    fn songplay_insert_carries_both_documented_fragilities() {
        // Name/title string-equality joins, not surrogate IDs.
        assert!(SONGPLAY_INSERT.contains("inner join artist on artist.name = staging_events.artist"));
        assert!(SONGPLAY_INSERT.contains("inner join song on song.title = staging_events.song"));
        // Only song-play page views.
        assert!(SONGPLAY_INSERT.contains("where page = 'NextSong'"));
        // The (user, session, start_time) dedup predicate.
        assert!(SONGPLAY_INSERT.contains("sp.user_id = userId"));
        assert!(SONGPLAY_INSERT.contains("sp.session_id = sessionId"));
        assert!(SONGPLAY_INSERT.contains("sp.start_time = start_time"));
    }
}
