//! Warehouse table definitions.
//!
//! Two staging tables mirror the raw JSON sources with no constraints and
//! truncate-and-reload semantics. Four dimensions and the `songplay` fact
//! table form the star schema. Creation order is dependency order — staging
//! first, then the dimensions, then the fact table whose foreign keys point
//! into them. Drops all use `if exists` so a reset succeeds on an empty
//! database; the warehouse engine does not enforce referential integrity at
//! drop time, so drop order is not load-bearing.

/// All table names, in reporting order.
pub const TABLES: [&str; 7] = [
    "staging_events",
    "staging_songs",
    "users",
    "song",
    "artist",
    "time",
    "songplay",
];

const STAGING_EVENTS_CREATE: &str = "\
create table if not exists staging_events (
    artist varchar,
    auth varchar,
    firstName varchar,
    gender varchar,
    itemInSession integer,
    lastName varchar,
    length double precision,
    level varchar,
    location varchar,
    method varchar,
    page varchar,
    registration double precision,
    sessionId integer,
    song varchar,
    status integer,
    ts bigint,
    userAgent varchar,
    userId integer
)";

const STAGING_SONGS_CREATE: &str = "\
create table if not exists staging_songs (
    song_id varchar,
    title varchar,
    duration numeric,
    year numeric,
    num_songs integer,
    artist_id varchar,
    artist_latitude numeric,
    artist_longitude numeric,
    artist_location varchar,
    artist_name varchar
)";

const USERS_CREATE: &str = "\
create table if not exists users (
    user_id integer not null primary key sortkey,
    first_name varchar not null,
    last_name varchar not null,
    gender varchar not null,
    level varchar not null
) diststyle all";

const SONG_CREATE: &str = "\
create table if not exists song (
    song_id varchar not null primary key,
    title varchar not null,
    artist_id varchar not null,
    year integer not null,
    duration numeric not null
)";

const ARTIST_CREATE: &str = "\
create table if not exists artist (
    artist_id varchar not null primary key,
    name varchar not null,
    location varchar,
    latitude numeric,
    longitude numeric
) diststyle all";

const TIME_CREATE: &str = "\
create table if not exists time (
    start_time bigint primary key sortkey,
    hour integer not null,
    day integer not null,
    week integer not null,
    month integer not null,
    year integer not null,
    weekday integer not null
) diststyle all";

const SONGPLAY_CREATE: &str = "\
create table if not exists songplay (
    songplay_id integer identity(0,1) primary key,
    start_time timestamp not null references time(start_time) sortkey,
    user_id integer not null references users(user_id),
    level varchar not null,
    song_id varchar not null references song(song_id) distkey,
    artist_id varchar not null references artist(artist_id),
    session_id integer not null,
    location varchar not null,
    user_agent varchar not null
)";

/// DDL for every table, staging first, fact table last.
#[must_use]
pub fn create_table_statements() -> [&'static str; 7] {
    [
        STAGING_EVENTS_CREATE,
        STAGING_SONGS_CREATE,
        USERS_CREATE,
        SONG_CREATE,
        ARTIST_CREATE,
        TIME_CREATE,
        SONGPLAY_CREATE,
    ]
}

/// Unconditional drops for every table.
#[must_use]
pub fn drop_table_statements() -> [&'static str; 7] {
    [
        "drop table if exists staging_events",
        "drop table if exists staging_songs",
        "drop table if exists songplay",
        "drop table if exists users",
        "drop table if exists song",
        "drop table if exists artist",
        "drop table if exists time",
    ]
}
