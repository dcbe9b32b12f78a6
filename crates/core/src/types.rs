/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Queue ranks are 1-based PostgreSQL INTEGER values.
pub type Rank = i32;
