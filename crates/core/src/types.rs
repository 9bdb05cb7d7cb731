/// All entity identifiers are 64-bit integers allocated with a
/// monotonic max+1 policy per collection.
pub type EntityId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
