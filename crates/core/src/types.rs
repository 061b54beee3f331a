/// Users, jobs, bids, payments and messages are all keyed by UUIDs.
pub type Id = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered identifier.
///
/// v7 ids sort by creation time, which keeps listings and chat history
/// stable when two records share a timestamp.
pub fn new_id() -> Id {
    uuid::Uuid::now_v7()
}
