pub mod bids;
pub mod jobs;
pub mod messages;
pub mod payments;
pub mod wallet;
