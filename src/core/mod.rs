//! Core business logic - framework-agnostic category, entry, hours and summary
//! operations. Every function takes the database connection as its first
//! argument and returns the crate's `Result`.

/// Category hierarchy: create, rename, retire, leafs and tree
pub mod category;
/// Per-call deadlines for storage work
pub mod deadline;
/// Cross-user time entry listing filters
pub mod filters;
/// Follow/unfollow subscriptions between users and categories
pub mod follow;
/// Expected working hours per weekday
pub mod hours;
/// Selection of users who logged nothing on a working day
pub mod reminder;
/// Daily and monthly summaries
pub mod summary;
/// Time entry ledger
pub mod time_entry;
/// User registry
pub mod user;
