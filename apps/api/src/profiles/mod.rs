// Profiles: reusable source data that resumes link to and project from.

pub mod handlers;
pub mod merge;
pub mod store;

pub use merge::merge_profile_content;
pub use store::ProfileStore;
