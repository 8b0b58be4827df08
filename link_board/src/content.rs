//! Content records, drafts, and services: posts, comments, groups.

pub mod comments;
pub mod groups;
pub mod models;
pub mod posts;
