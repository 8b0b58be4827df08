//! HTTP layer: client construction, request decoration, and the API
//! error taxonomy shared by every service in the crate.

pub mod errors;
pub mod http;
