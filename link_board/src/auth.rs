//! Authentication: wire models and the sign-in/sign-up flows.

pub mod flows;
pub mod models;
