pub mod auth;
pub mod client;
pub mod error;
pub mod responses;

pub use auth::BearerToken;
pub use client::GhClient;
pub use error::Error;
