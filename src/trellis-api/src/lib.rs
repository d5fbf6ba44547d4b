//! Client for the Trellis platform's GraphQL API ("backboard").
//!
//! Every operation is a POST of `{ query, variables }` to the single
//! GraphQL endpoint; authorized operations add a bearer token. The client
//! implements [`trellis_login::AuthGateway`] so the login flows can run
//! against it.

mod client;
mod error;

pub use client::{ApiClient, Project};
pub use error::ApiError;
