//! HTTP plumbing: wire types and the bearer-authenticated API client.

pub mod api;
pub mod types;
