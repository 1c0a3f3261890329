//! Operations over the session and the API.
//!
//! `session` owns the login lifecycle. `portfolio` loads a public portfolio
//! page into its display state.

pub mod portfolio;
pub mod session;
