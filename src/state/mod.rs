//! Client-side state containers.
//!
//! DESIGN
//! ======
//! `session` holds who is logged in and is shared between the session
//! manager, the API client and any observer. `portfolio` is plain display
//! state for a public portfolio page, driven through a reducer.

pub mod portfolio;
pub mod session;
