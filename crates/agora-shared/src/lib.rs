//! # Agora Shared
//!
//! Wire types shared between the API server and its clients.
//! Nothing here depends on the domain crate, so it can be compiled for a
//! browser front end as well.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, Page};
