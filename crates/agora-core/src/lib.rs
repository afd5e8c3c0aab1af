//! # Agora Core
//!
//! The domain layer of Agora, a community discussion platform.
//! Feed ranking, comment threading, community trending and vote bookkeeping
//! live here as pure functions; storage is reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;
pub mod services;
pub mod thread;
pub mod trending;

pub use error::{DomainError, RepoError};
pub use feed::{FeedQuery, SortMode};
pub use thread::{CommentNode, ThreadNode, Threaded, build_forest, build_thread};
