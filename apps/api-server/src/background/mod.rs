//! Background work that runs alongside the HTTP server.

mod sweeper;

pub use sweeper::spawn_poll_sweeper;
