//! HTTP API module.
//!
//! HTTP server, response types and log broadcasting.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
