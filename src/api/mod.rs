//! Idler API services.
//!
//! Exposed via service accessors on clients:
//! - `Client::idler()` / `BlockingClient::idler()`

pub mod idler;

pub use idler::*;
