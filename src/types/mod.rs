//! Shared request/response types.

pub mod idler;
pub mod namespace;

pub use idler::*;
pub use namespace::*;
