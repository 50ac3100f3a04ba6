//! Client for the Jenkins Idler service.
//!
//! The idler scales tenant Jenkins instances down when unused. This crate asks
//! it whether a tenant's instance is idle and requests un-idling, with an
//! async ([`Client`]) or blocking ([`BlockingClient`]) flavour chosen by cargo
//! feature.
//!
//! ```no_run
//! # #[cfg(feature = "blocking")]
//! # fn main() -> Result<(), idler_client::Error> {
//! use idler_client::BlockingClient;
//!
//! let client = BlockingClient::new("http://idler:8080")?;
//! let idle = match client.is_idle("acme") {
//!     Ok(idle) => idle,
//!     Err(err) => err.assumed_idle(),
//! };
//! if idle {
//!     client.un_idle("acme")?;
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "blocking"))]
//! # fn main() {}
//! ```

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("Enable at least one of: `async` (default) or `blocking`.");

pub mod api;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

mod util;

#[cfg(feature = "async")]
pub use client::{Client, ClientBuilder};
#[cfg(feature = "blocking")]
pub use client::{BlockingClient, BlockingClientBuilder};
pub use error::*;
pub use types::*;
