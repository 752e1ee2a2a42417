//! An xDS client that consumes service-governance configuration over a
//! single aggregated discovery (ADS) stream.
//!
//! [`AdsChannel`] owns the stream and its reconnect loop; an
//! [`XdsProtocol`] gives typed access to one resource type, caching the
//! latest snapshot and fanning responses out to subscribers.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cache;
mod channel;
mod config;
mod error;
pub mod proto;
mod protocol;

pub use self::cache::ResourceCache;
pub use self::channel::{AdsChannel, ConnectionState};
pub use self::config::XdsConfig;
pub use self::error::XdsError;
pub use self::protocol::{Subscription, XdsProtocol, XdsResource};
