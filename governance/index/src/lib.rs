//! Turns xDS snapshots into evaluable governance state.
//!
//! The [`Exchanger`] watches listeners, routes, and clusters over the
//! shared discovery stream; extraction modules convert each snapshot into
//! the core rule types; stores publish the results to request-path
//! readers; the [`AuthValidator`] applies the authorization decision.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod authorization;
mod convert;
mod exchanger;
pub mod routing;
mod store;
mod validator;

pub use self::authorization::AuthRules;
pub use self::exchanger::Exchanger;
pub use self::store::{AuthStore, RouteStore};
pub use self::validator::AuthValidator;
