//! Session authentication and capability checks.
//!
//! A caller authenticates once through the demo login, receiving a signed
//! session cookie and an anti-forgery token. Every tool route then declares
//! the [`models::Capability`] it requires and is guarded by
//! [`session::require_capability`].

pub mod demo_auth;
pub mod models;
pub mod session;
