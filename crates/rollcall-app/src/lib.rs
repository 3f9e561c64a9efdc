//! Presentation-state holders for Rollcall.
//!
//! Each presenter wraps one or two collaborator calls and republishes the
//! outcome as a [`Resource`](rollcall_core::Resource) on a
//! [`Feed`](rollcall_core::Feed). Operations also return their `Result`
//! directly, so a caller that does not render can ignore the feeds.
//!
//! Presenters are cheap to construct; build one per consumer (screen,
//! request) rather than sharing a global instance. The signed-in subject is
//! always passed in as an explicit [`Session`].

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod coursework;
pub mod error;
pub mod library;
pub mod live;
pub mod qr;
pub mod roles;
pub mod session;

pub use error::{Error, Result};
pub use session::Session;

#[cfg(test)]
mod testing;
