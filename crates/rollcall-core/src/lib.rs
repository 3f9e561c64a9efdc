//! Core types and trait definitions for Rollcall.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the classroom domain records, the three external collaborators
//! (identity provider, document store, file store) and the [`Feed`] channel
//! through which presenters publish `Loading | Success | Error` state.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod attendance;
pub mod backend;
pub mod coursework;
pub mod document;
pub mod error;
pub mod feed;

pub use error::{Error, Result};
pub use feed::{Feed, Publisher, Resource};
