//! Brewhouse Core - Shared types library.
//!
//! This crate provides common types used by the Brewhouse café site:
//! validated email addresses and usernames, and type-safe entity IDs.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Database encode/decode support is gated behind the `postgres`
//! feature so non-database consumers stay lightweight.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
