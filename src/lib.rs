//! Library crate for book-manager.
//!
//! This crate exposes the building blocks of the TUI:
//! - REST client and wire types (`api`)
//! - Application state, controller and event loop (`app`)
//! - Configuration file and theme (`config`)
//! - Error and result types (`error`)
//! - In-memory search helpers (`search`)
//! - Login token persistence (`session`)
//! - Escaping of server text for the terminal (`text`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `book-manager` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod text;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
