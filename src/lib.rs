//! Device inventory library - owned devices, their purchase cost, and a
//! currency-converted total.
//!
//! This library exposes the core of the `inv` CLI for use in tests and other
//! front ends.
//!
//! # Modules
//!
//! - `record`: The device record model and its tolerant JSON reader
//! - `store`: The ordered collection, its single-owner handle, and persistence
//! - `currency`: Exchange-rate sources and the single-flight rate lookup
//! - `cost`: Aggregate purchase cost
//! - `config`: Settings file handling
//! - `output`: Output mode abstraction (robot/human)
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod cost;
pub mod currency;
pub mod error;
pub mod logging;
pub mod output;
pub mod record;
pub mod store;
pub mod theme;
