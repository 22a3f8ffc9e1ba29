//! # switchyard-std
//!
//! The routing engine for Switchyard.
//!
//! This crate provides:
//! - **Templates**: [`template::ParsedTemplate`] and the pattern compiler in [`pattern`]
//! - **Matching**: [`matching::matches`] and argument binding in [`binding`]
//! - **Route tables**: [`table::RoutingTable`], built once and rebuilt atomically
//! - **Caching**: [`table::SimpleMatchCache`]
//! - **Dispatch**: [`dispatch::DispatchPipeline`] and the request entry point [`engine::Engine`]
//! - **Standard hooks**: Logging, Timeout

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use switchyard_core;

// Modules
pub mod binding;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod engine;
pub mod hooks;
pub mod matching;
pub mod pattern;
pub mod table;
pub mod template;
pub mod testing;
