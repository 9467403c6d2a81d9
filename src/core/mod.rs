//! core
//!
//! Core domain types, options and schemas for refscope.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefName, RefSpec, Reference
//! - [`options`] - Repository options (path, URL, credentials)
//! - [`filter`] - Path predicates for change sets
//! - [`changeset`] - Diff results
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing in here performs repository I/O

pub mod changeset;
pub mod config;
pub mod filter;
pub mod options;
pub mod types;
