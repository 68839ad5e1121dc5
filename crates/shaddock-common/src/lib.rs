//! # shaddock-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the Shaddock workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the resolution engine in
//! `shaddock-compose` builds upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
