//! services/api/src/lib.rs
//!
//! Library crate for the pitch-deck generation API service. The binaries in
//! `src/bin/` and the integration tests both build on top of this.

pub mod adapters;
pub mod config;
pub mod error;
pub mod render;
pub mod web;
