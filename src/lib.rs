//! Portfolio backend and progressive gallery engine for a photography
//! studio.
//!
//! The pieces:
//! - [`gallery`]: the catalog data model plus deterministic state machines
//!   for visibility-driven image loading and incremental gallery reveal.
//! - [`contact`]: validated contact submissions, SQLite storage, and a
//!   best-effort email relay with provider fallback.
//! - [`server`] / [`config`]: the axum HTTP surface and its environment
//!   configuration.
//! - [`optimize`]: the offline tool that turns source photographs into the
//!   resolution ladder and placeholders the gallery serves.

pub mod config;
pub mod contact;
pub mod gallery;
pub mod optimize;
pub mod server;
