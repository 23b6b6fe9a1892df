//! Content translation and republishing pipeline.
//!
//! Reads typed documents from a source collection, machine-translates their
//! fields and body units into a configured set of target languages, re-hosts
//! referenced images in a durable blob store, publishes the copies into
//! per-language destination collections, and tracks the resulting links in a
//! side table. The same workflow is reachable as a batch orchestrator and as
//! on-demand HTTP endpoints.

pub mod config;
pub mod content_store;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod routes;
pub mod services;
pub mod storage;
pub mod translate;
