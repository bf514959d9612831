//! # Spec Factory Core
//!
//! Shared logic for Spec Factory: markdown header chunking, chunk records,
//! the store abstraction, the embedding trait, and prompt context assembly.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or subprocess
//! handling. Everything here is a pure function or an in-memory structure;
//! the `spec-factory` app crate supplies the persistent store, network
//! embedding providers, and the build pipeline.

pub mod chunk;
pub mod context;
pub mod embedding;
pub mod models;
pub mod store;
