//! # Spec Factory
//!
//! A harness for spec-driven, AI-assisted code generation.
//!
//! Spec Factory shells out to the Spec-Kit CLI to initialize a project from
//! its seed, keeps the specification documents in a retrieval memory, and
//! assembles prompt context from them. Agent output is checked against
//! typed contracts before it reaches the project tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ seed.json  │──▶│  bootstrap  │──▶│ spec/plan/tasks  │
//! └────────────┘   │ specify CLI │   │   (.speckit/)    │
//!                  └─────────────┘   └────────┬─────────┘
//!                                             │ split + embed
//!                                             ▼
//!   ┌──────────┐   ┌──────────────┐    ┌──────────────┐
//!   │ AGENTS.md│──▶│   context    │◀───│    memory    │
//!   └──────────┘   │   assembly   │    │ (mem/SQLite) │
//!                  └──────┬───────┘    └──────────────┘
//!                         ▼
//!                  ┌──────────────┐    ┌──────────────┐
//!                  │  signatures  │──▶ │  artifacts   │
//!                  │ (agent I/O)  │    │ syntax-checked│
//!                  └──────────────┘    └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`seed`] | Seed loading and artifact writing |
//! | [`bootstrap`] | Spec-Kit initialization |
//! | [`placeholders`] | Template spec, plan and task documents |
//! | [`memory`] | Collections over a document-vector store |
//! | [`sqlite_store`] | Persistent store backend |
//! | [`embedding`] | Embedding provider selection |
//! | [`context`] | Prompt context for a query |
//! | [`artifact`] | Validated agent output records |
//! | [`syntax`] | Syntax checking of generated code |
//! | [`signatures`] | Agent input/output contracts |
//! | [`tasks`] | `tasks.md` checklist parsing |
//! | [`steps`] | External command steps |
//! | [`pipeline`] | Build orchestration |
//!
//! Header splitting, chunk records, the `Embedder` and `Store` traits and
//! context assembly live in the `spec-factory-core` crate.

pub mod artifact;
pub mod bootstrap;
pub mod config;
pub mod context;
pub mod embedding;
pub mod memory;
pub mod pipeline;
pub mod placeholders;
pub mod seed;
pub mod signatures;
pub mod sqlite_store;
pub mod steps;
pub mod syntax;
pub mod tasks;
