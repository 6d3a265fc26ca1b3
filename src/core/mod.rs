//! # Core Application Logic
//!
//! The board's business logic. It knows nothing about any specific UI
//! technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Controller (query)   │
//!                    │  • State + Action       │
//!                    │  • update() (reducer)   │
//!                    │  • Fetcher + cache      │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    CLI     │      │    API     │
//!     │  Adapter   │      │ subcommands│      │ transport  │
//!     │ (ratatui)  │      │   (clap)   │      │ (reqwest)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`query`]: `QueryParameters` and the types it is built from
//! - [`controller`]: `QueryStateController`, the filter/sort/page state machine
//! - [`cache`]: keyed, deduplicating result cache
//! - [`fetcher`]: `ListDataFetcher`, parameters in, page out
//! - [`state`]: The `App` struct
//! - [`action`]: The `Action` enum and `update()`

pub mod action;
pub mod cache;
pub mod config;
pub mod controller;
pub mod fetcher;
pub mod query;
pub mod seed;
pub mod session;
pub mod state;
pub mod validation;
