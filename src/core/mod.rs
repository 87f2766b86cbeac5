//! # Core Panel Logic
//!
//! This module contains the preview panel's state machine.
//! It knows nothing about how the panel is drawn or how the sandbox runs.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Panel (state)        │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI.         │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │  Runtime   │      │   Replay   │      │  Renderer  │
//!     │ (sandbox   │      │   (CLI)    │      │  (host     │
//!     │  wiring)   │      │            │      │   editor)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `Panel` struct, all panel state in one place
//! - [`action`]: The `Action` enum and `update()`: everything that can happen
//! - [`router`]: Applies inbound sandbox events
//! - [`commands`]: User operations (back/forward, console input, clear, ...)
//! - [`navigation`]: Back/forward history
//! - [`log_store`]: The mirrored console
//! - [`decode`]: Console and evaluation payload decoding
//! - [`config`]: Settings and their override hierarchy

pub mod action;
pub mod commands;
pub mod config;
pub mod decode;
pub mod log_store;
pub mod navigation;
pub mod router;
pub mod state;
