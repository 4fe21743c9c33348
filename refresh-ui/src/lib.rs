//! Core primitives for the RefreshUI layout components.
//!
//! # Overview
//!
//! This crate does not contain components itself. It provides what the
//! layout components in `refresh-components` build on:
//!
//! - [`px`] - pixel units with saturating arithmetic.
//! - [`breakpoint`] - breakpoint tables that map a viewport width to a column
//!   count.
//! - [`viewport`] - a debounced viewport size signal with RAII subscriptions.
//! - [`state`] - shared handles for controller state.
//! - [`logging`] - `tracing` subscriber setup for binaries.
//!
//! # Responsive columns
//!
//! ```
//! use std::time::Instant;
//! use refresh_ui::{
//!     Px, PxSize,
//!     breakpoint::{BreakpointTable, resolve_column_count},
//!     viewport::ViewportSignal,
//! };
//!
//! let table = BreakpointTable::default();
//! let viewport = ViewportSignal::new();
//!
//! // Before the first measurement the width is 0, which selects the base entry.
//! assert_eq!(resolve_column_count(viewport.width(), &table), 1);
//!
//! viewport.report_resize(PxSize::new(Px(1280), Px(800)), Instant::now());
//! viewport.flush();
//! assert_eq!(resolve_column_count(viewport.width(), &table), 3);
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod breakpoint;
pub mod logging;
pub mod px;
pub mod state;
pub mod viewport;

pub use crate::{
    breakpoint::{BreakpointTable, resolve_active_breakpoint, resolve_column_count},
    px::{Px, PxPosition, PxSize},
    state::{State, WeakState},
    viewport::{Subscription, ViewportSignal},
};
