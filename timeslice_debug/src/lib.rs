// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, JSON export, and table loading for timeslice
//! diagnostics.
//!
//! This crate provides [`TraceSink`](timeslice_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus a loader
//! for resource tables kept as JSON:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording as owned
//!   [`recorder::RecordedEvent`]s.
//! - [`json::export`]: writes a recording as a JSON array.
//! - [`config::load_tables`]: parses a [`ResourceTable`] and a
//!   [`BufferTable`] from a JSON document.
//!
//! [`ResourceTable`]: timeslice_core::table::ResourceTable
//! [`BufferTable`]: timeslice_core::buffer::BufferTable

pub mod config;
pub mod json;
pub mod pretty;
pub mod recorder;
