// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-division admission and ordering for shared display hardware.
//!
//! A display controller has a few hardware blocks, each with a fixed pool of
//! post-processing resources (line buffers, scalers, format converters,
//! rotators, decompressors, wide-gamut units) that its units share by
//! time-slicing along the scan. `timeslice_core` decides how much of each
//! pool a source needs, whether binding a source to a given unit keeps every
//! pool within capacity, and in which order a binder should try the units.
//! It is `no_std` compatible (with `alloc`), deterministic, and never fails
//! at plan time.
//!
//! # Architecture
//!
//! ```text
//!   ResourceTable ──► CapacityState::initialize ──► per-display capacity
//!                       (on topology change)              │
//!                                                         ▼
//!   Image ──► compute_demand ──► Demand ──► AdmissionChecker::check ──► Admission
//!     │        (BufferTable,                    ▲
//!     │         ResourcePolicy)                 │ overlaps()
//!     ▼                                         │
//!   order_units ──► trial order for the binder ─┘
//! ```
//!
//! **[`kind`]**: the closed set of [`ResourceKind`](kind::ResourceKind)s and
//! a fixed-size per-kind map.
//!
//! **[`table`]**: [`ResourceTable`](table::ResourceTable) holds per-display and
//! total capacity keyed by kind, block, port (or any port), display role, and
//! hardware revision. Rejects rows that would alias.
//!
//! **[`buffer`]**: [`BufferTable`](buffer::BufferTable) holds line-buffer amounts
//! keyed by kind, format class, and width bucket.
//!
//! **[`image`]**, **[`source`]**: What a source looks like and what it is
//! (a layer or one of the two composition targets).
//!
//! **[`demand`]**: the amount calculator. **[`policy`]** supplies the
//! non-buffer kinds.
//!
//! **[`overlap`]**: Margin-widened vertical overlap of destination spans.
//!
//! **[`capacity`]**: Per-display available capacity, including the share a
//! secondary display borrows from the primary.
//!
//! **[`admission`]**: the read-only admission check.
//!
//! **[`ordering`]**: Load-balanced, stable ordering of candidate units.
//!
//! **[`engine`]**: [`Engine`](engine::Engine) bundles the above behind one
//! facade.
//!
//! **[`config`]**: Blocks, ports, sharing granularity, margin, alignment.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `serde` (disabled by default): `Serialize`/`Deserialize` for table keys,
//!   images, configuration, and ids.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod admission;
pub mod buffer;
pub mod capacity;
pub mod config;
pub mod demand;
pub mod engine;
pub mod image;
pub mod kind;
pub mod ordering;
pub mod overlap;
pub mod policy;
pub mod source;
pub mod table;
pub mod trace;
