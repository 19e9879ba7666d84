// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame-planning pass that exercises the engine and its tracing.
//!
//! Configures a primary and an external display, then greedily binds one
//! frame's sources to a 14-unit inventory (8 graphics units and 6 video
//! units over two blocks and two memory ports). Events go to both a
//! [`PrettyPrintSink`](timeslice_debug::pretty::PrettyPrintSink) on stderr
//! and a [`RecorderSink`](timeslice_debug::recorder::RecorderSink), whose
//! recording is written as JSON to `plan.json`.
//!
//! Pass a path to a JSON table document to use it instead of the built-in
//! reference tables.

use std::fs::File;
use std::io::BufWriter;

use timeslice_core::admission::DisplayFrame;
use timeslice_core::buffer::{BufferKey, BufferTable, FormatClass, WidthBucket};
use timeslice_core::capacity::{DisplayDesc, DisplayId};
use timeslice_core::config::EngineConfig;
use timeslice_core::engine::Engine;
use timeslice_core::image::{BitDepth, Compression, Image, ImageRect, PixelFormat, Transform};
use timeslice_core::kind::ResourceKind;
use timeslice_core::ordering::{Bound, CandidateUnit, PhysicalType, UnitCaps, UnitId};
use timeslice_core::source::{LayerId, PlacedSource, SourceKind, UnitSlot};
use timeslice_core::table::{
    BlockId, Capacity, DisplayRole, HwRevision, PortId, ResourceIndex, ResourceTable,
};
use timeslice_core::trace::{
    AdmissionEvent, CapacityEvent, DemandEvent, OrderingEvent, TraceSink, Tracer,
};

use timeslice_debug::pretty::PrettyPrintSink;
use timeslice_debug::recorder::RecorderSink;

const PRIMARY: DisplayId = DisplayId(0);
const EXTERNAL: DisplayId = DisplayId(1);
const WIDTH: i32 = 1080;
const HEIGHT: i32 = 2400;

const GF: PhysicalType = PhysicalType(0);
const VGRF: PhysicalType = PhysicalType(1);

fn main() {
    let (resources, buffers) = match std::env::args().nth(1) {
        Some(path) => timeslice_debug::config::read_tables(&path)
            .unwrap_or_else(|e| panic!("failed to load {path}: {e}")),
        None => (reference_resources(), reference_buffers()),
    };

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::stderr().verbose(true);
    let mut recorder = RecorderSink::new();
    let mut tee = Tee {
        a: &mut pretty,
        b: &mut recorder,
    };
    let mut tracer = Tracer::new(&mut tee);

    // -- topology ----------------------------------------------------------
    let mut engine = Engine::new(EngineConfig::two_block_two_port(), &resources, &buffers);
    engine.configure_displays(
        &[
            DisplayDesc {
                id: PRIMARY,
                role: DisplayRole::Primary,
                enabled: true,
            },
            DisplayDesc {
                id: EXTERNAL,
                role: DisplayRole::External,
                enabled: true,
            },
        ],
        &mut tracer,
    );

    // -- one frame on the primary display ----------------------------------
    let height = u32::try_from(HEIGHT).unwrap_or(u32::MAX);
    let mut frame = DisplayFrame::new(PRIMARY, height);
    let mut units = inventory();
    let mut fallback = Vec::new();

    for (source, image) in frame_sources() {
        let placed = engine.place(source, image, &mut tracer);
        engine.order_units(&mut units, &placed.image, &mut tracer);
        match bind_first_fit(&engine, &mut frame, &mut units, placed, &mut tracer) {
            Some(unit) => println!("{source} -> {unit}"),
            None => fallback.push(source),
        }
    }
    drop(tracer);

    for source in &fallback {
        println!("{source} -> client composition");
    }

    // -- export ------------------------------------------------------------
    let path = "plan.json";
    let file = File::create(path).expect("failed to create plan.json");
    let mut writer = BufWriter::new(file);
    timeslice_debug::json::export(recorder.events(), &mut writer)
        .expect("failed to write plan");

    println!(
        "Wrote {path} ({} events, {} rejections)",
        recorder.events().len(),
        recorder.rejections().count(),
    );
}

/// Tries `units` in their current order and binds `placed` to the first free
/// unit that admits it.
fn bind_first_fit(
    engine: &Engine<'_>,
    frame: &mut DisplayFrame,
    units: &mut [CandidateUnit],
    placed: PlacedSource,
    tracer: &mut Tracer<'_>,
) -> Option<UnitId> {
    let unit = units.iter_mut().find(|unit| {
        !unit.is_assigned() && engine.can_assign(frame, unit, &placed, tracer).is_admitted()
    })?;
    unit.bound = Some(Bound {
        source: placed.source,
        image: placed.image,
    });
    frame.bind(placed, unit.slot);
    Some(unit.id)
}

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_capacity(&mut self, e: &CapacityEvent) {
        self.a.on_capacity(e);
        self.b.on_capacity(e);
    }

    fn on_demand(&mut self, e: &DemandEvent<'_>) {
        self.a.on_demand(e);
        self.b.on_demand(e);
    }

    fn on_admission(&mut self, e: &AdmissionEvent) {
        self.a.on_admission(e);
        self.b.on_admission(e);
    }

    fn on_ordering(&mut self, e: &OrderingEvent<'_>) {
        self.a.on_ordering(e);
        self.b.on_ordering(e);
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// 8 graphics units and 6 video units, alternating blocks, then ports.
fn inventory() -> Vec<CandidateUnit> {
    let graphics = UnitCaps {
        block_compression: true,
        wide_gamut: false,
    };
    let video = UnitCaps {
        block_compression: true,
        wide_gamut: true,
    };
    let place = |i: u8| UnitSlot::new(BlockId(i % 2), PortId((i / 2) % 2));
    let unit = |t: PhysicalType, i: u8, caps: UnitCaps| {
        CandidateUnit::new(UnitId::new(t, u32::from(i)), place(i), caps)
    };
    let gf = (0_u8..8).map(|i| unit(GF, i, graphics));
    let vgrf = (0_u8..6).map(|i| unit(VGRF, i, video));
    gf.chain(vgrf).collect()
}

fn reference_resources() -> ResourceTable {
    let mut rows = Vec::new();
    for block in [BlockId(0), BlockId(1)] {
        for kind in ResourceKind::ALL {
            let (primary, secondary, total) = match kind {
                ResourceKind::Buffer => (2400, 1200, 2400),
                ResourceKind::Scale | ResourceKind::BlockCompression => (4, 2, 4),
                ResourceKind::WideGamut | ResourceKind::Rotation => (1, 1, 1),
                _ => (2, 1, 2),
            };
            for (role, max) in [
                (DisplayRole::Primary, primary),
                (DisplayRole::External, secondary),
                (DisplayRole::Virtual, secondary),
            ] {
                rows.push((
                    ResourceIndex::block_wide(kind, block, role, HwRevision(0)),
                    Capacity::new(max, total),
                ));
            }
        }
    }
    ResourceTable::from_rows(rows).expect("reference rows do not alias")
}

fn reference_buffers() -> BufferTable {
    let mut table = BufferTable::new();
    for (i, bucket) in (0_u32..).zip(WidthBucket::ALL) {
        let step = i + 1;
        for (kind, class, base) in [
            (ResourceKind::Buffer, FormatClass::Rgb(BitDepth::Eight), 100),
            (ResourceKind::Buffer, FormatClass::Rgb(BitDepth::Ten), 125),
            (ResourceKind::Buffer, FormatClass::Yuv(BitDepth::Eight), 75),
            (ResourceKind::Buffer, FormatClass::Yuv(BitDepth::Ten), 95),
            (ResourceKind::BlockCompression, FormatClass::Rgb(BitDepth::Eight), 110),
            (ResourceKind::BlockCompression, FormatClass::Yuv(BitDepth::Eight), 85),
            (ResourceKind::SubsampledCompression, FormatClass::SubsampledLuma, 60),
            (ResourceKind::SubsampledCompression, FormatClass::SubsampledChroma, 30),
            (ResourceKind::Rotation, FormatClass::Luma(BitDepth::Eight), 70),
            (ResourceKind::Rotation, FormatClass::Chroma(BitDepth::Eight), 35),
            (ResourceKind::Rotation, FormatClass::Luma(BitDepth::Ten), 90),
            (ResourceKind::Rotation, FormatClass::Chroma(BitDepth::Ten), 45),
            (ResourceKind::Rotation, FormatClass::SubsampledLuma, 65),
            (ResourceKind::Rotation, FormatClass::SubsampledChroma, 33),
        ] {
            table.insert(BufferKey::new(kind, class, bucket), base * step);
        }
    }
    table.insert_all_widths(ResourceKind::ColorConversion, FormatClass::Yuv(BitDepth::Eight), 2);
    table.insert_all_widths(ResourceKind::ColorConversion, FormatClass::Yuv(BitDepth::Ten), 3);
    table.insert_all_widths(ResourceKind::Scale, FormatClass::Alpha, 12);
    table.insert_all_widths(ResourceKind::Scale, FormatClass::Opaque, 8);
    table
}

/// A typical frame: wallpaper, app window, video, status and navigation bars,
/// and the client composition target.
fn frame_sources() -> Vec<(SourceKind, Image)> {
    let full = ImageRect::new(0, 0, WIDTH, HEIGHT);
    let layer = |id| SourceKind::Layer(LayerId(id));
    vec![
        (layer(0), Image::new(full, full, PixelFormat::RGBX_8888)),
        (
            layer(1),
            Image::new(full, full, PixelFormat::RGBA_8888).with_compression(Compression::Block),
        ),
        (
            layer(2),
            Image::new(
                ImageRect::new(0, 0, 1920, 1080),
                ImageRect::new(0, 600, WIDTH, 608),
                PixelFormat::NV12,
            ),
        ),
        (
            layer(3),
            Image::new(
                ImageRect::new(0, 0, 3840, 2160),
                ImageRect::new(0, 1300, WIDTH, 608),
                PixelFormat::P010,
            )
            .with_compression(Compression::Subsampled)
            .with_wide_gamut(true),
        ),
        (
            layer(4),
            Image::new(
                ImageRect::new(0, 0, 1080, 1920),
                ImageRect::new(0, 0, 1920, 1080),
                PixelFormat::NV12,
            )
            .with_transform(Transform::ROT_90),
        ),
        (
            layer(5),
            Image::new(
                ImageRect::new(0, 0, WIDTH, 96),
                ImageRect::new(0, 0, WIDTH, 96),
                PixelFormat::RGBA_8888,
            ),
        ),
        (
            layer(6),
            Image::new(
                ImageRect::new(0, 0, WIDTH, 144),
                ImageRect::new(0, HEIGHT - 144, WIDTH, 144),
                PixelFormat::RGBA_8888,
            ),
        ),
        (
            SourceKind::ClientTarget,
            Image::new(full, full, PixelFormat::RGBA_8888),
        ),
    ]
}
