// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::fmt::Write as _;
use std::io::Write;

use timeslice_core::admission::Admission;
use timeslice_core::kind::ResourceKind;
use timeslice_core::trace::{AdmissionEvent, CapacityEvent, DemandEvent, OrderingEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    verbose: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also print each buffer lookup behind a demand.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_capacity(&mut self, e: &CapacityEvent) {
        let lent = if e.lent { " (lent)" } else { "" };
        let enabled = if e.enabled { "" } else { " disabled" };
        let _ = writeln!(
            self.writer,
            "[capacity] display={} {:?}{enabled} {} block={} port={} available={}{lent}",
            e.display.0, e.role, e.pool.kind, e.pool.block.0, e.pool.port, e.available,
        );
    }

    fn on_demand(&mut self, e: &DemandEvent<'_>) {
        let mut amounts = String::new();
        for kind in ResourceKind::ALL {
            let amount = e.breakdown.demand.get(kind);
            if amount != 0 {
                let _ = write!(amounts, " {kind}={amount}");
            }
        }
        if e.breakdown.demand.is_none() {
            amounts.push_str(" none");
        }
        let _ = writeln!(
            self.writer,
            "[demand] {}{amounts} lookups={} misses={}",
            e.source,
            e.breakdown.lookups.len(),
            e.breakdown.misses(),
        );
        if self.verbose {
            for lookup in &e.breakdown.lookups {
                let amount = lookup
                    .amount
                    .map_or_else(|| "MISSING".to_owned(), |a| a.to_string());
                let _ = writeln!(
                    self.writer,
                    "  [lookup] {} {:?} {:?} -> {amount}",
                    lookup.key.kind, lookup.key.class, lookup.key.bucket,
                );
            }
        }
    }

    fn on_admission(&mut self, e: &AdmissionEvent) {
        let verdict = match e.verdict {
            Admission::Admitted => "ok".to_owned(),
            Admission::Rejected(r) => format!(
                "REJECTED {} block={} port={} needed={} available={} at {}",
                r.kind, r.block.0, r.port, r.needed, r.available, r.source,
            ),
        };
        let _ = writeln!(
            self.writer,
            "[admit] display={} {} -> {} (block={} port={}) {verdict}",
            e.display.0, e.source, e.unit, e.slot.block.0, e.slot.port.0,
        );
    }

    fn on_ordering(&mut self, e: &OrderingEvent<'_>) {
        let ports: Vec<String> = e
            .counters
            .ports()
            .map(|(p, n)| format!("{}:{n}", p.0))
            .collect();
        let order: Vec<String> = e
            .order
            .iter()
            .map(|u| {
                if u.is_assigned() {
                    format!("{}*", u.id)
                } else {
                    u.id.to_string()
                }
            })
            .collect();
        let _ = writeln!(
            self.writer,
            "[order] mode={} ports=[{}] {}",
            e.mode.label(),
            ports.join(" "),
            order.join(" -> "),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeslice_core::admission::Rejection;
    use timeslice_core::buffer::{BufferKey, FormatClass, WidthBucket};
    use timeslice_core::capacity::{DisplayId, PoolKey};
    use timeslice_core::demand::{BufferLookup, Demand, DemandBreakdown};
    use timeslice_core::image::BitDepth;
    use timeslice_core::ordering::{PhysicalType, UnitId};
    use timeslice_core::source::{LayerId, SourceKind, UnitSlot};
    use timeslice_core::table::{BlockId, DisplayRole, PortId, PortSelector};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_capacity() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_capacity(&CapacityEvent {
            display: DisplayId(0),
            role: DisplayRole::Primary,
            enabled: true,
            pool: PoolKey {
                kind: ResourceKind::Buffer,
                block: BlockId(1),
                port: PortSelector::Any,
            },
            available: 1200,
            lent: true,
        });
        let output = output(sink);
        assert!(output.starts_with("[capacity]"), "got: {output}");
        assert!(output.contains("block=1"), "got: {output}");
        assert!(output.contains("available=1200 (lent)"), "got: {output}");
    }

    #[test]
    fn pretty_print_demand_with_lookups() {
        let key = BufferKey::new(
            ResourceKind::Buffer,
            FormatClass::Rgb(BitDepth::Eight),
            WidthBucket::ALL[0],
        );
        let breakdown = DemandBreakdown {
            demand: Demand::only(ResourceKind::Buffer, 400),
            lookups: vec![BufferLookup { key, amount: None }],
        };
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).verbose(true);
        sink.on_demand(&DemandEvent {
            source: SourceKind::Layer(LayerId(3)),
            breakdown: &breakdown,
        });
        let output = output(sink);
        assert!(output.contains("[demand] layer#3"), "got: {output}");
        assert!(output.contains("misses=1"), "got: {output}");
        assert!(output.contains("MISSING"), "got: {output}");
    }

    #[test]
    fn pretty_print_rejection() {
        let slot = UnitSlot::new(BlockId(0), PortId(1));
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_admission(&AdmissionEvent {
            display: DisplayId(0),
            source: SourceKind::ClientTarget,
            unit: UnitId::new(PhysicalType(1), 2),
            slot,
            verdict: Admission::Rejected(Rejection {
                source: SourceKind::Layer(LayerId(0)),
                kind: ResourceKind::Scale,
                block: BlockId(0),
                port: PortSelector::Any,
                needed: 3,
                available: 2,
            }),
        });
        let output = output(sink);
        assert!(output.contains("client-target"), "got: {output}");
        assert!(output.contains("REJECTED"), "got: {output}");
        assert!(output.contains("needed=3 available=2"), "got: {output}");
    }
}
