// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events.
//!
//! [`export`] writes the events of a [`RecorderSink`](crate::recorder::RecorderSink)
//! as a JSON array, one object per event, with an `"event"` field naming its
//! type. Useful for diffing plans between runs or feeding them to scripts.

use std::io::{self, Write};

use serde_json::{Value, json};

use timeslice_core::admission::Admission;
use timeslice_core::kind::ResourceKind;
use timeslice_core::table::PortSelector;

use crate::recorder::RecordedEvent;

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let values: Vec<Value> = events.iter().map(to_value).collect();
    serde_json::to_writer_pretty(writer, &values)?;
    Ok(())
}

/// Converts one recorded event to its JSON object.
#[must_use]
pub fn to_value(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::Capacity(e) => json!({
            "event": "capacity",
            "display": e.display.0,
            "role": format!("{:?}", e.role),
            "enabled": e.enabled,
            "kind": e.pool.kind.label(),
            "block": e.pool.block.0,
            "port": port_value(e.pool.port),
            "available": e.available,
            "lent": e.lent,
        }),
        RecordedEvent::Demand(d) => {
            let demand: serde_json::Map<String, Value> = ResourceKind::ALL
                .into_iter()
                .filter(|&k| d.breakdown.demand.get(k) != 0)
                .map(|k| (k.label().to_owned(), json!(d.breakdown.demand.get(k))))
                .collect();
            let lookups: Vec<Value> = d
                .breakdown
                .lookups
                .iter()
                .map(|l| {
                    json!({
                        "kind": l.key.kind.label(),
                        "class": format!("{:?}", l.key.class),
                        "bucket": format!("{:?}", l.key.bucket),
                        "amount": l.amount,
                    })
                })
                .collect();
            json!({
                "event": "demand",
                "source": d.source.to_string(),
                "demand": demand,
                "lookups": lookups,
            })
        }
        RecordedEvent::Admission(e) => {
            let mut value = json!({
                "event": "admission",
                "display": e.display.0,
                "source": e.source.to_string(),
                "unit": e.unit.to_string(),
                "block": e.slot.block.0,
                "port": e.slot.port.0,
                "admitted": e.verdict.is_admitted(),
            });
            if let Admission::Rejected(r) = e.verdict {
                value["rejection"] = json!({
                    "source": r.source.to_string(),
                    "kind": r.kind.label(),
                    "block": r.block.0,
                    "port": port_value(r.port),
                    "needed": r.needed,
                    "available": r.available,
                });
            }
            value
        }
        RecordedEvent::Ordering(o) => {
            let order: Vec<Value> = o
                .order
                .iter()
                .map(|u| {
                    json!({
                        "unit": u.id.to_string(),
                        "block": u.slot.block.0,
                        "port": u.slot.port.0,
                        "assigned": u.is_assigned(),
                    })
                })
                .collect();
            let ports: serde_json::Map<String, Value> = o
                .counters
                .ports()
                .map(|(p, n)| (p.0.to_string(), json!(n)))
                .collect();
            let blocks: serde_json::Map<String, Value> = o
                .counters
                .blocks()
                .map(|(b, n)| (b.0.to_string(), json!(n)))
                .collect();
            json!({
                "event": "ordering",
                "mode": o.mode.label(),
                "ports": ports,
                "blocks": blocks,
                "order": order,
            })
        }
    }
}

fn port_value(port: PortSelector) -> Value {
    match port {
        PortSelector::Any => Value::Null,
        PortSelector::Port(p) => json!(p.0),
    }
}
