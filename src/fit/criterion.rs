//! Parsing of `cargo criterion --message-format=json` output into ns-per-op measurements.
//!
//! Each stdout line of the criterion runner is one JSON message. Only
//! `benchmark-complete` messages carry an `id`; everything else is skipped.

use crate::{Result, ZkalcError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Operations measured once per call; their size is always 1.
pub const SINGLE_OPERATIONS: &[&str] =
    &["mul_ff", "mul_ec", "add_ff", "add_ec", "invert", "pairing"];

/// One normalized data point: `nanoseconds` per call of `operation` at input `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub operation: String,
    pub size: u64,
    pub nanoseconds: f64,
}

#[derive(Debug, Deserialize)]
struct CriterionMessage {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    mean: Option<Estimate>,
}

#[derive(Debug, Deserialize)]
struct Estimate {
    estimate: f64,
    unit: String,
}

/// Measurements grouped by operation, then by input size (ascending).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    by_operation: BTreeMap<String, BTreeMap<u64, f64>>,
}

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a data point; a repeated (operation, size) pair keeps the latest value.
    pub fn insert(&mut self, operation: impl Into<String>, size: u64, nanoseconds: f64) {
        self.by_operation
            .entry(operation.into())
            .or_default()
            .insert(size, nanoseconds);
    }

    pub fn is_empty(&self) -> bool {
        self.by_operation.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_operation.len()
    }

    /// Points of one operation, keyed by size.
    pub fn operation(&self, operation: &str) -> Option<&BTreeMap<u64, f64>> {
        self.by_operation.get(operation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<u64, f64>)> {
        self.by_operation.iter().map(|(op, pts)| (op.as_str(), pts))
    }

    /// Flatten into records, ordered by operation then size.
    pub fn records(&self) -> Vec<Measurement> {
        self.iter()
            .flat_map(|(operation, points)| {
                points.iter().map(move |(&size, &nanoseconds)| Measurement {
                    operation: operation.to_string(),
                    size,
                    nanoseconds,
                })
            })
            .collect()
    }
}

/// Convert `value` expressed in `unit` to nanoseconds.
pub fn to_nanoseconds(value: f64, unit: &str) -> Result<f64> {
    let scale = match unit {
        "ns" => 1.0,
        "µs" | "us" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        other => return Err(ZkalcError::UnknownUnit(other.to_string())),
    };
    Ok(value * scale)
}

/// Map a criterion benchmark id to `(operation, size)`.
///
/// Returns `Ok(None)` for benchmarks that need no fitting.
pub fn parse_benchmark_id(id: &str) -> std::result::Result<Option<(String, u64)>, String> {
    let parts: Vec<&str> = id.split('/').collect();

    let (operation, size) = match parts[0] {
        "msm" => match parts.as_slice() {
            [_, group, size, ..] => (format!("msm_{}", group), *size),
            _ => return Err(format!("`{}` should look like msm/<group>/<size>", id)),
        },
        // Both `pairing_product/<size>` and `pairing_product/<function>/<size>` occur.
        "pairing_product" => match parts.as_slice() {
            [_, .., size] => ("pairing_product".to_string(), *size),
            _ => return Err(format!("`{}` should look like pairing_product/<size>", id)),
        },
        op if SINGLE_OPERATIONS.contains(&op) => return Ok(Some((op.to_string(), 1))),
        _ => return Ok(None),
    };

    let size = size
        .parse::<u64>()
        .map_err(|_| format!("size `{}` in `{}` is not an unsigned integer", size, id))?;
    Ok(Some((operation, size)))
}

/// Read criterion JSON lines and collect the measurements worth fitting.
pub fn extract_measurements<R: BufRead>(reader: R) -> Result<Measurements> {
    let mut measurements = Measurements::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| ZkalcError::MalformedRecord {
            line: line_no,
            reason: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let message: CriterionMessage =
            serde_json::from_str(&line).map_err(|e| ZkalcError::MalformedRecord {
                line: line_no,
                reason: e.to_string(),
            })?;
        let Some(id) = message.id else {
            continue;
        };

        let parsed = parse_benchmark_id(&id).map_err(|reason| ZkalcError::MalformedRecord {
            line: line_no,
            reason,
        })?;
        let Some((operation, size)) = parsed else {
            continue;
        };

        let mean = message.mean.ok_or_else(|| ZkalcError::MalformedRecord {
            line: line_no,
            reason: format!("`{}` has no mean estimate", id),
        })?;
        let nanoseconds = to_nanoseconds(mean.estimate, &mean.unit)?;
        measurements.insert(operation, size, nanoseconds);
    }

    Ok(measurements)
}
