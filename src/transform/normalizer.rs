//! Field normalizer - turns one raw Garmin row into one [`ShotRecord`].
//!
//! All row-level decisions live here: required-column lookup, numeric
//! coercion, club alias resolution and the unknown-club policy. A row that
//! fails any check is dropped whole with a [`SkipReason`]; the pipeline
//! never emits a partially converted record with zero-filled fields.

use crate::config::Config;
use crate::error::SkipReason;
use crate::models::{ShotRecord, UnknownClubPolicy};
use crate::parser::RawRecord;

/// Exact length of one yard in meters.
///
/// Distances are currently passed through untouched - ShotPattern asks the
/// user for the unit system at import time and the output filename carries
/// the tag. This factor is the documented contract should the target schema
/// ever pin a fixed unit.
pub const YARD_IN_METERS: f64 = 0.9144;

/// Normalize one raw record against the run configuration.
///
/// Checks run in column-mapping order: club presence, then the numeric
/// fields, then club resolution. The first failed check decides the
/// [`SkipReason`] for the row.
pub fn normalize(record: &RawRecord, config: &Config) -> Result<ShotRecord, SkipReason> {
    let mapping = &config.column_mapping;

    // An empty club cell carries no value to resolve; treat it like an
    // absent column rather than an unknown club.
    let raw_club = record
        .get(&mapping.club)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SkipReason::MissingField(mapping.club.clone()))?;

    let total = required_numeric(record, &mapping.total)?;
    let side = required_numeric(record, &mapping.side)?;
    let carry = match &mapping.carry {
        Some(header) => optional_numeric(record, header)?,
        None => None,
    };

    let club = match config.resolve_club(raw_club) {
        Some(canonical) => canonical.to_string(),
        None => match config.unknown_club_policy {
            UnknownClubPolicy::PassThrough => raw_club.to_string(),
            UnknownClubPolicy::Reject => {
                return Err(SkipReason::UnknownClub(raw_club.to_string()))
            }
        },
    };

    Ok(ShotRecord {
        shot_type: config.shot_type_for(&club),
        target: config.target_for(&club),
        club,
        total,
        side,
        carry,
    })
}

/// A required numeric cell: absent column -> `MissingField`, anything that
/// does not parse (including an empty cell) -> `UnparseableValue`.
fn required_numeric(record: &RawRecord, header: &str) -> Result<f64, SkipReason> {
    let raw = record
        .get(header)
        .ok_or_else(|| SkipReason::MissingField(header.to_string()))?;
    coerce_f64(raw).ok_or_else(|| SkipReason::UnparseableValue {
        field: header.to_string(),
        value: raw.trim().to_string(),
    })
}

/// An optional numeric cell: absent column or empty cell -> `None`, a
/// non-empty cell that does not parse still fails the row.
fn optional_numeric(record: &RawRecord, header: &str) -> Result<Option<f64>, SkipReason> {
    match record.get(header).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => coerce_f64(raw)
            .map(Some)
            .ok_or_else(|| SkipReason::UnparseableValue {
                field: header.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// Parse a cell as `f64`, retrying a decimal comma as a decimal point for
/// locale-formatted exports ("12,5" -> 12.5). NaN and infinities are
/// rejected - they are never plausible shot data.
fn coerce_f64(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    if s.contains(',') && !s.contains('.') {
        if let Ok(v) = s.replace(',', ".").parse::<f64>() {
            return v.is_finite().then_some(v);
        }
    }
    None
}
