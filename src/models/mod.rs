//! Domain models for the shotconvert pipeline.
//!
//! - [`clubs`] - the canonical ShotPattern club identifier set
//! - [`UnitSystem`] - distance/speed units of a run
//! - [`ShotType`] - tee shot vs approach shot
//! - [`UnknownClubPolicy`] - what to do with unmapped club names
//! - [`ShotRecord`] - one normalized shot in the target schema

use serde::{Deserialize, Serialize};

// =============================================================================
// ShotPattern Club Identifiers
// =============================================================================

/// Canonical club identifiers recognized by the ShotPattern app.
///
/// The identifier strings are an external contract - ShotPattern matches them
/// verbatim at import time.
pub mod clubs {
    use once_cell::sync::Lazy;
    use std::collections::HashMap;

    /// Every club identifier ShotPattern accepts.
    pub const ALL: [&str; 64] = [
        // Drivers
        "Dr", "Dr2",
        // Woods
        "2W", "3W", "4W", "5W", "6W", "7W", "8W", "9W", "10W", "11W", "12W",
        "13W", "14W", "15W",
        // Hybrids
        "1Hy", "2Hy", "3Hy", "4Hy", "5Hy", "6Hy", "7Hy", "8Hy", "9Hy", "10Hy",
        "11Hy", "12Hy", "13Hy", "14Hy", "15Hy",
        // Irons
        "1i", "2i", "3i", "4i", "5i", "6i", "7i", "8i", "9i", "10i", "11i",
        // Standard wedges
        "PW", "GW", "SW", "LW",
        // Degree wedges
        "48°", "49°", "50°", "51°", "52°", "53°", "54°", "55°", "56°", "57°",
        "58°", "59°", "60°", "61°", "62°", "63°", "64°",
        // Putter
        "Putter",
    ];

    static LOOKUP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
        ALL.iter().map(|id| (id.to_lowercase(), *id)).collect()
    });

    /// Resolve an identifier to its canonical casing, ignoring case and
    /// surrounding whitespace. Returns `None` for identifiers ShotPattern
    /// does not know.
    pub fn canonical(id: &str) -> Option<&'static str> {
        LOOKUP.get(&id.trim().to_lowercase()).copied()
    }

    /// Whether the identifier is recognized by ShotPattern.
    pub fn is_known(id: &str) -> bool {
        canonical(id).is_some()
    }
}

// =============================================================================
// Unit System
// =============================================================================

/// Unit system of a Garmin export.
///
/// Applies uniformly to all distance fields of a run. The pipeline never
/// converts between units - the configured system tags the output filename so
/// the operator can select matching units in the ShotPattern import dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Meters,
    Yards,
}

impl UnitSystem {
    /// Lowercase label as it appears in config and output filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Meters => "meters",
            UnitSystem::Yards => "yards",
        }
    }

    /// Parse from a config-style label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "meters" | "metres" | "m" => Some(UnitSystem::Meters),
            "yards" | "yds" | "yd" => Some(UnitSystem::Yards),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shot Type
// =============================================================================

/// Whether shots with a club are tee shots or approach shots.
///
/// ShotPattern expects the literal strings `Tee` and `Approach` in the
/// `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotType {
    Tee,
    #[default]
    Approach,
}

impl ShotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotType::Tee => "Tee",
            ShotType::Approach => "Approach",
        }
    }
}

// =============================================================================
// Unknown Club Policy
// =============================================================================

/// What to do with a club name that has no alias entry.
///
/// This is an explicit configuration choice - unmapped names are never
/// silently guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownClubPolicy {
    /// Keep the raw (trimmed) club string in the output.
    PassThrough,
    /// Drop the row with [`crate::error::SkipReason::UnknownClub`].
    Reject,
}

// =============================================================================
// Shot Record (canonical)
// =============================================================================

/// One shot after mapping and normalization, in the target schema.
///
/// Distances are in the run's configured [`UnitSystem`]. `club` holds a
/// canonical ShotPattern identifier, or the raw device string when the
/// unknown-club policy is pass-through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotRecord {
    /// Club identifier.
    pub club: String,
    /// Tee or approach shot.
    pub shot_type: ShotType,
    /// Target distance the shot was aimed at.
    pub target: f64,
    /// Total distance.
    pub total: f64,
    /// Side deviation (negative = left, positive = right).
    pub side: f64,
    /// Carry distance, when the export provides one. Validated but not part
    /// of the ShotPattern import schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_canonical_case_insensitive() {
        assert_eq!(clubs::canonical("dr"), Some("Dr"));
        assert_eq!(clubs::canonical(" PUTTER "), Some("Putter"));
        assert_eq!(clubs::canonical("7w"), Some("7W"));
        assert_eq!(clubs::canonical("56°"), Some("56°"));
        assert_eq!(clubs::canonical("9 iron"), None);
    }

    #[test]
    fn test_club_known() {
        assert!(clubs::is_known("Dr2"));
        assert!(clubs::is_known("11i"));
        assert!(!clubs::is_known("16W"));
        assert!(!clubs::is_known(""));
    }

    #[test]
    fn test_unit_system_labels() {
        assert_eq!(UnitSystem::from_label("yards"), Some(UnitSystem::Yards));
        assert_eq!(UnitSystem::from_label("Meters"), Some(UnitSystem::Meters));
        assert_eq!(UnitSystem::from_label("furlongs"), None);
        assert_eq!(UnitSystem::Yards.as_str(), "yards");
    }

    #[test]
    fn test_unit_system_serde() {
        let unit: UnitSystem = serde_json::from_str("\"meters\"").unwrap();
        assert_eq!(unit, UnitSystem::Meters);
        assert!(serde_json::from_str::<UnitSystem>("\"miles\"").is_err());
    }

    #[test]
    fn test_shot_type_default_and_labels() {
        assert_eq!(ShotType::default(), ShotType::Approach);
        assert_eq!(ShotType::Tee.as_str(), "Tee");
    }

    #[test]
    fn test_policy_serde() {
        let p: UnknownClubPolicy = serde_json::from_str("\"pass_through\"").unwrap();
        assert_eq!(p, UnknownClubPolicy::PassThrough);
        let p: UnknownClubPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(p, UnknownClubPolicy::Reject);
    }
}
