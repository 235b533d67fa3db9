//! Configuration store - loads and validates the `config.json` artifact.
//!
//! The artifact is produced by `shotconvert setup` (or edited by hand) and
//! adapts whatever column names and club names a particular Garmin
//! firmware/app version exports to the fixed ShotPattern schema:
//!
//! ```json
//! {
//!   "unit_system": "meters",
//!   "column_mapping": { "club": "Club Type", "total": "Total Distance", "side": "Offline" },
//!   "club_aliases": { "Driver": "Dr", "7 Iron": "7i" },
//!   "unknown_club_policy": "reject",
//!   "target_distances": { "Dr": 220, "7i": 150 },
//!   "shot_types": { "Dr": "Tee" },
//!   "skip_units_row": true
//! }
//! ```
//!
//! A `Config` is loaded once per run and read-only afterwards; every pipeline
//! stage receives it by reference.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::models::{clubs, ShotType, UnitSystem, UnknownClubPolicy};

/// Default location of the configuration artifact.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Default directory watched for Garmin exports.
pub const DEFAULT_INPUT_DIR: &str = "data/garmin";

/// Default directory for ShotPattern output files.
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Target distance used for clubs without a configured one.
pub const DEFAULT_TARGET_DISTANCE: f64 = 150.0;

/// Which Garmin column feeds each canonical field.
///
/// One field per canonical name, so a duplicate target mapping cannot be
/// expressed. `carry` is optional - most ShotPattern users only track total
/// and side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column holding the club name.
    pub club: String,
    /// Column holding the total distance.
    pub total: String,
    /// Column holding the side deviation.
    pub side: String,
    /// Column holding the carry distance, if tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry: Option<String>,
}

/// The validated, immutable configuration of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Unit system of the Garmin export (tag-only, never converted).
    pub unit_system: UnitSystem,
    /// Canonical field -> Garmin column name.
    pub column_mapping: ColumnMapping,
    /// Raw Garmin club name -> canonical ShotPattern identifier.
    pub club_aliases: HashMap<String, String>,
    /// Policy for club names with no alias entry.
    pub unknown_club_policy: UnknownClubPolicy,
    /// Default target distance per canonical club.
    #[serde(default)]
    pub target_distances: HashMap<String, f64>,
    /// Shot type per canonical club.
    #[serde(default)]
    pub shot_types: HashMap<String, ShotType>,
    /// Garmin exports carry a units row directly under the header; drop it.
    #[serde(default = "default_skip_units_row")]
    pub skip_units_row: bool,

    /// Normalized alias lookup (trimmed, lowercased key -> canonical id),
    /// built once at load time.
    #[serde(skip)]
    alias_lookup: HashMap<String, String>,
}

fn default_skip_units_row() -> bool {
    true
}

impl Config {
    /// Load and validate the configuration artifact.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a configuration from its JSON text.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let mut config: Config = serde_json::from_str(json)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        config.build_alias_lookup();
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Semantic validation beyond what serde enforces.
    fn validate(&self) -> ConfigResult<()> {
        let mut problems = Vec::new();

        for (name, value) in [
            ("club", &self.column_mapping.club),
            ("total", &self.column_mapping.total),
            ("side", &self.column_mapping.side),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("column_mapping.{name} is empty"));
            }
        }
        if let Some(carry) = &self.column_mapping.carry {
            if carry.trim().is_empty() {
                problems.push("column_mapping.carry is empty".to_string());
            }
        }

        for (raw, target) in &self.club_aliases {
            if !clubs::is_known(target) {
                problems.push(format!(
                    "club_aliases: '{raw}' maps to unknown ShotPattern club '{target}'"
                ));
            }
        }

        for (club, distance) in &self.target_distances {
            if !clubs::is_known(club) {
                problems.push(format!("target_distances: unknown club '{club}'"));
            }
            if !distance.is_finite() || *distance < 0.0 {
                problems.push(format!(
                    "target_distances: '{club}' has invalid distance {distance}"
                ));
            }
        }

        for club in self.shot_types.keys() {
            if !clubs::is_known(club) {
                problems.push(format!("shot_types: unknown club '{club}'"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    fn build_alias_lookup(&mut self) {
        self.alias_lookup = self
            .club_aliases
            .iter()
            .map(|(raw, target)| {
                // validate() guarantees the target is known
                let canonical = match clubs::canonical(target) {
                    Some(c) => c.to_string(),
                    None => target.clone(),
                };
                (raw.trim().to_lowercase(), canonical)
            })
            .collect();
    }

    /// Resolve a raw device club name to its canonical identifier.
    /// Lookup is whitespace-trimmed and case-insensitive.
    pub fn resolve_club(&self, raw: &str) -> Option<&str> {
        self.alias_lookup
            .get(&raw.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Target distance for a canonical club, falling back to
    /// [`DEFAULT_TARGET_DISTANCE`].
    pub fn target_for(&self, club: &str) -> f64 {
        self.target_distances
            .get(club)
            .copied()
            .or_else(|| {
                self.target_distances
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(club))
                    .map(|(_, v)| *v)
            })
            .unwrap_or(DEFAULT_TARGET_DISTANCE)
    }

    /// Shot type for a canonical club, defaulting to approach.
    pub fn shot_type_for(&self, club: &str) -> ShotType {
        self.shot_types
            .get(club)
            .copied()
            .or_else(|| {
                self.shot_types
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(club))
                    .map(|(_, v)| *v)
            })
            .unwrap_or_default()
    }
}

/// Build a starter configuration from a sample export.
///
/// Used by `shotconvert setup`: the first three detected columns become the
/// club/total/side mapping (the usual Garmin layout) and every club name
/// that already matches a ShotPattern identifier is pre-aliased. Anything
/// else is left for the user to edit.
pub fn scaffold(
    headers: &[String],
    club_names: &[String],
    unit_system: UnitSystem,
) -> Config {
    let get = |i: usize| headers.get(i).cloned().unwrap_or_default();

    let mut club_aliases = HashMap::new();
    let mut target_distances = HashMap::new();
    let mut shot_types = HashMap::new();
    for name in club_names {
        if let Some(canonical) = clubs::canonical(name) {
            club_aliases.insert(name.clone(), canonical.to_string());
            target_distances.insert(canonical.to_string(), DEFAULT_TARGET_DISTANCE);
            shot_types.insert(canonical.to_string(), ShotType::Approach);
        }
    }

    let mut config = Config {
        unit_system,
        column_mapping: ColumnMapping {
            club: get(0),
            total: get(1),
            side: get(2),
            carry: None,
        },
        club_aliases,
        unknown_club_policy: UnknownClubPolicy::Reject,
        target_distances,
        shot_types,
        skip_units_row: true,
        alias_lookup: HashMap::new(),
    };
    config.build_alias_lookup();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> &'static str {
        r#"{
            "unit_system": "yards",
            "column_mapping": { "club": "Club Type", "total": "Total Distance", "side": "Offline" },
            "club_aliases": { "Driver": "Dr", "7 Iron": "7i" },
            "unknown_club_policy": "reject",
            "target_distances": { "Dr": 230, "7i": 155 },
            "shot_types": { "Dr": "Tee" }
        }"#
    }

    #[test]
    fn test_load_missing() {
        let err = Config::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("setup"));
    }

    #[test]
    fn test_parse_valid() {
        let config = Config::from_json(valid_json()).unwrap();
        assert_eq!(config.unit_system, UnitSystem::Yards);
        assert_eq!(config.column_mapping.club, "Club Type");
        assert!(config.skip_units_row);
        assert_eq!(config.unknown_club_policy, UnknownClubPolicy::Reject);
    }

    #[test]
    fn test_bad_unit_system_rejected() {
        let json = valid_json().replace("yards", "miles");
        let err = Config::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_policy_rejected() {
        let json = valid_json().replace("reject", "guess");
        assert!(matches!(
            Config::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_alias_target_rejected() {
        let json = valid_json().replace("\"Dr\"", "\"16W\"");
        let err = Config::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("16W"));
    }

    #[test]
    fn test_empty_column_mapping_rejected() {
        let json = valid_json().replace("Total Distance", "  ");
        let err = Config::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("column_mapping.total"));
    }

    #[test]
    fn test_negative_target_rejected() {
        let json = valid_json().replace("230", "-5");
        assert!(matches!(
            Config::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_resolve_club_trim_and_case() {
        let config = Config::from_json(valid_json()).unwrap();
        assert_eq!(config.resolve_club("Driver"), Some("Dr"));
        assert_eq!(config.resolve_club(" driver "), Some("Dr"));
        assert_eq!(config.resolve_club("DRIVER"), Some("Dr"));
        assert_eq!(config.resolve_club("3 Wood"), None);
    }

    #[test]
    fn test_alias_target_normalized() {
        // target written lowercase in the artifact still resolves canonically
        let json = valid_json().replace("\"7i\"", "\"7I\"");
        // "7I" is not the canonical casing but is a known id
        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.resolve_club("7 Iron"), Some("7i"));
    }

    #[test]
    fn test_per_club_defaults() {
        let config = Config::from_json(valid_json()).unwrap();
        assert_eq!(config.target_for("Dr"), 230.0);
        assert_eq!(config.target_for("SW"), DEFAULT_TARGET_DISTANCE);
        assert_eq!(config.shot_type_for("Dr"), ShotType::Tee);
        assert_eq!(config.shot_type_for("7i"), ShotType::Approach);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config::from_json(valid_json()).unwrap();
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.unit_system, config.unit_system);
        assert_eq!(reloaded.resolve_club("driver"), Some("Dr"));
    }

    #[test]
    fn test_scaffold_from_sample() {
        let headers: Vec<String> = ["Club Type", "Total Distance", "Offline"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let clubs: Vec<String> = ["Dr", "9 Wood", "pw"].iter().map(|s| s.to_string()).collect();

        let config = scaffold(&headers, &clubs, UnitSystem::Meters);
        assert_eq!(config.column_mapping.total, "Total Distance");
        // known identifiers pre-aliased, canonical casing
        assert_eq!(config.resolve_club("Dr"), Some("Dr"));
        assert_eq!(config.resolve_club("PW"), Some("PW"));
        // unknown names left unmapped
        assert_eq!(config.resolve_club("9 Wood"), None);
        assert_eq!(config.unknown_club_policy, UnknownClubPolicy::Reject);
    }
}
