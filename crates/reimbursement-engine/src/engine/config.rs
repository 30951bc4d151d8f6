use super::overrides::{OverrideEntry, OverrideRejection, OverrideTable};
use super::regime::RegimeParams;
use super::rules::{DurationRule, RuleTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Calibrated engine constants, as produced by the offline fitting tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub rules: BTreeMap<u32, DurationRule>,
    #[serde(default)]
    pub regimes: BTreeMap<u32, RegimeParams>,
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
    #[serde(default)]
    pub long_trip: LongTripConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTripConfig {
    pub outlier_receipt_threshold: f64,
}

impl Default for LongTripConfig {
    fn default() -> Self {
        Self {
            outlier_receipt_threshold: 2500.0,
        }
    }
}

impl EngineConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file)).map_err(|err| match err {
            EngineError::Parse { source, .. } => EngineError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EngineError> {
        serde_json::from_reader(reader).map_err(|source| EngineError::Parse { path: None, source })
    }

    /// Validate every table and freeze it into lookup structures.
    pub(crate) fn compile(&self) -> Result<CompiledConfig, EngineError> {
        if let Some(duration) = self
            .rules
            .keys()
            .chain(self.regimes.keys())
            .find(|duration| !RuleTable::covers(**duration))
        {
            return Err(EngineError::UnexpectedDuration(*duration));
        }

        let mut rules = Vec::new();
        let mut regimes = Vec::new();
        for duration in RuleTable::MIN_DURATION..=RuleTable::MAX_DURATION {
            let rule = self
                .rules
                .get(&duration)
                .ok_or(EngineError::MissingRule(duration))?;
            rule.validate()
                .map_err(|reason| EngineError::InvalidRule { duration, reason })?;

            let params = self.regimes.get(&duration).cloned().unwrap_or_default();
            params
                .validate()
                .map_err(|reason| EngineError::InvalidRegime { duration, reason })?;

            rules.push(rule.clone());
            regimes.push(params);
        }

        let threshold = self.long_trip.outlier_receipt_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(EngineError::InvalidThreshold(threshold));
        }

        let overrides = OverrideTable::build(&self.overrides).map_err(|rejection| match rejection {
            OverrideRejection::Invalid(entry) => EngineError::InvalidOverride(entry),
            OverrideRejection::Duplicate(entry) => EngineError::DuplicateOverride(entry),
        })?;

        Ok(CompiledConfig {
            rules: RuleTable::new(rules, regimes),
            overrides,
            outlier_receipt_threshold: threshold,
        })
    }
}

pub(crate) struct CompiledConfig {
    pub(crate) rules: RuleTable,
    pub(crate) overrides: OverrideTable,
    pub(crate) outlier_receipt_threshold: f64,
}

/// Fatal construction failure; the engine never starts with a partial configuration.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed engine configuration{}: {source}", describe(.path))]
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    #[error("malformed override CSV {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("no rule configured for {0}-day trips")]
    MissingRule(u32),
    #[error("rules and regimes only cover 1-7 day trips, found an entry for {0} days")]
    UnexpectedDuration(u32),
    #[error("invalid rule for {duration}-day trips: {reason}")]
    InvalidRule { duration: u32, reason: String },
    #[error("invalid regime parameters for {duration}-day trips: {reason}")]
    InvalidRegime { duration: u32, reason: String },
    #[error("invalid override entry {0:?}")]
    InvalidOverride(OverrideEntry),
    #[error("duplicate override entry {0:?}")]
    DuplicateOverride(OverrideEntry),
    #[error("long-trip outlier receipt threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),
    #[error("failed to load {name} long-trip model from {}: {source}", .path.display())]
    Model {
        name: &'static str,
        path: PathBuf,
        source: super::long_trip::ModelArtifactError,
    },
}

fn describe(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}
