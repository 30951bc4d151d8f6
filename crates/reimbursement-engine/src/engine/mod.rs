//! Reimbursement decision engine.
//!
//! `calculate` consults the curated overrides first, then the per-duration rule
//! table for 1-7 day trips and the trained long-trip models for 8-14 day trips.
//! Any other duration has no model and yields `0`.

mod config;
pub mod domain;
pub mod long_trip;
mod overrides;
mod reference;
pub mod regime;
pub mod router;
pub mod rules;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, EngineError, LongTripConfig};
pub use domain::{round_cents, TripFeatures, TripInput, TripInputError};
pub use long_trip::{LongTripEstimator, ModelArtifact, ModelChoice, TripModel};
pub use overrides::{parse_override_csv, OverrideEntry, OverrideTable};
pub use regime::{Regime, RegimeParams};
pub use router::reimbursement_router;
pub use rules::{DurationRule, RuleOutcome, RuleTable};

use crate::config::EngineSettings;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable engine; safe to share across threads once constructed.
#[derive(Debug)]
pub struct ReimbursementEngine {
    rules: RuleTable,
    overrides: OverrideTable,
    long_trip: LongTripEstimator,
}

/// Path a single calculation took through the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route {
    Override,
    Rules(Regime),
    LongTrip(ModelChoice),
    Undefined,
}

impl ReimbursementEngine {
    pub fn new(
        config: &EngineConfig,
        general: Arc<dyn TripModel>,
        outlier: Arc<dyn TripModel>,
    ) -> Result<Self, EngineError> {
        let compiled = config.compile()?;

        Ok(Self {
            rules: compiled.rules,
            overrides: compiled.overrides,
            long_trip: LongTripEstimator::new(
                general,
                outlier,
                compiled.outlier_receipt_threshold,
            ),
        })
    }

    /// Build the engine from on-disk calibration inputs; any missing piece is fatal.
    pub fn load(settings: &EngineSettings) -> Result<Self, EngineError> {
        let mut config = match &settings.config_path {
            Some(path) => EngineConfig::from_path(path)?,
            None => EngineConfig::reference(),
        };

        if let Some(path) = &settings.overrides_csv {
            let file = std::fs::File::open(path).map_err(|source| EngineError::Io {
                path: path.clone(),
                source,
            })?;
            let extra = parse_override_csv(file).map_err(|source| EngineError::Csv {
                path: path.clone(),
                source,
            })?;
            config.overrides.extend(extra);
        }

        let general = load_model("general", &settings.general_model)?;
        let outlier = load_model("outlier", &settings.outlier_model)?;
        let engine = Self::new(&config, general, outlier)?;

        info!(
            overrides = engine.overrides.len(),
            outlier_receipt_threshold = engine.long_trip.outlier_receipt_threshold(),
            custom_config = settings.config_path.is_some(),
            "reimbursement engine loaded"
        );

        Ok(engine)
    }

    /// Validate raw caller input and compute the reimbursement amount.
    pub fn calculate(
        &self,
        duration_days: i64,
        miles: f64,
        receipts: f64,
    ) -> Result<f64, TripInputError> {
        let trip = TripInput::new(duration_days, miles, receipts)?;
        Ok(self.estimate(&trip))
    }

    pub fn estimate(&self, trip: &TripInput) -> f64 {
        self.estimate_with_route(trip).1
    }

    pub fn estimate_with_route(&self, trip: &TripInput) -> (Route, f64) {
        let (route, amount) = self.dispatch(trip);
        debug!(
            duration_days = trip.duration_days,
            miles = trip.miles,
            receipts = trip.receipts,
            route = ?route,
            amount,
            "reimbursement calculated"
        );
        (route, amount)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn long_trip(&self) -> &LongTripEstimator {
        &self.long_trip
    }

    fn dispatch(&self, trip: &TripInput) -> (Route, f64) {
        if let Some(amount) = self.overrides.lookup(trip) {
            return (Route::Override, amount);
        }

        if let Some(outcome) = self.rules.evaluate(trip) {
            return (Route::Rules(outcome.regime), outcome.amount);
        }

        if LongTripEstimator::covers(trip.duration_days) {
            let (choice, amount) = self.long_trip.estimate(trip);
            return (Route::LongTrip(choice), amount);
        }

        (Route::Undefined, 0.0)
    }
}

fn load_model(name: &'static str, path: &Path) -> Result<Arc<dyn TripModel>, EngineError> {
    let artifact = ModelArtifact::from_path(path).map_err(|source| EngineError::Model {
        name,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Arc::new(artifact))
}
