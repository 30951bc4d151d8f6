mod artifact;

pub use artifact::{
    GradientBoostedTrees, LinearModel, ModelArtifact, ModelArtifactError, RegressionTree,
    TreeNode,
};

use super::domain::{round_cents, TripFeatures, TripInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trained regressor over the raw `(duration, miles, receipts)` features.
pub trait TripModel: Send + Sync {
    fn predict(&self, features: &TripFeatures) -> f64;
}

impl<F> TripModel for F
where
    F: Fn(&TripFeatures) -> f64 + Send + Sync,
{
    fn predict(&self, features: &TripFeatures) -> f64 {
        self(features)
    }
}

pub const LONG_TRIP_MIN_DURATION: u32 = 8;
pub const LONG_TRIP_MAX_DURATION: u32 = 14;

/// Which trained model served a long trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    General,
    Outlier,
}

impl ModelChoice {
    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::General => "general",
            ModelChoice::Outlier => "outlier",
        }
    }
}

/// Routes 8..=14 day trips to the general or the high-receipt model.
#[derive(Clone)]
pub struct LongTripEstimator {
    general: Arc<dyn TripModel>,
    outlier: Arc<dyn TripModel>,
    outlier_receipt_threshold: f64,
}

impl LongTripEstimator {
    pub fn new(
        general: Arc<dyn TripModel>,
        outlier: Arc<dyn TripModel>,
        outlier_receipt_threshold: f64,
    ) -> Self {
        Self {
            general,
            outlier,
            outlier_receipt_threshold,
        }
    }

    pub fn covers(duration_days: u32) -> bool {
        (LONG_TRIP_MIN_DURATION..=LONG_TRIP_MAX_DURATION).contains(&duration_days)
    }

    pub fn outlier_receipt_threshold(&self) -> f64 {
        self.outlier_receipt_threshold
    }

    pub fn select(&self, receipts: f64) -> ModelChoice {
        if receipts > self.outlier_receipt_threshold {
            ModelChoice::Outlier
        } else {
            ModelChoice::General
        }
    }

    pub fn estimate(&self, trip: &TripInput) -> (ModelChoice, f64) {
        let choice = self.select(trip.receipts);
        let model = match choice {
            ModelChoice::General => &self.general,
            ModelChoice::Outlier => &self.outlier,
        };
        (choice, round_cents(model.predict(&trip.features())))
    }
}

impl std::fmt::Debug for LongTripEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongTripEstimator")
            .field("outlier_receipt_threshold", &self.outlier_receipt_threshold)
            .finish_non_exhaustive()
    }
}
