use std::sync::Arc;

use super::common::*;
use crate::engine::{LongTripEstimator, ModelChoice, TripFeatures, TripModel};

fn estimator() -> LongTripEstimator {
    LongTripEstimator::new(
        constant_model(GENERAL_STUB),
        constant_model(OUTLIER_STUB),
        2500.0,
    )
}

#[test]
fn receipts_at_threshold_use_the_general_model() {
    let estimator = estimator();

    assert_eq!(
        estimator.estimate(&trip(10, 500.0, 2500.0)),
        (ModelChoice::General, GENERAL_STUB)
    );
    assert_eq!(
        estimator.estimate(&trip(10, 500.0, 0.0)),
        (ModelChoice::General, GENERAL_STUB)
    );
}

#[test]
fn receipts_above_threshold_use_the_outlier_model() {
    let estimator = estimator();

    assert_eq!(
        estimator.estimate(&trip(10, 500.0, 2500.01)),
        (ModelChoice::Outlier, OUTLIER_STUB)
    );
    assert_eq!(estimator.select(10_000.0), ModelChoice::Outlier);
}

#[test]
fn models_receive_raw_features_and_outputs_are_rounded() {
    let general: Arc<dyn TripModel> =
        Arc::new(|features: &TripFeatures| features[0] * 100.0 + features[1] + features[2] / 3.0);
    let estimator = LongTripEstimator::new(general, constant_model(OUTLIER_STUB), 2500.0);

    let (choice, amount) = estimator.estimate(&trip(9, 321.0, 100.0));

    // 900 + 321 + 33.333...
    assert_eq!(choice, ModelChoice::General);
    assert_eq!(amount, 1254.33);
}

#[test]
fn covers_eight_through_fourteen_days() {
    assert!(!LongTripEstimator::covers(7));
    assert!(LongTripEstimator::covers(8));
    assert!(LongTripEstimator::covers(14));
    assert!(!LongTripEstimator::covers(15));
}

#[test]
fn threshold_comes_from_configuration() {
    let mut config = crate::engine::EngineConfig::reference();
    config.long_trip.outlier_receipt_threshold = 1000.0;
    let engine = engine_with(&config);

    assert_eq!(engine.calculate(12, 100.0, 1500.0), Ok(OUTLIER_STUB));
    assert_eq!(engine.calculate(12, 100.0, 900.0), Ok(GENERAL_STUB));
}
