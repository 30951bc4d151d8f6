use std::io::{Cursor, Write};
use std::path::PathBuf;

use super::common::*;
use crate::config::EngineSettings;
use crate::engine::{EngineConfig, EngineError, OverrideEntry, RegimeParams, ReimbursementEngine};

const LINEAR_GENERAL: &str =
    r#"{"kind": "linear", "intercept": 500.0, "coefficients": [50.0, 0.5, 0.25]}"#;
const LINEAR_OUTLIER: &str =
    r#"{"kind": "linear", "intercept": 900.0, "coefficients": [0.0, 0.0, 0.0]}"#;

fn build(config: &EngineConfig) -> Result<ReimbursementEngine, EngineError> {
    ReimbursementEngine::new(
        config,
        constant_model(GENERAL_STUB),
        constant_model(OUTLIER_STUB),
    )
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

#[test]
fn reference_configuration_compiles() {
    let engine = build(&EngineConfig::reference()).expect("reference engine");
    assert_eq!(engine.overrides().len(), 5);
    assert_eq!(engine.long_trip().outlier_receipt_threshold(), 2500.0);
}

#[test]
fn missing_rule_is_fatal() {
    let mut config = EngineConfig::reference();
    config.rules.remove(&6);

    match build(&config) {
        Err(EngineError::MissingRule(6)) => {}
        other => panic!("expected missing rule, got {other:?}"),
    }
}

#[test]
fn rules_for_long_trips_are_rejected() {
    let mut config = EngineConfig::reference();
    let rule = config.rules[&7].clone();
    config.rules.insert(8, rule);

    assert!(matches!(
        build(&config),
        Err(EngineError::UnexpectedDuration(8))
    ));
}

#[test]
fn rule_invariants_are_enforced() {
    let mut rising = EngineConfig::reference();
    if let Some(rule) = rising.rules.get_mut(&2) {
        rule.mileage_rate2 = rule.mileage_rate1;
    }
    assert!(matches!(
        build(&rising),
        Err(EngineError::InvalidRule { duration: 2, .. })
    ));

    let mut uncapped = EngineConfig::reference();
    if let Some(rule) = uncapped.rules.get_mut(&3) {
        rule.receipt_cap = 0.0;
    }
    assert!(matches!(
        build(&uncapped),
        Err(EngineError::InvalidRule { duration: 3, .. })
    ));

    let mut free_miles = EngineConfig::reference();
    if let Some(rule) = free_miles.rules.get_mut(&5) {
        rule.mileage_rate1 = 0.0;
        rule.mileage_rate2 = -0.1;
    }
    match build(&free_miles) {
        Err(EngineError::InvalidRule { duration: 5, reason }) => {
            assert!(reason.contains("mileage_rate1"), "{reason}")
        }
        other => panic!("expected invalid rule, got {other:?}"),
    }
}

#[test]
fn regime_thresholds_must_be_ordered() {
    let mut config = EngineConfig::reference();
    if let Some(params) = config.regimes.get_mut(&4) {
        params.bug_threshold = Some(100.0);
        params.bug_rate = Some(0.01);
    }

    assert!(matches!(
        build(&config),
        Err(EngineError::InvalidRegime { duration: 4, .. })
    ));
}

#[test]
fn regime_threshold_without_a_rate_is_rejected() {
    let mut config = EngineConfig::reference();
    let regime: RegimeParams =
        serde_json::from_str(r#"{"anomaly_threshold": 500}"#).expect("regime parses");
    config.regimes.insert(2, regime);

    match build(&config) {
        Err(EngineError::InvalidRegime { duration: 2, reason }) => {
            assert!(reason.contains("anomaly_rate"), "{reason}")
        }
        other => panic!("expected invalid regime, got {other:?}"),
    }
}

#[test]
fn duplicate_overrides_are_rejected() {
    let mut config = EngineConfig::reference();
    config.overrides.push(OverrideEntry {
        duration_days: 4,
        miles: 69,
        receipts: 2321.49,
        amount: 300.0,
    });

    assert!(matches!(
        build(&config),
        Err(EngineError::DuplicateOverride(_))
    ));
}

#[test]
fn outlier_threshold_must_be_finite() {
    let mut config = EngineConfig::reference();
    config.long_trip.outlier_receipt_threshold = f64::NAN;

    assert!(matches!(build(&config), Err(EngineError::InvalidThreshold(_))));
}

#[test]
fn json_configuration_defaults_optional_sections() {
    let rules: String = (1..=7)
        .map(|day| {
            format!(
                r#""{day}": {{"per_diem": {per_diem}, "mileage_rate1": 0.6, "mileage_threshold": 100,
                "mileage_rate2": 0.4, "receipt_rate": 0.5, "receipt_cap": 800,
                "low_receipt_threshold": 10, "low_receipt_penalty": 5}}"#,
                per_diem = day * 100
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    let json = format!(
        r#"{{"rules": {{{rules}}}, "regimes": {{"2": {{"anomaly_threshold": 1000, "anomaly_rate": 0.1, "bug_threshold": null}}}}}}"#
    );

    let config = EngineConfig::from_reader(Cursor::new(json)).expect("config parses");
    assert!(config.overrides.is_empty());
    assert_eq!(config.long_trip.outlier_receipt_threshold, 2500.0);
    assert_eq!(config.regimes[&2].anomaly_threshold, Some(1000.0));
    assert_eq!(config.regimes[&2].bug_threshold, None);

    let engine = build(&config).expect("engine builds");
    // 200 + 50 * 0.6 + 2000 * 0.1
    assert_eq!(engine.calculate(2, 50.0, 2000.0), Ok(430.0));
    // 100 + 0 + 4 * 0.5 - 5
    assert_eq!(engine.calculate(1, 0.0, 4.0), Ok(97.0));
}

#[test]
fn malformed_configuration_is_a_parse_error() {
    let result = EngineConfig::from_reader(Cursor::new(r#"{"rules": [1, 2, 3]}"#));
    assert!(matches!(result, Err(EngineError::Parse { path: None, .. })));
}

#[test]
fn load_fails_when_model_artifacts_are_missing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let outlier = write_file(&dir, "outlier.json", LINEAR_OUTLIER);
    let settings = EngineSettings {
        config_path: None,
        overrides_csv: None,
        general_model: dir.path().join("missing.json"),
        outlier_model: outlier,
    };

    match ReimbursementEngine::load(&settings) {
        Err(EngineError::Model { name, .. }) => assert_eq!(name, "general"),
        other => panic!("expected model error, got {other:?}"),
    }
}

#[test]
fn load_fails_on_malformed_model_artifact() {
    let dir = tempfile::tempdir().expect("temp dir");
    let general = write_file(&dir, "general.json", LINEAR_GENERAL);
    let outlier = write_file(&dir, "outlier.json", r#"{"kind": "linear"}"#);
    let settings = EngineSettings {
        config_path: None,
        overrides_csv: None,
        general_model: general,
        outlier_model: outlier,
    };

    match ReimbursementEngine::load(&settings) {
        Err(EngineError::Model { name, .. }) => assert_eq!(name, "outlier"),
        other => panic!("expected model error, got {other:?}"),
    }
}

#[test]
fn load_combines_reference_rules_csv_overrides_and_models() {
    let dir = tempfile::tempdir().expect("temp dir");
    let general = write_file(&dir, "general.json", LINEAR_GENERAL);
    let outlier = write_file(&dir, "outlier.json", LINEAR_OUTLIER);
    let overrides = write_file(
        &dir,
        "overrides.csv",
        "trip_duration_days,miles_traveled,total_receipts_amount,expected_output\n3,93,1.42,364.51\n",
    );
    let settings = EngineSettings {
        config_path: None,
        overrides_csv: Some(overrides),
        general_model: general,
        outlier_model: outlier,
    };

    let engine = ReimbursementEngine::load(&settings).expect("engine loads");

    assert_eq!(engine.overrides().len(), 6);
    assert_eq!(engine.calculate(3, 93.0, 1.42), Ok(364.51));
    // 500 + 10 * 50 + 200 * 0.5 + 400 * 0.25
    assert_eq!(engine.calculate(10, 200.0, 400.0), Ok(1200.0));
    assert_eq!(engine.calculate(10, 200.0, 2600.0), Ok(900.0));
}

#[test]
fn load_reports_missing_configuration_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = EngineSettings {
        config_path: Some(dir.path().join("engine.json")),
        ..EngineSettings::default()
    };

    assert!(matches!(
        ReimbursementEngine::load(&settings),
        Err(EngineError::Io { .. })
    ));
}
