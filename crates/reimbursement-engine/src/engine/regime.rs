use serde::{Deserialize, Serialize};

/// Receipt reimbursement branch selected for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Normal,
    Anomaly,
    Bug,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Regime::Normal => "normal",
            Regime::Anomaly => "anomaly",
            Regime::Bug => "bug",
        }
    }
}

/// Per-duration thresholds switching the receipt term away from the capped rate.
///
/// An absent threshold disables its regime, so the same table can express the
/// single-outlier and plain capped-rate calibrations. A threshold needs its rate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegimeParams {
    #[serde(default)]
    pub anomaly_threshold: Option<f64>,
    #[serde(default)]
    pub anomaly_rate: Option<f64>,
    /// Flat amount added to the anomaly receipt term.
    #[serde(default)]
    pub anomaly_offset: f64,
    #[serde(default)]
    pub bug_threshold: Option<f64>,
    #[serde(default)]
    pub bug_rate: Option<f64>,
}

impl RegimeParams {
    /// Thresholds are strict: receipts equal to a threshold stay in the lower regime.
    pub fn classify(&self, receipts: f64) -> Regime {
        if exceeds(receipts, self.bug_threshold) {
            Regime::Bug
        } else if exceeds(receipts, self.anomaly_threshold) {
            Regime::Anomaly
        } else {
            Regime::Normal
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("anomaly_threshold", self.anomaly_threshold),
            ("bug_threshold", self.bug_threshold),
        ] {
            if let Some(threshold) = value {
                if !threshold.is_finite() || threshold < 0.0 {
                    return Err(format!("{name} must be finite and non-negative"));
                }
            }
        }

        for (threshold, rate, name) in [
            (self.anomaly_threshold, self.anomaly_rate, "anomaly_rate"),
            (self.bug_threshold, self.bug_rate, "bug_rate"),
        ] {
            match (threshold, rate) {
                (Some(_), None) => {
                    return Err(format!("{name} is required with its threshold"))
                }
                (_, Some(rate)) if !rate.is_finite() => {
                    return Err(format!("{name} must be finite"))
                }
                _ => {}
            }
        }

        if !self.anomaly_offset.is_finite() {
            return Err("anomaly_offset must be finite".to_string());
        }

        if let (Some(anomaly), Some(bug)) = (self.anomaly_threshold, self.bug_threshold) {
            if bug < anomaly {
                return Err(format!(
                    "bug_threshold {bug} is below anomaly_threshold {anomaly}"
                ));
            }
        }

        Ok(())
    }
}

fn exceeds(receipts: f64, threshold: Option<f64>) -> bool {
    threshold.map(|limit| receipts > limit).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_tier() -> RegimeParams {
        RegimeParams {
            anomaly_threshold: Some(1800.0),
            anomaly_rate: Some(0.45),
            anomaly_offset: 0.0,
            bug_threshold: Some(2400.0),
            bug_rate: Some(0.005),
        }
    }

    #[test]
    fn classify_is_monotonic_in_receipts() {
        let params = three_tier();
        let mut previous = Regime::Normal;
        for cents in (0..300_000).step_by(2_500) {
            let regime = params.classify(cents as f64 / 100.0);
            assert!(regime >= previous, "regime reversed at {cents} cents");
            previous = regime;
        }
        assert_eq!(previous, Regime::Bug);
    }

    #[test]
    fn classify_uses_strict_thresholds() {
        let params = three_tier();
        assert_eq!(params.classify(1800.0), Regime::Normal);
        assert_eq!(params.classify(1800.01), Regime::Anomaly);
        assert_eq!(params.classify(2400.0), Regime::Anomaly);
        assert_eq!(params.classify(2400.01), Regime::Bug);
    }

    #[test]
    fn absent_thresholds_disable_regimes() {
        let params = RegimeParams::default();
        assert_eq!(params.classify(1_000_000.0), Regime::Normal);

        let bug_only = RegimeParams {
            bug_threshold: Some(500.0),
            ..RegimeParams::default()
        };
        assert_eq!(bug_only.classify(400.0), Regime::Normal);
        assert_eq!(bug_only.classify(600.0), Regime::Bug);
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let params = RegimeParams {
            anomaly_threshold: Some(2000.0),
            bug_threshold: Some(1500.0),
            ..three_tier()
        };
        let message = params.validate().expect_err("inverted thresholds");
        assert!(message.contains("below anomaly_threshold"));
        assert!(three_tier().validate().is_ok());
    }

    #[test]
    fn validate_requires_a_rate_for_each_threshold() {
        let missing_anomaly = RegimeParams {
            anomaly_rate: None,
            ..three_tier()
        };
        let message = missing_anomaly.validate().expect_err("anomaly rate missing");
        assert!(message.contains("anomaly_rate"));

        let missing_bug = RegimeParams {
            bug_rate: None,
            ..three_tier()
        };
        let message = missing_bug.validate().expect_err("bug rate missing");
        assert!(message.contains("bug_rate"));

        let disabled = RegimeParams {
            bug_threshold: None,
            bug_rate: None,
            ..three_tier()
        };
        assert!(disabled.validate().is_ok());
    }
}
