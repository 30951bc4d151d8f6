use super::domain::TripInput;
use super::regime::{Regime, RegimeParams};
use serde::{Deserialize, Serialize};

/// Closed-form formula constants for one trip duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRule {
    pub per_diem: f64,
    pub mileage_rate1: f64,
    pub mileage_threshold: f64,
    pub mileage_rate2: f64,
    pub receipt_rate: f64,
    pub receipt_cap: f64,
    pub low_receipt_threshold: f64,
    pub low_receipt_penalty: f64,
}

impl DurationRule {
    /// Tiered mileage: `rate1` up to the threshold, `rate2` for every mile beyond it.
    pub fn mileage_term(&self, miles: f64) -> f64 {
        if miles > self.mileage_threshold {
            self.mileage_threshold * self.mileage_rate1
                + (miles - self.mileage_threshold) * self.mileage_rate2
        } else {
            miles * self.mileage_rate1
        }
    }

    pub fn capped_receipt_term(&self, receipts: f64) -> f64 {
        (receipts * self.receipt_rate).min(self.receipt_cap)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let fields = [
            ("per_diem", self.per_diem),
            ("mileage_rate1", self.mileage_rate1),
            ("mileage_threshold", self.mileage_threshold),
            ("mileage_rate2", self.mileage_rate2),
            ("receipt_rate", self.receipt_rate),
            ("receipt_cap", self.receipt_cap),
            ("low_receipt_threshold", self.low_receipt_threshold),
            ("low_receipt_penalty", self.low_receipt_penalty),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("{name} must be finite"));
        }
        if self.mileage_threshold < 0.0 || self.low_receipt_threshold < 0.0 {
            return Err("thresholds must be non-negative".to_string());
        }
        if self.mileage_rate1 <= 0.0 {
            return Err(format!(
                "mileage_rate1 must be positive, got {}",
                self.mileage_rate1
            ));
        }
        if self.mileage_rate2 >= self.mileage_rate1 {
            return Err(format!(
                "mileage_rate2 {} must be below mileage_rate1 {}",
                self.mileage_rate2, self.mileage_rate1
            ));
        }
        if self.receipt_cap <= 0.0 {
            return Err(format!(
                "receipt_cap must be positive, got {}",
                self.receipt_cap
            ));
        }
        Ok(())
    }
}

/// Immutable rule table covering short trips, indexed by duration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<DurationRule>,
    regimes: Vec<RegimeParams>,
}

impl RuleTable {
    pub const MIN_DURATION: u32 = 1;
    pub const MAX_DURATION: u32 = 7;

    /// Callers supply exactly one rule and one regime entry per duration, in order.
    pub(crate) fn new(rules: Vec<DurationRule>, regimes: Vec<RegimeParams>) -> Self {
        Self { rules, regimes }
    }

    pub fn covers(duration_days: u32) -> bool {
        (Self::MIN_DURATION..=Self::MAX_DURATION).contains(&duration_days)
    }

    pub fn rule(&self, duration_days: u32) -> Option<&DurationRule> {
        Self::slot(duration_days).and_then(|index| self.rules.get(index))
    }

    pub fn regime_params(&self, duration_days: u32) -> Option<&RegimeParams> {
        Self::slot(duration_days).and_then(|index| self.regimes.get(index))
    }

    /// Evaluate a short trip; `None` when the duration has no rule.
    pub fn evaluate(&self, trip: &TripInput) -> Option<RuleOutcome> {
        let rule = self.rule(trip.duration_days)?;
        let params = self.regime_params(trip.duration_days)?;
        Some(evaluate(rule, params, trip))
    }

    fn slot(duration_days: u32) -> Option<usize> {
        if Self::covers(duration_days) {
            Some((duration_days - Self::MIN_DURATION) as usize)
        } else {
            None
        }
    }
}

/// Rounded amount together with the regime that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleOutcome {
    pub regime: Regime,
    pub amount: f64,
}

pub(crate) fn evaluate(rule: &DurationRule, params: &RegimeParams, trip: &TripInput) -> RuleOutcome {
    let receipts = trip.receipts;
    let regime = params.classify(receipts);

    let receipt_term = match regime {
        Regime::Normal => rule.capped_receipt_term(receipts),
        Regime::Anomaly => {
            receipts * params.anomaly_rate.unwrap_or_default() + params.anomaly_offset
        }
        Regime::Bug => receipts * params.bug_rate.unwrap_or_default(),
    };

    let mut amount = rule.per_diem + rule.mileage_term(f64::from(trip.miles)) + receipt_term;

    if regime == Regime::Normal && receipts > 0.0 && receipts < rule.low_receipt_threshold {
        amount -= rule.low_receipt_penalty;
    }

    RuleOutcome {
        regime,
        amount: super::domain::round_cents(amount),
    }
}
