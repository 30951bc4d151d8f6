/// Validated trip description handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripInput {
    pub duration_days: u32,
    pub miles: u32,
    pub receipts: f64,
}

impl TripInput {
    /// Coerce raw caller values into a trip, rejecting negative or non-finite input.
    ///
    /// Fractional miles are truncated toward zero, matching the legacy calculator's
    /// integer mileage handling.
    pub fn new(duration_days: i64, miles: f64, receipts: f64) -> Result<Self, TripInputError> {
        let duration_days = u32::try_from(duration_days)
            .map_err(|_| TripInputError::NegativeDuration(duration_days))?;

        if !miles.is_finite() || miles < 0.0 || miles > f64::from(u32::MAX) {
            return Err(TripInputError::InvalidMiles(miles));
        }

        if !receipts.is_finite() || receipts < 0.0 {
            return Err(TripInputError::InvalidReceipts(receipts));
        }

        Ok(Self {
            duration_days,
            miles: miles.trunc() as u32,
            receipts,
        })
    }

    /// Raw `(duration, miles, receipts)` feature vector used by the long-trip models.
    pub fn features(&self) -> TripFeatures {
        [
            f64::from(self.duration_days),
            f64::from(self.miles),
            self.receipts,
        ]
    }

    /// Receipts expressed in whole cents, the precision overrides are keyed on.
    pub fn receipt_cents(&self) -> i64 {
        to_cents(self.receipts)
    }
}

pub type TripFeatures = [f64; 3];

/// Malformed caller input. Distinct from the undefined-duration case, which yields `0`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TripInputError {
    #[error("trip duration must be a non-negative whole number of days, got {0}")]
    NegativeDuration(i64),
    #[error("trip duration must be a finite number of days, got {0}")]
    InvalidDuration(f64),
    #[error("miles traveled must be a finite non-negative number, got {0}")]
    InvalidMiles(f64),
    #[error("total receipts amount must be a finite non-negative number, got {0}")]
    InvalidReceipts(f64),
}

pub(crate) fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Round to two fractional digits using correctly rounded decimal formatting.
///
/// The legacy calculator rounds the exact binary value half-to-even, which is what
/// fixed-precision float formatting does as well; plain `(x * 100).round()` disagrees
/// on values such as `1.115`.
pub fn round_cents(amount: f64) -> f64 {
    if !amount.is_finite() {
        return amount;
    }

    format!("{amount:.2}").parse().unwrap_or(amount)
}
