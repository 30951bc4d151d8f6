use super::domain::{to_cents, TripInput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Recorded legacy output for one exact input triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub duration_days: u32,
    pub miles: u32,
    pub receipts: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OverrideKey {
    duration_days: u32,
    miles: u32,
    receipt_cents: i64,
}

impl From<&TripInput> for OverrideKey {
    fn from(trip: &TripInput) -> Self {
        Self {
            duration_days: trip.duration_days,
            miles: trip.miles,
            receipt_cents: trip.receipt_cents(),
        }
    }
}

impl From<&OverrideEntry> for OverrideKey {
    fn from(entry: &OverrideEntry) -> Self {
        Self {
            duration_days: entry.duration_days,
            miles: entry.miles,
            receipt_cents: to_cents(entry.receipts),
        }
    }
}

/// Exact-match lookup consulted before any formula or model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: HashMap<OverrideKey, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OverrideRejection {
    Invalid(OverrideEntry),
    Duplicate(OverrideEntry),
}

impl OverrideTable {
    pub(crate) fn build(entries: &[OverrideEntry]) -> Result<Self, OverrideRejection> {
        let mut table = HashMap::with_capacity(entries.len());
        for entry in entries {
            let valid = entry.receipts.is_finite()
                && entry.receipts >= 0.0
                && entry.amount.is_finite();
            if !valid {
                return Err(OverrideRejection::Invalid(entry.clone()));
            }
            if table.insert(OverrideKey::from(entry), entry.amount).is_some() {
                return Err(OverrideRejection::Duplicate(entry.clone()));
            }
        }
        Ok(Self { entries: table })
    }

    pub fn lookup(&self, trip: &TripInput) -> Option<f64> {
        self.entries.get(&OverrideKey::from(trip)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse override rows from a CSV export using the legacy case column names.
pub fn parse_override_csv<R: Read>(reader: R) -> Result<Vec<OverrideEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for record in csv_reader.deserialize::<OverrideRow>() {
        let row = record?;
        entries.push(OverrideEntry {
            duration_days: row.trip_duration_days,
            miles: row.miles_traveled,
            receipts: row.total_receipts_amount,
            amount: row.expected_output,
        });
    }

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    trip_duration_days: u32,
    miles_traveled: u32,
    total_receipts_amount: f64,
    expected_output: f64,
}
