use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Border – the national boundary a port sits on
// ---------------------------------------------------------------------------

/// One of the two land borders covered by the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Border {
    #[serde(rename = "US-Canada Border")]
    Canada,
    #[serde(rename = "US-Mexico Border")]
    Mexico,
}

impl Border {
    pub const ALL: [Border; 2] = [Border::Canada, Border::Mexico];

    pub fn as_str(&self) -> &'static str {
        match self {
            Border::Canada => "US-Canada Border",
            Border::Mexico => "US-Mexico Border",
        }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the two border labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBorder(pub String);

impl FromStr for Border {
    type Err = UnknownBorder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Border::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| UnknownBorder(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// YearMonth – aggregation bucket for the monthly series
// ---------------------------------------------------------------------------

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Months since year 0; a continuous axis for plotting.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        let year = ordinal.div_euclid(12) as i32;
        let month = ordinal.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// CrossingRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single crossing observation: one (port, date, measure) count.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingRecord {
    pub port_name: String,
    pub state: String,
    pub border: Border,
    pub measure: String,
    pub value: u64,
    pub date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CrossingRecord {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }

    /// Both coordinates, if the row carries them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// Dimension – the categorical columns the user can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Border,
    State,
    Measure,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Border, Dimension::State, Dimension::Measure];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Border => "Border",
            Dimension::State => "State",
            Dimension::Measure => "Measure",
        }
    }

    /// The record's value in this dimension.
    pub fn value_of<'a>(&self, record: &'a CrossingRecord) -> &'a str {
        match self {
            Dimension::Border => record.border.as_str(),
            Dimension::State => &record.state,
            Dimension::Measure => &record.measure,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CrossingDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter options.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct CrossingDataset {
    records: Vec<CrossingRecord>,
    /// For each filter dimension the sorted set of distinct values.
    options: BTreeMap<Dimension, Vec<String>>,
    date_range: Option<(NaiveDate, NaiveDate)>,
}

impl CrossingDataset {
    /// Build filter indices from the loaded records.
    pub fn from_records(records: Vec<CrossingRecord>) -> Self {
        let mut distinct: BTreeMap<Dimension, BTreeSet<&str>> = BTreeMap::new();
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            for dim in Dimension::ALL {
                distinct.entry(dim).or_default().insert(dim.value_of(rec));
            }
            date_range = Some(match date_range {
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
                None => (rec.date, rec.date),
            });
        }

        let options = Dimension::ALL
            .into_iter()
            .map(|dim| {
                let values = distinct
                    .get(&dim)
                    .map(|set| set.iter().map(|s| s.to_string()).collect())
                    .unwrap_or_default();
                (dim, values)
            })
            .collect();

        CrossingDataset {
            records,
            options,
            date_range,
        }
    }

    pub fn records(&self) -> &[CrossingRecord] {
        &self.records
    }

    /// Sorted distinct values present for a dimension.
    pub fn options(&self, dim: Dimension) -> &[String] {
        self.options.get(&dim).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Earliest and latest observation dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        port: &str,
        state: &str,
        border: Border,
        measure: &str,
        value: u64,
        date: (i32, u32, u32),
    ) -> CrossingRecord {
        CrossingRecord {
            port_name: port.to_string(),
            state: state.to_string(),
            border,
            measure: measure.to_string(),
            value,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn border_parses_exact_labels_only() {
        assert_eq!("US-Canada Border".parse::<Border>(), Ok(Border::Canada));
        assert_eq!("US-Mexico Border".parse::<Border>(), Ok(Border::Mexico));
        assert!("us-mexico border".parse::<Border>().is_err());
        assert!("".parse::<Border>().is_err());
    }

    #[test]
    fn year_month_orders_and_round_trips_ordinal() {
        let jan = YearMonth::new(2023, 1);
        let dec = YearMonth::new(2022, 12);
        assert!(dec < jan);
        assert_eq!(jan.ordinal() - dec.ordinal(), 1);
        assert_eq!(YearMonth::from_ordinal(jan.ordinal()), jan);
        assert_eq!(YearMonth::from_ordinal(dec.ordinal()), dec);
        assert_eq!(jan.to_string(), "2023-01");
    }

    #[test]
    fn dataset_collects_sorted_distinct_options() {
        let ds = CrossingDataset::from_records(vec![
            record("Calexico", "CA", Border::Mexico, "Trucks", 5, (2023, 3, 1)),
            record("Blaine", "WA", Border::Canada, "Buses", 7, (2022, 7, 1)),
            record("Calexico", "CA", Border::Mexico, "Buses", 1, (2023, 1, 1)),
        ]);
        assert_eq!(ds.options(Dimension::State), ["CA", "WA"]);
        assert_eq!(ds.options(Dimension::Measure), ["Buses", "Trucks"]);
        assert_eq!(
            ds.options(Dimension::Border),
            ["US-Canada Border", "US-Mexico Border"]
        );
        let (lo, hi) = ds.date_range().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2022, 7, 1).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    }

    #[test]
    fn empty_dataset_has_no_options() {
        let ds = CrossingDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.options(Dimension::State).is_empty());
        assert!(ds.date_range().is_none());
    }

    #[test]
    fn coordinates_require_both_fields() {
        let mut rec = record("Blaine", "WA", Border::Canada, "Buses", 7, (2022, 7, 1));
        rec.latitude = Some(49.0);
        assert_eq!(rec.coordinates(), None);
        rec.longitude = Some(-122.7);
        assert_eq!(rec.coordinates(), Some((49.0, -122.7)));
    }
}
