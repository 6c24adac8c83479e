use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;

use super::filter::{FilterSelection, FilteredView, apply};
use super::model::{CrossingDataset, Dimension, YearMonth};

/// How many ports the ranking chart shows.
pub const TOP_PORTS_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortTotal {
    pub port_name: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortLocation {
    pub port_name: String,
    pub total: u64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Headline figures for the metric cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_crossings: u64,
    pub unique_ports: usize,
    pub unique_states: usize,
    pub border_types: usize,
    /// `None` when the view has no rows.
    pub top_measure: Option<String>,
}

// ---------------------------------------------------------------------------
// Scalar aggregates
// ---------------------------------------------------------------------------

pub fn total_crossings(view: &FilteredView<'_>) -> u64 {
    view.iter().map(|r| r.value).sum()
}

pub fn unique_port_count(view: &FilteredView<'_>) -> usize {
    view.iter().map(|r| r.port_name.as_str()).collect::<HashSet<_>>().len()
}

pub fn unique_state_count(view: &FilteredView<'_>) -> usize {
    view.iter().map(|r| r.state.as_str()).collect::<HashSet<_>>().len()
}

pub fn border_type_count(view: &FilteredView<'_>) -> usize {
    view.iter().map(|r| r.border).collect::<HashSet<_>>().len()
}

/// Most frequent measure by row count. Ties go to the measure seen first.
pub fn top_measure(view: &FilteredView<'_>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for rec in view.iter() {
        let measure = rec.measure.as_str();
        match slot.get(measure) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(measure, counts.len());
                counts.push((measure, 1));
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for &(measure, count) in &counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((measure, count));
        }
    }
    best.map(|(measure, _)| measure.to_string())
}

pub fn summary(view: &FilteredView<'_>) -> Summary {
    Summary {
        total_crossings: total_crossings(view),
        unique_ports: unique_port_count(view),
        unique_states: unique_state_count(view),
        border_types: border_type_count(view),
        top_measure: top_measure(view),
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// The `limit` busiest ports by summed value, largest first, equal totals
/// ordered by name.
pub fn top_ports(view: &FilteredView<'_>, limit: usize) -> Vec<PortTotal> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for rec in view.iter() {
        *totals.entry(rec.port_name.as_str()).or_default() += rec.value;
    }

    let mut ranked: Vec<PortTotal> = totals
        .into_iter()
        .map(|(port_name, total)| PortTotal {
            port_name: port_name.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.port_name.cmp(&b.port_name))
    });
    ranked.truncate(limit);
    ranked
}

/// Value summed per calendar month, oldest first. Months without rows are
/// absent rather than zero.
pub fn monthly_series(view: &FilteredView<'_>) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for rec in view.iter() {
        *buckets.entry(rec.month()).or_default() += rec.value;
    }
    buckets
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// One entry per port that has coordinates, ordered by port name. Rows
/// without both coordinates are ignored. If a port appears with several
/// coordinate pairs the first one seen is used.
pub fn port_locations(view: &FilteredView<'_>) -> Vec<PortLocation> {
    let mut ports: BTreeMap<&str, (u64, (f64, f64))> = BTreeMap::new();
    for rec in view.iter() {
        let Some(coords) = rec.coordinates() else {
            continue;
        };
        let entry = ports.entry(rec.port_name.as_str()).or_insert((0, coords));
        entry.0 += rec.value;
    }
    ports
        .into_iter()
        .map(|(port_name, (total, (latitude, longitude)))| PortLocation {
            port_name: port_name.to_string(),
            total,
            latitude,
            longitude,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard – everything the presentation layer draws for one selection
// ---------------------------------------------------------------------------

/// Distinct legal values for each filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub borders: Vec<String>,
    pub states: Vec<String>,
    pub measures: Vec<String>,
}

impl FilterOptions {
    pub fn of(dataset: &CrossingDataset) -> Self {
        Self {
            borders: dataset.options(Dimension::Border).to_vec(),
            states: dataset.options(Dimension::State).to_vec(),
            measures: dataset.options(Dimension::Measure).to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: FilterSelection,
    pub row_count: usize,
    /// Set when no row matches the selection; charts have nothing to draw.
    pub no_rows: bool,
    pub summary: Summary,
    pub top_ports: Vec<PortTotal>,
    pub monthly: Vec<MonthlyTotal>,
    pub port_locations: Vec<PortLocation>,
    pub options: FilterOptions,
}

/// Filter `dataset` by `selection` and compute every result set.
pub fn compute(dataset: &CrossingDataset, selection: &FilterSelection) -> Dashboard {
    let started = Instant::now();
    let view = apply(dataset, selection);

    let dashboard = Dashboard {
        selection: selection.clone(),
        row_count: view.len(),
        no_rows: view.is_empty(),
        summary: summary(&view),
        top_ports: top_ports(&view, TOP_PORTS_LIMIT),
        monthly: monthly_series(&view),
        port_locations: port_locations(&view),
        options: FilterOptions::of(dataset),
    };

    log::debug!(
        "Recomputed dashboard: {} of {} rows in {:.2?}",
        dashboard.row_count,
        dataset.len(),
        started.elapsed()
    );
    dashboard
}
