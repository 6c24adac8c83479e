use serde::Serialize;

use super::model::{CrossingDataset, CrossingRecord, Dimension};

// ---------------------------------------------------------------------------
// Filter predicate: at most one selected value per dimension
// ---------------------------------------------------------------------------

/// The user's current filter choice. `None` means "All" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub border: Option<String>,
    pub state: Option<String>,
    pub measure: Option<String>,
}

impl FilterSelection {
    pub fn get(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::Border => self.border.as_deref(),
            Dimension::State => self.state.as_deref(),
            Dimension::Measure => self.measure.as_deref(),
        }
    }

    pub fn set(&mut self, dim: Dimension, value: Option<String>) {
        let slot = match dim {
            Dimension::Border => &mut self.border,
            Dimension::State => &mut self.state,
            Dimension::Measure => &mut self.measure,
        };
        *slot = value;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_unconstrained(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.get(*d).is_none())
    }

    /// Drop any constraint whose value does not occur in `dataset`.
    pub fn retain_legal(&mut self, dataset: &CrossingDataset) {
        for dim in Dimension::ALL {
            let legal = self
                .get(dim)
                .map_or(true, |v| dataset.options(dim).iter().any(|o| o == v));
            if !legal {
                log::debug!("Dropping {dim} filter not present in dataset");
                self.set(dim, None);
            }
        }
    }

    /// A record passes when every constrained dimension matches exactly.
    pub fn matches(&self, record: &CrossingRecord) -> bool {
        Dimension::ALL.iter().all(|dim| match self.get(*dim) {
            Some(wanted) => dim.value_of(record) == wanted,
            None => true,
        })
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows passing the current selection
// ---------------------------------------------------------------------------

/// Order-preserving subsequence of a dataset. Holds row indices, not copies.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a CrossingDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a CrossingRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of rows that pass all active constraints.
///
/// Unconstrained dimensions pass everything. A combination that matches no
/// row yields an empty view; it is never an error.
pub fn apply<'a>(dataset: &'a CrossingDataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Border;
    use crate::data::model::tests::record;

    fn dataset() -> CrossingDataset {
        CrossingDataset::from_records(vec![
            record("PortA", "CA", Border::Mexico, "Pedestrians", 100, (2023, 1, 15)),
            record("PortB", "CA", Border::Canada, "Pedestrians", 50, (2023, 1, 20)),
            record("PortA", "CA", Border::Mexico, "Trucks", 30, (2023, 2, 1)),
            record("Calais", "Maine", Border::Canada, "Trucks", 12, (2023, 2, 1)),
        ])
    }

    fn select(border: Option<&str>, state: Option<&str>, measure: Option<&str>) -> FilterSelection {
        FilterSelection {
            border: border.map(str::to_string),
            state: state.map(str::to_string),
            measure: measure.map(str::to_string),
        }
    }

    #[test]
    fn unconstrained_selection_keeps_every_row_in_order() {
        let ds = dataset();
        let view = apply(&ds, &FilterSelection::default());
        assert_eq!(view.indices(), [0, 1, 2, 3]);
    }

    #[test]
    fn single_constraint_is_equality() {
        let ds = dataset();
        let view = apply(&ds, &select(Some("US-Mexico Border"), None, None));
        assert_eq!(view.indices(), [0, 2]);
        assert!(view.iter().all(|r| r.border == Border::Mexico));
    }

    #[test]
    fn constraints_combine_with_and() {
        let ds = dataset();
        let view = apply(&ds, &select(Some("US-Canada Border"), None, Some("Trucks")));
        assert_eq!(view.indices(), [3]);
        let view = apply(&ds, &select(None, Some("CA"), Some("Pedestrians")));
        assert_eq!(view.indices(), [0, 1]);
    }

    #[test]
    fn impossible_combination_is_empty_not_error() {
        let ds = dataset();
        let view = apply(&ds, &select(Some("US-Mexico Border"), Some("Maine"), None));
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn view_is_subsequence_for_every_selection() {
        let ds = dataset();
        let mut choices: Vec<FilterSelection> = vec![FilterSelection::default()];
        for dim in Dimension::ALL {
            let mut next = Vec::new();
            for base in &choices {
                for value in ds.options(dim) {
                    let mut sel = base.clone();
                    sel.set(dim, Some(value.clone()));
                    next.push(sel);
                }
            }
            choices.extend(next);
        }

        for sel in &choices {
            let view = apply(&ds, sel);
            assert!(view.len() <= ds.len());
            assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
            assert!(view.iter().all(|r| sel.matches(r)));
            let skipped = (0..ds.len()).filter(|i| !view.indices().contains(i));
            assert!(skipped.into_iter().all(|i| !sel.matches(&ds.records()[i])));
        }
    }

    #[test]
    fn retain_legal_drops_unknown_values() {
        let ds = dataset();
        let mut sel = select(Some("US-Mexico Border"), Some("Yukon"), Some("Trucks"));
        sel.retain_legal(&ds);
        assert_eq!(sel, select(Some("US-Mexico Border"), None, Some("Trucks")));
        sel.clear();
        assert!(sel.is_unconstrained());
    }
}
