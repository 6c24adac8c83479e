use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::aggregate::{Dashboard, compute};
use crate::data::cache::DatasetCache;
use crate::data::filter::FilterSelection;
use crate::data::model::{CrossingDataset, Dimension};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    /// Owner of the loaded table.
    pub cache: DatasetCache,

    /// Dataset currently shown (None until a file loads).
    pub dataset: Option<Arc<CrossingDataset>>,

    /// Current filter choice.
    pub selection: FilterSelection,

    /// Results for `selection`, rebuilt whenever it changes.
    pub dashboard: Option<Dashboard>,

    /// Colours of the currently ranked ports.
    pub port_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` through the cache and show it. Errors end up in
    /// `status_message`; the previous dataset, if any, stays on screen.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error loading {}: {e}", path.display()));
            }
        }
    }

    /// Ingest a newly loaded dataset, keep whichever filters still apply, and
    /// recompute.
    pub fn set_dataset(&mut self, dataset: Arc<CrossingDataset>) {
        self.selection.retain_legal(&dataset);
        self.dataset = Some(dataset);
        self.recompute();
        self.status_message = None;
    }

    /// Rebuild the dashboard for the current selection.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            self.dashboard = None;
            return;
        };
        let dashboard = compute(ds, &self.selection);
        self.port_colors = ColorMap::new(dashboard.top_ports.iter().map(|p| p.port_name.as_str()));
        self.dashboard = Some(dashboard);
    }

    /// Change one dimension's constraint; `None` means all values.
    pub fn set_filter(&mut self, dim: Dimension, value: Option<String>) {
        if self.selection.get(dim) == value.as_deref() {
            return;
        }
        log::debug!("{dim} filter → {}", value.as_deref().unwrap_or("All"));
        self.selection.set(dim, value);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        if self.selection.is_unconstrained() {
            return;
        }
        self.selection.clear();
        self.recompute();
    }

    /// Write the current dashboard as pretty JSON.
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        let dashboard = self
            .dashboard
            .as_ref()
            .context("no dataset loaded, nothing to export")?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, dashboard).context("writing summary JSON")?;
        writer.flush().context("flushing summary JSON")?;
        log::info!("Exported dashboard summary to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const CSV: &str = "\
Port Name,State,Border,Date,Measure,Value,Latitude,Longitude
PortA,CA,US-Mexico Border,2023-01-15,Pedestrians,100,32.5,-117.0
PortB,CA,US-Canada Border,2023-01-20,Pedestrians,50,,
PortA,CA,US-Mexico Border,2023-02-01,Trucks,30,32.5,-117.0
";

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn open_computes_unfiltered_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "crossings.csv", CSV);

        let mut state = AppState::default();
        state.open(&path);

        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.row_count, 3);
        assert_eq!(dash.summary.total_crossings, 180);
        assert!(state.status_message.is_none());
        assert!(state.port_colors.color_for("PortA").is_some());
    }

    #[test]
    fn filter_changes_recompute_and_clear_restores() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "crossings.csv", CSV);
        let mut state = AppState::default();
        state.open(&path);

        state.set_filter(Dimension::Border, Some("US-Mexico Border".to_string()));
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.summary.total_crossings, 130);
        assert_eq!(dash.port_locations.len(), 1);
        assert!(state.port_colors.color_for("PortB").is_none());

        state.set_filter(Dimension::State, Some("Maine".to_string()));
        assert!(state.dashboard.as_ref().unwrap().no_rows);

        state.clear_filters();
        assert_eq!(state.dashboard.as_ref().unwrap().row_count, 3);
    }

    #[test]
    fn failed_open_reports_and_keeps_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "crossings.csv", CSV);
        let bad = write(dir.path(), "broken.csv", "Port Name,State\nA,CA\n");

        let mut state = AppState::default();
        state.open(&good);
        state.open(&bad);

        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("missing required column"));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
        assert_eq!(state.dashboard.as_ref().unwrap().row_count, 3);
    }

    #[test]
    fn overflowing_totals_are_reported_not_shown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "huge.csv",
            "Port Name,State,Border,Date,Measure,Value,Latitude,Longitude\n\
             A,CA,US-Mexico Border,2023-01-01,Trucks,18446744073709551615,,\n\
             B,CA,US-Mexico Border,2023-01-01,Trucks,1,,\n",
        );

        let mut state = AppState::default();
        state.open(&path);

        assert!(state.dataset.is_none());
        assert!(state.dashboard.is_none());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("row 2"), "{msg}");
    }

    #[test]
    fn export_writes_dashboard_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "crossings.csv", CSV);
        let mut state = AppState::default();

        let out = dir.path().join("summary.json");
        assert!(state.export_summary(&out).is_err());

        state.open(&path);
        state.export_summary(&out).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_crossings"], 180);
        assert_eq!(json["top_ports"][0]["port_name"], "PortA");
    }
}
