use eframe::egui::{self, RichText, Ui};

use crate::data::aggregate::Summary;

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// Render the row of headline figures.
pub fn metric_row(ui: &mut Ui, summary: &Summary) {
    let cards = [
        ("Total Crossings", format_count(summary.total_crossings)),
        ("Unique Ports", format_count(summary.unique_ports as u64)),
        ("States Covered", format_count(summary.unique_states as u64)),
        ("Border Types", format_count(summary.border_types as u64)),
        (
            "Top Measure",
            summary.top_measure.clone().unwrap_or_else(|| "—".to_string()),
        ),
    ];

    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (ui, (label, value)) in cols.iter_mut().zip(cards) {
            metric_card(ui, label, &value);
        }
    });
}

fn metric_card(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).heading().strong());
    });
}

/// Integer with comma thousands separators: `1234567` → `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::format_count;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(100000), "100,000");
    }
}
