use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::aggregate::{MonthlyTotal, PortLocation, PortTotal};
use crate::data::model::YearMonth;
use crate::ui::metrics::format_count;

const CHART_HEIGHT: f32 = 320.0;
const MAP_HEIGHT: f32 = 420.0;
const MAX_MARKER_RADIUS: f32 = 14.0;
const MIN_MARKER_RADIUS: f32 = 2.0;

// ---------------------------------------------------------------------------
// Top ports (horizontal bars)
// ---------------------------------------------------------------------------

/// Horizontal bar chart of the busiest ports, largest at the top.
pub fn top_ports_chart(ui: &mut Ui, ports: &[PortTotal], colors: &ColorMap) {
    // Bars are laid out bottom-up, so reverse to put the leader on top.
    let labels: Vec<String> = ports.iter().rev().map(|p| p.port_name.clone()).collect();

    let bars: Vec<Bar> = ports
        .iter()
        .rev()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, p.total as f64)
                .name(&p.port_name)
                .fill(colors.color_for(&p.port_name).unwrap_or(Color32::LIGHT_BLUE))
        })
        .collect();

    let chart = BarChart::new(bars).horizontal().width(0.7).name("Total crossings");

    Plot::new("top_ports_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Total crossings")
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            abbreviate(mark.value)
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

/// Label for an integer grid position, blank between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Monthly series (line with markers)
// ---------------------------------------------------------------------------

/// Total crossings per month. Missing months show as a straight segment
/// between their neighbours, not as zero.
pub fn monthly_chart(ui: &mut Ui, monthly: &[MonthlyTotal]) {
    let coords: Vec<[f64; 2]> = monthly
        .iter()
        .map(|m| [m.month.ordinal() as f64, m.total as f64])
        .collect();

    Plot::new("monthly_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Total crossings")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            month_label(mark.value)
        })
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            abbreviate(mark.value)
        })
        .label_formatter(|_name: &str, point: &PlotPoint| {
            format!("{}\n{}", month_label(point.x.round()), format_count(point.y.max(0.0) as u64))
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(coords.clone()))
                    .name("Total crossings")
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(coords))
                    .name("Total crossings")
                    .radius(2.5),
            );
        });
}

fn month_label(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 {
        return String::new();
    }
    YearMonth::from_ordinal(rounded as i64).to_string()
}

// ---------------------------------------------------------------------------
// Port map (longitude / latitude scatter)
// ---------------------------------------------------------------------------

/// Ports placed by coordinates, marker size by total crossings.
pub fn port_map(ui: &mut Ui, locations: &[PortLocation], colors: &ColorMap) {
    let max_total = locations.iter().map(|l| l.total).max().unwrap_or(0);

    Plot::new("port_map")
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .label_formatter(|name: &str, point: &PlotPoint| {
            if name.is_empty() {
                format!("{:.2}, {:.2}", point.y, point.x)
            } else {
                format!("{name}\n{:.2}, {:.2}", point.y, point.x)
            }
        })
        .show(ui, |plot_ui| {
            for loc in locations {
                let color = colors.color_for(&loc.port_name).unwrap_or(Color32::GRAY);
                plot_ui.points(
                    Points::new(vec![[loc.longitude, loc.latitude]])
                        .name(&loc.port_name)
                        .color(color)
                        .filled(true)
                        .radius(marker_radius(loc.total, max_total)),
                );
            }
        });
}

/// Marker area grows with the total.
fn marker_radius(total: u64, max_total: u64) -> f32 {
    if max_total == 0 {
        return MIN_MARKER_RADIUS;
    }
    let share = (total as f64 / max_total as f64).sqrt() as f32;
    MIN_MARKER_RADIUS + share * (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS)
}

/// Compact axis tick: 1.2M, 350k, 900.
fn abbreviate(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.0}k", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}
