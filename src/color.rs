use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: port name → Color32
// ---------------------------------------------------------------------------

/// Assigns each port in a ranking its own colour, so a port keeps the same
/// colour in the bar chart and on the map.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new<'a>(ports: impl IntoIterator<Item = &'a str>) -> Self {
        let ports: Vec<&str> = ports.into_iter().collect();
        let mapping = ports
            .iter()
            .zip(generate_palette(ports.len()))
            .map(|(p, c)| (p.to_string(), c))
            .collect();
        ColorMap { mapping }
    }

    /// Colour for a port, or `None` if it is not in the ranking.
    pub fn color_for(&self, port: &str) -> Option<Color32> {
        self.mapping.get(port).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let palette = generate_palette(10);
        assert_eq!(palette.len(), 10);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn ranked_ports_get_colours_others_do_not() {
        let map = ColorMap::new(["San Ysidro", "El Paso"]);
        assert!(map.color_for("San Ysidro").is_some());
        assert_ne!(map.color_for("San Ysidro"), map.color_for("El Paso"));
        assert_eq!(map.color_for("Calais"), None);
    }
}
