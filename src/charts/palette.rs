//! Chart colours: matplotlib names, hex codes and the fallback palette.

use crate::config::ColorConfig;
use plotters::style::RGBColor;
use std::collections::BTreeMap;

/// Used for keys without a configured colour, cycled by index.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(233, 30, 99),  // Pink
    RGBColor(0, 188, 212),  // Cyan
    RGBColor(255, 87, 34),  // Deep Orange
    RGBColor(121, 85, 72),  // Brown
    RGBColor(96, 125, 139), // Blue Grey
];

/// Colour for names that cannot be resolved.
pub const FALLBACK: RGBColor = RGBColor(128, 128, 128);

const NAMED: &[(&str, u32)] = &[
    ("aqua", 0x00FFFF),
    ("beige", 0xF5F5DC),
    ("black", 0x000000),
    ("blue", 0x0000FF),
    ("blueviolet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("cadetblue", 0x5F9EA0),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkgoldenrod", 0xB8860B),
    ("darkgray", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xA9A9A9),
    ("darkkhaki", 0xBDB76B),
    ("darkorange", 0xFF8C00),
    ("darkred", 0x8B0000),
    ("darkseagreen", 0x8FBC8F),
    ("deepskyblue", 0x00BFFF),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("forestgreen", 0x228B22),
    ("gold", 0xFFD700),
    ("goldenrod", 0xDAA520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("grey", 0x808080),
    ("hotpink", 0xFF69B4),
    ("indigo", 0x4B0082),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lightblue", 0xADD8E6),
    ("lightcoral", 0xF08080),
    ("lightgray", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightgrey", 0xD3D3D3),
    ("lightsalmon", 0xFFA07A),
    ("lightskyblue", 0x87CEFA),
    ("lime", 0x00FF00),
    ("limegreen", 0x32CD32),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("mediumpurple", 0x9370DB),
    ("mediumseagreen", 0x3CB371),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("olivedrab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orchid", 0xDA70D6),
    ("palegreen", 0x98FB98),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("royalblue", 0x4169E1),
    ("salmon", 0xFA8072),
    ("seagreen", 0x2E8B57),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("skyblue", 0x87CEEB),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("steelblue", 0x4682B4),
    ("tab:blue", 0x1F77B4),
    ("tab:brown", 0x8C564B),
    ("tab:cyan", 0x17BECF),
    ("tab:gray", 0x7F7F7F),
    ("tab:green", 0x2CA02C),
    ("tab:olive", 0xBCBD22),
    ("tab:orange", 0xFF7F0E),
    ("tab:pink", 0xE377C2),
    ("tab:purple", 0x9467BD),
    ("tab:red", 0xD62728),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("yellow", 0xFFFF00),
    ("yellowgreen", 0x9ACD32),
];

fn from_hex(value: u32) -> RGBColor {
    RGBColor((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

/// Parse a matplotlib colour name or a `#rrggbb` code.
pub fn parse_color(spec: &str) -> Option<RGBColor> {
    let spec = spec.trim().to_ascii_lowercase();
    if let Some(hex) = spec.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        return u32::from_str_radix(hex, 16).ok().map(from_hex);
    }
    NAMED
        .binary_search_by(|(name, _)| name.cmp(&spec.as_str()))
        .ok()
        .map(|i| from_hex(NAMED[i].1))
}

/// Like [`parse_color`], falling back to grey with a warning.
pub fn resolve_color(spec: &str) -> RGBColor {
    parse_color(spec).unwrap_or_else(|| {
        tracing::warn!(color = spec, "unknown colour, using grey");
        FALLBACK
    })
}

/// Resolved colours for one kind of key (technology, country, run, ...).
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    entries: BTreeMap<String, RGBColor>,
}

impl ColorMap {
    pub fn from_names(names: &BTreeMap<String, String>) -> Self {
        Self {
            entries: names
                .iter()
                .map(|(key, spec)| (key.clone(), resolve_color(spec)))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, color: RGBColor) {
        self.entries.insert(key.into(), color);
    }

    /// Configured colour for `key`, or the palette entry at `index`.
    pub fn get(&self, key: &str, index: usize) -> RGBColor {
        self.entries
            .get(key)
            .copied()
            .unwrap_or(PALETTE[index % PALETTE.len()])
    }
}

/// Every colour map the charts use.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    pub technology: ColorMap,
    pub gen_shares: ColorMap,
    pub dual_costs: ColorMap,
    pub dual_emissions: ColorMap,
    pub transmission: ColorMap,
    pub countries: ColorMap,
}

impl Palette {
    pub fn from_config(colors: &ColorConfig) -> Self {
        Self {
            technology: ColorMap::from_names(&colors.technology),
            gen_shares: ColorMap::from_names(&colors.gen_shares),
            dual_costs: ColorMap::from_names(&colors.dual_costs),
            dual_emissions: ColorMap::from_names(&colors.dual_emissions),
            transmission: ColorMap::from_names(&colors.transmission),
            countries: ColorMap::from_names(&colors.countries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_table_is_sorted() {
        assert!(NAMED.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(parse_color("gold"), Some(RGBColor(255, 215, 0)));
        assert_eq!(parse_color("NAVY"), Some(RGBColor(0, 0, 128)));
        assert_eq!(parse_color("#1e90ff"), Some(RGBColor(30, 144, 255)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("notacolour"), None);
    }

    #[test]
    fn unknown_names_fall_back_to_grey() {
        assert_eq!(resolve_color("notacolour"), FALLBACK);
    }

    #[test]
    fn missing_keys_cycle_the_palette() {
        let map = ColorMap::from_names(&BTreeMap::from([("SPV".to_string(), "gold".to_string())]));
        assert_eq!(map.get("SPV", 0), RGBColor(255, 215, 0));
        assert_eq!(map.get("XYZ", 1), PALETTE[1]);
        assert_eq!(map.get("XYZ", 11), PALETTE[1]);
    }

    #[test]
    fn default_config_resolves_every_colour() {
        let colors = ColorConfig::default();
        for map in [
            &colors.technology,
            &colors.gen_shares,
            &colors.dual_costs,
            &colors.dual_emissions,
            &colors.transmission,
            &colors.countries,
        ] {
            for spec in map.values() {
                assert!(parse_color(spec).is_some(), "{spec} does not resolve");
            }
        }
    }
}
