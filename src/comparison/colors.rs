// Display colors for comparison segments

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::telemetry::ColorProvider;

use super::segmenter::Dominance;

/// Used for a driver whose team color is unknown or unparseable
pub const DEFAULT_DRIVER_COLOR: Rgb = Rgb::new(0x1f, 0x77, 0xb4);
/// Segments where neither driver is faster (light grey)
pub const EQUAL_PACE_COLOR: Rgb = Rgb::new(0xd3, 0xd3, 0xd3);
/// Thin circuit outline drawn under the segments
pub const BACKGROUND_TRACK_COLOR: Rgb = Rgb::new(0x44, 0x44, 0x44);

const SHARED_COLOR_DARKEN_TOWARDS: Rgb = Rgb::new(40, 40, 40);
const SHARED_COLOR_DARKEN_FACTOR: f64 = 0.25;
const SHARED_COLOR_LIGHTEN_TOWARDS: Rgb = Rgb::new(220, 220, 220);
const SHARED_COLOR_LIGHTEN_FACTOR: f64 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the `#rgb` shorthand, case-insensitive
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => Some(Self::new(
                u8::from_str_radix(&digits[0..2], 16).ok()?,
                u8::from_str_radix(&digits[2..4], 16).ok()?,
                u8::from_str_radix(&digits[4..6], 16).ok()?,
            )),
            3 => {
                let expand = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
                Some(Self::new(
                    expand(0).ok()?,
                    expand(1).ok()?,
                    expand(2).ok()?,
                ))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Move `factor` of the way towards `other`. Channels are truncated, not rounded.
    pub fn mix(&self, other: Rgb, factor: f64) -> Rgb {
        let factor = factor.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| {
            (from as f64 * (1.0 - factor) + to as f64 * factor).clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// The two colors used for a comparison, guaranteed to differ
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverColors {
    pub driver_a: Rgb,
    pub driver_b: Rgb,
}

impl DriverColors {
    /// Resolve both drivers' colors from the provider
    pub fn lookup(provider: &impl ColorProvider, driver_a: &str, driver_b: &str) -> Self {
        Self::resolve(
            provider.team_color(driver_a).as_deref(),
            provider.team_color(driver_b).as_deref(),
        )
    }

    /// Turn two optional hex colors into display colors. Missing or invalid colors
    /// fall back to the default; two identical colors are split into a darker
    /// shade for driver A and a lighter one for driver B.
    pub fn resolve(color_a: Option<&str>, color_b: Option<&str>) -> Self {
        let driver_a = parse_or_default(color_a);
        let driver_b = parse_or_default(color_b);
        if driver_a == driver_b {
            return Self {
                driver_a: driver_a.mix(SHARED_COLOR_DARKEN_TOWARDS, SHARED_COLOR_DARKEN_FACTOR),
                driver_b: driver_b.mix(SHARED_COLOR_LIGHTEN_TOWARDS, SHARED_COLOR_LIGHTEN_FACTOR),
            };
        }
        Self { driver_a, driver_b }
    }

    pub fn for_dominance(&self, dominance: Dominance) -> Rgb {
        match dominance {
            Dominance::DriverA => self.driver_a,
            Dominance::DriverB => self.driver_b,
            Dominance::Equal => EQUAL_PACE_COLOR,
        }
    }
}

fn parse_or_default(color: Option<&str>) -> Rgb {
    match color {
        Some(hex) => Rgb::from_hex(hex).unwrap_or_else(|| {
            warn!("Unparseable team color '{}', using default", hex);
            DEFAULT_DRIVER_COLOR
        }),
        None => DEFAULT_DRIVER_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#1f77b4"), Some(Rgb::new(31, 119, 180)));
        assert_eq!(Rgb::from_hex("1F77B4"), Some(Rgb::new(31, 119, 180)));
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#ééé"), None);
        assert_eq!(Rgb::from_hex("#+f+f+f"), None);
        assert_eq!(Rgb::new(255, 128, 0).to_hex(), "#ff8000");
    }

    #[test]
    fn test_mix_truncates() {
        let mixed = Rgb::new(0xff, 0x80, 0x00).mix(Rgb::new(40, 40, 40), 0.25);
        // 255*0.75+10 = 201.25, 128*0.75+10 = 106, 0*0.75+10 = 10
        assert_eq!(mixed, Rgb::new(201, 106, 10));
    }

    #[test]
    fn test_distinct_colors_are_kept() {
        let colors = DriverColors::resolve(Some("#3671C6"), Some("#E8002D"));
        assert_eq!(colors.driver_a.to_hex(), "#3671c6");
        assert_eq!(colors.driver_b.to_hex(), "#e8002d");
    }

    #[test]
    fn test_missing_colors_fall_back_and_split() {
        let colors = DriverColors::resolve(None, Some("not a color"));
        assert_eq!(
            colors.driver_a,
            DEFAULT_DRIVER_COLOR.mix(Rgb::new(40, 40, 40), 0.25)
        );
        assert_eq!(
            colors.driver_b,
            DEFAULT_DRIVER_COLOR.mix(Rgb::new(220, 220, 220), 0.35)
        );
        assert_ne!(colors.driver_a, colors.driver_b);
    }

    #[test]
    fn test_same_color_comparison_is_case_insensitive() {
        let colors = DriverColors::resolve(Some("#FF8000"), Some("#ff8000"));
        assert_ne!(colors.driver_a, colors.driver_b);
        assert_eq!(colors.driver_a, Rgb::new(201, 106, 10));
    }

    #[test]
    fn test_equal_segments_use_neutral_color() {
        let colors = DriverColors::resolve(Some("#3671C6"), Some("#E8002D"));
        assert_eq!(colors.for_dominance(Dominance::Equal), EQUAL_PACE_COLOR);
        assert_eq!(colors.for_dominance(Dominance::DriverA), colors.driver_a);
        assert_eq!(colors.for_dominance(Dominance::DriverB), colors.driver_b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_shared_color_is_disambiguated(r: u8, g: u8, b: u8) {
            let hex = Rgb::new(r, g, b).to_hex();
            let colors = DriverColors::resolve(Some(&hex), Some(&hex.to_uppercase()));
            prop_assert_ne!(colors.driver_a, colors.driver_b);
        }
    }
}
