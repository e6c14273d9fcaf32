//! Colors shared by the charts.

use litscope_schedule::Rgb;
use plotters::style::RGBColor;

pub const AXIS_GRAY: RGBColor = RGBColor(128, 128, 128);
pub const GRID_GRAY: RGBColor = RGBColor(224, 224, 224);
pub const NOTE_GRAY: RGBColor = RGBColor(96, 96, 96);

const REDS_LIGHT: (u8, u8, u8) = (252, 187, 161);
const REDS_DARK: (u8, u8, u8) = (165, 15, 21);

/// Sequential red ramp with `n` steps, light to dark.
pub fn reds(n: usize) -> Vec<RGBColor> {
    let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (0..n)
        .map(|i| {
            let t = if n <= 1 { 1.0 } else { i as f64 / (n - 1) as f64 };
            RGBColor(
                lerp(REDS_LIGHT.0, REDS_DARK.0, t),
                lerp(REDS_LIGHT.1, REDS_DARK.1, t),
                lerp(REDS_LIGHT.2, REDS_DARK.2, t),
            )
        })
        .collect()
}

pub fn to_plotters(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lightness(c: &RGBColor) -> u32 {
        c.0 as u32 + c.1 as u32 + c.2 as u32
    }

    #[test]
    fn test_reds_darken_along_the_ramp() {
        let ramp = reds(6);
        assert_eq!(ramp.len(), 6);
        assert!(ramp.windows(2).all(|w| lightness(&w[0]) > lightness(&w[1])));
        assert_eq!(ramp[5], RGBColor(165, 15, 21));
    }

    #[test]
    fn test_single_category_uses_dark_end() {
        assert_eq!(reds(1), vec![RGBColor(165, 15, 21)]);
        assert!(reds(0).is_empty());
    }
}
