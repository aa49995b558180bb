//! Bitmap rendering of column heights.

use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformColors {
    pub background: Rgba<u8>,
    pub top_wave: Rgba<u8>,
    pub bottom_wave: Rgba<u8>,
    pub center_line: Rgba<u8>,
}

impl Default for WaveformColors {
    fn default() -> Self {
        Self {
            background: Rgba([18, 18, 18, 255]),
            top_wave: Rgba([0, 255, 100, 255]),
            bottom_wave: Rgba([0, 170, 70, 255]),
            center_line: Rgba([128, 128, 128, 255]),
        }
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, String> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return Err(format!("Invalid color '{value}', expected #RRGGBB"));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| format!("Invalid color '{value}', expected #RRGGBB"))
    };

    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Draw the background, a 1px center line across the full width, and for
/// each column a bar of `heights[x]` pixels above the line (top color) and
/// the same below it (bottom color).
pub fn render(heights: &[i32], width: u32, height: u32, colors: &WaveformColors) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, colors.background);
    if width == 0 || height == 0 {
        return image;
    }

    let center = height / 2;
    for x in 0..width {
        image.put_pixel(x, center, colors.center_line);
    }

    for (x, &bar) in heights.iter().enumerate().take(width as usize) {
        let bar = bar.max(0) as u32;
        if bar == 0 {
            continue;
        }
        let x = x as u32;

        for y in center.saturating_sub(bar)..center {
            image.put_pixel(x, y, colors.top_wave);
        }
        let bottom_end = (center + bar).min(height - 1);
        for y in center + 1..=bottom_end {
            image.put_pixel(x, y, colors.bottom_wave);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0080").unwrap(), Rgba([255, 0, 128, 255]));
        assert_eq!(parse_hex_color("00ff0040").unwrap(), Rgba([0, 255, 0, 64]));
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_flat_render_is_center_line_only() {
        let colors = WaveformColors::default();
        let image = render(&[0; 8], 8, 10, &colors);

        for (_, y, pixel) in image.enumerate_pixels() {
            if y == 5 {
                assert_eq!(*pixel, colors.center_line);
            } else {
                assert_eq!(*pixel, colors.background);
            }
        }
    }

    #[test]
    fn test_bars_extend_both_ways() {
        let colors = WaveformColors::default();
        let image = render(&[0, 3], 2, 11, &colors);

        // column 0 untouched except the line
        assert_eq!(*image.get_pixel(0, 4), colors.background);
        // column 1: rows 2..5 top, 6..=8 bottom, line at 5
        for y in 2..5 {
            assert_eq!(*image.get_pixel(1, y), colors.top_wave);
        }
        assert_eq!(*image.get_pixel(1, 5), colors.center_line);
        for y in 6..=8 {
            assert_eq!(*image.get_pixel(1, y), colors.bottom_wave);
        }
        assert_eq!(*image.get_pixel(1, 1), colors.background);
        assert_eq!(*image.get_pixel(1, 9), colors.background);
    }

    #[test]
    fn test_full_bar_clamped_to_image() {
        let colors = WaveformColors::default();
        let image = render(&[5], 1, 10, &colors);
        assert_eq!(*image.get_pixel(0, 0), colors.top_wave);
        assert_eq!(*image.get_pixel(0, 9), colors.bottom_wave);
    }
}
