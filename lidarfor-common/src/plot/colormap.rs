use super::PlotError;

/// An RGB color value.
/// Each of the three channels should be in between 0.0 and 1.0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    /// red
    pub r: f32,

    /// green
    pub g: f32,

    /// blue
    pub b: f32,
}

impl Color {
    /// Creates a color from a r, g, b component
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    /// Creates a color from 8 bit channels, as in `#rrggbb` notation.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Returns the same color with the r,g,b values clamped between 0.0. and 1.0
    pub fn clamped(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// 8 bit channels.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let c = self.clamped();
        (
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        )
    }

    /// `#rrggbb` notation.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
}

/// Defines a mapping from an input value between 0.0 and 1.0 to a color.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    colors: Vec<(f32, Color)>,
}

impl ColorMap {
    /// Names accepted by [ColorMap::by_name].
    pub const NAMES: [&'static str; 7] = [
        "viridis",
        "Spectral",
        "Spectral_r",
        "terrain",
        "greys",
        "jet",
        "plasma",
    ];

    /// Makes a simple color map, that is a gradient between the two passed in colors.
    pub fn gradient(color_1: Color, color_2: Color) -> Self {
        ColorMap {
            colors: vec![(0.0, color_1), (1.0, color_2)],
        }
    }

    /// Makes a color map with equally sized gradients between the passed in colors.
    ///
    /// # Panics
    /// Panics, if less than two colors are given.
    pub fn equally_spaced(colors: &[Color]) -> Self {
        assert!(colors.len() >= 2);
        let nr_gradients = colors.len() as f32 - 1.0;
        let colors = colors
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, c)| (i as f32 / nr_gradients, c))
            .collect();
        ColorMap { colors }
    }

    /// Looks up one of the named presets.
    /// The names follow matplotlib, lower case variants are accepted as well.
    pub fn by_name(name: &str) -> Result<ColorMap, PlotError> {
        let cmap = match name {
            "viridis" => Self::viridis(),
            "Spectral" | "spectral" => Self::spectral(),
            "Spectral_r" | "spectral_r" => Self::spectral().reversed(),
            "terrain" => Self::terrain(),
            "greys" | "Greys" => Self::greys(),
            "jet" => Self::jet(),
            "plasma" => Self::plasma(),
            _ => {
                return Err(PlotError::UnknownColorMap {
                    name: name.to_string(),
                    valid: Self::NAMES.join(", "),
                })
            }
        };
        Ok(cmap)
    }

    /// The same color map, running from 1.0 to 0.0.
    pub fn reversed(&self) -> ColorMap {
        ColorMap {
            colors: self
                .colors
                .iter()
                .rev()
                .map(|&(value, color)| (1.0 - value, color))
                .collect(),
        }
    }

    /// Samples the color map at the given position.
    /// The value where the color map is sampled should be between 0.0 and 1.0.
    pub fn color_at(&self, value: f32) -> Color {
        let (min_val, min_color) = self.colors[0];
        if value <= min_val || value.is_nan() {
            return min_color;
        }

        for i in 0..self.colors.len() - 1 {
            let (left_val, left_color) = self.colors[i];
            let (right_val, right_color) = self.colors[i + 1];
            if left_val < value && value <= right_val {
                let f1 = (right_val - value) / (right_val - left_val);
                let f2 = (value - left_val) / (right_val - left_val);
                return Color {
                    r: f1 * left_color.r + f2 * right_color.r,
                    g: f1 * left_color.g + f2 * right_color.g,
                    b: f1 * left_color.b + f2 * right_color.b,
                };
            }
        }

        self.colors[self.colors.len() - 1].1
    }

    pub fn viridis() -> ColorMap {
        Self::equally_spaced(&[
            Color::rgb8(0x44, 0x01, 0x54),
            Color::rgb8(0x48, 0x28, 0x78),
            Color::rgb8(0x3e, 0x49, 0x89),
            Color::rgb8(0x31, 0x68, 0x8e),
            Color::rgb8(0x26, 0x82, 0x8e),
            Color::rgb8(0x1f, 0x9e, 0x89),
            Color::rgb8(0x35, 0xb7, 0x79),
            Color::rgb8(0x6e, 0xce, 0x58),
            Color::rgb8(0xb5, 0xde, 0x2b),
            Color::rgb8(0xfd, 0xe7, 0x25),
        ])
    }

    pub fn spectral() -> ColorMap {
        Self::equally_spaced(&[
            Color::rgb8(0x9e, 0x01, 0x42),
            Color::rgb8(0xd5, 0x3e, 0x4f),
            Color::rgb8(0xf4, 0x6d, 0x43),
            Color::rgb8(0xfd, 0xae, 0x61),
            Color::rgb8(0xfe, 0xe0, 0x8b),
            Color::rgb8(0xff, 0xff, 0xbf),
            Color::rgb8(0xe6, 0xf5, 0x98),
            Color::rgb8(0xab, 0xdd, 0xa4),
            Color::rgb8(0x66, 0xc2, 0xa5),
            Color::rgb8(0x32, 0x88, 0xbd),
            Color::rgb8(0x5e, 0x4f, 0xa2),
        ])
    }

    pub fn terrain() -> ColorMap {
        ColorMap {
            colors: vec![
                (0.0, Color::rgb8(0x33, 0x33, 0x99)),
                (0.15, Color::rgb8(0x00, 0x99, 0xff)),
                (0.25, Color::rgb8(0x00, 0xcc, 0x66)),
                (0.5, Color::rgb8(0xff, 0xff, 0x99)),
                (0.75, Color::rgb8(0x80, 0x5c, 0x54)),
                (1.0, Color::WHITE),
            ],
        }
    }

    pub fn greys() -> ColorMap {
        Self::gradient(Color::WHITE, Color::BLACK)
    }

    pub fn jet() -> ColorMap {
        ColorMap {
            colors: vec![
                (0.0, Color::rgb(0.0, 0.0, 0.5)),
                (0.125, Color::rgb(0.0, 0.0, 1.0)),
                (0.375, Color::rgb(0.0, 1.0, 1.0)),
                (0.625, Color::rgb(1.0, 1.0, 0.0)),
                (0.875, Color::rgb(1.0, 0.0, 0.0)),
                (1.0, Color::rgb(0.5, 0.0, 0.0)),
            ],
        }
    }

    pub fn plasma() -> ColorMap {
        Self::equally_spaced(&[
            Color::rgb8(0x0d, 0x08, 0x87),
            Color::rgb8(0x46, 0x03, 0x9f),
            Color::rgb8(0x72, 0x01, 0xa8),
            Color::rgb8(0x9c, 0x17, 0x9e),
            Color::rgb8(0xbd, 0x37, 0x86),
            Color::rgb8(0xd8, 0x57, 0x6b),
            Color::rgb8(0xed, 0x79, 0x53),
            Color::rgb8(0xfb, 0x9f, 0x3a),
            Color::rgb8(0xfd, 0xca, 0x26),
            Color::rgb8(0xf0, 0xf9, 0x21),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, ColorMap};
    use crate::plot::PlotError;

    #[test]
    fn gradient_sampling() {
        let cmap = ColorMap::gradient(Color::BLACK, Color::WHITE);
        assert_eq!(cmap.color_at(-1.0), Color::BLACK);
        assert_eq!(cmap.color_at(0.5), Color::rgb(0.5, 0.5, 0.5));
        assert_eq!(cmap.color_at(2.0), Color::WHITE);
        assert_eq!(cmap.color_at(f32::NAN), Color::BLACK);
    }

    #[test]
    fn reversed() {
        let cmap = ColorMap::spectral();
        let reversed = cmap.reversed();
        assert_eq!(reversed.color_at(0.0), cmap.color_at(1.0));
        assert_eq!(reversed.color_at(1.0), cmap.color_at(0.0));
        assert_eq!(
            ColorMap::by_name("Spectral_r").unwrap().color_at(0.0).to_hex(),
            "#5e4fa2"
        );
    }

    #[test]
    fn presets() {
        for name in ColorMap::NAMES {
            assert!(ColorMap::by_name(name).is_ok(), "{}", name);
        }
        assert_eq!(
            ColorMap::by_name("viridis").unwrap().color_at(0.0).to_hex(),
            "#440154"
        );
        assert!(matches!(
            ColorMap::by_name("rainbow"),
            Err(PlotError::UnknownColorMap { .. })
        ));
    }
}
