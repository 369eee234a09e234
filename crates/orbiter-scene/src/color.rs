//! Colour values and HSL conversion.

use orbiter_config::parse_hex_color;

/// An sRGB colour with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels.
    pub fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#RRGGBB`.
    pub fn from_hex(value: &str) -> Option<Self> {
        parse_hex_color(value).map(Self::from_bytes)
    }

    /// Convert hue/saturation/lightness to RGB.
    ///
    /// The hue wraps modulo 1; saturation and lightness are clamped to `[0, 1]`.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::new(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        Self::new(
            hue_to_channel(q, p, h + 1.0 / 3.0),
            hue_to_channel(q, p, h),
            hue_to_channel(q, p, h - 1.0 / 3.0),
        )
    }

    /// sRGB to linear, for shading in linear space.
    pub fn to_linear(self) -> Self {
        fn channel(c: f32) -> f32 {
            if c < 0.04045 {
                c * 0.0773993808
            } else {
                (c * 0.9478672986 + 0.0521327014).powf(2.4)
            }
        }
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
