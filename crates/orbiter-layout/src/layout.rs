//! The orbit layout algorithm.
//!
//! Letters are spread evenly around one full turn. Each one sits on a circle
//! of `orbit_radius`, is lifted or dropped by a fixed sinusoid so the left side
//! of the ring dips while the right side rises, tilted by a pitch/roll pair
//! that varies smoothly with its angle, and finally pushed outward so glyphs
//! clear the planet surface.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{EulerRot, Quat, Vec3};

use crate::error::LayoutError;
use crate::glyph::{GlyphExtruder, GlyphMesh};

/// Amplitude of the vertical warp in world units.
pub const VERTICAL_AMPLITUDE: f32 = 12.0;
/// Scale (and sign) applied to the vertical warp.
pub const VERTICAL_SCALE: f32 = -0.6;
/// Fraction of the tilt applied as pitch (rotation about X).
pub const PITCH_FACTOR: f32 = 0.6;
/// Fraction of the tilt applied as roll (rotation about Z).
pub const ROLL_FACTOR: f32 = 0.08;
/// Radial distance every glyph is pushed outward.
pub const PUSH_OUT: f32 = 4.0;
/// Extra push for glyphs at even character indices.
pub const EVEN_PUSH_BONUS: f32 = 0.5;

/// Inputs of the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParams {
    /// Text repeated around the orbit.
    pub word: String,
    /// Number of repetitions.
    pub repeats: u32,
    /// Radius of the orbit circle.
    pub orbit_radius: f32,
    /// Tilt in degrees (taken modulo 360).
    pub tilt_deg: f32,
    /// Extrusion depth of every glyph.
    pub letter_depth: f32,
}

/// Placement of one letter on the orbit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterTransform {
    /// The glyph character (may be whitespace).
    pub character: char,
    /// Position in generation order, unique in `0..total`.
    pub sequence_index: usize,
    /// Which repetition of the word this letter belongs to.
    pub repeat_index: usize,
    /// Index of the character inside the word.
    pub char_index: usize,
    /// Angle around the Y axis, `sequence_index * TAU / total`.
    pub base_angle: f32,
    /// Position relative to the orbit group.
    pub position: Vec3,
    /// Rotation about X in radians.
    pub pitch: f32,
    /// Rotation about Z in radians.
    pub roll: f32,
}

impl LetterTransform {
    /// Layout-time orientation (pitch then roll, no yaw).
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, 0.0, self.roll)
    }
}

/// A letter transform together with its recentered glyph mesh.
#[derive(Clone, Debug)]
pub struct PlacedGlyph {
    pub transform: LetterTransform,
    pub mesh: GlyphMesh,
    /// Translation applied to the raw extrusion to center it.
    pub centering: Vec3,
}

impl LayoutParams {
    fn validate(&self) -> Result<usize, LayoutError> {
        let word_len = self.word.chars().count();
        let total = word_len
            .checked_mul(self.repeats as usize)
            .filter(|&total| total > 0)
            .ok_or(LayoutError::InvalidLayout {
                word_len,
                repeats: self.repeats,
            })?;
        if !(self.orbit_radius > 0.0) || !self.orbit_radius.is_finite() {
            return Err(LayoutError::InvalidRadius(self.orbit_radius));
        }
        if !(self.letter_depth >= 0.0) {
            return Err(LayoutError::InvalidDepth(self.letter_depth));
        }
        Ok(total)
    }
}

/// Reduce a tilt into `[0, 360)` degrees and convert it to radians.
fn tilt_radians(tilt_deg: f32) -> f32 {
    tilt_deg.rem_euclid(360.0).to_radians()
}

/// Compute the transform of every letter, in generation order.
///
/// The result has exactly `chars(word) * repeats` entries; the first letter of
/// the first repetition comes first.
pub fn compute_layout(params: &LayoutParams) -> Result<Vec<LetterTransform>, LayoutError> {
    let total = params.validate()?;
    let chars: Vec<char> = params.word.chars().collect();
    let word_len = chars.len();
    let step = TAU / total as f32;
    let tilt = tilt_radians(params.tilt_deg);

    let letters = (0..total)
        .map(|sequence_index| {
            let repeat_index = sequence_index / word_len;
            let char_index = sequence_index % word_len;
            let angle = sequence_index as f32 * step;
            let (sin, cos) = angle.sin_cos();

            let y = (angle + FRAC_PI_2).sin() * VERTICAL_AMPLITUDE * VERTICAL_SCALE;
            let push = PUSH_OUT
                + if char_index % 2 == 0 {
                    EVEN_PUSH_BONUS
                } else {
                    0.0
                };
            let radial = Vec3::new(sin, 0.0, cos);
            let position = Vec3::new(sin * params.orbit_radius, y, cos * params.orbit_radius)
                + radial * push;

            LetterTransform {
                character: chars[char_index],
                sequence_index,
                repeat_index,
                char_index,
                base_angle: angle,
                position,
                pitch: sin * tilt * PITCH_FACTOR,
                roll: cos * tilt * ROLL_FACTOR,
            }
        })
        .collect();

    Ok(letters)
}

/// Compute the layout and extrude a recentered glyph for every letter.
pub fn layout_glyphs(
    params: &LayoutParams,
    extruder: &dyn GlyphExtruder,
) -> Result<Vec<PlacedGlyph>, LayoutError> {
    let transforms = compute_layout(params)?;
    Ok(transforms
        .into_iter()
        .map(|transform| {
            let mut mesh = extruder.extrude(transform.character, params.letter_depth);
            let centering = mesh.recenter();
            PlacedGlyph {
                transform,
                mesh,
                centering,
            }
        })
        .collect())
}
