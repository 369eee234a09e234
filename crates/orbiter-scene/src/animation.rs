//! Animation state carried across frames and the hue arithmetic applied to it.

use orbiter_config::SceneOptions;

/// Mutable per-frame state of the orbiting text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    /// Accumulated yaw of the letter group, in radians.
    pub group_yaw: f32,
    /// Global hue in `[0, 1)`.
    pub global_hue: f32,
    /// Number of completed ticks.
    pub frame: u64,
}

impl AnimationState {
    /// Fresh state starting at `initial_hue`.
    pub fn new(initial_hue: f32) -> Self {
        Self {
            group_yaw: 0.0,
            global_hue: wrap_hue(initial_hue),
            frame: 0,
        }
    }

    /// Rotate the group by `speed * dt`.
    pub fn advance_yaw(&mut self, speed: f32, dt: f32) {
        self.group_yaw += speed * dt;
    }

    /// Move the global hue forward by `increment * dt`, wrapping into `[0, 1)`.
    pub fn advance_hue(&mut self, increment: f32, dt: f32) {
        self.global_hue = wrap_hue(self.global_hue + increment * dt);
    }

    /// Hue of letter `index` for the current global hue.
    pub fn letter_hue(&self, index: usize, options: &SceneOptions) -> f32 {
        letter_hue(
            self.global_hue,
            index,
            options.colour_letters,
            options.colour_letters_offset,
        )
    }
}

/// Wrap any finite hue into `[0, 1)`.
///
/// Non-finite input resets to 0 so one bad frame cannot poison every later one.
pub fn wrap_hue(hue: f32) -> f32 {
    if !hue.is_finite() {
        return 0.0;
    }
    let wrapped = hue.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Hue for letter `index`: the global hue plus a per-letter gradient of
/// `index * colour_letters / offset`.
///
/// A non-positive `offset` disables the gradient.
pub fn letter_hue(global_hue: f32, index: usize, colour_letters: f32, offset: f32) -> f32 {
    let gradient = if offset > 0.0 {
        index as f32 * (colour_letters / offset)
    } else {
        0.0
    };
    wrap_hue(global_hue + gradient)
}
