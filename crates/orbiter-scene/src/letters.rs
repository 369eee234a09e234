//! The letter group: one uploaded glyph per placed letter, spun as a unit.
//!
//! A group is built completely before it is installed. Letters own their
//! surface meshes, so dropping a group (or a half-built one when an upload
//! fails) releases every mesh it holds.

use glam::{Mat4, Quat, Vec3};
use orbiter_layout::{GlyphExtruder, LayoutParams, LetterTransform, layout_glyphs};

use crate::billboard::local_facing;
use crate::color::Rgb;
use crate::error::SceneError;
use crate::frame::LetterDraw;
use crate::surface::RenderSurface;

/// One placed character and its surface resources.
#[derive(Debug)]
pub struct Letter<M> {
    pub transform: LetterTransform,
    /// Colour the letter's material was created with.
    pub base_color: Rgb,
    /// Colour drawn this frame.
    pub color: Rgb,
    /// Camera-facing rotation relative to the group.
    pub facing: Quat,
    mesh: M,
}

impl<M> Letter<M> {
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// Model matrix in world space under a group rotated by `group`.
    ///
    /// The orientation is the camera facing alone; the layout pitch and roll
    /// are replaced once the letter has been billboarded.
    pub fn model_matrix(&self, group: Quat) -> Mat4 {
        Mat4::from_quat(group) * Mat4::from_rotation_translation(self.facing, self.transform.position)
    }
}

/// Ordered letters plus the group's aggregate yaw.
#[derive(Debug)]
pub struct LetterGroup<M> {
    letters: Vec<Letter<M>>,
    yaw: f32,
}

impl<M> Default for LetterGroup<M> {
    fn default() -> Self {
        Self {
            letters: Vec::new(),
            yaw: 0.0,
        }
    }
}

impl<M> LetterGroup<M> {
    /// Lay out, extrude and upload every letter of `params`.
    ///
    /// All-or-nothing: if any upload fails, meshes already uploaded are
    /// dropped with the partial group and the error is returned.
    pub fn build<S>(
        params: &LayoutParams,
        extruder: &dyn GlyphExtruder,
        color: Rgb,
        surface: &mut S,
    ) -> Result<Self, SceneError>
    where
        S: RenderSurface<LetterMesh = M>,
    {
        let placed = layout_glyphs(params, extruder)?;
        let mut letters = Vec::with_capacity(placed.len());
        for glyph in placed {
            let mesh = surface.upload_letter(&glyph.mesh)?;
            letters.push(Letter {
                transform: glyph.transform,
                base_color: color,
                color,
                facing: Quat::IDENTITY,
                mesh,
            });
        }
        log::debug!("Built letter group of {} letters", letters.len());
        Ok(Self { letters, yaw: 0.0 })
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> &[Letter<M>] {
        &self.letters
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// The group's rotation about world Y.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Set every letter's colour from its index.
    pub fn recolor(&mut self, mut color_at: impl FnMut(usize) -> Rgb) {
        for (i, letter) in self.letters.iter_mut().enumerate() {
            letter.color = color_at(i);
        }
    }

    /// Turn every letter to face `target` given the current group yaw.
    pub fn billboard(&mut self, target: Vec3) {
        let group = self.rotation();
        for letter in &mut self.letters {
            letter.facing = local_facing(group, letter.transform.position, target);
        }
    }

    /// Draw commands for every letter, in generation order.
    pub fn draws(&self) -> Vec<LetterDraw<'_, M>> {
        let group = self.rotation();
        self.letters
            .iter()
            .map(|letter| LetterDraw {
                mesh: &letter.mesh,
                model: letter.model_matrix(group),
                color: letter.color,
            })
            .collect()
    }

    /// Drop every letter, releasing its mesh. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.letters.len();
        self.letters.clear();
        released
    }
}
