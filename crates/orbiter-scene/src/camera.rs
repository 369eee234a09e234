//! Perspective camera for the orbit view.

use glam::{Mat4, Quat, Vec3};

use crate::billboard::rotation_from_z_axis;

/// Where the camera sits when the scene starts.
pub const ORBIT_VIEW_POSITION: Vec3 = Vec3::new(0.0, 20.0, 130.0);

/// Roll applied after aiming at the origin, matching the earth's axial tilt.
pub const ORBIT_VIEW_ROLL_DEG: f32 = -23.5;

/// A camera that generates view and projection matrices for rendering.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion. The camera looks down its local -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height. May be infinite or NaN after a degenerate resize.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// The fixed start-up view: 45 degree lens at `(0, 20, 130)` aimed at the
    /// origin, then rolled by the axial tilt.
    pub fn orbit_view(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: ORBIT_VIEW_POSITION,
            ..Self::default()
        };
        camera.look_at(Vec3::ZERO);
        camera.rotation =
            (camera.rotation * Quat::from_rotation_z(ORBIT_VIEW_ROLL_DEG.to_radians())).normalize();
        camera.set_aspect_ratio(width as f32, height as f32);
        camera
    }

    /// Aim the camera at `target`, keeping world +Y as up.
    pub fn look_at(&mut self, target: Vec3) {
        self.rotation = rotation_from_z_axis(self.position - target, Vec3::Y);
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Perspective projection with reverse-Z: the near plane maps to depth 1
    /// and the far plane to depth 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Update the aspect ratio. Zero sizes are stored as-is; the resulting
    /// matrix may hold infinities until the next non-degenerate resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let forward = Camera::default().forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_orbit_view_looks_at_origin() {
        let camera = Camera::orbit_view(1280, 720);
        let to_origin = (Vec3::ZERO - camera.position).normalize();
        assert!((camera.forward() - to_origin).length() < 1e-5);
        assert_eq!(camera.position, ORBIT_VIEW_POSITION);
    }

    #[test]
    fn test_orbit_view_is_rolled() {
        let camera = Camera::orbit_view(1280, 720);
        // Unrolled, the camera's up has no x component.
        assert!(camera.up().x.abs() > 0.3);
        let origin = camera.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.x / origin.w).abs() < 1e-4);
        assert!((origin.y / origin.w).abs() < 1e-4);
    }

    #[test]
    fn test_reverse_z_depth() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-4);
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_resize_does_not_panic() {
        let mut camera = Camera::orbit_view(0, 0);
        assert!(camera.aspect_ratio.is_nan());
        let _ = camera.view_projection_matrix();
        camera.set_aspect_ratio(800.0, 0.0);
        assert!(camera.aspect_ratio.is_infinite());
        let _ = camera.view_projection_matrix();
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let camera = Camera::orbit_view(800, 600);
        let reconstructed = camera.view_matrix().inverse().col(3).truncate();
        assert!((reconstructed - camera.position).length() < 1e-3);
    }
}
