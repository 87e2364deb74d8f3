//! Mouse-driven scene orientation and the fixed viewing setup.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Viewing volume
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    Orthographic,
    Perspective,
}

impl Projection {
    pub fn toggled(self) -> Self {
        match self {
            Projection::Orthographic => Projection::Perspective,
            Projection::Perspective => Projection::Orthographic,
        }
    }
}

/// What a mouse drag does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drag {
    /// Left button: rotate about X and Y
    Rotate,
    /// Middle button: uniform scale
    Scale,
}

/// User rotation and scale of the whole scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    /// Rotation about X (degrees)
    pub xrot: f32,
    /// Rotation about Y (degrees)
    pub yrot: f32,
    pub scale: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            xrot: 0.0,
            yrot: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewState {
    /// Apply a drag of `(dx, dy)` pixels
    pub fn drag(&mut self, drag: Drag, dx: f32, dy: f32, config: &RenderConfig) {
        match drag {
            Drag::Rotate => {
                self.xrot += config.angle_factor * dy;
                self.yrot += config.angle_factor * dx;
            }
            Drag::Scale => {
                self.scale += config.scale_factor * (dx - dy);
                // Keep the scene from turning inside out or vanishing
                self.scale = self.scale.max(config.min_scale);
            }
        }
    }

    /// Scene model matrix `Ry(yrot) * Rx(xrot) * S(scale)`
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.yrot.to_radians())
            * Mat4::from_rotation_x(self.xrot.to_radians())
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// Eye at `config.eye` looking at the origin, +Y up
pub fn view_matrix(config: &RenderConfig) -> Mat4 {
    Mat4::look_at_rh(Vec3::from_array(config.eye), Vec3::ZERO, Vec3::Y)
}

/// Square (aspect 1) projection with wgpu depth range
pub fn projection_matrix(projection: Projection, config: &RenderConfig) -> Mat4 {
    match projection {
        Projection::Orthographic => {
            let e = config.ortho_half_extent;
            Mat4::orthographic_rh(-e, e, -e, e, config.near_plane, config.far_plane)
        }
        Projection::Perspective => Mat4::perspective_rh(
            config.fov_degrees.to_radians(),
            1.0,
            config.near_plane,
            config.far_plane,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndc(m: Mat4, p: Vec3) -> Vec3 {
        m.project_point3(p)
    }

    fn view_proj(view: &ViewState, projection: Projection, config: &RenderConfig) -> Mat4 {
        projection_matrix(projection, config) * view_matrix(config) * view.model_matrix()
    }

    #[test]
    fn test_left_drag_rotates() {
        let config = RenderConfig::default();
        let mut view = ViewState::default();

        view.drag(Drag::Rotate, 10.0, -4.0, &config);

        assert_eq!(view.yrot, 10.0);
        assert_eq!(view.xrot, -4.0);
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn test_middle_drag_scales_with_floor() {
        let config = RenderConfig::default();
        let mut view = ViewState::default();

        view.drag(Drag::Scale, 20.0, -20.0, &config);
        assert!((view.scale - 1.2).abs() < 1e-6);

        view.drag(Drag::Scale, -1000.0, 1000.0, &config);
        assert_eq!(view.scale, config.min_scale);
    }

    #[test]
    fn test_orthographic_maps_half_extent_to_edge() {
        let config = RenderConfig::default();
        let m = view_proj(&ViewState::default(), Projection::Orthographic, &config);

        let edge = ndc(m, Vec3::new(3.0, -3.0, 0.0));
        assert!((edge.x - 1.0).abs() < 1e-5);
        assert!((edge.y + 1.0).abs() < 1e-5);
        assert!(edge.z > 0.0 && edge.z < 1.0);
    }

    #[test]
    fn test_perspective_shrinks_with_distance() {
        let config = RenderConfig::default();
        let m = view_proj(&ViewState::default(), Projection::Perspective, &config);

        // 90 degree FOV: x / distance
        let near = ndc(m, Vec3::new(1.0, 0.0, 0.0));
        let far = ndc(m, Vec3::new(1.0, 0.0, -3.0));
        assert!((near.x - 1.0 / 3.0).abs() < 1e-5);
        assert!((far.x - 1.0 / 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_model_rotation_order() {
        let view = ViewState {
            xrot: 90.0,
            yrot: 90.0,
            scale: 2.0,
        };

        // Scale, then X rotation takes +Y to +Z, then Y rotation takes +Z to +X
        let p = view.model_matrix().transform_point3(Vec3::Y);
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_projection_toggle() {
        assert_eq!(Projection::default(), Projection::Orthographic);
        assert_eq!(Projection::Orthographic.toggled(), Projection::Perspective);
        assert_eq!(Projection::Perspective.toggled(), Projection::Orthographic);
    }
}
