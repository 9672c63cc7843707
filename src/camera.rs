//! Pinhole camera description and projection math.

use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics over a fixed sensor resolution.
///
/// `width` and `height` fix the size of every GPU render target for the
/// lifetime of a [`crate::visualizer::DepthVisualizer`]; targets are never
/// resized after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Sensor width in pixels.
    pub width: u32,
    /// Sensor height in pixels.
    pub height: u32,
    /// Focal length along x, in pixels.
    pub fx: f32,
    /// Focal length along y, in pixels.
    pub fy: f32,
    /// Principal point x, in pixels.
    pub cx: f32,
    /// Principal point y, in pixels.
    pub cy: f32,
}

impl CameraIntrinsics {
    /// Projection matrix mapping camera-space points into clip space for
    /// this camera, with the given near/far planes.
    ///
    /// The X/Y terms come straight from the pixel-space intrinsics and the
    /// Y term is negated, so the sensor's top-left pixel origin lands in
    /// GL's bottom-left clip-space convention.
    ///
    /// The render pass does not consume this matrix - the fragment stage
    /// reconstructs geometry from the intrinsics uniform block instead. It
    /// is provided for hosts that rasterize actual geometry against the
    /// same camera.
    #[must_use]
    pub fn projection_matrix(&self, near_clip: f32, far_clip: f32) -> Mat4 {
        let w = self.width as f32;
        let h = self.height as f32;
        Mat4::from_cols(
            Vec4::new(2.0 * self.fx / w, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -2.0 * self.fy / h, 0.0, 0.0),
            Vec4::new(
                (2.0 * self.cx - w) / w,
                (h - 2.0 * self.cy) / h,
                -(far_clip + near_clip) / (near_clip - far_clip),
                1.0,
            ),
            Vec4::new(
                0.0,
                0.0,
                2.0 * far_clip * near_clip / (near_clip - far_clip),
                0.0,
            ),
        )
    }
}

/// Clipping planes and the depth-validity bound for the render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Near clipping plane distance. Must be less than `far_clip`.
    pub near_clip: f32,
    /// Far clipping plane distance.
    pub far_clip: f32,
    /// Upper bound on reconstructed depth; fragments farther away are
    /// discarded by the shading stage.
    pub max_dist: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> CameraIntrinsics {
        CameraIntrinsics {
            width: 640,
            height: 480,
            fx: 525.0,
            fy: 525.0,
            cx: 320.0,
            cy: 240.0,
        }
    }

    #[test]
    fn projection_matches_pinhole_convention() {
        let m = test_camera().projection_matrix(0.1, 5.0);

        let row0 = m.row(0);
        assert!((row0.x - 2.0 * 525.0 / 640.0).abs() < 1e-6);
        assert_eq!(row0.y, 0.0);
        assert_eq!(row0.z, 0.0); // cx centered: (2*320-640)/640
        assert_eq!(row0.w, 0.0);

        let row1 = m.row(1);
        assert_eq!(row1.x, 0.0);
        assert!((row1.y + 2.0 * 525.0 / 480.0).abs() < 1e-6);
        assert_eq!(row1.z, 0.0); // cy centered: (480-2*240)/480
        assert_eq!(row1.w, 0.0);

        let row2 = m.row(2);
        assert!((row2.z - 5.1 / 4.9).abs() < 1e-6);
        assert!((row2.w - 1.0 / -4.9).abs() < 1e-6);

        assert_eq!(m.row(3), Vec4::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn off_center_principal_point_shifts_third_column() {
        let cam = CameraIntrinsics {
            cx: 310.0,
            cy: 250.0,
            ..test_camera()
        };
        let m = cam.projection_matrix(0.1, 5.0);
        assert!((m.row(0).z - (2.0 * 310.0 - 640.0) / 640.0).abs() < 1e-6);
        assert!((m.row(1).z - (480.0 - 2.0 * 250.0) / 480.0).abs() < 1e-6);
    }

    #[test]
    fn intrinsics_deserialize_from_config_json() {
        let cam: CameraIntrinsics = serde_json::from_str(
            r#"{"width":640,"height":480,"fx":525.0,"fy":525.0,"cx":320.0,"cy":240.0}"#,
        )
        .unwrap();
        assert_eq!(cam, test_camera());
    }
}
