//! Config-driven orchestration: iterate a frame-id range, decode depth
//! frames, render, and encode the two outputs.
//!
//! The GL context itself stays the host's job; `run` only needs it to be
//! current on the calling thread.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::{CameraIntrinsics, ClipConfig};
use crate::error::DepthVizError;
use crate::gpu::program::ShaderPaths;
use crate::options::Options;
use crate::visualizer::DepthVisualizer;

/// One batch run, deserialized from a JSON config document.
///
/// Path patterns use a printf-style `%d` / `%0Nd` placeholder for the
/// frame id, e.g. `"depth/%04d.png"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pattern for input depth frames (16-bit single-channel images).
    pub in_path_pattern: String,
    /// Pattern for Phong output files.
    pub phong_out_path_pattern: String,
    /// Pattern for normal-map output files.
    pub normal_out_path_pattern: String,
    /// Vertex shader source path.
    pub vert_shader_path: PathBuf,
    /// Optional geometry shader source path; absent skips the stage.
    #[serde(default)]
    pub geom_shader_path: Option<PathBuf>,
    /// Fragment shader source path.
    pub frag_shader_path: PathBuf,
    /// Camera intrinsics; also fixes the output resolution.
    pub camera: CameraIntrinsics,
    /// Near clipping plane distance.
    pub near_clip: f32,
    /// Far clipping plane distance.
    pub far_clip: f32,
    /// Upper bound on reconstructed depth.
    pub max_dist: f32,
    /// First frame id (inclusive).
    pub start_frame: i32,
    /// Last frame id (inclusive).
    pub end_frame: i32,
    /// Shading options; omitted sections keep the documented defaults.
    #[serde(default)]
    pub options: Options,
}

impl BatchConfig {
    /// Load a run description from a JSON file.
    ///
    /// # Errors
    ///
    /// [`DepthVizError::Io`] if the file cannot be read,
    /// [`DepthVizError::ConfigParse`] if the document does not match the
    /// schema.
    pub fn load(path: &Path) -> Result<Self, DepthVizError> {
        let content = fs::read_to_string(path).map_err(DepthVizError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| DepthVizError::ConfigParse(e.to_string()))
    }

    fn shader_paths(&self) -> ShaderPaths {
        // An empty geometry path means "no geometry stage", same as an
        // absent field.
        let geometry = self
            .geom_shader_path
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
            .cloned();
        ShaderPaths {
            vertex: self.vert_shader_path.clone(),
            geometry,
            fragment: self.frag_shader_path.clone(),
        }
    }

    const fn clip(&self) -> ClipConfig {
        ClipConfig {
            near_clip: self.near_clip,
            far_clip: self.far_clip,
            max_dist: self.max_dist,
        }
    }
}

/// Expand every printf-style `%d` / `%0Nd` placeholder in `pattern` with
/// `frame`. `%%` yields a literal percent sign; unrecognized sequences
/// pass through unchanged.
#[must_use]
pub fn format_frame_path(pattern: &str, frame: i32) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(stripped) = tail.strip_prefix('%') {
            out.push('%');
            rest = stripped;
            continue;
        }

        let digits = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        if tail[digits..].starts_with('d') {
            let width: usize = tail[..digits].parse().unwrap_or(0);
            if tail[..digits].starts_with('0') {
                let _ = write!(out, "{frame:0width$}");
            } else {
                let _ = write!(out, "{frame:width$}");
            }
            rest = &tail[digits + 1..];
        } else {
            out.push('%');
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

/// Render every frame in the configured range.
///
/// Constructs one [`DepthVisualizer`], drives it over
/// `start_frame..=end_frame`, and releases it before returning - on
/// failure as well, so no GPU object outlives the run.
///
/// # Errors
///
/// Construction errors from [`DepthVisualizer::new`];
/// [`DepthVizError::Image`] if a frame fails to decode or an output fails
/// to encode; [`DepthVizError::OversizeInput`] if a decoded frame exceeds
/// the configured resolution.
pub fn run(
    gl: &glow::Context,
    config: &BatchConfig,
) -> Result<(), DepthVizError> {
    let mut visualizer = DepthVisualizer::new(
        gl,
        config.camera,
        &config.shader_paths(),
        config.clip(),
        &config.options,
    )?;
    let result = run_frames(gl, &mut visualizer, config);
    visualizer.destroy(gl);
    result
}

fn run_frames(
    gl: &glow::Context,
    visualizer: &mut DepthVisualizer,
    config: &BatchConfig,
) -> Result<(), DepthVizError> {
    for frame in config.start_frame..=config.end_frame {
        let in_path = format_frame_path(&config.in_path_pattern, frame);
        let depth = image::open(&in_path)?.to_luma16();

        let (phong, normal) = visualizer.visualize(gl, &depth)?;

        phong
            .save(format_frame_path(&config.phong_out_path_pattern, frame))?;
        normal
            .save(format_frame_path(&config.normal_out_path_pattern, frame))?;

        log::info!("frame {frame:04} is done");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_padded_placeholder_expands_to_fixed_width() {
        assert_eq!(format_frame_path("depth/%04d.png", 7), "depth/0007.png");
        assert_eq!(format_frame_path("depth/%04d.png", 12345), "depth/12345.png");
    }

    #[test]
    fn bare_placeholder_uses_no_padding() {
        assert_eq!(format_frame_path("out/%d.png", 42), "out/42.png");
    }

    #[test]
    fn literal_percent_and_unknown_sequences_survive() {
        assert_eq!(format_frame_path("a%%b/%04d.png", 3), "a%b/0003.png");
        assert_eq!(format_frame_path("100%s/%d.png", 3), "100%s/3.png");
    }

    #[test]
    fn pattern_without_placeholder_is_returned_verbatim() {
        assert_eq!(format_frame_path("static.png", 9), "static.png");
    }

    #[test]
    fn every_placeholder_receives_the_frame_id() {
        assert_eq!(
            format_frame_path("f%02d/depth_%04d.png", 5),
            "f05/depth_0005.png"
        );
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: BatchConfig = serde_json::from_str(
            r#"{
                "in_path_pattern": "data/depth/%04d.png",
                "phong_out_path_pattern": "out/phong/%04d.png",
                "normal_out_path_pattern": "out/normal/%04d.png",
                "vert_shader_path": "shaders/depth.vert",
                "frag_shader_path": "shaders/depth.frag",
                "camera": {
                    "width": 640, "height": 480,
                    "fx": 525.0, "fy": 525.0, "cx": 320.0, "cy": 240.0
                },
                "near_clip": 0.1,
                "far_clip": 5.0,
                "max_dist": 3.0,
                "start_frame": 0,
                "end_frame": 99
            }"#,
        )
        .unwrap();

        assert_eq!(config.camera.width, 640);
        assert_eq!(config.geom_shader_path, None);
        assert_eq!(config.options, Options::default());
        assert_eq!(
            format_frame_path(&config.in_path_pattern, 3),
            "data/depth/0003.png"
        );
    }

    #[test]
    fn empty_geometry_path_skips_the_stage() {
        let mut config: BatchConfig = serde_json::from_str(
            r#"{
                "in_path_pattern": "d/%d.png",
                "phong_out_path_pattern": "p/%d.png",
                "normal_out_path_pattern": "n/%d.png",
                "vert_shader_path": "v.vert",
                "geom_shader_path": "",
                "frag_shader_path": "f.frag",
                "camera": {
                    "width": 320, "height": 240,
                    "fx": 300.0, "fy": 300.0, "cx": 160.0, "cy": 120.0
                },
                "near_clip": 0.2,
                "far_clip": 8.0,
                "max_dist": 4.0,
                "start_frame": 0,
                "end_frame": 0
            }"#,
        )
        .unwrap();
        assert_eq!(config.shader_paths().geometry, None);

        config.geom_shader_path = Some(PathBuf::from("g.geom"));
        assert_eq!(
            config.shader_paths().geometry,
            Some(PathBuf::from("g.geom"))
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let config: BatchConfig = serde_json::from_str(
            r#"{
                "in_path_pattern": "d/%d.png",
                "phong_out_path_pattern": "p/%d.png",
                "normal_out_path_pattern": "n/%d.png",
                "vert_shader_path": "v.vert",
                "geom_shader_path": "g.geom",
                "frag_shader_path": "f.frag",
                "camera": {
                    "width": 320, "height": 240,
                    "fx": 300.0, "fy": 300.0, "cx": 160.0, "cy": 120.0
                },
                "near_clip": 0.2,
                "far_clip": 8.0,
                "max_dist": 4.0,
                "start_frame": 1,
                "end_frame": 1
            }"#,
        )
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
