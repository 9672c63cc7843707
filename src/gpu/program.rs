//! Shader program construction: per-stage compile, link, diagnostics.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glow::HasContext;

use crate::error::DepthVizError;

/// Characters of a compile/link info log kept in errors.
const MAX_INFO_LOG_CHARS: usize = 2048;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage (required).
    Vertex,
    /// Geometry stage (optional).
    Geometry,
    /// Fragment stage (required).
    Fragment,
}

impl ShaderStage {
    const fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Geometry => glow::GEOMETRY_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "VERTEX",
            Self::Geometry => "GEOMETRY",
            Self::Fragment => "FRAGMENT",
        })
    }
}

/// Source file locations for the stages of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    /// Vertex stage source path.
    pub vertex: PathBuf,
    /// Optional geometry stage source path; `None` skips the stage
    /// entirely (no compile attempt, no attachment).
    pub geometry: Option<PathBuf>,
    /// Fragment stage source path.
    pub fragment: PathBuf,
}

/// A linked shader program. Move-only; released via [`Self::destroy`].
#[derive(Debug)]
pub struct ShaderProgram {
    raw: glow::NativeProgram,
}

impl ShaderProgram {
    /// Read, compile, and link the configured stages into one program.
    ///
    /// All-or-nothing: on any failure every intermediate shader object and
    /// the program itself are deleted before the error is returned, so no
    /// partially linked program is ever left allocated.
    ///
    /// # Errors
    ///
    /// [`DepthVizError::ShaderIo`] if a stage source cannot be read,
    /// [`DepthVizError::ShaderCompile`] with the failing stage and its
    /// truncated diagnostic, [`DepthVizError::ShaderLink`] on link failure,
    /// [`DepthVizError::GlAllocation`] if the driver refuses an object.
    pub fn from_paths(
        gl: &glow::Context,
        paths: &ShaderPaths,
    ) -> Result<Self, DepthVizError> {
        let mut stages = vec![(ShaderStage::Vertex, paths.vertex.as_path())];
        if let Some(geometry) = paths.geometry.as_deref() {
            stages.push((ShaderStage::Geometry, geometry));
        }
        stages.push((ShaderStage::Fragment, paths.fragment.as_path()));

        let mut shaders = Vec::with_capacity(stages.len());
        for (stage, path) in stages {
            match compile_stage(gl, stage, path) {
                Ok(shader) => shaders.push(shader),
                Err(e) => {
                    unsafe {
                        for shader in shaders {
                            gl.delete_shader(shader);
                        }
                    }
                    return Err(e);
                }
            }
        }

        unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(msg) => {
                    for shader in shaders {
                        gl.delete_shader(shader);
                    }
                    return Err(DepthVizError::GlAllocation(format!(
                        "create_program: {msg}"
                    )));
                }
            };
            for &shader in &shaders {
                gl.attach_shader(program, shader);
            }
            gl.link_program(program);
            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }
            if !gl.get_program_link_status(program) {
                let log = truncate_log(gl.get_program_info_log(program));
                gl.delete_program(program);
                return Err(DepthVizError::ShaderLink { log });
            }
            Ok(Self { raw: program })
        }
    }

    /// Make this program current for subsequent draws.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.raw)) };
    }

    /// Delete the program object. The creating context must be current.
    pub fn destroy(self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.raw) };
    }
}

fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    path: &Path,
) -> Result<glow::NativeShader, DepthVizError> {
    let source = fs::read_to_string(path)
        .map_err(|source| DepthVizError::ShaderIo { stage, source })?;
    unsafe {
        let shader = gl.create_shader(stage.gl_type()).map_err(|msg| {
            DepthVizError::GlAllocation(format!("create_shader({stage}): {msg}"))
        })?;
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = truncate_log(gl.get_shader_info_log(shader));
            gl.delete_shader(shader);
            return Err(DepthVizError::ShaderCompile { stage, log });
        }
        Ok(shader)
    }
}

/// Cap an info log at [`MAX_INFO_LOG_CHARS`] characters (characters, not
/// bytes, so the cut never splits a code point).
fn truncate_log(mut log: String) -> String {
    if let Some((idx, _)) = log.char_indices().nth(MAX_INFO_LOG_CHARS) {
        log.truncate(idx);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_match_driver_convention() {
        assert_eq!(ShaderStage::Vertex.to_string(), "VERTEX");
        assert_eq!(ShaderStage::Geometry.to_string(), "GEOMETRY");
        assert_eq!(ShaderStage::Fragment.to_string(), "FRAGMENT");
    }

    #[test]
    fn short_logs_pass_through_untouched() {
        let log = "0:12(3): error: undeclared identifier".to_owned();
        assert_eq!(truncate_log(log.clone()), log);
    }

    #[test]
    fn long_logs_truncate_to_the_character_cap() {
        let log = "e".repeat(MAX_INFO_LOG_CHARS + 100);
        assert_eq!(truncate_log(log).len(), MAX_INFO_LOG_CHARS);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // 3-byte code points: the cut must land on a boundary.
        let log: String = "…".repeat(MAX_INFO_LOG_CHARS + 5);
        let truncated = truncate_log(log);
        assert_eq!(truncated.chars().count(), MAX_INFO_LOG_CHARS);
        assert!(truncated.ends_with('…'));
    }
}
