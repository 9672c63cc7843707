//! Crate-level error types.

use std::fmt;
use std::io;

use crate::gpu::program::ShaderStage;

/// Errors produced by the depthviz crate.
///
/// Every variant is fatal to the operation that raised it: no partially
/// linked program, partially attached framebuffer, or partial frame output
/// is ever returned. Construction-time failures prevent the visualizer from
/// existing at all; per-call failures ([`Self::OversizeInput`]) leave the
/// visualizer reusable for subsequent valid calls.
#[derive(Debug)]
pub enum DepthVizError {
    /// A shader stage source file could not be read.
    ShaderIo {
        /// Stage whose source path failed to open.
        stage: ShaderStage,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// A shader stage failed to compile.
    ShaderCompile {
        /// Stage that failed.
        stage: ShaderStage,
        /// Compiler diagnostic, truncated to 2048 characters.
        log: String,
    },
    /// The shader program failed to link.
    ShaderLink {
        /// Linker diagnostic, truncated to 2048 characters.
        log: String,
    },
    /// The offscreen framebuffer did not report completeness after its
    /// attachments were bound.
    FramebufferIncomplete {
        /// Raw GL framebuffer status code.
        status: u32,
    },
    /// The input depth frame exceeds the configured camera resolution.
    OversizeInput {
        /// Dimensions of the rejected frame.
        given: (u32, u32),
        /// Configured maximum (camera width, height).
        max: (u32, u32),
    },
    /// The GL driver refused to allocate an object.
    GlAllocation(String),
    /// Depth-frame decode or output encode failure (batch layer).
    Image(image::ImageError),
    /// Config file I/O failure (batch layer).
    Io(io::Error),
    /// Config document parse failure (batch layer).
    ConfigParse(String),
}

impl fmt::Display for DepthVizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShaderIo { stage, source } => {
                write!(f, "failed to read {stage} shader source: {source}")
            }
            Self::ShaderCompile { stage, log } => {
                write!(f, "{stage} shader compile error:\n{log}")
            }
            Self::ShaderLink { log } => {
                write!(f, "shader program link error:\n{log}")
            }
            Self::FramebufferIncomplete { status } => {
                write!(f, "framebuffer incomplete (status 0x{status:x})")
            }
            Self::OversizeInput { given, max } => {
                write!(
                    f,
                    "depth frame {}x{} exceeds configured resolution {}x{}",
                    given.0, given.1, max.0, max.1
                )
            }
            Self::GlAllocation(msg) => {
                write!(f, "GL object allocation failed: {msg}")
            }
            Self::Image(e) => write!(f, "image error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for DepthVizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ShaderIo { source, .. } | Self::Io(source) => Some(source),
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for DepthVizError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<io::Error> for DepthVizError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_the_stage() {
        let err = DepthVizError::ShaderCompile {
            stage: ShaderStage::Geometry,
            log: "0:1(1): error: syntax error".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GEOMETRY"));
        assert!(msg.contains("syntax error"));
    }

    #[test]
    fn oversize_error_reports_both_sizes() {
        let err = DepthVizError::OversizeInput {
            given: (800, 600),
            max: (640, 480),
        };
        assert_eq!(
            err.to_string(),
            "depth frame 800x600 exceeds configured resolution 640x480"
        );
    }

    #[test]
    fn shader_io_error_exposes_source() {
        use std::error::Error;
        let err = DepthVizError::ShaderIo {
            stage: ShaderStage::Vertex,
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("VERTEX"));
    }
}
