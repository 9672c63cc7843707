//! std140 uniform blocks shared with the shader stages.
//!
//! The staging structs mirror the GLSL block declarations byte for byte:
//! vec3 fields sit on 16-byte boundaries, scalars pack tightly. Layout
//! comments give the std140 offsets; compile-time asserts catch drift.

use bytemuck::{Pod, Zeroable};
use glow::HasContext;

use crate::camera::CameraIntrinsics;
use crate::error::DepthVizError;
use crate::options::{LightingOptions, MaterialOptions};

/// Uniform-buffer binding slot of [`CamBlock`].
pub const CAMERA_BINDING: u32 = 0;
/// Uniform-buffer binding slot of [`LightBlock`].
pub const LIGHT_BINDING: u32 = 1;
/// Uniform-buffer binding slot of [`MaterialBlock`].
pub const MATERIAL_BINDING: u32 = 2;
/// Texture unit of the depth-input sampler.
pub const DEPTH_TEXTURE_UNIT: u32 = 0;

/// Camera intrinsics block (binding 0). Five packed scalars: 20 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CamBlock {
    /// Focal length x. Offset 0.
    pub fx: f32,
    /// Focal length y. Offset 4.
    pub fy: f32,
    /// Principal point x. Offset 8.
    pub cx: f32,
    /// Principal point y. Offset 12.
    pub cy: f32,
    /// Depth-validity bound. Offset 16.
    pub max_dist: f32,
}

const _: () = assert!(std::mem::size_of::<CamBlock>() == 20);

impl CamBlock {
    /// Stage the intrinsics and depth bound for upload.
    #[must_use]
    pub const fn new(camera: &CameraIntrinsics, max_dist: f32) -> Self {
        Self {
            fx: camera.fx,
            fy: camera.fy,
            cx: camera.cx,
            cy: camera.cy,
            max_dist,
        }
    }
}

/// Directional light block (binding 1). Four vec3 fields at offsets
/// 0/16/32/48: 64 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightBlock {
    /// Ambient color. Offset 0.
    pub ambient: [f32; 3],
    _pad0: f32,
    /// Diffuse color. Offset 16.
    pub diffuse: [f32; 3],
    _pad1: f32,
    /// Specular color. Offset 32.
    pub specular: [f32; 3],
    _pad2: f32,
    /// Direction toward the light. Offset 48.
    pub direction: [f32; 3],
    _pad3: f32,
}

const _: () = assert!(std::mem::size_of::<LightBlock>() == 64);

impl From<&LightingOptions> for LightBlock {
    fn from(options: &LightingOptions) -> Self {
        Self {
            ambient: options.ambient,
            _pad0: 0.0,
            diffuse: options.diffuse,
            _pad1: 0.0,
            specular: options.specular,
            _pad2: 0.0,
            direction: options.direction,
            _pad3: 0.0,
        }
    }
}

/// Material block (binding 2). Three vec3 fields at offsets 0/16/32 and a
/// packed scalar at offset 44: 48 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialBlock {
    /// Ambient reflectance. Offset 0.
    pub ambient: [f32; 3],
    _pad0: f32,
    /// Diffuse reflectance. Offset 16.
    pub diffuse: [f32; 3],
    _pad1: f32,
    /// Specular reflectance. Offset 32.
    pub specular: [f32; 3],
    /// Specular exponent. Offset 44.
    pub shininess: f32,
}

const _: () = assert!(std::mem::size_of::<MaterialBlock>() == 48);

impl From<&MaterialOptions> for MaterialBlock {
    fn from(options: &MaterialOptions) -> Self {
        Self {
            ambient: options.ambient,
            _pad0: 0.0,
            diffuse: options.diffuse,
            _pad1: 0.0,
            specular: options.specular,
            shininess: options.shininess,
        }
    }
}

/// An immutable GL uniform buffer bound at a fixed slot.
///
/// Populated exactly once at creation; contents never change for the
/// lifetime of the owning visualizer.
#[derive(Debug)]
pub struct UniformBuffer {
    raw: glow::NativeBuffer,
    binding: u32,
}

impl UniformBuffer {
    /// Create the buffer and upload `contents` once.
    ///
    /// # Errors
    ///
    /// [`DepthVizError::GlAllocation`] if the buffer object cannot be
    /// created.
    pub fn new(
        gl: &glow::Context,
        binding: u32,
        contents: &[u8],
    ) -> Result<Self, DepthVizError> {
        unsafe {
            let raw = gl.create_buffer().map_err(|msg| {
                DepthVizError::GlAllocation(format!("create_buffer: {msg}"))
            })?;
            gl.bind_buffer(glow::UNIFORM_BUFFER, Some(raw));
            gl.buffer_data_u8_slice(
                glow::UNIFORM_BUFFER,
                contents,
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::UNIFORM_BUFFER, None);
            Ok(Self { raw, binding })
        }
    }

    /// Bind the buffer at its block's slot for the next draw.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_buffer_base(
                glow::UNIFORM_BUFFER,
                self.binding,
                Some(self.raw),
            );
        }
    }

    /// Delete the buffer object. The creating context must be current.
    pub fn destroy(self, gl: &glow::Context) {
        unsafe { gl.delete_buffer(self.raw) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cam_block_packs_scalars_tightly() {
        let camera = CameraIntrinsics {
            width: 640,
            height: 480,
            fx: 525.0,
            fy: 526.0,
            cx: 320.0,
            cy: 240.0,
        };
        let block = CamBlock::new(&camera, 3.0);
        let bytes = bytemuck::bytes_of(&block);
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[0..4], 525.0_f32.to_ne_bytes().as_slice());
        assert_eq!(&bytes[4..8], 526.0_f32.to_ne_bytes().as_slice());
        assert_eq!(&bytes[16..20], 3.0_f32.to_ne_bytes().as_slice());
    }

    #[test]
    fn light_block_aligns_vectors_to_16_bytes() {
        let block = LightBlock::from(&LightingOptions::default());
        let bytes = bytemuck::bytes_of(&block);
        assert_eq!(bytes.len(), 64);
        // diffuse.r = 0.9 at offset 16, direction.y = 0.3 at offset 52
        assert_eq!(&bytes[16..20], 0.9_f32.to_ne_bytes().as_slice());
        assert_eq!(&bytes[52..56], 0.3_f32.to_ne_bytes().as_slice());
    }

    #[test]
    fn material_block_packs_shininess_after_specular() {
        let block = MaterialBlock::from(&MaterialOptions::default());
        let bytes = bytemuck::bytes_of(&block);
        assert_eq!(bytes.len(), 48);
        // specular.r = 0.35 at offset 32, shininess = 5.5 at offset 44
        assert_eq!(&bytes[32..36], 0.35_f32.to_ne_bytes().as_slice());
        assert_eq!(&bytes[44..48], 5.5_f32.to_ne_bytes().as_slice());
    }

    #[test]
    fn default_coefficients_match_the_documented_table() {
        let light = LightBlock::from(&LightingOptions::default());
        assert_eq!(light.ambient, [0.1, 0.1, 0.1]);
        assert_eq!(light.diffuse, [0.9, 0.9, 0.9]);
        assert_eq!(light.specular, [0.3, 0.3, 0.3]);
        assert_eq!(light.direction, [0.0, 0.3, 0.9]);

        let material = MaterialBlock::from(&MaterialOptions::default());
        assert_eq!(material.ambient, [0.26, 0.26, 0.26]);
        assert_eq!(material.diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(material.specular, [0.35, 0.35, 0.35]);
        assert_eq!(material.shininess, 5.5);
    }
}
