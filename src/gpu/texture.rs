//! Depth-input texture: immutable 16-bit integer storage, refreshed every
//! frame.

use glow::HasContext;

use crate::error::DepthVizError;

/// Single-channel unsigned 16-bit (R16UI) texture holding the padded depth
/// frame. Storage is allocated once at the configured resolution and never
/// resized; `upload` overwrites the full contents each call.
#[derive(Debug)]
pub struct DepthMapTexture {
    raw: glow::NativeTexture,
    width: u32,
    height: u32,
}

impl DepthMapTexture {
    /// Allocate immutable storage at the given resolution (no data yet).
    ///
    /// # Errors
    ///
    /// [`DepthVizError::GlAllocation`] if the texture object cannot be
    /// created.
    pub fn new(
        gl: &glow::Context,
        width: u32,
        height: u32,
    ) -> Result<Self, DepthVizError> {
        unsafe {
            let raw = gl.create_texture().map_err(|msg| {
                DepthVizError::GlAllocation(format!("create_texture: {msg}"))
            })?;
            gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            gl.tex_storage_2d(
                glow::TEXTURE_2D,
                1,
                glow::R16UI,
                width as i32,
                height as i32,
            );
            // Integer textures are fetched with texelFetch, which ignores
            // the sampler state; NEAREST keeps the texture complete for any
            // sampler-based shader variant as well.
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(Self { raw, width, height })
        }
    }

    /// Overwrite the full texture with `samples` (row-major, top row first,
    /// exactly `width * height` values).
    pub fn upload(&self, gl: &glow::Context, samples: &[u16]) {
        debug_assert_eq!(
            samples.len(),
            self.width as usize * self.height as usize
        );
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.raw));
            // Rows are 2-byte aligned for odd widths.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 2);
            gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                self.width as i32,
                self.height as i32,
                glow::RED_INTEGER,
                glow::UNSIGNED_SHORT,
                glow::PixelUnpackData::Slice(bytemuck::cast_slice(samples)),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Bind the texture to the given texture unit.
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.raw));
        }
    }

    /// Delete the texture object. The creating context must be current.
    pub fn destroy(self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.raw) };
    }
}
