//! Offscreen render target: framebuffer plus renderbuffer attachments.

use glow::HasContext;

use crate::error::DepthVizError;

/// Color attachment slots of the offscreen target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    /// Attachment 0: Phong-shaded color.
    Phong,
    /// Attachment 1: encoded surface normals.
    Normal,
}

impl ColorSlot {
    const fn attachment(self) -> u32 {
        match self {
            Self::Phong => glow::COLOR_ATTACHMENT0,
            Self::Normal => glow::COLOR_ATTACHMENT1,
        }
    }

    const fn draw_buffer_index(self) -> u32 {
        match self {
            Self::Phong => 0,
            Self::Normal => 1,
        }
    }
}

/// A framebuffer with two RGBA8 color renderbuffers and one 32-bit float
/// depth renderbuffer, all at a fixed resolution.
///
/// Both color slots are declared as active draw targets at construction,
/// so one draw writes the Phong and normal outputs together.
#[derive(Debug)]
pub struct OffscreenTarget {
    fbo: glow::NativeFramebuffer,
    phong_rbo: glow::NativeRenderbuffer,
    normal_rbo: glow::NativeRenderbuffer,
    depth_rbo: glow::NativeRenderbuffer,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    /// Allocate storage, attach everything, and verify completeness.
    ///
    /// On any failure every object allocated so far is released; no
    /// partially attached framebuffer survives.
    ///
    /// # Errors
    ///
    /// [`DepthVizError::GlAllocation`] if an object cannot be created,
    /// [`DepthVizError::FramebufferIncomplete`] if the framebuffer does
    /// not report completeness right after attachment.
    pub fn new(
        gl: &glow::Context,
        width: u32,
        height: u32,
    ) -> Result<Self, DepthVizError> {
        unsafe {
            let phong_rbo =
                create_storage(gl, glow::RGBA8, width, height, &[])?;
            let normal_rbo =
                create_storage(gl, glow::RGBA8, width, height, &[phong_rbo])?;
            let depth_rbo = create_storage(
                gl,
                glow::DEPTH_COMPONENT32F,
                width,
                height,
                &[phong_rbo, normal_rbo],
            )?;

            let fbo = match gl.create_framebuffer() {
                Ok(fbo) => fbo,
                Err(msg) => {
                    delete_renderbuffers(
                        gl,
                        &[phong_rbo, normal_rbo, depth_rbo],
                    );
                    return Err(DepthVizError::GlAllocation(format!(
                        "create_framebuffer: {msg}"
                    )));
                }
            };

            gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, Some(fbo));
            gl.framebuffer_renderbuffer(
                glow::DRAW_FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::RENDERBUFFER,
                Some(phong_rbo),
            );
            gl.framebuffer_renderbuffer(
                glow::DRAW_FRAMEBUFFER,
                glow::COLOR_ATTACHMENT1,
                glow::RENDERBUFFER,
                Some(normal_rbo),
            );
            gl.framebuffer_renderbuffer(
                glow::DRAW_FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(depth_rbo),
            );

            let status = gl.check_framebuffer_status(glow::DRAW_FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);
                gl.delete_framebuffer(fbo);
                delete_renderbuffers(gl, &[phong_rbo, normal_rbo, depth_rbo]);
                return Err(DepthVizError::FramebufferIncomplete { status });
            }

            gl.draw_buffers(&[
                glow::COLOR_ATTACHMENT0,
                glow::COLOR_ATTACHMENT1,
            ]);
            gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);

            Ok(Self {
                fbo,
                phong_rbo,
                normal_rbo,
                depth_rbo,
                width,
                height,
            })
        }
    }

    /// Bind the framebuffer as the draw target.
    pub fn bind_draw(&self, gl: &glow::Context) {
        unsafe { gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, Some(self.fbo)) };
    }

    /// Clear both color attachments to transparent black and the depth
    /// attachment to the far value 1.0. The framebuffer must currently be
    /// bound as the draw target.
    pub fn clear(&self, gl: &glow::Context) {
        unsafe {
            for slot in [ColorSlot::Phong, ColorSlot::Normal] {
                gl.clear_buffer_f32_slice(
                    glow::COLOR,
                    slot.draw_buffer_index(),
                    &[0.0, 0.0, 0.0, 0.0],
                );
            }
            gl.clear_buffer_f32_slice(glow::DEPTH, 0, &[1.0]);
        }
    }

    /// Read one color attachment back as tightly packed RGBA8 rows in GL's
    /// bottom-up order.
    #[must_use]
    pub fn read_color(&self, gl: &glow::Context, slot: ColorSlot) -> Vec<u8> {
        let mut pixels =
            vec![0_u8; self.width as usize * self.height as usize * 4];
        unsafe {
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(self.fbo));
            gl.read_buffer(slot.attachment());
            gl.read_pixels(
                0,
                0,
                self.width as i32,
                self.height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut pixels),
            );
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
        }
        pixels
    }

    /// Release the framebuffer and all three renderbuffers. The creating
    /// context must be current.
    pub fn destroy(self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.fbo);
            delete_renderbuffers(
                gl,
                &[self.phong_rbo, self.normal_rbo, self.depth_rbo],
            );
        }
    }
}

unsafe fn create_storage(
    gl: &glow::Context,
    internal_format: u32,
    width: u32,
    height: u32,
    created_so_far: &[glow::NativeRenderbuffer],
) -> Result<glow::NativeRenderbuffer, DepthVizError> {
    let rbo = match gl.create_renderbuffer() {
        Ok(rbo) => rbo,
        Err(msg) => {
            delete_renderbuffers(gl, created_so_far);
            return Err(DepthVizError::GlAllocation(format!(
                "create_renderbuffer: {msg}"
            )));
        }
    };
    gl.bind_renderbuffer(glow::RENDERBUFFER, Some(rbo));
    gl.renderbuffer_storage(
        glow::RENDERBUFFER,
        internal_format,
        width as i32,
        height as i32,
    );
    gl.bind_renderbuffer(glow::RENDERBUFFER, None);
    Ok(rbo)
}

unsafe fn delete_renderbuffers(
    gl: &glow::Context,
    rbos: &[glow::NativeRenderbuffer],
) {
    for &rbo in rbos {
        gl.delete_renderbuffer(rbo);
    }
}
