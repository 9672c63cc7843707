//! The depth-frame visualizer: owns the GPU object set and runs the
//! per-frame render-and-readback pass.

use glow::HasContext;
use image::RgbaImage;

/// 16-bit single-channel depth frame (`Luma<u16>`). The `image` crate
/// exposes `GrayImage` (8-bit) but no 16-bit alias, so name it here.
type Gray16Image = image::ImageBuffer<image::Luma<u16>, Vec<u16>>;

use crate::camera::{CameraIntrinsics, ClipConfig};
use crate::error::DepthVizError;
use crate::gpu::program::{ShaderPaths, ShaderProgram};
use crate::gpu::target::{ColorSlot, OffscreenTarget};
use crate::gpu::texture::DepthMapTexture;
use crate::gpu::uniforms::{
    CamBlock, LightBlock, MaterialBlock, UniformBuffer, CAMERA_BINDING,
    DEPTH_TEXTURE_UNIT, LIGHT_BINDING, MATERIAL_BINDING,
};
use crate::options::Options;

/// Offscreen renderer turning 16-bit depth frames into a Phong-shaded
/// color image and a surface-normal visualization.
///
/// All GPU objects are created once in [`Self::new`] and released exactly
/// once by [`Self::destroy`]; nothing is shared between instances, so
/// several visualizers may coexist on one context. Every method requires
/// the creating context to be current on the calling thread.
///
/// [`Self::visualize`] takes `&mut self`: a call mutates the shared depth
/// texture and framebuffer, so it is not reentrant for one instance.
#[derive(Debug)]
pub struct DepthVisualizer {
    camera: CameraIntrinsics,
    program: ShaderProgram,
    vao: glow::NativeVertexArray,
    target: OffscreenTarget,
    depth_tex: DepthMapTexture,
    cam_ubo: UniformBuffer,
    light_ubo: UniformBuffer,
    material_ubo: UniformBuffer,
}

impl DepthVisualizer {
    /// Build the shader program and the full GPU object set: one
    /// framebuffer with two RGBA8 color renderbuffers plus a 32-bit float
    /// depth renderbuffer, the R16UI depth-input texture, three uniform
    /// buffers populated once from `camera`/`clip`/`options`, and an empty
    /// vertex array used only as a binding anchor (the full-screen quad is
    /// generated in the vertex stage from the built-in vertex index).
    ///
    /// Construction is all-or-nothing: on any failure every GPU object
    /// created so far is released and the visualizer does not exist.
    ///
    /// # Errors
    ///
    /// Shader I/O, compile, or link errors from program construction;
    /// [`DepthVizError::FramebufferIncomplete`] if the render target does
    /// not validate; [`DepthVizError::GlAllocation`] if the driver refuses
    /// an object.
    pub fn new(
        gl: &glow::Context,
        camera: CameraIntrinsics,
        shaders: &ShaderPaths,
        clip: ClipConfig,
        options: &Options,
    ) -> Result<Self, DepthVizError> {
        let program = ShaderProgram::from_paths(gl, shaders)?;

        let vao = match unsafe { gl.create_vertex_array() } {
            Ok(vao) => vao,
            Err(msg) => {
                program.destroy(gl);
                return Err(DepthVizError::GlAllocation(format!(
                    "create_vertex_array: {msg}"
                )));
            }
        };

        match Self::create_frame_resources(gl, camera, clip, options) {
            Ok((target, depth_tex, cam_ubo, light_ubo, material_ubo)) => {
                Ok(Self {
                    camera,
                    program,
                    vao,
                    target,
                    depth_tex,
                    cam_ubo,
                    light_ubo,
                    material_ubo,
                })
            }
            Err(e) => {
                unsafe { gl.delete_vertex_array(vao) };
                program.destroy(gl);
                Err(e)
            }
        }
    }

    /// Render one depth frame and read both outputs back.
    ///
    /// The frame must fit the configured resolution; smaller frames are
    /// centered in a zero-filled ("no depth") buffer. The outputs are
    /// always exactly (configured width, configured height), top row
    /// first; pixels the shading stage discarded keep the transparent
    /// black clear color. The call blocks until the GPU readback
    /// completes.
    ///
    /// # Errors
    ///
    /// [`DepthVizError::OversizeInput`] if the frame exceeds the
    /// configured resolution in either dimension; no GPU state is touched
    /// in that case and the visualizer stays usable.
    pub fn visualize(
        &mut self,
        gl: &glow::Context,
        depth: &Gray16Image,
    ) -> Result<(RgbaImage, RgbaImage), DepthVizError> {
        let width = self.camera.width;
        let height = self.camera.height;
        let padded = pad_to_center(depth, width, height)?;

        self.depth_tex.upload(gl, &padded);

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.cull_face(glow::BACK);
            gl.enable(glow::CULL_FACE);
            gl.bind_vertex_array(Some(self.vao));
        }

        self.target.bind_draw(gl);
        self.target.clear(gl);
        self.program.bind(gl);
        self.cam_ubo.bind(gl);
        self.light_ubo.bind(gl);
        self.material_ubo.bind(gl);
        self.depth_tex.bind(gl, DEPTH_TEXTURE_UNIT);

        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
        }

        // read_pixels is the host/device sync point for the frame.
        let phong = self.target.read_color(gl, ColorSlot::Phong);
        let normal = self.target.read_color(gl, ColorSlot::Normal);

        unsafe { gl.bind_vertex_array(None) };

        Ok((
            flipped_image(width, height, &phong),
            flipped_image(width, height, &normal),
        ))
    }

    /// Release every GPU object exactly once. The creating context must be
    /// current on the calling thread.
    pub fn destroy(self, gl: &glow::Context) {
        self.material_ubo.destroy(gl);
        self.light_ubo.destroy(gl);
        self.cam_ubo.destroy(gl);
        self.depth_tex.destroy(gl);
        self.target.destroy(gl);
        unsafe { gl.delete_vertex_array(self.vao) };
        self.program.destroy(gl);
    }

    fn create_frame_resources(
        gl: &glow::Context,
        camera: CameraIntrinsics,
        clip: ClipConfig,
        options: &Options,
    ) -> Result<
        (
            OffscreenTarget,
            DepthMapTexture,
            UniformBuffer,
            UniformBuffer,
            UniformBuffer,
        ),
        DepthVizError,
    > {
        let target = OffscreenTarget::new(gl, camera.width, camera.height)?;

        let depth_tex =
            match DepthMapTexture::new(gl, camera.width, camera.height) {
                Ok(tex) => tex,
                Err(e) => {
                    target.destroy(gl);
                    return Err(e);
                }
            };

        // Uniform staging values are fresh locals; nothing outlives the
        // upload.
        let cam_block = CamBlock::new(&camera, clip.max_dist);
        let light_block = LightBlock::from(&options.lighting);
        let material_block = MaterialBlock::from(&options.material);

        let cam_ubo = match UniformBuffer::new(
            gl,
            CAMERA_BINDING,
            bytemuck::bytes_of(&cam_block),
        ) {
            Ok(ubo) => ubo,
            Err(e) => {
                depth_tex.destroy(gl);
                target.destroy(gl);
                return Err(e);
            }
        };

        let light_ubo = match UniformBuffer::new(
            gl,
            LIGHT_BINDING,
            bytemuck::bytes_of(&light_block),
        ) {
            Ok(ubo) => ubo,
            Err(e) => {
                cam_ubo.destroy(gl);
                depth_tex.destroy(gl);
                target.destroy(gl);
                return Err(e);
            }
        };

        let material_ubo = match UniformBuffer::new(
            gl,
            MATERIAL_BINDING,
            bytemuck::bytes_of(&material_block),
        ) {
            Ok(ubo) => ubo,
            Err(e) => {
                light_ubo.destroy(gl);
                cam_ubo.destroy(gl);
                depth_tex.destroy(gl);
                target.destroy(gl);
                return Err(e);
            }
        };

        Ok((target, depth_tex, cam_ubo, light_ubo, material_ubo))
    }
}

/// Center `depth` in a zero-filled buffer at the configured resolution.
///
/// The frame lands at offset `((width - w) / 2, (height - h) / 2)`; every
/// pixel outside that region stays 0 ("no depth").
///
/// # Errors
///
/// [`DepthVizError::OversizeInput`] if the frame exceeds the configured
/// resolution in either dimension.
fn pad_to_center(
    depth: &Gray16Image,
    width: u32,
    height: u32,
) -> Result<Vec<u16>, DepthVizError> {
    let (w, h) = depth.dimensions();
    if w > width || h > height {
        return Err(DepthVizError::OversizeInput {
            given: (w, h),
            max: (width, height),
        });
    }

    let mut padded = vec![0_u16; width as usize * height as usize];
    let x0 = ((width - w) / 2) as usize;
    let y0 = ((height - h) / 2) as usize;
    let src = depth.as_raw();
    for row in 0..h as usize {
        let dst = (y0 + row) * width as usize + x0;
        padded[dst..dst + w as usize]
            .copy_from_slice(&src[row * w as usize..(row + 1) * w as usize]);
    }
    Ok(padded)
}

/// Adopt a bottom-up RGBA readback buffer as a top-down image.
fn flipped_image(width: u32, height: u32, bottom_up: &[u8]) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    let stride = width as usize * 4;
    let rows = height as usize;
    let out: &mut [u8] = &mut img;
    for row in 0..rows {
        let src = (rows - 1 - row) * stride;
        out[row * stride..(row + 1) * stride]
            .copy_from_slice(&bottom_up[src..src + stride]);
    }
    img
}
