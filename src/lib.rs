// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]

//! Offline GPU visualization of depth-sensor frames, built on OpenGL.
//!
//! Depthviz turns a stream of single-channel 16-bit depth frames into two
//! synchronized raster outputs per frame: a Phong-lit color render and a
//! surface-normal visualization. Each frame is rendered offscreen by a
//! screen-covering quad whose fragment stage reconstructs 3-D geometry per
//! pixel from the depth texture, then read back to the CPU.
//!
//! # Key entry points
//!
//! - [`visualizer::DepthVisualizer`] - the offscreen renderer
//! - [`camera::CameraIntrinsics`] - pinhole camera description and
//!   projection math
//! - [`options::Options`] - lighting/material configuration with the
//!   documented defaults
//! - [`batch`] - config-driven frame-range orchestration
//!
//! # Context ownership
//!
//! This crate never creates a GL context. The host supplies a current
//! [`glow::Context`] (hidden window, pbuffer, or surfaceless EGL) and must
//! keep it current on the calling thread for every call, including
//! `destroy`. `glow::Context` is neither `Send` nor `Sync`, which pins the
//! whole subsystem to its owning thread.

pub mod batch;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod options;
pub mod visualizer;
