//! GPU object wrappers for the offscreen pipeline.
//!
//! Every type here wraps a raw GL object id as a move-only handle with an
//! explicit `destroy` method; the owning
//! [`crate::visualizer::DepthVisualizer`] releases each exactly once. All
//! calls require the creating context to be current on the calling thread.

pub mod program;
pub mod target;
pub mod texture;
pub mod uniforms;
