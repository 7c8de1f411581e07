//! WebGPU rendering module
//!
//! The whole scene is drawn with SDFs (Signed Distance Fields) in a single
//! fullscreen fragment pass.

pub mod sdf_pipeline;

pub use sdf_pipeline::SdfRenderState;
