//! Thin RAII wrappers over the `gl` crate: buffers, vertex arrays, programs, and the
//! shader compile-and-link procedure.

pub mod errors;
pub mod gl_fancy;
pub mod gl_helper;
pub mod shader_build;
