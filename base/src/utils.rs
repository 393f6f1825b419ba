
pub mod cast;
pub mod frame;
pub mod memory;
pub mod time;

#[cfg(feature = "glsl")]
pub mod shaderc;
