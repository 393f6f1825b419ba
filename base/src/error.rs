
use failure::{ Backtrace, Context, Fail };

use crate::{vkuint, vkbytes};

use std::result;
use std::path::{ Path, PathBuf };
use std::fmt;

pub type VkResult<T> = result::Result<T, VkError>;

// -------------------------------------------------------------------------------------------
#[derive(Debug)]
pub struct VkError {

    ctx: Context<VkErrorKind>,
}

impl VkError {

    pub fn kind(&self) -> &VkErrorKind {
        self.ctx.get_context()
    }

    pub fn unlink(target_name: &'static str) -> VkError {
        VkError::from(VkErrorKind::Unlink { target_name })
    }

    pub fn query(query_target: &'static str) -> VkError {
        VkError::from(VkErrorKind::Query { query_target })
    }

    pub fn create(create_target: &'static str) -> VkError {
        VkError::from(VkErrorKind::Create { create_target })
    }

    pub fn unsupported(feature: &'static str) -> VkError {
        VkError::from(VkErrorKind::UnSupport { feature })
    }

    pub fn device(ops_description: &'static str) -> VkError {
        VkError::from(VkErrorKind::Device { ops_description })
    }

    /// `ops` failed inside Vulkan Memory Allocator with `result`.
    pub fn vma(ops: &'static str, result: ash::vk::Result) -> VkError {
        VkError::from(VkErrorKind::Vma { ops, result })
    }

    pub fn shaderc(compile_message: impl AsRef<str>) -> VkError {
        VkError::from(VkErrorKind::Shaderc {
            compile_message: compile_message.as_ref().to_string()
        })
    }

    pub(crate) fn window(description: impl AsRef<str>) -> VkError {
        VkError::from(VkErrorKind::Window { description: description.as_ref().to_string() })
    }

    /// A convenience routine for creating an error associated with a path.
    pub fn path(path: impl AsRef<Path>)-> VkError {
        VkError::from(VkErrorKind::Path { path: path.as_ref().to_path_buf() })
    }

    pub fn gltf(description: impl AsRef<str>) -> VkError {
        VkError::from(VkErrorKind::ParseGltf { description: description.as_ref().to_string() })
    }

    pub fn config(description: impl AsRef<str>) -> VkError {
        VkError::from(VkErrorKind::Config { description: description.as_ref().to_string() })
    }

    /// The push constant block of `requested` bytes does not fit in the `limit` reported by the device.
    pub fn push_constant_overflow(requested: vkbytes, limit: vkuint) -> VkError {
        VkError::from(VkErrorKind::PushConstantOverflow { requested, limit })
    }

    /// A write of `requested` bytes at `offset` exceeds a mapped region of `capacity` bytes.
    pub fn mapped_overflow(offset: vkbytes, requested: vkbytes, capacity: vkbytes) -> VkError {
        VkError::from(VkErrorKind::MappedOverflow { offset, requested, capacity })
    }

    pub fn other(description: impl AsRef<str>) -> VkError {
        VkError::from(VkErrorKind::Other {
            description: description.as_ref().to_string()
        })
    }
}

impl Fail for VkError {

    fn cause(&self) -> Option<&dyn Fail> {
        self.ctx.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.ctx.backtrace()
    }
}

impl fmt::Display for VkError {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.ctx, f)
    }
}
// -------------------------------------------------------------------------------------------

// -------------------------------------------------------------------------------------------
/// The specific kind of error that can occur.
#[derive(Debug, Fail)]
pub enum VkErrorKind {

    /// An error occurred while building connection between application and Vulkan.
    #[fail(display = "Failed to bridge connection between {} and Vulkan.", target_name)]
    Unlink { target_name: &'static str },
    /// An error occurred while querying some properties from Vulkan.
    #[fail(display = "Failed to query {} property from Vulkan or Device.", query_target)]
    Query { query_target: &'static str },
    /// An error occurred while creating Vulkan Object.
    #[fail(display = "Failed to create {}.", create_target)]
    Create { create_target: &'static str },
    /// An error indicated requiring some unsupported feature.
    #[fail(display = "Feature {} is not supported in current Vulkan Device.", feature)]
    UnSupport { feature: &'static str },
    /// An error triggered by Invalid Device operations.
    #[fail(display = "Invalid Operation: {}", ops_description)]
    Device { ops_description: &'static str },
    /// An error returned by Vulkan Memory Allocator.
    #[fail(display = "Vulkan Memory Allocator failed to {}: {}.", ops, result)]
    Vma { ops: &'static str, result: ash::vk::Result },
    /// An error that occurred while trying to compile shader code in runtime.
    #[fail(display = "Error occurred during runtime shader compiling: {}.", compile_message)]
    Shaderc { compile_message: String },
    /// An error occurred while communicate with Window.
    #[fail(display = "Failed to interact with Window: {}.", description)]
    Window { description: String },
    /// An error that occurred while working with a file path.
    #[fail(display = "Failed to locate file at: {:?}", path)]
    Path { path: PathBuf },
    /// An error occurred while reading a glTF scene.
    #[fail(display = "Failed to load glTF scene: {}.", description)]
    ParseGltf { description: String },
    /// An error occurred while reading the application configuration.
    #[fail(display = "Invalid configuration: {}.", description)]
    Config { description: String },
    /// The push constant range declared by a pipeline layout exceeds the device limit.
    #[fail(display = "Push constant block requires {} bytes, but maxPushConstantsSize of current device is {} bytes.", requested, limit)]
    PushConstantOverflow { requested: vkbytes, limit: vkuint },
    /// A host write went past the end of a mapped memory region.
    #[fail(display = "Write of {} bytes at offset {} exceeds mapped region of {} bytes.", requested, offset, capacity)]
    MappedOverflow { offset: vkbytes, requested: vkbytes, capacity: vkbytes },
    /// Other errors.
    #[fail(display = "{}", description)]
    Other { description: String },
}

impl From<VkErrorKind> for VkError {

    fn from(kind: VkErrorKind) -> VkError {
        VkError::from(Context::new(kind))
    }
}

impl From<Context<VkErrorKind>> for VkError {

    fn from(ctx: Context<VkErrorKind>) -> VkError {
        VkError { ctx }
    }
}
// -------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn overflow_reports_both_sizes() {

        let error = VkError::push_constant_overflow(96, 64);

        match error.kind() {
            | VkErrorKind::PushConstantOverflow { requested, limit } => {
                assert_eq!(*requested, 96);
                assert_eq!(*limit, 64);
            },
            | _ => panic!("unexpected error kind: {:?}", error.kind()),
        }

        let message = error.to_string();
        assert!(message.contains("96"));
        assert!(message.contains("64"));
    }
}
