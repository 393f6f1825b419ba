//! Builder wrappers over the create info structs of Vulkan.
//!
//! Each wrapper starts from sensible defaults, offers chainable setters, and is turned into
//! the Vulkan object through `VkDevice::build`.

pub mod shader;
pub mod pipeline;
pub mod device;
pub mod image;
pub mod buffer;
pub mod descriptor;
pub mod memory;
pub mod vma;
pub mod command;
pub mod sync;


use crate::context::VkDevice;
use crate::VkResult;

pub(crate) trait VulkanCI<CI>: Sized + AsRef<CI> {

    fn default_ci() -> CI;
}

pub trait VkObjectBuildableCI {
    type ObjectType;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType>;
}
