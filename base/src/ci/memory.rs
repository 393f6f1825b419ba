//! Types which simplify the creation of Vulkan memory objects.

use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable};
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::utils::memory::get_memory_type_index;
use crate::error::{VkResult, VkError};
use crate::{vkuint, vkbytes};

// ----------------------------------------------------------------------------------------------
/// Wrapper class for `vk::MemoryAllocateInfo`.
///
/// See [VkMemoryAllocateInfo](https://www.khronos.org/registry/vulkan/specs/1.1-extensions/man/html/VkMemoryAllocateInfo.html) for more detail.
#[derive(Debug, Clone)]
pub struct MemoryAI {
    inner: vk::MemoryAllocateInfo,
}

impl VulkanCI<vk::MemoryAllocateInfo> for MemoryAI {

    fn default_ci() -> vk::MemoryAllocateInfo {

        vk::MemoryAllocateInfo {
            allocation_size  : 0,
            memory_type_index: 0,
            ..Default::default()
        }
    }
}

impl AsRef<vk::MemoryAllocateInfo> for MemoryAI {

    fn as_ref(&self) -> &vk::MemoryAllocateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for MemoryAI {
    type ObjectType = vk::DeviceMemory;

    /// Allocate `vk::DeviceMemory` object, and return its handle.
    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let memory = unsafe {
            device.logic.handle.allocate_memory(self.as_ref(), None)
                .map_err(|_| VkError::create("Memory Allocate"))?
        };
        Ok(memory)
    }
}

impl MemoryAI {

    /// `memory_type_index` is the index identifying a memory type querying from Vulkan.
    pub fn new(allocation_size: vkbytes, memory_type_index: vkuint) -> MemoryAI {

        MemoryAI {
            inner: vk::MemoryAllocateInfo {
                allocation_size, memory_type_index,
                ..MemoryAI::default_ci()
            },
        }
    }

    /// Allocate enough memory for `requirement` from a memory type which has all the `properties`.
    pub fn from_requirement(device: &VkDevice, requirement: &vk::MemoryRequirements, properties: vk::MemoryPropertyFlags) -> VkResult<MemoryAI> {

        let memory_type = get_memory_type_index(&device.phy.memories, requirement.memory_type_bits, properties)?;
        Ok(MemoryAI::new(requirement.size, memory_type))
    }
}

impl VkObjectDiscardable for vk::DeviceMemory {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.free_memory(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------
