
use ash::vk;

use crate::ci::VulkanCI;
use crate::vkbytes;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::BufferCreateInfo, handed to Vulkan Memory Allocator together with a `VmaAllocationCI`.
#[derive(Debug)]
pub struct BufferCI {
    inner: vk::BufferCreateInfo,
}

impl VulkanCI<vk::BufferCreateInfo> for BufferCI {

    fn default_ci() -> vk::BufferCreateInfo {

        vk::BufferCreateInfo {
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            ..Default::default()
        }
    }
}

impl AsRef<vk::BufferCreateInfo> for BufferCI {

    fn as_ref(&self) -> &vk::BufferCreateInfo {
        &self.inner
    }
}

impl BufferCI {

    pub fn new(size: vkbytes) -> BufferCI {

        BufferCI {
            inner: vk::BufferCreateInfo {
                size,
                ..BufferCI::default_ci()
            },
        }
    }

    #[inline(always)]
    pub fn usage(mut self, flags: vk::BufferUsageFlags) -> BufferCI {
        self.inner.usage = flags; self
    }
}
// ----------------------------------------------------------------------------------------------
