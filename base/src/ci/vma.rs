
use ash::vk;

use crate::ci::VulkanCI;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vma::AllocationCreateInfo, describing where Vulkan Memory Allocator places a resource.
pub struct VmaAllocationCI {
    inner: vma::AllocationCreateInfo,
}

impl VulkanCI<vma::AllocationCreateInfo> for VmaAllocationCI {

    fn default_ci() -> vma::AllocationCreateInfo {

        vma::AllocationCreateInfo {
            usage: vma::MemoryUsage::Auto,
            flags: vma::AllocationCreateFlags::empty(),
            required_flags : vk::MemoryPropertyFlags::empty(),
            preferred_flags: vk::MemoryPropertyFlags::empty(),
            ..Default::default()
        }
    }
}

impl AsRef<vma::AllocationCreateInfo> for VmaAllocationCI {

    fn as_ref(&self) -> &vma::AllocationCreateInfo {
        &self.inner
    }
}

impl VmaAllocationCI {

    pub fn new(usage: vma::MemoryUsage, required_flags: vk::MemoryPropertyFlags) -> VmaAllocationCI {

        VmaAllocationCI {
            inner: vma::AllocationCreateInfo {
                usage, required_flags,
                ..VmaAllocationCI::default_ci()
            }
        }
    }

    /// Memory the host writes sequentially and sees without explicit flushes.
    pub fn host_coherent() -> VmaAllocationCI {

        VmaAllocationCI::new(vma::MemoryUsage::Auto, vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT)
            .flags(vma::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE)
    }

    /// Memory only the device touches, filled through transfer commands.
    pub fn device_local() -> VmaAllocationCI {
        VmaAllocationCI::new(vma::MemoryUsage::AutoPreferDevice, vk::MemoryPropertyFlags::DEVICE_LOCAL)
    }

    #[inline(always)]
    pub fn flags(mut self, flags: vma::AllocationCreateFlags) -> VmaAllocationCI {
        self.inner.flags = flags; self
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn host_coherent_memory_is_written_sequentially() {

        let ci = VmaAllocationCI::host_coherent();

        assert!(ci.as_ref().required_flags.contains(vk::MemoryPropertyFlags::HOST_VISIBLE));
        assert!(ci.as_ref().required_flags.contains(vk::MemoryPropertyFlags::HOST_COHERENT));
        assert!(ci.as_ref().flags.contains(vma::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE));
    }

    #[test]
    fn device_local_memory_is_never_host_visible() {

        let ci = VmaAllocationCI::device_local();

        assert_eq!(ci.as_ref().required_flags, vk::MemoryPropertyFlags::DEVICE_LOCAL);
        assert!(ci.as_ref().flags.is_empty());
    }
}
