
mod physical;
mod logical;
mod queue;

pub use self::logical::{VkLogicalDevice, VkQueue};
pub use self::physical::{VkPhysicalDevice, PhysicalDevConfig};

use ash::vk;

use crate::ci::VkObjectBuildableCI;
use crate::utils::time::VkTimeDuration;
use crate::error::VkResult;
use crate::vkbytes;


pub struct VkDevice {

    pub logic : logical::VkLogicalDevice,
    pub phy   : physical::VkPhysicalDevice,
    /// allocates the memory of every buffer; must be released before the logical device.
    pub vma   : vma::Allocator,
}

impl VkDevice {

    pub(crate) fn new(logic: VkLogicalDevice, phy: VkPhysicalDevice, vma: vma::Allocator) -> VkDevice {
        VkDevice { logic, phy, vma }
    }

    /// Release the allocator, then the logical device.
    pub(crate) fn destroy(self) {

        drop(self.vma);
        self.logic.discard();
    }

    #[inline]
    pub fn build<T>(&self, ci: &T) -> VkResult<T::ObjectType>
        where
            T: VkObjectBuildableCI {
        ci.build(self)
    }

    #[inline]
    pub fn discard(&self, object: impl VkObjectDiscardable) {
        object.discard_by(self);
    }

    #[inline]
    pub fn free<T>(&self, object: T, pool: T::AllocatePool)
        where
            T: VkObjectAllocatable {

        object.free(self, pool);
    }

    #[inline]
    pub fn bind_memory(&self, object: impl VkObjectBindable, memory: vk::DeviceMemory, offset: vkbytes) -> VkResult<()> {
        object.bind(self, memory, offset)
    }

    #[inline]
    pub fn submit(&self, ci: impl VkSubmitCI, queue: vk::Queue, wait_fence: vk::Fence) -> VkResult<()> {
        ci.submit(self, queue, wait_fence)
    }

    #[inline]
    pub fn wait(&self, object: impl VkObjectWaitable, time: VkTimeDuration) -> VkResult<()> {
        object.wait_for(self, time)
    }
}

/// Vulkan objects destroyed through `VkDevice::discard`.
pub trait VkObjectDiscardable: Sized {

    fn discard_by(self, device: &VkDevice);
}

impl<'a, T> VkObjectDiscardable for &'a Vec<T>
    where
        T: VkObjectDiscardable + Copy {

    fn discard_by(self, device: &VkDevice) {

        for object in self.iter() {
            object.discard_by(device);
        }
    }
}

/// Vulkan objects allocated from a pool and freed back to it.
pub trait VkObjectAllocatable: Sized {
    type AllocatePool: Copy;

    fn free(self, device: &VkDevice, pool: Self::AllocatePool);
}

/// Vulkan objects which need to bind device memory before use.
pub trait VkObjectBindable: Sized {

    fn bind(self, device: &VkDevice, memory: vk::DeviceMemory, offset: vkbytes) -> VkResult<()>;
}

/// Synchronization primitives the host can wait on.
pub trait VkObjectWaitable: Sized {

    fn wait_for(self, device: &VkDevice, time: VkTimeDuration) -> VkResult<()>;
}

pub trait VkSubmitCI: Sized {

    fn submit(self, device: &VkDevice, queue: vk::Queue, wait_fence: vk::Fence) -> VkResult<()>;
}
