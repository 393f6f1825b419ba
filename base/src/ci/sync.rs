
use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable, VkObjectWaitable};
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::utils::time::VkTimeDuration;
use crate::error::{VkResult, VkError};

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::SemaphoreCreateInfo.
#[derive(Debug, Clone)]
pub struct SemaphoreCI {
    inner: vk::SemaphoreCreateInfo,
}

impl VulkanCI<vk::SemaphoreCreateInfo> for SemaphoreCI {

    fn default_ci() -> vk::SemaphoreCreateInfo {
        vk::SemaphoreCreateInfo::default()
    }
}

impl AsRef<vk::SemaphoreCreateInfo> for SemaphoreCI {

    fn as_ref(&self) -> &vk::SemaphoreCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for SemaphoreCI {
    type ObjectType = vk::Semaphore;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let semaphore = unsafe {
            device.logic.handle.create_semaphore(self.as_ref(), None)
                .map_err(|_| VkError::create("Semaphore"))?
        };
        Ok(semaphore)
    }
}

impl SemaphoreCI {

    pub fn new() -> SemaphoreCI {

        SemaphoreCI {
            inner: SemaphoreCI::default_ci(),
        }
    }
}

impl VkObjectDiscardable for vk::Semaphore {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_semaphore(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::FenceCreateInfo.
#[derive(Debug, Clone)]
pub struct FenceCI {
    inner: vk::FenceCreateInfo,
}

impl VulkanCI<vk::FenceCreateInfo> for FenceCI {

    fn default_ci() -> vk::FenceCreateInfo {
        vk::FenceCreateInfo::default()
    }
}

impl AsRef<vk::FenceCreateInfo> for FenceCI {

    fn as_ref(&self) -> &vk::FenceCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for FenceCI {
    type ObjectType = vk::Fence;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let fence = unsafe {
            device.logic.handle.create_fence(self.as_ref(), None)
                .or(Err(VkError::create("Fence")))?
        };
        Ok(fence)
    }
}

impl FenceCI {

    /// `is_signed` creates the fence in signaled state, so the first wait on it returns immediately.
    pub fn new(is_signed: bool) -> FenceCI {

        let mut fence = FenceCI { inner: FenceCI::default_ci() };

        if is_signed {
            fence.inner.flags = vk::FenceCreateFlags::SIGNALED;
        }

        fence
    }
}

impl VkObjectDiscardable for vk::Fence {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_fence(self, None);
        }
    }
}

impl VkObjectWaitable for vk::Fence {

    fn wait_for(self, device: &VkDevice, time: VkTimeDuration) -> VkResult<()> {

        unsafe {
            device.logic.handle.wait_for_fences(&[self], true, time.into())
                .map_err(|_| VkError::device("Fence Waiting"))?;
            device.logic.handle.reset_fences(&[self])
                .map_err(|_| VkError::device("Fence Resetting"))
        }
    }
}
// ----------------------------------------------------------------------------------------------
