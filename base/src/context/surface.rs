
use ash::vk;
use ash::extensions::khr::Surface;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use crate::context::instance::VkInstance;
use crate::error::{VkResult, VkError};
use crate::vkuint;

/// The presentation target of the window, with the loader of `VK_KHR_surface`.
pub struct VkSurface {

    pub(crate) handle: vk::SurfaceKHR,
    loader: Surface,
}

impl VkSurface {

    pub fn new(instance: &VkInstance, window: &winit::window::Window) -> VkResult<VkSurface> {

        let display = window.raw_display_handle();
        let handle = unsafe {
            ash_window::create_surface(&instance.entry, &instance.handle, display, window.raw_window_handle(), None)
                .or(Err(VkError::unlink("Platform Surface")))?
        };

        let loader = Surface::new(&instance.entry, &instance.handle);

        Ok(VkSurface { handle, loader })
    }

    pub fn query_is_family_presentable(&self, phy: vk::PhysicalDevice, family_index: vkuint) -> VkResult<bool> {

        unsafe {
            self.loader.get_physical_device_surface_support(phy, family_index, self.handle)
                .or(Err(VkError::query("Surface Support")))
        }
    }

    /// The current extent and image count bounds, queried again on every swapchain rebuild.
    pub fn query_capabilities(&self, phy: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR> {

        unsafe {
            self.loader.get_physical_device_surface_capabilities(phy, self.handle)
                .or(Err(VkError::query("Surface Capabilities")))
        }
    }

    pub fn query_formats(&self, phy: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>> {

        unsafe {
            self.loader.get_physical_device_surface_formats(phy, self.handle)
                .or(Err(VkError::query("Surface Formats")))
        }
    }

    pub fn query_present_modes(&self, phy: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>> {

        unsafe {
            self.loader.get_physical_device_surface_present_modes(phy, self.handle)
                .or(Err(VkError::query("Surface Present Modes")))
        }
    }

    /// The swapchain built on this surface must be destroyed first.
    pub(crate) fn discard(&self) {

        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}
