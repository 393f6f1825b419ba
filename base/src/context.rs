
pub use self::device::{VkDevice, VkLogicalDevice, VkPhysicalDevice, VkQueue};
pub use self::device::{VkObjectDiscardable, VkObjectAllocatable, VkObjectBindable};
pub use self::device::{VkObjectWaitable, VkSubmitCI};
pub use self::swapchain::{VkSwapchain, SwapchainSyncError};

pub use self::instance::InstanceConfig;
pub use self::debug::{ValidationConfig, DebugType};
pub use self::device::PhysicalDevConfig;
pub use self::swapchain::SwapchainConfig;

mod instance;
mod debug;
mod surface;
mod device;
mod swapchain;


use crate::workflow::WindowContext;
use crate::error::{VkResult, VkError};

#[derive(Default)]
pub struct VulkanConfig {

    instance  : InstanceConfig,
    debugger  : ValidationConfig,
    dev_phy   : PhysicalDevConfig,
    swapchain : SwapchainConfig,
}

pub struct VulkanContext {

    instance  : instance::VkInstance,
    debugger  : debug::VkDebugger,
    surface   : surface::VkSurface,

    pub swapchain: swapchain::VkSwapchain,
    pub device: device::VkDevice,
}

impl VulkanContext {

    pub fn new(window: &WindowContext) -> VulkanContextBuilder {

        VulkanContextBuilder {
            window,
            config: VulkanConfig::default(),
        }
    }

    pub(crate) fn recreate_swapchain(&mut self, window: &WindowContext) -> VkResult<()> {

        let dimension = window.dimension()?;
        self.swapchain.rebuild(&self.instance, &self.device, &self.surface, dimension)?;

        Ok(())
    }

    pub(crate) fn wait_idle(&self) -> VkResult<()> {
        unsafe {
            self.device.logic.handle.device_wait_idle()
                .map_err(|_| VkError::device("Device Waiting Idle"))?;
        }

        Ok(())
    }

    /// Destroy all the Vulkan objects owned by this context, in reverse order of their creation.
    pub(crate) fn discard(self) {

        self.swapchain.discard(&self.device);
        self.device.destroy();

        self.surface.discard();
        self.debugger.discard();
        self.instance.discard();
    }
}

pub struct VulkanContextBuilder<'a> {

    window: &'a WindowContext,
    config: VulkanConfig,
}

impl<'a> VulkanContextBuilder<'a> {

    pub fn with_instance_config(mut self, config: InstanceConfig) -> VulkanContextBuilder<'a> {
        self.config.instance = config; self
    }

    pub fn with_debugger_config(mut self, config: ValidationConfig) -> VulkanContextBuilder<'a> {
        self.config.debugger = config; self
    }

    pub fn with_physical_device_config(mut self, config: PhysicalDevConfig) -> VulkanContextBuilder<'a> {
        self.config.dev_phy = config; self
    }

    pub fn with_swapchain_config(mut self, config: SwapchainConfig) -> VulkanContextBuilder<'a> {
        self.config.swapchain = config; self
    }

    pub fn build(self) -> VkResult<VulkanContext> {

        let instance = instance::VkInstance::new(self.config.instance, &self.window.handle)?;
        let debugger = debug::VkDebugger::new(&instance, self.config.debugger)?;
        let surface = surface::VkSurface::new(&instance, &self.window.handle)?;

        let phy_device = device::VkPhysicalDevice::new(&instance, self.config.dev_phy)?;
        let logic_device = device::VkLogicalDevice::new(&instance, &phy_device)?;
        let vma = VulkanContextBuilder::build_vma(&instance, &phy_device, &logic_device)?;
        let device = device::VkDevice::new(logic_device, phy_device, vma);

        let dimension = self.window.dimension()?;
        let swapchain = swapchain::VkSwapchain::new(&instance, &device, &surface, self.config.swapchain, dimension, None)?;

        let context = VulkanContext { instance, debugger, surface, device, swapchain };
        Ok(context)
    }

    /// Create the Vulkan Memory Allocator used for every buffer of `logic_device`.
    fn build_vma(instance: &instance::VkInstance, phy_device: &device::VkPhysicalDevice, logic_device: &device::VkLogicalDevice) -> VkResult<vma::Allocator> {

        let allocator_ci = vma::AllocatorCreateInfo::new(&instance.handle, &logic_device.handle, phy_device.handle);

        #[allow(unused_unsafe)]
        let allocator = unsafe {
            vma::Allocator::new(allocator_ci)
                .map_err(|result| VkError::vma("create allocator", result))?
        };
        Ok(allocator)
    }
}
