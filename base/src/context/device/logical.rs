
use ash::vk;

use crate::context::instance::VkInstance;
use crate::context::device::physical::VkPhysicalDevice;
use crate::context::device::queue::QueueRequester;
use crate::utils::cast::cstrings2ptrs;
use crate::error::{VkResult, VkError};
use crate::vkuint;


pub struct VkLogicalDevice {

    pub handle: ash::Device,
    pub queues: QueueFamilies,
}

pub struct QueueFamilies {
    /// records draws and buffer copies, and presents when its family supports the surface.
    pub graphics: VkQueue,
}

#[derive(Debug, Clone)]
pub struct VkQueue {
    pub handle: vk::Queue,
    pub family_index: vkuint,
}

impl VkLogicalDevice {

    pub fn new(instance: &VkInstance, phy: &VkPhysicalDevice) -> VkResult<VkLogicalDevice> {

        let mut queue_requester = QueueRequester::new(instance, phy);
        let graphics_request = queue_requester.request_queue(vk::QueueFlags::GRAPHICS, 1.0)?;

        // the create infos point into the requester, which lives until the device is created.
        let queue_cis = queue_requester.queue_cis();

        let enable_layer_names = cstrings2ptrs(&instance.enable_layer_names);
        let enable_extension_names = cstrings2ptrs(phy.enable_extensions());

        let device_ci = vk::DeviceCreateInfo {
            queue_create_info_count    : queue_cis.len() as _,
            p_queue_create_infos       : queue_cis.as_ptr(),
            enabled_layer_count        : enable_layer_names.len() as _,
            pp_enabled_layer_names     : enable_layer_names.as_ptr(),
            enabled_extension_count    : enable_extension_names.len() as _,
            pp_enabled_extension_names : enable_extension_names.as_ptr(),
            p_enabled_features         : phy.enable_features(),
            ..Default::default()
        };

        let handle = unsafe {
            instance.handle.create_device(phy.handle, &device_ci, None)
                .or(Err(VkError::create("Logical Device")))?
        };

        let queues = QueueFamilies {
            graphics: queue_requester.dispatch_queue(&handle, graphics_request),
        };
        log::debug!("Graphics queue family: {}.", queues.graphics.family_index);

        Ok(VkLogicalDevice { handle, queues })
    }

    pub fn discard(&self) {

        unsafe {
            self.handle.destroy_device(None);
        }
    }
}
