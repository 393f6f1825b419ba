
use ash::vk;

use crate::context::instance::VkInstance;
use crate::context::device::physical::VkPhysicalDevice;
use crate::context::device::logical::VkQueue;
use crate::error::{VkResult, VkError};
use crate::{vkfloat, vkuint};

type FamilyIndex   = usize;
type QueueIndex    = usize;
type QueuePriority = vkfloat;

/// Spreads queue requests over the queue families, preferring a family dedicated to the requested flags.
pub struct QueueRequester {

    // record the current create info of each queue family.
    cis: Vec<FamilyQueuesCreateInfo>,
    // the properties of each queue family queried from Vulkan.
    family_properties: Vec<vk::QueueFamilyProperties>,
    // record the family index and inner queue index of each requested queue.
    queues_requested: Vec<(FamilyIndex, QueueIndex)>,
}

#[derive(Default)]
struct FamilyQueuesCreateInfo {

    count: vkuint,
    priorities: Vec<QueuePriority>,
}

impl QueueRequester {

    pub fn new(instance: &VkInstance, phy: &VkPhysicalDevice) -> QueueRequester {

        let families = unsafe {
            instance.handle.get_physical_device_queue_family_properties(phy.handle)
        };

        QueueRequester::from_families(families)
    }

    fn from_families(families: Vec<vk::QueueFamilyProperties>) -> QueueRequester {

        let queue_cis = families.iter()
            .map(|_| FamilyQueuesCreateInfo::default())
            .collect();

        QueueRequester {
            cis: queue_cis,
            family_properties: families,
            queues_requested: Vec::new(),
        }
    }

    pub fn request_queue(&mut self, request_queue: vk::QueueFlags, priority: QueuePriority) -> VkResult<usize> {

        // get all support queue families.
        let mut candidate_families = self.candidate_family(request_queue);
        let mut selected_family = None;

        // try to find a dedicated queue family.
        let dedicated_family = candidate_families.iter().enumerate().find_map(|(pos, &family_index)| {
            if self.family_properties[family_index].queue_flags == request_queue {
                Some((family_index, pos))
            } else {
                None
            }
        });

        // check if there are enough queues remain in dedicated queue family.
        if let Some((dedicated_family_index, position)) = dedicated_family {

            if self.cis[dedicated_family_index].count < self.family_properties[dedicated_family_index].queue_count {
                selected_family = Some(dedicated_family_index);
            } else {
                // no queue remains in this family.
                candidate_families.remove(position);
            }
        }

        if selected_family.is_none() {

            // select the first family which has remaining queue.
            selected_family = candidate_families.iter().find(|&&family_index| {
                self.cis[family_index].count < self.family_properties[family_index].queue_count
            }).cloned();
        }

        if let Some(final_family) = selected_family {

            let queue_index = self.cis[final_family].count;

            // update queue family counts.
            self.cis[final_family].count += 1;
            self.cis[final_family].priorities.push(priority);

            let requested_index = self.queues_requested.len();
            self.queues_requested.push((final_family, queue_index as usize));

            Ok(requested_index)
        } else {
            Err(VkError::other(format!("Request Queue with flags({:?}) is not support on current Vulkan device.", request_queue)))
        }
    }

    fn candidate_family(&self, request_queue: vk::QueueFlags) -> Vec<FamilyIndex> {

        self.family_properties.iter().enumerate().filter_map(|(i, family)| {

            if family.queue_flags.contains(request_queue) {
                Some(i)
            } else {
                None
            }
        }).collect()
    }

    /// The queue create infos point into this requester, so it must outlive the device creation.
    pub fn queue_cis(&self) -> Vec<vk::DeviceQueueCreateInfo> {

        self.cis.iter().enumerate().filter_map(|(family_index, ci)| {

            if ci.count > 0 {
                let device_queue_ci = vk::DeviceQueueCreateInfo {
                    queue_family_index: family_index as _,
                    queue_count       : ci.priorities.len() as _,
                    p_queue_priorities: ci.priorities.as_ptr(),
                    ..Default::default()
                };
                Some(device_queue_ci)
            } else {
                None
            }
        }).collect()
    }

    pub fn dispatch_queue(&self, device: &ash::Device, queue_request_index: usize) -> VkQueue {

        let (family_index, queue_index) = self.queues_requested[queue_request_index];

        let handle = unsafe {
            device.get_device_queue(family_index as vkuint, queue_index as vkuint)
        };

        VkQueue {
            handle,
            family_index: family_index as _,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn family(flags: vk::QueueFlags, count: vkuint) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: count,
            ..Default::default()
        }
    }

    #[test]
    fn transfer_prefers_dedicated_family() {

        let families = vec![
            family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 1),
            family(vk::QueueFlags::TRANSFER, 2),
        ];
        let mut requester = QueueRequester::from_families(families);

        let graphics = requester.request_queue(vk::QueueFlags::GRAPHICS, 1.0).unwrap();
        let transfer = requester.request_queue(vk::QueueFlags::TRANSFER, 1.0).unwrap();

        assert_eq!(requester.queues_requested[graphics], (0, 0));
        assert_eq!(requester.queues_requested[transfer], (1, 0));
        assert_eq!(requester.queue_cis().len(), 2);
    }

    #[test]
    fn exhausted_family_is_reported() {

        let families = vec![family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, 1)];
        let mut requester = QueueRequester::from_families(families);

        assert!(requester.request_queue(vk::QueueFlags::GRAPHICS, 1.0).is_ok());
        assert!(requester.request_queue(vk::QueueFlags::TRANSFER, 1.0).is_err());
    }
}
