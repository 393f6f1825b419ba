
use ash::vk;

use crate::ci::VulkanCI;
use crate::context::{VkSubmitCI, VkDevice};
use crate::error::{VkResult, VkError};

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::SubmitInfo.
///
/// The inner `vk::SubmitInfo` points into the vectors owned by this struct.
#[derive(Debug)]
pub struct SubmitCI {
    inner: vk::SubmitInfo,
    wait_stage        : Vec<vk::PipelineStageFlags>,
    wait_semaphores   : Vec<vk::Semaphore>,
    signal_semaphores : Vec<vk::Semaphore>,
    commands          : Vec<vk::CommandBuffer>,
}

impl VulkanCI<vk::SubmitInfo> for SubmitCI {

    fn default_ci() -> vk::SubmitInfo {
        vk::SubmitInfo::default()
    }
}

impl AsRef<vk::SubmitInfo> for SubmitCI {

    fn as_ref(&self) -> &vk::SubmitInfo {
        &self.inner
    }
}

impl SubmitCI {

    pub fn new() -> SubmitCI {
        SubmitCI {
            inner: SubmitCI::default_ci(),
            wait_stage        : Vec::new(),
            wait_semaphores   : Vec::new(),
            signal_semaphores : Vec::new(),
            commands          : Vec::new(),
        }
    }

    #[inline]
    pub fn add_command(mut self, command: vk::CommandBuffer) -> SubmitCI {
        self.commands.push(command);
        self.refresh(); self
    }

    #[inline]
    pub fn add_wait(mut self, stage: vk::PipelineStageFlags, semaphore: vk::Semaphore) -> SubmitCI {
        self.wait_stage.push(stage);
        self.wait_semaphores.push(semaphore);
        self.refresh(); self
    }

    #[inline]
    pub fn add_signal(mut self, semaphore: vk::Semaphore) -> SubmitCI {
        self.signal_semaphores.push(semaphore);
        self.refresh(); self
    }

    fn refresh(&mut self) {

        self.inner.wait_semaphore_count   = self.wait_semaphores.len() as _;
        self.inner.p_wait_semaphores      = self.wait_semaphores.as_ptr();
        self.inner.p_wait_dst_stage_mask  = self.wait_stage.as_ptr();
        self.inner.command_buffer_count   = self.commands.len() as _;
        self.inner.p_command_buffers      = self.commands.as_ptr();
        self.inner.signal_semaphore_count = self.signal_semaphores.len() as _;
        self.inner.p_signal_semaphores    = self.signal_semaphores.as_ptr();
    }
}

impl VkSubmitCI for SubmitCI {

    fn submit(self, device: &VkDevice, queue: vk::Queue, wait_fence: vk::Fence) -> VkResult<()> {
        unsafe {
            device.logic.handle.queue_submit(queue, &[self.inner], wait_fence)
                .map_err(|_| VkError::device("Queue Submit"))
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn submit_info_tracks_added_handles() {

        let ci = SubmitCI::new()
            .add_wait(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT, vk::Semaphore::null())
            .add_command(vk::CommandBuffer::null())
            .add_signal(vk::Semaphore::null())
            .add_signal(vk::Semaphore::null());

        let info = ci.as_ref();
        assert_eq!(info.wait_semaphore_count, 1);
        assert_eq!(info.command_buffer_count, 1);
        assert_eq!(info.signal_semaphore_count, 2);
        assert_eq!(info.p_command_buffers, ci.commands.as_ptr());
    }
}
