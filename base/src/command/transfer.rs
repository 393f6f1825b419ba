
use ash::vk;

use crate::ci::sync::FenceCI;
use crate::ci::device::SubmitCI;
use crate::ci::command::CommandBufferAI;

use crate::command::VkCommandType;
use crate::command::recorder::VkCmdRecorder;
use crate::context::VkDevice;

use crate::utils::time::VkTimeDuration;
use crate::error::{VkResult, VkError};

pub struct ITransfer;

impl VkCommandType for ITransfer {
    const BIND_POINT: vk::PipelineBindPoint = vk::PipelineBindPoint::GRAPHICS;
}

impl<'a> VkCmdRecorder<'a, ITransfer> {

    /// Allocate a primary command buffer from `pool` and start a one-time recording on it.
    pub fn one_time(device: &'a VkDevice, pool: vk::CommandPool) -> VkResult<VkCmdRecorder<'a, ITransfer>> {

        let command = device.build(&CommandBufferAI::new(pool, 1))?
            .pop()
            .ok_or(VkError::create("Command Buffer"))?;

        let mut recorder = VkCmdRecorder::new(device, command);
        recorder.set_usage(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        if let Err(e) = recorder.begin_record() {
            device.free(command, pool);
            return Err(e)
        }
        Ok(recorder)
    }

    /// End the recording, submit it to `queue` and block until the copy finished.
    pub fn flush_copy_command(&self, queue: vk::Queue) -> VkResult<()> {

        self.end_record()?;

        let submit_ci = SubmitCI::new()
            .add_command(self.command);

        let wait_fence = self.device.build(&FenceCI::new(false))?;
        let finished = self.device.submit(submit_ci, queue, wait_fence)
            .and_then(|_| self.device.wait(wait_fence, VkTimeDuration::Infinite));
        self.device.discard(wait_fence);

        finished
    }
}

impl<'a> CmdTransferApi for VkCmdRecorder<'a, ITransfer> {

    fn copy_buf2buf(&self, src: vk::Buffer, dst: vk::Buffer, regions: &[vk::BufferCopy]) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_copy_buffer(self.command, src, dst, regions);
        } self
    }
}

pub trait CmdTransferApi {

    fn copy_buf2buf(&self, src_buffer_handle: vk::Buffer, dst_buffer_handle: vk::Buffer, regions: &[vk::BufferCopy]) -> &Self;
}
