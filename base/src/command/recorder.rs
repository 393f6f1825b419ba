
use ash::vk;

use crate::command::VkCommandType;
use crate::context::VkDevice;
use crate::error::{VkResult, VkError};

use std::marker::PhantomData;

pub struct VkCmdRecorder<'a, T: VkCommandType> {

    phantom_marker: PhantomData<T>,

    pub(super) device: &'a VkDevice,
    pub(super) command: vk::CommandBuffer,
    usage: vk::CommandBufferUsageFlags,
}

impl<'a, T: VkCommandType> VkCmdRecorder<'a, T> {

    pub fn new(device: &'a VkDevice, command: vk::CommandBuffer) -> VkCmdRecorder<'a, T> {

        VkCmdRecorder {
            device, command,
            usage: vk::CommandBufferUsageFlags::empty(),
            phantom_marker: PhantomData,
        }
    }

    pub fn set_usage(&mut self, flags: vk::CommandBufferUsageFlags) {
        self.usage = flags;
    }

    pub fn command(&self) -> vk::CommandBuffer {
        self.command
    }

    pub fn begin_record(&self) -> VkResult<&VkCmdRecorder<'a, T>> {

        let begin_ci = vk::CommandBufferBeginInfo {
            flags: self.usage,
            ..Default::default()
        };

        unsafe {
            self.device.logic.handle.begin_command_buffer(self.command, &begin_ci)
                .or(Err(VkError::device("Begin Command Buffer.")))?;
        }
        Ok(self)
    }

    pub fn end_record(&self) -> VkResult<()> {

        unsafe {
            self.device.logic.handle.end_command_buffer(self.command)
                .or(Err(VkError::device("End Command Buffer.")))?;
        }
        Ok(())
    }

    pub fn reset_command(&self, flags: vk::CommandBufferResetFlags) -> VkResult<()> {

        unsafe {
            self.device.logic.handle.reset_command_buffer(self.command, flags)
                .or(Err(VkError::device("Reset Command Buffer.")))?;
        }
        Ok(())
    }
}
