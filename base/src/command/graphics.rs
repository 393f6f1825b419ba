
use ash::vk;

use crate::command::VkCommandType;
use crate::command::recorder::VkCmdRecorder;
use crate::ci::pipeline::RenderPassBI;
use crate::{vkuint, vksint, vkbytes};


pub struct IGraphics;

impl VkCommandType for IGraphics {
    const BIND_POINT: vk::PipelineBindPoint = vk::PipelineBindPoint::GRAPHICS;
}

impl<'a> CmdGraphicsApi for VkCmdRecorder<'a, IGraphics> {

    fn begin_render_pass(&self, bi: RenderPassBI) -> &Self {

        // Only primary command buffers are recorded, so the subpass contents are always inline.
        let begin_info = bi.begin_info();
        unsafe {
            self.device.logic.handle.cmd_begin_render_pass(self.command, &begin_info, vk::SubpassContents::INLINE);
        } self
    }

    /// Set the viewport dynamically.
    fn set_viewport(&self, first_viewport: vkuint, viewports: &[vk::Viewport]) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_set_viewport(self.command, first_viewport, viewports);
        } self
    }

    /// Set the scissor rectangles dynamically.
    fn set_scissor(&self, first_scissor: vkuint, scissors: &[vk::Rect2D]) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_set_scissor(self.command, first_scissor, scissors);
        } self
    }

    fn bind_pipeline(&self, pipeline: vk::Pipeline) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_bind_pipeline(self.command, IGraphics::BIND_POINT, pipeline);
        } self
    }

    fn bind_vertex_buffers(&self, first_binding: vkuint, buffers: &[vk::Buffer], offsets: &[vkbytes]) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_bind_vertex_buffers(self.command, first_binding, buffers, offsets);
        } self
    }

    fn bind_index_buffer(&self, buffer: vk::Buffer, index_type: vk::IndexType, offset: vkbytes) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_bind_index_buffer(self.command, buffer, offset, index_type);
        } self
    }

    fn bind_descriptor_sets(&self, layout: vk::PipelineLayout, first_set: vkuint, descriptor_sets: &[vk::DescriptorSet], dynamic_offsets: &[vkuint]) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_bind_descriptor_sets(self.command, IGraphics::BIND_POINT, layout, first_set, descriptor_sets, dynamic_offsets);
        } self
    }

    fn draw(&self, vertex_count: vkuint, instance_count: vkuint, first_vertex: vkuint, first_instance: vkuint) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_draw(self.command, vertex_count, instance_count, first_vertex, first_instance);
        } self
    }

    fn draw_indexed(&self, index_count: vkuint, instance_count: vkuint, first_index: vkuint, vertex_offset: vksint, first_instance: vkuint) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_draw_indexed(self.command, index_count, instance_count, first_index, vertex_offset, first_instance);
        } self
    }

    fn end_render_pass(&self) -> &Self {
        // the render pass transitions the color attachment to PRESENT_SRC_KHR on its end.
        unsafe {
            self.device.logic.handle.cmd_end_render_pass(self.command);
        } self
    }
}

impl<'a> CmdPushConstantsApi for VkCmdRecorder<'a, IGraphics> {

    fn push_constants(&self, layout: vk::PipelineLayout, stage: vk::ShaderStageFlags, offset: vkuint, data: &[u8]) -> &Self {
        unsafe {
            self.device.logic.handle.cmd_push_constants(self.command, layout, stage, offset, data);
        } self
    }
}

pub trait CmdGraphicsApi: CmdPushConstantsApi {

    fn begin_render_pass(&self, bi: RenderPassBI) -> &Self;

    fn set_viewport(&self, first_viewport: vkuint, viewports: &[vk::Viewport]) -> &Self;

    fn set_scissor(&self, first_scissor: vkuint, scissors: &[vk::Rect2D]) -> &Self;

    fn bind_pipeline(&self, pipeline: vk::Pipeline) -> &Self;

    fn bind_vertex_buffers(&self, first_binding: vkuint, buffers: &[vk::Buffer], offsets: &[vkbytes]) -> &Self;

    fn bind_index_buffer(&self, buffer: vk::Buffer, index_type: vk::IndexType, offset: vkbytes) -> &Self;

    fn bind_descriptor_sets(&self, layout: vk::PipelineLayout, first_set: vkuint, descriptor_sets: &[vk::DescriptorSet], dynamic_offsets: &[vkuint]) -> &Self;

    fn draw(&self, vertex_count: vkuint, instance_count: vkuint, first_vertex: vkuint, first_instance: vkuint) -> &Self;

    fn draw_indexed(&self, index_count: vkuint, instance_count: vkuint, first_index: vkuint, vertex_offset: vksint, first_instance: vkuint) -> &Self;

    fn end_render_pass(&self) -> &Self;
}

/// Record a push-constants update into a command buffer.
///
/// The data becomes visible to every draw recorded after it in the same command buffer.
pub trait CmdPushConstantsApi {

    fn push_constants(&self, layout: vk::PipelineLayout, stage: vk::ShaderStageFlags, offset: vkuint, data: &[u8]) -> &Self;
}
