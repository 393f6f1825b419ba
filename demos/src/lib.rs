
use ash::vk;

use vkbase::context::{VkDevice, VkSwapchain};
use vkbase::ci::VkObjectBuildableCI;
use vkbase::ci::sync::SemaphoreCI;
use vkbase::ci::pipeline::*;
use vkbase::VkResult;

pub const DEFAULT_CLEAR_COLOR: vk::ClearValue = vk::ClearValue {
    color: vk::ClearColorValue {
        float32: [0.025, 0.025, 0.025, 1.0]
    }
};

pub const DEFAULT_CLEAR_DEPTH: vk::ClearValue = vk::ClearValue {
    depth_stencil: vk::ClearDepthStencilValue {
        depth: 1.0,
        stencil: 0,
    }
};


/// The resources every example renders with: one framebuffer, command buffer and semaphore per swapchain image.
pub struct VkExampleBackend {

    pub dimension: vk::Extent2D,
    pub render_pass: vk::RenderPass,
    pub framebuffers: Vec<vk::Framebuffer>,

    /// signaled when the rendering of the corresponding swapchain image finishes.
    pub await_rendering: Vec<vk::Semaphore>,

    pub command_pool: vk::CommandPool,
    /// render command buffer for each framebuffer.
    pub commands: Vec<vk::CommandBuffer>,

    depth_image: DepthImage,
}

struct DepthImage {
    image: vk::Image,
    view : vk::ImageView,
    memory: vk::DeviceMemory,
}

impl VkExampleBackend {

    pub fn new(device: &VkDevice, swapchain: &VkSwapchain, render_pass: vk::RenderPass) -> VkResult<VkExampleBackend> {

        let command_pool = setup_command_pool(device)?;
        let commands = setup_commands(device, command_pool, swapchain.frame_in_flight())?;
        let await_rendering = setup_semaphores(device, swapchain.frame_in_flight())?;
        let depth_image = setup_depth_image(device, swapchain.dimension)?;

        let mut target = VkExampleBackend {
            dimension: swapchain.dimension,
            framebuffers: Vec::new(),
            render_pass, depth_image, await_rendering, command_pool, commands,
        };
        target.setup_framebuffers(device, swapchain)?;

        Ok(target)
    }

    fn setup_framebuffers(&mut self, device: &VkDevice, swapchain: &VkSwapchain) -> VkResult<()> {

        // create a frame buffer for every image in the swapchain.
        self.framebuffers = Vec::with_capacity(swapchain.frame_in_flight());

        for image in swapchain.images.iter() {

            // color attachment is the view of the swapchain image.
            let framebuffer = FramebufferCI::new_2d(self.render_pass, self.dimension)
                .add_attachment(image.view)
                .add_attachment(self.depth_image.view)
                .build(device)?;
            self.framebuffers.push(framebuffer);
        }

        Ok(())
    }

    /// Rebuild every size or image count dependent resource for `new_chain`, rendering with `render_pass` from now on.
    pub fn swapchain_reload(&mut self, device: &VkDevice, new_chain: &VkSwapchain, render_pass: vk::RenderPass) -> VkResult<()> {

        self.dimension = new_chain.dimension;

        self.depth_image.discard(device);
        self.depth_image = setup_depth_image(device, self.dimension)?;

        for &framebuffer in self.framebuffers.iter() {
            device.discard(framebuffer);
        }
        device.discard(self.render_pass);
        self.render_pass = render_pass;
        self.setup_framebuffers(device, new_chain)?;

        // the image count of the new swapchain may differ from the old one.
        device.free(self.commands.as_slice(), self.command_pool);
        self.commands = setup_commands(device, self.command_pool, new_chain.frame_in_flight())?;

        for &semaphore in self.await_rendering.iter() {
            device.discard(semaphore);
        }
        self.await_rendering = setup_semaphores(device, new_chain.frame_in_flight())?;

        Ok(())
    }

    pub fn discard(&self, device: &VkDevice) {

        for &framebuffer in self.framebuffers.iter() {
            device.discard(framebuffer);
        }
        device.discard(self.render_pass);

        device.free(self.commands.as_slice(), self.command_pool);
        device.discard(self.command_pool);

        self.depth_image.discard(device);

        for &semaphore in self.await_rendering.iter() {
            device.discard(semaphore);
        }
    }
}

impl DepthImage {

    fn discard(&self, device: &VkDevice) {
        device.discard(self.view);
        device.discard(self.image);
        device.discard(self.memory);
    }
}

/// A render pass with one color attachment for the swapchain image and one depth attachment.
pub fn setup_renderpass(device: &VkDevice, swapchain: &VkSwapchain) -> VkResult<vk::RenderPass> {

    let subpass = SubpassDescCI::graphics()
        .color(0)
        .depth_stencil(1);

    // the previous frame must be presented before its image is cleared again.
    let acquire = SubpassDependencyCI::new(vk::SUBPASS_EXTERNAL, 0)
        .wait(vk::PipelineStageFlags::BOTTOM_OF_PIPE, vk::AccessFlags::MEMORY_READ)
        .before(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE);

    let present = SubpassDependencyCI::new(0, vk::SUBPASS_EXTERNAL)
        .wait(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT, vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
        .before(vk::PipelineStageFlags::BOTTOM_OF_PIPE, vk::AccessFlags::MEMORY_READ);

    let render_pass = RenderPassCI::new()
        .add_attachment(AttachmentDescCI::present_target(swapchain.format))
        .add_attachment(AttachmentDescCI::transient_depth(device.phy.depth_format))
        .add_subpass(subpass)
        .add_dependency(acquire)
        .add_dependency(present)
        .build(device)?;

    Ok(render_pass)
}

fn setup_depth_image(device: &VkDevice, dimension: vk::Extent2D) -> VkResult<DepthImage> {

    use vkbase::ci::image::{ImageCI, ImageViewCI, depth_aspect};
    use vkbase::ci::memory::MemoryAI;

    let depth_format = device.phy.depth_format;

    let (image, image_requirement) = ImageCI::new_2d(depth_format, dimension)
        .usages(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
        .build(device)?;

    let memory = MemoryAI::from_requirement(device, &image_requirement, vk::MemoryPropertyFlags::DEVICE_LOCAL)?
        .build(device)?;

    // bind depth image to memory.
    device.bind_memory(image, memory, 0)?;

    let view = ImageViewCI::new(image, vk::ImageViewType::TYPE_2D, depth_format)
        .aspect_mask(depth_aspect(depth_format))
        .build(device)?;

    let result = DepthImage { image, view, memory };
    Ok(result)
}

fn setup_command_pool(device: &VkDevice) -> VkResult<vk::CommandPool> {

    use vkbase::ci::command::CommandPoolCI;

    CommandPoolCI::new(device.logic.queues.graphics.family_index)
        .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
        .build(device)
}

fn setup_commands(device: &VkDevice, pool: vk::CommandPool, count: usize) -> VkResult<Vec<vk::CommandBuffer>> {

    use vkbase::ci::command::CommandBufferAI;

    CommandBufferAI::new(pool, count as _)
        .build(device)
}

fn setup_semaphores(device: &VkDevice, count: usize) -> VkResult<Vec<vk::Semaphore>> {

    (0..count).map(|_| device.build(&SemaphoreCI::new())).collect()
}
