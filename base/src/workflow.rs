
pub use self::window::{WindowContext, WindowConfig, WindowMode};
pub use self::loops::ProcPipeline;

mod window;
mod loops;
mod fps;


use ash::vk;
use crate::context::{VkDevice, VkSwapchain};
use crate::input::EventController;
use crate::utils::frame::FrameAction;
use crate::error::VkResult;

/// The hooks an application provides to `ProcPipeline`.
pub trait RenderWorkflow {

    fn init(&mut self, _device: &VkDevice) -> VkResult<()> {
        Ok(())
    }

    /// Record and submit the commands of one frame.
    ///
    /// The submission must wait on `await_present`, signal `device_available` when done,
    /// and the returned semaphore is waited on by the presentation of `image_index`.
    fn render_frame(&mut self, device: &VkDevice, device_available: vk::Fence, await_present: vk::Semaphore, image_index: usize, delta_time: f32) -> VkResult<vk::Semaphore>;

    fn swapchain_reload(&mut self, _device: &VkDevice, _new_chain: &VkSwapchain) -> VkResult<()> {
        Ok(())
    }

    fn receive_input(&mut self, inputer: &EventController, delta_time: f32) -> FrameAction;

    /// Release the resources of the application, the device is idle at this point.
    fn deinit(self, device: &VkDevice) -> VkResult<()>;
}
