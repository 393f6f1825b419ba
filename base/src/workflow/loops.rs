
use ash::vk;
use winit::event::Event;
use winit::event_loop::ControlFlow;
use winit::platform::run_return::EventLoopExtRunReturn;

use crate::context::{VulkanContext, VkDevice, SwapchainSyncError};
use crate::workflow::RenderWorkflow;
use crate::workflow::window::WindowContext;
use crate::workflow::fps::FpsCounter;
use crate::input::EventController;
use crate::utils::time::VkTimeDuration;
use crate::utils::frame::{FrameCounter, FrameAction};
use crate::error::{VkResult, VkError};


/// The render loop: pumps window events, drives the application and presents its frames.
pub struct ProcPipeline {

    window: WindowContext,
    vulkan: VulkanContext,

    syncs: SyncResource,

    frame_counter: FrameCounter,
    fps_counter: FpsCounter,
}

impl ProcPipeline {

    pub fn new(window: WindowContext, vulkan: VulkanContext) -> VkResult<ProcPipeline> {

        let frame_in_flight = vulkan.swapchain.frame_in_flight();
        let syncs = SyncResource::new(&vulkan.device, frame_in_flight)?;
        let frame_counter = FrameCounter::new(frame_in_flight);

        let target = ProcPipeline {
            window, vulkan, syncs, frame_counter,
            fps_counter: FpsCounter::new(),
        };
        Ok(target)
    }

    pub fn frame_in_flight(&self) -> usize {
        self.vulkan.swapchain.frame_in_flight()
    }

    /// Run `app` until the window closes or the application asks to stop, then release everything.
    pub fn launch(mut self, mut app: impl RenderWorkflow) -> VkResult<()> {

        app.init(&self.vulkan.device)?;

        let loop_result = self.main_loop(&mut app);

        self.vulkan.wait_idle()?;
        // free the program specific resource first, and then the vulkan context.
        app.deinit(&self.vulkan.device)?;
        self.syncs.discard(&self.vulkan.device);
        self.vulkan.discard();

        loop_result
    }

    fn main_loop(&mut self, app: &mut impl RenderWorkflow) -> VkResult<()> {

        let mut event_loop = self.window.event_loop.take()
            .ok_or(VkError::window("Event loop is already in use."))?;

        let mut event_handler = EventController::default();
        let mut loop_result = Ok(());
        let mut is_finished = false;

        event_loop.run_return(|event, _, control_flow| {

            *control_flow = ControlFlow::Poll;

            if is_finished {
                *control_flow = ControlFlow::Exit;
                return
            }

            match event {
                | Event::WindowEvent { event, .. } => {
                    event_handler.record_event(&event);
                },
                | Event::MainEventsCleared => {
                    match self.run_frame(app, &mut event_handler) {
                        | Ok(FrameAction::Terminal) => {
                            is_finished = true;
                        },
                        | Ok(_) => {},
                        | Err(e) => {
                            loop_result = Err(e);
                            is_finished = true;
                        },
                    }

                    if is_finished {
                        *control_flow = ControlFlow::Exit;
                    }
                },
                | _ => {},
            }
        });

        self.window.event_loop = Some(event_loop);
        loop_result
    }

    fn run_frame(&mut self, app: &mut impl RenderWorkflow, event_handler: &mut EventController) -> VkResult<FrameAction> {

        let delta_time = self.fps_counter.delta_time();

        self.frame_counter.set_action(event_handler.current_action());
        self.frame_counter.set_action(app.receive_input(event_handler, delta_time));
        event_handler.tick_frame();

        match self.frame_counter.current_action() {
            | FrameAction::Terminal => {
                return Ok(FrameAction::Terminal)
            },
            | FrameAction::SwapchainRecreate => {
                self.recreate_swapchain(app)?;
            },
            | FrameAction::Rendering => {},
        }

        // nothing to draw on while the window is minimized.
        if self.window.dimension().is_err() {
            return Ok(FrameAction::Rendering)
        }

        let render_feedback = self.render_frame(app, delta_time)?;
        self.frame_counter.set_action(render_feedback);

        let action = self.frame_counter.current_action();
        if action == FrameAction::Rendering {
            self.frame_counter.next_frame();
        }

        self.fps_counter.tick_frame();
        if let Some(fps) = self.fps_counter.report() {
            self.window.display_fps(fps);
            log::debug!("{:.1} fps", fps);
        }

        Ok(action)
    }

    fn recreate_swapchain(&mut self, app: &mut impl RenderWorkflow) -> VkResult<()> {

        if self.window.dimension().is_err() {
            // try again once the window has an area.
            return Ok(())
        }

        self.vulkan.wait_idle()?;
        self.vulkan.recreate_swapchain(&self.window)?;
        app.swapchain_reload(&self.vulkan.device, &self.vulkan.swapchain)?;

        // the image count may change with the swapchain, and an image acquired before
        // the rebuild leaves its semaphore signaled.
        let frame_in_flight = self.vulkan.swapchain.frame_in_flight();
        self.syncs.discard(&self.vulkan.device);
        self.syncs = SyncResource::new(&self.vulkan.device, frame_in_flight)?;
        self.frame_counter = FrameCounter::new(frame_in_flight);

        log::info!("Swapchain recreated: {}x{}, {} images.",
            self.vulkan.swapchain.dimension.width, self.vulkan.swapchain.dimension.height, frame_in_flight);
        Ok(())
    }

    fn render_frame(&mut self, app: &mut impl RenderWorkflow, delta_time: f32) -> VkResult<FrameAction> {

        let device = &self.vulkan.device;
        let current_frame = self.frame_counter.current_frame();

        // wait and acquire next image. -------------------------------------
        let fence_ready = self.syncs.sync_fences[current_frame];
        let await_present = self.syncs.await_presents[current_frame];
        wait_fence(device, fence_ready)?;

        let acquire_image_index = match self.vulkan.swapchain.next_image(Some(await_present), None) {
            | Ok(image_index) => image_index as usize,
            | Err(e) => return sync_feedback(e),
        };

        // the image may still be rendered by an earlier frame.
        let image_fence = self.syncs.images_in_flight[acquire_image_index];
        if image_fence != vk::Fence::null() && image_fence != fence_ready {
            wait_fence(device, image_fence)?;
        }
        self.syncs.images_in_flight[acquire_image_index] = fence_ready;

        unsafe {
            device.logic.handle.reset_fences(&[fence_ready])
                .map_err(|_| VkError::device("Fence Resetting"))?;
        }
        // ------------------------------------------------------------------

        // call command buffer(activate pipeline to draw) -------------------
        let await_render = app.render_frame(device, fence_ready, await_present, acquire_image_index, delta_time)?;
        // ------------------------------------------------------------------

        // present image. ---------------------------------------------------
        match self.vulkan.swapchain.present(&[await_render], acquire_image_index as _) {
            | Ok(_) => Ok(FrameAction::Rendering),
            | Err(e) => sync_feedback(e),
        }
        // ------------------------------------------------------------------
    }
}

fn wait_fence(device: &VkDevice, fence: vk::Fence) -> VkResult<()> {

    unsafe {
        device.logic.handle.wait_for_fences(&[fence], true, VkTimeDuration::Infinite.into())
            .map_err(|_| VkError::device("Fence Waiting"))
    }
}

fn sync_feedback(error: SwapchainSyncError) -> VkResult<FrameAction> {

    match error {
        | SwapchainSyncError::SurfaceOutDate
        | SwapchainSyncError::SubOptimal => {
            Ok(FrameAction::SwapchainRecreate)
        },
        | SwapchainSyncError::TimeOut
        | SwapchainSyncError::Unknown => {
            Err(VkError::other(error.to_string()))
        },
    }
}



struct SyncResource {

    await_presents: Vec<vk::Semaphore>,
    sync_fences   : Vec<vk::Fence>,
    // the fence of the frame which last rendered to each swapchain image.
    images_in_flight: Vec<vk::Fence>,
}

impl SyncResource {

    fn new(device: &VkDevice, frame_count: usize) -> VkResult<SyncResource> {

        use crate::ci::sync::{SemaphoreCI, FenceCI};

        let mut await_presents = Vec::with_capacity(frame_count);
        let mut sync_fences = Vec::with_capacity(frame_count);

        let semaphore_ci = SemaphoreCI::new();
        let fence_ci = FenceCI::new(true);

        for _ in 0..frame_count {
            await_presents.push(device.build(&semaphore_ci)?);
            sync_fences.push(device.build(&fence_ci)?);
        }

        let syncs = SyncResource {
            await_presents, sync_fences,
            images_in_flight: vec![vk::Fence::null(); frame_count],
        };
        Ok(syncs)
    }

    fn discard(&mut self, device: &VkDevice) {

        device.discard(&self.await_presents);
        device.discard(&self.sync_fences);

        self.await_presents.clear();
        self.sync_fences.clear();
        self.images_in_flight.clear();
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn stale_swapchain_requests_recreation() {

        assert_eq!(sync_feedback(SwapchainSyncError::SurfaceOutDate).unwrap(), FrameAction::SwapchainRecreate);
        assert_eq!(sync_feedback(SwapchainSyncError::SubOptimal).unwrap(), FrameAction::SwapchainRecreate);
        assert!(sync_feedback(SwapchainSyncError::TimeOut).is_err());
    }
}
