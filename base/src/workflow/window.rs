
use ash::vk;
use serde::Deserialize;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder, Fullscreen};
use winit::dpi::{PhysicalSize, LogicalSize};

use crate::error::{VkResult, VkError};


pub struct WindowConfig {

    pub title: String,
    pub mode: WindowMode,

    pub dimension: vk::Extent2D,
    pub max_dimension: Option<vk::Extent2D>,
    pub min_dimension: Option<vk::Extent2D>,

    pub always_on_top: bool,
    pub is_resizable: bool,
}

impl Default for WindowConfig {

    fn default() -> WindowConfig {

        WindowConfig {
            title: String::from("Vulkan Example"),
            mode: WindowMode::Normal,

            dimension: vk::Extent2D {
                width : 1280,
                height: 720,
            },
            max_dimension: None,
            min_dimension: None,

            always_on_top: false,
            is_resizable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    Normal,
    Maximized,
    Fullscreen,
}


pub struct WindowContext {

    // taken by the render loop while it runs.
    pub(crate) event_loop: Option<EventLoop<()>>,
    pub(crate) handle: Window,
    title: String,
}

impl WindowContext {

    pub fn new(config: WindowConfig) -> VkResult<WindowContext> {

        let event_loop = EventLoop::new();

        let mut builder = WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.dimension.width, config.dimension.height))
            .with_always_on_top(config.always_on_top)
            .with_resizable(config.is_resizable);

        if let Some(min) = config.min_dimension {
            builder = builder.with_min_inner_size(LogicalSize::new(min.width, min.height));
        }

        if let Some(max) = config.max_dimension {
            builder = builder.with_max_inner_size(LogicalSize::new(max.width, max.height));
        }

        builder = match config.mode {
            | WindowMode::Maximized => {
                builder.with_maximized(true)
            },
            | WindowMode::Fullscreen => {
                // borderless on the primary monitor, or on the current one when it is unknown.
                builder.with_fullscreen(Some(Fullscreen::Borderless(event_loop.primary_monitor())))
            },
            | WindowMode::Normal => {
                builder
            },
        };

        let handle = builder.build(&event_loop)
            .map_err(|e| VkError::window(e.to_string()))?;

        let window = WindowContext {
            event_loop: Some(event_loop),
            handle,
            title: config.title,
        };
        Ok(window)
    }

    /// The size of the drawable area in pixels.
    pub fn dimension(&self) -> VkResult<vk::Extent2D> {

        let PhysicalSize { width, height } = self.handle.inner_size();

        if width == 0 || height == 0 {
            Err(VkError::window("Window has no drawable area."))
        } else {
            Ok(vk::Extent2D { width, height })
        }
    }

    /// Show `fps` after the title given at creation.
    pub(crate) fn display_fps(&self, fps: f32) {
        self.handle.set_title(&format!("{} - {:.0} fps", self.title, fps));
    }
}
