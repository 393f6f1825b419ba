
use ash::vk;
use failure_derive::Fail;

use crate::context::instance::VkInstance;
use crate::context::device::{VkDevice, VkQueue};
use crate::context::surface::VkSurface;
use crate::error::{VkResult, VkError};
use crate::{vkuint, vklint};

#[derive(Debug, Clone)]
pub struct SwapchainConfig {

    pub present_vsync: bool,
    pub dimension_preference: vk::Extent2D,
    pub image_acquire_time: vklint,
}

impl Default for SwapchainConfig {

    fn default() -> SwapchainConfig {
        SwapchainConfig {
            present_vsync: true,
            dimension_preference: vk::Extent2D { width: 1280, height: 720 },
            image_acquire_time: vklint::MAX,
        }
    }
}

pub struct VkSwapchain {

    /// handle of `vk::SwapchainKHR`.
    handle: vk::SwapchainKHR,
    /// the extension loader provides functions for creation and destruction of `vk::SwapchainKHR` object.
    loader: ash::extensions::khr::Swapchain,
    /// the queue used to present image.
    present_queue: VkQueue,

    /// image resources of current swapchain.
    pub images: Vec<SwapchainImage>,
    /// the format of presentable images.
    pub format: vk::Format,
    /// the dimension of presentable images.
    pub dimension: vk::Extent2D,

    config: SwapchainConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct SwapchainImage {

    /// the presentable image created by swapchain and destroyed together with it.
    pub image: vk::Image,
    /// the corresponding image view of the presentable image.
    pub view : vk::ImageView,
}

#[derive(Debug, Fail)]
pub enum SwapchainSyncError {
    #[fail(display = "No image became available within the time allowed.")]
    TimeOut,
    #[fail(display = "Swapchain does not match the surface properties exactly.")]
    SubOptimal,
    #[fail(display = "Surface has changed and is not compatible with the swapchain.")]
    SurfaceOutDate,
    #[fail(display = "Get unknown error when acquiring image.")]
    Unknown,
}

impl VkSwapchain {

    pub(crate) fn new(instance: &VkInstance, device: &VkDevice, surface: &VkSurface, config: SwapchainConfig, dimension: vk::Extent2D, old_chain: Option<vk::SwapchainKHR>) -> VkResult<VkSwapchain> {

        let present_queue = query_present_queue(device, surface)?
            .ok_or(VkError::other("Graphics Queue is not support to present image to platform's surface."))?;
        let swapchain_format = query_optimal_format(device, surface)?;
        let swapchain_capability = query_swapchain_capability(device, surface, dimension)?;
        let swapchain_present_mode = query_optimal_present_mode(device, surface, &config)?;

        let swapchain_ci = vk::SwapchainCreateInfoKHR {
            surface           : surface.handle,
            min_image_count   : swapchain_capability.desired_image_count,
            image_format      : swapchain_format.color_format,
            image_color_space : swapchain_format.color_space,
            image_extent      : swapchain_capability.swapchain_extent,
            image_array_layers: 1,
            image_usage       : swapchain_capability.support_usage,
            image_sharing_mode: vk::SharingMode::EXCLUSIVE,
            pre_transform     : swapchain_capability.pre_transform,
            composite_alpha   : swapchain_capability.composite_alpha,
            present_mode      : swapchain_present_mode,
            // allows the implementation to discard rendering outside of the surface area.
            clipped           : vk::TRUE,
            old_swapchain     : old_chain.unwrap_or(vk::SwapchainKHR::null()),
            ..Default::default()
        };

        let loader = ash::extensions::khr::Swapchain::new(&instance.handle, &device.logic.handle);

        let handle = unsafe {
            loader.create_swapchain(&swapchain_ci, None)
                .or(Err(VkError::create("Swapchain")))?
        };

        let images = obtain_swapchain_images(device, handle, &loader, swapchain_format.color_format)?;

        log::info!("Swapchain: {} images of {}x{}, {:?}, {:?}.",
            images.len(), swapchain_capability.swapchain_extent.width, swapchain_capability.swapchain_extent.height,
            swapchain_format.color_format, swapchain_present_mode);

        let result = VkSwapchain {
            handle, loader, present_queue, config, images,
            format: swapchain_format.color_format,
            dimension: swapchain_capability.swapchain_extent,
        };

        Ok(result)
    }

    /// Replace this swapchain by a new one which fits `dimension`, reusing the old handle during creation.
    pub(crate) fn rebuild(&mut self, instance: &VkInstance, device: &VkDevice, surface: &VkSurface, dimension: vk::Extent2D) -> VkResult<()> {

        let new_chain = VkSwapchain::new(instance, device, surface, self.config.clone(), dimension, Some(self.handle))?;
        let old_chain = std::mem::replace(self, new_chain);

        // destroying the old swapchain also cleans up all its presentable images.
        old_chain.discard(device);

        Ok(())
    }

    /// The number of frames which can be recorded while others are still in flight.
    #[inline]
    pub fn frame_in_flight(&self) -> usize {
        self.images.len()
    }

    /// Acquire an available presentable image to use, and retrieve the index of that image.
    ///
    /// `semaphore` is signaled once the image is ready to render to.
    pub fn next_image(&self, semaphore: Option<vk::Semaphore>, fence: Option<vk::Fence>) -> Result<vkuint, SwapchainSyncError> {

        let semaphore = semaphore.unwrap_or(vk::Semaphore::null());
        let fence = fence.unwrap_or(vk::Fence::null());

        let (image_index, is_sub_optimal) = unsafe {
            self.loader.acquire_next_image(self.handle, self.config.image_acquire_time, semaphore, fence)
                .map_err(|error| match error {
                    | vk::Result::TIMEOUT               => SwapchainSyncError::TimeOut,
                    | vk::Result::ERROR_OUT_OF_DATE_KHR => SwapchainSyncError::SurfaceOutDate,
                    | _ => SwapchainSyncError::Unknown,
                })?
        };

        if is_sub_optimal {
            Err(SwapchainSyncError::SubOptimal)
        } else {
            Ok(image_index)
        }
    }

    /// Queue an image for presentation after all `wait_semaphores` are signaled.
    pub fn present(&self, wait_semaphores: &[vk::Semaphore], image_index: vkuint) -> Result<(), SwapchainSyncError> {

        // only support single swapchain and single image index.
        let present_info = vk::PresentInfoKHR {
            wait_semaphore_count: wait_semaphores.len() as _,
            p_wait_semaphores   : wait_semaphores.as_ptr(),
            swapchain_count     : 1,
            p_swapchains        : &self.handle,
            p_image_indices     : &image_index,
            ..Default::default()
        };

        let is_sub_optimal = unsafe {
            self.loader.queue_present(self.present_queue.handle, &present_info)
                .map_err(|error| match error {
                    | vk::Result::ERROR_OUT_OF_DATE_KHR => SwapchainSyncError::SurfaceOutDate,
                    | _ => SwapchainSyncError::Unknown,
                })?
        };

        if is_sub_optimal {
            Err(SwapchainSyncError::SubOptimal)
        } else {
            Ok(())
        }
    }

    /// Destroy the image views and the `vk::SwapchainKHR` object.
    ///
    /// All outstanding operations on acquired images must be completed before calling this method.
    pub(crate) fn discard(&self, device: &VkDevice) {

        unsafe {

            self.images.iter().for_each(|swapchain_image| {
                device.logic.handle.destroy_image_view(swapchain_image.view, None);
            });

            self.loader.destroy_swapchain(self.handle, None);
        }
    }
}


// -----------------------------------------------------------------------------------
fn query_present_queue(device: &VkDevice, surface: &VkSurface) -> VkResult<Option<VkQueue>> {

    // only the graphics queue is considered for presentation.
    let graphics_queue = &device.logic.queues.graphics;

    if surface.query_is_family_presentable(device.phy.handle, graphics_queue.family_index)? {
        Ok(Some(graphics_queue.clone()))
    } else {
        Ok(None)
    }
}

fn obtain_swapchain_images(device: &VkDevice, swapchain: vk::SwapchainKHR, loader: &ash::extensions::khr::Swapchain, format: vk::Format) -> VkResult<Vec<SwapchainImage>> {

    let image_handles = unsafe {
        loader.get_swapchain_images(swapchain)
            .or(Err(VkError::query("Swapchain Images")))?
    };

    let mut result = Vec::with_capacity(image_handles.len());

    for image in image_handles.into_iter() {

        let view_ci = vk::ImageViewCreateInfo {
            image, format,
            view_type  : vk::ImageViewType::TYPE_2D,
            components : vk::ComponentMapping {
                r: vk::ComponentSwizzle::R,
                g: vk::ComponentSwizzle::G,
                b: vk::ComponentSwizzle::B,
                a: vk::ComponentSwizzle::A,
            },
            subresource_range: vk::ImageSubresourceRange {
                aspect_mask     : vk::ImageAspectFlags::COLOR,
                base_mip_level  : 0,
                level_count     : 1,
                base_array_layer: 0,
                layer_count     : 1,
            },
            ..Default::default()
        };

        let view = unsafe {
            device.logic.handle.create_image_view(&view_ci, None)
                .or(Err(VkError::create("Image View")))?
        };

        result.push(SwapchainImage { image, view });
    }

    Ok(result)
}
// -----------------------------------------------------------------------------------

// -----------------------------------------------------------------------------------
fn query_optimal_present_mode(device: &VkDevice, surface: &VkSurface, config: &SwapchainConfig) -> VkResult<vk::PresentModeKHR> {

    let available_modes = surface.query_present_modes(device.phy.handle)?;
    Ok(select_present_mode(&available_modes, config.present_vsync))
}

fn select_present_mode(available_modes: &[vk::PresentModeKHR], vsync: bool) -> vk::PresentModeKHR {

    // FIFO waits for the vertical blank and is always available.
    if vsync {
        return vk::PresentModeKHR::FIFO
    }

    // MAILBOX is the lowest latency non-tearing mode, fall back to IMMEDIATE.
    if available_modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else if available_modes.contains(&vk::PresentModeKHR::IMMEDIATE) {
        vk::PresentModeKHR::IMMEDIATE
    } else {
        vk::PresentModeKHR::FIFO
    }
}
// -----------------------------------------------------------------------------------

// -----------------------------------------------------------------------------------
struct SwapchainFormat {
    color_format: vk::Format,
    color_space : vk::ColorSpaceKHR,
}

fn query_optimal_format(device: &VkDevice, surface: &VkSurface) -> VkResult<SwapchainFormat> {

    let support_formats = surface.query_formats(device.phy.handle)?;
    select_format(&support_formats)
        .ok_or(VkError::query("Surface Formats"))
}

fn select_format(support_formats: &[vk::SurfaceFormatKHR]) -> Option<SwapchainFormat> {

    let first = support_formats.first()?;

    // a single UNDEFINED entry means there is no preferred format.
    if support_formats.len() == 1 && first.format == vk::Format::UNDEFINED {
        return Some(SwapchainFormat {
            color_format: vk::Format::B8G8R8A8_UNORM,
            color_space : first.color_space,
        })
    }

    let preferred = support_formats.iter()
        .find(|surface_format| surface_format.format == vk::Format::B8G8R8A8_UNORM)
        .unwrap_or(first);

    Some(SwapchainFormat {
        color_format: preferred.format,
        color_space : preferred.color_space,
    })
}
// -----------------------------------------------------------------------------------

// -----------------------------------------------------------------------------------
struct SwapchainCapability {

    support_usage: vk::ImageUsageFlags,
    desired_image_count: vkuint,
    swapchain_extent: vk::Extent2D,
    pre_transform: vk::SurfaceTransformFlagsKHR,
    composite_alpha: vk::CompositeAlphaFlagsKHR,
}

fn query_swapchain_capability(device: &VkDevice, surface: &VkSurface, dimension: vk::Extent2D) -> VkResult<SwapchainCapability> {

    let surface_caps = surface.query_capabilities(device.phy.handle)?;

    let mut image_usage = vk::ImageUsageFlags::COLOR_ATTACHMENT;
    if surface_caps.supported_usage_flags.contains(vk::ImageUsageFlags::TRANSFER_SRC) {
        image_usage |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if surface_caps.supported_usage_flags.contains(vk::ImageUsageFlags::TRANSFER_DST) {
        image_usage |= vk::ImageUsageFlags::TRANSFER_DST;
    }

    let surface_transform = if surface_caps.supported_transforms.contains(vk::SurfaceTransformFlagsKHR::IDENTITY) {
        vk::SurfaceTransformFlagsKHR::IDENTITY
    } else {
        surface_caps.current_transform
    };

    // not all devices support alpha opaque, select the first composite alpha format available.
    const CANDIDATE_COMPOSITE_ALPHAS: [vk::CompositeAlphaFlagsKHR; 4] = [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::INHERIT,
    ];

    let composite_alpha_flag = CANDIDATE_COMPOSITE_ALPHAS.iter().find(|&&composite_alpha_flag| {
        surface_caps.supported_composite_alpha.contains(composite_alpha_flag)
    }).cloned().unwrap_or(vk::CompositeAlphaFlagsKHR::OPAQUE);

    let result = SwapchainCapability {
        support_usage: image_usage,
        desired_image_count: select_image_count(&surface_caps),
        swapchain_extent: select_extent(&surface_caps, dimension),
        pre_transform: surface_transform,
        composite_alpha: composite_alpha_flag,
    };
    Ok(result)
}

fn select_extent(surface_caps: &vk::SurfaceCapabilitiesKHR, dimension: vk::Extent2D) -> vk::Extent2D {

    // 0xFFFFFFFF means the size of the surface will be set by the swapchain.
    const SPECIAL_EXTEND: vkuint = 0xFFFF_FFFF;

    if surface_caps.current_extent.width == SPECIAL_EXTEND && surface_caps.current_extent.height == SPECIAL_EXTEND {
        vk::Extent2D {
            width : dimension.width.max(surface_caps.min_image_extent.width).min(surface_caps.max_image_extent.width),
            height: dimension.height.max(surface_caps.min_image_extent.height).min(surface_caps.max_image_extent.height),
        }
    } else {
        // the swapchain size must match a defined surface size.
        surface_caps.current_extent
    }
}

fn select_image_count(surface_caps: &vk::SurfaceCapabilitiesKHR) -> vkuint {

    let optimal_image_count = surface_caps.min_image_count + 1;

    // max_image_count of 0 means there is no upper limit.
    if surface_caps.max_image_count > 0 && optimal_image_count > surface_caps.max_image_count {
        surface_caps.max_image_count
    } else {
        optimal_image_count
    }
}
// -----------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn vsync_always_uses_fifo() {

        let modes = [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];
        assert_eq!(select_present_mode(&modes, true), vk::PresentModeKHR::FIFO);
        assert_eq!(select_present_mode(&modes, false), vk::PresentModeKHR::MAILBOX);
        assert_eq!(select_present_mode(&[vk::PresentModeKHR::FIFO], false), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn undefined_surface_format_means_bgra() {

        let undefined = [vk::SurfaceFormatKHR { format: vk::Format::UNDEFINED, color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR }];
        assert_eq!(select_format(&undefined).map(|f| f.color_format), Some(vk::Format::B8G8R8A8_UNORM));

        let mixed = [
            vk::SurfaceFormatKHR { format: vk::Format::R8G8B8A8_SRGB,  color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR },
            vk::SurfaceFormatKHR { format: vk::Format::B8G8R8A8_UNORM, color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR },
        ];
        assert_eq!(select_format(&mixed).map(|f| f.color_format), Some(vk::Format::B8G8R8A8_UNORM));
        assert!(select_format(&[]).is_none());
    }

    #[test]
    fn extent_is_clamped_when_surface_leaves_it_open() {

        let caps = vk::SurfaceCapabilitiesKHR {
            current_extent  : vk::Extent2D { width: 0xFFFF_FFFF, height: 0xFFFF_FFFF },
            min_image_extent: vk::Extent2D { width: 16, height: 16 },
            max_image_extent: vk::Extent2D { width: 1024, height: 1024 },
            min_image_count : 2,
            max_image_count : 2,
            ..Default::default()
        };

        let extent = select_extent(&caps, vk::Extent2D { width: 1280, height: 8 });
        assert_eq!((extent.width, extent.height), (1024, 16));
        assert_eq!(select_image_count(&caps), 2);
    }
}
