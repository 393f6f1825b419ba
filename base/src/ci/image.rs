
use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable, VkObjectBindable};
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::error::{VkResult, VkError};
use crate::{vkbytes, vkuint};

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::ImageCreateInfo.
#[derive(Debug, Clone)]
pub struct ImageCI {
    inner: vk::ImageCreateInfo,
}

impl VulkanCI<vk::ImageCreateInfo> for ImageCI {

    fn default_ci() -> vk::ImageCreateInfo {

        vk::ImageCreateInfo {
            image_type: vk::ImageType::TYPE_2D,
            format: vk::Format::UNDEFINED,
            mip_levels  : 1,
            array_layers: 1,
            samples: vk::SampleCountFlags::TYPE_1,
            tiling : vk::ImageTiling::OPTIMAL,
            sharing_mode  : vk::SharingMode::EXCLUSIVE,
            initial_layout: vk::ImageLayout::UNDEFINED,
            ..Default::default()
        }
    }
}

impl AsRef<vk::ImageCreateInfo> for ImageCI {

    fn as_ref(&self) -> &vk::ImageCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for ImageCI {
    type ObjectType = (vk::Image, vk::MemoryRequirements);

    /// Create the image and query its memory requirement.
    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let image = unsafe {
            device.logic.handle.create_image(self.as_ref(), None)
                .map_err(|_| VkError::create("Image"))?
        };

        let requirement = unsafe {
            device.logic.handle.get_image_memory_requirements(image)
        };

        Ok((image, requirement))
    }
}

impl ImageCI {

    pub fn new_2d(format: vk::Format, dimension: vk::Extent2D) -> ImageCI {

        ImageCI {
            inner: vk::ImageCreateInfo {
                format,
                extent: vk::Extent3D {
                    width : dimension.width,
                    height: dimension.height,
                    depth : 1,
                },
                ..ImageCI::default_ci()
            },
        }
    }

    #[inline(always)]
    pub fn usages(mut self, flags: vk::ImageUsageFlags) -> ImageCI {
        self.inner.usage = flags; self
    }

    #[inline(always)]
    pub fn tiling(mut self, tiling: vk::ImageTiling) -> ImageCI {
        self.inner.tiling = tiling; self
    }

    #[inline(always)]
    pub fn samples(mut self, count: vk::SampleCountFlags) -> ImageCI {
        self.inner.samples = count; self
    }
}

impl VkObjectDiscardable for vk::Image {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_image(self, None);
        }
    }
}

impl VkObjectBindable for vk::Image {

    fn bind(self, device: &VkDevice, memory: vk::DeviceMemory, offset: vkbytes) -> VkResult<()> {
        unsafe {
            device.logic.handle.bind_image_memory(self, memory, offset)
                .map_err(|_| VkError::device("Binding Image Memory"))
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::ImageViewCreateInfo.
#[derive(Debug, Clone)]
pub struct ImageViewCI {
    inner: vk::ImageViewCreateInfo,
}

impl VulkanCI<vk::ImageViewCreateInfo> for ImageViewCI {

    fn default_ci() -> vk::ImageViewCreateInfo {

        vk::ImageViewCreateInfo {
            view_type: vk::ImageViewType::TYPE_2D,
            format: vk::Format::UNDEFINED,
            components: vk::ComponentMapping {
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
        }
    }
}

impl AsRef<vk::ImageViewCreateInfo> for ImageViewCI {

    fn as_ref(&self) -> &vk::ImageViewCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for ImageViewCI {
    type ObjectType = vk::ImageView;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let view = unsafe {
            device.logic.handle.create_image_view(self.as_ref(), None)
                .map_err(|_| VkError::create("Image View"))?
        };
        Ok(view)
    }
}

impl ImageViewCI {

    pub fn new(image: vk::Image, r#type: vk::ImageViewType, format: vk::Format) -> ImageViewCI {

        ImageViewCI {
            inner: vk::ImageViewCreateInfo {
                image, format,
                view_type: r#type,
                ..ImageViewCI::default_ci()
            },
        }
    }

    #[inline(always)]
    pub fn aspect_mask(mut self, aspect: vk::ImageAspectFlags) -> ImageViewCI {
        self.inner.subresource_range.aspect_mask = aspect; self
    }

}

impl VkObjectDiscardable for vk::ImageView {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_image_view(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

/// The aspects of a depth attachment in `format`, including stencil when the format has one.
pub fn depth_aspect(format: vk::Format) -> vk::ImageAspectFlags {

    match format {
        | vk::Format::D16_UNORM_S8_UINT
        | vk::Format::D24_UNORM_S8_UINT
        | vk::Format::D32_SFLOAT_S8_UINT => vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL,
        | _ => vk::ImageAspectFlags::DEPTH,
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn stencil_aspect_follows_format() {

        assert_eq!(depth_aspect(vk::Format::D32_SFLOAT), vk::ImageAspectFlags::DEPTH);
        assert!(depth_aspect(vk::Format::D24_UNORM_S8_UINT).contains(vk::ImageAspectFlags::STENCIL));
    }

    #[test]
    fn image_2d_has_unit_depth() {

        let ci = ImageCI::new_2d(vk::Format::D32_SFLOAT, vk::Extent2D { width: 4, height: 2 })
            .usages(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT);

        assert_eq!(ci.as_ref().extent.depth, 1);
        assert_eq!(ci.as_ref().mip_levels, 1);
        assert_eq!(ci.as_ref().usage, vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT);
    }
}
