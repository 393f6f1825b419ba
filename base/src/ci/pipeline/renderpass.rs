//! Render pass, subpass and framebuffer descriptions.
//!
//! The builders here own plain Vulkan structs only. Pointers between them are resolved when the
//! object is built, so a builder can be moved or cloned freely before that.

use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable};
use crate::ci::VkObjectBuildableCI;
use crate::error::{VkResult, VkError};
use crate::vkuint;

// ----------------------------------------------------------------------------------------------
/// Begin info of one render pass instance, with a clear value for each attachment in order.
pub struct RenderPassBI {

    render_pass: vk::RenderPass,
    framebuffer: vk::Framebuffer,
    area: vk::Rect2D,
    clears: Vec<vk::ClearValue>,
}

impl RenderPassBI {

    /// Render to the whole `extent` of `framebuffer`.
    pub fn new(render_pass: vk::RenderPass, framebuffer: vk::Framebuffer, extent: vk::Extent2D) -> RenderPassBI {

        RenderPassBI {
            render_pass, framebuffer,
            area: vk::Rect2D { offset: vk::Offset2D { x: 0, y: 0 }, extent },
            clears: Vec::new(),
        }
    }

    pub fn clear(mut self, value: vk::ClearValue) -> RenderPassBI {
        self.clears.push(value); self
    }

    /// The begin info borrows the clear values, it must not outlive `self`.
    pub fn begin_info(&self) -> vk::RenderPassBeginInfo {

        vk::RenderPassBeginInfo {
            render_pass: self.render_pass,
            framebuffer: self.framebuffer,
            render_area: self.area,
            clear_value_count: self.clears.len() as _,
            p_clear_values   : self.clears.as_ptr(),
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// A render pass made of attachments, subpasses and the dependencies between them.
#[derive(Debug, Clone, Default)]
pub struct RenderPassCI {

    attachments : Vec<vk::AttachmentDescription>,
    subpasses   : Vec<SubpassDescCI>,
    dependencies: Vec<vk::SubpassDependency>,
}

impl VkObjectBuildableCI for RenderPassCI {
    type ObjectType = vk::RenderPass;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        self.with_create_info(|ci| unsafe {
            device.logic.handle.create_render_pass(ci, None)
                .map_err(|_| VkError::create("Render Pass"))
        })
    }
}

impl RenderPassCI {

    pub fn new() -> RenderPassCI {
        RenderPassCI::default()
    }

    pub fn add_attachment(mut self, attachment: AttachmentDescCI) -> RenderPassCI {
        self.attachments.push(attachment.0); self
    }

    pub fn add_subpass(mut self, subpass: SubpassDescCI) -> RenderPassCI {
        self.subpasses.push(subpass); self
    }

    pub fn add_dependency(mut self, dependency: SubpassDependencyCI) -> RenderPassCI {
        self.dependencies.push(dependency.0); self
    }

    /// Call `f` with a create info whose pointers are valid for the duration of the call.
    fn with_create_info<R>(&self, f: impl FnOnce(&vk::RenderPassCreateInfo) -> R) -> R {

        let subpasses: Vec<vk::SubpassDescription> = self.subpasses.iter()
            .map(SubpassDescCI::describe)
            .collect();

        let ci = vk::RenderPassCreateInfo {
            attachment_count: self.attachments.len() as _,
            p_attachments   : self.attachments.as_ptr(),
            subpass_count   : subpasses.len() as _,
            p_subpasses     : subpasses.as_ptr(),
            dependency_count: self.dependencies.len() as _,
            p_dependencies  : self.dependencies.as_ptr(),
            ..Default::default()
        };

        f(&ci)
    }
}

impl VkObjectDiscardable for vk::RenderPass {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_render_pass(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// One single-sampled attachment of a render pass.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentDescCI(vk::AttachmentDescription);

impl AttachmentDescCI {

    /// Cleared when the pass begins, stored, and left ready for presentation.
    pub fn present_target(format: vk::Format) -> AttachmentDescCI {

        AttachmentDescCI::cleared(format, vk::AttachmentStoreOp::STORE, vk::ImageLayout::PRESENT_SRC_KHR)
    }

    /// Cleared when the pass begins, its content is not needed afterwards.
    pub fn transient_depth(format: vk::Format) -> AttachmentDescCI {

        AttachmentDescCI::cleared(format, vk::AttachmentStoreOp::DONT_CARE, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
    }

    fn cleared(format: vk::Format, store_op: vk::AttachmentStoreOp, final_layout: vk::ImageLayout) -> AttachmentDescCI {

        AttachmentDescCI(vk::AttachmentDescription {
            format, store_op, final_layout,
            samples: vk::SampleCountFlags::TYPE_1,
            load_op: vk::AttachmentLoadOp::CLEAR,
            stencil_load_op : vk::AttachmentLoadOp::DONT_CARE,
            stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
            initial_layout  : vk::ImageLayout::UNDEFINED,
            ..Default::default()
        })
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// The attachments one subpass renders into.
#[derive(Debug, Clone)]
pub struct SubpassDescCI {

    bind_point: vk::PipelineBindPoint,
    colors: Vec<vk::AttachmentReference>,
    depth_stencil: Option<vk::AttachmentReference>,
}

impl SubpassDescCI {

    pub fn graphics() -> SubpassDescCI {

        SubpassDescCI {
            bind_point: vk::PipelineBindPoint::GRAPHICS,
            colors: Vec::new(),
            depth_stencil: None,
        }
    }

    /// Render color to attachment `index`, in `COLOR_ATTACHMENT_OPTIMAL` layout.
    pub fn color(mut self, index: vkuint) -> SubpassDescCI {

        self.colors.push(vk::AttachmentReference {
            attachment: index,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }); self
    }

    /// Depth test against attachment `index`, in `DEPTH_STENCIL_ATTACHMENT_OPTIMAL` layout.
    pub fn depth_stencil(mut self, index: vkuint) -> SubpassDescCI {

        self.depth_stencil = Some(vk::AttachmentReference {
            attachment: index,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        }); self
    }

    fn describe(&self) -> vk::SubpassDescription {

        vk::SubpassDescription {
            pipeline_bind_point   : self.bind_point,
            color_attachment_count: self.colors.len() as _,
            p_color_attachments   : self.colors.as_ptr(),
            p_depth_stencil_attachment: self.depth_stencil.as_ref()
                .map_or(std::ptr::null(), |reference| reference as *const _),
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// An execution and memory dependency between two subpasses, region local.
#[derive(Debug, Clone, Copy)]
pub struct SubpassDependencyCI(vk::SubpassDependency);

impl SubpassDependencyCI {

    pub fn new(src_subpass: vkuint, dst_subpass: vkuint) -> SubpassDependencyCI {

        SubpassDependencyCI(vk::SubpassDependency {
            src_subpass, dst_subpass,
            dependency_flags: vk::DependencyFlags::BY_REGION,
            ..Default::default()
        })
    }

    /// The stages and accesses which must finish in the source subpass before the destination's start.
    pub fn wait(mut self, stages: vk::PipelineStageFlags, access: vk::AccessFlags) -> SubpassDependencyCI {
        self.0.src_stage_mask  = stages;
        self.0.src_access_mask = access; self
    }

    pub fn before(mut self, stages: vk::PipelineStageFlags, access: vk::AccessFlags) -> SubpassDependencyCI {
        self.0.dst_stage_mask  = stages;
        self.0.dst_access_mask = access; self
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// A single layer framebuffer, with attachments in the order of its render pass.
#[derive(Debug, Clone)]
pub struct FramebufferCI {

    render_pass: vk::RenderPass,
    extent: vk::Extent2D,
    attachments: Vec<vk::ImageView>,
}

impl VkObjectBuildableCI for FramebufferCI {
    type ObjectType = vk::Framebuffer;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let ci = self.create_info();
        unsafe {
            device.logic.handle.create_framebuffer(&ci, None)
                .map_err(|_| VkError::create("Framebuffer"))
        }
    }
}

impl FramebufferCI {

    pub fn new_2d(render_pass: vk::RenderPass, extent: vk::Extent2D) -> FramebufferCI {
        FramebufferCI { render_pass, extent, attachments: Vec::new() }
    }

    pub fn add_attachment(mut self, view: vk::ImageView) -> FramebufferCI {
        self.attachments.push(view); self
    }

    fn create_info(&self) -> vk::FramebufferCreateInfo {

        vk::FramebufferCreateInfo {
            render_pass: self.render_pass,
            attachment_count: self.attachments.len() as _,
            p_attachments   : self.attachments.as_ptr(),
            width : self.extent.width,
            height: self.extent.height,
            layers: 1,
            ..Default::default()
        }
    }
}

impl VkObjectDiscardable for vk::Framebuffer {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_framebuffer(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn subpass_pointers_are_resolved_at_build_time() {

        let subpass = SubpassDescCI::graphics().color(0).depth_stencil(1);

        let render_pass = RenderPassCI::new()
            .add_attachment(AttachmentDescCI::present_target(vk::Format::B8G8R8A8_UNORM))
            .add_attachment(AttachmentDescCI::transient_depth(vk::Format::D32_SFLOAT))
            .add_subpass(subpass)
            .add_dependency(SubpassDependencyCI::new(vk::SUBPASS_EXTERNAL, 0));

        // moving the builder must not invalidate anything.
        let moved = Box::new(render_pass);

        moved.with_create_info(|ci| {
            assert_eq!(ci.attachment_count, 2);
            assert_eq!((ci.subpass_count, ci.dependency_count), (1, 1));

            let description = unsafe { &*ci.p_subpasses };
            let color = unsafe { &*description.p_color_attachments };
            let depth = unsafe { &*description.p_depth_stencil_attachment };
            assert_eq!(color.layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
            assert_eq!(depth.attachment, 1);
        });
    }

    #[test]
    fn subpass_without_depth_has_null_reference() {

        let description = SubpassDescCI::graphics().color(0).describe();

        assert_eq!(description.color_attachment_count, 1);
        assert!(description.p_depth_stencil_attachment.is_null());
    }

    #[test]
    fn attachment_presets() {

        let color = AttachmentDescCI::present_target(vk::Format::B8G8R8A8_UNORM).0;
        assert_eq!(color.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(color.store_op, vk::AttachmentStoreOp::STORE);
        assert_eq!(color.final_layout, vk::ImageLayout::PRESENT_SRC_KHR);

        let depth = AttachmentDescCI::transient_depth(vk::Format::D32_SFLOAT).0;
        assert_eq!(depth.store_op, vk::AttachmentStoreOp::DONT_CARE);
        assert_eq!(depth.initial_layout, vk::ImageLayout::UNDEFINED);
    }

    #[test]
    fn framebuffer_counts_attachments() {

        let ci = FramebufferCI::new_2d(vk::RenderPass::null(), vk::Extent2D { width: 800, height: 600 })
            .add_attachment(vk::ImageView::null())
            .add_attachment(vk::ImageView::null())
            .create_info();

        assert_eq!(ci.attachment_count, 2);
        assert_eq!(ci.layers, 1);
        assert_eq!((ci.width, ci.height), (800, 600));
    }

    #[test]
    fn begin_info_carries_clear_values() {

        let bi = RenderPassBI::new(vk::RenderPass::null(), vk::Framebuffer::null(), vk::Extent2D { width: 64, height: 32 })
            .clear(vk::ClearValue { color: vk::ClearColorValue { float32: [0.0, 0.0, 0.0, 1.0] } })
            .clear(vk::ClearValue { depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 } });

        let info = bi.begin_info();
        assert_eq!(info.clear_value_count, 2);
        assert_eq!(info.render_area.extent.width, 64);

        let depth = unsafe { (*info.p_clear_values.add(1)).depth_stencil };
        assert_eq!(depth.depth, 1.0);
    }
}
