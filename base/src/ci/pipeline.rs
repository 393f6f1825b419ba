
pub use self::renderpass::{RenderPassCI, RenderPassBI, AttachmentDescCI, SubpassDescCI, SubpassDependencyCI, FramebufferCI};
pub use self::state::{VertexInputSCI, RasterizationSCI, DepthStencilSCI, ViewportSCI, DynamicSCI, ColorBlendSCI};

mod renderpass;
mod state;

use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable};
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::ci::shader::ShaderStageCI;
use crate::error::{VkResult, VkError};
use crate::{vkuint, vkbytes};

// ----------------------------------------------------------------------------------------------
/// The number of bytes a push constant block must cover, the furthest end of all `ranges`.
///
/// Summed in 64 bits, so a range ending past `u32::MAX` is reported as such rather than wrapped.
pub fn push_constant_extent(ranges: &[vk::PushConstantRange]) -> vkbytes {

    ranges.iter()
        .map(|range| range.offset as vkbytes + range.size as vkbytes)
        .max()
        .unwrap_or(0)
}

/// Check a push constant block of `requested` bytes against `maxPushConstantsSize` of the device.
pub fn check_push_constant_limit(requested: vkbytes, limit: vkuint) -> VkResult<()> {

    if requested > limit as vkbytes {
        Err(VkError::push_constant_overflow(requested, limit))
    } else {
        Ok(())
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineLayoutCreateInfo.
#[derive(Debug)]
pub struct PipelineLayoutCI {

    inner: vk::PipelineLayoutCreateInfo,
    set_layouts: Vec<vk::DescriptorSetLayout>,
    push_constants: Vec<vk::PushConstantRange>,
}

impl VulkanCI<vk::PipelineLayoutCreateInfo> for PipelineLayoutCI {

    fn default_ci() -> vk::PipelineLayoutCreateInfo {
        vk::PipelineLayoutCreateInfo::default()
    }
}

impl AsRef<vk::PipelineLayoutCreateInfo> for PipelineLayoutCI {

    fn as_ref(&self) -> &vk::PipelineLayoutCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for PipelineLayoutCI {
    type ObjectType = vk::PipelineLayout;

    /// Create the pipeline layout after its push constant ranges are checked against the device limit.
    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        self.validate(device.phy.limits.max_push_constants_size)?;

        let pipeline_layout = unsafe {
            device.logic.handle.create_pipeline_layout(self.as_ref(), None)
                .or(Err(VkError::create("Pipeline Layout")))?
        };
        Ok(pipeline_layout)
    }
}

impl PipelineLayoutCI {

    pub fn new() -> PipelineLayoutCI {

        PipelineLayoutCI {
            inner: PipelineLayoutCI::default_ci(),
            set_layouts: Vec::new(),
            push_constants: Vec::new(),
        }
    }

    #[inline]
    pub fn add_set_layout(mut self, set_layout: vk::DescriptorSetLayout) -> PipelineLayoutCI {

        self.set_layouts.push(set_layout);
        self.inner.set_layout_count = self.set_layouts.len() as _;
        self.inner.p_set_layouts    = self.set_layouts.as_ptr(); self
    }

    #[inline]
    pub fn add_push_constants(mut self, range: vk::PushConstantRange) -> PipelineLayoutCI {

        self.push_constants.push(range);
        self.inner.push_constant_range_count = self.push_constants.len() as _;
        self.inner.p_push_constant_ranges    = self.push_constants.as_ptr(); self
    }

    /// Fail with `PushConstantOverflow` if the declared ranges do not fit in `limit` bytes.
    pub fn validate(&self, limit: vkuint) -> VkResult<()> {

        let requested = push_constant_extent(&self.push_constants);
        check_push_constant_limit(requested, limit)?;

        if requested > 0 {
            log::debug!("Push constant block of {} bytes fits in maxPushConstantsSize({}).", requested, limit);
        }
        Ok(())
    }
}

impl VkObjectDiscardable for vk::PipelineLayout {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_pipeline_layout(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::GraphicsPipelineCreateInfo.
///
/// The states are owned here and only linked into the create info at build time.
/// Pipelines always draw triangle lists with a single sample per pixel.
#[derive(Debug)]
pub struct GraphicsPipelineCI {

    inner: vk::GraphicsPipelineCreateInfo,

    shader_stages: Vec<ShaderStageCI>,

    vertex_input : VertexInputSCI,
    viewport     : ViewportSCI,
    rasterization: RasterizationSCI,
    depth_stencil: DepthStencilSCI,
    color_blend  : ColorBlendSCI,
    dynamics     : DynamicSCI,
}

impl VulkanCI<vk::GraphicsPipelineCreateInfo> for GraphicsPipelineCI {

    fn default_ci() -> vk::GraphicsPipelineCreateInfo {

        vk::GraphicsPipelineCreateInfo {
            subpass: 0,
            base_pipeline_index: -1,
            ..Default::default()
        }
    }
}

impl AsRef<vk::GraphicsPipelineCreateInfo> for GraphicsPipelineCI {

    fn as_ref(&self) -> &vk::GraphicsPipelineCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for GraphicsPipelineCI {
    type ObjectType = vk::Pipeline;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        if self.shader_stages.is_empty() {
            return Err(VkError::other("Graphics pipeline requires at least one shader stage."))
        }

        let stages: Vec<vk::PipelineShaderStageCreateInfo> = self.shader_stages.iter()
            .map(|stage| stage.value())
            .collect();

        let vertex_input   = self.vertex_input.raw();
        let input_assembly = state::triangle_list();
        let viewport       = self.viewport.raw();
        let rasterization  = self.rasterization.raw();
        let multisample    = state::single_sample();
        let depth_stencil  = self.depth_stencil.raw();
        let color_blend    = self.color_blend.raw();
        let dynamics       = self.dynamics.raw();

        let pipeline_ci = vk::GraphicsPipelineCreateInfo {
            stage_count: stages.len() as _,
            p_stages   : stages.as_ptr(),
            p_vertex_input_state  : &vertex_input,
            p_input_assembly_state: &input_assembly,
            p_viewport_state      : &viewport,
            p_rasterization_state : &rasterization,
            p_multisample_state   : &multisample,
            p_depth_stencil_state : &depth_stencil,
            p_color_blend_state   : &color_blend,
            p_dynamic_state       : &dynamics,
            ..self.inner
        };

        let pipelines = unsafe {
            device.logic.handle.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_ci], None)
                .or(Err(VkError::create("Graphics Pipeline")))?
        };

        pipelines.into_iter().next()
            .ok_or(VkError::create("Graphics Pipeline"))
    }
}

impl GraphicsPipelineCI {

    /// Start from a triangle list pipeline without culling, depth test or blending.
    pub fn new(render_pass: vk::RenderPass, layout: vk::PipelineLayout) -> GraphicsPipelineCI {

        GraphicsPipelineCI {
            inner: vk::GraphicsPipelineCreateInfo {
                render_pass, layout,
                ..GraphicsPipelineCI::default_ci()
            },
            shader_stages: Vec::new(),
            vertex_input : VertexInputSCI::new(),
            viewport     : ViewportSCI::dynamic(1),
            rasterization: RasterizationSCI::new(),
            depth_stencil: DepthStencilSCI::new(),
            color_blend  : ColorBlendSCI::opaque(1),
            dynamics     : DynamicSCI::new(),
        }
    }

    #[inline]
    pub fn set_shaders(mut self, stages: Vec<ShaderStageCI>) -> GraphicsPipelineCI {
        self.shader_stages = stages; self
    }

    #[inline]
    pub fn set_vertex_input(mut self, sci: VertexInputSCI) -> GraphicsPipelineCI {
        self.vertex_input = sci; self
    }

    #[inline]
    pub fn set_viewport(mut self, sci: ViewportSCI) -> GraphicsPipelineCI {
        self.viewport = sci; self
    }

    #[inline]
    pub fn set_rasterization(mut self, sci: RasterizationSCI) -> GraphicsPipelineCI {
        self.rasterization = sci; self
    }

    #[inline]
    pub fn set_depth_stencil(mut self, sci: DepthStencilSCI) -> GraphicsPipelineCI {
        self.depth_stencil = sci; self
    }

    #[inline]
    pub fn set_dynamic(mut self, sci: DynamicSCI) -> GraphicsPipelineCI {
        self.dynamics = sci; self
    }

}

impl VkObjectDiscardable for vk::Pipeline {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_pipeline(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    fn range(offset: vkuint, size: vkuint) -> vk::PushConstantRange {
        vk::PushConstantRange { stage_flags: vk::ShaderStageFlags::VERTEX, offset, size }
    }

    #[test]
    fn extent_is_the_furthest_range_end() {

        assert_eq!(push_constant_extent(&[]), 0);
        assert_eq!(push_constant_extent(&[range(0, 96)]), 96);
        assert_eq!(push_constant_extent(&[range(64, 16), range(0, 32)]), 80);
    }

    #[test]
    fn limit_check_accepts_exact_fit() {

        assert!(check_push_constant_limit(96, 128).is_ok());
        assert!(check_push_constant_limit(128, 128).is_ok());
        assert!(check_push_constant_limit(96, 64).is_err());
    }

    #[test]
    fn range_ending_past_u32_max_is_rejected() {

        let wrapping = range(vkuint::MAX - 10, 20);
        assert_eq!(push_constant_extent(&[wrapping]), vkuint::MAX as vkbytes + 10);

        let layout = PipelineLayoutCI::new().add_push_constants(wrapping);
        let error = layout.validate(vkuint::MAX).unwrap_err();
        match error.kind() {
            | crate::VkErrorKind::PushConstantOverflow { requested, limit } => {
                assert_eq!(*requested, vkuint::MAX as vkbytes + 10);
                assert_eq!(*limit, vkuint::MAX);
            },
            | other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[test]
    fn layout_rejects_push_constants_beyond_limit() {

        let layout = PipelineLayoutCI::new()
            .add_set_layout(vk::DescriptorSetLayout::null())
            .add_push_constants(range(0, 96));

        assert_eq!(layout.as_ref().push_constant_range_count, 1);
        assert!(layout.validate(128).is_ok());

        let error = layout.validate(80).unwrap_err();
        match error.kind() {
            | crate::VkErrorKind::PushConstantOverflow { requested, limit } => {
                assert_eq!((*requested, *limit), (96, 80));
            },
            | other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[test]
    fn pipeline_defaults_to_dynamic_viewport() {

        let ci = GraphicsPipelineCI::new(vk::RenderPass::null(), vk::PipelineLayout::null());

        assert_eq!(ci.viewport.raw().viewport_count, 1);
        assert_eq!(ci.color_blend.raw().attachment_count, 1);
        assert_eq!(ci.as_ref().base_pipeline_index, -1);
    }
}
