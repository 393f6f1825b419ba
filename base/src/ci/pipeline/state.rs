//! Fixed function states of a graphics pipeline.
//!
//! Each state keeps plain values and owned arrays; `raw` turns it into the Vulkan struct,
//! whose pointers borrow from the state and stay valid while the state is alive.

use ash::vk;

use crate::vkuint;

#[inline(always)]
fn vkbool(value: bool) -> vk::Bool32 {
    if value { vk::TRUE } else { vk::FALSE }
}

// ----------------------------------------------------------------------------------------------
/// Vertex buffer bindings and the attributes read from them.
#[derive(Debug, Clone, Default)]
pub struct VertexInputSCI {

    bindings  : Vec<vk::VertexInputBindingDescription>,
    attributes: Vec<vk::VertexInputAttributeDescription>,
}

impl VertexInputSCI {

    pub fn new() -> VertexInputSCI {
        VertexInputSCI::default()
    }

    pub fn add_binding(mut self, binding: vk::VertexInputBindingDescription) -> VertexInputSCI {
        self.bindings.push(binding); self
    }

    pub fn add_attribute(mut self, attribute: vk::VertexInputAttributeDescription) -> VertexInputSCI {
        self.attributes.push(attribute); self
    }

    pub fn bindings(&self) -> &[vk::VertexInputBindingDescription] {
        &self.bindings
    }

    pub fn attributes(&self) -> &[vk::VertexInputAttributeDescription] {
        &self.attributes
    }

    pub(super) fn raw(&self) -> vk::PipelineVertexInputStateCreateInfo {

        vk::PipelineVertexInputStateCreateInfo {
            vertex_binding_description_count  : self.bindings.len() as _,
            p_vertex_binding_descriptions     : self.bindings.as_ptr(),
            vertex_attribute_description_count: self.attributes.len() as _,
            p_vertex_attribute_descriptions   : self.attributes.as_ptr(),
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Fill mode and face culling, no culling with counter clockwise front faces by default.
#[derive(Debug, Clone, Copy)]
pub struct RasterizationSCI {

    polygon_mode: vk::PolygonMode,
    cull_mode: vk::CullModeFlags,
    front_face: vk::FrontFace,
}

impl Default for RasterizationSCI {

    fn default() -> RasterizationSCI {
        RasterizationSCI {
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
        }
    }
}

impl RasterizationSCI {

    pub fn new() -> RasterizationSCI {
        RasterizationSCI::default()
    }

    pub fn polygon(mut self, mode: vk::PolygonMode) -> RasterizationSCI {
        self.polygon_mode = mode; self
    }

    /// Discard faces matching `mode`, where `front_face` is the winding of a front face on screen.
    pub fn cull_face(mut self, mode: vk::CullModeFlags, front_face: vk::FrontFace) -> RasterizationSCI {
        self.cull_mode = mode;
        self.front_face = front_face; self
    }

    pub(super) fn raw(&self) -> vk::PipelineRasterizationStateCreateInfo {

        vk::PipelineRasterizationStateCreateInfo {
            polygon_mode: self.polygon_mode,
            cull_mode   : self.cull_mode,
            front_face  : self.front_face,
            line_width  : 1.0,
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Depth test settings. Stencil testing is never enabled.
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilSCI {

    test: bool,
    write: bool,
    compare_op: vk::CompareOp,
}

impl Default for DepthStencilSCI {

    fn default() -> DepthStencilSCI {
        DepthStencilSCI { test: false, write: false, compare_op: vk::CompareOp::LESS_OR_EQUAL }
    }
}

impl DepthStencilSCI {

    pub fn new() -> DepthStencilSCI {
        DepthStencilSCI::default()
    }

    pub fn depth_test(mut self, test: bool, write: bool, compare_op: vk::CompareOp) -> DepthStencilSCI {
        self.test = test;
        self.write = write;
        self.compare_op = compare_op; self
    }

    pub(super) fn raw(&self) -> vk::PipelineDepthStencilStateCreateInfo {

        let keep = vk::StencilOpState {
            fail_op: vk::StencilOp::KEEP,
            pass_op: vk::StencilOp::KEEP,
            depth_fail_op: vk::StencilOp::KEEP,
            compare_op: vk::CompareOp::ALWAYS,
            ..Default::default()
        };

        vk::PipelineDepthStencilStateCreateInfo {
            depth_test_enable : vkbool(self.test),
            depth_write_enable: vkbool(self.write),
            depth_compare_op  : self.compare_op,
            front: keep,
            back : keep,
            max_depth_bounds: 1.0,
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Viewports and scissors, always supplied while recording.
#[derive(Debug, Clone, Copy)]
pub struct ViewportSCI {

    count: vkuint,
}

impl ViewportSCI {

    /// Declare `count` viewports and scissors which are set dynamically during recording.
    pub fn dynamic(count: vkuint) -> ViewportSCI {
        ViewportSCI { count }
    }

    pub(super) fn raw(&self) -> vk::PipelineViewportStateCreateInfo {

        vk::PipelineViewportStateCreateInfo {
            viewport_count: self.count,
            scissor_count : self.count,
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct DynamicSCI {

    states: Vec<vk::DynamicState>,
}

impl DynamicSCI {

    pub fn new() -> DynamicSCI {
        DynamicSCI::default()
    }

    pub fn add_dynamic(mut self, state: vk::DynamicState) -> DynamicSCI {

        if !self.states.contains(&state) {
            self.states.push(state);
        }
        self
    }

    pub(super) fn raw(&self) -> vk::PipelineDynamicStateCreateInfo {

        vk::PipelineDynamicStateCreateInfo {
            dynamic_state_count: self.states.len() as _,
            p_dynamic_states   : self.states.as_ptr(),
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Color attachments written without blending.
#[derive(Debug, Clone)]
pub struct ColorBlendSCI {

    attachments: Vec<vk::PipelineColorBlendAttachmentState>,
}

impl ColorBlendSCI {

    /// `count` color attachments, each written fully and without blending.
    pub fn opaque(count: usize) -> ColorBlendSCI {

        let attachment = vk::PipelineColorBlendAttachmentState {
            blend_enable: vk::FALSE,
            src_color_blend_factor: vk::BlendFactor::ONE,
            dst_color_blend_factor: vk::BlendFactor::ZERO,
            color_blend_op: vk::BlendOp::ADD,
            src_alpha_blend_factor: vk::BlendFactor::ONE,
            dst_alpha_blend_factor: vk::BlendFactor::ZERO,
            alpha_blend_op: vk::BlendOp::ADD,
            color_write_mask: vk::ColorComponentFlags::RGBA,
        };
        ColorBlendSCI { attachments: vec![attachment; count] }
    }

    pub(super) fn raw(&self) -> vk::PipelineColorBlendStateCreateInfo {

        vk::PipelineColorBlendStateCreateInfo {
            logic_op: vk::LogicOp::COPY,
            attachment_count: self.attachments.len() as _,
            p_attachments   : self.attachments.as_ptr(),
            ..Default::default()
        }
    }
}
// ----------------------------------------------------------------------------------------------

pub(super) fn triangle_list() -> vk::PipelineInputAssemblyStateCreateInfo {

    vk::PipelineInputAssemblyStateCreateInfo {
        topology: vk::PrimitiveTopology::TRIANGLE_LIST,
        ..Default::default()
    }
}

pub(super) fn single_sample() -> vk::PipelineMultisampleStateCreateInfo {

    vk::PipelineMultisampleStateCreateInfo {
        rasterization_samples: vk::SampleCountFlags::TYPE_1,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn dynamic_viewport_only_declares_counts() {

        let raw = ViewportSCI::dynamic(1).raw();

        assert_eq!((raw.viewport_count, raw.scissor_count), (1, 1));
        assert!(raw.p_viewports.is_null());
        assert!(raw.p_scissors.is_null());
    }

    #[test]
    fn dynamic_states_are_listed_once() {

        let sci = DynamicSCI::new()
            .add_dynamic(vk::DynamicState::VIEWPORT)
            .add_dynamic(vk::DynamicState::SCISSOR)
            .add_dynamic(vk::DynamicState::VIEWPORT);

        let raw = sci.raw();
        assert_eq!(raw.dynamic_state_count, 2);
        assert_eq!(raw.p_dynamic_states, sci.states.as_ptr());
    }

    #[test]
    fn vertex_input_points_at_its_descriptions() {

        let sci = VertexInputSCI::new()
            .add_binding(vk::VertexInputBindingDescription { binding: 0, stride: 36, input_rate: vk::VertexInputRate::VERTEX })
            .add_attribute(vk::VertexInputAttributeDescription { location: 0, binding: 0, format: vk::Format::R32G32B32_SFLOAT, offset: 0 })
            .add_attribute(vk::VertexInputAttributeDescription { location: 1, binding: 0, format: vk::Format::R32G32B32_SFLOAT, offset: 12 });

        let raw = sci.raw();
        assert_eq!(raw.vertex_binding_description_count, 1);
        assert_eq!(raw.vertex_attribute_description_count, 2);
        assert_eq!(unsafe { (*raw.p_vertex_attribute_descriptions.add(1)).offset }, 12);
    }

    #[test]
    fn rasterization_culls_as_requested() {

        let raw = RasterizationSCI::new()
            .cull_face(vk::CullModeFlags::BACK, vk::FrontFace::CLOCKWISE)
            .raw();

        assert_eq!(raw.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(raw.front_face, vk::FrontFace::CLOCKWISE);
        assert_eq!(raw.polygon_mode, vk::PolygonMode::FILL);
        assert_eq!(raw.line_width, 1.0);
    }

    #[test]
    fn depth_test_and_opaque_blending() {

        let depth = DepthStencilSCI::new().depth_test(true, true, vk::CompareOp::LESS_OR_EQUAL).raw();
        assert_eq!((depth.depth_test_enable, depth.depth_write_enable), (vk::TRUE, vk::TRUE));
        assert_eq!(depth.stencil_test_enable, vk::FALSE);

        let blend = ColorBlendSCI::opaque(1);
        let raw = blend.raw();
        assert_eq!(raw.attachment_count, 1);
        assert_eq!(blend.attachments[0].blend_enable, vk::FALSE);
        assert_eq!(blend.attachments[0].color_write_mask, vk::ColorComponentFlags::RGBA);
    }
}
