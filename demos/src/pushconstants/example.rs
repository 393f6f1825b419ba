
use ash::vk;
use winit::event::VirtualKeyCode;

use std::mem;
use std::path::PathBuf;

use vkbase::context::{VkDevice, VkSwapchain, VulkanContext};
use vkbase::ci::VkObjectBuildableCI;
use vkbase::ci::shader::{ShaderModuleCI, ShaderStageCI};
use vkbase::buffer::VkBuffer;
use vkbase::model::{VkModel, VertexLayout, VertexComponent, ModelCreateInfo};
use vkbase::upload::{UploadChannel, FrameDataUploader, PushConstantUploader, UniformBufferUploader};
use vkbase::utils::cast::bytes_of;
use vkbase::utils::time::AnimationTimer;
use vkbase::{AppConfig, OrbitCamera, EventController, FrameAction};
use vkbase::{vkbytes, vkuint};
use vkbase::{VkResult, VkError};

use vkdemos::VkExampleBackend;

use crate::data::{LightPushConstants, UboVS};

const ANIMATION_SPEED: f32 = 0.125;
const MODEL_SCALE: f32 = 0.35;


pub struct VulkanExample {

    backend: VkExampleBackend,

    model: VkModel,
    vertex_layout: VertexLayout,

    ubo_buffer: VkBuffer,
    ubo_data: UboVS,
    ubo_uploader: UniformBufferUploader,
    light_uploader: PushConstantUploader,

    pipelines: PipelineStaff,
    descriptors: DescriptorStaff,
    shaders: ShaderPaths,

    camera: OrbitCamera,
    animation: AnimationTimer,
    is_view_changed: bool,
}

struct ShaderPaths {
    vertex  : PathBuf,
    fragment: PathBuf,
}

impl VulkanExample {

    pub fn new(context: &VulkanContext, config: &AppConfig) -> VkResult<VulkanExample> {

        let device = &context.device;
        let swapchain = &context.swapchain;
        let dimension = swapchain.dimension;

        // six vec4 light positions: 6 * 4 * 4 = 96 bytes.
        // every device offers at least 128 bytes, larger blocks need a look at maxPushConstantsSize.
        let limit = device.phy.limits.max_push_constants_size;
        match UploadChannel::select(LightPushConstants::SIZE as vkuint, &device.phy.limits) {
            | UploadChannel::PushConstant => {
                log::info!("Lights are pushed as a {} bytes push constant block (device limit: {} bytes).", LightPushConstants::SIZE, limit);
            },
            | UploadChannel::UniformBuffer => {
                return Err(VkError::push_constant_overflow(LightPushConstants::SIZE as vkbytes, limit))
            },
        }

        let camera = OrbitCamera::new()
            .zoom(-30.0)
            .rotation(-32.5, 45.0, 0.0)
            .rotation_speed(0.5)
            .zoom_speed(2.5)
            .perspective(60.0, 0.001, 256.0)
            .screen_aspect_ratio(dimension.width as f32 / dimension.height as f32)
            .build();
        let ubo_data = UboVS::new(&camera);

        let render_pass = vkdemos::setup_renderpass(device, swapchain)?;
        let backend = VkExampleBackend::new(device, swapchain, render_pass)?;

        let vertex_layout = VertexLayout::new(&[
            VertexComponent::Position,
            VertexComponent::Normal,
            VertexComponent::Uv,
            VertexComponent::Color,
        ]);
        let model = VkModel::load(device, backend.command_pool, &config.assets.model, &vertex_layout, &ModelCreateInfo::with_scale(MODEL_SCALE))?;

        let mut ubo_buffer = VkBuffer::host_coherent(device, mem::size_of::<UboVS>() as vkbytes, vk::BufferUsageFlags::UNIFORM_BUFFER)?;
        let mut ubo_uploader = UniformBufferUploader::new(ubo_buffer.map(device)?);
        ubo_uploader.write(bytes_of(&ubo_data))?;

        let descriptors = setup_descriptor(device, &ubo_buffer)?;

        let shaders = ShaderPaths {
            vertex  : config.assets.vertex_shader.clone(),
            fragment: config.assets.fragment_shader.clone(),
        };
        let pipelines = prepare_pipelines(device, &vertex_layout, &shaders, backend.render_pass, descriptors.layout)?;
        let light_uploader = PushConstantUploader::new(pipelines.layout, LightPushConstants::range());

        let target = VulkanExample {
            backend, model, vertex_layout,
            ubo_buffer, ubo_data, ubo_uploader, light_uploader,
            pipelines, descriptors, shaders, camera,
            animation: AnimationTimer::with_speed(ANIMATION_SPEED),
            is_view_changed: false,
        };
        Ok(target)
    }
}

impl vkbase::RenderWorkflow for VulkanExample {

    fn render_frame(&mut self, device: &VkDevice, device_available: vk::Fence, await_present: vk::Semaphore, image_index: usize, delta_time: f32) -> VkResult<vk::Semaphore> {

        self.animation.tick(delta_time);

        if self.is_view_changed {
            self.ubo_data.update(&self.camera);
            self.ubo_uploader.write(bytes_of(&self.ubo_data))?;
            self.is_view_changed = false;
        }

        // the light positions live in the command buffer, so it is recorded again every frame.
        self.record_command(device, image_index)?;

        let await_rendering = self.backend.await_rendering[image_index];
        let submit_ci = vkbase::ci::device::SubmitCI::new()
            .add_wait(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT, await_present)
            .add_command(self.backend.commands[image_index])
            .add_signal(await_rendering);

        device.submit(submit_ci, device.logic.queues.graphics.handle, device_available)?;

        Ok(await_rendering)
    }

    fn swapchain_reload(&mut self, device: &VkDevice, new_chain: &VkSwapchain) -> VkResult<()> {

        device.discard(self.pipelines.pipeline);

        let render_pass = vkdemos::setup_renderpass(device, new_chain)?;
        self.backend.swapchain_reload(device, new_chain, render_pass)?;
        self.pipelines.pipeline = build_pipeline(device, &self.vertex_layout, &self.shaders, self.backend.render_pass, self.pipelines.layout)?;

        self.camera.resize(new_chain.dimension.width, new_chain.dimension.height);
        self.is_view_changed = true;

        Ok(())
    }

    fn receive_input(&mut self, inputer: &EventController, _delta_time: f32) -> FrameAction {

        if inputer.is_key_active() {

            if inputer.key.is_key_pressed(VirtualKeyCode::Escape) {
                return FrameAction::Terminal
            }

            if inputer.key.is_key_just_pressed(VirtualKeyCode::P) {
                self.animation.toggle_pause();
                log::info!("Animation {}.", if self.animation.paused { "paused" } else { "resumed" });
            }
        }

        if self.camera.receive_input(inputer) {
            self.is_view_changed = true;
        }

        FrameAction::Rendering
    }

    fn deinit(self, device: &VkDevice) -> VkResult<()> {

        device.discard(self.descriptors.layout);
        device.discard(self.descriptors.pool);

        device.discard(self.pipelines.pipeline);
        device.discard(self.pipelines.layout);

        // the uploader points into the mapping, which is released together with the buffer.
        drop(self.ubo_uploader);
        self.ubo_buffer.discard(device);
        self.model.discard(device);

        self.backend.discard(device);
        Ok(())
    }
}

impl VulkanExample {

    fn record_command(&mut self, device: &VkDevice, image_index: usize) -> VkResult<()> {

        use vkbase::command::{VkCmdRecorder, CmdGraphicsApi, IGraphics};
        use vkbase::ci::pipeline::RenderPassBI;

        let dimension = self.backend.dimension;

        let viewport = vk::Viewport {
            x: 0.0, y: 0.0,
            width: dimension.width as f32, height: dimension.height as f32,
            min_depth: 0.0, max_depth: 1.0,
        };

        let scissor = vk::Rect2D {
            extent: dimension,
            offset: vk::Offset2D { x: 0, y: 0 },
        };

        let render_pass_bi = RenderPassBI::new(self.backend.render_pass, self.backend.framebuffers[image_index], dimension)
            .clear(vkdemos::DEFAULT_CLEAR_COLOR)
            .clear(vkdemos::DEFAULT_CLEAR_DEPTH);

        let mut recorder: VkCmdRecorder<IGraphics> = VkCmdRecorder::new(device, self.backend.commands[image_index]);
        recorder.set_usage(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        recorder.reset_command(vk::CommandBufferResetFlags::empty())?;

        recorder.begin_record()?
            .begin_render_pass(render_pass_bi)
            .set_viewport(0, &[viewport])
            .set_scissor(0, &[scissor]);

        // update light positions.
        let lights = LightPushConstants::orbit(self.animation.timer);
        self.light_uploader.upload(&recorder, &lights.to_bytes())?;

        recorder
            .bind_pipeline(self.pipelines.pipeline)
            .bind_descriptor_sets(self.pipelines.layout, 0, &[self.descriptors.set], &[]);

        self.model.record_command(&recorder);

        recorder.end_render_pass();
        recorder.end_record()
    }
}

struct DescriptorStaff {
    pool   : vk::DescriptorPool,
    set    : vk::DescriptorSet,
    layout : vk::DescriptorSetLayout,
}

fn setup_descriptor(device: &VkDevice, uniform_buffer: &VkBuffer) -> VkResult<DescriptorStaff> {

    use vkbase::ci::descriptor::{DescriptorPoolCI, DescriptorSetLayoutCI, DescriptorSetAI, DescriptorWrites};

    let descriptor_pool = DescriptorPoolCI::new(2)
        .add_descriptor(vk::DescriptorType::UNIFORM_BUFFER, 1)
        .build(device)?;

    // in lights.vert:
    //
    // layout (binding = 0) uniform UBO {
    //     mat4 projection;
    //     mat4 model;
    //     vec4 lightPos;
    // } ubo;
    let set_layout = DescriptorSetLayoutCI::new()
        .add_single_binding(0, vk::DescriptorType::UNIFORM_BUFFER, vk::ShaderStageFlags::VERTEX)
        .build(device)?;

    let descriptor_set = DescriptorSetAI::new(descriptor_pool, set_layout)
        .build(device)?;

    DescriptorWrites::new()
        .buffer(descriptor_set, 0, vk::DescriptorType::UNIFORM_BUFFER, uniform_buffer.descriptor())
        .update(device);

    let descriptors = DescriptorStaff {
        pool   : descriptor_pool,
        set    : descriptor_set,
        layout : set_layout,
    };
    Ok(descriptors)
}


struct PipelineStaff {
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
}

fn prepare_pipelines(device: &VkDevice, vertex_layout: &VertexLayout, shaders: &ShaderPaths, render_pass: vk::RenderPass, set_layout: vk::DescriptorSetLayout) -> VkResult<PipelineStaff> {

    use vkbase::ci::pipeline::PipelineLayoutCI;

    // push constant ranges are part of the pipeline layout, which refuses ranges beyond maxPushConstantsSize.
    let layout = PipelineLayoutCI::new()
        .add_set_layout(set_layout)
        .add_push_constants(LightPushConstants::range())
        .build(device)?;

    let pipeline = build_pipeline(device, vertex_layout, shaders, render_pass, layout)?;

    Ok(PipelineStaff { pipeline, layout })
}

fn build_pipeline(device: &VkDevice, vertex_layout: &VertexLayout, shaders: &ShaderPaths, render_pass: vk::RenderPass, layout: vk::PipelineLayout) -> VkResult<vk::Pipeline> {

    use vkbase::ci::pipeline::*;

    let rasterization_state = RasterizationSCI::new()
        .polygon(vk::PolygonMode::FILL)
        .cull_face(vk::CullModeFlags::BACK, vk::FrontFace::CLOCKWISE);

    let depth_stencil_state = DepthStencilSCI::new()
        .depth_test(true, true, vk::CompareOp::LESS_OR_EQUAL);

    let dynamic_state = DynamicSCI::new()
        .add_dynamic(vk::DynamicState::VIEWPORT)
        .add_dynamic(vk::DynamicState::SCISSOR);

    let vert_module = ShaderModuleCI::from_path(vk::ShaderStageFlags::VERTEX, &shaders.vertex, "[Vertex Shader]")?
        .build(device)?;
    let frag_module = ShaderModuleCI::from_path(vk::ShaderStageFlags::FRAGMENT, &shaders.fragment, "[Fragment Shader]")
        .and_then(|ci| ci.build(device));
    let frag_module = match frag_module {
        | Ok(module) => module,
        | Err(e) => {
            device.discard(vert_module);
            return Err(e)
        },
    };

    let shader_stages = vec![
        ShaderStageCI::new(vk::ShaderStageFlags::VERTEX, vert_module),
        ShaderStageCI::new(vk::ShaderStageFlags::FRAGMENT, frag_module),
    ];

    let pipeline_ci = GraphicsPipelineCI::new(render_pass, layout)
        .set_shaders(shader_stages)
        .set_vertex_input(vertex_layout.input_state(0))
        .set_viewport(ViewportSCI::dynamic(1))
        .set_rasterization(rasterization_state)
        .set_depth_stencil(depth_stencil_state)
        .set_dynamic(dynamic_state);

    let pipeline = device.build(&pipeline_ci);

    // the shader modules are no longer needed once the pipeline is created, whether it succeeded or not.
    device.discard(vert_module);
    device.discard(frag_module);

    pipeline
}
