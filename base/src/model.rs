//! Static meshes read from glTF scenes, packed into one vertex buffer and one index buffer.

use ash::vk;
use smallvec::SmallVec;

use crate::buffer::VkBuffer;
use crate::ci::pipeline::VertexInputSCI;
use crate::command::CmdGraphicsApi;
use crate::context::VkDevice;
use crate::utils::cast::slice_bytes;
use crate::error::{VkResult, VkError};
use crate::{vkuint, Vec2F, Vec3F, Mat4F};

use std::path::Path;

type Point3F = nalgebra::Point3<f32>;

// ----------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum VertexComponent {
    Position,
    Normal,
    Uv,
    Color,
}

impl VertexComponent {

    /// The number of 32-bit floats this component occupies in a vertex.
    pub fn float_count(&self) -> usize {
        match self {
            | VertexComponent::Position
            | VertexComponent::Normal
            | VertexComponent::Color => 3,
            | VertexComponent::Uv    => 2,
        }
    }

    pub fn format(&self) -> vk::Format {
        match self {
            | VertexComponent::Uv => vk::Format::R32G32_SFLOAT,
            | _ => vk::Format::R32G32B32_SFLOAT,
        }
    }
}

/// The order of components in an interleaved vertex.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    components: SmallVec<[VertexComponent; 4]>,
}

impl VertexLayout {

    pub fn new(components: &[VertexComponent]) -> VertexLayout {
        VertexLayout { components: SmallVec::from_slice(components) }
    }

    pub fn components(&self) -> &[VertexComponent] {
        &self.components
    }

    /// The number of floats in one vertex.
    pub fn float_count(&self) -> usize {
        self.components.iter().map(VertexComponent::float_count).sum()
    }

    /// The size of one vertex in bytes.
    pub fn stride(&self) -> vkuint {
        (self.float_count() * ::std::mem::size_of::<f32>()) as vkuint
    }

    /// The byte offset of `component` in a vertex, if the layout contains it.
    pub fn offset(&self, component: VertexComponent) -> Option<vkuint> {

        let mut offset = 0;
        for &c in self.components.iter() {
            if c == component {
                return Some(offset)
            }
            offset += (c.float_count() * ::std::mem::size_of::<f32>()) as vkuint;
        }
        None
    }

    /// Vertex input state for a single binding at `binding`; the location of each attribute is its position in the layout.
    pub fn input_state(&self, binding: vkuint) -> VertexInputSCI {

        let mut sci = VertexInputSCI::new()
            .add_binding(vk::VertexInputBindingDescription {
                binding,
                stride: self.stride(),
                input_rate: vk::VertexInputRate::VERTEX,
            });

        let mut offset = 0;
        for (location, component) in self.components.iter().enumerate() {

            sci = sci.add_attribute(vk::VertexInputAttributeDescription {
                location: location as _,
                binding, offset,
                format: component.format(),
            });
            offset += (component.float_count() * ::std::mem::size_of::<f32>()) as vkuint;
        }

        sci
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Adjustments applied while reading vertices.
#[derive(Debug, Clone)]
pub struct ModelCreateInfo {

    pub scale   : Vec3F,
    pub center  : Vec3F,
    pub uv_scale: Vec2F,
}

impl Default for ModelCreateInfo {

    fn default() -> ModelCreateInfo {
        ModelCreateInfo {
            scale   : Vec3F::new(1.0, 1.0, 1.0),
            center  : Vec3F::zeros(),
            uv_scale: Vec2F::new(1.0, 1.0),
        }
    }
}

impl ModelCreateInfo {

    pub fn with_scale(scale: f32) -> ModelCreateInfo {
        ModelCreateInfo {
            scale: Vec3F::new(scale, scale, scale),
            ..Default::default()
        }
    }
}

/// Axis aligned bounding box of the packed positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {

    pub min: Vec3F,
    pub max: Vec3F,
}

impl Default for Dimension {

    fn default() -> Dimension {
        Dimension {
            min: Vec3F::repeat(f32::MAX),
            max: Vec3F::repeat(f32::MIN),
        }
    }
}

impl Dimension {

    fn extend(&mut self, point: &Vec3F) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn size(&self) -> Vec3F {
        self.max - self.min
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Vertices and indices of a whole scene, ready to be uploaded.
///
/// Positions and normals are mirrored on the y axis and the triangle winding is reversed,
/// so a y-up scene stands upright in Vulkan clip space and its front faces wind clockwise.
#[derive(Debug, Default)]
pub struct MeshData {

    pub vertices: Vec<f32>,
    pub indices : Vec<vkuint>,
    pub vertex_count: usize,
    pub dimension: Dimension,
}

impl MeshData {

    /// Read the default scene, or the first scene when no default is given.
    pub fn from_gltf(document: &gltf::Document, buffers: &[gltf::buffer::Data], layout: &VertexLayout, info: &ModelCreateInfo) -> VkResult<MeshData> {

        let scene = document.default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(VkError::gltf("glTF scene is missing"))?;

        let mut mesh_data = MeshData::default();
        for node in scene.nodes() {
            mesh_data.read_node(&node, &Mat4F::identity(), buffers, layout, info)?;
        }

        if mesh_data.indices.is_empty() {
            return Err(VkError::gltf("no triangles found in scene"))
        }

        Ok(mesh_data)
    }

    fn read_node(&mut self, node: &gltf::Node, parent: &Mat4F, buffers: &[gltf::buffer::Data], layout: &VertexLayout, info: &ModelCreateInfo) -> VkResult<()> {

        let transform = parent * Mat4F::from(node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                self.read_primitive(&primitive, &transform, buffers, layout, info)?;
            }
        }

        for child in node.children() {
            self.read_node(&child, &transform, buffers, layout, info)?;
        }

        Ok(())
    }

    fn read_primitive(&mut self, primitive: &gltf::Primitive, transform: &Mat4F, buffers: &[gltf::buffer::Data], layout: &VertexLayout, info: &ModelCreateInfo) -> VkResult<()> {

        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skip glTF primitive with mode {:?}, only triangles are supported.", primitive.mode());
            return Ok(())
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader.read_positions()
            .ok_or(VkError::gltf("primitive without POSITION attribute"))?
            .collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals()
            .map(|iter| iter.collect());
        let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0)
            .map(|iter| iter.into_f32().collect());
        let colors: Option<Vec<[f32; 3]>> = reader.read_colors(0)
            .map(|iter| iter.into_rgb_f32().collect());

        let vertex_base = self.vertex_count as vkuint;

        for (i, position) in positions.iter().enumerate() {

            let world = transform.transform_point(&Point3F::from(*position));
            let position = Vec3F::new(
                world.x * info.scale.x + info.center.x,
                -world.y * info.scale.y + info.center.y,
                world.z * info.scale.z + info.center.z,
            );
            self.dimension.extend(&position);

            for component in layout.components() {
                match component {
                    | VertexComponent::Position => {
                        self.vertices.extend_from_slice(position.as_slice());
                    },
                    | VertexComponent::Normal => {
                        let normal = normals.as_ref()
                            .and_then(|n| n.get(i))
                            .map(|n| transform.transform_vector(&Vec3F::from(*n)).normalize())
                            .unwrap_or_else(Vec3F::zeros);
                        self.vertices.extend_from_slice(&[normal.x, -normal.y, normal.z]);
                    },
                    | VertexComponent::Uv => {
                        let uv = uvs.as_ref()
                            .and_then(|t| t.get(i).cloned())
                            .unwrap_or([0.0, 0.0]);
                        self.vertices.extend_from_slice(&[uv[0] * info.uv_scale.x, uv[1] * info.uv_scale.y]);
                    },
                    | VertexComponent::Color => {
                        let color = colors.as_ref()
                            .and_then(|c| c.get(i).cloned())
                            .unwrap_or([1.0, 1.0, 1.0]);
                        self.vertices.extend_from_slice(&color);
                    },
                }
            }
        }

        let indices: Vec<vkuint> = match reader.read_indices() {
            | Some(iter) => iter.into_u32().collect(),
            | None => (0..positions.len() as vkuint).collect(),
        };

        for triangle in indices.chunks_exact(3) {
            self.indices.extend_from_slice(&[
                vertex_base + triangle[0],
                vertex_base + triangle[2],
                vertex_base + triangle[1],
            ]);
        }

        self.vertex_count += positions.len();
        Ok(())
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
pub struct VkModel {

    pub vertices: VkBuffer,
    pub indices : VkBuffer,

    pub index_count : vkuint,
    pub vertex_count: vkuint,
    pub dimension: Dimension,
}

impl VkModel {

    /// Load the glTF scene at `path` into device local vertex and index buffers.
    ///
    /// `pool` must belong to the graphics queue family, the staging copies are submitted to the graphics queue.
    pub fn load(device: &VkDevice, pool: vk::CommandPool, path: impl AsRef<Path>, layout: &VertexLayout, info: &ModelCreateInfo) -> VkResult<VkModel> {

        let path = path.as_ref();
        let (document, buffers, _images) = gltf::import(path)
            .map_err(|e| VkError::gltf(format!("{:?}: {}", path, e)))?;

        let mesh = MeshData::from_gltf(&document, &buffers, layout, info)?;
        log::debug!("Load model {:?}: {} vertices, {} indices.", path, mesh.vertex_count, mesh.indices.len());

        let queue = device.logic.queues.graphics.handle;
        let vertices = VkBuffer::device_local(device, pool, queue, vk::BufferUsageFlags::VERTEX_BUFFER, slice_bytes(&mesh.vertices))?;
        let indices  = VkBuffer::device_local(device, pool, queue, vk::BufferUsageFlags::INDEX_BUFFER, slice_bytes(&mesh.indices))?;

        let model = VkModel {
            vertices, indices,
            index_count : mesh.indices.len() as _,
            vertex_count: mesh.vertex_count as _,
            dimension: mesh.dimension,
        };
        Ok(model)
    }

    /// Bind the buffers of this model at binding 0 and draw all of it.
    pub fn record_command(&self, recorder: &impl CmdGraphicsApi) {

        recorder
            .bind_vertex_buffers(0, &[self.vertices.handle], &[0])
            .bind_index_buffer(self.indices.handle, vk::IndexType::UINT32, 0)
            .draw_indexed(self.index_count, 1, 0, 0, 0);
    }

    pub fn discard(self, device: &VkDevice) {

        self.vertices.discard(device);
        self.indices.discard(device);
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0 } ],
        "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] } ],
        "buffers": [ {
            "byteLength": 44,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
        } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0,  "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    fn full_layout() -> VertexLayout {
        VertexLayout::new(&[VertexComponent::Position, VertexComponent::Normal, VertexComponent::Uv, VertexComponent::Color])
    }

    fn load(source: &str, info: &ModelCreateInfo) -> MeshData {
        let (document, buffers, _) = gltf::import_slice(source.as_bytes()).unwrap();
        MeshData::from_gltf(&document, &buffers, &full_layout(), info).unwrap()
    }

    #[test]
    fn layout_offsets_and_stride() {

        let layout = full_layout();

        assert_eq!(layout.stride(), 44);
        assert_eq!(layout.offset(VertexComponent::Position), Some(0));
        assert_eq!(layout.offset(VertexComponent::Normal), Some(12));
        assert_eq!(layout.offset(VertexComponent::Uv), Some(24));
        assert_eq!(layout.offset(VertexComponent::Color), Some(32));

        let input = layout.input_state(0);
        assert_eq!(input.bindings()[0].stride, 44);
        assert_eq!(input.attributes().len(), 4);
        assert_eq!(input.attributes()[2].format, vk::Format::R32G32_SFLOAT);
        assert_eq!(input.attributes()[3].location, 3);

        let positions = VertexLayout::new(&[VertexComponent::Position]);
        assert_eq!(positions.offset(VertexComponent::Color), None);
    }

    #[test]
    fn bundled_scene_loads() {

        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/assets/models/samplescene.gltf");
        let (document, buffers, _) = gltf::import(&path).unwrap();
        let mesh = MeshData::from_gltf(&document, &buffers, &full_layout(), &ModelCreateInfo::default()).unwrap();

        // a floor quad and six boxes.
        assert_eq!(mesh.vertex_count, 4 + 6 * 24);
        assert_eq!(mesh.indices.len(), 6 + 6 * 36);
    }

    #[test]
    fn triangle_is_interleaved_with_defaults() {

        let mesh = load(TRIANGLE_GLTF, &ModelCreateInfo::default());

        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.vertices.len(), 3 * 11);
        assert_eq!(mesh.indices, vec![0, 2, 1]);

        // second vertex: position (1, 0, 0), no normal, no uv, white color.
        let second = &mesh.vertices[11..22];
        assert_eq!(&second[0..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&second[3..8], &[0.0; 5]);
        assert_eq!(&second[8..11], &[1.0, 1.0, 1.0]);

        // third vertex is mirrored on y.
        assert_eq!(&mesh.vertices[22..25], &[0.0, -1.0, 0.0]);
    }

    #[test]
    fn scale_and_node_transform_apply_to_positions() {

        let translated = TRIANGLE_GLTF.replace(r#"{ "mesh": 0 }"#, r#"{ "mesh": 0, "translation": [2, 0, 0] }"#);
        let mesh = load(&translated, &ModelCreateInfo::with_scale(0.5));

        let second = &mesh.vertices[11..14];
        assert!((second[0] - 1.5).abs() < 1e-6);
        assert!((mesh.dimension.min.x - 1.0).abs() < 1e-6);
        assert!((mesh.dimension.max.x - 1.5).abs() < 1e-6);
        assert!((mesh.dimension.min.y + 0.5).abs() < 1e-6);
        assert!((mesh.dimension.size().y - 0.5).abs() < 1e-6);
    }
}
