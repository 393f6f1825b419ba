//! Descriptor pools, set layouts, set allocation and buffer descriptor writes.

use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable};
use crate::ci::VkObjectBuildableCI;
use crate::error::{VkResult, VkError};
use crate::vkuint;

// ----------------------------------------------------------------------------------------------
/// A descriptor pool sized for `max_sets` sets and the descriptors added to it.
#[derive(Debug, Clone)]
pub struct DescriptorPoolCI {

    max_sets: vkuint,
    sizes: Vec<vk::DescriptorPoolSize>,
}

impl VkObjectBuildableCI for DescriptorPoolCI {
    type ObjectType = vk::DescriptorPool;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        if self.sizes.is_empty() || self.max_sets == 0 {
            return Err(VkError::other("Descriptor pool requires at least one descriptor type and one set."))
        }

        let ci = vk::DescriptorPoolCreateInfo {
            max_sets: self.max_sets,
            pool_size_count: self.sizes.len() as _,
            p_pool_sizes   : self.sizes.as_ptr(),
            ..Default::default()
        };

        unsafe {
            device.logic.handle.create_descriptor_pool(&ci, None)
                .map_err(|_| VkError::create("Descriptor Pool"))
        }
    }
}

impl DescriptorPoolCI {

    pub fn new(max_sets: vkuint) -> DescriptorPoolCI {
        DescriptorPoolCI { max_sets, sizes: Vec::new() }
    }

    /// Reserve `count` descriptors of `ty`, adding up with earlier reservations of the same type.
    pub fn add_descriptor(mut self, ty: vk::DescriptorType, count: vkuint) -> DescriptorPoolCI {

        match self.sizes.iter_mut().find(|size| size.ty == ty) {
            | Some(size) => size.descriptor_count += count,
            | None => self.sizes.push(vk::DescriptorPoolSize { ty, descriptor_count: count }),
        }
        self
    }
}

impl VkObjectDiscardable for vk::DescriptorPool {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_descriptor_pool(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct DescriptorSetLayoutCI {

    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl VkObjectBuildableCI for DescriptorSetLayoutCI {
    type ObjectType = vk::DescriptorSetLayout;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let ci = vk::DescriptorSetLayoutCreateInfo {
            binding_count: self.bindings.len() as _,
            p_bindings   : self.bindings.as_ptr(),
            ..Default::default()
        };

        unsafe {
            device.logic.handle.create_descriptor_set_layout(&ci, None)
                .map_err(|_| VkError::create("Descriptor Set Layout"))
        }
    }
}

impl DescriptorSetLayoutCI {

    pub fn new() -> DescriptorSetLayoutCI {
        DescriptorSetLayoutCI::default()
    }

    /// One descriptor of `ty` at `binding`, visible to `stages`.
    pub fn add_single_binding(mut self, binding: vkuint, ty: vk::DescriptorType, stages: vk::ShaderStageFlags) -> DescriptorSetLayoutCI {

        self.bindings.push(vk::DescriptorSetLayoutBinding {
            binding,
            descriptor_type : ty,
            descriptor_count: 1,
            stage_flags     : stages,
            ..Default::default()
        }); self
    }
}

impl VkObjectDiscardable for vk::DescriptorSetLayout {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_descriptor_set_layout(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Allocation of one descriptor set with `layout` from `pool`.
///
/// The set is released together with its pool.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorSetAI {

    pool: vk::DescriptorPool,
    layout: vk::DescriptorSetLayout,
}

impl VkObjectBuildableCI for DescriptorSetAI {
    type ObjectType = vk::DescriptorSet;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let layouts = [self.layout];
        let ai = vk::DescriptorSetAllocateInfo {
            descriptor_pool: self.pool,
            descriptor_set_count: 1,
            p_set_layouts: layouts.as_ptr(),
            ..Default::default()
        };

        let mut sets = unsafe {
            device.logic.handle.allocate_descriptor_sets(&ai)
                .map_err(|_| VkError::create("Descriptor Set"))?
        };
        sets.pop().ok_or(VkError::create("Descriptor Set"))
    }
}

impl DescriptorSetAI {

    pub fn new(pool: vk::DescriptorPool, layout: vk::DescriptorSetLayout) -> DescriptorSetAI {
        DescriptorSetAI { pool, layout }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
struct BufferWrite {

    set: vk::DescriptorSet,
    binding: vkuint,
    ty: vk::DescriptorType,
    info: vk::DescriptorBufferInfo,
}

/// A batch of buffer descriptor writes, applied together by `update`.
#[derive(Debug, Clone, Default)]
pub struct DescriptorWrites {

    buffers: Vec<BufferWrite>,
}

impl DescriptorWrites {

    pub fn new() -> DescriptorWrites {
        DescriptorWrites::default()
    }

    /// Point the descriptor at `binding` of `set` to the buffer range in `info`.
    pub fn buffer(mut self, set: vk::DescriptorSet, binding: vkuint, ty: vk::DescriptorType, info: vk::DescriptorBufferInfo) -> DescriptorWrites {
        self.buffers.push(BufferWrite { set, binding, ty, info }); self
    }

    /// The returned writes point into `self`.
    fn raw_writes(&self) -> Vec<vk::WriteDescriptorSet> {

        self.buffers.iter().map(|write| vk::WriteDescriptorSet {
            dst_set: write.set,
            dst_binding: write.binding,
            descriptor_type: write.ty,
            descriptor_count: 1,
            p_buffer_info: &write.info,
            ..Default::default()
        }).collect()
    }

    pub fn update(&self, device: &VkDevice) {

        let writes = self.raw_writes();
        unsafe {
            device.logic.handle.update_descriptor_sets(&writes, &[]);
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn pool_merges_sizes_of_the_same_type() {

        let ci = DescriptorPoolCI::new(2)
            .add_descriptor(vk::DescriptorType::UNIFORM_BUFFER, 1)
            .add_descriptor(vk::DescriptorType::COMBINED_IMAGE_SAMPLER, 2)
            .add_descriptor(vk::DescriptorType::UNIFORM_BUFFER, 1);

        assert_eq!(ci.max_sets, 2);
        assert_eq!(ci.sizes.len(), 2);
        assert_eq!(ci.sizes[0].descriptor_count, 2);
    }

    #[test]
    fn single_binding_is_one_descriptor() {

        let ci = DescriptorSetLayoutCI::new()
            .add_single_binding(0, vk::DescriptorType::UNIFORM_BUFFER, vk::ShaderStageFlags::VERTEX);

        assert_eq!(ci.bindings.len(), 1);
        assert_eq!(ci.bindings[0].descriptor_count, 1);
        assert_eq!(ci.bindings[0].stage_flags, vk::ShaderStageFlags::VERTEX);
    }

    #[test]
    fn each_buffer_write_points_to_its_own_info() {

        let info = |range| vk::DescriptorBufferInfo { buffer: vk::Buffer::null(), offset: 0, range };

        let writes = DescriptorWrites::new()
            .buffer(vk::DescriptorSet::null(), 0, vk::DescriptorType::UNIFORM_BUFFER, info(144))
            .buffer(vk::DescriptorSet::null(), 1, vk::DescriptorType::UNIFORM_BUFFER, info(96));

        let raw = writes.raw_writes();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].dst_binding, 1);
        assert_eq!(raw[1].descriptor_count, 1);
        assert_eq!(unsafe { (*raw[0].p_buffer_info).range }, 144);
        assert_eq!(unsafe { (*raw[1].p_buffer_info).range }, 96);
    }
}
