
use ash::vk;

use crate::error::{VkResult, VkError};
use crate::vkuint;

/// Find the first memory type allowed by `type_bits` which has all the `properties`.
pub fn get_memory_type_index(memories: &vk::PhysicalDeviceMemoryProperties, mut type_bits: vkuint, properties: vk::MemoryPropertyFlags) -> VkResult<vkuint> {

    for i in 0..memories.memory_type_count {
        if (type_bits & 1) == 1 && memories.memory_types[i as usize].property_flags.contains(properties) {
            return Ok(i)
        }

        type_bits >>= 1;
    }

    Err(VkError::unsupported("Memory Type"))
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn memory_type_respects_bits_and_flags() {

        let mut memories = vk::PhysicalDeviceMemoryProperties::default();
        memories.memory_type_count = 3;
        memories.memory_types[0].property_flags = vk::MemoryPropertyFlags::DEVICE_LOCAL;
        memories.memory_types[1].property_flags = vk::MemoryPropertyFlags::HOST_VISIBLE;
        memories.memory_types[2].property_flags = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;

        let host = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        assert_eq!(get_memory_type_index(&memories, 0b111, host).unwrap(), 2);
        assert_eq!(get_memory_type_index(&memories, 0b111, vk::MemoryPropertyFlags::HOST_VISIBLE).unwrap(), 1);
        assert!(get_memory_type_index(&memories, 0b011, host).is_err());
    }
}
