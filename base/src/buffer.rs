//! Buffers whose memory comes from Vulkan Memory Allocator.

use ash::vk;
use vma::Alloc;

use crate::ci::buffer::BufferCI;
use crate::ci::vma::VmaAllocationCI;
use crate::command::{VkCmdRecorder, ITransfer, CmdTransferApi};
use crate::context::VkDevice;
use crate::upload::MappedRegion;
use crate::error::{VkResult, VkError};
use crate::{vkbytes, vkptr};

/// A buffer together with its allocation.
pub struct VkBuffer {

    pub handle: vk::Buffer,
    pub size  : vkbytes,

    allocation: vma::Allocation,
    is_mapped: bool,
}

impl VkBuffer {

    pub fn allocate(device: &VkDevice, ci: &BufferCI, allocation_ci: &VmaAllocationCI) -> VkResult<VkBuffer> {

        let (handle, allocation) = unsafe {
            device.vma.create_buffer(ci.as_ref(), allocation_ci.as_ref())
                .map_err(|result| VkError::vma("create buffer", result))?
        };

        let buffer = VkBuffer {
            handle, allocation,
            size: ci.as_ref().size,
            is_mapped: false,
        };
        Ok(buffer)
    }

    /// A buffer which the host writes directly, without any explicit flush.
    pub fn host_coherent(device: &VkDevice, size: vkbytes, usage: vk::BufferUsageFlags) -> VkResult<VkBuffer> {
        VkBuffer::allocate(device, &BufferCI::new(size).usage(usage), &VmaAllocationCI::host_coherent())
    }

    /// Upload `data` into a new device local buffer through a temporary staging buffer.
    ///
    /// The copy is submitted to `queue` and waited for, so the returned buffer is ready to use.
    /// Nothing created here outlives a failure.
    pub fn device_local(device: &VkDevice, pool: vk::CommandPool, queue: vk::Queue, usage: vk::BufferUsageFlags, data: &[u8]) -> VkResult<VkBuffer> {

        let size = data.len() as vkbytes;

        let mut staging = VkBuffer::host_coherent(device, size, vk::BufferUsageFlags::TRANSFER_SRC)?;
        let target_ci = BufferCI::new(size).usage(usage | vk::BufferUsageFlags::TRANSFER_DST);

        let uploaded = staging.write_all(device, data)
            .and_then(|_| VkBuffer::allocate(device, &target_ci, &VmaAllocationCI::device_local()))
            .and_then(|target| {
                let copied = copy_buffer(device, pool, queue, staging.handle, target.handle, size);
                release_on_error(copied, target, |target| target.discard(device))
            });

        staging.discard(device);
        uploaded
    }

    /// Map the whole buffer. The mapping is kept until `unmap` or `discard`.
    pub fn map(&mut self, device: &VkDevice) -> VkResult<MappedRegion> {

        let ptr = unsafe {
            device.vma.map_memory(&mut self.allocation)
                .map_err(|result| VkError::vma("map buffer memory", result))?
        };
        self.is_mapped = true;

        unsafe { MappedRegion::from_raw(ptr as vkptr, self.size) }
    }

    pub fn unmap(&mut self, device: &VkDevice) {

        if self.is_mapped {
            unsafe { device.vma.unmap_memory(&mut self.allocation); }
            self.is_mapped = false;
        }
    }

    /// Copy `data` to the start of the buffer through a temporary mapping.
    fn write_all(&mut self, device: &VkDevice, data: &[u8]) -> VkResult<()> {

        let written = self.map(device)
            .and_then(|mut region| region.write_bytes(0, data));
        self.unmap(device);
        written
    }

    pub fn descriptor(&self) -> vk::DescriptorBufferInfo {

        vk::DescriptorBufferInfo {
            buffer: self.handle,
            offset: 0,
            range : self.size,
        }
    }

    pub fn discard(mut self, device: &VkDevice) {

        self.unmap(device);
        unsafe {
            device.vma.destroy_buffer(self.handle, &mut self.allocation);
        }
    }
}

/// Record, submit and wait for a whole-buffer copy. The command buffer is freed whatever the outcome.
fn copy_buffer(device: &VkDevice, pool: vk::CommandPool, queue: vk::Queue, src: vk::Buffer, dst: vk::Buffer, size: vkbytes) -> VkResult<()> {

    let recorder: VkCmdRecorder<ITransfer> = VkCmdRecorder::one_time(device, pool)?;

    let region = vk::BufferCopy { src_offset: 0, dst_offset: 0, size };
    recorder.copy_buf2buf(src, dst, &[region]);
    let flushed = recorder.flush_copy_command(queue);

    device.free(recorder.command(), pool);
    flushed
}

/// Hand `resource` back when `result` succeeded, otherwise release it and forward the error.
fn release_on_error<T>(result: VkResult<()>, resource: T, release: impl FnOnce(T)) -> VkResult<T> {

    match result {
        | Ok(()) => Ok(resource),
        | Err(e) => {
            release(resource);
            Err(e)
        },
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn resource_is_kept_on_success() {

        let mut released = 0;
        let kept = release_on_error(Ok(()), 7, |_| released += 1);

        assert_eq!(kept.unwrap(), 7);
        assert_eq!(released, 0);
    }

    #[test]
    fn resource_is_released_once_on_failure() {

        let mut released = Vec::new();
        let result = release_on_error(Err(VkError::device("Queue Submit")), 7, |r| released.push(r));

        assert!(result.is_err());
        assert_eq!(released, vec![7]);
    }
}
