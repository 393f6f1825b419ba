//! Per-frame data upload through either push constants or a mapped uniform buffer.
//!
//! Push constants are the fast channel for small blocks: the data lives in the command
//! buffer itself and needs no memory or descriptor. Blocks beyond the device limit go to
//! a uniform buffer which stays mapped for the lifetime of the application.

use ash::vk;

use crate::command::CmdPushConstantsApi;
use crate::error::{VkResult, VkError};
use crate::{vkuint, vkbytes, vkptr};

use std::ptr::NonNull;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UploadChannel {
    PushConstant,
    UniformBuffer,
}

impl UploadChannel {

    /// Pick the push constant channel if `payload_size` bytes fit in `maxPushConstantsSize`.
    pub fn select(payload_size: vkuint, limits: &vk::PhysicalDeviceLimits) -> UploadChannel {

        if payload_size <= limits.max_push_constants_size {
            UploadChannel::PushConstant
        } else {
            UploadChannel::UniformBuffer
        }
    }
}

/// Hand the data of one frame to the shaders.
pub trait FrameDataUploader {

    fn channel(&self) -> UploadChannel;

    /// Upload `bytes`, recording into `recorder` if the channel lives in the command buffer.
    fn upload<R: CmdPushConstantsApi>(&mut self, recorder: &R, bytes: &[u8]) -> VkResult<()>;
}

// ----------------------------------------------------------------------------------------------
pub struct PushConstantUploader {

    layout: vk::PipelineLayout,
    stage : vk::ShaderStageFlags,
    offset: vkuint,
    size  : vkuint,
}

impl PushConstantUploader {

    /// `range` must be one of the push constant ranges `layout` was created with.
    pub fn new(layout: vk::PipelineLayout, range: vk::PushConstantRange) -> PushConstantUploader {

        PushConstantUploader {
            layout,
            stage : range.stage_flags,
            offset: range.offset,
            size  : range.size,
        }
    }
}

impl FrameDataUploader for PushConstantUploader {

    fn channel(&self) -> UploadChannel {
        UploadChannel::PushConstant
    }

    fn upload<R: CmdPushConstantsApi>(&mut self, recorder: &R, bytes: &[u8]) -> VkResult<()> {

        if bytes.len() != self.size as usize {
            return Err(VkError::other(format!(
                "Push constant payload is {} bytes, but its range declares {} bytes.", bytes.len(), self.size)))
        }

        recorder.push_constants(self.layout, self.stage, self.offset, bytes);
        Ok(())
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
pub struct UniformBufferUploader {

    region: MappedRegion,
    offset: vkbytes,
}

impl UniformBufferUploader {

    pub fn new(region: MappedRegion) -> UniformBufferUploader {
        UniformBufferUploader { region, offset: 0 }
    }

    pub fn with_offset(mut self, offset: vkbytes) -> UniformBufferUploader {
        self.offset = offset; self
    }

    /// Copy `bytes` into the mapped buffer, visible to the next submission.
    pub fn write(&mut self, bytes: &[u8]) -> VkResult<()> {
        self.region.write_bytes(self.offset, bytes)
    }
}

impl FrameDataUploader for UniformBufferUploader {

    fn channel(&self) -> UploadChannel {
        UploadChannel::UniformBuffer
    }

    fn upload<R: CmdPushConstantsApi>(&mut self, _recorder: &R, bytes: &[u8]) -> VkResult<()> {
        self.write(bytes)
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// A range of host visible memory mapped into the address space of the application.
#[derive(Debug)]
pub struct MappedRegion {

    ptr: NonNull<u8>,
    capacity: vkbytes,
}

impl MappedRegion {

    /// # Safety
    ///
    /// `ptr` must point to at least `capacity` bytes of writable memory that stays mapped
    /// as long as this region is used.
    pub unsafe fn from_raw(ptr: vkptr, capacity: vkbytes) -> VkResult<MappedRegion> {

        let ptr = NonNull::new(ptr as *mut u8)
            .ok_or(VkError::device("Map Memory"))?;
        Ok(MappedRegion { ptr, capacity })
    }

    pub fn capacity(&self) -> vkbytes {
        self.capacity
    }

    /// Copy `bytes` into the region starting at `offset`.
    pub fn write_bytes(&mut self, offset: vkbytes, bytes: &[u8]) -> VkResult<()> {

        let requested = bytes.len() as vkbytes;

        match offset.checked_add(requested) {
            | Some(end) if end <= self.capacity => {},
            | _ => return Err(VkError::mapped_overflow(offset, requested, self.capacity)),
        }

        unsafe {
            let dst = self.ptr.as_ptr().add(offset as usize);
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
        Ok(())
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;
    use crate::VkErrorKind;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockRecorder {
        pushes: RefCell<Vec<(vk::ShaderStageFlags, vkuint, Vec<u8>)>>,
    }

    impl CmdPushConstantsApi for MockRecorder {

        fn push_constants(&self, _layout: vk::PipelineLayout, stage: vk::ShaderStageFlags, offset: vkuint, data: &[u8]) -> &Self {
            self.pushes.borrow_mut().push((stage, offset, data.to_vec())); self
        }
    }

    fn vertex_range(size: vkuint) -> vk::PushConstantRange {
        vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size,
        }
    }

    #[test]
    fn channel_follows_device_limit() {

        let limits = vk::PhysicalDeviceLimits {
            max_push_constants_size: 128,
            ..Default::default()
        };

        assert_eq!(UploadChannel::select(96, &limits), UploadChannel::PushConstant);
        assert_eq!(UploadChannel::select(128, &limits), UploadChannel::PushConstant);
        assert_eq!(UploadChannel::select(129, &limits), UploadChannel::UniformBuffer);
    }

    #[test]
    fn push_constants_record_one_command() {

        let recorder = MockRecorder::default();
        let mut uploader = PushConstantUploader::new(vk::PipelineLayout::null(), vertex_range(96));
        let payload = [7_u8; 96];

        uploader.upload(&recorder, &payload).unwrap();

        let pushes = recorder.pushes.borrow();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].0, vk::ShaderStageFlags::VERTEX);
        assert_eq!(pushes[0].1, 0);
        assert_eq!(&pushes[0].2[..], &payload[..]);
    }

    #[test]
    fn push_constants_reject_size_mismatch() {

        let recorder = MockRecorder::default();
        let mut uploader = PushConstantUploader::new(vk::PipelineLayout::null(), vertex_range(96));

        assert!(uploader.upload(&recorder, &[0_u8; 64]).is_err());
        assert!(recorder.pushes.borrow().is_empty());
    }

    #[test]
    fn uniform_upload_writes_mapped_memory() {

        let mut backing = vec![0_u8; 32];
        let region = unsafe {
            MappedRegion::from_raw(backing.as_mut_ptr() as vkptr, backing.len() as vkbytes).unwrap()
        };
        let recorder = MockRecorder::default();
        let mut uploader = UniformBufferUploader::new(region).with_offset(8);

        uploader.upload(&recorder, &[1, 2, 3, 4]).unwrap();

        assert!(recorder.pushes.borrow().is_empty());
        assert_eq!(&backing[8..12], &[1, 2, 3, 4]);
        assert_eq!(backing[12], 0);
    }

    #[test]
    fn mapped_write_is_bounds_checked() {

        let mut backing = vec![0_u8; 16];
        let mut region = unsafe {
            MappedRegion::from_raw(backing.as_mut_ptr() as vkptr, backing.len() as vkbytes).unwrap()
        };

        let error = region.write_bytes(12, &[0_u8; 8]).unwrap_err();
        match error.kind() {
            | VkErrorKind::MappedOverflow { offset, requested, capacity } => {
                assert_eq!((*offset, *requested, *capacity), (12, 8, 16));
            },
            | other => panic!("unexpected error kind: {:?}", other),
        }
        assert!(backing.iter().all(|&b| b == 0));
    }

    #[test]
    fn null_mapping_is_rejected() {
        assert!(unsafe { MappedRegion::from_raw(std::ptr::null_mut(), 16) }.is_err());
    }
}
