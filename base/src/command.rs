//! Command buffer recording.
//!
//! `VkCmdRecorder` is parameterized by the kind of commands it records, so that
//! graphics commands and transfer commands do not mix on one recorder.

pub use self::recorder::VkCmdRecorder;
pub use self::graphics::{IGraphics, CmdGraphicsApi, CmdPushConstantsApi};
pub use self::transfer::{ITransfer, CmdTransferApi};

mod recorder;
mod graphics;
mod transfer;

use ash::vk;

pub trait VkCommandType {
    const BIND_POINT: vk::PipelineBindPoint;
}
