//! Validation layer messages routed into the `log` facade.

use ash::vk;
use ash::extensions::ext::DebugUtils;

use crate::context::instance::VkInstance;
use crate::{vkptr, vkbool};
use crate::error::{VkResult, VkError};

use std::ffi::CStr;

#[derive(Debug, Clone)]
pub struct ValidationConfig {

    /// `DebugType::None` creates no messenger at all.
    pub debug_type: DebugType,
    /// the severities forwarded to the log.
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub types: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for ValidationConfig {

    fn default() -> ValidationConfig {
        ValidationConfig {
            debug_type: DebugType::None,
            severity: vk::DebugUtilsMessageSeverityFlagsEXT::WARNING | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            types:
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL |
                vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE |
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DebugType {
    DebugUtils,
    None,
}

impl Default for DebugType {

    fn default() -> DebugType {
        DebugType::None
    }
}

pub struct VkDebugger {

    messenger: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VkDebugger {

    pub fn new(instance: &VkInstance, config: ValidationConfig) -> VkResult<VkDebugger> {

        if config.debug_type == DebugType::None {
            return Ok(VkDebugger { messenger: None })
        }

        let loader = DebugUtils::new(&instance.entry, &instance.handle);

        let messenger_ci = vk::DebugUtilsMessengerCreateInfoEXT {
            message_severity : config.severity,
            message_type     : config.types,
            pfn_user_callback: Some(debug_utils_callback),
            ..Default::default()
        };

        let handle = unsafe {
            loader.create_debug_utils_messenger(&messenger_ci, None)
                .or(Err(VkError::create("Debug Utils Messenger")))?
        };

        log::debug!("Validation messages with severity {:?} are forwarded to the log.", config.severity);

        Ok(VkDebugger { messenger: Some((loader, handle)) })
    }

    pub fn discard(&self) {

        if let Some((ref loader, handle)) = self.messenger {
            unsafe {
                loader.destroy_debug_utils_messenger(handle, None);
            }
        }
    }
}

unsafe extern "system" fn debug_utils_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type    : vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data : *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data    : vkptr
) -> vkbool {

    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE
    }

    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();
    log::log!(target: "vulkan", log_level(message_severity), "[{}] {}", type_tag(message_type), message);

    // never abort the call which triggered the message.
    vk::FALSE
}

fn log_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {

    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

fn type_tag(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {

    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn severity_maps_to_log_level() {

        use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

        assert_eq!(log_level(Severity::ERROR), log::Level::Error);
        assert_eq!(log_level(Severity::WARNING), log::Level::Warn);
        assert_eq!(log_level(Severity::INFO), log::Level::Info);
        assert_eq!(log_level(Severity::VERBOSE), log::Level::Trace);
        assert_eq!(log_level(Severity::WARNING | Severity::ERROR), log::Level::Error);
    }

    #[test]
    fn validation_tag_wins() {

        use vk::DebugUtilsMessageTypeFlagsEXT as Type;

        assert_eq!(type_tag(Type::VALIDATION | Type::PERFORMANCE), "Validation");
        assert_eq!(type_tag(Type::PERFORMANCE), "Performance");
        assert_eq!(type_tag(Type::GENERAL), "General");
    }
}
