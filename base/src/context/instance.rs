use ash::vk;
use raw_window_handle::HasRawDisplayHandle;

use crate::context::debug::DebugType;
use crate::utils::cast::{chars2string, cstrings2ptrs};
use crate::{vkuint, vkchar};
use crate::error::{VkResult, VkError};

use std::ffi::CString;

const VALIDATION_LAYER_NAME: &'static str = "VK_LAYER_KHRONOS_validation";

/// The configuration parameters used in the initialization of `vk::Instance`.
#[derive(Debug, Clone)]
pub struct InstanceConfig {

    /// the highest Vulkan version the application uses, only major and minor are compared.
    pub api_version: vkuint,
    pub application_version: vkuint,
    pub application_name: String,
    pub engine_name: String,
    /// log every instance layer found on this system.
    pub print_available_layers: bool,
    /// instance creation fails if any of these layers is missing.
    pub require_layer_names: Vec<String>,
    /// `DebugType::DebugUtils` also enables the `VK_EXT_debug_utils` extension.
    pub debug: DebugType,
}

impl Default for InstanceConfig {

    fn default() -> InstanceConfig {
        InstanceConfig {
            api_version         : vk::make_api_version(0, 1, 0, 0),
            application_version : vk::make_api_version(0, 1, 0, 0),
            application_name    : String::from("Vulkan Application"),
            engine_name         : String::from("vulkan-base"),
            print_available_layers: false,
            require_layer_names : vec![String::from(VALIDATION_LAYER_NAME)],
            debug: DebugType::DebugUtils,
        }
    }
}

pub struct VkInstance {

    pub(crate) handle: ash::Instance,
    pub(crate) entry: ash::Entry,
    /// the layers enabled on the instance, enabled on the logical device as well.
    pub(crate) enable_layer_names: Vec<CString>,
}

impl VkInstance {

    pub fn new(config: InstanceConfig, window: &winit::window::Window) -> VkResult<VkInstance> {

        let entry = unsafe {
            ash::Entry::load()
                .or(Err(VkError::unlink("Entry")))?
        };

        let app_name = to_cstring(&config.application_name)?;
        let engine_name = to_cstring(&config.engine_name)?;

        let application_info = vk::ApplicationInfo {
            p_application_name  : app_name.as_ptr(),
            application_version : config.application_version,
            p_engine_name       : engine_name.as_ptr(),
            engine_version      : config.application_version,
            api_version         : config.api_version,
            ..Default::default()
        };

        let available_layers = query_available_layers(&entry)?;
        if config.print_available_layers {
            log::info!("Available instance layers: {:?}", available_layers);
        }

        let missing = missing_layers(&available_layers, &config.require_layer_names);
        if missing.is_empty() == false {
            log::error!("Instance layers {:?} are not available.", missing);
            return Err(VkError::unsupported("Vulkan Instance Layer"))
        }

        let enable_layer_names = config.require_layer_names.iter()
            .map(|name| to_cstring(name))
            .collect::<VkResult<Vec<CString>>>()?;
        let enable_layer_ptrs = cstrings2ptrs(&enable_layer_names);
        let enable_extension_names = required_extensions(window, config.debug)?;

        let instance_ci = vk::InstanceCreateInfo {
            p_application_info         : &application_info,
            enabled_layer_count        : enable_layer_ptrs.len() as _,
            pp_enabled_layer_names     : enable_layer_ptrs.as_ptr(),
            enabled_extension_count    : enable_extension_names.len() as _,
            pp_enabled_extension_names : enable_extension_names.as_ptr(),
            ..Default::default()
        };

        let handle = unsafe {
            entry.create_instance(&instance_ci, None)
                .or(Err(VkError::unlink("Instance")))?
        };

        log::debug!("Vulkan instance created with layers {:?}.", config.require_layer_names);

        Ok(VkInstance { entry, handle, enable_layer_names })
    }

    /// All child objects of this instance must have been destroyed before.
    pub(crate) fn discard(&self) {

        unsafe {
            self.handle.destroy_instance(None);
        }
    }
}

/// The surface extensions of the platform, plus debug utils if requested.
fn required_extensions(window: &winit::window::Window, debug: DebugType) -> VkResult<Vec<*const vkchar>> {

    let surface_extensions = ash_window::enumerate_required_extensions(window.raw_display_handle())
        .or(Err(VkError::unsupported("Platform Surface Extensions")))?;

    let mut instance_extensions = surface_extensions.to_vec();

    if debug == DebugType::DebugUtils {
        instance_extensions.push(ash::extensions::ext::DebugUtils::name().as_ptr());
    }

    Ok(instance_extensions)
}

fn query_available_layers(entry: &ash::Entry) -> VkResult<Vec<String>> {

    let layer_properties = entry.enumerate_instance_layer_properties()
        .or(Err(VkError::query("Layer Properties")))?;

    let names = layer_properties.iter()
        .map(|layer| chars2string(&layer.layer_name))
        .collect();
    Ok(names)
}

fn missing_layers<'a>(available: &[String], required: &'a [String]) -> Vec<&'a String> {

    required.iter()
        .filter(|name| available.contains(name) == false)
        .collect()
}

fn to_cstring(name: &str) -> VkResult<CString> {

    CString::new(name)
        .map_err(|_| VkError::other(format!("{:?} contains an interior nul byte.", name)))
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn reports_only_missing_layers() {

        let available = vec![String::from(VALIDATION_LAYER_NAME), String::from("VK_LAYER_MESA_overlay")];
        let required = vec![String::from(VALIDATION_LAYER_NAME), String::from("VK_LAYER_LUNARG_api_dump")];

        assert_eq!(missing_layers(&available, &required), vec![&required[1]]);
        assert!(missing_layers(&available, &[]).is_empty());
    }

    #[test]
    fn interior_nul_is_rejected() {

        assert!(to_cstring("Vulkan Example").is_ok());
        assert!(to_cstring("bad\0name").is_err());
    }
}
