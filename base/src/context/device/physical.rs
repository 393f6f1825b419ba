
use ash::vk;

use crate::context::instance::VkInstance;
use crate::utils::cast::{chars2string, chars2cstring};
use crate::error::{VkResult, VkError};

use std::ffi::CString;

/// Depth formats in order of preference, the first one usable as optimal tiling attachment wins.
const DEPTH_FORMAT_CANDIDATES: [vk::Format; 5] = [
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D32_SFLOAT,
    vk::Format::D24_UNORM_S8_UINT,
    vk::Format::D16_UNORM_S8_UINT,
    vk::Format::D16_UNORM,
];

#[derive(Debug, Clone)]
pub struct PhysicalDevConfig {

    /// log name, type, API version and push constant limit of the chosen device.
    pub print_device_properties: bool,
    /// devices of this type are tried before all the others.
    pub device_type_preference: vk::PhysicalDeviceType,
    pub print_available_extensions: bool,
    pub request_extensions: Vec<CString>,
    pub request_features: vk::PhysicalDeviceFeatures,
}

impl Default for PhysicalDevConfig {

    fn default() -> PhysicalDevConfig {
        PhysicalDevConfig {
            print_device_properties: false,
            device_type_preference: vk::PhysicalDeviceType::DISCRETE_GPU,
            print_available_extensions: false,
            request_extensions: vec![ash::extensions::khr::Swapchain::name().to_owned()],
            request_features: vk::PhysicalDeviceFeatures::default(),
        }
    }
}

pub struct VkPhysicalDevice {

    pub handle: vk::PhysicalDevice,
    pub memories: vk::PhysicalDeviceMemoryProperties,
    pub depth_format: vk::Format,
    /// `max_push_constants_size` is checked against these before any push constant range is used.
    pub limits: vk::PhysicalDeviceLimits,

    config: PhysicalDevConfig,
}

struct Candidate {

    handle: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
}

impl VkPhysicalDevice {

    pub(crate) fn new(instance: &VkInstance, config: PhysicalDevConfig) -> VkResult<VkPhysicalDevice> {

        let mut candidates = enumerate_candidates(instance)?;
        sort_by_preference(&mut candidates, config.device_type_preference, |c| c.properties.device_type);

        let mut chosen = None;
        for candidate in candidates.into_iter() {
            if supports_extensions(instance, &candidate, &config)? && supports_features(instance, &candidate, &config) {
                chosen = Some(candidate);
                break
            }
        }

        let chosen = chosen
            .ok_or(VkError::other("No Vulkan device supports the requested extensions and features."))?;

        if config.print_device_properties {
            print_device_properties(&chosen.properties);
        }

        let memories = unsafe {
            instance.handle.get_physical_device_memory_properties(chosen.handle)
        };
        let depth_format = query_depth_format(instance, chosen.handle)?;

        Ok(VkPhysicalDevice {
            handle: chosen.handle,
            limits: chosen.properties.limits,
            memories, depth_format, config,
        })
    }

    pub fn enable_features(&self) -> &vk::PhysicalDeviceFeatures {
        &self.config.request_features
    }

    pub fn enable_extensions(&self) -> &Vec<CString> {
        &self.config.request_extensions
    }
}

fn enumerate_candidates(instance: &VkInstance) -> VkResult<Vec<Candidate>> {

    let handles = unsafe {
        instance.handle.enumerate_physical_devices()
            .or(Err(VkError::query("Physical Device")))?
    };

    let candidates = handles.into_iter().map(|handle| {
        let properties = unsafe { instance.handle.get_physical_device_properties(handle) };
        Candidate { handle, properties }
    }).collect();
    Ok(candidates)
}

/// Stable sort, devices of the `preferred` type first, enumeration order otherwise.
fn sort_by_preference<T>(devices: &mut Vec<T>, preferred: vk::PhysicalDeviceType, device_type: impl Fn(&T) -> vk::PhysicalDeviceType) {
    devices.sort_by_key(|device| device_type(device) != preferred);
}

// -----------------------------------------------------------------------------------
fn supports_extensions(instance: &VkInstance, candidate: &Candidate, config: &PhysicalDevConfig) -> VkResult<bool> {

    let properties = unsafe {
        instance.handle.enumerate_device_extension_properties(candidate.handle)
            .or(Err(VkError::query("Device Extensions")))?
    };

    let available: Vec<CString> = properties.iter()
        .map(|extension| chars2cstring(&extension.extension_name))
        .collect();

    if config.print_available_extensions {
        log::info!("Extensions of {}: {:?}", chars2string(&candidate.properties.device_name), available);
    }

    Ok(config.request_extensions.iter().all(|name| available.contains(name)))
}

macro_rules! require_features {
    ($available:ident, $requested:expr, [ $($feature:ident),* $(,)? ]) => {
        $(
            if $requested.$feature == vk::TRUE && $available.$feature == vk::FALSE {
                log::debug!("Device skipped, feature {} is missing.", stringify!($feature));
                return false
            }
        )*
    };
}

fn supports_features(instance: &VkInstance, candidate: &Candidate, config: &PhysicalDevConfig) -> bool {

    let available = unsafe {
        instance.handle.get_physical_device_features(candidate.handle)
    };

    require_features!(available, config.request_features, [
        geometry_shader,
        tessellation_shader,
        fill_mode_non_solid,
        depth_clamp,
        wide_lines,
        large_points,
        sampler_anisotropy,
        shader_float64,
    ]);

    true
}
// -----------------------------------------------------------------------------------

fn print_device_properties(properties: &vk::PhysicalDeviceProperties) {

    log::info!("Using device: {} ({})", chars2string(&properties.device_name), device_type_name(properties.device_type));
    log::info!("Device API version: {}.{}.{}",
        vk::api_version_major(properties.api_version),
        vk::api_version_minor(properties.api_version),
        vk::api_version_patch(properties.api_version));
    log::info!("maxPushConstantsSize: {} bytes", properties.limits.max_push_constants_size);
}

fn device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {

    match device_type {
        | vk::PhysicalDeviceType::CPU            => "CPU",
        | vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
        | vk::PhysicalDeviceType::DISCRETE_GPU   => "Discrete GPU",
        | vk::PhysicalDeviceType::VIRTUAL_GPU    => "Virtual GPU",
        | _ => "Unknown",
    }
}

fn query_depth_format(instance: &VkInstance, phy: vk::PhysicalDevice) -> VkResult<vk::Format> {

    let chosen = DEPTH_FORMAT_CANDIDATES.iter().cloned().find(|&format| {
        let properties = unsafe {
            instance.handle.get_physical_device_format_properties(phy, format)
        };
        properties.optimal_tiling_features.contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    });

    match chosen {
        | Some(format) => {
            log::debug!("Depth format: {:?}", format);
            Ok(format)
        },
        | None => Err(VkError::unsupported("Depth Stencil Attachment Format")),
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn preferred_type_first_and_order_kept() {

        use vk::PhysicalDeviceType as Type;

        let mut devices = vec![
            (0, Type::INTEGRATED_GPU),
            (1, Type::DISCRETE_GPU),
            (2, Type::CPU),
            (3, Type::DISCRETE_GPU),
        ];
        sort_by_preference(&mut devices, Type::DISCRETE_GPU, |d| d.1);

        let order: Vec<i32> = devices.iter().map(|d| d.0).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn device_type_names() {

        assert_eq!(device_type_name(vk::PhysicalDeviceType::DISCRETE_GPU), "Discrete GPU");
        assert_eq!(device_type_name(vk::PhysicalDeviceType::OTHER), "Unknown");
    }
}
