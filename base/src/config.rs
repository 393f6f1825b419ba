//! Application settings loaded from a TOML file.
//!
//! Every table and field is optional, the missing ones fall back to their defaults.

use serde::Deserialize;

use crate::workflow::{WindowConfig, WindowMode};
use crate::context::{InstanceConfig, ValidationConfig, DebugType, SwapchainConfig, PhysicalDevConfig};
use crate::error::{VkResult, VkError};

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {

    pub window: WindowSection,
    pub vulkan: VulkanSection,
    pub assets: AssetSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowSection {

    pub title: String,
    pub width : u32,
    pub height: u32,
    pub resizable: bool,
    pub mode: WindowMode,
}

impl Default for WindowSection {

    fn default() -> WindowSection {
        WindowSection {
            title: String::from("Vulkan Example"),
            width : 1280,
            height: 720,
            resizable: true,
            mode: WindowMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VulkanSection {

    /// enable the validation layer and route its messages to the log.
    pub validation: bool,
    /// wait for vertical blank when presenting.
    pub vsync: bool,
    /// log the properties of the selected physical device.
    pub print_device_info: bool,
}

impl Default for VulkanSection {

    fn default() -> VulkanSection {
        VulkanSection {
            validation: false,
            vsync: true,
            print_device_info: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetSection {

    pub model: PathBuf,
    pub vertex_shader  : PathBuf,
    pub fragment_shader: PathBuf,
}

impl Default for AssetSection {

    fn default() -> AssetSection {
        AssetSection {
            model: PathBuf::from("demos/assets/models/samplescene.gltf"),
            vertex_shader  : PathBuf::from("demos/shaders/pushconstants/lights.vert"),
            fragment_shader: PathBuf::from("demos/shaders/pushconstants/lights.frag"),
        }
    }
}

impl AppConfig {

    /// Load configuration from `path`, or use the defaults if the file does not exist.
    pub fn load_from_path(path: impl AsRef<Path>) -> VkResult<AppConfig> {

        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults.", path);
            return Ok(AppConfig::default())
        }

        let content = std::fs::read_to_string(path)
            .map_err(|_| VkError::path(path))?;
        let config = AppConfig::from_toml(&content)?;

        log::info!("Loaded configuration from {:?}.", path);
        log::debug!("{:?}", config);

        Ok(config)
    }

    pub fn from_toml(content: &str) -> VkResult<AppConfig> {

        let config: AppConfig = toml::from_str(content)
            .map_err(|e| VkError::config(e.to_string()))?;

        if config.window.width == 0 || config.window.height == 0 {
            return Err(VkError::config("window dimension must be greater than 0"))
        }

        Ok(config)
    }

    pub fn window_config(&self) -> WindowConfig {

        let mut config = WindowConfig::default();
        config.title = self.window.title.clone();
        config.mode = self.window.mode;
        config.dimension.width  = self.window.width;
        config.dimension.height = self.window.height;
        config.is_resizable = self.window.resizable;

        config
    }

    pub fn instance_config(&self) -> InstanceConfig {

        let mut config = InstanceConfig::default();
        config.application_name = self.window.title.clone();

        if self.vulkan.validation {
            config.require_layer_names = vec![String::from("VK_LAYER_KHRONOS_validation")];
            config.debug = DebugType::DebugUtils;
        } else {
            config.require_layer_names.clear();
            config.debug = DebugType::None;
        }

        config
    }

    pub fn validation_config(&self) -> ValidationConfig {

        let mut config = ValidationConfig::default();
        config.debug_type = if self.vulkan.validation { DebugType::DebugUtils } else { DebugType::None };

        config
    }

    pub fn physical_device_config(&self) -> PhysicalDevConfig {

        let mut config = PhysicalDevConfig::default();
        config.print_device_properties = self.vulkan.print_device_info;

        config
    }

    pub fn swapchain_config(&self) -> SwapchainConfig {

        let mut config = SwapchainConfig::default();
        config.present_vsync = self.vulkan.vsync;
        config.dimension_preference.width  = self.window.width;
        config.dimension_preference.height = self.window.height;

        config
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {

        let config = AppConfig::from_toml("").unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(config.vulkan.vsync);
        assert!(!config.vulkan.validation);
        assert_eq!(config.assets.model, PathBuf::from("demos/assets/models/samplescene.gltf"));
    }

    #[test]
    fn partial_tables_keep_other_defaults() {

        let content = r#"
            [window]
            title = "Push constants"
            mode = "maximized"

            [vulkan]
            validation = true
        "#;

        let config = AppConfig::from_toml(content).unwrap();

        assert_eq!(config.window.title, "Push constants");
        assert_eq!(config.window.mode, WindowMode::Maximized);
        assert_eq!(config.window.width, 1280);
        assert!(config.vulkan.validation);
        assert!(config.vulkan.vsync);

        let instance = config.instance_config();
        assert_eq!(instance.require_layer_names, vec![String::from("VK_LAYER_KHRONOS_validation")]);
        assert_eq!(config.validation_config().debug_type, DebugType::DebugUtils);
    }

    #[test]
    fn disabled_validation_requests_no_layer() {

        let config = AppConfig::from_toml("[vulkan]\nvalidation = false").unwrap();

        assert!(config.instance_config().require_layer_names.is_empty());
        assert_eq!(config.validation_config().debug_type, DebugType::None);
    }

    #[test]
    fn malformed_document_is_rejected() {

        let error = AppConfig::from_toml("[window]\nwidth = \"wide\"").unwrap_err();
        match error.kind() {
            | crate::VkErrorKind::Config { .. } => {},
            | other => panic!("unexpected error kind: {:?}", other),
        }

        assert!(AppConfig::from_toml("[window]\nheight = 0").is_err());
    }

    #[test]
    fn swapchain_follows_window_and_vsync() {

        let config = AppConfig::from_toml("[window]\nwidth = 800\nheight = 600\n[vulkan]\nvsync = false").unwrap();
        let swapchain = config.swapchain_config();

        assert!(!swapchain.present_vsync);
        assert_eq!(swapchain.dimension_preference.width, 800);
        assert_eq!(swapchain.dimension_preference.height, 600);

        let window = config.window_config();
        assert_eq!(window.dimension.width, 800);
        assert_eq!(window.dimension.height, 600);
    }
}
