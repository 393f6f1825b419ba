//!
//! Vulkan Example - Push constants
//!
//! Push constants are small blocks of uniform data stored within a command buffer, that can be
//! accessed from the shaders. This example animates six lights whose positions are updated
//! through push constants every frame, while the camera matrices stay in a uniform buffer.
//!
//! Usage: `pushconstants [config.toml]`, the configuration defaults to `demos/pushconstants.toml`.
//!

mod data;
mod example;

use vkbase::{AppConfig, VkResult};

const DEFAULT_CONFIG_PATH: &'static str = "demos/pushconstants.toml";

fn main() {

    init_logging();

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {

    // RUST_LOG overrides the default level.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn run() -> VkResult<()> {

    use vkbase::WindowContext;
    use vkbase::context::VulkanContext;
    use vkbase::ProcPipeline;

    let config_path = std::env::args().nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load_from_path(&config_path)?;

    let window = WindowContext::new(config.window_config())?;

    let vk_context = VulkanContext::new(&window)
        .with_instance_config(config.instance_config())
        .with_debugger_config(config.validation_config())
        .with_physical_device_config(config.physical_device_config())
        .with_swapchain_config(config.swapchain_config())
        .build()?;

    let app = example::VulkanExample::new(&vk_context, &config)?;

    let entry = ProcPipeline::new(window, vk_context)?;
    entry.launch(app)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn bundled_config_parses() {

        let config = AppConfig::from_toml(include_str!("../../pushconstants.toml")).unwrap();

        assert_eq!(config.window.title, "Vulkan Example - Push constants");
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert!(config.assets.vertex_shader.ends_with("lights.vert"));
        assert!(config.assets.fragment_shader.ends_with("lights.frag"));
    }

    #[test]
    fn bundled_assets_exist() {

        let config = AppConfig::from_toml(include_str!("../../pushconstants.toml")).unwrap();

        // paths in the config are relative to the workspace root.
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
        assert!(root.join(&config.assets.model).is_file());
        assert!(root.join(&config.assets.vertex_shader).is_file());
        assert!(root.join(&config.assets.fragment_shader).is_file());
    }
}
