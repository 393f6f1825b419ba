//! Runtime GLSL to SPIR-V compilation, enabled by the `glsl` feature.

use crate::error::{VkResult, VkError};

use std::path::Path;

/// Switches applied to every compilation of a `VkShaderCompiler`.
#[derive(Debug, Clone)]
pub struct ShadercOptions {

    pub optimization: shaderc::OptimizationLevel,
    /// keep the debug information in the SPIR-V output, useful with the validation layer.
    pub debug_info: bool,
    pub warnings_as_errors: bool,
}

impl Default for ShadercOptions {

    fn default() -> ShadercOptions {
        ShadercOptions {
            optimization: shaderc::OptimizationLevel::Performance,
            debug_info: true,
            warnings_as_errors: false,
        }
    }
}

pub struct VkShaderCompiler {

    compiler: shaderc::Compiler,
    options : ShadercOptions,
}

impl VkShaderCompiler {

    pub fn new() -> VkResult<VkShaderCompiler> {

        let compiler = shaderc::Compiler::new()
            .ok_or(VkError::shaderc("Failed to initialize shader compiler."))?;

        Ok(VkShaderCompiler { compiler, options: ShadercOptions::default() })
    }

    pub fn with_options(mut self, options: ShadercOptions) -> VkShaderCompiler {
        self.options = options; self
    }

    /// Compile `source` for Vulkan, `input_name` only shows up in diagnostics.
    pub fn compile_from_str(&mut self, source: &str, kind: shaderc::ShaderKind, input_name: &str, entry_name: &str) -> VkResult<Vec<u32>> {

        let options = self.compile_options()?;

        let artifact = self.compiler.compile_into_spirv(source, kind, input_name, entry_name, Some(&options))
            .map_err(|e| VkError::shaderc(format!("{}: {}", input_name, e)))?;

        if artifact.get_num_warnings() > 0 {
            log::warn!("{}: {}", input_name, artifact.get_warning_messages());
        }

        Ok(artifact.as_binary().to_vec())
    }

    pub fn compile_from_path(&mut self, path: impl AsRef<Path>, kind: shaderc::ShaderKind, input_name: &str, entry_name: &str) -> VkResult<Vec<u32>> {

        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|_| VkError::path(path))?;

        self.compile_from_str(&source, kind, input_name, entry_name)
    }

    fn compile_options(&self) -> VkResult<shaderc::CompileOptions> {

        let mut options = shaderc::CompileOptions::new()
            .ok_or(VkError::shaderc("Failed to create shader compile options."))?;

        options.set_target_env(shaderc::TargetEnv::Vulkan, shaderc::EnvVersion::Vulkan1_0 as u32);
        options.set_source_language(shaderc::SourceLanguage::GLSL);
        options.set_optimization_level(self.options.optimization);

        if self.options.debug_info {
            options.set_generate_debug_info();
        }
        if self.options.warnings_as_errors {
            options.set_warnings_as_errors();
        }

        Ok(options)
    }
}
