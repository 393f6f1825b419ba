
use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable};
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::error::{VkResult, VkError};

use std::path::{Path, PathBuf};
use std::ffi::{CStr, CString};

// ---------------------------------------------------------------------------------------------------
/// Wrapper class for vk::ShaderModuleCreateInfo.
///
/// The shader code is loaded from `path` when the module is built.
#[derive(Debug, Clone)]
pub struct ShaderModuleCI {

    inner: vk::ShaderModuleCreateInfo,

    path : PathBuf,
    main : String,

    tag_name: String,
    shader_type: ShaderType,
    shader_stage: vk::ShaderStageFlags,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum ShaderType {
    #[cfg(feature = "glsl")]
    GLSLSource,
    SpirvSource,
}

impl VulkanCI<vk::ShaderModuleCreateInfo> for ShaderModuleCI {

    fn default_ci() -> vk::ShaderModuleCreateInfo {
        vk::ShaderModuleCreateInfo::default()
    }
}

impl AsRef<vk::ShaderModuleCreateInfo> for ShaderModuleCI {

    fn as_ref(&self) -> &vk::ShaderModuleCreateInfo {
        &self.inner
    }
}

impl VkObjectBuildableCI for ShaderModuleCI {
    type ObjectType = vk::ShaderModule;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType> {

        let codes = match self.shader_type {
            #[cfg(feature = "glsl")]
            | ShaderType::GLSLSource => {
                use crate::utils::shaderc::{VkShaderCompiler, ShadercOptions};

                let options = ShadercOptions { debug_info: cfg!(debug_assertions), ..Default::default() };
                let mut compiler = VkShaderCompiler::new()?.with_options(options);
                compiler.compile_from_path(&self.path, shader_kind(self.shader_stage)?, &self.tag_name, &self.main)?
            },
            | ShaderType::SpirvSource => {
                load_spirv(&self.path)?
            },
        };

        log::debug!("Load {:?} shader {} from {:?} ({} words).", self.shader_stage, self.tag_name, self.path, codes.len());

        let shader_module_ci = vk::ShaderModuleCreateInfo {
            code_size : codes.len() * std::mem::size_of::<u32>(),
            p_code    : codes.as_ptr(),
            ..self.inner
        };

        let module = unsafe {
            device.logic.handle.create_shader_module(&shader_module_ci, None)
                .or(Err(VkError::create("Shader Module")))?
        };
        Ok(module)
    }
}

impl ShaderModuleCI {

    /// Compile GLSL source code at runtime.
    #[cfg(feature = "glsl")]
    pub fn from_glsl(stage: vk::ShaderStageFlags, path: impl AsRef<Path>, tag_name: &str) -> ShaderModuleCI {
        ShaderModuleCI::new(stage, ShaderType::GLSLSource, path, tag_name)
    }

    /// Pick how to load the shader at `path`.
    ///
    /// A `.spv` file is loaded as SPIR-V. Any other file is GLSL source, compiled at runtime with the
    /// `glsl` feature, or else replaced by the precompiled `<path>.spv` next to it.
    pub fn from_path(stage: vk::ShaderStageFlags, path: impl AsRef<Path>, tag_name: &str) -> VkResult<ShaderModuleCI> {

        match resolve_source(path.as_ref(), cfg!(feature = "glsl"), |candidate| candidate.is_file())? {
            | ShaderSource::Spirv(path) => Ok(ShaderModuleCI::from_spirv(stage, path, tag_name)),
            | ShaderSource::Glsl(path)  => glsl_module(stage, path, tag_name),
        }
    }

    /// Load precompiled SPIR-V binary code.
    pub fn from_spirv(stage: vk::ShaderStageFlags, path: impl AsRef<Path>, tag_name: &str) -> ShaderModuleCI {
        ShaderModuleCI::new(stage, ShaderType::SpirvSource, path, tag_name)
    }

    fn new(stage: vk::ShaderStageFlags, ty: ShaderType, path: impl AsRef<Path>, tag_name: &str) -> ShaderModuleCI {

        ShaderModuleCI {
            inner: ShaderModuleCI::default_ci(),
            path: PathBuf::from(path.as_ref()),
            main: String::from("main"),
            tag_name: tag_name.into(),
            shader_type : ty,
            shader_stage: stage,
        }
    }

    pub fn main(mut self, name: impl AsRef<str>) -> ShaderModuleCI {
        self.main = String::from(name.as_ref()); self
    }
}

impl VkObjectDiscardable for vk::ShaderModule {

    fn discard_by(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_shader_module(self, None);
        }
    }
}
// ---------------------------------------------------------------------------------------------------

// ---------------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineShaderStageCreateInfo.
#[derive(Debug, Clone)]
pub struct ShaderStageCI {

    inner: vk::PipelineShaderStageCreateInfo,
    main: CString,
}

impl VulkanCI<vk::PipelineShaderStageCreateInfo> for ShaderStageCI {

    fn default_ci() -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::default()
    }
}

impl AsRef<vk::PipelineShaderStageCreateInfo> for ShaderStageCI {

    fn as_ref(&self) -> &vk::PipelineShaderStageCreateInfo {
        &self.inner
    }
}

impl ShaderStageCI {

    /// The entry point is `main`.
    pub fn new(stage: vk::ShaderStageFlags, module: vk::ShaderModule) -> ShaderStageCI {

        ShaderStageCI {
            inner: vk::PipelineShaderStageCreateInfo {
                stage, module,
                ..ShaderStageCI::default_ci()
            },
            main: unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") }.to_owned(),
        }
    }

    pub fn main(mut self, name: impl AsRef<str>) -> VkResult<ShaderStageCI> {

        self.main = CString::new(name.as_ref())
            .map_err(|_| VkError::other("Invalid name of main func in shader."))?;
        Ok(self)
    }

    /// The create info pointing to the entry point name owned by this struct.
    pub(crate) fn value(&self) -> vk::PipelineShaderStageCreateInfo {

        vk::PipelineShaderStageCreateInfo {
            p_name: self.main.as_ptr(),
            ..self.inner
        }
    }
}
// ---------------------------------------------------------------------------------------------------


// helper functions. ---------------------------------------------------------------------------------
#[derive(Debug, Clone, Eq, PartialEq)]
enum ShaderSource {
    Glsl(PathBuf),
    Spirv(PathBuf),
}

fn resolve_source(path: &Path, compile_glsl: bool, exists: impl Fn(&Path) -> bool) -> VkResult<ShaderSource> {

    if path.extension().map_or(false, |ext| ext == "spv") {
        return Ok(ShaderSource::Spirv(path.to_path_buf()))
    }

    if compile_glsl {
        return Ok(ShaderSource::Glsl(path.to_path_buf()))
    }

    let binary = spirv_sibling(path);
    if exists(&binary) {
        Ok(ShaderSource::Spirv(binary))
    } else {
        Err(VkError::other(format!(
            "{:?} is GLSL source and {:?} does not exist. Build with `--features glsl`, or run `glslangValidator -V {} -o {}`.",
            path, binary, path.display(), binary.display())))
    }
}

/// `lights.vert` -> `lights.vert.spv`.
fn spirv_sibling(path: &Path) -> PathBuf {

    let mut name = path.as_os_str().to_os_string();
    name.push(".spv");
    PathBuf::from(name)
}

#[cfg(feature = "glsl")]
fn glsl_module(stage: vk::ShaderStageFlags, path: PathBuf, tag_name: &str) -> VkResult<ShaderModuleCI> {
    Ok(ShaderModuleCI::from_glsl(stage, path, tag_name))
}

#[cfg(not(feature = "glsl"))]
fn glsl_module(_stage: vk::ShaderStageFlags, _path: PathBuf, _tag_name: &str) -> VkResult<ShaderModuleCI> {
    Err(VkError::unsupported("Runtime GLSL Compilation"))
}

fn load_spirv(path: &Path) -> VkResult<Vec<u32>> {

    let mut file = std::fs::File::open(path)
        .map_err(|_| VkError::path(path))?;

    // read_spv checks the magic number and takes care of alignment and endianness.
    ash::util::read_spv(&mut file)
        .map_err(|e| VkError::other(format!("Invalid SPIR-V code in {:?}: {}", path, e)))
}

#[cfg(feature = "glsl")]
fn shader_kind(stage: vk::ShaderStageFlags) -> VkResult<shaderc::ShaderKind> {

    let kind = match stage {
        | vk::ShaderStageFlags::VERTEX   => shaderc::ShaderKind::Vertex,
        | vk::ShaderStageFlags::FRAGMENT => shaderc::ShaderKind::Fragment,
        | vk::ShaderStageFlags::GEOMETRY => shaderc::ShaderKind::Geometry,
        | vk::ShaderStageFlags::COMPUTE  => shaderc::ShaderKind::Compute,
        | vk::ShaderStageFlags::TESSELLATION_CONTROL    => shaderc::ShaderKind::TessControl,
        | vk::ShaderStageFlags::TESSELLATION_EVALUATION => shaderc::ShaderKind::TessEvaluation,
        | _ => return Err(VkError::unsupported("Shader Stage")),
    };
    Ok(kind)
}
// ---------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn stage_value_points_to_entry_name() {

        let stage = ShaderStageCI::new(vk::ShaderStageFlags::VERTEX, vk::ShaderModule::null());
        let value = stage.value();

        assert_eq!(value.stage, vk::ShaderStageFlags::VERTEX);
        assert_eq!(value.p_name, stage.main.as_ptr());
        assert!(stage.clone().main("main\0bad").is_err());
    }

    #[test]
    fn source_is_resolved_by_extension_and_feature() {

        let source = Path::new("shaders/lights.vert");
        let nothing_exists = |_: &Path| false;

        assert_eq!(resolve_source(Path::new("shaders/lights.vert.spv"), false, nothing_exists).unwrap(),
            ShaderSource::Spirv(PathBuf::from("shaders/lights.vert.spv")));
        assert_eq!(resolve_source(source, true, nothing_exists).unwrap(),
            ShaderSource::Glsl(PathBuf::from("shaders/lights.vert")));
    }

    #[test]
    fn glsl_without_compiler_falls_back_to_sibling_binary() {

        let source = Path::new("shaders/lights.frag");

        let resolved = resolve_source(source, false, |p| p == Path::new("shaders/lights.frag.spv")).unwrap();
        assert_eq!(resolved, ShaderSource::Spirv(PathBuf::from("shaders/lights.frag.spv")));

        let message = resolve_source(source, false, |_| false).unwrap_err().to_string();
        assert!(message.contains("--features glsl"));
        assert!(message.contains("lights.frag.spv"));
    }

    #[test]
    fn missing_spirv_reports_path() {

        let error = load_spirv(Path::new("does/not/exist.spv")).unwrap_err();
        match error.kind() {
            | crate::VkErrorKind::Path { .. } => {},
            | other => panic!("unexpected error kind: {:?}", other),
        }
    }
}
