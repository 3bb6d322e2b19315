//! The graphics-driver seam and the debug module dump.

use tracing::error;

#[cfg(debug_assertions)]
use tracing::warn;

use prism_d3d9_shader::ShaderParseError;
#[cfg(debug_assertions)]
use prism_d3d9_shader::ShaderStage;

use crate::translate::{translate, TranslatedShader};

/// External collaborator that turns an assembled SPIR-V word blob into a
/// driver shader-module handle. The translator never touches a graphics API
/// itself.
pub trait ShaderModuleDevice {
    type Module;
    type Error: std::error::Error;

    fn create_shader_module(&self, words: &[u32]) -> Result<Self::Module, Self::Error>;
}

/// Translation output plus the driver handle, if the driver produced one.
#[derive(Debug)]
pub struct ConvertedShader<M> {
    /// `None` when module creation failed; the failure is logged and the
    /// sidecar is still usable.
    pub module: Option<M>,
    pub shader: TranslatedShader,
}

/// Translates a token stream and immediately materializes the module through
/// `device`. Driver failure is not an error: it is logged and reported as a
/// `None` module alongside the intact sidecar.
pub fn convert_with_device<D: ShaderModuleDevice>(
    tokens: &[u32],
    device: &D,
) -> Result<ConvertedShader<D::Module>, ShaderParseError> {
    let shader = translate(tokens)?;
    let module = match device.create_shader_module(&shader.words) {
        Ok(module) => {
            #[cfg(debug_assertions)]
            write_debug_artifact(shader.version.stage, &shader.words);
            Some(module)
        }
        Err(err) => {
            error!(%err, "shader module creation failed");
            None
        }
    };
    Ok(ConvertedShader { module, shader })
}

/// Debug builds drop the raw module next to the process for offline
/// inspection with spirv-dis and friends.
#[cfg(debug_assertions)]
fn write_debug_artifact(stage: ShaderStage, words: &[u32]) {
    let path = match stage {
        ShaderStage::Vertex => "vertex.spv",
        ShaderStage::Pixel => "fragment.spv",
    };
    if let Err(err) = std::fs::write(path, bytemuck::cast_slice::<u32, u8>(words)) {
        warn!(%err, path, "failed to write shader module artifact");
    }
}
