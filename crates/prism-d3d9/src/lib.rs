//! Legacy D3D9 shader bytecode → SPIR-V translation.
//!
//! One call to [`translate`] runs a single pass over a shader's token stream
//! and produces a self-contained SPIR-V word blob plus the sidecar metadata a
//! pipeline-layout builder needs (vertex input attributes, descriptor-set
//! bindings). The graphics driver that turns the blob into a module handle is
//! a caller-supplied [`ShaderModuleDevice`]; this crate never talks to an API
//! directly, so it can be exercised in host-side test harnesses.

pub mod cache;
pub mod device;
pub mod layout;
pub mod translate;

pub use cache::{CacheLookup, CacheLookupSource, CachedShader, ShaderCache};
pub use device::{convert_with_device, ConvertedShader, ShaderModuleDevice};
pub use layout::{
    DescriptorSetLayoutBinding, DescriptorType, ShaderStageFlag, VertexFormat,
    VertexInputAttribute,
};
pub use prism_d3d9_shader::{ShaderParseError, ShaderStage, ShaderVersion};
pub use translate::{translate, translate_bytes, TranslatedShader};
