//! Pipeline-layout sidecar types.
//!
//! These carry the Vulkan numeric values (`VkFormat`, `VkDescriptorType`,
//! `VkShaderStageFlagBits`) so a binding layer can feed them straight into
//! pipeline creation without another mapping table, while keeping this crate
//! free of any API dependency.

/// Vertex attribute format, by component count of the declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum VertexFormat {
    /// `VK_FORMAT_R32_SFLOAT`
    R32Sfloat = 100,
    /// `VK_FORMAT_R32G32_SFLOAT`
    R32g32Sfloat = 103,
    /// `VK_FORMAT_R32G32B32_SFLOAT`
    R32g32b32Sfloat = 106,
    /// `VK_FORMAT_R32G32B32A32_SFLOAT`
    R32g32b32a32Sfloat = 109,
}

impl VertexFormat {
    pub fn from_component_count(count: u32) -> Option<Self> {
        Some(match count {
            1 => Self::R32Sfloat,
            2 => Self::R32g32Sfloat,
            3 => Self::R32g32b32Sfloat,
            4 => Self::R32g32b32a32Sfloat,
            _ => return None,
        })
    }
}

/// One vertex input attribute, produced per vertex-shader `dcl` of an input
/// register. Locations are assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInputAttribute {
    pub binding: u32,
    pub location: u32,
    pub offset: u32,
    pub format: VertexFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DescriptorType {
    /// `VK_DESCRIPTOR_TYPE_COMBINED_IMAGE_SAMPLER`
    CombinedImageSampler = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ShaderStageFlag {
    /// `VK_SHADER_STAGE_VERTEX_BIT`
    Vertex = 0x01,
    /// `VK_SHADER_STAGE_FRAGMENT_BIT`
    Fragment = 0x10,
}

/// One descriptor-set layout binding, produced per sampler declaration.
/// Binding numbers are assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub descriptor_count: u32,
    pub stage: ShaderStageFlag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_component_count() {
        assert_eq!(
            VertexFormat::from_component_count(1),
            Some(VertexFormat::R32Sfloat)
        );
        assert_eq!(
            VertexFormat::from_component_count(4),
            Some(VertexFormat::R32g32b32a32Sfloat)
        );
        assert_eq!(VertexFormat::from_component_count(0), None);
        assert_eq!(VertexFormat::from_component_count(5), None);
    }

    #[test]
    fn raw_values_match_vulkan() {
        assert_eq!(VertexFormat::R32g32b32Sfloat as u32, 106);
        assert_eq!(DescriptorType::CombinedImageSampler as u32, 1);
        assert_eq!(ShaderStageFlag::Fragment as u32, 0x10);
    }
}
