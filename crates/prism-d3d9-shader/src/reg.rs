//! Register, parameter and version token bit-field decoding.

const REGNUM_MASK: u32 = 0x0000_07FF;
const REGTYPE_MASK: u32 = 0x7000_0000;
const REGTYPE_MASK2: u32 = 0x0000_1800;
const REGTYPE_SHIFT: u32 = 28;
const REGTYPE_SHIFT2: u32 = 8;

const DST_WRITEMASK_MASK: u32 = 0x000F_0000;
const DST_WRITEMASK_SHIFT: u32 = 16;
const DSTMOD_MASK: u32 = 0x00F0_0000;
const DSTMOD_SHIFT: u32 = 20;
const DST_SHIFT_MASK: u32 = 0x0F00_0000;
const DST_SHIFT_SHIFT: u32 = 24;

const SRC_SWIZZLE_MASK: u32 = 0x00FF_0000;
const SRC_SWIZZLE_SHIFT: u32 = 16;
const SRCMOD_MASK: u32 = 0x0F00_0000;
const SRCMOD_SHIFT: u32 = 24;

const DCL_USAGE_MASK: u32 = 0x0000_001F;
const DCL_USAGEINDEX_MASK: u32 = 0x000F_0000;
const DCL_USAGEINDEX_SHIFT: u32 = 16;
const DCL_TEXTURETYPE_MASK: u32 = 0x7800_0000;
const DCL_TEXTURETYPE_SHIFT: u32 = 27;

/// Register file of a parameter token.
///
/// The raw 5-bit value is split across two disjoint bit-fields of the token
/// (3 bits at 28..30 and 2 bits at 11..12); both must be reassembled to get
/// the real value. Constant banks 2/3/4 address disjoint ranges of the same
/// logical constant file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegisterType {
    Temp,
    Input,
    Const,
    /// `t#` in pixel shaders, the address register `a0` in vertex shaders.
    Texture,
    RastOut,
    AttrOut,
    Output,
    ConstInt,
    ColorOut,
    DepthOut,
    Sampler,
    Const2,
    Const3,
    Const4,
    ConstBool,
    Loop,
    TempFloat16,
    Misc,
    Label,
    Predicate,
}

impl RegisterType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Temp,
            1 => Self::Input,
            2 => Self::Const,
            3 => Self::Texture,
            4 => Self::RastOut,
            5 => Self::AttrOut,
            6 => Self::Output,
            7 => Self::ConstInt,
            8 => Self::ColorOut,
            9 => Self::DepthOut,
            10 => Self::Sampler,
            11 => Self::Const2,
            12 => Self::Const3,
            13 => Self::Const4,
            14 => Self::ConstBool,
            15 => Self::Loop,
            16 => Self::TempFloat16,
            17 => Self::Misc,
            18 => Self::Label,
            19 => Self::Predicate,
            _ => return None,
        })
    }

    /// Reassembles the split register-type encoding of a parameter token.
    pub fn from_token(token: u32) -> Option<Self> {
        let raw = (((token & REGTYPE_MASK) >> REGTYPE_SHIFT)
            | ((token & REGTYPE_MASK2) >> REGTYPE_SHIFT2)) as u8;
        Self::from_raw(raw)
    }

    /// Offset applied to the register number when this file keys the
    /// register map. Constant banks 2/3/4 live at +2048/+4096/+6144 so a
    /// `c5` in bank 2 never collides with `c5` in bank 1.
    pub fn map_offset(self) -> u32 {
        match self {
            Self::Const2 => 2048,
            Self::Const3 => 4096,
            Self::Const4 => 6144,
            _ => 0,
        }
    }

    pub fn is_constant_bank(self) -> bool {
        matches!(self, Self::Const | Self::Const2 | Self::Const3 | Self::Const4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    pub ty: RegisterType,
    pub num: u32,
}

impl Register {
    pub fn from_token(token: u32) -> Option<Self> {
        Some(Self {
            ty: RegisterType::from_token(token)?,
            num: token & REGNUM_MASK,
        })
    }

    /// Key under which this register is tracked, with constant-bank offsets
    /// applied.
    pub fn map_key(self) -> (RegisterType, u32) {
        (self.ty, self.num + self.ty.map_offset())
    }
}

/// Four 2-bit component selectors, x in the low pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzle(pub [u8; 4]);

/// The raw swizzle byte meaning "pass components through unchanged".
pub const NO_SWIZZLE: u8 = 0xE4;

impl Swizzle {
    pub const XYZW: Swizzle = Swizzle([0, 1, 2, 3]);

    pub fn from_byte(swz: u8) -> Self {
        let comp = |shift: u32| (swz >> shift) & 0b11;
        Self([comp(0), comp(2), comp(4), comp(6)])
    }

    /// All four selectors name the same component.
    pub fn is_broadcast(self) -> bool {
        let [x, y, z, w] = self.0;
        x == y && x == z && x == w
    }
}

/// Destination write mask, one bit per component (x = bit 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteMask(pub u8);

impl WriteMask {
    pub const XYZW: WriteMask = WriteMask(0b1111);

    pub fn component_count(self) -> u32 {
        u32::from(self.0 & 0xF).count_ones()
    }
}

/// Source operand modifier (negate, bias, complement, ...).
///
/// Decoded for completeness; the translated subset treats every source as
/// unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SrcModifier {
    None,
    Negate,
    Bias,
    BiasNegate,
    Sign,
    SignNegate,
    Complement,
    X2,
    X2Negate,
    Dz,
    Dw,
    Abs,
    AbsNegate,
    Not,
    Unknown(u8),
}

impl SrcModifier {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::Negate,
            2 => Self::Bias,
            3 => Self::BiasNegate,
            4 => Self::Sign,
            5 => Self::SignNegate,
            6 => Self::Complement,
            7 => Self::X2,
            8 => Self::X2Negate,
            9 => Self::Dz,
            10 => Self::Dw,
            11 => Self::Abs,
            12 => Self::AbsNegate,
            13 => Self::Not,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstParam {
    pub reg: Register,
    pub mask: WriteMask,
    pub saturate: bool,
    pub partial_precision: bool,
    pub centroid: bool,
    /// Result shift scale exponent (`_x2`, `_d2`, ...).
    pub shift: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcParam {
    pub reg: Register,
    pub swizzle: Swizzle,
    pub modifier: SrcModifier,
}

/// Decodes a destination parameter token. `None` when the register type
/// bits name an unknown file.
pub fn decode_dst(token: u32) -> Option<DstParam> {
    let ty = RegisterType::from_token(token)?;
    let dstmod = ((token & DSTMOD_MASK) >> DSTMOD_SHIFT) as u8;
    Some(DstParam {
        reg: Register {
            ty,
            num: token & REGNUM_MASK,
        },
        mask: WriteMask(((token & DST_WRITEMASK_MASK) >> DST_WRITEMASK_SHIFT) as u8),
        saturate: dstmod & 0x1 != 0,
        partial_precision: dstmod & 0x2 != 0,
        centroid: dstmod & 0x4 != 0,
        shift: ((token & DST_SHIFT_MASK) >> DST_SHIFT_SHIFT) as u8,
    })
}

/// Decodes a source parameter token. `None` when the register type bits
/// name an unknown file.
pub fn decode_src(token: u32) -> Option<SrcParam> {
    let ty = RegisterType::from_token(token)?;
    let swz = ((token & SRC_SWIZZLE_MASK) >> SRC_SWIZZLE_SHIFT) as u8;
    Some(SrcParam {
        reg: Register {
            ty,
            num: token & REGNUM_MASK,
        },
        swizzle: Swizzle::from_byte(swz),
        modifier: SrcModifier::from_raw(((token & SRCMOD_MASK) >> SRCMOD_SHIFT) as u8),
    })
}

/// Raw swizzle field of a source token, before expansion into selectors.
pub fn swizzle_byte(token: u32) -> u8 {
    ((token & SRC_SWIZZLE_MASK) >> SRC_SWIZZLE_SHIFT) as u8
}

/// Declaration usage semantic of a `dcl` usage token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    Position,
    BlendWeight,
    BlendIndices,
    Normal,
    PointSize,
    TexCoord,
    Tangent,
    Binormal,
    TessFactor,
    PositionT,
    Color,
    Fog,
    Depth,
    Sample,
    Unknown(u8),
}

impl Usage {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Position,
            1 => Self::BlendWeight,
            2 => Self::BlendIndices,
            3 => Self::Normal,
            4 => Self::PointSize,
            5 => Self::TexCoord,
            6 => Self::Tangent,
            7 => Self::Binormal,
            8 => Self::TessFactor,
            9 => Self::PositionT,
            10 => Self::Color,
            11 => Self::Fog,
            12 => Self::Depth,
            13 => Self::Sample,
            other => Self::Unknown(other),
        }
    }
}

pub fn decode_usage(token: u32) -> Usage {
    Usage::from_raw((token & DCL_USAGE_MASK) as u8)
}

pub fn decode_usage_index(token: u32) -> u32 {
    (token & DCL_USAGEINDEX_MASK) >> DCL_USAGEINDEX_SHIFT
}

/// Sampler texture dimensionality of a `dcl` sampler token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerTextureType {
    Unknown,
    TwoD,
    Cube,
    Volume,
    Other(u8),
}

impl SamplerTextureType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Unknown,
            2 => Self::TwoD,
            3 => Self::Cube,
            4 => Self::Volume,
            other => Self::Other(other),
        }
    }
}

pub fn decode_texture_type(token: u32) -> SamplerTextureType {
    SamplerTextureType::from_raw(((token & DCL_TEXTURETYPE_MASK) >> DCL_TEXTURETYPE_SHIFT) as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderVersion {
    pub stage: ShaderStage,
    pub major: u8,
    pub minor: u8,
}

impl ShaderVersion {
    /// Decodes the leading version token: kind in bits 16..31
    /// (`0xFFFF` pixel, `0xFFFE` vertex), major in 8..15, minor in 0..7.
    pub fn from_token(token: u32) -> Option<Self> {
        let stage = match (token >> 16) as u16 {
            0xFFFE => ShaderStage::Vertex,
            0xFFFF => ShaderStage::Pixel,
            _ => return None,
        };
        Some(Self {
            stage,
            major: ((token >> 8) & 0xFF) as u8,
            minor: (token & 0xFF) as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg_token(regtype: u8, index: u32) -> u32 {
        let low3 = (regtype as u32) & 0x7;
        let high2 = (regtype as u32) & 0x18;
        0x8000_0000 | (low3 << 28) | (high2 << 8) | (index & 0x7FF)
    }

    #[test]
    fn register_type_reassembles_split_fields() {
        // Sampler (10) has bits in both halves of the split encoding.
        let token = reg_token(10, 3);
        assert_eq!(RegisterType::from_token(token), Some(RegisterType::Sampler));
        assert_eq!(token & 0x7FF, 3);

        // Const4 (13) likewise.
        assert_eq!(
            RegisterType::from_token(reg_token(13, 0)),
            Some(RegisterType::Const4)
        );

        // The primary field alone would claim this is Const (2); only the
        // combined value names ConstInt (7 = 0b00111).
        assert_ne!(
            RegisterType::from_token(reg_token(7, 0)),
            Some(RegisterType::Const)
        );
        assert_eq!(
            RegisterType::from_token(reg_token(7, 0)),
            Some(RegisterType::ConstInt)
        );
    }

    #[test]
    fn unknown_register_type_is_rejected() {
        assert_eq!(RegisterType::from_raw(20), None);
        assert_eq!(RegisterType::from_raw(31), None);
    }

    #[test]
    fn constant_banks_key_disjoint_ranges() {
        let base = Register {
            ty: RegisterType::Const,
            num: 5,
        };
        let bank2 = Register {
            ty: RegisterType::Const2,
            num: 5,
        };
        let bank3 = Register {
            ty: RegisterType::Const3,
            num: 5,
        };
        let bank4 = Register {
            ty: RegisterType::Const4,
            num: 5,
        };
        assert_eq!(base.map_key().1, 5);
        assert_eq!(bank2.map_key().1, 2053);
        assert_eq!(bank3.map_key().1, 4101);
        assert_eq!(bank4.map_key().1, 6149);
    }

    #[test]
    fn swizzle_selectors_unpack() {
        assert_eq!(Swizzle::from_byte(NO_SWIZZLE), Swizzle::XYZW);
        assert_eq!(Swizzle::from_byte(0x00), Swizzle([0, 0, 0, 0]));
        assert!(Swizzle::from_byte(0x55).is_broadcast()); // .yyyy
        assert_eq!(Swizzle::from_byte(0x1B), Swizzle([3, 2, 1, 0])); // .wzyx
        assert!(!Swizzle::from_byte(0x1B).is_broadcast());
    }

    #[test]
    fn write_mask_component_count() {
        assert_eq!(WriteMask(0b0001).component_count(), 1);
        assert_eq!(WriteMask(0b0011).component_count(), 2);
        assert_eq!(WriteMask(0b0111).component_count(), 3);
        assert_eq!(WriteMask(0b1111).component_count(), 4);
        assert_eq!(WriteMask(0b1010).component_count(), 2);
    }

    #[test]
    fn dst_param_fields() {
        let token = reg_token(0, 7) | (0xF << 16) | (0x1 << 20);
        let dst = decode_dst(token).unwrap();
        assert_eq!(dst.reg.ty, RegisterType::Temp);
        assert_eq!(dst.reg.num, 7);
        assert_eq!(dst.mask, WriteMask::XYZW);
        assert!(dst.saturate);
        assert!(!dst.centroid);
    }

    #[test]
    fn src_param_fields() {
        let token = reg_token(2, 31) | (0x1B << 16) | (0x1 << 24);
        let src = decode_src(token).unwrap();
        assert_eq!(src.reg.ty, RegisterType::Const);
        assert_eq!(src.reg.num, 31);
        assert_eq!(src.swizzle, Swizzle([3, 2, 1, 0]));
        assert_eq!(src.modifier, SrcModifier::Negate);
    }

    #[test]
    fn version_token_decodes_stage_and_model() {
        assert_eq!(
            ShaderVersion::from_token(0xFFFE_0101),
            Some(ShaderVersion {
                stage: ShaderStage::Vertex,
                major: 1,
                minor: 1
            })
        );
        assert_eq!(
            ShaderVersion::from_token(0xFFFF_0200),
            Some(ShaderVersion {
                stage: ShaderStage::Pixel,
                major: 2,
                minor: 0
            })
        );
        assert_eq!(ShaderVersion::from_token(0x0001_0200), None);
    }

    #[test]
    fn dcl_usage_fields() {
        let token = 0x8000_0000 | 5 | (2 << 16);
        assert_eq!(decode_usage(token), Usage::TexCoord);
        assert_eq!(decode_usage_index(token), 2);

        let sampler = 0x8000_0000 | (2u32 << 27);
        assert_eq!(decode_texture_type(sampler), SamplerTextureType::TwoD);
    }
}
