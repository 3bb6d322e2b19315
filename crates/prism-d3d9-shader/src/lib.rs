//! Decoding of legacy D3D9 shader token streams (`vs_1_1`..`ps_2_0` style).
//!
//! A compiled shader is a flat array of little-endian 32-bit tokens: a version
//! token, a sequence of instructions (each an opcode token followed by its
//! operand tokens), and the `0x0000FFFF` end marker. This crate knows how to
//! pull the bit-fields out of those tokens and how to walk the stream; it has
//! no opinion about what the instructions *mean*.

pub mod error;
pub mod opcode;
pub mod reg;
pub mod stream;

pub use error::ShaderParseError;
pub use opcode::{Opcode, END_TOKEN, OPCODE_COMMENT, OPCODE_END};
pub use reg::{
    decode_dst, decode_src, decode_texture_type, decode_usage, decode_usage_index, DstParam,
    Register, RegisterType, SamplerTextureType, ShaderStage, ShaderVersion, SrcModifier, SrcParam,
    Swizzle, Usage, WriteMask, NO_SWIZZLE,
};
pub use stream::{tokens_from_bytes, TokenReader};
