use thiserror::Error;

/// Stream-level failures that make translation impossible before it starts.
///
/// Everything past a well-formed version token is handled by
/// log-and-continue in the translator, never by an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderParseError {
    #[error("empty shader token stream")]
    Empty,
    #[error("shader blob length {len} is not a multiple of 4")]
    UnalignedLength { len: usize },
    #[error("invalid shader version token 0x{token:08x}")]
    InvalidVersionToken { token: u32 },
}
