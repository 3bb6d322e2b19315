//! Instruction opcode decoding and operand accounting.

/// Opcode field of an instruction token (low 16 bits).
pub const OPCODE_MASK: u32 = 0x0000_FFFF;
/// Opcode-specific control field (comparison mode for `ifc`/`breakc`, ...).
pub const OPCODE_SPECIFIC_MASK: u32 = 0x00FF_0000;
pub const OPCODE_SPECIFIC_SHIFT: u32 = 16;
/// Instruction length field: number of operand tokens, SM2 and later.
pub const OPCODE_LENGTH_MASK: u32 = 0x0F00_0000;
pub const OPCODE_LENGTH_SHIFT: u32 = 24;

pub const OPCODE_COMMENT: u16 = 0xFFFE;
pub const OPCODE_END: u16 = 0xFFFF;
/// The stream-terminating token: the end opcode with every other field zero.
pub const END_TOKEN: u32 = 0x0000_FFFF;

pub fn opcode_raw(token: u32) -> u16 {
    (token & OPCODE_MASK) as u16
}

pub fn opcode_specific(token: u32) -> u8 {
    ((token & OPCODE_SPECIFIC_MASK) >> OPCODE_SPECIFIC_SHIFT) as u8
}

/// Operand token count as encoded in the instruction token. Zero both for
/// operand-less instructions and for SM1.x streams, which predate the field.
pub fn opcode_length(token: u32) -> usize {
    ((token & OPCODE_LENGTH_MASK) >> OPCODE_LENGTH_SHIFT) as usize
}

/// Payload length in tokens of a comment instruction (bits 16..30).
pub fn comment_length(token: u32) -> usize {
    ((token >> 16) & 0x7FFF) as usize
}

/// The D3D9 shader instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    Mov,
    Add,
    Sub,
    Mad,
    Mul,
    Rcp,
    Rsq,
    Dp3,
    Dp4,
    Min,
    Max,
    Slt,
    Sge,
    Exp,
    Log,
    Lit,
    Dst,
    Lrp,
    Frc,
    M4x4,
    M4x3,
    M3x4,
    M3x3,
    M3x2,
    Call,
    CallNz,
    Loop,
    Ret,
    EndLoop,
    Label,
    Dcl,
    Pow,
    Crs,
    Sgn,
    Abs,
    Nrm,
    SinCos,
    Rep,
    EndRep,
    If,
    Ifc,
    Else,
    EndIf,
    Break,
    Breakc,
    Mova,
    DefB,
    DefI,
    TexCoord,
    TexKill,
    Tex,
    TexBem,
    TexBemL,
    TexReg2Ar,
    TexReg2Gb,
    TexM3x2Pad,
    TexM3x2Tex,
    TexM3x3Pad,
    TexM3x3Tex,
    TexM3x3Spec,
    TexM3x3VSpec,
    ExpP,
    LogP,
    Cnd,
    Def,
    TexReg2Rgb,
    TexDp3Tex,
    TexM3x2Depth,
    TexDp3,
    TexM3x3,
    TexDepth,
    Cmp,
    Bem,
    Dp2Add,
    Dsx,
    Dsy,
    TexLdd,
    Setp,
    TexLdl,
    BreakP,
    Phase,
    Comment,
    End,
    Unknown(u16),
}

impl Opcode {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Nop,
            1 => Self::Mov,
            2 => Self::Add,
            3 => Self::Sub,
            4 => Self::Mad,
            5 => Self::Mul,
            6 => Self::Rcp,
            7 => Self::Rsq,
            8 => Self::Dp3,
            9 => Self::Dp4,
            10 => Self::Min,
            11 => Self::Max,
            12 => Self::Slt,
            13 => Self::Sge,
            14 => Self::Exp,
            15 => Self::Log,
            16 => Self::Lit,
            17 => Self::Dst,
            18 => Self::Lrp,
            19 => Self::Frc,
            20 => Self::M4x4,
            21 => Self::M4x3,
            22 => Self::M3x4,
            23 => Self::M3x3,
            24 => Self::M3x2,
            25 => Self::Call,
            26 => Self::CallNz,
            27 => Self::Loop,
            28 => Self::Ret,
            29 => Self::EndLoop,
            30 => Self::Label,
            31 => Self::Dcl,
            32 => Self::Pow,
            33 => Self::Crs,
            34 => Self::Sgn,
            35 => Self::Abs,
            36 => Self::Nrm,
            37 => Self::SinCos,
            38 => Self::Rep,
            39 => Self::EndRep,
            40 => Self::If,
            41 => Self::Ifc,
            42 => Self::Else,
            43 => Self::EndIf,
            44 => Self::Break,
            45 => Self::Breakc,
            46 => Self::Mova,
            47 => Self::DefB,
            48 => Self::DefI,
            64 => Self::TexCoord,
            65 => Self::TexKill,
            66 => Self::Tex,
            67 => Self::TexBem,
            68 => Self::TexBemL,
            69 => Self::TexReg2Ar,
            70 => Self::TexReg2Gb,
            71 => Self::TexM3x2Pad,
            72 => Self::TexM3x2Tex,
            73 => Self::TexM3x3Pad,
            74 => Self::TexM3x3Tex,
            76 => Self::TexM3x3Spec,
            77 => Self::TexM3x3VSpec,
            78 => Self::ExpP,
            79 => Self::LogP,
            80 => Self::Cnd,
            81 => Self::Def,
            82 => Self::TexReg2Rgb,
            83 => Self::TexDp3Tex,
            84 => Self::TexM3x2Depth,
            85 => Self::TexDp3,
            86 => Self::TexM3x3,
            87 => Self::TexDepth,
            88 => Self::Cmp,
            89 => Self::Bem,
            90 => Self::Dp2Add,
            91 => Self::Dsx,
            92 => Self::Dsy,
            93 => Self::TexLdd,
            94 => Self::Setp,
            95 => Self::TexLdl,
            96 => Self::BreakP,
            0xFFFD => Self::Phase,
            OPCODE_COMMENT => Self::Comment,
            OPCODE_END => Self::End,
            other => Self::Unknown(other),
        }
    }

    /// Operand token count for streams whose length field is zero (SM1.x).
    /// `None` for variable-length or unknown instructions.
    pub fn operand_tokens(self) -> Option<usize> {
        Some(match self {
            Self::Nop | Self::Phase | Self::Ret | Self::Else | Self::EndIf | Self::Break
            | Self::EndLoop | Self::EndRep | Self::End => 0,
            Self::Mov
            | Self::Mova
            | Self::Rcp
            | Self::Rsq
            | Self::Exp
            | Self::ExpP
            | Self::Log
            | Self::LogP
            | Self::Lit
            | Self::Frc
            | Self::Abs
            | Self::Nrm
            | Self::Dsx
            | Self::Dsy
            | Self::Dcl
            | Self::DefB
            | Self::Ifc
            | Self::CallNz
            | Self::Breakc
            | Self::TexBem
            | Self::TexBemL
            | Self::TexReg2Ar
            | Self::TexReg2Gb
            | Self::TexReg2Rgb
            | Self::TexDp3
            | Self::TexDp3Tex
            | Self::TexM3x2Pad
            | Self::TexM3x2Tex
            | Self::TexM3x2Depth
            | Self::TexM3x3
            | Self::TexM3x3Pad
            | Self::TexM3x3Tex
            | Self::TexM3x3VSpec
            | Self::Loop => 2,
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Dp3
            | Self::Dp4
            | Self::Min
            | Self::Max
            | Self::Slt
            | Self::Sge
            | Self::Dst
            | Self::Crs
            | Self::Pow
            | Self::M4x4
            | Self::M4x3
            | Self::M3x4
            | Self::M3x3
            | Self::M3x2
            | Self::Setp
            | Self::Bem
            | Self::Tex
            | Self::TexLdl
            | Self::TexM3x3Spec => 3,
            Self::Mad | Self::Lrp | Self::Sgn | Self::SinCos | Self::Cnd | Self::Cmp
            | Self::Dp2Add => 4,
            Self::Def | Self::DefI | Self::TexLdd => 5,
            Self::If | Self::Rep | Self::Call | Self::Label | Self::TexKill | Self::TexCoord
            | Self::TexDepth | Self::BreakP => 1,
            Self::Comment | Self::Unknown(_) => return None,
        })
    }

    /// Mnemonic used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Mov => "mov",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mad => "mad",
            Self::Mul => "mul",
            Self::Rcp => "rcp",
            Self::Rsq => "rsq",
            Self::Dp3 => "dp3",
            Self::Dp4 => "dp4",
            Self::Min => "min",
            Self::Max => "max",
            Self::Slt => "slt",
            Self::Sge => "sge",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Lit => "lit",
            Self::Dst => "dst",
            Self::Lrp => "lrp",
            Self::Frc => "frc",
            Self::M4x4 => "m4x4",
            Self::M4x3 => "m4x3",
            Self::M3x4 => "m3x4",
            Self::M3x3 => "m3x3",
            Self::M3x2 => "m3x2",
            Self::Call => "call",
            Self::CallNz => "callnz",
            Self::Loop => "loop",
            Self::Ret => "ret",
            Self::EndLoop => "endloop",
            Self::Label => "label",
            Self::Dcl => "dcl",
            Self::Pow => "pow",
            Self::Crs => "crs",
            Self::Sgn => "sgn",
            Self::Abs => "abs",
            Self::Nrm => "nrm",
            Self::SinCos => "sincos",
            Self::Rep => "rep",
            Self::EndRep => "endrep",
            Self::If => "if",
            Self::Ifc => "ifc",
            Self::Else => "else",
            Self::EndIf => "endif",
            Self::Break => "break",
            Self::Breakc => "breakc",
            Self::Mova => "mova",
            Self::DefB => "defb",
            Self::DefI => "defi",
            Self::TexCoord => "texcoord",
            Self::TexKill => "texkill",
            Self::Tex => "tex",
            Self::TexBem => "texbem",
            Self::TexBemL => "texbeml",
            Self::TexReg2Ar => "texreg2ar",
            Self::TexReg2Gb => "texreg2gb",
            Self::TexM3x2Pad => "texm3x2pad",
            Self::TexM3x2Tex => "texm3x2tex",
            Self::TexM3x3Pad => "texm3x3pad",
            Self::TexM3x3Tex => "texm3x3tex",
            Self::TexM3x3Spec => "texm3x3spec",
            Self::TexM3x3VSpec => "texm3x3vspec",
            Self::ExpP => "expp",
            Self::LogP => "logp",
            Self::Cnd => "cnd",
            Self::Def => "def",
            Self::TexReg2Rgb => "texreg2rgb",
            Self::TexDp3Tex => "texdp3tex",
            Self::TexM3x2Depth => "texm3x2depth",
            Self::TexDp3 => "texdp3",
            Self::TexM3x3 => "texm3x3",
            Self::TexDepth => "texdepth",
            Self::Cmp => "cmp",
            Self::Bem => "bem",
            Self::Dp2Add => "dp2add",
            Self::Dsx => "dsx",
            Self::Dsy => "dsy",
            Self::TexLdd => "texldd",
            Self::Setp => "setp",
            Self::TexLdl => "texldl",
            Self::BreakP => "breakp",
            Self::Phase => "phase",
            Self::Comment => "comment",
            Self::End => "end",
            Self::Unknown(_) => "unknown",
        }
    }
}
