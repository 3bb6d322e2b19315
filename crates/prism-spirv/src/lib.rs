//! Word-level SPIR-V module emission.
//!
//! A SPIR-V module is a flat `u32` vector: a five-word header followed by
//! instructions whose leading word packs `(word_count << 16) | opcode`. This
//! crate provides the opcode/enum constants, a monotone id allocator, a
//! structural type table, and per-section word buffers that assemble into the
//! logical layout the SPIR-V specification mandates.

pub mod module;
pub mod spv;
pub mod types;

pub use module::{pack_string, Id, IdAllocator, ModuleBuilder, Section};
pub use types::{TypeDescription, TypeKind, TypeTable};
