//! The single-pass token-stream → SPIR-V converter.
//!
//! SPIR-V is SSA, so every write of a D3D9 register produces a fresh result
//! id and rewrites the (register type, register number) → id mapping; reads
//! consult the mapping for the current id. Sources whose current value is a
//! pointer (input variables, lazily materialized constant registers) are
//! loaded before use, each through its own type.

use std::collections::HashMap;

use tracing::{debug, warn};

use prism_d3d9_shader::opcode::{self, Opcode};
use prism_d3d9_shader::reg::{
    decode_dst, decode_texture_type, decode_usage, decode_usage_index, swizzle_byte, Register,
    RegisterType, ShaderStage, ShaderVersion, Swizzle, Usage, NO_SWIZZLE,
};
use prism_d3d9_shader::stream::{tokens_from_bytes, TokenReader};
use prism_d3d9_shader::ShaderParseError;

use prism_spirv::module::{pack_string, Id, IdAllocator, ModuleBuilder};
use prism_spirv::spv::{self, ExecutionModel, Op, StorageClass};
use prism_spirv::types::{TypeDescription, TypeKind, TypeTable};

use crate::layout::{
    DescriptorSetLayoutBinding, DescriptorType, ShaderStageFlag, VertexFormat,
    VertexInputAttribute,
};

/// A finished translation: the SPIR-V blob plus the sidecar a pipeline
/// builder needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedShader {
    pub version: ShaderVersion,
    /// The complete module, header included, sections in SPIR-V's logical
    /// layout order.
    pub words: Vec<u32>,
    /// One entry per vertex `dcl` input, in declaration order (empty for
    /// pixel shaders).
    pub attributes: Vec<VertexInputAttribute>,
    /// One entry per sampler `dcl`, in declaration order.
    pub bindings: Vec<DescriptorSetLayoutBinding>,
    /// Usage index of the vertex output declared with the POSITION
    /// semantic, when one was seen.
    pub position_register: Option<u32>,
}

/// Translates one shader token stream (version token first, `0x0000FFFF`
/// last). Unknown and untranslated instructions are logged and skipped;
/// only a missing or malformed version token is an error.
pub fn translate(tokens: &[u32]) -> Result<TranslatedShader, ShaderParseError> {
    let mut reader = TokenReader::new(tokens);
    let version_token = reader.take_next().ok_or(ShaderParseError::Empty)?;
    let version = ShaderVersion::from_token(version_token).ok_or(
        ShaderParseError::InvalidVersionToken {
            token: version_token,
        },
    )?;
    debug!(?version, "translating shader");
    Ok(Converter::new(version, reader).run())
}

/// [`translate`] over a little-endian byte blob.
pub fn translate_bytes(bytes: &[u8]) -> Result<TranslatedShader, ShaderParseError> {
    let tokens = tokens_from_bytes(bytes)?;
    translate(&tokens)
}

struct Converter<'a> {
    reader: TokenReader<'a>,
    version: ShaderVersion,
    ids: IdAllocator,
    types: TypeTable,
    module: ModuleBuilder,
    /// Current SSA id per register, keyed with constant-bank offsets.
    ids_by_register: HashMap<(RegisterType, u32), Id>,
    /// Reverse of `ids_by_register`, for diagnostics.
    registers_by_id: HashMap<(RegisterType, Id), u32>,
    /// Value type of every id a register has ever been bound to.
    value_types: HashMap<Id, TypeDescription>,
    /// Input variables referenced by the entry-point interface list.
    interface_ids: Vec<Id>,
    attributes: Vec<VertexInputAttribute>,
    bindings: Vec<DescriptorSetLayoutBinding>,
    position_register: Option<u32>,
    entry_point_id: Id,
}

fn dst_arity(token: u32) -> u32 {
    decode_dst(token).map_or(0, |dst| dst.mask.component_count())
}

impl<'a> Converter<'a> {
    fn new(version: ShaderVersion, reader: TokenReader<'a>) -> Self {
        Self {
            reader,
            version,
            ids: IdAllocator::new(),
            types: TypeTable::new(),
            module: ModuleBuilder::new(),
            ids_by_register: HashMap::new(),
            registers_by_id: HashMap::new(),
            value_types: HashMap::new(),
            interface_ids: Vec::new(),
            attributes: Vec::new(),
            bindings: Vec::new(),
            position_register: None,
            entry_point_id: 0,
        }
    }

    fn run(mut self) -> TranslatedShader {
        let function_type = self.type_id(&TypeDescription::function());
        let void_type = self.type_id(&TypeDescription::scalar(TypeKind::Void));
        self.entry_point_id = self.ids.alloc();
        self.module.function_definitions.push_inst(
            Op::Function,
            &[
                void_type,
                self.entry_point_id,
                spv::FUNCTION_CONTROL_NONE,
                function_type,
            ],
        );
        let entry_label = self.ids.alloc();
        self.module
            .function_definitions
            .push_inst(Op::Label, &[entry_label]);

        loop {
            let position = self.reader.position();
            let Some(token) = self.reader.take_next() else {
                warn!(position, "token stream ended without an end token");
                break;
            };
            let raw = opcode::opcode_raw(token);
            if raw == opcode::OPCODE_END {
                break;
            }
            if raw == opcode::OPCODE_COMMENT {
                self.reader.skip(opcode::comment_length(token));
                continue;
            }

            let op = Opcode::from_raw(raw);
            let complete = match op {
                Opcode::Nop => Some(()),
                Opcode::Mov => self.emit_mov(),
                Opcode::Add | Opcode::Sub | Opcode::Mul => self.emit_binary(op),
                Opcode::Dp3 => self.emit_dot(3),
                Opcode::Dp4 => self.emit_dot(4),
                Opcode::Mad => self.emit_mad(),
                Opcode::Tex => self.emit_tex(),
                Opcode::Dcl => self.process_dcl(),
                Opcode::Def => self.emit_def(TypeKind::Float),
                Opcode::DefI => self.emit_def(TypeKind::Int),
                Opcode::DefB => self.emit_defb(),
                Opcode::Unknown(value) => {
                    warn!(opcode = value, position, "unknown instruction");
                    self.skip_operands(token, op);
                    Some(())
                }
                other => {
                    warn!(instruction = other.name(), position, "unsupported instruction");
                    self.skip_operands(token, other);
                    Some(())
                }
            };
            if complete.is_none() {
                warn!(position, "truncated instruction");
                break;
            }
        }

        self.finish()
    }

    /// Consumes the operand tokens of an instruction we do not translate,
    /// using the SM2+ length field when present and the per-opcode operand
    /// table for SM1.x streams.
    fn skip_operands(&mut self, token: u32, op: Opcode) {
        let declared = opcode::opcode_length(token);
        let count = if declared > 0 {
            declared
        } else {
            op.operand_tokens().unwrap_or(0)
        };
        self.reader.skip(count);
    }

    fn type_id(&mut self, description: &TypeDescription) -> Id {
        self.types
            .id_for(description, &mut self.ids, &mut self.module.types_globals)
    }

    /// Current id of the token's register. Constant registers that have not
    /// been defined yet are materialized as PushConstant-backed vec4 float
    /// variables on first use; any other unmapped register is a decode error
    /// in the stream and resolves to id 0.
    fn id_of(&mut self, token: u32) -> Id {
        let Some(reg) = Register::from_token(token) else {
            warn!(token, "operand names an unknown register type");
            return 0;
        };
        let key = reg.map_key();
        if let Some(&id) = self.ids_by_register.get(&key) {
            return id;
        }

        if reg.ty.is_constant_bank() {
            let description = TypeDescription::pointer(
                StorageClass::PushConstant,
                TypeKind::Vector,
                TypeKind::Float,
                4,
            );
            let type_id = self.type_id(&description);
            let id = self.ids.alloc();
            self.ids_by_register.insert(key, id);
            self.registers_by_id.insert((reg.ty, id), key.1);
            self.value_types.insert(id, description);
            self.module.types_globals.push_inst(
                Op::Variable,
                &[type_id, id, StorageClass::PushConstant as u32],
            );
            return id;
        }

        warn!(register = ?reg, "no id bound for register");
        0
    }

    /// Rebinds the token's register to `id`. Every definition goes through
    /// here, so the maps always name the latest SSA version.
    fn bind(&mut self, token: u32, id: Id) {
        let Some(reg) = Register::from_token(token) else {
            warn!(token, "destination names an unknown register type");
            return;
        };
        let key = reg.map_key();
        self.ids_by_register.insert(key, id);
        self.registers_by_id.insert((reg.ty, id), key.1);
    }

    /// Allocates the next SSA version of the token's register.
    fn fresh_version(&mut self, token: u32) -> Id {
        let id = self.ids.alloc();
        self.bind(token, id);
        id
    }

    fn register_type_of(&mut self, token: u32) -> TypeDescription {
        let id = self.id_of(token);
        self.value_types
            .get(&id)
            .cloned()
            .unwrap_or_else(|| TypeDescription::scalar(TypeKind::Float))
    }

    /// Produces the id of the swizzled form of a source value. Identity and
    /// zero swizzles pass the input through; a broadcast (or single-lane
    /// destination) extracts one scalar component; everything else shuffles,
    /// sized by the destination's write mask.
    fn swizzled_id(&mut self, token: u32, input: Id, arity: u32) -> Id {
        let raw = swizzle_byte(token);
        if raw == 0 || raw == NO_SWIZZLE || arity == 0 {
            return input;
        }
        let swizzle = Swizzle::from_byte(raw);

        // OpVectorShuffle results must have at least two components, so
        // single-component swizzles go through OpCompositeExtract.
        if swizzle.is_broadcast() || arity == 1 {
            let float = TypeDescription::scalar(TypeKind::Float);
            let type_id = self.type_id(&float);
            let out = self.ids.alloc();
            self.value_types.insert(out, float);
            self.module.function_definitions.push_inst(
                Op::CompositeExtract,
                &[type_id, out, input, u32::from(swizzle.0[0])],
            );
            return out;
        }

        let description = TypeDescription::vector(TypeKind::Float, arity);
        let type_id = self.type_id(&description);
        let out = self.ids.alloc();
        self.value_types.insert(out, description);
        let mut operands = vec![type_id, out, input, input];
        operands.extend(swizzle.0[..arity as usize].iter().map(|&c| u32::from(c)));
        self.module
            .function_definitions
            .push_inst(Op::VectorShuffle, &operands);
        out
    }

    /// Resolves a source operand to a value id and the type of that value:
    /// dereferences a pointer through `OpLoad` (per-operand, so mixed
    /// pointer/value operand shapes are fine), then applies the swizzle.
    /// The returned type describes the post-swizzle shape.
    fn load_source(&mut self, token: u32, arity: u32) -> (Id, TypeDescription) {
        let ty = self.register_type_of(token);
        let (id, value_ty) = if ty.is_pointer() {
            let value_ty = ty.dereference();
            let value_type_id = self.type_id(&value_ty);
            let pointer = self.id_of(token);
            let loaded = self.ids.alloc();
            self.value_types.insert(loaded, value_ty.clone());
            self.module
                .function_definitions
                .push_inst(Op::Load, &[value_type_id, loaded, pointer]);
            (self.swizzled_id(token, loaded, arity), value_ty)
        } else {
            let id = self.id_of(token);
            (self.swizzled_id(token, id, arity), ty)
        };
        let ty = self.value_types.get(&id).cloned().unwrap_or(value_ty);
        (id, ty)
    }

    fn emit_mov(&mut self) -> Option<()> {
        let dst = self.reader.take_next()?;
        let src = self.reader.take_next()?;
        let (src_id, ty) = self.load_source(src, dst_arity(dst));
        let type_id = self.type_id(&ty);
        let result = self.fresh_version(dst);
        self.value_types.insert(result, ty);
        self.module
            .function_definitions
            .push_inst(Op::CopyObject, &[type_id, result, src_id]);
        Some(())
    }

    fn emit_binary(&mut self, opcode: Opcode) -> Option<()> {
        let dst = self.reader.take_next()?;
        let a = self.reader.take_next()?;
        let b = self.reader.take_next()?;
        let arity = dst_arity(dst);
        let (a_id, a_ty) = self.load_source(a, arity);
        let (b_id, _) = self.load_source(b, arity);

        let op = match (opcode, a_ty.leaf()) {
            (Opcode::Add, TypeKind::Float) => Op::FAdd,
            (Opcode::Add, TypeKind::Int | TypeKind::Bool) => Op::IAdd,
            (Opcode::Sub, TypeKind::Float) => Op::FSub,
            (Opcode::Sub, TypeKind::Int | TypeKind::Bool) => Op::ISub,
            (Opcode::Mul, TypeKind::Float) => Op::FMul,
            (Opcode::Mul, TypeKind::Int | TypeKind::Bool) => Op::IMul,
            (_, other) => {
                warn!(instruction = opcode.name(), kind = ?other, "unsupported data type");
                return Some(());
            }
        };

        let type_id = self.type_id(&a_ty);
        let result = self.fresh_version(dst);
        self.value_types.insert(result, a_ty);
        self.module
            .function_definitions
            .push_inst(op, &[type_id, result, a_id, b_id]);
        Some(())
    }

    fn emit_dot(&mut self, components: u32) -> Option<()> {
        let dst = self.reader.take_next()?;
        let a = self.reader.take_next()?;
        let b = self.reader.take_next()?;
        // The dot operands are vectors regardless of how narrow the
        // destination mask is; the result is a scalar float.
        let (a_id, _) = self.load_source(a, components);
        let (b_id, _) = self.load_source(b, components);

        let float = TypeDescription::scalar(TypeKind::Float);
        let type_id = self.type_id(&float);
        let result = self.fresh_version(dst);
        self.value_types.insert(result, float);
        self.module
            .function_definitions
            .push_inst(Op::Dot, &[type_id, result, a_id, b_id]);
        Some(())
    }

    fn emit_mad(&mut self) -> Option<()> {
        let dst = self.reader.take_next()?;
        let a = self.reader.take_next()?;
        let b = self.reader.take_next()?;
        let c = self.reader.take_next()?;
        let arity = dst_arity(dst);
        let (a_id, a_ty) = self.load_source(a, arity);
        let (b_id, _) = self.load_source(b, arity);
        let (c_id, _) = self.load_source(c, arity);

        let (mul_op, add_op) = match a_ty.leaf() {
            TypeKind::Float => (Op::FMul, Op::FAdd),
            TypeKind::Int | TypeKind::Bool => (Op::IMul, Op::IAdd),
            other => {
                warn!(instruction = "mad", kind = ?other, "unsupported data type");
                return Some(());
            }
        };

        let type_id = self.type_id(&a_ty);
        let product = self.fresh_version(dst);
        self.value_types.insert(product, a_ty.clone());
        self.module
            .function_definitions
            .push_inst(mul_op, &[type_id, product, a_id, b_id]);

        let result = self.fresh_version(dst);
        self.value_types.insert(result, a_ty);
        self.module
            .function_definitions
            .push_inst(add_op, &[type_id, result, product, c_id]);
        Some(())
    }

    fn emit_tex(&mut self) -> Option<()> {
        let dst = self.reader.take_next()?;
        let coordinate = self.reader.take_next()?;
        let sampler = self.reader.take_next()?;
        let (sampler_id, _) = self.load_source(sampler, 4);
        let (coordinate_id, _) = self.load_source(coordinate, 4);

        let vec4 = TypeDescription::vector(TypeKind::Float, 4);
        let type_id = self.type_id(&vec4);
        let result = self.fresh_version(dst);
        self.value_types.insert(result, vec4);
        self.module.function_definitions.push_inst(
            Op::ImageFetch,
            &[type_id, result, sampler_id, coordinate_id],
        );
        Some(())
    }

    fn emit_def(&mut self, kind: TypeKind) -> Option<()> {
        let dst = self.reader.take_next()?;
        let vector = TypeDescription::vector(kind, 4);
        let vector_id = self.type_id(&vector);
        let scalar = TypeDescription::scalar(kind);
        let scalar_id = self.type_id(&scalar);

        let result = self.fresh_version(dst);
        self.value_types.insert(result, vector);

        let mut literal_ids = [0u32; 4];
        for slot in literal_ids.iter_mut() {
            let literal = self.reader.take_next()?;
            let id = self.ids.alloc();
            self.value_types.insert(id, scalar.clone());
            self.module
                .types_globals
                .push_inst(Op::Constant, &[scalar_id, id, literal]);
            *slot = id;
        }

        let mut operands = vec![vector_id, result];
        operands.extend_from_slice(&literal_ids);
        self.module
            .types_globals
            .push_inst(Op::ConstantComposite, &operands);
        Some(())
    }

    fn emit_defb(&mut self) -> Option<()> {
        let dst = self.reader.take_next()?;
        let literal = self.reader.take_next()?;
        let boolean = TypeDescription::scalar(TypeKind::Bool);
        let type_id = self.type_id(&boolean);
        let result = self.fresh_version(dst);
        self.value_types.insert(result, boolean);
        let op = if literal != 0 {
            Op::ConstantTrue
        } else {
            Op::ConstantFalse
        };
        self.module.types_globals.push_inst(op, &[type_id, result]);
        Some(())
    }

    fn process_dcl(&mut self) -> Option<()> {
        let usage_token = self.reader.take_next()?;
        let register_token = self.reader.take_next()?;
        match self.version.stage {
            ShaderStage::Vertex => self.dcl_vertex(usage_token, register_token),
            ShaderStage::Pixel => self.dcl_pixel(usage_token, register_token),
        }
        Some(())
    }

    /// Component count of a declared register, from its write mask. Masks
    /// other than .x/.xy/.xyz/.xyzw have no declaration meaning.
    fn declared_components(&self, register_token: u32) -> Option<u32> {
        match (register_token >> 16) & 0xF {
            0x1 => Some(1),
            0x3 => Some(2),
            0x7 => Some(3),
            0xF => Some(4),
            other => {
                warn!(mask = other, "unsupported declaration component mask");
                None
            }
        }
    }

    fn pointer_description(storage: StorageClass, components: u32) -> TypeDescription {
        if components == 1 {
            TypeDescription::pointer(storage, TypeKind::Float, TypeKind::Void, 0)
        } else {
            TypeDescription::pointer(storage, TypeKind::Vector, TypeKind::Float, components)
        }
    }

    /// Emits the variable for a declared register and binds its id.
    fn declare_variable(&mut self, register_token: u32, description: TypeDescription) -> Id {
        let storage = description.storage.unwrap_or(StorageClass::UniformConstant);
        let type_id = self.type_id(&description);
        let id = self.fresh_version(register_token);
        self.value_types.insert(id, description);
        self.module
            .types_globals
            .push_inst(Op::Variable, &[type_id, id, storage as u32]);
        id
    }

    fn dcl_vertex(&mut self, usage_token: u32, register_token: u32) {
        let Some(reg) = Register::from_token(register_token) else {
            warn!(token = register_token, "declaration of unknown register type");
            return;
        };
        let usage = decode_usage(usage_token);
        let usage_index = decode_usage_index(usage_token);

        match reg.ty {
            RegisterType::Input => {
                let Some(components) = self.declared_components(register_token) else {
                    return;
                };
                let id = self.declare_variable(
                    register_token,
                    Self::pointer_description(StorageClass::Input, components),
                );
                self.interface_ids.push(id);

                match VertexFormat::from_component_count(components) {
                    Some(format) => {
                        let location = self.attributes.len() as u32;
                        self.attributes.push(VertexInputAttribute {
                            binding: 0,
                            location,
                            offset: 0,
                            format,
                        });
                    }
                    None => warn!(components, "no vertex format for component count"),
                }
            }
            RegisterType::Output => {
                let Some(components) = self.declared_components(register_token) else {
                    return;
                };
                self.declare_variable(
                    register_token,
                    Self::pointer_description(StorageClass::Output, components),
                );
                if usage == Usage::Position {
                    self.position_register = Some(usage_index);
                }
            }
            RegisterType::Sampler => self.dcl_sampler(usage_token, register_token),
            other => {
                warn!(register = ?other, "unsupported vertex declaration register type")
            }
        }
    }

    fn dcl_pixel(&mut self, usage_token: u32, register_token: u32) {
        let Some(reg) = Register::from_token(register_token) else {
            warn!(token = register_token, "declaration of unknown register type");
            return;
        };

        match reg.ty {
            RegisterType::Input => {
                let Some(components) = self.declared_components(register_token) else {
                    return;
                };
                self.declare_variable(
                    register_token,
                    Self::pointer_description(StorageClass::Input, components),
                );
            }
            RegisterType::Texture => {
                self.declare_variable(
                    register_token,
                    TypeDescription::pointer(
                        StorageClass::Image,
                        TypeKind::Image,
                        TypeKind::Float,
                        0,
                    ),
                );
            }
            RegisterType::Sampler => self.dcl_sampler(usage_token, register_token),
            other => {
                warn!(register = ?other, "unsupported pixel declaration register type")
            }
        }
    }

    fn dcl_sampler(&mut self, usage_token: u32, register_token: u32) {
        let texture_type = decode_texture_type(usage_token);
        debug!(?texture_type, "sampler declaration");

        self.declare_variable(
            register_token,
            TypeDescription::pointer(StorageClass::Uniform, TypeKind::Sampler, TypeKind::Void, 0),
        );

        let binding = self.bindings.len() as u32;
        self.bindings.push(DescriptorSetLayoutBinding {
            binding,
            descriptor_type: DescriptorType::CombinedImageSampler,
            descriptor_count: 1,
            stage: match self.version.stage {
                ShaderStage::Vertex => ShaderStageFlag::Vertex,
                ShaderStage::Pixel => ShaderStageFlag::Fragment,
            },
        });
    }

    fn finish(mut self) -> TranslatedShader {
        self.module.function_definitions.push_inst(Op::Return, &[]);
        self.module
            .function_definitions
            .push_inst(Op::FunctionEnd, &[]);

        self.module
            .capabilities
            .push_inst(Op::Capability, &[spv::CAPABILITY_SHADER]);

        let import_id = self.ids.alloc();
        let mut operands = vec![import_id];
        operands.extend(pack_string("GLSL.std.450"));
        self.module
            .ext_inst_imports
            .push_inst(Op::ExtInstImport, &operands);

        self.module.memory_model.push_inst(
            Op::MemoryModel,
            &[spv::ADDRESSING_MODEL_LOGICAL, spv::MEMORY_MODEL_GLSL450],
        );

        let model = match self.version.stage {
            ShaderStage::Vertex => ExecutionModel::Vertex,
            ShaderStage::Pixel => ExecutionModel::Fragment,
        };
        let mut operands = vec![model as u32, self.entry_point_id];
        operands.extend(pack_string("main"));
        operands.extend_from_slice(&self.interface_ids);
        self.module.entry_points.push_inst(Op::EntryPoint, &operands);

        if self.version.stage == ShaderStage::Pixel {
            self.module.execution_modes.push_inst(
                Op::ExecutionMode,
                &[self.entry_point_id, spv::EXECUTION_MODE_ORIGIN_LOWER_LEFT],
            );
        }

        debug!(
            bound_registers = self.registers_by_id.len(),
            id_bound = self.ids.bound(),
            "translation complete"
        );

        let words = self.module.assemble(self.ids.bound());
        TranslatedShader {
            version: self.version,
            words,
            attributes: self.attributes,
            bindings: self.bindings,
            position_register: self.position_register,
        }
    }
}
