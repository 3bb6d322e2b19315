//! Sidecar metadata: vertex attributes and descriptor bindings.

mod common;

use common::*;
use prism_d3d9::{
    translate, DescriptorType, ShaderStage, ShaderStageFlag, VertexFormat, VertexInputAttribute,
};
use prism_spirv::spv::Op;

#[test]
fn vertex_input_declaration_produces_an_attribute() {
    let tokens = [
        version_token(ShaderStage::Vertex, 2, 0),
        opcode_token(31, 2), // dcl_position v0
        dcl_usage_token(0, 0),
        dst_token(1, 0, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();

    assert_eq!(
        shader.attributes,
        vec![VertexInputAttribute {
            binding: 0,
            location: 0,
            offset: 0,
            format: VertexFormat::R32g32b32a32Sfloat,
        }]
    );

    let variables = find_all(&shader.words, Op::Variable);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].operands[2], 1); // Input storage class

    // Pointer to vec4 of float.
    let pointer = find_all(&shader.words, Op::TypePointer)
        .into_iter()
        .find(|p| p.operands[0] == variables[0].operands[0])
        .unwrap();
    assert_eq!(pointer.operands[1], 1);
    let vec4 = find_all(&shader.words, Op::TypeVector)
        .into_iter()
        .find(|v| v.operands[0] == pointer.operands[2])
        .unwrap();
    assert_eq!(vec4.operands[2], 4);

    // The input variable joins the entry-point interface list.
    let entry = &find_all(&shader.words, Op::EntryPoint)[0];
    assert_eq!(
        entry.operands.last().copied(),
        Some(variables[0].operands[1])
    );
}

#[test]
fn attribute_formats_and_locations_follow_declarations() {
    let tokens = [
        version_token(ShaderStage::Vertex, 2, 0),
        opcode_token(31, 2), // dcl_position v0 (.xyzw)
        dcl_usage_token(0, 0),
        dst_token(1, 0, 0xF),
        opcode_token(31, 2), // dcl_texcoord v1 (.xy)
        dcl_usage_token(5, 0),
        dst_token(1, 1, 0x3),
        opcode_token(31, 2), // dcl_normal v2 (.xyz)
        dcl_usage_token(3, 0),
        dst_token(1, 2, 0x7),
        opcode_token(31, 2), // dcl_psize v3 (.x)
        dcl_usage_token(4, 0),
        dst_token(1, 3, 0x1),
        END,
    ];
    let shader = translate(&tokens).unwrap();

    let formats: Vec<VertexFormat> = shader.attributes.iter().map(|a| a.format).collect();
    assert_eq!(
        formats,
        vec![
            VertexFormat::R32g32b32a32Sfloat,
            VertexFormat::R32g32Sfloat,
            VertexFormat::R32g32b32Sfloat,
            VertexFormat::R32Sfloat,
        ]
    );
    let locations: Vec<u32> = shader.attributes.iter().map(|a| a.location).collect();
    assert_eq!(locations, vec![0, 1, 2, 3]);
    assert!(shader.attributes.iter().all(|a| a.binding == 0));
    assert!(shader.attributes.iter().all(|a| a.offset == 0));

    // Four input variables, all on the interface list.
    let entry = &find_all(&shader.words, Op::EntryPoint)[0];
    let variables = find_all(&shader.words, Op::Variable);
    assert_eq!(variables.len(), 4);
    for var in &variables {
        assert!(entry.operands.contains(&var.operands[1]));
    }
}

#[test]
fn vertex_position_output_records_the_register() {
    let tokens = [
        version_token(ShaderStage::Vertex, 3, 0),
        opcode_token(31, 2), // dcl_position o2
        dcl_usage_token(0, 2),
        dst_token(6, 2, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();
    assert_eq!(shader.position_register, Some(2));

    let variables = find_all(&shader.words, Op::Variable);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].operands[2], 3); // Output storage class

    // Outputs are not vertex attributes.
    assert!(shader.attributes.is_empty());
}

#[test]
fn pixel_sampler_declaration_produces_a_binding() {
    let tokens = [
        version_token(ShaderStage::Pixel, 2, 0),
        opcode_token(31, 2), // dcl_2d s0
        dcl_sampler_token(2),
        dst_token(10, 0, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();

    assert_eq!(shader.bindings.len(), 1);
    let binding = shader.bindings[0];
    assert_eq!(binding.binding, 0);
    assert_eq!(binding.descriptor_type, DescriptorType::CombinedImageSampler);
    assert_eq!(binding.descriptor_count, 1);
    assert_eq!(binding.stage, ShaderStageFlag::Fragment);

    // Pointer-to-sampler variable with Uniform storage.
    let variables = find_all(&shader.words, Op::Variable);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].operands[2], 2);
    assert_eq!(count_op(&shader.words, Op::TypeSampler), 1);
}

#[test]
fn sampler_bindings_number_in_declaration_order() {
    let tokens = [
        version_token(ShaderStage::Pixel, 2, 0),
        opcode_token(31, 2),
        dcl_sampler_token(2),
        dst_token(10, 0, 0xF),
        opcode_token(31, 2),
        dcl_sampler_token(3),
        dst_token(10, 1, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();
    let numbers: Vec<u32> = shader.bindings.iter().map(|b| b.binding).collect();
    assert_eq!(numbers, vec![0, 1]);
}

#[test]
fn vertex_sampler_declaration_uses_the_vertex_stage_flag() {
    let tokens = [
        version_token(ShaderStage::Vertex, 3, 0),
        opcode_token(31, 2),
        dcl_sampler_token(2),
        dst_token(10, 0, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();
    assert_eq!(shader.bindings.len(), 1);
    assert_eq!(shader.bindings[0].stage, ShaderStageFlag::Vertex);
}

#[test]
fn pixel_input_declaration_emits_a_variable_but_no_attribute() {
    let tokens = [
        version_token(ShaderStage::Pixel, 3, 0),
        opcode_token(31, 2), // dcl_texcoord0 v0
        dcl_usage_token(5, 0),
        dst_token(1, 0, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();
    assert!(shader.attributes.is_empty());
    let variables = find_all(&shader.words, Op::Variable);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].operands[2], 1); // Input storage class
}

#[test]
fn pixel_texture_declaration_emits_an_image_variable() {
    let tokens = [
        version_token(ShaderStage::Pixel, 2, 0),
        opcode_token(31, 2), // dcl t0
        dcl_usage_token(0, 0),
        dst_token(3, 0, 0xF),
        END,
    ];
    let shader = translate(&tokens).unwrap();

    let images = find_all(&shader.words, Op::TypeImage);
    assert_eq!(images.len(), 1);
    // id, sampled type, dim, depth, arrayed, ms, sampled, format.
    assert_eq!(images[0].operands.len(), 8);
    assert_eq!(images[0].operands[2], 1); // Dim2D
    assert_eq!(images[0].operands[6], 1); // used with a sampler

    let variables = find_all(&shader.words, Op::Variable);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].operands[2], 11); // Image storage class
    assert!(shader.bindings.is_empty());
}

#[test]
fn unsupported_declaration_mask_emits_nothing() {
    let tokens = [
        version_token(ShaderStage::Vertex, 2, 0),
        opcode_token(31, 2), // dcl v0 with a .yz mask
        dcl_usage_token(0, 0),
        dst_token(1, 0, 0x6),
        END,
    ];
    let shader = translate(&tokens).unwrap();
    assert!(shader.attributes.is_empty());
    assert_eq!(count_op(&shader.words, Op::Variable), 0);
}

#[test]
fn texture_sample_reads_the_declared_sampler() {
    let tokens = [
        version_token(ShaderStage::Pixel, 2, 0),
        opcode_token(31, 2), // dcl_2d s0
        dcl_sampler_token(2),
        dst_token(10, 0, 0xF),
        opcode_token(31, 2), // dcl t0
        dcl_usage_token(0, 0),
        dst_token(3, 0, 0xF),
        opcode_token(66, 3), // texld r0, t0, s0
        dst_token(0, 0, 0xF),
        src_token(3, 0, 0xE4),
        src_token(10, 0, 0xE4),
        END,
    ];
    let shader = translate(&tokens).unwrap();

    let fetches = find_all(&shader.words, Op::ImageFetch);
    assert_eq!(fetches.len(), 1);
    // Both operands come from loads of the declared variables.
    let loads = find_all(&shader.words, Op::Load);
    assert_eq!(loads.len(), 2);
    let load_results: Vec<u32> = loads.iter().map(|l| l.operands[1]).collect();
    assert!(load_results.contains(&fetches[0].operands[2]));
    assert!(load_results.contains(&fetches[0].operands[3]));
}
