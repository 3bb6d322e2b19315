//! Driver handoff behavior.

mod common;

use std::fmt;

use common::*;
use prism_d3d9::{convert_with_device, ShaderModuleDevice, ShaderStage};

#[derive(Debug)]
struct CreationFailed;

impl fmt::Display for CreationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module creation failed")
    }
}

impl std::error::Error for CreationFailed {}

/// Pretend driver that hands back the byte size of the module.
struct CountingDevice;

impl ShaderModuleDevice for CountingDevice {
    type Module = usize;
    type Error = CreationFailed;

    fn create_shader_module(&self, words: &[u32]) -> Result<usize, CreationFailed> {
        Ok(words.len() * 4)
    }
}

struct FailingDevice;

impl ShaderModuleDevice for FailingDevice {
    type Module = usize;
    type Error = CreationFailed;

    fn create_shader_module(&self, _words: &[u32]) -> Result<usize, CreationFailed> {
        Err(CreationFailed)
    }
}

#[test]
fn module_handle_is_transferred_to_the_caller() {
    let tokens = [version_token(ShaderStage::Pixel, 2, 0), END];
    let converted = convert_with_device(&tokens, &CountingDevice).unwrap();
    let words = &converted.shader.words;
    assert_eq!(converted.module, Some(words.len() * 4));
}

#[test]
fn driver_failure_still_returns_the_sidecar() {
    let tokens = [
        version_token(ShaderStage::Vertex, 2, 0),
        opcode_token(31, 2),
        dcl_usage_token(0, 0),
        dst_token(1, 0, 0xF),
        END,
    ];
    let converted = convert_with_device(&tokens, &FailingDevice).unwrap();
    assert_eq!(converted.module, None);
    assert_eq!(converted.shader.attributes.len(), 1);
    assert!(!converted.shader.words.is_empty());
}
