//! Whole-translation memoization keyed by a strong content hash.

use std::collections::HashMap;

use blake3::Hash;

use prism_d3d9_shader::ShaderParseError;

use crate::translate::{translate, TranslatedShader};

#[derive(Debug, Clone)]
pub struct CachedShader {
    pub hash: Hash,
    pub shader: TranslatedShader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookupSource {
    /// The shader was already present in the in-memory cache.
    Memory,
    /// The translator ran and the output was inserted into the cache.
    Translated,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheLookup<'a> {
    pub source: CacheLookupSource,
    shader: &'a CachedShader,
}

impl std::ops::Deref for CacheLookup<'_> {
    type Target = CachedShader;

    fn deref(&self) -> &Self::Target {
        self.shader
    }
}

/// Games set the same handful of shaders every frame; translating each blob
/// once and reusing the result is the expected steady state.
#[derive(Debug, Default)]
pub struct ShaderCache {
    map: HashMap<Hash, CachedShader>,
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_translate(
        &mut self,
        tokens: &[u32],
    ) -> Result<CacheLookup<'_>, ShaderParseError> {
        use std::collections::hash_map::Entry;

        let hash = blake3::hash(bytemuck::cast_slice(tokens));
        match self.map.entry(hash) {
            Entry::Occupied(e) => Ok(CacheLookup {
                source: CacheLookupSource::Memory,
                shader: e.into_mut(),
            }),
            Entry::Vacant(e) => {
                let shader = translate(tokens)?;
                Ok(CacheLookup {
                    source: CacheLookupSource::Translated,
                    shader: e.insert(CachedShader { hash, shader }),
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
