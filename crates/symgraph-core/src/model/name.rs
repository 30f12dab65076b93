//! Interned names and their hash identities.
//!
//! Every name in the reflection model (scopes, fields, functions, attributes,
//! enum entries) is a [`Name`]: the text plus a 32-bit hash. Emitters write
//! the hash instead of the string wherever a name is referenced, so the hash
//! has to be stable across runs and across builds of the same program.
//!
//! ## Collisions
//!
//! The hash is MurmurHash2 and nothing checks for collisions between two
//! different strings. Downstream consumers treat the hash as identity, so a
//! collision would silently alias two names. This is an accepted limitation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

/// Seed used for every name hash.
pub const NAME_HASH_SEED: u32 = 0xFEED_B00D;

/// An interned string with its stable hash id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name
{
    text: Arc<str>,
    hash: u32,
}

impl Name
{
    /// Hash `text` without interning it.
    ///
    /// Prefer [`NameTable::intern`] for anything that ends up in the model.
    pub fn new(text: &str) -> Self
    {
        Self {
            text: Arc::from(text),
            hash: murmur_hash2(text, NAME_HASH_SEED),
        }
    }

    /// The name's text.
    pub fn text(&self) -> &str
    {
        &self.text
    }

    /// The 32-bit identity used for cross-references.
    pub fn hash(&self) -> u32
    {
        self.hash
    }

    pub fn is_empty(&self) -> bool
    {
        self.text.is_empty()
    }
}

impl fmt::Display for Name
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.text)
    }
}

/// Session-wide string interner.
///
/// Entries keep their insertion order so the complete table can be emitted
/// deterministically.
#[derive(Debug, Default)]
pub struct NameTable
{
    names: Vec<Name>,
    index: HashMap<Arc<str>, usize>,
}

impl NameTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Return the entry for `text`, creating it on first sight.
    ///
    /// Empty strings are hashed but never stored in the table.
    pub fn intern(&mut self, text: &str) -> Name
    {
        if text.is_empty() {
            return Name::new(text);
        }
        if let Some(&slot) = self.index.get(text) {
            return self.names[slot].clone();
        }

        let name = Name::new(text);
        self.index.insert(name.text.clone(), self.names.len());
        self.names.push(name.clone());
        name
    }

    /// Look up an already interned name.
    pub fn lookup(&self, text: &str) -> Option<&Name>
    {
        self.index.get(text).map(|&slot| &self.names[slot])
    }

    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }

    /// All interned names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Name>
    {
        self.names.iter()
    }
}

/// MurmurHash2 over the UTF-16 code units of `key`.
///
/// Each code unit is mixed in as a full 16-bit value at byte positions 0, 8,
/// 16 and 24 of the block, so ids match those produced by tools that hash
/// UTF-16 strings the same way.
#[allow(clippy::cast_possible_truncation)]
pub fn murmur_hash2(key: &str, seed: u32) -> u32
{
    const M: u32 = 0x5bd1_e995;
    const R: u32 = 24;

    let units: SmallVec<[u16; 64]> = key.encode_utf16().collect();
    let mut h = seed ^ (units.len() as u32);

    let mut blocks = units.chunks_exact(4);
    for block in &mut blocks {
        let mut k = u32::from(block[0])
            | (u32::from(block[1]) << 8)
            | (u32::from(block[2]) << 16)
            | (u32::from(block[3]) << 24);

        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = blocks.remainder();
    if tail.len() >= 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        h ^= u32::from(tail[0]);
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}
