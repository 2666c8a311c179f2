// Copyright 2025 ScopeDB <contact@scopedb.io>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Debug;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: i32 = 16_777_619;

/// Computes the ring position of node names and lookup keys.
///
/// Implementations must be pure: the same input always produces the same
/// output, and every string, including the empty one, is accepted.
pub trait HashFunction: Debug + Send + Sync {
    fn compute(&self, value: &str) -> i32;
}

/// The classic polynomial string hash, `h = 31 * h + unit` over UTF-16 code units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringHash;

impl HashFunction for StringHash {
    fn compute(&self, value: &str) -> i32 {
        value.encode_utf16().fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
    }
}

/// FNV-1a over UTF-16 code units, followed by an avalanche step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a32;

impl HashFunction for Fnv1a32 {
    fn compute(&self, value: &str) -> i32 {
        let mut hash = value
            .encode_utf16()
            .fold(FNV_OFFSET_BASIS as i32, |hash, unit| {
                (hash ^ i32::from(unit)).wrapping_mul(FNV_PRIME)
            });

        // arithmetic shifts on i32 keep the sign bit
        hash = hash.wrapping_add(hash << 13);
        hash ^= hash >> 7;
        hash = hash.wrapping_add(hash << 3);
        hash ^= hash >> 17;
        hash = hash.wrapping_add(hash << 5);
        hash
    }
}

/// MurmurHash3 x86_32 with seed 0 over the UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Murmur3;

impl HashFunction for Murmur3 {
    fn compute(&self, value: &str) -> i32 {
        mur3::murmurhash3_x86_32(value.as_bytes(), 0) as i32
    }
}

/// Selects one of the built-in hash functions by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunctionKind {
    String,
    #[default]
    Fnv1a32,
    Murmur3,
}

impl HashFunctionKind {
    pub fn build(self) -> Arc<dyn HashFunction> {
        match self {
            HashFunctionKind::String => Arc::new(StringHash),
            HashFunctionKind::Fnv1a32 => Arc::new(Fnv1a32),
            HashFunctionKind::Murmur3 => Arc::new(Murmur3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_hash() {
        assert_eq!(StringHash.compute(""), 0);
        assert_eq!(StringHash.compute("a"), 97);
        assert_eq!(StringHash.compute("hello"), 99162322);
        assert_eq!(StringHash.compute("node-1"), -1040172250);
        // one BMP char and one surrogate pair
        assert_eq!(StringHash.compute("é😀"), 1996812);
    }

    #[test]
    fn test_fnv1a32() {
        assert_eq!(Fnv1a32.compute(""), -1494218850);
        assert_eq!(Fnv1a32.compute("a"), 649470159);
        assert_eq!(Fnv1a32.compute("hello"), 350638217);
        assert_eq!(Fnv1a32.compute("192.168.1.1"), -874125590);
        assert_eq!(Fnv1a32.compute("é😀"), 81235470);
    }

    #[test]
    fn test_murmur3() {
        assert_eq!(Murmur3.compute(""), 0);
        assert_eq!(Murmur3.compute("hello"), 613153351);
        assert_eq!(Murmur3.compute("192.168.1.1"), 4253952048u32 as i32);
    }

    #[test]
    fn test_hash_functions_are_deterministic() {
        for kind in [
            HashFunctionKind::String,
            HashFunctionKind::Fnv1a32,
            HashFunctionKind::Murmur3,
        ] {
            let first = kind.build();
            let second = kind.build();
            for value in ["", " ", "key1", "192.168.1.42", "@@@node@@@0@@@"] {
                assert_eq!(first.compute(value), second.compute(value), "{kind:?}");
            }
        }
    }

    #[test]
    fn test_hash_function_kind_names() {
        fn parse(name: &str) -> HashFunctionKind {
            let value = serde::de::value::StrDeserializer::<serde::de::value::Error>::new(name);
            HashFunctionKind::deserialize(value).unwrap()
        }

        assert_eq!(parse("string"), HashFunctionKind::String);
        assert_eq!(parse("fnv1a32"), HashFunctionKind::Fnv1a32);
        assert_eq!(parse("murmur3"), HashFunctionKind::Murmur3);
        assert_eq!(HashFunctionKind::default(), HashFunctionKind::Fnv1a32);
    }
}
