//! 哈希族实现 - 经典乘加哈希与两个现代哈希

use crate::hash::strategy::HashFamily;
use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

// RS哈希常量
const RS_A: u32 = 63689;
const RS_B: u32 = 378551;

// JS哈希初值
const JS_INIT: u32 = 1315423911;

/// Robert Sedgwick 乘加哈希 (32位)
#[derive(Debug, Clone, Copy, Default)]
pub struct RsHash {
    init: u32,
}

impl RsHash {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            init: (seed ^ (seed >> 32)) as u32,
        }
    }
}

impl HashFamily for RsHash {
    #[inline]
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        let mut a = RS_A;
        let mut hash = self.init;
        for &byte in data {
            hash = hash.wrapping_mul(a).wrapping_add(byte as u32);
            a = a.wrapping_mul(RS_B);
        }
        hash as u64
    }
}

/// Justin Sobel 移位异或哈希 (32位)
#[derive(Debug, Clone, Copy)]
pub struct JsHash {
    init: u32,
}

impl Default for JsHash {
    fn default() -> Self {
        Self { init: JS_INIT }
    }
}

impl JsHash {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            init: JS_INIT ^ (seed ^ (seed >> 32)) as u32,
        }
    }
}

impl HashFamily for JsHash {
    #[inline]
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        let mut hash = self.init;
        for &byte in data {
            hash ^= (hash << 5)
                .wrapping_add(byte as u32)
                .wrapping_add(hash >> 2);
        }
        hash as u64
    }
}

/// xxHash64 哈希族
#[derive(Debug, Clone, Copy)]
pub struct XxHashFamily {
    seed: u64,
}

impl XxHashFamily {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl HashFamily for XxHashFamily {
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        let mut hasher = twox_hash::XxHash64::with_seed(self.seed);
        hasher.write(data);
        hasher.finish()
    }
}

/// aHash 哈希族 (固定种子，跨进程可复现)
#[derive(Clone)]
pub struct AHashFamily {
    state: RandomState,
}

impl AHashFamily {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: RandomState::with_seeds(seed, seed.rotate_left(17), !seed, 0x9E37_79B9_7F4A_7C15),
        }
    }
}

impl HashFamily for AHashFamily {
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        let mut hasher = self.state.build_hasher();
        hasher.write(data);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rs_hash_reference() {
        // 手工展开两个字节
        let hash = RsHash::default().hash_bytes(&[1, 2]);
        let expected = 1u32.wrapping_mul(RS_A.wrapping_mul(RS_B)).wrapping_add(2);
        assert_eq!(hash, expected as u64);
    }

    #[test]
    fn test_js_hash_reference() {
        let mut expected = JS_INIT;
        expected ^= (expected << 5).wrapping_add(b'a' as u32).wrapping_add(expected >> 2);
        assert_eq!(JsHash::default().hash_bytes(b"a"), expected as u64);
        assert_eq!(JsHash::default().hash_bytes(b""), JS_INIT as u64);
    }

    #[test]
    fn test_families_fit_in_32_bits() {
        for key in 0u64..256 {
            let bytes = key.to_le_bytes();
            assert!(RsHash::default().hash_bytes(&bytes) <= u32::MAX as u64);
            assert!(JsHash::default().hash_bytes(&bytes) <= u32::MAX as u64);
        }
    }

    #[test]
    fn test_families_disagree() {
        let bytes = 99u64.to_le_bytes();
        assert_ne!(
            RsHash::default().hash_bytes(&bytes),
            JsHash::default().hash_bytes(&bytes)
        );
    }
}
