//! 哈希策略模块 - 定义哈希族接口与算法选择

use crate::hash::families::{AHashFamily, JsHash, RsHash, XxHashFamily};
use std::sync::Arc;

/// 哈希算法选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// RS乘加哈希 (默认指纹哈希族)
    Rs,
    /// JS移位异或哈希 (默认桶哈希族)
    Js,
    XxHash,
    AHash,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rs => "rs",
            Self::Js => "js",
            Self::XxHash => "xxhash",
            Self::AHash => "ahash",
        }
    }
}

/// 哈希族特征
///
/// 对同一输入必须返回相同结果，过滤器的可复现性依赖于此。
pub trait HashFamily: Send + Sync {
    fn hash_bytes(&self, data: &[u8]) -> u64;
}

impl<T> HashFamily for T
where
    T: Fn(&[u8]) -> u64 + Send + Sync,
{
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        self(data)
    }
}

/// 构建哈希族
pub fn build_family(algorithm: HashAlgorithm, seed: u64) -> Arc<dyn HashFamily> {
    match algorithm {
        HashAlgorithm::Rs => Arc::new(RsHash::with_seed(seed)),
        HashAlgorithm::Js => Arc::new(JsHash::with_seed(seed)),
        HashAlgorithm::XxHash => Arc::new(XxHashFamily::with_seed(seed)),
        HashAlgorithm::AHash => Arc::new(AHashFamily::with_seed(seed)),
    }
}
