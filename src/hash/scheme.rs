//! 哈希方案 - 由两个哈希族推导指纹与候选桶

use crate::{
    hash::{
        fingerprint::FingerprintWidths,
        strategy::{build_family, HashAlgorithm, HashFamily},
    },
    types::{Fingerprint, Key},
};
use std::{fmt, sync::Arc};

/// 两个哈希族选用同一算法时，桶族种子与之异或以解除相关
const BUCKET_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// 哈希变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashVariant {
    /// 哈希族A，用于指纹
    Fingerprint,
    /// 哈希族B，用于桶索引
    Bucket,
}

/// 部分键Cuckoo哈希方案
///
/// 备用桶只依赖 (当前桶, 指纹)：`bucket2 = bucket ^ hash(tag)`，
/// 桶数量为2的幂时该映射是对合，指纹可在两个候选桶之间来回迁移。
#[derive(Clone)]
pub struct HashScheme {
    fingerprint_family: Arc<dyn HashFamily>,
    bucket_family: Arc<dyn HashFamily>,
    table_size: usize,
    widths: FingerprintWidths,
}

impl fmt::Debug for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashScheme")
            .field("table_size", &self.table_size)
            .field("widths", &self.widths)
            .finish()
    }
}

impl HashScheme {
    /// 使用注入的哈希族创建
    pub fn new(
        table_size: usize,
        widths: FingerprintWidths,
        fingerprint_family: Arc<dyn HashFamily>,
        bucket_family: Arc<dyn HashFamily>,
    ) -> Self {
        Self {
            fingerprint_family,
            bucket_family,
            table_size,
            widths,
        }
    }

    /// 按算法创建
    pub fn with_algorithms(
        table_size: usize,
        widths: FingerprintWidths,
        fingerprint_algorithm: HashAlgorithm,
        bucket_algorithm: HashAlgorithm,
        seed: u64,
    ) -> Self {
        let bucket_seed = if fingerprint_algorithm == bucket_algorithm {
            seed ^ BUCKET_SEED_SALT
        } else {
            seed
        };
        Self::new(
            table_size,
            widths,
            build_family(fingerprint_algorithm, seed),
            build_family(bucket_algorithm, bucket_seed),
        )
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn widths(&self) -> &FingerprintWidths {
        &self.widths
    }

    /// 基础哈希原语：对键的字节表示应用指定哈希族，结果落在 `[0, range)`
    pub fn hash(&self, key: Key, variant: HashVariant, range: u64) -> u64 {
        let family = match variant {
            HashVariant::Fingerprint => &self.fingerprint_family,
            HashVariant::Bucket => &self.bucket_family,
        };
        family.hash_bytes(&key.to_le_bytes()) % range.max(1)
    }

    /// 键的指纹 (长位宽，tag非零)
    pub fn fingerprint(&self, key: Key) -> Fingerprint {
        let raw = self.hash(key, HashVariant::Fingerprint, self.widths.large_range());
        self.widths.normalize(raw as u32)
    }

    /// 主桶
    pub fn bucket1(&self, key: Key) -> usize {
        self.hash(key, HashVariant::Bucket, self.table_size as u64) as usize
    }

    /// 备用桶，只由当前桶与指纹推导
    pub fn bucket2(&self, bucket: usize, fp: Fingerprint) -> usize {
        let tag = self.widths.tag(fp) as Key;
        let offset = self.hash(tag, HashVariant::Bucket, self.table_size as u64) as usize;
        (bucket ^ offset) % self.table_size
    }

    /// 一次性推导 (指纹, 主桶, 备用桶)
    pub fn locate(&self, key: Key) -> (Fingerprint, usize, usize) {
        let fp = self.fingerprint(key);
        let b1 = self.bucket1(key);
        let b2 = self.bucket2(b1, fp);
        (fp, b1, b2)
    }
}
