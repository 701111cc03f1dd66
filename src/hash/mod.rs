//! 哈希模块 - 统一管理指纹与桶定位

pub mod strategy;
pub mod families;
pub mod fingerprint;
pub mod scheme;

pub use strategy::{build_family, HashAlgorithm, HashFamily};
pub use families::{AHashFamily, JsHash, RsHash, XxHashFamily};
pub use fingerprint::{bucket_match_probability, theoretical_false_positive_rate, FingerprintWidths};
pub use scheme::{HashScheme, HashVariant};

use crate::types::FilterMode;

/// 默认哈希方案: RS 指纹族 + JS 桶族
pub fn default_hash_scheme(
    mode: FilterMode,
    table_size: usize,
    cells_per_bucket: usize,
    fingerprint_bits: u32,
) -> HashScheme {
    let widths = FingerprintWidths::new(mode, cells_per_bucket, fingerprint_bits);
    HashScheme::with_algorithms(table_size, widths, HashAlgorithm::Rs, HashAlgorithm::Js, 0)
}
