//! 可配置桶Cuckoo过滤器 (CB-CF) 库
//!
//! 近似集合成员判定：只存储键的短指纹，查询可能误判存在，但不会漏判。
//! 同时提供标准Cuckoo过滤器 (CF) 与可配置桶变体 (CB-CF)：
//! 未满的桶改用 c-1 个更长的指纹，从而降低误判率。
//!
//! ## 主要特性
//! - 部分键Cuckoo哈希，备用桶只由短指纹推导
//! - 有界随机游走踢出，失败时使用单槽位受害者缓存
//! - 负载清理 (scrub)，把满桶中的指纹迁往未满的备用桶
//! - 每次操作的内存读写计数，便于与理论模型对照
//! - 注入式随机源，同一种子可完全复现
//!
//! ## 快速开始
//!
//! ```rust
//! use cuckoo_cbcf::*;
//!
//! let mut filter = CuckooFilter::create(FilterMode::Configurable, 1024, 4, 12, 20)
//!     .expect("配置有效");
//!
//! let result = filter.insert(42);
//! assert!(result.is_success());
//! assert!(filter.contains(42));
//!
//! filter.scrub();
//! println!("{:?}", filter.stats());
//! ```

#![warn(clippy::all)]
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

// 核心模块导出
pub mod error;
pub mod types;
pub mod hash;
pub mod filter;
pub mod stats;

// 公共接口导出
pub use crate::{
    error::FilterError,
    filter::{
        BucketTable, CuckooFilter, CuckooFilterConfig, CuckooRelocator, Scrubber,
        DEFAULT_CELLS_PER_BUCKET, DEFAULT_CONFIG, MAX_CELLS_PER_BUCKET,
    },
    hash::{
        build_family, default_hash_scheme, theoretical_false_positive_rate, FingerprintWidths,
        HashAlgorithm, HashFamily, HashScheme,
    },
    stats::{OperationStats, OperationStatsSnapshot, OperationType},
    types::{
        BucketLayout, FilterMode, Fingerprint, InsertOutcome, InsertResult, Key, QueryResult,
        ScrubReport, Victim,
    },
};

/// 按模式代码 (0 = CF, 其他 = CB-CF) 创建过滤器
pub fn create_filter(
    mode_code: u8,
    table_size: usize,
    cells_per_bucket: usize,
    fingerprint_bits: u32,
    relocation_budget: usize,
) -> Result<CuckooFilter, FilterError> {
    CuckooFilter::create(
        FilterMode::from_code(mode_code),
        table_size,
        cells_per_bucket,
        fingerprint_bits,
        relocation_budget,
    )
    .map_err(|err| {
        log_error!("failed to create filter: {}", err);
        err
    })
}

/// 批量插入，返回成功数
pub fn batch_insert<R: rand::Rng>(filter: &mut CuckooFilter<R>, keys: impl IntoIterator<Item = Key>) -> usize {
    keys.into_iter()
        .filter(|&key| filter.insert(key).is_success())
        .count()
}
