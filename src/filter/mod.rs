//! 过滤器模块 - 桶表、踢出插入、负载清理与对外接口

pub mod bucket;
pub mod relocator;
pub mod scrubber;
pub mod cuckoo_filter;

pub use bucket::BucketTable;
pub use cuckoo_filter::{CuckooFilter, CuckooFilterConfig};
pub use relocator::CuckooRelocator;
pub use scrubber::Scrubber;

use once_cell::sync::Lazy;

/// 默认每桶槽位数
pub const DEFAULT_CELLS_PER_BUCKET: usize = 4;

/// 每桶最大槽位数 (占用计数以 u8 存储)
pub const MAX_CELLS_PER_BUCKET: usize = 8;

/// 默认配置
pub static DEFAULT_CONFIG: Lazy<CuckooFilterConfig> = Lazy::new(CuckooFilterConfig::default);
