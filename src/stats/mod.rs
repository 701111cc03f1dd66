//! 统计模块 - 过滤器操作计数

pub mod operation;

pub use operation::{OperationStats, OperationStatsSnapshot, OperationType};
