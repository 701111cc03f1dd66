// src/stats/operation.rs
//! 操作统计 - 跟踪过滤器操作计数与内存访问次数

use crate::types::{InsertOutcome, ScrubReport};
use std::sync::atomic::{AtomicU64, Ordering};

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Insert,
    Query,
    Remove,
    Scrub,
    Kick,
    VictimRetry,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Query => "query",
            Self::Remove => "remove",
            Self::Scrub => "scrub",
            Self::Kick => "kick",
            Self::VictimRetry => "victim_retry",
        }
    }
}

/// 操作统计快照
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationStatsSnapshot {
    pub insert_count: u64,
    pub direct_insert_count: u64,
    pub relocated_insert_count: u64,
    pub victimized_count: u64,
    pub rejected_count: u64,
    pub kick_count: u64,
    pub query_count: u64,
    pub positive_query_count: u64,
    pub remove_count: u64,
    pub empty_remove_count: u64,
    pub scrub_count: u64,
    pub scrub_pass_count: u64,
    pub scrub_move_count: u64,
    pub victim_retry_count: u64,
    pub victim_rehomed_count: u64,
    /// 累计内存读写次数
    pub memory_operations: u64,
}

impl OperationStatsSnapshot {
    pub fn count(&self, op_type: OperationType) -> u64 {
        match op_type {
            OperationType::Insert => self.insert_count,
            OperationType::Query => self.query_count,
            OperationType::Remove => self.remove_count,
            OperationType::Scrub => self.scrub_count,
            OperationType::Kick => self.kick_count,
            OperationType::VictimRetry => self.victim_retry_count,
        }
    }

    /// 失败插入 (受害者 + 拒绝) 比例
    pub fn insert_failure_rate(&self) -> f64 {
        if self.insert_count == 0 {
            return 0.0;
        }
        (self.victimized_count + self.rejected_count) as f64 / self.insert_count as f64
    }
}

/// 原子操作统计
///
/// 过滤器本身单线程使用，原子计数让只读的查询路径也能记账。
#[derive(Debug, Default)]
pub struct OperationStats {
    insert_count: AtomicU64,
    direct_insert_count: AtomicU64,
    relocated_insert_count: AtomicU64,
    victimized_count: AtomicU64,
    rejected_count: AtomicU64,
    kick_count: AtomicU64,
    query_count: AtomicU64,
    positive_query_count: AtomicU64,
    remove_count: AtomicU64,
    empty_remove_count: AtomicU64,
    scrub_count: AtomicU64,
    scrub_pass_count: AtomicU64,
    scrub_move_count: AtomicU64,
    victim_retry_count: AtomicU64,
    victim_rehomed_count: AtomicU64,
    memory_operations: AtomicU64,
}

#[inline]
fn bump(counter: &AtomicU64, value: u64) {
    counter.fetch_add(value, Ordering::Relaxed);
}

impl OperationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录插入；`evictions` 为本次执行的踢出次数
    pub fn record_insert(&self, outcome: InsertOutcome, evictions: usize, operations: usize) {
        bump(&self.insert_count, 1);
        match outcome {
            InsertOutcome::Placed { relocations: 0 } => bump(&self.direct_insert_count, 1),
            InsertOutcome::Placed { .. } => bump(&self.relocated_insert_count, 1),
            InsertOutcome::Victimized => bump(&self.victimized_count, 1),
            InsertOutcome::Rejected => bump(&self.rejected_count, 1),
        }
        bump(&self.kick_count, evictions as u64);
        bump(&self.memory_operations, operations as u64);
    }

    pub fn record_query(&self, found: bool, operations: usize) {
        bump(&self.query_count, 1);
        if found {
            bump(&self.positive_query_count, 1);
        }
        bump(&self.memory_operations, operations as u64);
    }

    pub fn record_remove(&self, removed: bool, operations: usize) {
        if removed {
            bump(&self.remove_count, 1);
        } else {
            bump(&self.empty_remove_count, 1);
        }
        bump(&self.memory_operations, operations as u64);
    }

    pub fn record_scrub(&self, report: &ScrubReport) {
        bump(&self.scrub_count, 1);
        bump(&self.scrub_pass_count, report.passes as u64);
        bump(&self.scrub_move_count, report.moved as u64);
        bump(&self.memory_operations, report.operations as u64);
    }

    pub fn record_victim_retry(&self, rehomed: bool, operations: usize) {
        bump(&self.victim_retry_count, 1);
        if rehomed {
            bump(&self.victim_rehomed_count, 1);
        }
        bump(&self.memory_operations, operations as u64);
    }

    pub fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot {
            insert_count: self.insert_count.load(Ordering::Relaxed),
            direct_insert_count: self.direct_insert_count.load(Ordering::Relaxed),
            relocated_insert_count: self.relocated_insert_count.load(Ordering::Relaxed),
            victimized_count: self.victimized_count.load(Ordering::Relaxed),
            rejected_count: self.rejected_count.load(Ordering::Relaxed),
            kick_count: self.kick_count.load(Ordering::Relaxed),
            query_count: self.query_count.load(Ordering::Relaxed),
            positive_query_count: self.positive_query_count.load(Ordering::Relaxed),
            remove_count: self.remove_count.load(Ordering::Relaxed),
            empty_remove_count: self.empty_remove_count.load(Ordering::Relaxed),
            scrub_count: self.scrub_count.load(Ordering::Relaxed),
            scrub_pass_count: self.scrub_pass_count.load(Ordering::Relaxed),
            scrub_move_count: self.scrub_move_count.load(Ordering::Relaxed),
            victim_retry_count: self.victim_retry_count.load(Ordering::Relaxed),
            victim_rehomed_count: self.victim_rehomed_count.load(Ordering::Relaxed),
            memory_operations: self.memory_operations.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.insert_count,
            &self.direct_insert_count,
            &self.relocated_insert_count,
            &self.victimized_count,
            &self.rejected_count,
            &self.kick_count,
            &self.query_count,
            &self.positive_query_count,
            &self.remove_count,
            &self.empty_remove_count,
            &self.scrub_count,
            &self.scrub_pass_count,
            &self.scrub_move_count,
            &self.victim_retry_count,
            &self.victim_rehomed_count,
            &self.memory_operations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// 导出Prometheus格式指标
    pub fn export_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = String::new();

        let op_types = [
            OperationType::Insert,
            OperationType::Query,
            OperationType::Remove,
            OperationType::Scrub,
            OperationType::Kick,
            OperationType::VictimRetry,
        ];

        for op in op_types {
            output.push_str(&format!(
                "# HELP cuckoo_filter_{}_count Total {} operations\n",
                op.as_str(),
                op.as_str()
            ));
            output.push_str(&format!("# TYPE cuckoo_filter_{}_count counter\n", op.as_str()));
            output.push_str(&format!(
                "cuckoo_filter_{}_count {}\n",
                op.as_str(),
                snapshot.count(op)
            ));
        }

        // 插入结果分布
        output.push_str("# HELP cuckoo_filter_insert_outcome_count Inserts by outcome\n");
        output.push_str("# TYPE cuckoo_filter_insert_outcome_count counter\n");
        for (label, value) in [
            ("direct", snapshot.direct_insert_count),
            ("relocated", snapshot.relocated_insert_count),
            ("victimized", snapshot.victimized_count),
            ("rejected", snapshot.rejected_count),
        ] {
            output.push_str(&format!(
                "cuckoo_filter_insert_outcome_count{{outcome=\"{}\"}} {}\n",
                label, value
            ));
        }

        output.push_str("# HELP cuckoo_filter_memory_operations Total bucket reads and cell writes\n");
        output.push_str("# TYPE cuckoo_filter_memory_operations counter\n");
        output.push_str(&format!(
            "cuckoo_filter_memory_operations {}\n",
            snapshot.memory_operations
        ));

        output
    }
}
