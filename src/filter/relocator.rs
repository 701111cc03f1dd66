//! Cuckoo踢出插入 - 直接放置快路径 + 有界随机游走踢出链

use crate::{
    filter::bucket::BucketTable,
    hash::HashScheme,
    types::{Fingerprint, InsertOutcome, InsertResult, Victim},
};
use rand::Rng;

/// 踢出插入器
#[derive(Debug, Clone, Copy)]
pub struct CuckooRelocator {
    relocation_budget: usize,
}

impl CuckooRelocator {
    pub fn new(relocation_budget: usize) -> Self {
        Self { relocation_budget }
    }

    pub fn relocation_budget(&self) -> usize {
        self.relocation_budget
    }

    /// 尝试直接插入，成功返回槽位
    fn try_direct_insert(table: &mut BucketTable, bucket: usize, fp: Fingerprint) -> Option<usize> {
        let cell = table.free_cell(bucket)?;
        table.place(bucket, cell, fp);
        Some(cell)
    }

    /// 插入指纹
    ///
    /// 预算耗尽时表中已执行的交换不会回滚，最后被踢出的指纹写入 `victim`。
    /// 受害者槽位已被占用且两个候选桶都满时直接拒绝，不做任何修改。
    pub fn insert<R: Rng + ?Sized>(
        &self,
        table: &mut BucketTable,
        scheme: &HashScheme,
        victim: &mut Option<Victim>,
        fp: Fingerprint,
        b1: usize,
        b2: usize,
        rng: &mut R,
    ) -> InsertResult {
        let mut operations = 0;

        // 1. 尝试在主桶直接插入
        operations += 1;
        if Self::try_direct_insert(table, b1, fp).is_some() {
            return InsertResult {
                outcome: InsertOutcome::Placed { relocations: 0 },
                operations: operations + 1,
            };
        }

        // 2. 尝试在备用桶直接插入
        operations += 1;
        if Self::try_direct_insert(table, b2, fp).is_some() {
            return InsertResult {
                outcome: InsertOutcome::Placed { relocations: 0 },
                operations: operations + 1,
            };
        }

        if victim.is_some() {
            log_warn!(
                "insert rejected: buckets [{}, {}] full and victim {:?} pending",
                b1, b2, victim
            );
            return InsertResult {
                outcome: InsertOutcome::Rejected,
                operations,
            };
        }

        // 3. 两个桶都无法直接插入，进入踢出逻辑
        let mut current_fp = fp;
        let mut current_bucket = if rng.gen_bool(0.5) { b1 } else { b2 };
        log_debug!("cuckoo kick start: fp={}, b1={}, b2={}, from={}", fp, b1, b2, current_bucket);

        for step in 1..=self.relocation_budget {
            let occupied = table.occupancy(current_bucket);
            if occupied == 0 {
                break;
            }
            let Some(cell) = table.nth_occupied(current_bucket, rng.gen_range(0..occupied)) else {
                break;
            };

            // 交换：写入当前指纹，取出被踢指纹
            let evicted = table.replace(current_bucket, cell, current_fp);
            operations += 2;

            current_fp = evicted;
            current_bucket = scheme.bucket2(current_bucket, evicted);

            operations += 1;
            if Self::try_direct_insert(table, current_bucket, current_fp).is_some() {
                log_debug!("cuckoo kick placed fp={} in bucket {} after {} steps", current_fp, current_bucket, step);
                return InsertResult {
                    outcome: InsertOutcome::Placed { relocations: step },
                    operations: operations + 1,
                };
            }
        }

        log_warn!(
            "cuckoo kick budget {} exhausted, fp={} parked as victim for bucket {}",
            self.relocation_budget, current_fp, current_bucket
        );
        *victim = Some(Victim {
            fingerprint: current_fp,
            bucket: current_bucket,
        });
        InsertResult {
            outcome: InsertOutcome::Victimized,
            operations,
        }
    }

    /// 尝试把受害者放回等待桶或其备用桶 (仅直接放置)
    ///
    /// 返回 (是否归位, 内存操作数)。
    pub fn rehome_victim(
        table: &mut BucketTable,
        scheme: &HashScheme,
        victim: &mut Option<Victim>,
    ) -> (bool, usize) {
        let Some(pending) = *victim else {
            return (false, 0);
        };
        let mut operations = 0;
        let alternate = scheme.bucket2(pending.bucket, pending.fingerprint);
        for bucket in [pending.bucket, alternate] {
            operations += 1;
            if Self::try_direct_insert(table, bucket, pending.fingerprint).is_some() {
                *victim = None;
                return (true, operations + 1);
            }
        }
        (false, operations)
    }
}
