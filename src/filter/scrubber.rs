//! 负载清理 - 把满桶中的指纹迁往未满的备用桶

use crate::{filter::bucket::BucketTable, hash::HashScheme, types::ScrubReport};
use rand::Rng;

/// 清理器
///
/// 每轮遍历所有满桶，随机取一个指纹，若其备用桶接收后仍未满则迁移过去。
/// 迁移不改变成员关系：指纹只在自己的两个候选桶之间移动。
#[derive(Debug, Clone, Copy)]
pub struct Scrubber {
    passes: usize,
}

impl Scrubber {
    pub fn new(passes: usize) -> Self {
        Self { passes }
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// 执行至多 `passes` 轮，某轮没有迁移时提前结束
    pub fn run<R: Rng + ?Sized>(
        &self,
        table: &mut BucketTable,
        scheme: &HashScheme,
        rng: &mut R,
    ) -> ScrubReport {
        let mut report = ScrubReport::default();
        for _ in 0..self.passes {
            let pass = Self::pass(table, scheme, rng);
            report.passes += 1;
            report.moved += pass.moved;
            report.operations += pass.operations;
            if pass.moved == 0 {
                break;
            }
        }
        log_info!(
            "scrub finished: passes={}, moved={}, operations={}",
            report.passes, report.moved, report.operations
        );
        report
    }

    /// 单轮清理
    pub fn pass<R: Rng + ?Sized>(table: &mut BucketTable, scheme: &HashScheme, rng: &mut R) -> ScrubReport {
        let cells = table.cells_per_bucket();
        let mut report = ScrubReport {
            passes: 1,
            ..ScrubReport::default()
        };

        for bucket in 0..table.size() {
            if !table.is_full(bucket) {
                continue;
            }
            report.operations += 1;

            let Some(cell) = table.nth_occupied(bucket, rng.gen_range(0..cells)) else {
                continue;
            };
            let fp = table.read(bucket, cell);
            let alternate = scheme.bucket2(bucket, fp);
            if alternate == bucket {
                continue;
            }

            report.operations += 1;
            if table.occupancy(alternate) + 1 >= cells {
                continue;
            }
            let Some(target) = table.free_cell(alternate) else {
                continue;
            };

            table.clear(bucket, cell);
            table.place(alternate, target, fp);
            report.operations += 2;
            report.moved += 1;
        }

        log_debug!("scrub pass moved {} fingerprints", report.moved);
        report
    }
}
