// src/filter/bucket.rs
//! 桶表实现 - 定长桶/槽位存储与每桶占用计数

use crate::{
    hash::FingerprintWidths,
    types::{BucketLayout, FilterMode, Fingerprint},
};
use std::fmt;

/// 定长桶表
///
/// 所有槽位存放在一段连续缓冲区中，按 (桶, 槽位) 寻址。
/// 每个桶维护占用计数与当前布局，任何操作只触及一个桶。
#[derive(Clone)]
pub struct BucketTable {
    cells: Vec<Fingerprint>,
    occupancy: Vec<u8>,
    layouts: Vec<BucketLayout>,
    size: usize,
    cells_per_bucket: usize,
    configurable: bool,
}

impl fmt::Debug for BucketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BucketTable(buckets: {}, cells: {}, fingerprints: {})",
            self.size,
            self.cells_per_bucket,
            self.total_fingerprints()
        )
    }
}

impl BucketTable {
    pub fn new(size: usize, cells_per_bucket: usize, mode: FilterMode) -> Self {
        let configurable = mode == FilterMode::Configurable && cells_per_bucket > 1;
        let initial = if configurable {
            BucketLayout::Large
        } else {
            BucketLayout::Small
        };
        Self {
            cells: vec![Fingerprint::zero(); size * cells_per_bucket],
            occupancy: vec![0; size],
            layouts: vec![initial; size],
            size,
            cells_per_bucket,
            configurable,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells_per_bucket(&self) -> usize {
        self.cells_per_bucket
    }

    /// 总槽位数
    pub fn capacity(&self) -> usize {
        self.size * self.cells_per_bucket
    }

    #[inline]
    fn offset(&self, bucket: usize, cell: usize) -> usize {
        debug_assert!(cell < self.cells_per_bucket);
        bucket * self.cells_per_bucket + cell
    }

    /// 读取槽位
    #[inline]
    pub fn read(&self, bucket: usize, cell: usize) -> Fingerprint {
        self.cells[self.offset(bucket, cell)]
    }

    /// 桶内全部槽位
    pub fn bucket(&self, bucket: usize) -> &[Fingerprint] {
        let start = bucket * self.cells_per_bucket;
        &self.cells[start..start + self.cells_per_bucket]
    }

    pub fn occupancy(&self, bucket: usize) -> usize {
        self.occupancy[bucket] as usize
    }

    pub fn layout(&self, bucket: usize) -> BucketLayout {
        self.layouts[bucket]
    }

    pub fn is_full(&self, bucket: usize) -> bool {
        self.occupancy(bucket) >= self.cells_per_bucket
    }

    /// 查找空槽位
    pub fn free_cell(&self, bucket: usize) -> Option<usize> {
        if self.is_full(bucket) {
            return None;
        }
        self.bucket(bucket).iter().position(|fp| fp.is_zero())
    }

    /// 桶内第 n 个已占用槽位
    pub fn nth_occupied(&self, bucket: usize, n: usize) -> Option<usize> {
        self.bucket(bucket)
            .iter()
            .enumerate()
            .filter(|(_, fp)| !fp.is_zero())
            .nth(n)
            .map(|(cell, _)| cell)
    }

    /// 全表第 n 个已占用槽位，按桶顺序计数
    pub fn locate_nth(&self, mut n: usize) -> Option<(usize, usize)> {
        for (bucket, &count) in self.occupancy.iter().enumerate() {
            let count = count as usize;
            if n < count {
                return self.nth_occupied(bucket, n).map(|cell| (bucket, cell));
            }
            n -= count;
        }
        None
    }

    /// 在空槽位写入指纹
    pub fn place(&mut self, bucket: usize, cell: usize, fp: Fingerprint) {
        debug_assert!(!fp.is_zero(), "零指纹保留为空槽位");
        let offset = self.offset(bucket, cell);
        debug_assert!(self.cells[offset].is_zero(), "槽位已占");
        self.cells[offset] = fp;
        self.occupancy[bucket] += 1;
        self.refresh_layout(bucket);
    }

    /// 清空槽位，返回原指纹
    pub fn clear(&mut self, bucket: usize, cell: usize) -> Fingerprint {
        let offset = self.offset(bucket, cell);
        let old = std::mem::take(&mut self.cells[offset]);
        if !old.is_zero() {
            self.occupancy[bucket] -= 1;
            self.refresh_layout(bucket);
        }
        old
    }

    /// 替换已占用槽位中的指纹，占用计数不变
    pub fn replace(&mut self, bucket: usize, cell: usize, fp: Fingerprint) -> Fingerprint {
        let offset = self.offset(bucket, cell);
        debug_assert!(!self.cells[offset].is_zero(), "只能替换已占用槽位");
        std::mem::replace(&mut self.cells[offset], fp)
    }

    /// 按桶布局检查指纹是否存在
    pub fn contains(&self, bucket: usize, probe: Fingerprint, widths: &FingerprintWidths) -> bool {
        let layout = self.layout(bucket);
        self.bucket(bucket)
            .iter()
            .any(|stored| widths.matches(*stored, probe, layout))
    }

    fn refresh_layout(&mut self, bucket: usize) {
        self.layouts[bucket] = if self.configurable && !self.is_full(bucket) {
            BucketLayout::Large
        } else {
            BucketLayout::Small
        };
    }

    /// 占用直方图：占用数为 i 的桶所占比例，长度 cells_per_bucket + 1
    pub fn histogram(&self) -> Vec<f64> {
        let mut counts = vec![0usize; self.cells_per_bucket + 1];
        for &count in &self.occupancy {
            counts[count as usize] += 1;
        }
        let size = self.size.max(1) as f64;
        counts.into_iter().map(|c| c as f64 / size).collect()
    }

    /// 全表指纹总数
    pub fn total_fingerprints(&self) -> usize {
        self.occupancy.iter().map(|&c| c as usize).sum()
    }

    /// 每个桶的 (占用, 布局)
    pub fn iter_buckets(&self) -> impl Iterator<Item = (usize, BucketLayout)> + '_ {
        self.occupancy
            .iter()
            .zip(self.layouts.iter())
            .map(|(&count, &layout)| (count as usize, layout))
    }
}
