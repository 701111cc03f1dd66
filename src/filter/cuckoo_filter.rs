//! Cuckoo过滤器核心实现

use crate::{
    error::FilterError,
    filter::{
        bucket::BucketTable, relocator::CuckooRelocator, scrubber::Scrubber, MAX_CELLS_PER_BUCKET,
    },
    hash::{bucket_match_probability, FingerprintWidths, HashAlgorithm, HashScheme},
    stats::{OperationStats, OperationStatsSnapshot},
    types::{
        BucketLayout, FilterMode, InsertOutcome, InsertResult, Key, QueryResult, ScrubReport,
        Victim,
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;

/// 过滤器配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuckooFilterConfig {
    pub mode: FilterMode,
    /// 桶数量，必须为2的幂
    pub table_size: usize,
    pub cells_per_bucket: usize,
    /// 短指纹位数
    pub fingerprint_bits: u32,
    /// 单次插入的最大踢出步数
    pub relocation_budget: usize,
    /// 清理轮数上限
    pub scrub_passes: usize,
    /// 随机源种子
    pub seed: u64,
    pub fingerprint_algorithm: HashAlgorithm,
    pub bucket_algorithm: HashAlgorithm,
}

impl Default for CuckooFilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::Configurable,
            table_size: 8192,
            cells_per_bucket: 4,
            fingerprint_bits: 12,
            relocation_budget: 20,
            scrub_passes: 20,
            seed: 0,
            fingerprint_algorithm: HashAlgorithm::Rs,
            bucket_algorithm: HashAlgorithm::Js,
        }
    }
}

impl CuckooFilterConfig {
    pub fn new(
        mode: FilterMode,
        table_size: usize,
        cells_per_bucket: usize,
        fingerprint_bits: u32,
        relocation_budget: usize,
    ) -> Self {
        Self {
            mode,
            table_size,
            cells_per_bucket,
            fingerprint_bits,
            relocation_budget,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_scrub_passes(mut self, passes: usize) -> Self {
        self.scrub_passes = passes;
        self
    }

    pub fn with_algorithms(mut self, fingerprint: HashAlgorithm, bucket: HashAlgorithm) -> Self {
        self.fingerprint_algorithm = fingerprint;
        self.bucket_algorithm = bucket;
        self
    }

    pub fn widths(&self) -> FingerprintWidths {
        FingerprintWidths::new(self.mode, self.cells_per_bucket, self.fingerprint_bits)
    }

    /// 总槽位数
    pub fn capacity(&self) -> usize {
        self.table_size * self.cells_per_bucket
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.table_size == 0 || !self.table_size.is_power_of_two() {
            return Err(FilterError::invalid_config(format!(
                "table_size must be a non-zero power of two, got {}",
                self.table_size
            )));
        }
        if self.cells_per_bucket == 0 || self.cells_per_bucket > MAX_CELLS_PER_BUCKET {
            return Err(FilterError::invalid_config(format!(
                "cells_per_bucket must be in 1..={}, got {}",
                MAX_CELLS_PER_BUCKET, self.cells_per_bucket
            )));
        }
        if self.fingerprint_bits == 0 {
            return Err(FilterError::invalid_config("fingerprint_bits must be positive"));
        }
        if self.fingerprint_bits > 32 {
            return Err(FilterError::invalid_config(format!(
                "fingerprint width {} exceeds 32 bits",
                self.fingerprint_bits
            )));
        }
        let large_bits = self.widths().large_bits();
        if large_bits > 32 {
            return Err(FilterError::invalid_config(format!(
                "large fingerprint width {} (from {} bits) exceeds 32 bits",
                large_bits, self.fingerprint_bits
            )));
        }
        Ok(())
    }
}

/// Cuckoo过滤器
///
/// 独占桶表、占用计数、受害者槽位与随机源。所有随机选择都来自注入的 `rng`，
/// 相同种子与相同操作序列得到相同结果。
pub struct CuckooFilter<R: Rng = StdRng> {
    config: CuckooFilterConfig,
    scheme: HashScheme,
    table: BucketTable,
    relocator: CuckooRelocator,
    scrubber: Scrubber,
    victim: Option<Victim>,
    item_count: usize,
    rng: R,
    stats: OperationStats,
}

impl<R: Rng> fmt::Debug for CuckooFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooFilter")
            .field("mode", &self.config.mode)
            .field("items", &self.item_count)
            .field("capacity", &self.table_capacity())
            .field("victim", &self.victim)
            .finish()
    }
}

impl CuckooFilter<StdRng> {
    /// 按五个基本参数创建，其余取默认值
    pub fn create(
        mode: FilterMode,
        table_size: usize,
        cells_per_bucket: usize,
        fingerprint_bits: u32,
        relocation_budget: usize,
    ) -> Result<Self, FilterError> {
        Self::new(CuckooFilterConfig::new(
            mode,
            table_size,
            cells_per_bucket,
            fingerprint_bits,
            relocation_budget,
        ))
    }

    /// 使用配置中的种子创建
    pub fn new(config: CuckooFilterConfig) -> Result<Self, FilterError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> CuckooFilter<R> {
    /// 使用外部随机源创建
    pub fn with_rng(config: CuckooFilterConfig, rng: R) -> Result<Self, FilterError> {
        config.validate()?;
        let scheme = HashScheme::with_algorithms(
            config.table_size,
            config.widths(),
            config.fingerprint_algorithm,
            config.bucket_algorithm,
            0,
        );
        Self::with_scheme(config, scheme, rng)
    }

    /// 使用注入的哈希方案创建
    pub fn with_scheme(config: CuckooFilterConfig, scheme: HashScheme, rng: R) -> Result<Self, FilterError> {
        config.validate()?;
        if scheme.table_size() != config.table_size {
            return Err(FilterError::invalid_config(format!(
                "hash scheme addresses {} buckets, table has {}",
                scheme.table_size(),
                config.table_size
            )));
        }
        if *scheme.widths() != config.widths() {
            return Err(FilterError::invalid_config(
                "hash scheme fingerprint widths differ from configuration",
            ));
        }

        log_info!(
            "creating {} filter: buckets={}, cells={}, fp_bits={}/{}, budget={}",
            config.mode,
            config.table_size,
            config.cells_per_bucket,
            config.widths().small_bits(),
            config.widths().large_bits(),
            config.relocation_budget
        );

        Ok(Self {
            table: BucketTable::new(config.table_size, config.cells_per_bucket, config.mode),
            relocator: CuckooRelocator::new(config.relocation_budget),
            scrubber: Scrubber::new(config.scrub_passes),
            victim: None,
            item_count: 0,
            rng,
            stats: OperationStats::new(),
            scheme,
            config,
        })
    }

    /// 插入键
    ///
    /// 失败 (`Victimized`/`Rejected`) 是接近满载时的正常结果。
    pub fn insert(&mut self, key: Key) -> InsertResult {
        let (fp, b1, b2) = self.scheme.locate(key);
        let result = self.relocator.insert(
            &mut self.table,
            &self.scheme,
            &mut self.victim,
            fp,
            b1,
            b2,
            &mut self.rng,
        );

        let evictions = match result.outcome {
            InsertOutcome::Placed { relocations } => {
                self.item_count += 1;
                relocations
            }
            InsertOutcome::Victimized => {
                self.item_count += 1;
                self.relocator.relocation_budget()
            }
            InsertOutcome::Rejected => 0,
        };
        self.stats.record_insert(result.outcome, evictions, result.operations);
        result
    }

    /// 查询键，受害者槽位同样参与匹配
    pub fn query(&self, key: Key) -> QueryResult {
        let (fp, b1, b2) = self.scheme.locate(key);
        let widths = self.scheme.widths();

        let victim_hit = self
            .victim
            .map_or(false, |v| v.fingerprint == fp && (v.bucket == b1 || v.bucket == b2));

        let result = if self.table.contains(b1, fp, widths) {
            QueryResult { found: true, operations: 1 }
        } else if self.table.contains(b2, fp, widths) {
            QueryResult { found: true, operations: 2 }
        } else {
            QueryResult { found: victim_hit, operations: 2 }
        };

        self.stats.record_query(result.found, result.operations);
        result
    }

    pub fn contains(&self, key: Key) -> bool {
        self.query(key).found
    }

    /// 随机删除一个已占用槽位，返回内存操作数
    ///
    /// 只在表中已占用的槽位里选择。表中没有指纹时不做任何修改并返回 0，
    /// 即使受害者仍在等待：受害者从不参与删除，只能经由 `retry_victim` 回到表中。
    pub fn random_remove(&mut self) -> usize {
        let total = self.table.total_fingerprints();
        if total == 0 {
            log_debug!("random_remove on empty table ignored");
            self.stats.record_remove(false, 0);
            return 0;
        }

        let n = self.rng.gen_range(0..total);
        let Some((bucket, cell)) = self.table.locate_nth(n) else {
            self.stats.record_remove(false, 0);
            return 0;
        };
        self.table.clear(bucket, cell);
        self.item_count -= 1;

        let operations = 2;
        self.stats.record_remove(true, operations);
        operations
    }

    /// 执行配置的清理轮数
    pub fn scrub(&mut self) -> ScrubReport {
        let report = self.scrubber.run(&mut self.table, &self.scheme, &mut self.rng);
        self.stats.record_scrub(&report);
        report
    }

    /// 执行单轮清理
    pub fn scrub_pass(&mut self) -> ScrubReport {
        let report = Scrubber::pass(&mut self.table, &self.scheme, &mut self.rng);
        self.stats.record_scrub(&report);
        report
    }

    /// 尝试把受害者放回表中
    ///
    /// 过滤器从不自动调用；是否重试由调用方决定。返回 (是否归位, 内存操作数)。
    pub fn retry_victim(&mut self) -> (bool, usize) {
        let had_victim = self.victim.is_some();
        let (rehomed, operations) =
            CuckooRelocator::rehome_victim(&mut self.table, &self.scheme, &mut self.victim);
        if had_victim {
            self.stats.record_victim_retry(rehomed, operations);
        }
        (rehomed, operations)
    }

    /// 逻辑元素数 (表中指纹 + 受害者)
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// 占用直方图，长度 cells_per_bucket + 1
    pub fn bucket_occupancy(&self) -> Vec<f64> {
        self.table.histogram()
    }

    fn check_bucket(&self, index: usize) -> Result<(), FilterError> {
        if index < self.table.size() {
            Ok(())
        } else {
            Err(FilterError::InvalidBucket {
                index,
                size: self.table.size(),
            })
        }
    }

    /// 指定桶的指纹数
    pub fn fingerprint_count_in_bucket(&self, index: usize) -> Result<usize, FilterError> {
        self.check_bucket(index)?;
        Ok(self.table.occupancy(index))
    }

    /// 指定桶当前的布局
    pub fn bucket_layout(&self, index: usize) -> Result<BucketLayout, FilterError> {
        self.check_bucket(index)?;
        Ok(self.table.layout(index))
    }

    /// 表中指纹总数 (不含受害者)
    pub fn total_fingerprints(&self) -> usize {
        self.table.total_fingerprints()
    }

    /// 总槽位数
    pub fn table_capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn victim(&self) -> Option<Victim> {
        self.victim
    }

    pub fn load_factor(&self) -> f64 {
        self.item_count as f64 / self.table_capacity() as f64
    }

    pub fn config(&self) -> &CuckooFilterConfig {
        &self.config
    }

    pub fn scheme(&self) -> &HashScheme {
        &self.scheme
    }

    /// 按当前各桶占用与布局估计误判率 (不计受害者)
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let widths = self.scheme.widths();
        let size = self.table.size() as f64;
        let mean: f64 = self
            .table
            .iter_buckets()
            .map(|(count, layout)| bucket_match_probability(count, widths.bits(layout)))
            .sum::<f64>()
            / size;
        1.0 - (1.0 - mean) * (1.0 - mean)
    }

    pub fn stats(&self) -> OperationStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    pub fn export_prometheus(&self) -> String {
        self.stats.export_prometheus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_filter(mode: FilterMode) -> CuckooFilter {
        CuckooFilter::create(mode, 16, 4, 12, 20).expect("配置有效")
    }

    fn assert_count_invariant<R: Rng>(filter: &CuckooFilter<R>) {
        let victim = usize::from(filter.victim().is_some());
        assert_eq!(filter.item_count(), filter.total_fingerprints() + victim);
        assert!(filter.total_fingerprints() <= filter.table_capacity());
    }

    #[test]
    fn test_default_config() {
        let config = CuckooFilterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(), 8192 * 4);
        assert_eq!(config.widths().large_bits(), 16);
    }

    #[test]
    fn test_invalid_configs() {
        let bad = [
            CuckooFilterConfig::new(FilterMode::Standard, 0, 4, 12, 20),
            CuckooFilterConfig::new(FilterMode::Standard, 100, 4, 12, 20),
            CuckooFilterConfig::new(FilterMode::Standard, 16, 0, 12, 20),
            CuckooFilterConfig::new(FilterMode::Standard, 16, MAX_CELLS_PER_BUCKET + 1, 12, 20),
            CuckooFilterConfig::new(FilterMode::Standard, 16, 4, 0, 20),
            CuckooFilterConfig::new(FilterMode::Standard, 16, 4, 33, 20),
            CuckooFilterConfig::new(FilterMode::Configurable, 16, 4, 25, 20),
            CuckooFilterConfig::new(FilterMode::Configurable, 16, 4, u32::MAX, 20),
            CuckooFilterConfig::new(FilterMode::Configurable, 16, MAX_CELLS_PER_BUCKET, u32::MAX / 2, 20),
            CuckooFilterConfig::new(FilterMode::Standard, 16, 4, u32::MAX, 20),
        ];
        for config in bad {
            let err = CuckooFilter::new(config.clone()).unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidConfig { .. }),
                "{:?} 应被拒绝",
                config
            );
        }
    }

    #[test]
    fn test_scheme_mismatch_rejected() {
        let config = CuckooFilterConfig::new(FilterMode::Standard, 16, 4, 12, 20);
        let scheme = crate::hash::default_hash_scheme(FilterMode::Standard, 32, 4, 12);
        let result = CuckooFilter::with_scheme(config, scheme, StdRng::seed_from_u64(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_insert_then_query() {
        for mode in [FilterMode::Standard, FilterMode::Configurable] {
            let mut filter = create_test_filter(mode);
            for key in 1..=40u64 {
                let result = filter.insert(key);
                if result.is_success() {
                    assert!(filter.contains(key), "{} 模式下键 {} 插入后查询失败", mode, key);
                }
                assert_count_invariant(&filter);
            }
        }
    }

    #[test]
    fn test_remove_on_empty_is_noop() {
        let mut filter = create_test_filter(FilterMode::Standard);
        assert_eq!(filter.random_remove(), 0);
        assert_eq!(filter.item_count(), 0);
        assert_eq!(filter.stats().empty_remove_count, 1);
    }

    #[test]
    fn test_remove_decrements() {
        let mut filter = create_test_filter(FilterMode::Configurable);
        for key in 1..=20u64 {
            filter.insert(key);
        }
        let before = filter.item_count();
        assert_eq!(filter.random_remove(), 2);
        assert_eq!(filter.item_count(), before - 1);
        assert_count_invariant(&filter);
    }

    #[test]
    fn test_saturation_keeps_invariants() {
        let mut filter = create_test_filter(FilterMode::Standard);
        let mut failures = 0;
        for key in 1..=200u64 {
            if !filter.insert(key).is_success() {
                failures += 1;
            }
            assert_count_invariant(&filter);
        }
        assert!(failures > 0, "超过容量的插入必然失败");
        assert!(filter.item_count() <= filter.table_capacity() + 1);

        let stats = filter.stats();
        assert_eq!(stats.insert_count, 200);
        assert_eq!(
            stats.direct_insert_count + stats.relocated_insert_count + stats.victimized_count + stats.rejected_count,
            200
        );
    }

    #[test]
    fn test_victim_is_queryable() {
        // 单桶单槽：第二个键必定产生受害者
        let config = CuckooFilterConfig::new(FilterMode::Standard, 1, 1, 16, 3);
        let mut filter = CuckooFilter::new(config).unwrap();
        assert!(filter.insert(1).is_success());
        let result = filter.insert(2);
        assert_eq!(result.outcome, InsertOutcome::Victimized);
        assert!(filter.victim().is_some());
        assert_eq!(filter.item_count(), 2);
        assert!(filter.contains(1));
        assert!(filter.contains(2));

        // 受害者占用时再次插入被拒绝
        assert_eq!(filter.insert(3).outcome, InsertOutcome::Rejected);
        assert_eq!(filter.item_count(), 2);

        // 删除后受害者可以归位
        filter.random_remove();
        assert_eq!(filter.item_count(), 1);
        let (rehomed, _) = filter.retry_victim();
        assert!(rehomed);
        assert!(filter.victim().is_none());
        assert_eq!(filter.item_count(), 1);
        assert_count_invariant(&filter);
    }

    #[test]
    fn test_remove_skips_pending_victim() {
        let config = CuckooFilterConfig::new(FilterMode::Standard, 1, 1, 16, 3);
        let mut filter = CuckooFilter::new(config).unwrap();
        filter.insert(1);
        assert_eq!(filter.insert(2).outcome, InsertOutcome::Victimized);
        assert_eq!(filter.random_remove(), 2);

        // 表已空，受害者仍在等待
        let victim = filter.victim();
        assert!(victim.is_some());
        assert_eq!(filter.total_fingerprints(), 0);
        assert_eq!(filter.item_count(), 1);

        assert_eq!(filter.random_remove(), 0);
        assert_eq!(filter.item_count(), 1);
        assert_eq!(filter.victim(), victim);
        assert_eq!(filter.stats().empty_remove_count, 1);

        assert!(filter.retry_victim().0);
        assert_eq!(filter.total_fingerprints(), 1);
        assert_eq!(filter.item_count(), 1);
        assert_count_invariant(&filter);
    }

    #[test]
    fn test_retry_without_victim() {
        let mut filter = create_test_filter(FilterMode::Standard);
        assert_eq!(filter.retry_victim(), (false, 0));
        assert_eq!(filter.stats().victim_retry_count, 0);
    }

    #[test]
    fn test_bucket_accessors() {
        let mut filter = create_test_filter(FilterMode::Configurable);
        assert_eq!(filter.table_capacity(), 64);
        assert_eq!(
            filter.fingerprint_count_in_bucket(16),
            Err(FilterError::InvalidBucket { index: 16, size: 16 })
        );
        assert_eq!(filter.bucket_layout(0), Ok(BucketLayout::Large));
        assert!(filter.bucket_layout(99).unwrap_err().is_recoverable());

        filter.insert(99);
        let total: usize = (0..16)
            .map(|b| filter.fingerprint_count_in_bucket(b).unwrap())
            .sum();
        assert_eq!(total, 1);
        assert_eq!(filter.bucket_occupancy().len(), 5);
    }

    #[test]
    fn test_scrub_preserves_membership() {
        let mut filter = create_test_filter(FilterMode::Configurable);
        let admitted: Vec<u64> = (1..=58u64).filter(|&k| filter.insert(k).is_success()).collect();
        let victim_before = filter.victim();
        let count_before = filter.item_count();

        let report = filter.scrub();
        assert!(report.passes <= filter.config().scrub_passes);
        assert_eq!(filter.item_count(), count_before);
        assert_eq!(filter.victim(), victim_before);
        assert_count_invariant(&filter);
        for key in admitted {
            assert!(filter.contains(key), "清理后键 {} 丢失", key);
        }
    }

    #[test]
    fn test_estimated_false_positive_rate() {
        let mut filter = create_test_filter(FilterMode::Standard);
        assert_eq!(filter.estimated_false_positive_rate(), 0.0);
        for key in 1..=48u64 {
            filter.insert(key);
        }
        let estimate = filter.estimated_false_positive_rate();
        assert!(estimate > 0.0);
        assert!(estimate < crate::hash::theoretical_false_positive_rate(4, 12));
    }
}
