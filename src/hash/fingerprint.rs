//! 指纹位宽 - 短/长两种桶布局下的指纹截取与比较

use crate::types::{BucketLayout, FilterMode, Fingerprint};

/// 指纹位宽配置
///
/// 长指纹的低 `small_bits` 位即短指纹 (tag)。备用桶只由 tag 推导，
/// 因此同一指纹在两种布局之间移动时备用桶保持不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintWidths {
    small_bits: u32,
    large_bits: u32,
}

impl FingerprintWidths {
    /// 按模式与桶槽位数计算位宽
    pub fn new(mode: FilterMode, cells_per_bucket: usize, fingerprint_bits: u32) -> Self {
        let large_bits = match mode {
            FilterMode::Standard => fingerprint_bits,
            FilterMode::Configurable => Self::large_bits_for(cells_per_bucket, fingerprint_bits),
        };
        Self {
            small_bits: fingerprint_bits,
            large_bits,
        }
    }

    /// c 个 f 位槽位的空间，改放 c-1 个长指纹时每个的位宽
    pub fn large_bits_for(cells_per_bucket: usize, fingerprint_bits: u32) -> u32 {
        if cells_per_bucket <= 1 {
            return fingerprint_bits;
        }
        let cells = cells_per_bucket as u128;
        let bits = u128::from(fingerprint_bits) * cells / (cells - 1);
        u32::try_from(bits).unwrap_or(u32::MAX)
    }

    pub fn small_bits(&self) -> u32 {
        self.small_bits
    }

    pub fn large_bits(&self) -> u32 {
        self.large_bits
    }

    pub fn bits(&self, layout: BucketLayout) -> u32 {
        match layout {
            BucketLayout::Small => self.small_bits,
            BucketLayout::Large => self.large_bits,
        }
    }

    pub fn small_mask(&self) -> u32 {
        mask_for(self.small_bits)
    }

    pub fn large_mask(&self) -> u32 {
        mask_for(self.large_bits)
    }

    pub fn mask(&self, layout: BucketLayout) -> u32 {
        mask_for(self.bits(layout))
    }

    /// 长指纹取值范围 (2^large_bits)
    pub fn large_range(&self) -> u64 {
        1u64 << self.large_bits
    }

    /// 截取到长位宽，并保证 tag 非零
    pub fn normalize(&self, raw: u32) -> Fingerprint {
        let value = raw & self.large_mask();
        if value & self.small_mask() == 0 {
            Fingerprint::new(value | 1)
        } else {
            Fingerprint::new(value)
        }
    }

    /// 短指纹
    #[inline]
    pub fn tag(&self, fp: Fingerprint) -> u32 {
        fp.masked(self.small_mask())
    }

    /// 按桶布局比较已存指纹与探测指纹
    #[inline]
    pub fn matches(&self, stored: Fingerprint, probe: Fingerprint, layout: BucketLayout) -> bool {
        if stored.is_zero() {
            return false;
        }
        let mask = self.mask(layout);
        stored.masked(mask) == probe.masked(mask)
    }
}

fn mask_for(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// 单个桶对随机探测指纹的误判概率
///
/// 近似公式: 1 - (1 - 2^-bits)^occupancy
pub fn bucket_match_probability(occupancy: usize, bits: u32) -> f64 {
    if occupancy == 0 {
        return 0.0;
    }
    let miss = 1.0 - 0.5f64.powi(bits as i32);
    1.0 - miss.powi(occupancy as i32)
}

/// 满载标准过滤器的理论误判率上界: 2c / 2^f
pub fn theoretical_false_positive_rate(cells_per_bucket: usize, fingerprint_bits: u32) -> f64 {
    2.0 * cells_per_bucket as f64 / 2f64.powi(fingerprint_bits as i32)
}
