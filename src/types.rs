//! 核心类型定义 - 过滤器共享的值类型

use core::fmt;

/// 键类型 - 64位无符号标识，插入后不再保存
pub type Key = u64;

/// 过滤器模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// 标准Cuckoo过滤器，所有桶使用短指纹
    Standard,
    /// 可配置桶 (CB-CF)，未满的桶使用长指纹
    Configurable,
}

impl FilterMode {
    /// 从数字模式构造 (0: 标准, 其他: CB-CF)
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            Self::Standard
        } else {
            Self::Configurable
        }
    }

    /// 数字模式
    pub fn code(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::Configurable => 1,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "CF"),
            Self::Configurable => write!(f, "CB-CF"),
        }
    }
}

/// 桶布局 - 决定桶内指纹比较的位宽
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketLayout {
    /// 全部槽位使用短指纹
    Small,
    /// 少一个槽位, 每个槽位使用长指纹
    Large,
}

/// 指纹 - 长位宽存储，低位为短指纹 (tag)
///
/// 0 保留为空槽位标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// 创建指纹
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// 返回零指纹（表示空槽位）
    pub const fn zero() -> Self {
        Self(0)
    }

    /// 获取指纹值
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// 检查是否为零（空槽位）
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// 取低 `mask` 位
    #[inline]
    pub const fn masked(&self, mask: u32) -> u32 {
        self.0 & mask
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

/// 受害者 - 踢出链耗尽预算后未能归位的指纹
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim {
    pub fingerprint: Fingerprint,
    /// 等待进入的桶
    pub bucket: usize,
}

/// 插入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// 已放入表中，`relocations` 为踢出步数 (0 表示直接放入)
    Placed { relocations: usize },
    /// 踢出预算耗尽，最后被踢出的指纹成为受害者
    Victimized,
    /// 两个候选桶已满且受害者槽位被占用，未做任何修改
    Rejected,
}

impl InsertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    /// 成功时的踢出步数
    pub fn relocations(&self) -> Option<usize> {
        match self {
            Self::Placed { relocations } => Some(*relocations),
            _ => None,
        }
    }
}

/// 插入调用的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    pub outcome: InsertOutcome,
    /// 读写内存次数，仅用于统计
    pub operations: usize,
}

impl InsertResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn relocations(&self) -> Option<usize> {
        self.outcome.relocations()
    }
}

/// 查询调用的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult {
    pub found: bool,
    pub operations: usize,
}

/// 清理 (scrub) 汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrubReport {
    /// 实际执行的轮数
    pub passes: usize,
    /// 移动的指纹数
    pub moved: usize,
    pub operations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes() {
        assert_eq!(FilterMode::from_code(0), FilterMode::Standard);
        assert_eq!(FilterMode::from_code(1), FilterMode::Configurable);
        assert_eq!(FilterMode::from_code(7), FilterMode::Configurable);
        assert_eq!(FilterMode::Configurable.code(), 1);
        assert_eq!(FilterMode::Standard.to_string(), "CF");
    }

    #[test]
    fn test_fingerprint_mask() {
        let fp = Fingerprint::new(0xABCDE);
        assert_eq!(fp.masked(0xFFF), 0xCDE);
        assert!(!fp.is_zero());
        assert!(Fingerprint::zero().is_zero());
        assert_eq!(fp.to_string(), "0ABCDE");
    }

    #[test]
    fn test_insert_outcome() {
        assert_eq!(InsertOutcome::Placed { relocations: 3 }.relocations(), Some(3));
        assert!(InsertOutcome::Placed { relocations: 0 }.is_success());
        assert_eq!(InsertOutcome::Victimized.relocations(), None);
        assert!(!InsertOutcome::Rejected.is_success());
    }
}
