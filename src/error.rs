//! 统一错误处理 - 过滤器构造与寻址错误

/// 过滤器可能发生的错误
///
/// 插入饱和与空表删除不属于错误，通过返回值表达。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("无效配置: {reason}")]
    InvalidConfig { reason: String },

    #[error("无效桶索引: {index} (桶数量: {size})")]
    InvalidBucket { index: usize, size: usize },
}

impl FilterError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// 获取错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { .. } => Some("检查配置参数"),
            Self::InvalidBucket { .. } => Some("验证桶索引是否有效"),
        }
    }

    /// 判断错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidBucket { .. })
    }
}
