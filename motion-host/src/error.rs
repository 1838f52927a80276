//! # 宿主错误类型

use motion_runtime::{ContentHandle, ContractViolation};
use thiserror::Error;

use crate::config::ConfigError;

/// 宿主错误
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("导航契约违规: {0}")]
    Contract(#[from] ContractViolation),

    #[error("内容 '{handle}' 不在内容目录中")]
    UnknownContent { handle: ContentHandle },

    #[error("帧输出失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("帧序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 宿主操作结果
pub type HostResult<T> = Result<T, HostError>;
