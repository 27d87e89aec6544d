//! 错误类型
//!
//! 内核中的所有失败都是局部、可恢复的，由调用方决定是否继续

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KernelError>;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("growth step must be greater than zero")]
    InvalidGrowthStep,

    #[error("container allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("item not found in container")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("render failed: {0}")]
    Render(String),

    #[error("unknown key name '{0}'")]
    UnknownKey(String),
}
