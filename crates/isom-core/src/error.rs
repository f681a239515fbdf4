//! 统一错误类型定义.
//!
//! 所有 isom crate 共用的错误类型, 各层出错时立即向上传播, 不做局部恢复.

use thiserror::Error;

/// isom 统一错误类型
#[derive(Debug, Error)]
pub enum IsomError {
    /// 数据不足: 比特流或字节流在字段读完之前耗尽
    #[error("数据不足, 已到达流末尾")]
    Eof,

    /// 描述符 tag 与当前嵌套层级要求的不一致
    #[error("未找到描述符 tag {expected} (实际为 {found})")]
    TagNotFound {
        /// 期望的 tag
        expected: u8,
        /// 实际读到的 tag
        found: u8,
    },

    /// 无效参数 (编码时违反调用约定)
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// isom 统一 Result 类型
pub type IsomResult<T> = Result<T, IsomError>;
