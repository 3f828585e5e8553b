//! # 解析/解码错误模型
//!
//! ## 设计思路
//!
//! 解析（判断形状）与解码（Base64 → 字节）是两个独立阶段，各自使用一个错误枚举，
//! 调用侧可以按分支匹配，而不是比对字符串。

/// `data:image` 前缀存在，但整体形状不符合 `data:image/<subtype>;base64,<payload>`。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Data URI 格式错误：{reason}（前缀：{prefix}）")]
    Malformed {
        /// 原始 src 的分类前缀，避免把整段 payload 打进日志。
        prefix: String,
        reason: &'static str,
    },
}

/// 解码阶段错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// 对非 data image 引用调用了解码，属于编排错误。
    #[error("不是 data image 引用，无法解码")]
    NotADataImage,

    #[error("Base64 解码失败：{0}")]
    InvalidEncoding(String),

    #[error("Base64 预计解码体积过大：{actual} 字节（限制：{limit} 字节）")]
    PayloadTooLarge { actual: u64, limit: u64 },
}
