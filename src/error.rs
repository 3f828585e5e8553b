//! 统一错误类型模块
//!
//! # 设计思路
//!
//! `ConvertError` 汇总转换链路上的所有错误来源：
//! 解析（`ParseError`）、解码（`DecodeError`）、落盘（`WriteError`），
//! 以及只会出现在整份文档层面的 HTML 解析失败与配置错误。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息，`#[from]` 让单张图片的处理链可以直接 `?`。
//! - 实现 `Serialize`，将错误序列化为字符串，便于随 `ConvertReport` 输出为 JSON。

use serde::Serialize;

use crate::data_uri::{DecodeError, ParseError};
use crate::storage::WriteError;

/// 转换链路统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// HTML 解析器拒绝了输入
    #[error("HTML 解析失败: {0}")]
    Html(String),

    /// 配置校验失败
    #[error("配置无效: {0}")]
    InvalidConfig(String),

    /// 配置 JSON 反序列化失败
    #[error("解析配置失败: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Write(#[from] WriteError),
}

impl Serialize for ConvertError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
