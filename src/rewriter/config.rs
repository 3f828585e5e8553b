//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有可调策略集中到 `ConvertConfig`：目标目录、对外 URL 前缀、单图体积上限、
//! 文件名前缀与输出模式。`Default` 提供可直接使用的配置，
//! 所有字段都带 `#[serde(default)]`，可以只从 JSON 中覆盖部分字段。

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// 输出模式。
///
/// - `Patch`：在原始 HTML 字符串上做文本替换，未涉及的格式逐字节保留
/// - `Document`：序列化修改后的解析树，以解析树为唯一来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Patch,
    Document,
}

impl OutputMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Document => "document",
        }
    }
}

/// 转换配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// 图片写入目录。
    pub disk_path: String,
    /// `disk_path` 对外可访问的 URL 前缀。
    pub url_path: String,
    /// 单张图片解码后的体积上限（字节）。
    pub max_payload_bytes: u64,
    /// 目录不存在时是否自动创建。
    pub create_missing_dir: bool,
    /// 生成文件名的前缀。
    pub name_prefix: String,
    pub output_mode: OutputMode,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            disk_path: "images".to_string(),
            url_path: "/images".to_string(),
            max_payload_bytes: 50 * 1024 * 1024,
            create_missing_dir: false,
            name_prefix: "img".to_string(),
            output_mode: OutputMode::Patch,
        }
    }
}

impl ConvertConfig {
    /// 从 JSON 读取配置，缺省字段使用默认值，读取后立即校验。
    ///
    /// # 示例
    /// ```rust
    /// use datauri_extract::ConvertConfig;
    ///
    /// let config = ConvertConfig::from_json(r#"{ "disk_path": "/tmp/out", "url_path": "/files" }"#)?;
    /// assert_eq!(config.name_prefix, "img");
    /// # Ok::<(), datauri_extract::ConvertError>(())
    /// ```
    pub fn from_json(content: &str) -> Result<Self, ConvertError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.disk_path.trim().is_empty() {
            return Err(ConvertError::InvalidConfig("disk_path 不能为空".to_string()));
        }
        if self.max_payload_bytes == 0 {
            return Err(ConvertError::InvalidConfig("max_payload_bytes 必须大于 0".to_string()));
        }
        if self.name_prefix.contains(['/', '\\']) {
            return Err(ConvertError::InvalidConfig("name_prefix 不能包含路径分隔符".to_string()));
        }
        Ok(())
    }
}
