//! # 内联图片引用
//!
//! ## 设计思路
//!
//! 分类只看前 [`PREFIX_LEN`] 个字符是否包含 `data:image`，与完整形状校验分离：
//! - 不含标记：普通图片地址，返回 `is_data_image == false`，从不报错。
//! - 含标记：用一条预编译正则（命名捕获组）一次性提取子类型与 payload，
//!   形状不符直接返回 `ParseError`，不做猜测。
//!
//! ## 实现思路
//!
//! - 子类型与 payload 放在同一个 `Option<InlineImage>` 中，二者只能同时存在或同时缺失。
//! - 解码使用标准字母表，padding 可有可无；payload 中的 ASCII 空白（折行）会被忽略。
//! - 解码前先按长度计算解码后体积，超限直接失败，避免无谓的内存分配。

use std::borrow::Cow;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{DecodeError, ParseError};

/// 分类时检查的前缀长度（字符数），足以容纳 `data:image` 及少量前导空白。
pub const PREFIX_LEN: usize = 14;

/// 内联图片标记。
pub const DATA_IMAGE_MARKER: &str = "data:image";

/// `data:image/<subtype>[;param]*;base64,<payload>`
static DATA_IMAGE_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^data:image/(?P<subtype>[A-Za-z0-9][A-Za-z0-9.+\-]*)(?:;[^;,]*)*;(?i:base64),(?P<payload>.*)$",
    )
    .unwrap()
});

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
struct InlineImage {
    subtype: String,
    payload: String,
}

/// 对单个 `src` 字符串的一次解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataImageReference {
    raw_prefix: String,
    image: Option<InlineImage>,
}

impl DataImageReference {
    /// 解析 `src`。
    ///
    /// # 返回
    /// - `Ok(ref)` 且 `ref.is_data_image() == false`：不是内联图片
    /// - `Ok(ref)` 且 `ref.is_data_image() == true`：子类型与 payload 均已提取
    /// - `Err(ParseError::Malformed)`：带有 `data:image` 标记但形状不完整
    ///
    /// # 示例
    /// ```rust
    /// use datauri_extract::data_uri::DataImageReference;
    ///
    /// let reference = DataImageReference::parse("data:image/png;base64,AAAA")?;
    /// assert_eq!(reference.image_subtype(), Some("png"));
    /// assert_eq!(reference.base64_payload(), Some("AAAA"));
    /// # Ok::<(), datauri_extract::data_uri::ParseError>(())
    /// ```
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let raw_prefix = classification_prefix(src).to_string();

        if !raw_prefix.contains(DATA_IMAGE_MARKER) {
            return Ok(Self {
                raw_prefix,
                image: None,
            });
        }

        let uri = src.trim();
        let Some(captures) = DATA_IMAGE_URI.captures(uri) else {
            return Err(ParseError::Malformed {
                reason: shape_error_reason(uri),
                prefix: raw_prefix,
            });
        };

        let image = InlineImage {
            subtype: captures["subtype"].to_string(),
            payload: captures["payload"].to_string(),
        };

        Ok(Self {
            raw_prefix,
            image: Some(image),
        })
    }

    /// 用于分类的原始前缀。
    pub fn raw_prefix(&self) -> &str {
        &self.raw_prefix
    }

    pub fn is_data_image(&self) -> bool {
        self.image.is_some()
    }

    /// MIME 中 `image/` 之后的部分，例如 `png`、`svg+xml`。
    pub fn image_subtype(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.subtype.as_str())
    }

    pub fn base64_payload(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.payload.as_str())
    }

    /// 将 payload 解码为二进制，不限制体积。
    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        self.decode_with_limit(u64::MAX)
    }

    /// 将 payload 解码为二进制，解码后体积超过 `max_bytes` 时失败。
    pub fn decode_with_limit(&self, max_bytes: u64) -> Result<Vec<u8>, DecodeError> {
        let image = self.image.as_ref().ok_or(DecodeError::NotADataImage)?;

        let compact = strip_ascii_whitespace(&image.payload);
        if compact.is_empty() {
            return Ok(Vec::new());
        }

        let expected = decoded_len_hint(&compact);
        if expected > max_bytes {
            return Err(DecodeError::PayloadTooLarge {
                actual: expected,
                limit: max_bytes,
            });
        }

        PAYLOAD_ENGINE
            .decode(compact.as_bytes())
            .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))
    }
}

/// 取前 `PREFIX_LEN` 个字符，保证不切断 UTF-8 字符。
fn classification_prefix(src: &str) -> &str {
    match src.char_indices().nth(PREFIX_LEN) {
        Some((end, _)) => &src[..end],
        None => src,
    }
}

/// 给形状错误一个可读的原因，便于日志定位。
fn shape_error_reason(uri: &str) -> &'static str {
    let Some((mime, rest)) = uri.split_once(';') else {
        if uri.contains(',') {
            return "不是 base64 编码的 data URI";
        }
        return "缺少 ';' 分隔符";
    };
    if !mime.contains('/') {
        return "缺少 '/' 分隔符";
    }
    if !rest.contains(',') {
        return "缺少 ',' 分隔符";
    }
    if !rest.to_ascii_lowercase().contains("base64,") {
        return "缺少 base64 编码标记";
    }
    "图片子类型为空或包含非法字符"
}

fn strip_ascii_whitespace(payload: &str) -> Cow<'_, str> {
    if !payload.bytes().any(|b| b.is_ascii_whitespace()) {
        return Cow::Borrowed(payload);
    }
    Cow::Owned(
        payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect(),
    )
}

/// 按 Base64 长度推算解码后的字节数（对合法输入是精确值）。
fn decoded_len_hint(payload: &str) -> u64 {
    let significant = payload.trim_end_matches('=').len() as u64;
    let tail = match significant % 4 {
        2 => 1,
        3 => 2,
        _ => 0,
    };
    (significant / 4).saturating_mul(3).saturating_add(tail)
}
