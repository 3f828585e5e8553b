//! # Data URI 编解码模块（data_uri）
//!
//! ## 设计思路
//!
//! 只做两件事：判断一个 `src` 字符串是不是内联图片，以及按需把 payload 解码为字节。
//! 每次解析都返回一个不可变的 [`DataImageReference`]，不存在跨调用共享的可变状态。
//!
//! - `reference`：分类、形状校验与解码
//! - `error`：`ParseError` / `DecodeError`

mod error;
mod reference;

pub use error::{DecodeError, ParseError};
pub use reference::{DATA_IMAGE_MARKER, DataImageReference, PREFIX_LEN};
