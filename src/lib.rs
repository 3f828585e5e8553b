//! # 内联图片提取工具 — 库入口
//!
//! 将 HTML 中 `data:image/...;base64,...` 形式的内联图片解码落盘，
//! 并把 `<img src>` 改写为指向新文件的地址。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  rewriter ──── DocumentRewriter / convert()              │
//! │     │          解析 HTML (tl) · 逐个 <img> · 改写引用    │
//! │     ├─────────────┬──────────────────────┐               │
//! │     ↓             ↓                      ↓               │
//! │  data_uri      storage                error              │
//! │  分类·解码      可写检查·落盘·命名       ConvertError      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`data_uri`] | 解析单个 `src`，提取图片子类型与 Base64 payload，按需解码 |
//! | [`storage`] | 目录可写性检查、路径规范化、新建文件写入、唯一文件名生成 |
//! | [`rewriter`] | 编排整份 HTML 的转换，单张失败只跳过 |
//! | [`error`] | 统一错误类型 `ConvertError` |

pub mod data_uri;
pub mod error;
pub mod rewriter;
pub mod storage;

pub use error::ConvertError;
pub use rewriter::{ConvertConfig, ConvertReport, DocumentRewriter, OutputMode, convert};
