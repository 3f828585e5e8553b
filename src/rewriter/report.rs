//! 单次转换的结果摘要：替换了哪些图片、跳过了哪些以及原因。

use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConvertError;

/// 一次成功的引用替换。
#[derive(Debug, Clone, Serialize)]
pub struct Substitution {
    /// `<img>` 在文档中的序号（从 0 开始）。
    pub index: usize,
    pub new_src: String,
    pub full_path: PathBuf,
    pub bytes_written: usize,
    /// 同一 data URI 在本次转换中已落盘过，直接复用了之前的文件。
    pub reused: bool,
}

/// 一张被跳过的图片；元素与 HTML 均保持原样。
#[derive(Debug, Serialize)]
pub struct SkippedImage {
    pub index: usize,
    /// 原始 src 的分类前缀。
    pub src_prefix: String,
    pub reason: ConvertError,
}

#[derive(Debug, Default, Serialize)]
pub struct ConvertReport {
    /// 文档中 `<img>` 元素总数。
    pub images_seen: usize,
    pub substitutions: Vec<Substitution>,
    pub skipped: Vec<SkippedImage>,
}

impl ConvertReport {
    /// 本次新写入的文件数（不含复用）。
    pub fn files_written(&self) -> usize {
        self.substitutions.iter().filter(|s| !s.reused).count()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
