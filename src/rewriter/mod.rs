//! # HTML 改写模块（rewriter）
//!
//! ## 设计思路
//!
//! 该模块把“解析 HTML → 识别内联图片 → 落盘 → 改写引用”串成一次转换。
//!
//! - `config`：转换配置与输出模式
//! - `handler`：`DocumentRewriter`，编排整条流程
//! - `report`：单次转换摘要（替换/跳过明细）
//!
//! ## 新同事快速上手
//!
//! ```text
//! convert(html, disk_path, url_path)
//!    ↓
//! DocumentRewriter::convert_with_report
//!    ├─ tl::parse + query_selector("img")
//!    ├─ DataImageReference::parse / decode_with_limit（data_uri）
//!    ├─ NameGenerator::next_name + ImageStore::write（storage）
//!    └─ 同步改写解析树 src 与 HTML 字符串
//!    ↓
//! 返回 HTML（单张失败只跳过，不中断）
//! ```

mod config;
mod handler;
mod report;

pub use config::{ConvertConfig, OutputMode};
pub use handler::DocumentRewriter;
pub use report::{ConvertReport, SkippedImage, Substitution};

/// 便捷入口：将 `html` 中的内联图片写入 `disk_path`，并把引用改为 `url_path` 下的文件地址。
///
/// 从不失败：配置无效或 HTML 无法解析时原样返回输入，单张图片失败时保留该图片原样。
///
/// # 示例
/// ```rust,no_run
/// let html = datauri_extract::convert(
///     r#"<img src="data:image/png;base64,AAAA">"#,
///     "/tmp/out",
///     "/files",
/// );
/// assert!(html.starts_with(r#"<img src="/files/"#));
/// ```
pub fn convert(html: &str, disk_path: &str, url_path: &str) -> String {
    let config = ConvertConfig {
        disk_path: disk_path.to_string(),
        url_path: url_path.to_string(),
        ..ConvertConfig::default()
    };

    match DocumentRewriter::new(config) {
        Ok(rewriter) => rewriter.convert(html),
        Err(err) => {
            log::warn!("⚠️ 转换配置无效，返回原始内容: {}", err);
            html.to_string()
        }
    }
}
