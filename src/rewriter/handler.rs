//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `DocumentRewriter` 只负责流程编排，解析、解码、落盘分别委托给
//! `data_uri`、`storage` 与 `tl`。处理链路固定为：
//! 1. 解析 HTML，按文档顺序收集 `<img>` 节点
//! 2. 逐个读取 `src` 并分类，非内联图片直接跳过
//! 3. 生成唯一文件名、解码、落盘
//! 4. 同步修改解析树中的 `src` 与工作 HTML 字符串
//!
//! ## 实现思路
//!
//! - 单张图片的任何失败（形状、解码、落盘）只跳过该图片并记录原因，不中断整份文档。
//! - 同一 data URI 在文档中出现多次时只落盘一次，后续引用复用同一个文件。
//! - 记录总耗时与各类计数，便于诊断。

use std::collections::HashMap;
use std::time::Instant;

use crate::data_uri::{DataImageReference, DecodeError, PREFIX_LEN};
use crate::error::ConvertError;
use crate::storage::{
    DiskStore, ImageStore, NameGenerator, TimestampNameGenerator, ensure_trailing_slash,
    normalize_dir,
};

use super::{ConvertConfig, ConvertReport, OutputMode, SkippedImage, Substitution};

/// HTML 内联图片转换器。
pub struct DocumentRewriter<S = DiskStore, N = TimestampNameGenerator> {
    config: ConvertConfig,
    store: S,
    names: N,
}

impl DocumentRewriter {
    /// 使用本地磁盘与时间戳文件名创建转换器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use datauri_extract::{ConvertConfig, DocumentRewriter};
    ///
    /// let rewriter = DocumentRewriter::new(ConvertConfig {
    ///     disk_path: "/var/www/uploads".into(),
    ///     url_path: "/uploads".into(),
    ///     ..ConvertConfig::default()
    /// })?;
    /// let html = rewriter.convert(r#"<img src="data:image/png;base64,AAAA">"#);
    /// # Ok::<(), datauri_extract::ConvertError>(())
    /// ```
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        let store = DiskStore::new().create_missing_dir(config.create_missing_dir);
        let names = TimestampNameGenerator::new(config.name_prefix.clone());
        Self::with_parts(config, store, names)
    }
}

impl<S, N> DocumentRewriter<S, N>
where
    S: ImageStore,
    N: NameGenerator,
{
    /// 注入自定义的存储与命名协作者。
    pub fn with_parts(config: ConvertConfig, store: S, names: N) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            names,
        })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// 转换入口：返回改写后的 HTML。
    ///
    /// 从不失败；HTML 本身无法解析时原样返回输入。
    pub fn convert(&self, html: &str) -> String {
        match self.convert_with_report(html) {
            Ok((output, _)) => output,
            Err(err) => {
                log::warn!("⚠️ HTML 转换失败，返回原始内容: {}", err);
                html.to_string()
            }
        }
    }

    /// 转换入口：同时返回本次转换的摘要。
    ///
    /// 仅当整份 HTML 无法解析时返回 `Err`；单张图片的失败记录在 `ConvertReport::skipped` 中。
    pub fn convert_with_report(&self, html: &str) -> Result<(String, ConvertReport), ConvertError> {
        let total_start = Instant::now();
        let disk_path = normalize_dir(&self.config.disk_path);
        let url_path = ensure_trailing_slash(&self.config.url_path);

        let mut dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|e| ConvertError::Html(format!("{:?}", e)))?;

        let images = img_indices(&dom);

        let mut output = html.to_string();
        let mut report = ConvertReport {
            images_seen: images.len(),
            ..ConvertReport::default()
        };
        let mut written: HashMap<String, Substitution> = HashMap::new();

        for (index, node_index) in images.into_iter().enumerate() {
            let Some((src_key, src)) = read_src(&dom, node_index) else {
                continue;
            };
            let src_prefix: String = src.chars().take(PREFIX_LEN).collect();

            let reference = match DataImageReference::parse(&src) {
                Ok(reference) if reference.is_data_image() => reference,
                Ok(_) => continue,
                Err(err) => {
                    skip(&mut report, index, src_prefix, err.into());
                    continue;
                }
            };

            let substitution = match written.get(&src).cloned() {
                Some(previous) => Substitution {
                    index,
                    reused: true,
                    ..previous
                },
                None => match self.persist(index, &reference, &disk_path, &url_path) {
                    Ok(substitution) => {
                        written.insert(src.clone(), substitution.clone());
                        substitution
                    }
                    Err(err) => {
                        skip(&mut report, index, src_prefix, err);
                        continue;
                    }
                },
            };

            if let Err(err) = write_src(&mut dom, html, node_index, &src_key, &substitution.new_src) {
                skip(&mut report, index, src_prefix, err);
                continue;
            }
            output = replace_attribute_value(&output, &src, &substitution.new_src);

            log::debug!("🔁 第 {} 张图片已替换为 {}", index, substitution.new_src);
            report.substitutions.push(substitution);
        }

        let output = match self.config.output_mode {
            OutputMode::Document if !report.substitutions.is_empty() => dom.outer_html(),
            _ => output,
        };

        log::info!(
            "✅ HTML 图片转换完成 - images={} replaced={} written={} skipped={} mode={} total={}ms",
            report.images_seen,
            report.substitutions.len(),
            report.files_written(),
            report.skipped.len(),
            self.config.output_mode.as_str(),
            total_start.elapsed().as_millis()
        );

        Ok((output, report))
    }

    /// 解码并落盘单张图片，返回新的引用地址。
    fn persist(
        &self,
        index: usize,
        reference: &DataImageReference,
        disk_path: &str,
        url_path: &str,
    ) -> Result<Substitution, ConvertError> {
        let subtype = reference.image_subtype().ok_or(DecodeError::NotADataImage)?;
        let base_name = self.names.next_name();
        let bytes = reference.decode_with_limit(self.config.max_payload_bytes)?;
        if bytes.is_empty() {
            return Err(DecodeError::InvalidEncoding("payload 为空，不写入空文件".to_string()).into());
        }
        let file = self.store.write(disk_path, &base_name, subtype, &bytes)?;

        Ok(Substitution {
            index,
            new_src: format!("{}{}", url_path, file.file_name),
            full_path: file.full_path,
            bytes_written: bytes.len(),
            reused: false,
        })
    }
}

fn skip(report: &mut ConvertReport, index: usize, src_prefix: String, reason: ConvertError) {
    log::warn!("⏭️ 跳过第 {} 张图片（{}...）: {}", index, src_prefix, reason);
    report.skipped.push(SkippedImage {
        index,
        src_prefix,
        reason,
    });
}

/// 按文档顺序收集 `<img>` 节点下标；HTML 标签名不区分大小写。
fn img_indices(dom: &tl::VDom<'_>) -> Vec<usize> {
    dom.nodes()
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let tag = node.as_tag()?;
            tag.name()
                .as_utf8_str()
                .eq_ignore_ascii_case("img")
                .then_some(index)
        })
        .collect()
}

/// 返回 `(属性名原文, 属性值)`；属性名不区分大小写，无值的 `src` 视为缺失。
fn read_src(dom: &tl::VDom<'_>, node_index: usize) -> Option<(String, String)> {
    let tag = dom.nodes().get(node_index)?.as_tag()?;
    tag.attributes().iter().find_map(|(key, value)| {
        if !key.eq_ignore_ascii_case("src") {
            return None;
        }
        value.map(|value| (key.into_owned(), value.into_owned()))
    })
}

fn write_src<'a>(
    dom: &mut tl::VDom<'a>,
    html: &'a str,
    node_index: usize,
    src_key: &str,
    new_src: &str,
) -> Result<(), ConvertError> {
    // `tl` 按内容查找属性名，但要求键与文档同生命周期：从输入中借出同内容的切片
    let key = html
        .find(src_key)
        .map(|at| &html[at..at + src_key.len()])
        .ok_or_else(|| ConvertError::Html(format!("输入中找不到属性名 {}", src_key)))?;

    let tag = dom
        .nodes_mut()
        .get_mut(node_index)
        .and_then(|node| node.as_tag_mut())
        .ok_or_else(|| ConvertError::Html("img 节点已失效".to_string()))?;

    let src = tag
        .attributes_mut()
        .get_mut(key)
        .flatten()
        .ok_or_else(|| ConvertError::Html("img 缺少 src 属性".to_string()))?;

    src.set(new_src.as_bytes())
        .map_err(|e| ConvertError::Html(format!("更新 src 属性失败: {:?}", e)))?;
    Ok(())
}

/// 只替换作为完整属性值出现的 `value`（引号包围，或无引号且后接空白/`>`），
/// 避免一个 data URI 是另一个的前缀时误改后者。
fn replace_attribute_value(html: &str, value: &str, replacement: &str) -> String {
    let mut patched = String::with_capacity(html.len());
    let mut copied_until = 0;

    for (start, _) in html.match_indices(value) {
        let end = start + value.len();
        if !is_whole_attribute_value(html, start, end) {
            continue;
        }
        patched.push_str(&html[copied_until..start]);
        patched.push_str(replacement);
        copied_until = end;
    }

    patched.push_str(&html[copied_until..]);
    patched
}

fn is_whole_attribute_value(html: &str, start: usize, end: usize) -> bool {
    let before = html[..start].chars().next_back();
    let after = html[end..].chars().next();
    match before {
        Some(quote @ ('"' | '\'')) => after == Some(quote),
        Some('=') => after.is_none_or(|c| c.is_ascii_whitespace() || c == '>'),
        _ => false,
    }
}
