//! # 本地磁盘写入
//!
//! ## 实现思路
//!
//! - 写入前先做可写性检查（存在、是目录、非只读），失败返回 `PathNotWritable`。
//! - 目录与文件名直接拼接后折叠重复的 `/`。
//! - 使用 `create_new` 打开文件，同名文件已存在时失败而不是覆盖；
//!   文件名唯一性由调用方的 `NameGenerator` 保证。

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::WriteError;

/// 一次成功写入的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    /// `<唯一名>.<子类型>`
    pub file_name: String,
    /// 规范化后的目录 + `file_name`
    pub full_path: PathBuf,
}

/// 图片落盘抽象，方便测试注入与替换存储后端。
pub trait ImageStore {
    /// 将 `bytes` 写入 `dir` 下名为 `<base_name>.<subtype>` 的新文件。
    fn write(
        &self,
        dir: &str,
        base_name: &str,
        subtype: &str,
        bytes: &[u8],
    ) -> Result<WrittenFile, WriteError>;
}

/// 写入本地文件系统。
#[derive(Debug, Clone, Default)]
pub struct DiskStore {
    create_missing_dir: bool,
}

impl DiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目录不存在时是否自动创建（默认关闭：不存在即视为不可写）。
    pub fn create_missing_dir(mut self, enabled: bool) -> Self {
        self.create_missing_dir = enabled;
        self
    }
}

impl ImageStore for DiskStore {
    fn write(
        &self,
        dir: &str,
        base_name: &str,
        subtype: &str,
        bytes: &[u8],
    ) -> Result<WrittenFile, WriteError> {
        // 空目录会被规范化成根目录 `/`
        if dir.trim().is_empty() {
            return Err(WriteError::PathNotWritable {
                path: dir.to_string(),
                reason: "目录为空".to_string(),
            });
        }
        let dir = normalize_dir(dir);

        if self.create_missing_dir && !Path::new(&dir).exists() {
            fs::create_dir_all(&dir).map_err(|e| WriteError::PathNotWritable {
                path: dir.clone(),
                reason: format!("创建目录失败：{}", e),
            })?;
            log::info!("📁 已创建图片目录：{}", dir);
        }

        check_writable(&dir)?;

        let file_name = format!("{}.{}", base_name, subtype);
        let full_path = PathBuf::from(collapse_separators(&format!("{}{}", dir, file_name)));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => WriteError::PathNotWritable {
                    path: dir.clone(),
                    reason: e.to_string(),
                },
                _ => WriteError::WriteFailed {
                    path: full_path.to_string_lossy().to_string(),
                    source: e,
                },
            })?;

        file.write_all(bytes).map_err(|e| WriteError::WriteFailed {
            path: full_path.to_string_lossy().to_string(),
            source: e,
        })?;

        log::debug!("💾 已写入 {}（{} 字节）", full_path.display(), bytes.len());

        Ok(WrittenFile {
            file_name,
            full_path,
        })
    }
}

fn check_writable(dir: &str) -> Result<(), WriteError> {
    let not_writable = |reason: String| WriteError::PathNotWritable {
        path: dir.to_string(),
        reason,
    };

    let metadata = fs::metadata(dir).map_err(|e| not_writable(format!("无法读取目录信息：{}", e)))?;
    if !metadata.is_dir() {
        return Err(not_writable("不是目录".to_string()));
    }
    if metadata.permissions().readonly() {
        return Err(not_writable("目录为只读".to_string()));
    }
    Ok(())
}

/// 保证以单个 `/` 结尾，并折叠拼接产生的重复分隔符。
pub fn normalize_dir(path: &str) -> String {
    collapse_separators(&ensure_trailing_slash(path))
}

/// 只补齐结尾的 `/`，不改动其余部分（URL 中的 `//` 需要保留）。
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_was_slash = false;
    for c in path.chars() {
        let is_slash = c == '/';
        if !(is_slash && previous_was_slash) {
            collapsed.push(c);
        }
        previous_was_slash = is_slash;
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_dir_adds_single_trailing_slash() {
        assert_eq!(normalize_dir("/tmp/out"), "/tmp/out/");
        assert_eq!(normalize_dir("/tmp/out/"), "/tmp/out/");
        assert_eq!(normalize_dir("/tmp//out//"), "/tmp/out/");
        assert_eq!(normalize_dir("relative"), "relative/");
    }

    #[test]
    fn ensure_trailing_slash_keeps_scheme_separator() {
        assert_eq!(ensure_trailing_slash("https://cdn.example.com/files"), "https://cdn.example.com/files/");
        assert_eq!(ensure_trailing_slash("/files/"), "/files/");
        assert_eq!(ensure_trailing_slash(""), "/");
    }

    #[test]
    fn write_creates_file_with_subtype_extension() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let dir_str = dir.path().to_string_lossy().to_string();

        let written = DiskStore::new()
            .write(&dir_str, "abc", "png", &[1, 2, 3])
            .expect("write should succeed");

        assert_eq!(written.file_name, "abc.png");
        assert_eq!(written.full_path, dir.path().join("abc.png"));
        assert_eq!(fs::read(&written.full_path).expect("read back failed"), vec![1, 2, 3]);
    }

    #[test]
    fn write_collapses_doubled_separators() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let doubled = format!("{}//", dir.path().to_string_lossy());

        let written = DiskStore::new()
            .write(&doubled, "x", "gif", b"GIF89a")
            .expect("write should succeed");

        assert!(!written.full_path.to_string_lossy().contains("//"));
        assert!(written.full_path.exists());
    }

    #[test]
    fn write_rejects_missing_dir() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let missing = dir.path().join("missing").to_string_lossy().to_string();

        let result = DiskStore::new().write(&missing, "abc", "png", &[1]);

        assert!(matches!(result, Err(WriteError::PathNotWritable { .. })));
    }

    #[test]
    fn write_rejects_blank_dir() {
        for blank in ["", "   "] {
            let result = DiskStore::new().create_missing_dir(true).write(blank, "abc", "png", &[1]);
            assert!(matches!(result, Err(WriteError::PathNotWritable { .. })));
        }
    }

    #[test]
    fn write_rejects_file_as_dir() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let file_path = dir.path().join("plain.txt");
        fs::write(&file_path, "x").expect("seed file failed");

        let result = DiskStore::new().write(&file_path.to_string_lossy(), "abc", "png", &[1]);

        assert!(matches!(result, Err(WriteError::PathNotWritable { .. })));
    }

    #[test]
    fn write_creates_missing_dir_when_enabled() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let nested = dir.path().join("a").join("b");

        let written = DiskStore::new()
            .create_missing_dir(true)
            .write(&nested.to_string_lossy(), "abc", "jpeg", &[9])
            .expect("write should succeed");

        assert_eq!(written.full_path, nested.join("abc.jpeg"));
    }

    #[test]
    fn write_never_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let dir_str = dir.path().to_string_lossy().to_string();
        let store = DiskStore::new();

        store.write(&dir_str, "same", "png", &[1]).expect("first write should succeed");
        let result = store.write(&dir_str, "same", "png", &[2]);

        assert!(matches!(result, Err(WriteError::WriteFailed { .. })));
        assert_eq!(fs::read(dir.path().join("same.png")).expect("read back failed"), vec![1]);
    }

    #[cfg(unix)]
    #[test]
    fn write_rejects_read_only_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("create temp dir failed");
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).expect("create locked dir failed");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).expect("chmod failed");

        let result = DiskStore::new().write(&locked.to_string_lossy(), "abc", "png", &[1]);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore chmod failed");
        assert!(matches!(result, Err(WriteError::PathNotWritable { .. })));
    }
}
