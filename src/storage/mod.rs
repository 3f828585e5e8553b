//! # 落盘模块（storage）
//!
//! ## 设计思路
//!
//! 把“写到哪里、叫什么名字”从转换流程中拆出来，作为两个可注入的协作者：
//! - `ImageStore`：可写性检查 + 路径规范化 + 新建文件写入（默认 `DiskStore`）
//! - `NameGenerator`：一次转换内唯一的文件名（默认 `TimestampNameGenerator`）

mod disk;
mod error;
mod naming;

pub use disk::{DiskStore, ImageStore, WrittenFile, ensure_trailing_slash, normalize_dir};
pub use error::WriteError;
pub use naming::{NameGenerator, TimestampNameGenerator};
