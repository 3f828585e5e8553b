/// 落盘错误。
///
/// 两种失败都会原样返回给调用方；失败的写入不做残留文件清理。
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// 写入前的可写性检查未通过。
    #[error("路径 ({path}) 不可写：{reason}。这很可能是权限问题")]
    PathNotWritable { path: String, reason: String },

    /// 检查通过但实际写入失败（磁盘已满、检查后目录被改动、文件已存在等）。
    #[error("写入图片失败（{path}）：{source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
