use thiserror::Error;
use std::path::Path;

use crate::host::HostError;
use crate::table::TableError;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 实例派生节点 ID 中使用的保留分隔符
pub const INSTANCE_ID_SEPARATOR: char = ';';

/// 检查 ID 是否为实例派生（不可回写）节点
pub fn is_instance_derived_id(id: &str) -> bool {
    id.contains(INSTANCE_ID_SEPARATOR)
}

/// 将换行替换为表格中可见的换行标记（如 `<br>`）
pub fn encode_line_breaks(text: &str, token: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', token)
}

/// 将换行标记还原为换行符
pub fn decode_line_breaks(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    text.replace(token, "\n")
}

/// 数值格式化：整数不带小数点，非有限值输出空串
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    // 避免输出 "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{}", value)
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// 创建文件备份
pub fn create_backup(file_path: &Path) -> Result<std::path::PathBuf, SyncError> {
    if !file_path.exists() {
        return Err(SyncError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在"
        )));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let backup_path = file_path.with_extension(format!("{}.bak", timestamp));

    std::fs::copy(file_path, &backup_path)
        .map_err(SyncError::IoError)?;

    Ok(backup_path)
}
