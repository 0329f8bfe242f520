use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::SyncError;

/// 默认层级路径深度（Frame 1 .. Frame 5）
pub const DEFAULT_FRAME_DEPTH: usize = 5;
/// 超出深度的层级名连接符
pub const DEFAULT_PATH_SEPARATOR: &str = " / ";
/// 表格中代表换行的标记
pub const DEFAULT_LINE_BREAK_TOKEN: &str = "<br>";

/// 提取配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    /// 层级路径列数
    pub frame_depth: usize,
    pub path_separator: String,
    pub line_break_token: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            frame_depth: DEFAULT_FRAME_DEPTH,
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            line_break_token: DEFAULT_LINE_BREAK_TOKEN.to_string(),
        }
    }
}

impl ExtractOptions {
    /// 实际使用的深度（至少 1 列）
    pub fn depth(&self) -> usize {
        self.frame_depth.max(1)
    }
}

/// 回写后的校验策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// 信任宿主的修改调用
    #[default]
    TrustMutation,
    /// 修改后重新读取节点文本确认
    ReadBack,
}

/// 回写配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconcileOptions {
    pub verify: VerifyPolicy,
    pub line_break_token: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            verify: VerifyPolicy::default(),
            line_break_token: DEFAULT_LINE_BREAK_TOKEN.to_string(),
        }
    }
}

/// 配置文件
///
/// ```json
/// {
///   "extract": { "frameDepth": 3, "pathSeparator": " > " },
///   "reconcile": { "verify": "read_back" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub extract: ExtractOptions,
    pub reconcile: ReconcileOptions,
}

impl SyncConfig {
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
