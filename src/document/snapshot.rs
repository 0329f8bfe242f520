/// 宿主导出的文档快照格式
///
/// 快照是嵌套的 JSON 树，每个节点带 `type` / `id` / `name` / `visible` / `children`，
/// 其余属性（文本内容、字体、填充、几何信息等）原样保存在 `attributes` 中，
/// 回写时除 `characters` 外一律不改动。
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 文档快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub pages: Vec<SnapshotNode>,
    /// 当前选中的节点 ID（为空表示整文档模式）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<String>,
}

/// 快照中的单个节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible", skip_serializing_if = "is_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

fn default_visible() -> bool {
    true
}

fn is_visible(visible: &bool) -> bool {
    *visible
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
