use serde::{Deserialize, Serialize};

use crate::style::NormalizedStyle;

/// 提取出的文本图层
///
/// 每个符合条件的文本节点对应且仅对应一条记录。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAsset {
    /// 节点 ID（回写时的匹配键）
    pub id: String,
    /// 图层名
    pub name: String,
    pub page_name: String,
    /// 固定列数的层级路径
    pub frame_path: Vec<String>,
    /// 文本内容（换行已替换为换行标记）
    pub characters: String,
    #[serde(flatten)]
    pub style: NormalizedStyle,
}

impl TextAsset {
    /// 第 `level` 层（从 0 开始）的 Frame 名
    pub fn frame(&self, level: usize) -> &str {
        self.frame_path.get(level).map(String::as_str).unwrap_or("")
    }
}

/// 回写请求（来自表格的一行）
///
/// 空单元格记为 `None`，由回写器计为跳过而非失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// 数据行号（从 1 开始，不含表头）
    pub row: usize,
    pub id: Option<String>,
    pub new_text: Option<String>,
}

impl UpdateRequest {
    pub fn new(row: usize, id: Option<String>, new_text: Option<String>) -> Self {
        Self {
            row,
            id: id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()),
            new_text: new_text.filter(|text| !text.is_empty()),
        }
    }

    /// 是否会被跳过（缺 ID 或缺文本）
    pub fn is_skip(&self) -> bool {
        self.id.is_none() || self.new_text.is_none()
    }
}
