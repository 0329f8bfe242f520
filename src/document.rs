/// 文档树模块
///
/// 将宿主快照展开为扁平的节点数组（arena），父节点引用仅以下标保存，
/// 只用于向上查找（页面名、层级路径、是否位于组件实例内），不表达所有权。
///
/// - **text**: 文本节点属性与三态属性值
/// - **snapshot**: 快照的 JSON 格式
pub mod snapshot;
pub mod text;

use std::collections::HashMap;
use std::path::Path;
use serde_json::{Map, Value};

use crate::utils::{is_instance_derived_id, SyncError};
pub use snapshot::{Snapshot, SnapshotNode};
pub use text::{
    Attr, FontName, Geometry, LetterSpacing, LineHeight, Paint, Rgb, TextAlignHorizontal,
    TextAlignVertical, TextCase, TextDecoration, TextProps, MIXED_SENTINEL,
};

/// 节点在文档数组中的下标
pub type NodeIndex = usize;

/// 节点类型
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Page,
    Frame,
    Group,
    /// 组件实例
    Instance,
    /// 文本节点；属性无法读取时为 `None`
    Text(Option<TextProps>),
    /// 其他类型（保留原始类型名）
    Other(String),
}

impl NodeKind {
    fn from_snapshot(node: &SnapshotNode) -> Self {
        match node.node_type.to_ascii_uppercase().as_str() {
            "PAGE" => NodeKind::Page,
            "FRAME" => NodeKind::Frame,
            "GROUP" => NodeKind::Group,
            "INSTANCE" => NodeKind::Instance,
            "TEXT" => {
                let props = TextProps::from_attributes(&node.attributes);
                if props.is_none() {
                    tracing::warn!(id = %node.id, "文本节点缺少可读取的文本内容");
                }
                NodeKind::Text(props)
            }
            _ => NodeKind::Other(node.node_type.clone()),
        }
    }

    /// 是否为可遍历的容器（Frame / Group）
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Frame | NodeKind::Group)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }

    /// 快照中的类型名
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Page => "PAGE",
            NodeKind::Frame => "FRAME",
            NodeKind::Group => "GROUP",
            NodeKind::Instance => "INSTANCE",
            NodeKind::Text(_) => "TEXT",
            NodeKind::Other(name) => name,
        }
    }
}

/// 文档中的单个节点
#[derive(Debug, Clone)]
pub struct VisualNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub visible: bool,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    /// 快照中的原始属性（回写时保留）
    attributes: Map<String, Value>,
}

/// 文档（节点数组 + ID 索引）
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<VisualNode>,
    pages: Vec<NodeIndex>,
    index: HashMap<String, NodeIndex>,
    selection: Vec<String>,
}

impl Document {
    /// 从快照构建文档
    ///
    /// # 错误
    /// 节点 ID 为空或重复时返回 `InvalidSnapshot`
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SyncError> {
        let mut document = Document {
            selection: snapshot.selection,
            ..Default::default()
        };

        for page in snapshot.pages {
            let index = document.insert(page, None)?;
            document.pages.push(index);
        }

        tracing::debug!(
            pages = document.pages.len(),
            nodes = document.nodes.len(),
            "文档快照已加载"
        );

        Ok(document)
    }

    /// 递归插入节点，返回其下标
    fn insert(&mut self, node: SnapshotNode, parent: Option<NodeIndex>) -> Result<NodeIndex, SyncError> {
        if node.id.is_empty() {
            return Err(SyncError::InvalidSnapshot(format!(
                "节点缺少 id（名称: {:?}）",
                node.name
            )));
        }
        if self.index.contains_key(&node.id) {
            return Err(SyncError::InvalidSnapshot(format!("节点 id 重复: {}", node.id)));
        }

        let kind = NodeKind::from_snapshot(&node);
        let index = self.nodes.len();
        self.index.insert(node.id.clone(), index);
        self.nodes.push(VisualNode {
            id: node.id,
            name: node.name,
            kind,
            visible: node.visible,
            parent,
            children: Vec::with_capacity(node.children.len()),
            attributes: node.attributes,
        });

        for child in node.children {
            let child_index = self.insert(child, Some(index))?;
            self.nodes[index].children.push(child_index);
        }

        Ok(index)
    }

    /// 转回快照（文本节点写入当前文本内容）
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            pages: self.pages.iter().map(|&page| self.snapshot_node(page)).collect(),
            selection: self.selection.clone(),
        }
    }

    fn snapshot_node(&self, index: NodeIndex) -> SnapshotNode {
        let node = &self.nodes[index];
        let mut attributes = node.attributes.clone();
        if let NodeKind::Text(Some(props)) = &node.kind {
            attributes.insert("characters".to_string(), Value::String(props.characters.clone()));
        }

        SnapshotNode {
            id: node.id.clone(),
            node_type: node.kind.type_name().to_string(),
            name: node.name.clone(),
            visible: node.visible,
            children: node.children.iter().map(|&child| self.snapshot_node(child)).collect(),
            attributes,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Self::from_snapshot(Snapshot::from_json(json)?)
    }

    pub fn from_json_value(value: Value) -> Result<Self, SyncError> {
        Self::from_snapshot(serde_json::from_value(value)?)
    }

    /// 从文件加载快照
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 写入快照文件
    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_snapshot().to_json_pretty()?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: NodeIndex) -> &VisualNode {
        &self.nodes[index]
    }

    pub fn pages(&self) -> &[NodeIndex] {
        &self.pages
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Vec<String>) {
        self.selection = selection;
    }

    /// 按 ID 查找节点
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// 向上遍历祖先（由近到远，不含自身）
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.nodes[index].parent,
        }
    }

    /// 所在页面
    pub fn page_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.ancestors(index)
            .find(|&ancestor| self.nodes[ancestor].kind == NodeKind::Page)
    }

    /// 是否位于组件实例内
    ///
    /// 实例派生 ID（含 `;`）同样视为实例内节点
    pub fn is_instance_descendant(&self, index: NodeIndex) -> bool {
        is_instance_derived_id(&self.nodes[index].id)
            || self
                .ancestors(index)
                .any(|ancestor| self.nodes[ancestor].kind == NodeKind::Instance)
    }

    /// 文本属性（非文本节点或属性不可读时为 `None`）
    pub fn text_props(&self, index: NodeIndex) -> Option<&TextProps> {
        match &self.nodes[index].kind {
            NodeKind::Text(props) => props.as_ref(),
            _ => None,
        }
    }

    pub fn text_props_mut(&mut self, index: NodeIndex) -> Option<&mut TextProps> {
        match &mut self.nodes[index].kind {
            NodeKind::Text(props) => props.as_mut(),
            _ => None,
        }
    }
}

/// 祖先迭代器
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.nodes[current].parent;
        Some(current)
    }
}
