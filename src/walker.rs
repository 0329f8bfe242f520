use serde::Serialize;

use crate::asset::TextAsset;
use crate::config::ExtractOptions;
use crate::document::{Document, NodeIndex, NodeKind};
use crate::hierarchy::fit_frames;
use crate::style::normalize;
use crate::utils::encode_line_breaks;

/// 遍历统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkStats {
    /// 输出的文本图层数
    pub emitted: usize,
    /// 因不可见被剪掉的子树数
    pub hidden_pruned: usize,
    /// 因位于组件实例内被排除的文本图层数
    pub instance_skipped: usize,
    /// 属性无法读取而丢弃的文本图层数
    pub anomalies: usize,
}

impl WalkStats {
    pub fn merge(&mut self, other: &WalkStats) {
        self.emitted += other.emitted;
        self.hidden_pruned += other.hidden_pruned;
        self.instance_skipped += other.instance_skipped;
        self.anomalies += other.anomalies;
    }
}

impl std::fmt::Display for WalkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 提取统计信息 ===")?;
        writeln!(f, "文本图层: {}", self.emitted)?;
        writeln!(f, "隐藏子树: {}", self.hidden_pruned)?;
        writeln!(f, "实例内文本(已排除): {}", self.instance_skipped)?;
        writeln!(f, "无法读取的文本: {}", self.anomalies)?;
        Ok(())
    }
}

/// 文档树遍历器
///
/// 深度优先、先序遍历；子节点顺序即输出行顺序。
pub struct TreeWalker<'a> {
    document: &'a Document,
    options: &'a ExtractOptions,
    stats: WalkStats,
}

impl<'a> TreeWalker<'a> {
    pub fn new(document: &'a Document, options: &'a ExtractOptions) -> Self {
        Self {
            document,
            options,
            stats: WalkStats::default(),
        }
    }

    /// 从 `root` 开始遍历
    ///
    /// # 参数
    /// * `page_name` - 所在页面名
    /// * `frame_path` - `root` 之上已累积的层级名（不含 `root` 自身）
    pub fn walk(&mut self, root: NodeIndex, page_name: &str, frame_path: &[String]) -> Vec<TextAsset> {
        let mut assets = Vec::new();
        let mut path = frame_path.to_vec();
        self.visit(root, page_name, &mut path, &mut assets);
        assets
    }

    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    pub fn into_stats(self) -> WalkStats {
        self.stats
    }

    fn visit(&mut self, index: NodeIndex, page_name: &str, path: &mut Vec<String>, out: &mut Vec<TextAsset>) {
        let document = self.document;
        let node = document.node(index);
        if !node.visible {
            self.stats.hidden_pruned += 1;
            return;
        }

        match &node.kind {
            NodeKind::Text(props) => {
                if document.is_instance_descendant(index) {
                    tracing::debug!(id = %node.id, "文本位于组件实例内，已排除");
                    self.stats.instance_skipped += 1;
                    return;
                }

                let Some(props) = props else {
                    tracing::warn!(id = %node.id, name = %node.name, "无法读取文本属性，已跳过该节点");
                    self.stats.anomalies += 1;
                    return;
                };

                out.push(TextAsset {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    page_name: page_name.to_string(),
                    frame_path: fit_frames(path, self.options.depth(), &self.options.path_separator),
                    characters: encode_line_breaks(&props.characters, &self.options.line_break_token),
                    style: normalize(props),
                });
                self.stats.emitted += 1;
            }
            kind if kind.is_container() => {
                path.push(node.name.clone());
                for &child in &node.children {
                    self.visit(child, page_name, path, out);
                }
                path.pop();
            }
            _ => {}
        }
    }
}
