use serde::Serialize;

use crate::document::{Document, NodeIndex, NodeKind};

/// 层级路径：页面名 + 固定列数的 Frame 名
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyPath {
    pub page_name: String,
    pub frames: Vec<String>,
}

/// 将层级名压成固定 `depth` 列
///
/// 不足补空串；超出部分从最后一列起用 `separator` 连接，不丢弃任何层级名。
pub fn fit_frames(names: &[String], depth: usize, separator: &str) -> Vec<String> {
    let depth = depth.max(1);
    let mut frames: Vec<String> = Vec::with_capacity(depth);

    if names.len() > depth {
        frames.extend(names[..depth - 1].iter().cloned());
        frames.push(names[depth - 1..].join(separator));
    } else {
        frames.extend(names.iter().cloned());
        frames.resize(depth, String::new());
    }

    frames
}

/// 节点的祖先层级名（页面之下、节点之上，自上而下）及所在页面名
pub fn ancestor_names(document: &Document, index: NodeIndex) -> (String, Vec<String>) {
    let mut page_name = String::new();
    let mut names = Vec::new();

    for ancestor in document.ancestors(index) {
        let node = document.node(ancestor);
        if node.kind == NodeKind::Page {
            page_name = node.name.clone();
            break;
        }
        names.push(node.name.clone());
    }

    names.reverse();
    (page_name, names)
}

/// 通过向上遍历祖先得到节点的层级路径
///
/// 与自上而下遍历时累积的路径结果一致。
pub fn flatten(document: &Document, index: NodeIndex, depth: usize, separator: &str) -> HierarchyPath {
    let (page_name, names) = ancestor_names(document, index);
    HierarchyPath {
        page_name,
        frames: fit_frames(&names, depth, separator),
    }
}
