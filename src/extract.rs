/// 提取入口
///
/// 两种模式：
/// - 选区模式：以选中的容器节点为根遍历
/// - 整文档模式：先加载全部页面，再遍历每个页面的顶层容器
use std::collections::HashSet;

use serde::Serialize;

use crate::asset::TextAsset;
use crate::config::ExtractOptions;
use crate::document::{Document, NodeIndex};
use crate::hierarchy::ancestor_names;
use crate::host::DocumentHost;
use crate::utils::SyncError;
use crate::walker::{TreeWalker, WalkStats};

/// 提取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    Selection,
    Document,
}

/// 提取结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub mode: ExtractMode,
    pub assets: Vec<TextAsset>,
    pub stats: WalkStats,
}

impl Extraction {
    /// 空结果表示“没有可导出的文本图层”，不是错误
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }
}

/// 选区模式提取
///
/// 只有容器节点可以作为根；未知 ID 与非容器节点忽略。
/// 起始路径由根节点自身的祖先推出，因此与整文档模式得到的路径一致。
/// 选区重叠（父子都被选中）时只遍历最外层的根，同一子树不会重复遍历。
pub fn extract_selection(document: &Document, selection: &[String], options: &ExtractOptions) -> Extraction {
    let mut roots: Vec<NodeIndex> = Vec::new();
    for id in selection {
        let Some(root) = document.find(id) else {
            tracing::debug!(id = %id, "选区中的节点不存在，已忽略");
            continue;
        };
        if !document.node(root).kind.is_container() {
            tracing::debug!(id = %id, kind = document.node(root).kind.type_name(), "选区节点不是容器，已忽略");
            continue;
        }
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    let selected: HashSet<NodeIndex> = roots.iter().copied().collect();
    let mut walker = TreeWalker::new(document, options);
    let mut assets = Vec::new();

    for root in roots {
        if document.ancestors(root).any(|ancestor| selected.contains(&ancestor)) {
            tracing::debug!(id = %document.node(root).id, "选区节点已包含在其他选中节点内");
            continue;
        }

        let (page_name, frame_path) = ancestor_names(document, root);
        assets.extend(walker.walk(root, &page_name, &frame_path));
    }

    Extraction {
        mode: ExtractMode::Selection,
        assets,
        stats: walker.into_stats(),
    }
}

/// 整文档模式提取
pub async fn extract_document<H: DocumentHost + ?Sized>(
    host: &mut H,
    options: &ExtractOptions,
) -> Result<Extraction, SyncError> {
    host.load_all_pages().await?;

    let document = host.document();
    let mut walker = TreeWalker::new(document, options);
    let mut assets = Vec::new();

    for &page in document.pages() {
        let page_node = document.node(page);
        for &child in &page_node.children {
            if document.node(child).kind.is_container() {
                assets.extend(walker.walk(child, &page_node.name, &[]));
            }
        }
    }

    let stats = walker.into_stats();
    tracing::info!(pages = document.pages().len(), emitted = stats.emitted, "整文档提取完成");

    Ok(Extraction {
        mode: ExtractMode::Document,
        assets,
        stats,
    })
}

/// 根据宿主选区自动选择模式
pub async fn extract<H: DocumentHost + ?Sized>(
    host: &mut H,
    options: &ExtractOptions,
) -> Result<Extraction, SyncError> {
    let selection = host.selection();
    if selection.is_empty() {
        extract_document(host, options).await
    } else {
        Ok(extract_selection(host.document(), &selection, options))
    }
}
