/// 宿主接口 - trait 定义
///
/// 宿主拥有文档树的全部生命周期；引擎只读取属性，
/// 并在回写时修改已存在文本节点的文本内容。
use async_trait::async_trait;
use thiserror::Error;

use crate::document::{Document, FontName, NodeIndex};

/// 宿主错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    #[error("font not loaded: {0}")]
    FontNotLoaded(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node is not a text layer: {0}")]
    NotText(String),
}

/// 文档宿主 trait
///
/// # 职责
/// - 提供文档树与当前选区
/// - 页面加载、字体加载两个异步前置条件
/// - 修改文本节点内容（引擎唯一的写操作）
///
/// 所有异步调用都由引擎逐个顺序等待，不会并发。
#[async_trait]
pub trait DocumentHost: Send {
    /// 当前文档
    fn document(&self) -> &Document;

    /// 当前选区（节点 ID）；为空时走整文档模式
    fn selection(&self) -> Vec<String> {
        self.document().selection().to_vec()
    }

    /// 确保所有页面已加载（整文档遍历前调用一次）
    async fn load_all_pages(&mut self) -> Result<(), HostError>;

    /// 加载字体（修改文本前必须完成）
    async fn load_font(&mut self, font: &FontName) -> Result<(), HostError>;

    /// 替换文本节点的内容
    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError>;

    /// 按 ID 解析节点
    fn resolve_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.document().find(id)
    }

    /// 读取文本节点当前内容
    fn text_of(&self, id: &str) -> Option<String> {
        let document = self.document();
        let index = document.find(id)?;
        document.text_props(index).map(|props| props.characters.clone())
    }
}
