/// 内存宿主实现
///
/// 基于 `Document` 的默认宿主：页面视为加载即就绪，
/// 字体按“可用字体集合”模拟加载结果，未加载字体的节点拒绝修改文本。
use std::collections::HashSet;
use async_trait::async_trait;

use super::traits::{DocumentHost, HostError};
use crate::document::{Document, FontName};

/// 默认的内存宿主
#[derive(Debug, Clone)]
pub struct MemoryHost {
    document: Document,
    /// 可加载的字体；`None` 表示全部可用
    available_fonts: Option<HashSet<FontName>>,
    loaded_fonts: HashSet<FontName>,
    pages_loaded: bool,
}

impl MemoryHost {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            available_fonts: None,
            loaded_fonts: HashSet::new(),
            pages_loaded: false,
        }
    }

    /// 限制可加载的字体
    pub fn with_available_fonts(mut self, fonts: impl IntoIterator<Item = FontName>) -> Self {
        self.available_fonts = Some(fonts.into_iter().collect());
        self
    }

    pub fn pages_loaded(&self) -> bool {
        self.pages_loaded
    }

    pub fn is_font_loaded(&self, font: &FontName) -> bool {
        self.loaded_fonts.contains(font)
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

#[async_trait]
impl DocumentHost for MemoryHost {
    fn document(&self) -> &Document {
        &self.document
    }

    async fn load_all_pages(&mut self) -> Result<(), HostError> {
        self.pages_loaded = true;
        Ok(())
    }

    async fn load_font(&mut self, font: &FontName) -> Result<(), HostError> {
        if let Some(available) = &self.available_fonts {
            if !available.contains(font) {
                return Err(HostError::FontUnavailable(font.to_string()));
            }
        }
        self.loaded_fonts.insert(font.clone());
        Ok(())
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError> {
        let index = self
            .document
            .find(id)
            .ok_or_else(|| HostError::NodeNotFound(id.to_string()))?;

        let loaded_fonts = &self.loaded_fonts;
        let props = self
            .document
            .text_props_mut(index)
            .ok_or_else(|| HostError::NotText(id.to_string()))?;

        if let Some(missing) = props.fonts_to_load().into_iter().find(|font| !loaded_fonts.contains(font)) {
            return Err(HostError::FontNotLoaded(missing.to_string()));
        }

        props.characters = text.to_string();
        Ok(())
    }
}
