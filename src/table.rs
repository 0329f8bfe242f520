/// 表格编解码模块
///
/// 把提取结果编码为“表头 + 数据行”的表格，并把编辑后的表格解码回回写请求。
///
/// # 架构设计
///
/// - **delimited**: CSV/TSV 文本（需要转义）
/// - **rows**: JSON 行对象（结构化传输，保留原生类型）
///
/// 解码时按列名（而不是列位置）定位 `ID` 与 `Characters` 列，
/// 因此调整列顺序或增加列都不影响回写。
pub mod delimited;
pub mod rows;

#[cfg(test)]
mod tests;

use std::path::Path;
use encoding_rs::Encoding;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::asset::{TextAsset, UpdateRequest};
use crate::utils::{format_number, SyncError};

/// 支持的表格文件扩展名
pub const SUPPORTED_TABLE_EXTENSIONS: &[&str] = &["csv", "tsv", "json"];

/// 文本列可接受的列名
const TEXT_COLUMN_ALIASES: &[&str] = &["Characters", "Text", "New Text"];

/// 表格错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table has no header row")]
    MissingHeader,

    #[error("required column not found: {0}")]
    MissingColumn(String),

    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("invalid row data: {0}")]
    InvalidRows(String),
}

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 从 JSON 值转换（保留数字类型）
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) => Cell::text(s.as_str()),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or_else(|| Cell::text(n.to_string())),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(value) => f.write_str(&format_number(*value)),
            Cell::Empty => Ok(()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(text) => serializer.serialize_str(text),
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                serializer.serialize_i64(*value as i64)
            }
            Cell::Number(value) => serializer.serialize_f64(*value),
            Cell::Empty => serializer.serialize_str(""),
        }
    }
}

/// 表格（表头 + 数据行）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// 按列名（忽略大小写与首尾空白）查找列下标
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.header
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 表格列（顺序即表头顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Page,
    /// 第 n 层 Frame（从 0 开始）
    Frame(usize),
    Name,
    Characters,
    FontFamily,
    FontStyle,
    FontSize,
    LineHeight,
    LetterSpacing,
    TextAlignHorizontal,
    TextAlignVertical,
    TextCase,
    TextDecoration,
    FillColor,
    FillOpacity,
    X,
    Y,
    Width,
    Height,
    Rotation,
    CornerRadius,
    Opacity,
}

impl Column {
    /// 给定层级深度时的完整列顺序
    pub fn layout(depth: usize) -> Vec<Column> {
        let mut columns = vec![Column::Id, Column::Page];
        columns.extend((0..depth.max(1)).map(Column::Frame));
        columns.extend([
            Column::Name,
            Column::Characters,
            Column::FontFamily,
            Column::FontStyle,
            Column::FontSize,
            Column::LineHeight,
            Column::LetterSpacing,
            Column::TextAlignHorizontal,
            Column::TextAlignVertical,
            Column::TextCase,
            Column::TextDecoration,
            Column::FillColor,
            Column::FillOpacity,
            Column::X,
            Column::Y,
            Column::Width,
            Column::Height,
            Column::Rotation,
            Column::CornerRadius,
            Column::Opacity,
        ]);
        columns
    }

    /// 表头名
    pub fn header(&self) -> String {
        let name = match self {
            Column::Id => "ID",
            Column::Page => "Page",
            Column::Frame(level) => return format!("Frame {}", level + 1),
            Column::Name => "Name",
            Column::Characters => "Characters",
            Column::FontFamily => "Font Family",
            Column::FontStyle => "Font Style",
            Column::FontSize => "Font Size",
            Column::LineHeight => "Line Height",
            Column::LetterSpacing => "Letter Spacing",
            Column::TextAlignHorizontal => "Text Align Horizontal",
            Column::TextAlignVertical => "Text Align Vertical",
            Column::TextCase => "Text Case",
            Column::TextDecoration => "Text Decoration",
            Column::FillColor => "Fill Color",
            Column::FillOpacity => "Fill Opacity",
            Column::X => "X",
            Column::Y => "Y",
            Column::Width => "Width",
            Column::Height => "Height",
            Column::Rotation => "Rotation",
            Column::CornerRadius => "Corner Radius",
            Column::Opacity => "Opacity",
        };
        name.to_string()
    }

    /// 取出该列在某条记录中的值
    pub fn cell(&self, asset: &TextAsset) -> Cell {
        let style = &asset.style;
        match self {
            Column::Id => Cell::text(asset.id.as_str()),
            Column::Page => Cell::text(asset.page_name.as_str()),
            Column::Frame(level) => Cell::text(asset.frame(*level)),
            Column::Name => Cell::text(asset.name.as_str()),
            Column::Characters => Cell::text(asset.characters.as_str()),
            Column::FontFamily => Cell::text(style.font_family.as_str()),
            Column::FontStyle => Cell::text(style.font_style.as_str()),
            Column::FontSize => style_cell(&style.font_size),
            Column::LineHeight => Cell::text(style.line_height.as_str()),
            Column::LetterSpacing => Cell::text(style.letter_spacing.as_str()),
            Column::TextAlignHorizontal => Cell::text(style.text_align_horizontal.as_str()),
            Column::TextAlignVertical => Cell::text(style.text_align_vertical.as_str()),
            Column::TextCase => Cell::text(style.text_case.as_str()),
            Column::TextDecoration => Cell::text(style.text_decoration.as_str()),
            Column::FillColor => Cell::text(style.fill_color.as_str()),
            Column::FillOpacity => Cell::text(style.fill_opacity.as_str()),
            Column::X => Cell::Number(style.x),
            Column::Y => Cell::Number(style.y),
            Column::Width => Cell::Number(style.width),
            Column::Height => Cell::Number(style.height),
            Column::Rotation => Cell::Number(style.rotation),
            Column::CornerRadius => style_cell(&style.corner_radius),
            Column::Opacity => Cell::Number(style.opacity),
        }
    }
}

fn style_cell(value: &crate::style::StyleValue) -> Cell {
    match value {
        crate::style::StyleValue::Number(number) => Cell::Number(*number),
        crate::style::StyleValue::Text(text) => Cell::text(text.as_str()),
    }
}

/// 把提取结果编码为表格（首行为表头，数据行保持遍历顺序）
pub fn encode(assets: &[TextAsset], depth: usize) -> Table {
    let columns = Column::layout(depth);
    Table {
        header: columns.iter().map(Column::header).collect(),
        rows: assets
            .iter()
            .map(|asset| columns.iter().map(|column| column.cell(asset)).collect())
            .collect(),
    }
}

/// 把表格解码为回写请求
///
/// 每个数据行都生成一个请求（空单元格记为 `None`），保证结果与输入行一一对应。
pub fn decode(table: &Table) -> Result<Vec<UpdateRequest>, TableError> {
    if table.header.is_empty() {
        if table.rows.is_empty() {
            return Ok(Vec::new());
        }
        return Err(TableError::MissingHeader);
    }

    let id_column = table
        .column_index(&Column::Id.header())
        .ok_or_else(|| TableError::MissingColumn(Column::Id.header()))?;
    let text_column = TEXT_COLUMN_ALIASES
        .iter()
        .find_map(|alias| table.column_index(alias))
        .ok_or_else(|| TableError::MissingColumn(Column::Characters.header()))?;

    let requests = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let value = |column: usize| row.get(column).filter(|cell| !cell.is_empty()).map(Cell::to_string);
            UpdateRequest::new(i + 1, value(id_column), value(text_column))
        })
        .collect();

    Ok(requests)
}

/// 表格文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Json,
}

impl TableFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(TableFormat::Csv),
            "tsv" | "tab" => Some(TableFormat::Tsv),
            "json" => Some(TableFormat::Json),
            _ => None,
        }
    }

    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
            TableFormat::Json => "json",
        }
    }

    /// 渲染为文本
    pub fn render(&self, table: &Table) -> Result<String, SyncError> {
        match self {
            TableFormat::Csv => Ok(delimited::write(table, ',')),
            TableFormat::Tsv => Ok(delimited::write(table, '\t')),
            TableFormat::Json => Ok(serde_json::to_string_pretty(&rows::to_json_rows(table))?),
        }
    }

    /// 从文本解析
    pub fn parse(&self, input: &str) -> Result<Table, SyncError> {
        match self {
            TableFormat::Csv => Ok(delimited::read(input, ',')?),
            TableFormat::Tsv => Ok(delimited::read(input, '\t')?),
            TableFormat::Json => {
                let value: Value = serde_json::from_str(input)?;
                Ok(rows::from_json_rows(&value)?)
            }
        }
    }
}

/// 解码输入字节
///
/// 优先按 BOM 识别编码；没有 BOM 时使用 `label` 指定的编码（默认 UTF-8）。
/// 无法解码的字节替换为 U+FFFD 并记录警告。
pub fn decode_input(bytes: &[u8], label: Option<&str>) -> Result<String, SyncError> {
    let encoding = match label {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| SyncError::UnsupportedEncoding(label.to_string()))?,
        None => encoding_rs::UTF_8,
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = used.name(), "输入包含无法解码的字节，已替换为 U+FFFD");
    }
    Ok(text.into_owned())
}

/// 读取表格文件
pub fn read_table_file(path: &Path, format: TableFormat, encoding: Option<&str>) -> Result<Table, SyncError> {
    let bytes = std::fs::read(path)?;
    let text = decode_input(&bytes, encoding)?;
    format.parse(&text)
}

/// 写入表格文件
///
/// `bom` 为 true 时在文本前写入 UTF-8 BOM，便于表格软件识别编码。
pub fn write_table_file(path: &Path, table: &Table, format: TableFormat, bom: bool) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut content = String::new();
    if bom && format != TableFormat::Json {
        content.push('\u{feff}');
    }
    content.push_str(&format.render(table)?);

    std::fs::write(path, content)?;
    Ok(())
}
