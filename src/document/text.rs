use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 快照中表示“多个字符取值不同”的哨兵字符串
pub const MIXED_SENTINEL: &str = "figma.mixed";

/// 三态属性值
///
/// - `Resolved`：有唯一确定值
/// - `Mixed`：文本内各字符取值不同
/// - `Unset`：宿主未提供，或提供的值无法解析
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Attr<T> {
    Resolved(T),
    Mixed,
    #[default]
    Unset,
}

impl<T> Attr<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Attr::Resolved(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: DeserializeOwned> Attr<T> {
    /// 从快照属性表中宽松地读取一个字段
    ///
    /// 解析失败只影响当前字段（降级为 `Unset`），不会让整个节点失效。
    pub fn parse(attributes: &Map<String, Value>, field: &str) -> Self {
        match attributes.get(field) {
            None | Some(Value::Null) => Attr::Unset,
            Some(Value::String(s)) if s == MIXED_SENTINEL => Attr::Mixed,
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(parsed) => Attr::Resolved(parsed),
                Err(e) => {
                    tracing::warn!(attribute = field, error = %e, "属性解析失败，按未设置处理");
                    Attr::Unset
                }
            },
        }
    }
}

/// 字体（族 + 样式）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self { family: family.into(), style: style.into() }
    }
}

impl std::fmt::Display for FontName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// 行高：`{ value, unit }`，自动行高为 `{ unit: "AUTO" }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineHeight {
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// 字间距：`{ value, unit }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LetterSpacing {
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAlignHorizontal {
    Left,
    Center,
    Right,
    Justified,
}

impl TextAlignHorizontal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Center => "CENTER",
            Self::Right => "RIGHT",
            Self::Justified => "JUSTIFIED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAlignVertical {
    Top,
    Center,
    Bottom,
}

impl TextAlignVertical {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Center => "CENTER",
            Self::Bottom => "BOTTOM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextCase {
    Original,
    Upper,
    Lower,
    Title,
    SmallCaps,
    SmallCapsForced,
}

impl TextCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
            Self::Title => "TITLE",
            Self::SmallCaps => "SMALL_CAPS",
            Self::SmallCapsForced => "SMALL_CAPS_FORCED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
    None,
    Underline,
    Strikethrough,
}

impl TextDecoration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Underline => "UNDERLINE",
            Self::Strikethrough => "STRIKETHROUGH",
        }
    }
}

/// RGB 颜色，各通道取值 0..1
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// 填充（仅关心类型、颜色与不透明度）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub paint_type: String,
    #[serde(default)]
    pub color: Option<Rgb>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
}

impl Paint {
    pub fn is_solid(&self) -> bool {
        self.paint_type.eq_ignore_ascii_case("SOLID")
    }
}

/// 几何信息
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

/// 文本节点的原始属性
#[derive(Debug, Clone, PartialEq)]
pub struct TextProps {
    /// 文本内容（原始换行）
    pub characters: String,
    pub font_name: Attr<FontName>,
    pub font_size: Attr<f64>,
    pub line_height: Attr<LineHeight>,
    pub letter_spacing: Attr<LetterSpacing>,
    pub text_align_horizontal: Attr<TextAlignHorizontal>,
    pub text_align_vertical: Attr<TextAlignVertical>,
    pub text_case: Attr<TextCase>,
    pub text_decoration: Attr<TextDecoration>,
    pub fills: Attr<Vec<Paint>>,
    pub geometry: Geometry,
    pub corner_radius: Attr<f64>,
    pub opacity: Option<f64>,
    /// 字体混排时各文本段使用的字体
    pub segment_fonts: Vec<FontName>,
}

impl TextProps {
    /// 只含文本内容、其余属性均未设置的文本属性
    pub fn with_characters(characters: impl Into<String>) -> Self {
        Self {
            characters: characters.into(),
            font_name: Attr::Unset,
            font_size: Attr::Unset,
            line_height: Attr::Unset,
            letter_spacing: Attr::Unset,
            text_align_horizontal: Attr::Unset,
            text_align_vertical: Attr::Unset,
            text_case: Attr::Unset,
            text_decoration: Attr::Unset,
            fills: Attr::Unset,
            geometry: Geometry::default(),
            corner_radius: Attr::Unset,
            opacity: None,
            segment_fonts: Vec::new(),
        }
    }

    /// 从快照属性表构建文本属性
    ///
    /// 缺少 `characters` 时返回 `None`，其余字段各自独立降级。
    pub fn from_attributes(attributes: &Map<String, Value>) -> Option<Self> {
        let characters = attributes.get("characters")?.as_str()?.to_string();

        let number = |field: &str| attributes.get(field).and_then(Value::as_f64);

        let segment_fonts = match Attr::<Vec<FontName>>::parse(attributes, "segmentFonts") {
            Attr::Resolved(fonts) => fonts,
            _ => Vec::new(),
        };

        Some(Self {
            characters,
            font_name: Attr::parse(attributes, "fontName"),
            font_size: Attr::parse(attributes, "fontSize"),
            line_height: Attr::parse(attributes, "lineHeight"),
            letter_spacing: Attr::parse(attributes, "letterSpacing"),
            text_align_horizontal: Attr::parse(attributes, "textAlignHorizontal"),
            text_align_vertical: Attr::parse(attributes, "textAlignVertical"),
            text_case: Attr::parse(attributes, "textCase"),
            text_decoration: Attr::parse(attributes, "textDecoration"),
            fills: Attr::parse(attributes, "fills"),
            geometry: Geometry {
                x: number("x").unwrap_or(0.0),
                y: number("y").unwrap_or(0.0),
                width: number("width").unwrap_or(0.0),
                height: number("height").unwrap_or(0.0),
                rotation: number("rotation").unwrap_or(0.0),
            },
            corner_radius: Attr::parse(attributes, "cornerRadius"),
            opacity: number("opacity"),
            segment_fonts,
        })
    }

    /// 修改文本前需要加载的全部字体
    pub fn fonts_to_load(&self) -> Vec<FontName> {
        match &self.font_name {
            Attr::Resolved(font) => vec![font.clone()],
            Attr::Mixed => {
                let mut fonts: Vec<FontName> = Vec::new();
                for font in &self.segment_fonts {
                    if !fonts.contains(font) {
                        fonts.push(font.clone());
                    }
                }
                fonts
            }
            Attr::Unset => Vec::new(),
        }
    }
}

/// 数字字段：非数字值视为缺失
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}
