/// 样式归一化
///
/// 把文本节点的原始样式属性转换为稳定、可序列化的表格值。
/// 每个字段独立降级：任何一个属性缺失或无法解析都不会影响其他字段，也不会报错。
use serde::Serialize;

use crate::document::{Attr, LetterSpacing, LineHeight, Paint, TextProps};
use crate::utils::{format_number, round_to};

/// 多值哨兵的表格表示
pub const MIXED: &str = "Mixed";
/// 自动行高的表格表示
pub const AUTO: &str = "AUTO";
/// 字间距缺省值
pub const DEFAULT_LETTER_SPACING: &str = "0%";
const DEFAULT_UNIT: &str = "px";

/// 可能是数值也可能是标记文本的样式值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn mixed() -> Self {
        StyleValue::Text(MIXED.to_string())
    }

    pub fn empty() -> Self {
        StyleValue::Text(String::new())
    }
}

impl std::fmt::Display for StyleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleValue::Number(value) => f.write_str(&format_number(*value)),
            StyleValue::Text(text) => f.write_str(text),
        }
    }
}

/// 归一化后的样式
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStyle {
    pub font_family: String,
    pub font_style: String,
    pub font_size: StyleValue,
    pub line_height: String,
    pub letter_spacing: String,
    pub text_align_horizontal: String,
    pub text_align_vertical: String,
    pub text_case: String,
    pub text_decoration: String,
    /// `#rrggbb`，仅取第一个纯色填充
    pub fill_color: String,
    /// 百分比，如 `50%`
    pub fill_opacity: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub corner_radius: StyleValue,
    pub opacity: f64,
}

/// 归一化文本节点样式（不会失败）
pub fn normalize(props: &TextProps) -> NormalizedStyle {
    let (font_family, font_style) = match &props.font_name {
        Attr::Resolved(font) => (font.family.clone(), font.style.clone()),
        Attr::Mixed => (MIXED.to_string(), MIXED.to_string()),
        Attr::Unset => (String::new(), String::new()),
    };
    let (fill_color, fill_opacity) = normalize_fill(&props.fills);
    let geometry = &props.geometry;

    NormalizedStyle {
        font_family,
        font_style,
        font_size: number_attr(&props.font_size, |size| size),
        line_height: normalize_line_height(&props.line_height),
        letter_spacing: normalize_letter_spacing(&props.letter_spacing),
        text_align_horizontal: enum_attr(&props.text_align_horizontal, |v| v.as_str()),
        text_align_vertical: enum_attr(&props.text_align_vertical, |v| v.as_str()),
        text_case: enum_attr(&props.text_case, |v| v.as_str()),
        text_decoration: enum_attr(&props.text_decoration, |v| v.as_str()),
        fill_color,
        fill_opacity,
        x: round_to(geometry.x, 2),
        y: round_to(geometry.y, 2),
        width: round_to(geometry.width, 0),
        height: round_to(geometry.height, 0),
        rotation: round_to(geometry.rotation, 0),
        corner_radius: number_attr(&props.corner_radius, |radius| round_to(radius, 0)),
        opacity: round_to(props.opacity.unwrap_or(1.0), 2),
    }
}

fn number_attr(attr: &Attr<f64>, round: impl Fn(f64) -> f64) -> StyleValue {
    match attr {
        Attr::Resolved(value) if value.is_finite() => StyleValue::Number(round(*value)),
        Attr::Mixed => StyleValue::mixed(),
        _ => StyleValue::empty(),
    }
}

fn enum_attr<T>(attr: &Attr<T>, name: impl Fn(&T) -> &'static str) -> String {
    match attr {
        Attr::Resolved(value) => name(value).to_string(),
        Attr::Mixed => MIXED.to_string(),
        Attr::Unset => String::new(),
    }
}

/// 行高：数值 + 单位，否则 `AUTO`
pub fn normalize_line_height(attr: &Attr<LineHeight>) -> String {
    let Attr::Resolved(line_height) = attr else {
        return AUTO.to_string();
    };

    let unit = line_height.unit.as_deref().unwrap_or(DEFAULT_UNIT);
    match line_height.value {
        Some(value) if value.is_finite() && !unit.eq_ignore_ascii_case(AUTO) => {
            format!("{}{}", format_number(value), unit)
        }
        _ => AUTO.to_string(),
    }
}

/// 字间距：取整数值 + 单位，否则 `0%`
pub fn normalize_letter_spacing(attr: &Attr<LetterSpacing>) -> String {
    match attr {
        Attr::Resolved(LetterSpacing { value: Some(value), unit }) if value.is_finite() => {
            let unit = unit.as_deref().unwrap_or(DEFAULT_UNIT);
            format!("{}{}", format_number(value.round()), unit)
        }
        _ => DEFAULT_LETTER_SPACING.to_string(),
    }
}

/// 填充：只看第一个填充，且仅当其为纯色时输出颜色与不透明度
pub fn normalize_fill(fills: &Attr<Vec<Paint>>) -> (String, String) {
    let first_solid = fills
        .resolved()
        .and_then(|fills| fills.first())
        .filter(|paint| paint.is_solid());

    match first_solid {
        Some(Paint { color: Some(color), opacity, .. }) => {
            let hex = format!(
                "#{:02x}{:02x}{:02x}",
                channel(color.r),
                channel(color.g),
                channel(color.b)
            );
            let percent = (opacity.unwrap_or(1.0) * 100.0).round() as i64;
            (hex, format!("{}%", percent))
        }
        _ => (String::new(), String::new()),
    }
}

fn channel(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        FontName, Geometry, Rgb, TextAlignHorizontal, TextCase, TextDecoration,
    };

    fn solid(r: f64, g: f64, b: f64, opacity: Option<f64>) -> Paint {
        Paint {
            paint_type: "SOLID".to_string(),
            color: Some(Rgb { r, g, b }),
            opacity,
        }
    }

    #[test]
    fn test_fill_red_half_opacity() {
        let fills = Attr::Resolved(vec![solid(1.0, 0.0, 0.0, Some(0.5))]);
        assert_eq!(normalize_fill(&fills), ("#ff0000".to_string(), "50%".to_string()));
    }

    #[test]
    fn test_fill_defaults_and_non_solid() {
        let fills = Attr::Resolved(vec![solid(0.2, 0.4, 0.6, None)]);
        assert_eq!(normalize_fill(&fills), ("#336699".to_string(), "100%".to_string()));

        let gradient = Attr::Resolved(vec![
            Paint { paint_type: "GRADIENT_LINEAR".to_string(), color: None, opacity: None },
            solid(1.0, 1.0, 1.0, None),
        ]);
        assert_eq!(normalize_fill(&gradient), (String::new(), String::new()));
        assert_eq!(normalize_fill(&Attr::Resolved(vec![])), (String::new(), String::new()));
        assert_eq!(normalize_fill(&Attr::Mixed), (String::new(), String::new()));
    }

    #[test]
    fn test_letter_spacing() {
        let pixels = Attr::Resolved(LetterSpacing { value: Some(1.6), unit: Some("PIXELS".to_string()) });
        assert_eq!(normalize_letter_spacing(&pixels), "2PIXELS");

        let no_unit = Attr::Resolved(LetterSpacing { value: Some(-0.4), unit: None });
        assert_eq!(normalize_letter_spacing(&no_unit), "0px");

        assert_eq!(normalize_letter_spacing(&Attr::Unset), "0%");
        assert_eq!(normalize_letter_spacing(&Attr::Mixed), "0%");
    }

    #[test]
    fn test_line_height() {
        let pixels = Attr::Resolved(LineHeight { value: Some(24.0), unit: Some("PIXELS".to_string()) });
        assert_eq!(normalize_line_height(&pixels), "24PIXELS");

        let percent = Attr::Resolved(LineHeight { value: Some(120.5), unit: None });
        assert_eq!(normalize_line_height(&percent), "120.5px");

        let auto = Attr::Resolved(LineHeight { value: Some(100.0), unit: Some("AUTO".to_string()) });
        assert_eq!(normalize_line_height(&auto), "AUTO");

        let no_value = Attr::Resolved(LineHeight { value: None, unit: Some("PIXELS".to_string()) });
        assert_eq!(normalize_line_height(&no_value), "AUTO");
        assert_eq!(normalize_line_height(&Attr::Unset), "AUTO");
    }

    #[test]
    fn test_normalize_full_node() {
        let mut props = TextProps::with_characters("Hello");
        props.font_name = Attr::Resolved(FontName::new("Inter", "Bold"));
        props.font_size = Attr::Resolved(16.0);
        props.text_align_horizontal = Attr::Resolved(TextAlignHorizontal::Center);
        props.text_case = Attr::Mixed;
        props.text_decoration = Attr::Resolved(TextDecoration::Underline);
        props.geometry = Geometry { x: 10.126, y: -3.333, width: 99.5, height: 20.4, rotation: -89.6 };
        props.corner_radius = Attr::Resolved(3.7);
        props.opacity = Some(0.456);

        let style = normalize(&props);
        assert_eq!(style.font_family, "Inter");
        assert_eq!(style.font_style, "Bold");
        assert_eq!(style.font_size, StyleValue::Number(16.0));
        assert_eq!(style.text_align_horizontal, "CENTER");
        assert_eq!(style.text_align_vertical, "");
        assert_eq!(style.text_case, "Mixed");
        assert_eq!(style.text_decoration, "UNDERLINE");
        assert_eq!(style.x, 10.13);
        assert_eq!(style.y, -3.33);
        assert_eq!(style.width, 100.0);
        assert_eq!(style.height, 20.0);
        assert_eq!(style.rotation, -90.0);
        assert_eq!(style.corner_radius, StyleValue::Number(4.0));
        assert_eq!(style.opacity, 0.46);
    }

    #[test]
    fn test_normalize_mixed_and_unset() {
        let mut props = TextProps::with_characters("Hello");
        props.font_name = Attr::Mixed;
        props.font_size = Attr::Mixed;
        props.text_case = Attr::Resolved(TextCase::SmallCapsForced);

        let style = normalize(&props);
        assert_eq!(style.font_family, "Mixed");
        assert_eq!(style.font_style, "Mixed");
        assert_eq!(style.font_size.to_string(), "Mixed");
        assert_eq!(style.text_case, "SMALL_CAPS_FORCED");
        assert_eq!(style.corner_radius.to_string(), "");
        assert_eq!(style.fill_color, "");
        assert_eq!(style.opacity, 1.0);
    }
}
