//! # SVG 解析模块
//!
//! ## 设计思路
//!
//! 只关心两件事：找到第一个 `<svg>` 元素，读出它的 `viewBox` 宽高。
//! 解析失败不报错，返回 `None`，由上层跳过渲染。
//!
//! ## 实现思路
//!
//! 1. 整段文本按 XML 解析（`roxmltree`），取第一个 `svg` 元素
//! 2. 整段不是合法 XML（如外层包了 HTML 片段）时，截取首个 `<svg` 到最后一个 `</svg>` 再解析
//! 3. 仍失败时用正则读取开标签上的 `viewBox`，尺寸照常展示，渲染交给 usvg 判定
//! 4. 缺少默认命名空间时补上 `xmlns`，与浏览器 HTML 解析器行为一致

use std::sync::Arc;

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use super::ParsedSize;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";

/// `encodeURIComponent` 不转义的字符集合之外的全部字符。
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static VIEW_BOX_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,]+").expect("view box separator regex"));

static SVG_OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<svg\b[^>]*>").expect("svg open tag regex"));

static VIEW_BOX_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\sviewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("view box attribute regex")
});

static XMLNS_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\sxmlns\s*=").expect("xmlns attribute regex"));

/// 解析结果：原始尺寸 + 交给渲染器的 SVG 文本。
#[derive(Debug, Clone, PartialEq)]
pub struct SvgMarkup {
    /// `viewBox` 宽高；缺失或无效时为 (0, 0)。
    pub parsed_size: ParsedSize,
    /// 定位到的 `<svg>` 元素源码（已补齐命名空间）。
    pub render_source: Arc<str>,
}

/// 解析 SVG 文本。
///
/// 找不到 `<svg>` 元素时返回 `None`。
///
/// # 示例
/// ```rust
/// use svg_to_png::converter::{parse_markup, ParsedSize};
///
/// let markup = parse_markup(r#"<svg viewBox="0 0 100 50"></svg>"#).expect("svg element");
/// assert_eq!(markup.parsed_size, ParsedSize::new(100.0, 50.0));
/// ```
pub fn parse_markup(text: &str) -> Option<SvgMarkup> {
    if let Some(markup) = parse_as_xml(text) {
        return Some(markup);
    }

    if let Some(fragment) = svg_fragment(text) {
        if let Some(markup) = parse_as_xml(fragment) {
            log::debug!("🧩 外层不是合法 XML，已截取 <svg> 片段解析");
            return Some(markup);
        }
    }

    parse_open_tag(text)
}

fn parse_as_xml(text: &str) -> Option<SvgMarkup> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).ok()?;
    let svg = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case("svg"))?;

    let parsed_size = svg
        .attribute("viewBox")
        .and_then(parse_view_box)
        .map(|(_, _, width, height)| ParsedSize::new(width, height))
        .unwrap_or(ParsedSize::ZERO);

    let source = if svg == doc.root_element() {
        text.trim()
    } else {
        &text[svg.range()]
    };

    let render_source = if svg.tag_name().namespace() == Some(SVG_NAMESPACE) {
        source.to_string()
    } else {
        with_svg_namespace(source)
    };

    Some(SvgMarkup {
        parsed_size,
        render_source: Arc::from(render_source),
    })
}

fn parse_open_tag(text: &str) -> Option<SvgMarkup> {
    let open_tag = SVG_OPEN_TAG.find(text)?;
    let parsed_size = VIEW_BOX_ATTRIBUTE
        .captures(open_tag.as_str())
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|value| parse_view_box(value.as_str()))
        .map(|(_, _, width, height)| ParsedSize::new(width, height))
        .unwrap_or(ParsedSize::ZERO);

    let source = svg_fragment(text).unwrap_or(&text[open_tag.start()..]);
    let render_source = if XMLNS_ATTRIBUTE.is_match(open_tag.as_str()) {
        source.to_string()
    } else {
        with_svg_namespace(source)
    };

    log::debug!("🧩 SVG 不是合法 XML，按开标签读取尺寸：{:?}", parsed_size);

    Some(SvgMarkup {
        parsed_size,
        render_source: Arc::from(render_source),
    })
}

/// 截取首个 `<svg` 到最后一个 `</svg>` 之间的片段。
fn svg_fragment(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let start = SVG_OPEN_TAG.find(text)?.start();
    let end = lower.rfind("</svg>")? + "</svg>".len();
    (end > start).then(|| &text[start..end])
}

/// 在首个 `<svg` 后插入默认命名空间。
fn with_svg_namespace(source: &str) -> String {
    match SVG_OPEN_TAG.find(source) {
        Some(tag) => {
            let insert_at = tag.start() + "<svg".len();
            format!(
                "{} xmlns=\"{}\"{}",
                &source[..insert_at],
                SVG_NAMESPACE,
                &source[insert_at..]
            )
        }
        None => source.to_string(),
    }
}

/// 解析 `viewBox="min-x min-y width height"`。
///
/// 分隔符可为空白或逗号；宽高为负或数量不对时视为无效。
pub fn parse_view_box(value: &str) -> Option<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = VIEW_BOX_SEPARATOR
        .split(value.trim())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [x, y, width, height] if *width >= 0.0 && *height >= 0.0 => {
            Some((*x, *y, *width, *height))
        }
        _ => None,
    }
}

/// 预览用 Data URI：`data:image/svg+xml;charset=utf-8,<encodeURIComponent(svg)>`。
pub fn preview_data_uri(markup: &str) -> String {
    format!(
        "{}{}",
        SVG_DATA_URI_PREFIX,
        utf8_percent_encode(markup, URI_COMPONENT)
    )
}
