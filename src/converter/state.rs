//! # 状态模型与状态迁移
//!
//! ## 设计思路
//!
//! 全部界面状态集中在 `ConverterState`，所有变化都通过纯函数
//! `reduce(&state, event) -> Transition` 完成，副作用以 `Effect` 列表返回，
//! 由服务层执行。这样状态迁移可以脱离运行时做确定性单元测试。
//!
//! ## 关键约束
//!
//! - 每当 (SVG 文本, 输出尺寸) 组合变化，`generation` 自增、就绪标志复位，
//!   并先清空画布再发起新的渲染请求。
//! - 渲染结果只有在 `generation` 仍然匹配时才会把状态推进到 `Ready`。
//! - “Copied!” 提示用 `copy_token` 区分多次复制，只有最新一次的到期事件才会复位。

use std::sync::Arc;

use serde::Serialize;

use super::markup::{SvgMarkup, parse_markup};
use super::{OutputSize, ParsedSize, ScaleOption};

/// 渲染阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RenderPhase {
    /// 没有可渲染的内容（无 SVG、尺寸为 0）。
    #[default]
    Idle,
    /// 已发起渲染，等待完成。
    Pending { generation: u64 },
    /// 画布内容与当前 (SVG, 尺寸) 一致，可导出。
    Ready { generation: u64 },
    /// 解码失败或超时，导出保持禁用。
    Failed { generation: u64 },
}

/// 转换器状态。
#[derive(Debug, Clone, Default)]
pub struct ConverterState {
    source: Option<Arc<str>>,
    markup: Option<SvgMarkup>,
    output_size: OutputSize,
    generation: u64,
    render: RenderPhase,
    copied: bool,
    copy_token: u64,
    drag_active: bool,
}

impl ConverterState {
    /// 当前 SVG 原文。
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// 找到 `<svg>` 元素时的原始尺寸。
    pub fn parsed_size(&self) -> Option<ParsedSize> {
        self.markup.as_ref().map(|m| m.parsed_size)
    }

    pub fn markup(&self) -> Option<&SvgMarkup> {
        self.markup.as_ref()
    }

    pub fn output_size(&self) -> OutputSize {
        self.output_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn render_phase(&self) -> RenderPhase {
        self.render
    }

    /// 就绪标志：只有画布内容与当前组合一致时为 true。
    pub fn is_ready(&self) -> bool {
        matches!(self.render, RenderPhase::Ready { generation } if generation == self.generation)
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    pub fn copy_token(&self) -> u64 {
        self.copy_token
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }
}

/// 驱动状态变化的事件。
#[derive(Debug, Clone, PartialEq)]
pub enum ConverterEvent {
    /// 获取到新的 SVG 文本（整体替换）。
    MarkupLoaded(String),
    /// 用户选择缩放档位。
    ScaleSelected(ScaleOption),
    /// 渲染完成并已提交到画布。
    RenderCompleted { generation: u64 },
    /// 渲染失败或超时。
    RenderFailed { generation: u64 },
    /// 已成功写入剪贴板。
    CopySucceeded,
    /// “Copied!” 提示到期。
    CopiedExpired { token: u64 },
    /// 文件拖入窗口。
    DragEntered,
    /// 文件拖离窗口或拖放结束。
    DragLeft,
}

/// 渲染请求。
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub generation: u64,
    pub source: Arc<str>,
    pub size: OutputSize,
}

/// 需要服务层执行的副作用。
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// 清空画布。
    ClearSurface,
    /// 发起异步渲染。
    StartRender(RenderRequest),
    /// 延时后发送 `CopiedExpired { token }`。
    ScheduleCopiedReset { token: u64 },
}

/// 一次状态迁移的结果。
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ConverterState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &ConverterState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

/// 纯状态迁移函数。
///
/// # 示例
/// ```rust
/// use svg_to_png::converter::{reduce, ConverterEvent, ConverterState, OutputSize};
///
/// let state = ConverterState::default();
/// let next = reduce(&state, ConverterEvent::MarkupLoaded(r#"<svg viewBox="0 0 100 50"/>"#.into()));
/// assert_eq!(next.state.output_size(), OutputSize::new(100, 50));
/// assert!(!next.state.is_ready());
/// ```
pub fn reduce(state: &ConverterState, event: ConverterEvent) -> Transition {
    match event {
        ConverterEvent::MarkupLoaded(text) => {
            if text.is_empty() {
                return Transition::unchanged(state);
            }
            let markup = parse_markup(&text);
            let output_size = markup
                .as_ref()
                .map(|m| OutputSize::scaled(m.parsed_size, 1.0))
                .unwrap_or(OutputSize::ZERO);

            let mut next = state.clone();
            next.drag_active = false;
            retarget(next, Arc::from(text), markup, output_size)
        }
        ConverterEvent::ScaleSelected(option) => {
            let (Some(source), Some(markup)) = (&state.source, &state.markup) else {
                return Transition::unchanged(state);
            };
            let output_size = option.apply(markup.parsed_size);
            retarget(state.clone(), Arc::clone(source), Some(markup.clone()), output_size)
        }
        ConverterEvent::RenderCompleted { generation } => {
            if state.render != (RenderPhase::Pending { generation }) {
                return Transition::unchanged(state);
            }
            let mut next = state.clone();
            next.render = RenderPhase::Ready { generation };
            Transition { state: next, effects: Vec::new() }
        }
        ConverterEvent::RenderFailed { generation } => {
            if state.render != (RenderPhase::Pending { generation }) {
                return Transition::unchanged(state);
            }
            let mut next = state.clone();
            next.render = RenderPhase::Failed { generation };
            Transition { state: next, effects: Vec::new() }
        }
        ConverterEvent::CopySucceeded => {
            let mut next = state.clone();
            next.copied = true;
            next.copy_token = state.copy_token.wrapping_add(1);
            let token = next.copy_token;
            Transition {
                state: next,
                effects: vec![Effect::ScheduleCopiedReset { token }],
            }
        }
        ConverterEvent::CopiedExpired { token } => {
            if !state.copied || token != state.copy_token {
                return Transition::unchanged(state);
            }
            let mut next = state.clone();
            next.copied = false;
            Transition { state: next, effects: Vec::new() }
        }
        ConverterEvent::DragEntered | ConverterEvent::DragLeft => {
            let mut next = state.clone();
            next.drag_active = matches!(event, ConverterEvent::DragEntered);
            Transition { state: next, effects: Vec::new() }
        }
    }
}

/// 切换到新的 (SVG, 尺寸) 组合。
///
/// 组合未变化时保留当前渲染状态；否则自增 generation、清空画布并按需发起渲染。
fn retarget(
    mut next: ConverterState,
    source: Arc<str>,
    markup: Option<SvgMarkup>,
    output_size: OutputSize,
) -> Transition {
    let same_source = next.source.as_deref() == Some(&*source);
    if same_source && next.output_size == output_size {
        next.markup = markup;
        return Transition { state: next, effects: Vec::new() };
    }

    next.generation = next.generation.wrapping_add(1);
    next.output_size = output_size;
    next.source = Some(Arc::clone(&source));

    let mut effects = vec![Effect::ClearSurface];
    match &markup {
        Some(m) if !output_size.is_empty() => {
            next.render = RenderPhase::Pending { generation: next.generation };
            effects.push(Effect::StartRender(RenderRequest {
                generation: next.generation,
                source: Arc::clone(&m.render_source),
                size: output_size,
            }));
        }
        _ => next.render = RenderPhase::Idle,
    }
    next.markup = markup;

    Transition { state: next, effects }
}
