//! 前端渲染用的只读快照。

use serde::Serialize;

use super::markup::preview_data_uri;
use super::state::{ConverterState, RenderPhase};
use super::{OutputSize, ParsedSize, ScaleOption};

pub const COPY_LABEL: &str = "Copy to clipboard";
pub const COPIED_LABEL: &str = "Copied!";
pub const DROP_HINT_DRAGGING: &str = "Drag into here";
pub const DROP_HINT_IDLE: &str = "Paste in here";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleButton {
    pub multiplier: f64,
    pub label: String,
    /// 当前输出尺寸正好等于该档位的结果。
    pub active: bool,
}

/// 转换器视图。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverterView {
    pub generation: u64,
    /// 找到了 `<svg>` 元素，前端据此显示预览、尺寸与导出区域。
    pub has_svg: bool,
    pub preview_uri: Option<String>,
    pub parsed_size: Option<ParsedSize>,
    pub output_size: OutputSize,
    pub scales: Vec<ScaleButton>,
    pub phase: RenderPhase,
    pub ready: bool,
    pub rendering: bool,
    pub render_failed: bool,
    pub render_error: Option<String>,
    pub copied: bool,
    pub copy_label: &'static str,
    pub drag_active: bool,
    pub drop_hint: &'static str,
    pub download_file_name: String,
}

impl ConverterView {
    pub fn from_state(state: &ConverterState, render_error: Option<&str>, download_file_name: &str) -> Self {
        let parsed_size = state.parsed_size();
        let output_size = state.output_size();
        let phase = state.render_phase();

        let scales = match parsed_size {
            Some(parsed) => ScaleOption::all()
                .map(|option| ScaleButton {
                    multiplier: option.multiplier(),
                    label: option.label(),
                    active: option.apply(parsed) == output_size,
                })
                .collect(),
            None => Vec::new(),
        };

        let render_failed = matches!(phase, RenderPhase::Failed { .. });

        Self {
            generation: state.generation(),
            has_svg: parsed_size.is_some(),
            preview_uri: state
                .markup()
                .and(state.source())
                .map(preview_data_uri),
            parsed_size,
            output_size,
            scales,
            phase,
            ready: state.is_ready(),
            rendering: matches!(phase, RenderPhase::Pending { .. }),
            render_failed,
            render_error: render_failed.then(|| render_error.map(str::to_string)).flatten(),
            copied: state.is_copied(),
            copy_label: if state.is_copied() { COPIED_LABEL } else { COPY_LABEL },
            drag_active: state.drag_active(),
            drop_hint: if state.drag_active() { DROP_HINT_DRAGGING } else { DROP_HINT_IDLE },
            download_file_name: download_file_name.to_string(),
        }
    }
}

impl Default for ConverterView {
    fn default() -> Self {
        Self::from_state(&ConverterState::default(), None, super::config::DEFAULT_DOWNLOAD_FILE_NAME)
    }
}
