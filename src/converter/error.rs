//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载转换链路（输入 → 渲染 → 编码 → 导出）中的所有错误来源，
//! 避免字符串拼接式错误处理。通过 `thiserror` 保持人类可读错误，
//! 同时提供稳定的 `code()` / `stage()`，便于前端按分支展示。

/// 转换链路统一错误类型。
///
/// 该类型会在命令层被上转为 `AppError`，最终透传给前端。
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    #[error("输入无效：{0}")]
    InvalidInput(String),

    #[error("渲染错误：{0}")]
    Render(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("剪贴板错误：{0}")]
    Clipboard(String),

    #[error("剪贴板被占用：{0}")]
    ClipboardBusy(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("画布尚未就绪，暂不可导出")]
    NotReady,
}

impl ConverterError {
    /// 稳定错误码，供前端做分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::Render(_) => "E_RENDER",
            Self::Encode(_) => "E_ENCODE",
            Self::Clipboard(_) => "E_CLIPBOARD",
            Self::ClipboardBusy(_) => "E_CLIPBOARD_BUSY",
            Self::FileSystem(_) => "E_FILE",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::NotReady => "E_NOT_READY",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) | Self::FileSystem(_) => "input",
            Self::Render(_) | Self::Timeout(_) | Self::ResourceLimit(_) => "render",
            Self::Encode(_) | Self::NotReady => "export",
            Self::Clipboard(_) | Self::ClipboardBusy(_) => "copy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ConverterError;

    #[test]
    fn codes_and_stages_are_stable() {
        assert_eq!(ConverterError::NotReady.code(), "E_NOT_READY");
        assert_eq!(ConverterError::NotReady.stage(), "export");
        assert_eq!(ConverterError::Timeout("x".into()).stage(), "render");
        assert_eq!(ConverterError::ClipboardBusy("x".into()).code(), "E_CLIPBOARD_BUSY");
    }

    #[test]
    fn message_is_human_readable() {
        assert_eq!(ConverterError::Render("boom".into()).to_string(), "渲染错误：boom");
    }
}
