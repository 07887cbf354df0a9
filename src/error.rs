//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，所有 `#[tauri::command]` 与设置读写
//! 统一返回 `Result<T, AppError>`，前端通过 `Serialize` 获得一致的错误信息。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ConverterError`、`std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 Tauri IPC 要求。

use serde::Serialize;

use crate::converter::ConverterError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 转换链路错误（读取 / 渲染 / 导出 / 复制）
    #[error("{0}")]
    Converter(#[from] ConverterError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件或应用目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 剪贴板读取失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 窗口操作失败
    #[error("窗口操作失败: {0}")]
    Window(String),
}

impl AppError {
    /// 稳定错误码，与 `ConverterError::code` 同一命名空间。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Converter(err) => err.code(),
            Self::Io(_) => "E_FILE",
            Self::Storage(_) => "E_STORAGE",
            Self::Clipboard(_) => "E_CLIPBOARD",
            Self::Window(_) => "E_WINDOW",
        }
    }
}

/// Tauri IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
