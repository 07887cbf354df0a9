//! # Tauri 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `ConverterService`，保持命令函数薄、稳定、易测试。
//! 每个会改变状态的命令都返回最新 `ConverterView`，同时视图也会通过
//! `converter-view-changed` 事件广播。

use std::path::PathBuf;

use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

use super::{ConverterConfig, ConverterError, ConverterService, ConverterView, DownloadArtifact, InputChannel};
use crate::error::AppError;
use crate::settings;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConverterCommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<ConverterError> for ConverterCommandError {
    fn from(error: ConverterError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

impl From<AppError> for ConverterCommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Converter(inner) => inner.into(),
            other => Self {
                code: other.code(),
                stage: "app",
                message: other.to_string(),
            },
        }
    }
}

type CommandResult<T> = Result<T, ConverterCommandError>;

/// 前端粘贴事件：分别携带 `image/svg+xml` 与 `text/plain` 条目。
#[tauri::command]
pub async fn paste_svg(
    state: State<'_, ConverterService>,
    svg_xml: Option<String>,
    text: Option<String>,
) -> CommandResult<ConverterView> {
    Ok(state.load_from(InputChannel::Paste { svg_xml, text }).await?)
}

/// 直接读取系统剪贴板中的文本（快捷键粘贴）。
#[tauri::command]
pub async fn paste_from_system_clipboard(state: State<'_, ConverterService>) -> CommandResult<ConverterView> {
    let text = tokio::task::spawn_blocking(|| -> Result<Option<String>, AppError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| AppError::Clipboard(format!("无法访问剪贴板：{}", e)))?;
        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(AppError::Clipboard(format!("读取剪贴板失败：{}", e))),
        }
    })
    .await
    .map_err(|e| AppError::Clipboard(format!("线程执行失败：{}", e)))??;

    Ok(state.load_from(InputChannel::Paste { svg_xml: None, text }).await?)
}

/// 拖放文件（只读取第一个）。
#[tauri::command]
pub async fn drop_svg_files(state: State<'_, ConverterService>, paths: Vec<String>) -> CommandResult<ConverterView> {
    let files = paths.into_iter().map(PathBuf::from).collect();
    Ok(state.load_from(InputChannel::Drop { files }).await?)
}

/// 上传 `.svg` 文件；未传路径时弹出文件选择器。
#[tauri::command]
pub async fn upload_svg_file(
    app: AppHandle,
    state: State<'_, ConverterService>,
    path: Option<String>,
) -> CommandResult<ConverterView> {
    let file = match path {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let picked = tokio::task::spawn_blocking(move || {
                app.dialog().file().add_filter("SVG", &["svg"]).blocking_pick_file()
            })
            .await
            .map_err(|e| AppError::Window(format!("文件选择器执行失败：{}", e)))?;

            picked
                .map(|file| file.into_path())
                .transpose()
                .map_err(|e| AppError::Window(format!("无法解析所选文件路径：{}", e)))?
        }
    };

    Ok(state.load_from(InputChannel::Upload { file }).await?)
}

#[tauri::command]
pub async fn select_scale(state: State<'_, ConverterService>, multiplier: f64) -> CommandResult<ConverterView> {
    Ok(state.select_scale(multiplier).await?)
}

#[tauri::command]
pub async fn set_drag_active(state: State<'_, ConverterService>, active: bool) -> CommandResult<ConverterView> {
    Ok(state.set_drag_active(active).await?)
}

#[tauri::command]
pub fn get_converter_view(state: State<'_, ConverterService>) -> ConverterView {
    state.view()
}

#[tauri::command]
pub async fn copy_png_to_clipboard(state: State<'_, ConverterService>) -> CommandResult<ConverterView> {
    Ok(state.copy_to_clipboard().await?)
}

/// 返回 `output.png` 的 `application/octet-stream` Data URI，由前端触发下载。
#[tauri::command]
pub async fn get_png_download(state: State<'_, ConverterService>) -> CommandResult<DownloadArtifact> {
    Ok(state.download_artifact().await?)
}

/// 保存 PNG 到目录（默认系统下载目录），返回文件完整路径。
#[tauri::command]
pub async fn save_png(
    app: AppHandle,
    state: State<'_, ConverterService>,
    dir: Option<String>,
) -> CommandResult<String> {
    let dir = match dir {
        Some(dir) => PathBuf::from(dir),
        None => settings::default_export_dir(&app)?,
    };
    let path = state.save_png(&dir).await?;
    Ok(path.to_string_lossy().into_owned())
}

#[tauri::command]
pub fn get_converter_config(state: State<'_, ConverterService>) -> Result<ConverterConfig, AppError> {
    Ok(state.config()?)
}

/// 更新并持久化配置。
#[tauri::command]
pub fn set_converter_config(
    app: AppHandle,
    state: State<'_, ConverterService>,
    config: ConverterConfig,
) -> Result<(), AppError> {
    state.set_config(config.clone())?;
    settings::save_config(&settings::settings_file_path(&app)?, &config)
}
