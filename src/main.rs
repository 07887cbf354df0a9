// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # SVG 转 PNG 工具 — 应用入口
//!
//! 本文件仅负责应用初始化、窗口事件转发与命令注册。
//! 业务逻辑位于 `converter` 模块，详见 `lib.rs` 架构文档。

use svg_to_png::converter::{self, ConverterService, InputChannel};
use svg_to_png::settings;
use tauri::{DragDropEvent, Emitter, Manager, WindowEvent};

const VIEW_CHANGED_EVENT: &str = "converter-view-changed";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(ConverterService::new())
        .setup(|app| {
            log::info!("setup: begin");
            let handle = app.handle().clone();
            let service = app.state::<ConverterService>().inner().clone();

            // 恢复持久化配置，失败时沿用默认值
            match settings::settings_file_path(&handle).and_then(|path| settings::load_config(&path)) {
                Ok(config) => {
                    if let Err(err) = service.set_config(config) {
                        log::warn!("setup: 应用已保存配置失败，使用默认配置: {err}");
                    }
                }
                Err(err) => log::warn!("setup: 读取设置失败，使用默认配置: {err}"),
            }

            // 视图变化 → 前端事件
            let mut views = service.subscribe();
            tauri::async_runtime::spawn(async move {
                while views.changed().await.is_ok() {
                    let view = views.borrow_and_update().clone();
                    if let Err(err) = handle.emit(VIEW_CHANGED_EVENT, view) {
                        log::warn!("推送视图变化失败: {err}");
                    }
                }
            });

            log::info!("setup: complete");
            Ok(())
        })
        // 文件拖放：进入/离开切换提示文案，放下时读取第一个文件
        .on_window_event(|window, event| {
            let WindowEvent::DragDrop(drag) = event else {
                return;
            };
            let service = window.state::<ConverterService>().inner().clone();
            let drag = drag.clone();

            tauri::async_runtime::spawn(async move {
                let result = match drag {
                    DragDropEvent::Enter { .. } => service.set_drag_active(true).await,
                    DragDropEvent::Leave => service.set_drag_active(false).await,
                    DragDropEvent::Drop { paths, .. } => {
                        let loaded = service.load_from(InputChannel::Drop { files: paths }).await;
                        // 空文件或非文本时状态不变，拖放提示仍需复位
                        service.set_drag_active(false).await.and(loaded)
                    }
                    _ => return,
                };
                if let Err(err) = result {
                    log::warn!("处理拖放事件失败: {err}");
                }
            });
        })
        .invoke_handler(tauri::generate_handler![
            // 输入
            converter::commands::paste_svg,
            converter::commands::paste_from_system_clipboard,
            converter::commands::drop_svg_files,
            converter::commands::upload_svg_file,
            // 缩放与视图
            converter::commands::select_scale,
            converter::commands::set_drag_active,
            converter::commands::get_converter_view,
            // 导出
            converter::commands::copy_png_to_clipboard,
            converter::commands::get_png_download,
            converter::commands::save_png,
            // 配置
            converter::commands::get_converter_config,
            converter::commands::set_converter_config,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
