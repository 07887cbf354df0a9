//! # SVG 转 PNG 工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  前端 (WebView)                           │
//! │                                                          │
//! │  粘贴 / 拖放 / 上传 ── 倍率按钮 ── 复制 / 下载            │
//! │       ↕  invoke                    ↑ converter-view-changed │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Tauri IPC (Result<T, ConverterCommandError | AppError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ converter ── ConverterService (状态 + 画布)           │
//! │  │   ├─ state          纯函数状态机 + generation          │
//! │  │   ├─ markup/scale   viewBox 解析 / 倍率换算            │
//! │  │   ├─ raster         resvg 栅格化                       │
//! │  │   └─ export         PNG / Data URI / 剪贴板            │
//! │  │                                                       │
//! │  └─ settings           settings.json 读写                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，Tauri command 与设置读写的返回类型 |
//! | [`converter`] | SVG 获取、解析、缩放、栅格化、导出与复制 |
//! | [`settings`] | `ConverterConfig` 的持久化 |
//!
//! 桌面壳（窗口、IPC 命令）位于 `desktop` 特性之后，核心库不依赖 WebView。

pub mod converter;
pub mod error;
pub mod settings;
