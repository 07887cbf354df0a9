//! # SVG 转 PNG 模块（converter）
//!
//! ## 设计思路
//!
//! 把“获取 SVG → 解析尺寸 → 选择倍率 → 栅格化 → 导出”按职责拆分为多个子模块。
//! 所有界面状态由一个纯函数状态机维护，副作用（渲染、计时）由服务层执行，
//! 因而状态规则可以脱离窗口与渲染器直接测试。
//!
//! - `commands`：仅做 IPC 入参/出参适配（薄封装，`desktop` 特性）
//! - `service`：承载可注入状态（`ConverterService`）
//! - `state`：状态、事件与 `reduce`
//! - `view`：广播给前端的只读快照
//! - `input`：粘贴 / 拖放 / 上传三种来源
//! - `markup`：定位 `<svg>` 并读取 `viewBox`
//! - `scale`：缩放档位与尺寸换算
//! - `raster`：resvg 栅格化
//! - `export`：PNG 编码、下载产物与落盘
//! - `clipboard_writer`：写入剪贴板
//! - `config/error`：配置与错误
//!
//! ## 新同事快速上手
//!
//! ```text
//! 前端 invoke
//!    ↓
//! commands.rs（参数适配）
//!    ↓
//! service.rs（加锁 → reduce → 广播视图）
//!    ├─ input.rs（读取来源）
//!    ├─ state.rs（纯状态迁移，返回 Effect）
//!    ├─ raster.rs（阻塞线程池渲染 + 超时 + generation 校验）
//!    ├─ export.rs（PNG / Data URI / 文件）
//!    └─ clipboard_writer.rs（写剪贴板）
//!    ↓
//! converter-view-changed 事件 / AppError 返回给前端
//! ```
//!
//! ## 分层职责建议
//!
//! - 状态规则（何时重绘、何时可导出）只改 `state.rs`
//! - 调用入口变更（命令名/参数）优先改 `commands.rs`
//! - 配置与策略变更优先改 `config.rs`

pub mod clipboard_writer;
#[cfg(feature = "desktop")]
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod input;
pub mod markup;
pub mod raster;
mod scale;
mod service;
pub mod state;
mod view;

pub use clipboard_writer::{ArboardClipboard, ClipboardSink, ClipboardWriteFailure};
pub use config::{ConverterConfig, DEFAULT_DOWNLOAD_FILE_NAME};
pub use error::ConverterError;
pub use export::DownloadArtifact;
pub use input::InputChannel;
pub use markup::{SvgMarkup, parse_markup, parse_view_box, preview_data_uri};
pub use raster::{RasterSurface, ResvgRenderer, SvgRenderer, rasterize};
pub use scale::{OutputSize, ParsedSize, SCALE_OPTIONS, ScaleOption};
pub use service::ConverterService;
pub use state::{ConverterEvent, ConverterState, Effect, RenderPhase, RenderRequest, Transition, reduce};
pub use view::{COPIED_LABEL, COPY_LABEL, ConverterView, ScaleButton};
