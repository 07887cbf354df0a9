//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 将与操作系统剪贴板交互的逻辑独立出来，便于隔离平台不稳定因素。
//! 写入端抽象为 `ClipboardSink`，生产环境使用 `arboard`，测试注入内存实现。
//! 写入在阻塞线程执行，避免阻塞 async 运行时。
//!
//! 每次复制只写一次，不做重试：失败原样返回给调用方，由用户决定是否再次复制。
//! 剪贴板被占用映射为 `ClipboardBusy`，其余失败映射为 `Clipboard`。

use std::borrow::Cow;
use std::sync::Arc;

use super::raster::RasterSurface;
use super::ConverterError;

/// 写入失败类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardFailureKind {
    /// 剪贴板被其他进程占用
    Busy,
    Failed,
}

/// 单次写入失败。
#[derive(Debug, Clone)]
pub struct ClipboardWriteFailure {
    pub kind: ClipboardFailureKind,
    pub message: String,
}

impl ClipboardWriteFailure {
    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Busy,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Failed,
            message: message.into(),
        }
    }
}

impl From<ClipboardWriteFailure> for ConverterError {
    fn from(failure: ClipboardWriteFailure) -> Self {
        match failure.kind {
            ClipboardFailureKind::Busy => ConverterError::ClipboardBusy(failure.message),
            ClipboardFailureKind::Failed => ConverterError::Clipboard(failure.message),
        }
    }
}

/// 图片剪贴板写入端。
///
/// 实现方在阻塞线程中被调用，可以执行同步 IO。
pub trait ClipboardSink: Send + Sync + 'static {
    fn write_image(&self, width: usize, height: usize, rgba: &[u8]) -> Result<(), ClipboardWriteFailure>;
}

/// 基于 `arboard` 的系统剪贴板。
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl ClipboardSink for ArboardClipboard {
    fn write_image(&self, width: usize, height: usize, rgba: &[u8]) -> Result<(), ClipboardWriteFailure> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ClipboardWriteFailure::busy(format!("无法访问剪贴板：{}", e)))?;

        let image_data = arboard::ImageData {
            width,
            height,
            bytes: Cow::Borrowed(rgba),
        };

        clipboard.set_image(image_data).map_err(|e| match e {
            arboard::Error::ClipboardOccupied => ClipboardWriteFailure::busy(format!("剪贴板被占用：{}", e)),
            other => ClipboardWriteFailure::failed(format!("复制失败：{}", other)),
        })
    }
}

/// 将位图写入剪贴板（单次写入）。
pub async fn copy_surface(sink: Arc<dyn ClipboardSink>, surface: Arc<RasterSurface>) -> Result<(), ConverterError> {
    log::debug!("📋 准备复制到剪贴板 - {}x{}", surface.width(), surface.height());

    let written = tokio::task::spawn_blocking(move || {
        sink.write_image(surface.width() as usize, surface.height() as usize, surface.pixels())
    })
    .await
    .map_err(|e| ConverterError::Clipboard(format!("线程执行失败：{}", e)))?;

    match written {
        Ok(()) => {
            log::info!("✅ 复制成功");
            Ok(())
        }
        Err(failure) => {
            log::warn!("❌ 复制失败: {}（kind={:?}）", failure.message, failure.kind);
            Err(failure.into())
        }
    }
}
