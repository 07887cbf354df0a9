//! # 导出模块
//!
//! 位图 → PNG 字节，以及下载产物（`output.png` 的 Data URI / 落盘文件）。
//!
//! 下载 Data URI 的 MIME 固定为 `application/octet-stream`，
//! 让 WebView 触发下载而不是在页面内打开图片。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::Serialize;

use super::raster::RasterSurface;
use super::ConverterError;

pub const DOWNLOAD_MIME: &str = "application/octet-stream";

/// 编码为 PNG。
pub fn encode_png(surface: &RasterSurface) -> Result<Vec<u8>, ConverterError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            surface.pixels(),
            surface.width(),
            surface.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ConverterError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(buf)
}

/// 下载产物。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    /// `data:application/octet-stream;base64,...`
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

impl DownloadArtifact {
    pub fn build(surface: &RasterSurface, file_name: &str) -> Result<Self, ConverterError> {
        let png = encode_png(surface)?;
        let data_uri = format!(
            "data:{};base64,{}",
            DOWNLOAD_MIME,
            general_purpose::STANDARD.encode(&png)
        );
        Ok(Self {
            file_name: file_name.to_string(),
            mime_type: DOWNLOAD_MIME,
            data_uri,
            width: surface.width(),
            height: surface.height(),
        })
    }

    /// 还原 PNG 字节。
    pub fn png_bytes(&self) -> Result<Vec<u8>, ConverterError> {
        let payload = self
            .data_uri
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| ConverterError::Encode("缺少 base64 标记".to_string()))?;
        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ConverterError::Encode(format!("Base64 解码失败：{}", e)))
    }
}

/// 保存到目录，文件名取配置中的下载文件名（已存在则覆盖）。
///
/// PNG 编码在阻塞线程池执行。
pub async fn save_png(
    surface: Arc<RasterSurface>,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ConverterError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ConverterError::FileSystem(format!("创建目录 '{}' 失败：{}", dir.display(), e)))?;
    let path = dir.join(file_name);

    let png = tokio::task::spawn_blocking(move || encode_png(&surface))
        .await
        .map_err(|e| ConverterError::Encode(format!("线程执行失败：{}", e)))??;

    tokio::fs::write(&path, &png)
        .await
        .map_err(|e| ConverterError::FileSystem(format!("写入文件 '{}' 失败：{}", path.display(), e)))?;
    log::info!("💾 PNG 已保存 - {} ({} 字节)", path.display(), png.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConverterConfig, OutputSize, rasterize};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn surface(width: u32, height: u32) -> Arc<RasterSurface> {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 4 2"><rect width="2" height="2" fill="#00f"/></svg>"##;
        Arc::new(rasterize(svg, OutputSize::new(width, height), &ConverterConfig::default()).expect("render"))
    }

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let surface = surface(8, 4);
        let png = encode_png(&surface).expect("encode");
        assert_eq!(png[..8], PNG_SIGNATURE);

        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.as_raw().as_slice(), surface.pixels());
    }

    #[test]
    fn download_artifact_uses_octet_stream() {
        let artifact = DownloadArtifact::build(&surface(8, 4), "output.png").expect("artifact");
        assert_eq!(artifact.file_name, "output.png");
        assert!(artifact.data_uri.starts_with("data:application/octet-stream;base64,iVBORw0KGgo"));
        assert_eq!((artifact.width, artifact.height), (8, 4));
        assert_eq!(artifact.png_bytes().expect("decode")[..8], PNG_SIGNATURE);
    }

    #[tokio::test]
    async fn save_png_writes_file_into_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("nested");
        let path = save_png(surface(8, 4), &target, "output.png").await.expect("save");
        assert_eq!(path, target.join("output.png"));

        let bytes = std::fs::read(&path).expect("read back");
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[tokio::test]
    async fn save_png_reports_unwritable_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").expect("write blocker");

        let result = save_png(surface(8, 4), &blocker, "output.png").await;
        assert!(matches!(result, Err(ConverterError::FileSystem(_))));
    }
}
