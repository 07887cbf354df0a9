//! # 栅格化模块
//!
//! ## 设计思路
//!
//! 把 SVG 画到与输出尺寸完全一致的位图上：原点 (0,0)，横纵分别拉伸铺满，
//! 与 `drawImage(img, 0, 0, width, height)` 的语义一致。
//!
//! ## 实现思路
//!
//! 1. 尺寸为 0 或像素数超过上限时直接拒绝，不分配内存
//! 2. `usvg` 解析为渲染树（系统字体库全局只加载一次）
//! 3. `resvg` + `tiny-skia` 绘制到预乘 alpha 的 `Pixmap`
//! 4. 反预乘为普通 RGBA，交给 PNG 编码与剪贴板写入

use std::sync::Arc;

use once_cell::sync::Lazy;
use tiny_skia::{Pixmap, Transform};
use usvg::{Options, Tree, fontdb};

use super::{ConverterConfig, ConverterError, OutputSize};

static FONT_DATABASE: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("🔤 系统字体加载完成 - {} 个字体", db.len());
    Arc::new(db)
});

/// 已绘制完成的位图（RGBA8，非预乘 alpha）。
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl RasterSurface {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> OutputSize {
        OutputSize::new(self.width, self.height)
    }

    /// RGBA 字节（`width * height * 4`）。
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 读取单个像素，越界返回 `None`。
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// 将 SVG 文本按输出尺寸绘制为位图。
///
/// 这是同步的 CPU 密集操作，服务层会把它放到阻塞线程池执行。
///
/// # 示例
/// ```rust
/// use svg_to_png::converter::{rasterize, ConverterConfig, OutputSize};
///
/// let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10"/></svg>"#;
/// let surface = rasterize(svg, OutputSize::new(20, 20), &ConverterConfig::default())?;
/// assert_eq!(surface.pixels().len(), 20 * 20 * 4);
/// # Ok::<(), svg_to_png::converter::ConverterError>(())
/// ```
pub fn rasterize(
    source: &str,
    size: OutputSize,
    config: &ConverterConfig,
) -> Result<RasterSurface, ConverterError> {
    validate_output_size(size, config)?;

    let mut options = Options::default();
    options.fontdb = Arc::clone(&FONT_DATABASE);

    let tree = Tree::from_str(source, &options)
        .map_err(|e| ConverterError::Render(format!("SVG 解码失败：{}", e)))?;

    let mut pixmap = Pixmap::new(size.width, size.height)
        .ok_or_else(|| ConverterError::ResourceLimit("无法分配画布".to_string()))?;

    let tree_size = tree.size();
    let transform = Transform::from_scale(
        size.width as f32 / tree_size.width(),
        size.height as f32 / tree_size.height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let pixels = demultiply(&pixmap);
    let expected_len = size.pixel_count() as usize * 4;
    if pixels.len() != expected_len {
        return Err(ConverterError::Render("绘制后像素数据长度异常".to_string()));
    }

    Ok(RasterSurface {
        width: size.width,
        height: size.height,
        pixels,
    })
}

/// 渲染后端。
///
/// 服务层在阻塞线程池中调用，并在外层施加 `render_timeout_ms` 超时。
pub trait SvgRenderer: Send + Sync + 'static {
    fn render(&self, source: &str, size: OutputSize, config: &ConverterConfig) -> Result<RasterSurface, ConverterError>;
}

/// 默认后端：`resvg`。
#[derive(Debug, Default, Clone, Copy)]
pub struct ResvgRenderer;

impl SvgRenderer for ResvgRenderer {
    fn render(&self, source: &str, size: OutputSize, config: &ConverterConfig) -> Result<RasterSurface, ConverterError> {
        rasterize(source, size, config)
    }
}

fn validate_output_size(size: OutputSize, config: &ConverterConfig) -> Result<(), ConverterError> {
    if size.is_empty() {
        return Err(ConverterError::Render(format!(
            "画布尺寸无效：{}x{}",
            size.width, size.height
        )));
    }

    let pixels = size.pixel_count();
    if pixels > config.max_output_pixels {
        return Err(ConverterError::ResourceLimit(format!(
            "输出像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_output_pixels
        )));
    }

    Ok(())
}

/// tiny-skia 输出预乘 alpha，PNG 与剪贴板需要普通 alpha。
fn demultiply(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        out.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="red"/></svg>"#;

    #[test]
    fn renders_at_requested_size() {
        let surface = rasterize(RED_SQUARE, OutputSize::new(40, 20), &ConverterConfig::default())
            .expect("render should succeed");
        assert_eq!(surface.size(), OutputSize::new(40, 20));
        assert_eq!(surface.pixels().len(), 40 * 20 * 4);
    }

    #[test]
    fn stretches_to_fill_the_canvas() {
        let surface = rasterize(RED_SQUARE, OutputSize::new(40, 20), &ConverterConfig::default())
            .expect("render should succeed");
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(39, 19), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(40, 0), None);
    }

    #[test]
    fn transparent_areas_stay_transparent() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="5" height="10" fill="blue"/></svg>"#;
        let surface = rasterize(svg, OutputSize::new(10, 10), &ConverterConfig::default())
            .expect("render should succeed");
        assert_eq!(surface.pixel(1, 5), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(8, 5).map(|p| p[3]), Some(0));
    }

    #[test]
    fn zero_size_is_rejected() {
        let result = rasterize(RED_SQUARE, OutputSize::new(0, 10), &ConverterConfig::default());
        assert!(matches!(result, Err(ConverterError::Render(_))));
    }

    #[test]
    fn oversized_output_is_rejected_before_allocation() {
        let config = ConverterConfig {
            max_output_pixels: 1_000_000,
            ..ConverterConfig::default()
        };
        let result = rasterize(RED_SQUARE, OutputSize::new(2_000, 2_000), &config);
        assert!(matches!(result, Err(ConverterError::ResourceLimit(_))));
    }

    #[test]
    fn undecodable_markup_is_a_render_error() {
        let result = rasterize("<svg", OutputSize::new(10, 10), &ConverterConfig::default());
        assert!(matches!(result, Err(ConverterError::Render(_))));
    }
}
