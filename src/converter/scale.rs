//! # 尺寸与缩放档位
//!
//! 输出尺寸永远相对原始 `viewBox` 尺寸计算：`round(原始尺寸 × 倍率)`，
//! 多次选择档位不会累乘。

use serde::{Deserialize, Serialize};

use super::ConverterError;

/// 固定的缩放档位。
pub const SCALE_OPTIONS: [f64; 8] = [0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0];

/// 从 `viewBox` 读取到的原始尺寸（可能带小数）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedSize {
    pub width: f64,
    pub height: f64,
}

impl ParsedSize {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 输出位图尺寸（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub const ZERO: Self = Self { width: 0, height: 0 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 按倍率由原始尺寸推导输出尺寸。
    ///
    /// 浮点转整数使用饱和转换，超大尺寸会在渲染阶段被像素上限拒绝。
    ///
    /// # 示例
    /// ```rust
    /// use svg_to_png::converter::{OutputSize, ParsedSize};
    ///
    /// let size = OutputSize::scaled(ParsedSize::new(100.0, 50.0), 0.25);
    /// assert_eq!(size, OutputSize::new(25, 13));
    /// ```
    pub fn scaled(parsed: ParsedSize, multiplier: f64) -> Self {
        Self {
            width: scale_dimension(parsed.width, multiplier),
            height: scale_dimension(parsed.height, multiplier),
        }
    }

    /// 任一边为 0 时没有可绘制的画布。
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

fn scale_dimension(value: f64, multiplier: f64) -> u32 {
    let scaled = (value * multiplier).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u32
    } else {
        0
    }
}

/// 缩放档位（只能取 `SCALE_OPTIONS` 中的值）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleOption(f64);

impl ScaleOption {
    /// 从外部传入的倍率解析档位。
    pub fn from_multiplier(multiplier: f64) -> Result<Self, ConverterError> {
        SCALE_OPTIONS
            .iter()
            .copied()
            .find(|option| *option == multiplier)
            .map(Self)
            .ok_or_else(|| {
                ConverterError::InvalidInput(format!(
                    "未知缩放倍率：{}（可选：{}）",
                    multiplier,
                    SCALE_OPTIONS
                        .iter()
                        .map(|m| m.to_string())
                        .collect::<Vec<_>>()
                        .join(" / ")
                ))
            })
    }

    /// 全部档位，按从小到大的顺序。
    pub fn all() -> impl Iterator<Item = Self> {
        SCALE_OPTIONS.into_iter().map(Self)
    }

    pub fn multiplier(self) -> f64 {
        self.0
    }

    /// 按钮文案，如 `0.25x`、`2x`。
    pub fn label(self) -> String {
        format!("{}x", self.0)
    }

    pub fn apply(self, parsed: ParsedSize) -> OutputSize {
        OutputSize::scaled(parsed, self.0)
    }
}
