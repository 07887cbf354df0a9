//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ConverterConfig`，保证运行时行为可观测、可调整、可测试。
//! 配置以 JSON 形式持久化（见 `crate::settings`），字段缺省时回落到默认值。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置，其中复制提示时长固定语义为 2000ms。
//! - `validate` 在写入前做范围检查，拒绝明显错误的参数组合。
//! - 单次渲染/复制请求使用同一配置快照，避免处理中途配置漂移。

use serde::{Deserialize, Serialize};

use super::ConverterError;

/// 默认下载文件名。
pub const DEFAULT_DOWNLOAD_FILE_NAME: &str = "output.png";

/// 转换器配置。
///
/// 字段覆盖了输入读取、渲染、复制提示与下载四个环节。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// 单次渲染允许的最长耗时（毫秒），超时视为渲染失败。
    pub render_timeout_ms: u64,
    /// 输出画布像素上限（`width * height`）。
    pub max_output_pixels: u64,
    /// 拖入/上传文件允许的最大体积（字节）。
    pub max_input_bytes: u64,
    /// “Copied!” 提示的持续时间（毫秒）。
    pub copied_ack_ms: u64,
    /// 下载产物文件名。
    pub download_file_name: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            render_timeout_ms: 10_000,
            max_output_pixels: 64_000_000,
            max_input_bytes: 20 * 1024 * 1024,
            copied_ack_ms: 2_000,
            download_file_name: DEFAULT_DOWNLOAD_FILE_NAME.to_string(),
        }
    }
}

impl ConverterConfig {
    /// 校验配置取值范围。
    ///
    /// # 示例
    /// ```rust
    /// use svg_to_png::converter::ConverterConfig;
    ///
    /// let config = ConverterConfig::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConverterError> {
        if !(100..=120_000).contains(&self.render_timeout_ms) {
            return Err(ConverterError::InvalidInput(
                "render_timeout_ms 必须在 100~120000 毫秒之间".to_string(),
            ));
        }
        if self.max_output_pixels < 1_000_000 {
            return Err(ConverterError::InvalidInput(
                "max_output_pixels 不能小于 1000000".to_string(),
            ));
        }
        if self.max_input_bytes < 1024 {
            return Err(ConverterError::InvalidInput(
                "max_input_bytes 不能小于 1KB".to_string(),
            ));
        }
        if !(100..=60_000).contains(&self.copied_ack_ms) {
            return Err(ConverterError::InvalidInput(
                "copied_ack_ms 必须在 100~60000 毫秒之间".to_string(),
            ));
        }
        let name = self.download_file_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || !name.to_lowercase().ends_with(".png") {
            return Err(ConverterError::InvalidInput(format!(
                "download_file_name 必须是不含路径的 .png 文件名：{}",
                self.download_file_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.copied_ack_ms, 2_000);
        assert_eq!(config.download_file_name, "output.png");
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = ConverterConfig::default();
        config.render_timeout_ms = 10;
        assert!(matches!(config.validate(), Err(ConverterError::InvalidInput(_))));

        let mut config = ConverterConfig::default();
        config.copied_ack_ms = 0;
        assert!(matches!(config.validate(), Err(ConverterError::InvalidInput(_))));

        let mut config = ConverterConfig::default();
        config.max_input_bytes = 512;
        assert!(matches!(config.validate(), Err(ConverterError::InvalidInput(_))));
    }

    #[test]
    fn rejects_download_names_with_paths_or_wrong_extension() {
        for name in ["", "../output.png", "dir/output.png", "output.jpg"] {
            let config = ConverterConfig {
                download_file_name: name.to_string(),
                ..ConverterConfig::default()
            };
            assert!(config.validate().is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: ConverterConfig =
            serde_json::from_str(r#"{ "render_timeout_ms": 5000 }"#).expect("parse config");
        assert_eq!(parsed.render_timeout_ms, 5_000);
        assert_eq!(parsed.copied_ack_ms, 2_000);
        assert_eq!(parsed.download_file_name, "output.png");
    }
}
