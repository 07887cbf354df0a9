//! 转换器设置持久化
//!
//! `ConverterConfig` 以 `settings.json` 保存。桌面端放在应用数据目录，
//! 其余场景（测试、命令行）可传入任意路径。文件不存在时使用默认配置。

use std::fs;
use std::path::Path;

use crate::converter::ConverterConfig;
use crate::error::AppError;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 读取设置；文件缺失返回默认配置，字段缺失按默认值补齐。
pub fn load_config(path: &Path) -> Result<ConverterConfig, AppError> {
    if !path.exists() {
        log::debug!("📄 设置文件不存在，使用默认配置：{}", path.display());
        return Ok(ConverterConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str::<ConverterConfig>(&content)
        .map_err(|e| AppError::Storage(format!("解析设置文件失败: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// 校验后写入设置（父目录不存在时自动创建）。
pub fn save_config(path: &Path, config: &ConverterConfig) -> Result<(), AppError> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Storage(format!("创建设置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Storage(format!("序列化设置失败: {}", e)))?;
    fs::write(path, content)?;
    log::info!("💾 设置已保存：{}", path.display());
    Ok(())
}

#[cfg(feature = "desktop")]
pub fn settings_file_path(app: &tauri::AppHandle) -> Result<std::path::PathBuf, AppError> {
    use tauri::Manager;

    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| AppError::Storage(format!("获取应用数据目录失败: {}", e)))?;

    fs::create_dir_all(&app_data_dir)
        .map_err(|e| AppError::Storage(format!("创建应用数据目录失败: {}", e)))?;

    Ok(app_data_dir.join(SETTINGS_FILE_NAME))
}

/// 桌面端“保存 PNG”的默认目录：系统下载目录，取不到时回退应用数据目录。
#[cfg(feature = "desktop")]
pub fn default_export_dir(app: &tauri::AppHandle) -> Result<std::path::PathBuf, AppError> {
    use tauri::Manager;

    app.path()
        .download_dir()
        .or_else(|_| app.path().app_data_dir())
        .map_err(|e| AppError::Storage(format!("获取导出目录失败: {}", e)))
}
