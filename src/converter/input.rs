//! # 输入获取模块
//!
//! ## 设计思路
//!
//! 三种来源（粘贴 / 拖放 / 上传）统一为 `InputChannel`，最终只产出一段 SVG 文本。
//! 任何来源拿到空结果都视为“什么也没发生”，返回 `Ok(None)`，上层保持原状态。
//!
//! ## 实现思路
//!
//! - 粘贴：优先 `image/svg+xml` 条目，回退 `text/plain`
//! - 拖放：只读第一个文件
//! - 上传：仅接受 `.svg` 扩展名
//! - 读文件前检查体积上限，读取后用 `infer` 拒绝二进制内容（如误拖入 PNG）

use std::path::{Path, PathBuf};

use super::{ConverterConfig, ConverterError};

const UTF8_BOM: &str = "\u{feff}";

/// SVG 输入来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputChannel {
    /// 剪贴板粘贴，分别携带 SVG MIME 条目与纯文本条目。
    Paste {
        svg_xml: Option<String>,
        text: Option<String>,
    },
    /// 拖放的文件列表（只取第一个）。
    Drop { files: Vec<PathBuf> },
    /// 文件选择器选中的文件。
    Upload { file: Option<PathBuf> },
}

impl InputChannel {
    /// 来源标识（用于日志与诊断）。
    pub fn source_hint(&self) -> &'static str {
        match self {
            Self::Paste { .. } => "paste",
            Self::Drop { .. } => "drop",
            Self::Upload { .. } => "upload",
        }
    }
}

/// 从指定来源获取 SVG 文本。
///
/// # 返回
/// - `Ok(Some(text))`：拿到非空文本，调用方整体替换当前 SVG
/// - `Ok(None)`：来源为空，调用方保持原状态
/// - `Err(..)`：文件读取失败、扩展名不符或体积超限
pub async fn acquire(
    channel: InputChannel,
    config: &ConverterConfig,
) -> Result<Option<String>, ConverterError> {
    let source_hint = channel.source_hint();
    let acquired = match channel {
        InputChannel::Paste { svg_xml, text } => Ok(pick_paste_payload(svg_xml, text)),
        InputChannel::Drop { files } => match files.into_iter().next() {
            Some(path) => read_text_file(&path, config).await,
            None => Ok(None),
        },
        InputChannel::Upload { file } => match file {
            Some(path) => {
                ensure_svg_extension(&path)?;
                read_text_file(&path, config).await
            }
            None => Ok(None),
        },
    }?;

    match &acquired {
        Some(text) => log::debug!("📥 获取到 SVG 输入 - 来源: {} 长度: {}", source_hint, text.len()),
        None => log::debug!("📭 输入为空，忽略 - 来源: {}", source_hint),
    }

    Ok(acquired)
}

/// 粘贴内容选择：SVG MIME 条目优先，空字符串视为缺失。
fn pick_paste_payload(svg_xml: Option<String>, text: Option<String>) -> Option<String> {
    svg_xml
        .filter(|s| !s.is_empty())
        .or_else(|| text.filter(|s| !s.is_empty()))
}

fn ensure_svg_extension(path: &Path) -> Result<(), ConverterError> {
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        Ok(())
    } else {
        Err(ConverterError::InvalidInput(format!(
            "仅支持 .svg 文件：{}",
            path.display()
        )))
    }
}

/// 以文本方式读取文件。
async fn read_text_file(
    path: &Path,
    config: &ConverterConfig,
) -> Result<Option<String>, ConverterError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ConverterError::FileSystem(format!("无法读取文件 '{}'：{}", path.display(), e)))?;

    if metadata.len() > config.max_input_bytes {
        return Err(ConverterError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_input_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ConverterError::FileSystem(format!("无法读取文件 '{}'：{}", path.display(), e)))?;

    Ok(decode_text(&bytes, path))
}

/// 字节 → 文本；二进制或非 UTF-8 内容返回 `None`。
fn decode_text(bytes: &[u8], path: &Path) -> Option<String> {
    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Text {
            log::warn!(
                "🚫 文件不是文本（识别为 {}），忽略：{}",
                kind.mime_type(),
                path.display()
            );
            return None;
        }
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => {
            let text = text.strip_prefix(UTF8_BOM).map(str::to_string).unwrap_or(text);
            (!text.is_empty()).then_some(text)
        }
        Err(err) => {
            log::warn!("🚫 文件不是有效的 UTF-8 文本，忽略：{}（{}）", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 4 4"/>"#;

    fn write_temp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create temp file");
        file.write_all(bytes).expect("write temp file");
        path
    }

    #[tokio::test]
    async fn paste_prefers_svg_mime_entry() {
        let config = ConverterConfig::default();
        let acquired = acquire(
            InputChannel::Paste {
                svg_xml: Some("<svg id='mime'/>".into()),
                text: Some("<svg id='text'/>".into()),
            },
            &config,
        )
        .await
        .expect("paste should succeed");
        assert_eq!(acquired.as_deref(), Some("<svg id='mime'/>"));
    }

    #[tokio::test]
    async fn paste_falls_back_to_plain_text() {
        let config = ConverterConfig::default();
        let acquired = acquire(
            InputChannel::Paste {
                svg_xml: Some(String::new()),
                text: Some("<svg id='text'/>".into()),
            },
            &config,
        )
        .await
        .expect("paste should succeed");
        assert_eq!(acquired.as_deref(), Some("<svg id='text'/>"));
    }

    #[tokio::test]
    async fn empty_sources_are_noops() {
        let config = ConverterConfig::default();
        let cases = [
            InputChannel::Paste { svg_xml: None, text: Some(String::new()) },
            InputChannel::Drop { files: Vec::new() },
            InputChannel::Upload { file: None },
        ];
        for channel in cases {
            let acquired = acquire(channel, &config).await.expect("empty input is not an error");
            assert!(acquired.is_none());
        }
    }

    #[tokio::test]
    async fn drop_reads_only_the_first_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = write_temp(&dir, "a.svg", SVG.as_bytes());
        let second = write_temp(&dir, "b.svg", b"<svg id='second'/>");
        let config = ConverterConfig::default();

        let acquired = acquire(InputChannel::Drop { files: vec![first, second] }, &config)
            .await
            .expect("drop should succeed");
        assert_eq!(acquired.as_deref(), Some(SVG));
    }

    #[tokio::test]
    async fn empty_dropped_file_is_noop() {
        let dir = tempfile::tempdir().expect("temp dir");
        let empty = write_temp(&dir, "empty.svg", b"");
        let config = ConverterConfig::default();

        let acquired = acquire(InputChannel::Drop { files: vec![empty] }, &config)
            .await
            .expect("drop should succeed");
        assert!(acquired.is_none());
    }

    #[tokio::test]
    async fn upload_rejects_non_svg_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_temp(&dir, "image.txt", SVG.as_bytes());
        let config = ConverterConfig::default();

        let result = acquire(InputChannel::Upload { file: Some(path) }, &config).await;
        assert!(matches!(result, Err(ConverterError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn upload_strips_bom_and_accepts_uppercase_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut bytes = UTF8_BOM.as_bytes().to_vec();
        bytes.extend_from_slice(SVG.as_bytes());
        let path = write_temp(&dir, "ICON.SVG", &bytes);
        let config = ConverterConfig::default();

        let acquired = acquire(InputChannel::Upload { file: Some(path) }, &config)
            .await
            .expect("upload should succeed");
        assert_eq!(acquired.as_deref(), Some(SVG));
    }

    #[tokio::test]
    async fn binary_drop_is_ignored() {
        let dir = tempfile::tempdir().expect("temp dir");
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        let path = write_temp(&dir, "photo.png", &png_header);
        let config = ConverterConfig::default();

        let acquired = acquire(InputChannel::Drop { files: vec![path] }, &config)
            .await
            .expect("binary drop is not an error");
        assert!(acquired.is_none());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_temp(&dir, "big.svg", &vec![b' '; 4096]);
        let config = ConverterConfig {
            max_input_bytes: 1024,
            ..ConverterConfig::default()
        };

        let result = acquire(InputChannel::Drop { files: vec![path] }, &config).await;
        assert!(matches!(result, Err(ConverterError::ResourceLimit(_))));
    }

    #[tokio::test]
    async fn missing_file_reports_file_system_error() {
        let config = ConverterConfig::default();
        let result = acquire(
            InputChannel::Upload { file: Some(PathBuf::from("/definitely/not/here.svg")) },
            &config,
        )
        .await;
        assert!(matches!(result, Err(ConverterError::FileSystem(_))));
    }
}
