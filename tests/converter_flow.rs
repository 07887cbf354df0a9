// End-to-end flows through ConverterService: input → render → export.
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use svg_to_png::converter::{
    ClipboardSink, ClipboardWriteFailure, ConverterConfig, ConverterError, ConverterService, ConverterView,
    InputChannel, OutputSize, ParsedSize,
};

#[derive(Default)]
struct RecordingClipboard {
    images: Mutex<Vec<(usize, usize)>>,
}

impl ClipboardSink for RecordingClipboard {
    fn write_image(&self, width: usize, height: usize, _rgba: &[u8]) -> Result<(), ClipboardWriteFailure> {
        self.images.lock().expect("images lock").push((width, height));
        Ok(())
    }
}

fn service() -> (ConverterService, Arc<RecordingClipboard>) {
    let clipboard = Arc::new(RecordingClipboard::default());
    let service = ConverterService::with_clipboard(ConverterConfig::default(), clipboard.clone());
    (service, clipboard)
}

async fn settled(service: &ConverterService) -> ConverterView {
    let mut views = service.subscribe();
    tokio::time::timeout(
        Duration::from_secs(30),
        views.wait_for(|view| !view.rendering),
    )
    .await
    .expect("render should settle")
    .expect("service alive")
    .clone()
}

#[tokio::test]
async fn paste_scale_and_download() {
    let (service, _) = service();
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50"><circle cx="50" cy="25" r="20" fill="orange"/></svg>"#;

    let view = service
        .load_from(InputChannel::Paste {
            svg_xml: Some(svg.to_string()),
            text: None,
        })
        .await
        .expect("paste");
    assert_eq!(view.parsed_size, Some(ParsedSize::new(100.0, 50.0)));
    assert_eq!(view.output_size, OutputSize::new(100, 50));

    let view = service.select_scale(2.0).await.expect("scale");
    assert_eq!(view.output_size, OutputSize::new(200, 100));
    assert!(!view.ready);

    let view = settled(&service).await;
    assert!(view.ready);

    let artifact = service.download_artifact().await.expect("download");
    assert_eq!(artifact.file_name, "output.png");
    assert_eq!(artifact.mime_type, "application/octet-stream");
    assert!(artifact.data_uri.starts_with("data:application/octet-stream;base64,"));

    let png = artifact.png_bytes().expect("png bytes");
    let decoded = image::load_from_memory(&png).expect("valid png");
    assert_eq!((decoded.width(), decoded.height()), (200, 100));
}

#[tokio::test]
async fn uploaded_svg_without_view_box_is_never_exportable() {
    let (service, clipboard) = service();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("icon.svg");
    let mut file = std::fs::File::create(&path).expect("create");
    file.write_all(br#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24"><path d="M0 0h24v24H0z"/></svg>"#)
        .expect("write");

    let view = service
        .load_from(InputChannel::Upload { file: Some(path) })
        .await
        .expect("upload");
    assert!(view.has_svg);
    assert_eq!(view.parsed_size, Some(ParsedSize::ZERO));
    assert_eq!(view.output_size, OutputSize::ZERO);
    assert!(!view.ready);
    assert!(!view.rendering);

    for multiplier in [0.25, 1.0, 32.0] {
        let view = service.select_scale(multiplier).await.expect("scale");
        assert!(!view.ready);
    }

    assert!(matches!(service.copy_to_clipboard().await, Err(ConverterError::NotReady)));
    assert!(matches!(service.download_artifact().await, Err(ConverterError::NotReady)));
    assert!(clipboard.images.lock().expect("images lock").is_empty());
}

#[tokio::test]
async fn dropped_file_replaces_previous_svg_and_copies() {
    let (service, clipboard) = service();
    service
        .load_from(InputChannel::Paste {
            svg_xml: None,
            text: Some(r#"<svg viewBox="0 0 10 10"/>"#.to_string()),
        })
        .await
        .expect("paste");
    service.select_scale(8.0).await.expect("scale");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dropped.svg");
    std::fs::write(&path, r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 30 20"><rect width="30" height="20"/></svg>"#)
        .expect("write");

    let view = service
        .load_from(InputChannel::Drop { files: vec![path] })
        .await
        .expect("drop");
    assert_eq!(view.output_size, OutputSize::new(30, 20));

    let view = settled(&service).await;
    assert!(view.ready);

    let view = service.copy_to_clipboard().await.expect("copy");
    assert_eq!(view.copy_label, "Copied!");
    assert_eq!(*clipboard.images.lock().expect("images lock"), vec![(30, 20)]);
}

#[tokio::test]
async fn save_png_writes_output_file() {
    let (service, _) = service();
    service
        .load_from(InputChannel::Paste {
            svg_xml: None,
            text: Some(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><rect width="8" height="8" fill="red"/></svg>"#.to_string()),
        })
        .await
        .expect("paste");
    assert!(settled(&service).await.ready);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = service.save_png(dir.path()).await.expect("save");
    assert_eq!(path, dir.path().join("output.png"));

    let decoded = image::open(&path).expect("open png").to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 16));
    assert_eq!(decoded.get_pixel(2, 2).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(12, 12).0[3], 0);
}
