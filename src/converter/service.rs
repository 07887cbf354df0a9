//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `ConverterService` 作为 Tauri 注入状态，替代全局单例。
//! 状态与画布放在同一把锁里：状态迁移、generation 校验与画布提交都在锁内完成，
//! 过期的渲染结果不会覆盖新画布。
//!
//! ## 实现思路
//!
//! - 所有状态变化走 `reduce`，返回的 `Effect` 在锁外执行（渲染、复制提示计时）
//! - 渲染在阻塞线程池执行，并受 `render_timeout_ms` 约束
//! - 每次状态变化都通过 `watch` 通道广播最新 `ConverterView`
//! - 单次渲染/复制使用同一份配置快照

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::clipboard_writer::{self, ArboardClipboard, ClipboardSink};
use super::export::{self, DownloadArtifact};
use super::input::{self, InputChannel};
use super::raster::{RasterSurface, ResvgRenderer, SvgRenderer};
use super::state::{ConverterEvent, ConverterState, Effect, RenderPhase, RenderRequest, reduce};
use super::{ConverterConfig, ConverterError, ConverterView, ScaleOption};

#[derive(Debug, Default)]
struct Session {
    state: ConverterState,
    surface: Option<Arc<RasterSurface>>,
    render_error: Option<String>,
}

struct Inner {
    session: Mutex<Session>,
    config: RwLock<ConverterConfig>,
    clipboard: Arc<dyn ClipboardSink>,
    renderer: Arc<dyn SvgRenderer>,
    view_tx: watch::Sender<ConverterView>,
}

/// 转换器服务。
///
/// 克隆开销很小，所有克隆共享同一份状态。
#[derive(Clone)]
pub struct ConverterService {
    inner: Arc<Inner>,
}

impl ConverterService {
    /// 使用默认配置与系统剪贴板创建服务。
    pub fn new() -> Self {
        Self::with_clipboard(ConverterConfig::default(), Arc::new(ArboardClipboard))
    }

    /// 使用自定义配置创建服务（会先校验配置）。
    ///
    /// # 示例
    /// ```rust
    /// use svg_to_png::converter::{ConverterConfig, ConverterService};
    ///
    /// let config = ConverterConfig { render_timeout_ms: 5_000, ..ConverterConfig::default() };
    /// let service = ConverterService::with_config(config)?;
    /// assert!(!service.view().ready);
    /// # Ok::<(), svg_to_png::converter::ConverterError>(())
    /// ```
    pub fn with_config(config: ConverterConfig) -> Result<Self, ConverterError> {
        config.validate()?;
        Ok(Self::with_clipboard(config, Arc::new(ArboardClipboard)))
    }

    /// 注入剪贴板实现（测试使用内存剪贴板）。
    pub fn with_clipboard(config: ConverterConfig, clipboard: Arc<dyn ClipboardSink>) -> Self {
        Self::with_backends(config, clipboard, Arc::new(ResvgRenderer))
    }

    /// 同时注入剪贴板与渲染后端。
    pub fn with_backends(
        config: ConverterConfig,
        clipboard: Arc<dyn ClipboardSink>,
        renderer: Arc<dyn SvgRenderer>,
    ) -> Self {
        let session = Session::default();
        let view = ConverterView::from_state(&session.state, None, &config.download_file_name);
        let (view_tx, _) = watch::channel(view);
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                config: RwLock::new(config),
                clipboard,
                renderer,
                view_tx,
            }),
        }
    }

    /// 当前视图快照。
    pub fn view(&self) -> ConverterView {
        self.inner.view_tx.borrow().clone()
    }

    /// 订阅视图变化。
    pub fn subscribe(&self) -> watch::Receiver<ConverterView> {
        self.inner.view_tx.subscribe()
    }

    /// 从任一输入来源获取 SVG，拿到内容时整体替换当前 SVG。
    pub async fn load_from(&self, channel: InputChannel) -> Result<ConverterView, ConverterError> {
        let config = self.inner.config_snapshot()?;
        match input::acquire(channel, &config).await? {
            Some(text) => self.inner.apply(ConverterEvent::MarkupLoaded(text)),
            None => Ok(self.view()),
        }
    }

    /// 选择缩放倍率。
    pub async fn select_scale(&self, multiplier: f64) -> Result<ConverterView, ConverterError> {
        let option = ScaleOption::from_multiplier(multiplier)?;
        self.inner.apply(ConverterEvent::ScaleSelected(option))
    }

    pub async fn set_drag_active(&self, active: bool) -> Result<ConverterView, ConverterError> {
        let event = if active { ConverterEvent::DragEntered } else { ConverterEvent::DragLeft };
        self.inner.apply(event)
    }

    /// 把当前画布写入系统剪贴板，成功后显示 “Copied!”。
    pub async fn copy_to_clipboard(&self) -> Result<ConverterView, ConverterError> {
        let surface = self.inner.ready_surface()?;

        let started = Instant::now();
        clipboard_writer::copy_surface(Arc::clone(&self.inner.clipboard), surface).await?;
        log::info!("⏱️ copy 耗时 {}ms", started.elapsed().as_millis());

        self.inner.apply(ConverterEvent::CopySucceeded)
    }

    /// 生成下载产物（`output.png`，`application/octet-stream`）。
    pub async fn download_artifact(&self) -> Result<DownloadArtifact, ConverterError> {
        let surface = self.inner.ready_surface()?;
        let file_name = self.inner.config_snapshot()?.download_file_name;

        let started = Instant::now();
        let artifact = tokio::task::spawn_blocking(move || DownloadArtifact::build(&surface, &file_name))
            .await
            .map_err(|e| ConverterError::Encode(format!("线程执行失败：{}", e)))??;
        log::info!(
            "⏱️ encode 耗时 {}ms - {}x{}",
            started.elapsed().as_millis(),
            artifact.width,
            artifact.height
        );
        Ok(artifact)
    }

    /// 保存到目录下的 `download_file_name`。
    pub async fn save_png(&self, dir: &Path) -> Result<PathBuf, ConverterError> {
        let surface = self.inner.ready_surface()?;
        let file_name = self.inner.config_snapshot()?.download_file_name;
        export::save_png(surface, dir, &file_name).await
    }

    pub fn config(&self) -> Result<ConverterConfig, ConverterError> {
        self.inner.config_snapshot()
    }

    /// 更新配置，对之后的渲染与复制生效。
    pub fn set_config(&self, config: ConverterConfig) -> Result<(), ConverterError> {
        config.validate()?;
        {
            let mut guard = self
                .inner
                .config
                .write()
                .map_err(|_| ConverterError::ResourceLimit("配置写入锁已中毒".to_string()))?;
            *guard = config;
        }
        log::info!("⚙️ 转换器配置已更新");
        self.inner.republish()
    }
}

impl Default for ConverterService {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, ConverterError> {
        self.session
            .lock()
            .map_err(|_| ConverterError::ResourceLimit("转换器状态锁已中毒".to_string()))
    }

    fn config_snapshot(&self) -> Result<ConverterConfig, ConverterError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ConverterError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 执行一次状态迁移并广播视图，异步副作用在锁外启动。
    fn apply(self: &Arc<Self>, event: ConverterEvent) -> Result<ConverterView, ConverterError> {
        let (view, deferred) = {
            let mut session = self.lock_session()?;
            let deferred = self.transition_locked(&mut session, event);
            (self.publish_locked(&session)?, deferred)
        };

        for effect in deferred {
            self.spawn_effect(effect);
        }
        Ok(view)
    }

    /// 锁内迁移：画布清理立即执行，其余副作用返回给调用方。
    fn transition_locked(&self, session: &mut Session, event: ConverterEvent) -> Vec<Effect> {
        let transition = reduce(&session.state, event);
        session.state = transition.state;

        let mut deferred = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::ClearSurface => {
                    session.surface = None;
                    session.render_error = None;
                }
                other => deferred.push(other),
            }
        }
        deferred
    }

    fn publish_locked(&self, session: &Session) -> Result<ConverterView, ConverterError> {
        let file_name = self.config_snapshot()?.download_file_name;
        let view = ConverterView::from_state(&session.state, session.render_error.as_deref(), &file_name);
        self.view_tx.send_replace(view.clone());
        Ok(view)
    }

    fn republish(&self) -> Result<(), ConverterError> {
        let session = self.lock_session()?;
        self.publish_locked(&session).map(|_| ())
    }

    fn ready_surface(&self) -> Result<Arc<RasterSurface>, ConverterError> {
        let session = self.lock_session()?;
        match (&session.surface, session.state.is_ready()) {
            (Some(surface), true) => Ok(Arc::clone(surface)),
            _ => Err(ConverterError::NotReady),
        }
    }

    fn spawn_effect(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::ClearSurface => {}
            Effect::StartRender(request) => {
                let inner = Arc::clone(self);
                tokio::spawn(async move { inner.run_render(request).await });
            }
            Effect::ScheduleCopiedReset { token } => {
                let inner = Arc::clone(self);
                let ack_ms = match self.config_snapshot() {
                    Ok(config) => config.copied_ack_ms,
                    Err(_) => ConverterConfig::default().copied_ack_ms,
                };
                let deadline = tokio::time::Instant::now() + Duration::from_millis(ack_ms);
                tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    if let Err(err) = inner.apply(ConverterEvent::CopiedExpired { token }) {
                        log::warn!("⚠️ 复制提示复位失败：{}", err);
                    }
                });
            }
        }
    }

    async fn run_render(self: Arc<Self>, request: RenderRequest) {
        let RenderRequest { generation, source, size } = request;
        let outcome = match self.config_snapshot() {
            Ok(config) => render_with_timeout(Arc::clone(&self.renderer), source, size, config).await,
            Err(err) => Err(err),
        };

        if let Err(err) = self.commit_render(generation, outcome) {
            log::warn!("⚠️ 渲染结果提交失败 - generation {}：{}", generation, err);
        }
    }

    /// 提交渲染结果：只有 generation 仍是最新的待渲染请求时才写入画布。
    fn commit_render(
        &self,
        generation: u64,
        outcome: Result<RasterSurface, ConverterError>,
    ) -> Result<(), ConverterError> {
        let mut session = self.lock_session()?;
        if session.state.render_phase() != (RenderPhase::Pending { generation }) {
            log::debug!(
                "🗑️ 丢弃过期渲染结果 - generation {}（当前 {}）",
                generation,
                session.state.generation()
            );
            return Ok(());
        }

        let event = match outcome {
            Ok(surface) => {
                session.surface = Some(Arc::new(surface));
                ConverterEvent::RenderCompleted { generation }
            }
            Err(err) => {
                log::warn!("⚠️ 渲染失败，导出保持禁用 - generation {}：{}", generation, err);
                session.render_error = Some(err.to_string());
                ConverterEvent::RenderFailed { generation }
            }
        };

        let deferred = self.transition_locked(&mut session, event);
        debug_assert!(deferred.is_empty());
        self.publish_locked(&session).map(|_| ())
    }
}

/// 阻塞线程池渲染 + 超时。
///
/// 超时后后台线程会自然结束，结果被丢弃。
async fn render_with_timeout(
    renderer: Arc<dyn SvgRenderer>,
    source: Arc<str>,
    size: super::OutputSize,
    config: ConverterConfig,
) -> Result<RasterSurface, ConverterError> {
    let timeout_ms = config.render_timeout_ms;
    let started = Instant::now();
    let job = tokio::task::spawn_blocking(move || renderer.render(&source, size, &config));

    let surface = match tokio::time::timeout(Duration::from_millis(timeout_ms), job).await {
        Ok(joined) => joined.map_err(|e| ConverterError::Render(format!("线程执行失败：{}", e)))??,
        Err(_) => {
            return Err(ConverterError::Timeout(format!("渲染超过 {}ms", timeout_ms)));
        }
    };

    log::info!(
        "⏱️ render 耗时 {}ms - {}x{}",
        started.elapsed().as_millis(),
        size.width,
        size.height
    );
    Ok(surface)
}
