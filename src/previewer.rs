// src/previewer.rs

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use crate::{
    error::WorkbenchError,
    frames::FrameRegistry,
    layout::LayoutFlags,
    models::previewer::{PreviewerConfig, PreviewerSummary, RefreshStatus, SurfaceContent},
    render::{self, RenderTarget},
    sanitizers::{SanitizerRegistry, panic_message},
    utils::html,
};

/// Separator between step descriptions in a chain description.
pub const CHAIN_SEPARATOR: &str = " → ";

/// Id of the rendering surface of the previewer called `name`.
pub fn surface_id_for(name: &str) -> String {
    format!("viewer-{name}")
}

/// Id of the container (controls + surface) of the previewer called `name`.
pub fn container_id_for(name: &str) -> String {
    format!("previewer-{name}")
}

/// One sanitizer chain bound to one frame, with its own surface.
pub struct Previewer {
    config: PreviewerConfig,
    chain_description: String,
    frame_description: String,
    sanitizers: Arc<SanitizerRegistry>,
    frames: Arc<FrameRegistry>,
    target: Box<dyn RenderTarget>,
    layout: LayoutFlags,
    status: RefreshStatus,
}

impl Previewer {
    /// Resolves every name in `config` against the registries.
    ///
    /// Fails with [`WorkbenchError::UnknownPlugin`] on the first name that
    /// does not resolve, before anything is written to `target`.
    pub fn new(
        config: PreviewerConfig,
        sanitizers: Arc<SanitizerRegistry>,
        frames: Arc<FrameRegistry>,
        target: Box<dyn RenderTarget>,
    ) -> Result<Self, WorkbenchError> {
        if config.sanitizers.is_empty() {
            return Err(WorkbenchError::EmptyChain(config.name));
        }

        let chain_description = config
            .sanitizers
            .iter()
            .map(|name| sanitizers.describe(name))
            .collect::<Result<Vec<_>, _>>()?
            .join(CHAIN_SEPARATOR);
        let frame_description = frames.describe(&config.frame)?.to_string();

        Ok(Self {
            config,
            chain_description,
            frame_description,
            sanitizers,
            frames,
            target,
            layout: LayoutFlags::default(),
            status: RefreshStatus::Pending,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &PreviewerConfig {
        &self.config
    }

    pub fn surface_id(&self) -> String {
        surface_id_for(&self.config.name)
    }

    pub fn container_id(&self) -> String {
        container_id_for(&self.config.name)
    }

    pub fn chain_description(&self) -> &str {
        &self.chain_description
    }

    pub fn frame_description(&self) -> &str {
        &self.frame_description
    }

    pub fn status(&self) -> &RefreshStatus {
        &self.status
    }

    pub fn layout(&self) -> &LayoutFlags {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutFlags {
        &mut self.layout
    }

    pub fn target(&self) -> &dyn RenderTarget {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> &mut dyn RenderTarget {
        self.target.as_mut()
    }

    /// The previewer's output as a page would read it back: the inner HTML
    /// of the document body.
    pub fn rendered_html(&self) -> String {
        render::body_html(&self.target.content())
    }

    /// Runs the sanitizer chain over `source` and injects the result.
    ///
    /// On failure the surface is replaced by an inline error indicator and
    /// the error is returned; nothing else is touched.
    pub fn refresh(&mut self, source: &str) -> Result<(), WorkbenchError> {
        tracing::debug!(previewer = %self.config.name, "Updating previewer");

        let outcome = self
            .sanitizers
            .sanitize_chain(source, &self.config.sanitizers)
            .and_then(|sanitized| {
                let inject = self.frames.injector_of(&self.config.frame)?;
                let target = self.target.as_mut();
                catch_unwind(AssertUnwindSafe(|| inject(target, &sanitized))).map_err(|panic| {
                    WorkbenchError::InjectionFailure {
                        frame: self.config.frame.clone(),
                        message: panic_message(panic.as_ref()),
                    }
                })
            });

        match outcome {
            Ok(()) => {
                self.status = RefreshStatus::Ok;
                Ok(())
            }
            Err(err) => {
                self.show_error(&err);
                self.status = RefreshStatus::Failed {
                    error: err.to_string(),
                };
                Err(err)
            }
        }
    }

    fn show_error(&mut self, err: &WorkbenchError) {
        self.target.reset();
        self.target.write(&format!(
            "<div class=\"previewer-error\" role=\"alert\">{}</div>",
            html::escape(&err.to_string())
        ));
    }

    pub fn summary(&self, leader: bool) -> PreviewerSummary {
        PreviewerSummary {
            name: self.config.name.clone(),
            description: self.config.description.clone(),
            sanitizers: self.config.sanitizers.clone(),
            frame: self.config.frame.clone(),
            chain_description: self.chain_description.clone(),
            frame_description: self.frame_description.clone(),
            surface_id: self.surface_id(),
            container_id: self.container_id(),
            leader,
            layout: self.layout.clone(),
            refresh: self.status.clone(),
        }
    }

    pub fn surface_content(&self) -> SurfaceContent {
        let content = self.target.content();
        SurfaceContent {
            surface_id: self.surface_id(),
            body_html: render::body_html(&content),
            content,
            scroll: self.target.scroll_offset(),
        }
    }
}

impl std::fmt::Debug for Previewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Previewer")
            .field("name", &self.config.name)
            .field("sanitizers", &self.config.sanitizers)
            .field("frame", &self.config.frame)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
