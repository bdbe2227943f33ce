// src/workbench.rs

use std::{collections::HashSet, sync::Arc};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    clipboard::ClipboardPayload,
    diff::{DiffView, DiffViewer},
    error::{PluginKind, WorkbenchError},
    frames::FrameRegistry,
    layout::LayoutFlag,
    models::{
        action::{Action, ActionOutcome},
        previewer::{PreviewerConfig, PreviewerSummary},
    },
    previewer::{Previewer, surface_id_for},
    render::{RenderTarget, ScrollOffset, TargetFactory},
    sanitizers::SanitizerRegistry,
    utils::html,
};

/// A previewer whose refresh failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
    pub previewer: String,
    pub error: String,
}

/// Result of one `refresh_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: usize,
    pub failures: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a scroll event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollOutcome {
    pub surface_id: String,
    pub offset: ScrollOffset,
    pub leader: bool,
    /// Surfaces moved to follow the leader, in previewer order.
    pub synced: Vec<String>,
}

/// The ordered set of previewers plus diff views and cross-cutting behavior.
///
/// The first previewer leads synchronized scrolling; every other previewer
/// follows it. Diff views live next to the previewers but are never part of
/// the previewer sequence.
pub struct Workbench {
    sanitizers: Arc<SanitizerRegistry>,
    frames: Arc<FrameRegistry>,
    diff_viewer: DiffViewer,
    make_target: Box<TargetFactory>,
    previewers: Vec<Previewer>,
    diffs: Vec<DiffView>,
    /// Surface the scroll observer is attached to.
    scroll_leader: Option<String>,
}

impl Workbench {
    pub fn new(
        sanitizers: Arc<SanitizerRegistry>,
        frames: Arc<FrameRegistry>,
        diff_viewer: DiffViewer,
        make_target: Box<TargetFactory>,
    ) -> Self {
        Self {
            sanitizers,
            frames,
            diff_viewer,
            make_target,
            previewers: Vec::new(),
            diffs: Vec::new(),
            scroll_leader: None,
        }
    }

    pub fn sanitizers(&self) -> &SanitizerRegistry {
        &self.sanitizers
    }

    pub fn frames(&self) -> &FrameRegistry {
        &self.frames
    }

    /// Replaces every previewer with one per config, in order, then
    /// refreshes them all from `source`.
    ///
    /// All configs are resolved before anything is replaced: on error the
    /// current previewers and diff views are left exactly as they were.
    pub fn initialize(
        &mut self,
        configs: &[PreviewerConfig],
        source: &str,
    ) -> Result<RefreshReport, WorkbenchError> {
        tracing::info!(count = configs.len(), "Initializing workbench");

        let mut seen = HashSet::new();
        for config in configs {
            if !seen.insert(config.name.as_str()) {
                return Err(WorkbenchError::DuplicateName {
                    kind: PluginKind::Previewer,
                    name: config.name.clone(),
                });
            }
            if config.sanitizers.is_empty() {
                return Err(WorkbenchError::EmptyChain(config.name.clone()));
            }
            for name in &config.sanitizers {
                self.sanitizers.describe(name)?;
            }
            self.frames.describe(&config.frame)?;
        }

        let mut previewers = Vec::with_capacity(configs.len());
        for config in configs {
            tracing::debug!(previewer = %config.name, "Creating previewer");
            let target = (self.make_target)(&surface_id_for(&config.name));
            previewers.push(Previewer::new(
                config.clone(),
                Arc::clone(&self.sanitizers),
                Arc::clone(&self.frames),
                target,
            )?);
        }

        self.diffs.clear();
        self.previewers = previewers;
        self.attach_scroll_sync();

        Ok(self.refresh_all(source))
    }

    fn attach_scroll_sync(&mut self) {
        self.scroll_leader = self.previewers.first().map(Previewer::surface_id);
        if let Some(leader) = &self.scroll_leader {
            tracing::info!("Scroll event handler on #{}", leader);
        }
    }

    /// Refreshes every previewer in configuration order. A failing previewer
    /// is reported and skipped; the rest still refresh.
    pub fn refresh_all(&mut self, source: &str) -> RefreshReport {
        tracing::info!(bytes = source.len(), "Updating previewers...");

        let mut report = RefreshReport::default();
        for previewer in &mut self.previewers {
            match previewer.refresh(source) {
                Ok(()) => report.refreshed += 1,
                Err(err) => {
                    tracing::warn!(previewer = %previewer.name(), "Refresh failed: {}", err);
                    report.failures.push(RefreshFailure {
                        previewer: previewer.name().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
        report
    }

    pub fn previewers(&self) -> &[Previewer] {
        &self.previewers
    }

    pub fn previewer(&self, name: &str) -> Result<&Previewer, WorkbenchError> {
        self.previewers
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| WorkbenchError::UnknownPreviewer(name.to_string()))
    }

    pub fn leader(&self) -> Option<&Previewer> {
        self.previewers.first()
    }

    pub fn scroll_leader(&self) -> Option<&str> {
        self.scroll_leader.as_deref()
    }

    pub fn summaries(&self) -> Vec<PreviewerSummary> {
        self.previewers
            .iter()
            .enumerate()
            .map(|(idx, p)| p.summary(idx == 0))
            .collect()
    }

    fn surface_mut(&mut self, surface_id: &str) -> Result<&mut dyn RenderTarget, WorkbenchError> {
        if let Some(previewer) = self
            .previewers
            .iter_mut()
            .find(|p| p.surface_id() == surface_id)
        {
            return Ok(previewer.target_mut());
        }
        Err(WorkbenchError::UnknownContainer(surface_id.to_string()))
    }

    /// A scroll event reported by a surface.
    ///
    /// The surface's own offset is recorded; if it is the leader, every
    /// follower is then moved to the same offset. Follower events stay local.
    pub fn handle_scroll(
        &mut self,
        surface_id: &str,
        x: i64,
        y: i64,
    ) -> Result<ScrollOutcome, WorkbenchError> {
        self.surface_mut(surface_id)?.set_scroll_offset(x, y);

        let leader = self.scroll_leader.as_deref() == Some(surface_id);
        let synced = if leader { self.sync_scroll() } else { Vec::new() };

        Ok(ScrollOutcome {
            surface_id: surface_id.to_string(),
            offset: ScrollOffset::new(x, y),
            leader,
            synced,
        })
    }

    /// Copies the leader's scroll offset onto every follower, both axes.
    /// The leader itself is never written.
    pub fn sync_scroll(&mut self) -> Vec<String> {
        let Some(leader_id) = self.scroll_leader.clone() else {
            return Vec::new();
        };
        let Some(offset) = self
            .previewers
            .iter()
            .find(|p| p.surface_id() == leader_id)
            .map(|p| p.target().scroll_offset())
        else {
            return Vec::new();
        };

        let mut synced = Vec::new();
        for follower in self
            .previewers
            .iter_mut()
            .filter(|p| p.surface_id() != leader_id)
        {
            follower.target_mut().set_scroll_offset(offset.x, offset.y);
            synced.push(follower.surface_id());
        }
        synced
    }

    /// Flips `flag` on the previewer or diff container `container_id` and
    /// returns whether it is now set.
    pub fn toggle(&mut self, container_id: &str, flag: LayoutFlag) -> Result<bool, WorkbenchError> {
        if let Some(previewer) = self
            .previewers
            .iter_mut()
            .find(|p| p.container_id() == container_id)
        {
            return Ok(previewer.layout_mut().toggle(flag));
        }
        if let Some(diff) = self.diffs.iter_mut().find(|d| d.container_id() == container_id) {
            return Ok(diff.layout_mut().toggle(flag));
        }
        Err(WorkbenchError::UnknownContainer(container_id.to_string()))
    }

    /// Canonicalizes and diffs two documents into a new diff view appended
    /// after the existing ones.
    pub fn show_diff(&mut self, before: &str, after: &str) -> Uuid {
        let view = self
            .diff_viewer
            .show_diff(before, after, self.make_target.as_ref());
        let id = view.id();
        tracing::info!(diff = %id, "Created diff view");
        self.diffs.push(view);
        id
    }

    pub fn diffs(&self) -> &[DiffView] {
        &self.diffs
    }

    pub fn diff(&self, id: Uuid) -> Result<&DiffView, WorkbenchError> {
        self.diffs
            .iter()
            .find(|d| d.id() == id)
            .ok_or(WorkbenchError::UnknownDiff(id))
    }

    pub fn dismiss_diff(&mut self, id: Uuid) -> Result<(), WorkbenchError> {
        let position = self
            .diffs
            .iter()
            .position(|d| d.id() == id)
            .ok_or(WorkbenchError::UnknownDiff(id))?;
        self.diffs.remove(position);
        Ok(())
    }

    /// Routes a UI command to the previewer, container or diff it names.
    ///
    /// `source` is the current raw HTML, needed by diff actions. Copy and
    /// process actions only compute their payload; the caller performs the
    /// clipboard write or the source replacement.
    pub fn dispatch(&mut self, action: Action, source: &str) -> Result<ActionOutcome, WorkbenchError> {
        tracing::info!(?action, "Dispatching action");

        match action {
            Action::CopyHtml { previewer } => {
                let text = self.previewer(&previewer)?.rendered_html();
                Ok(ActionOutcome::Copied {
                    payload: ClipboardPayload::Text { text },
                })
            }
            Action::CopyRichText { previewer } => {
                let rendered = self.previewer(&previewer)?.rendered_html();
                let alt_text = html::plain_text(&rendered);
                Ok(ActionOutcome::Copied {
                    payload: ClipboardPayload::Html {
                        html: rendered,
                        alt_text,
                    },
                })
            }
            Action::ViewDiff { previewer } => {
                let after = self.previewer(&previewer)?.rendered_html();
                let diff = self.show_diff(source, &after);
                Ok(ActionOutcome::DiffCreated { diff })
            }
            Action::ProcessThis { previewer } => {
                let source = self.previewer(&previewer)?.rendered_html();
                Ok(ActionOutcome::SourceReplaced { source })
            }
            Action::Toggle { container, flag } => {
                let enabled = self.toggle(&container, flag)?;
                Ok(ActionOutcome::Toggled {
                    container,
                    flag,
                    enabled,
                })
            }
            Action::DismissDiff { diff } => {
                self.dismiss_diff(diff)?;
                Ok(ActionOutcome::DiffDismissed { diff })
            }
        }
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("previewers", &self.previewers)
            .field("diffs", &self.diffs)
            .field("scroll_leader", &self.scroll_leader)
            .finish_non_exhaustive()
    }
}
