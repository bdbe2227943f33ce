// src/session.rs

use crate::{
    error::WorkbenchError,
    models::{
        action::{Action, ActionOutcome},
        previewer::PreviewerConfig,
    },
    workbench::{RefreshReport, Workbench},
};

/// The raw HTML being examined together with the workbench showing it.
///
/// Every change to the source refreshes all previewers in order.
#[derive(Debug)]
pub struct Session {
    source: String,
    configs: Vec<PreviewerConfig>,
    workbench: Workbench,
}

impl Session {
    /// Initializes `workbench` from `configs` with an empty source.
    pub fn start(
        mut workbench: Workbench,
        configs: Vec<PreviewerConfig>,
    ) -> Result<Self, WorkbenchError> {
        workbench.initialize(&configs, "")?;
        Ok(Self {
            source: String::new(),
            configs,
            workbench,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn configs(&self) -> &[PreviewerConfig] {
        &self.configs
    }

    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    pub fn workbench_mut(&mut self) -> &mut Workbench {
        &mut self.workbench
    }

    pub fn set_source(&mut self, source: String) -> RefreshReport {
        tracing::info!("Raw HTML changed");
        self.source = source;
        self.workbench.refresh_all(&self.source)
    }

    pub fn clear(&mut self) -> RefreshReport {
        self.set_source(String::new())
    }

    /// Rebuilds every previewer, optionally from a new configuration.
    /// A rejected configuration leaves the session untouched.
    pub fn reinitialize(
        &mut self,
        configs: Option<Vec<PreviewerConfig>>,
    ) -> Result<RefreshReport, WorkbenchError> {
        let configs = configs.unwrap_or_else(|| self.configs.clone());
        let report = self.workbench.initialize(&configs, &self.source)?;
        self.configs = configs;
        Ok(report)
    }

    /// Dispatches `action` and applies source replacements it produces.
    pub fn dispatch(&mut self, action: Action) -> Result<ActionOutcome, WorkbenchError> {
        let outcome = self.workbench.dispatch(action, &self.source)?;
        if let ActionOutcome::SourceReplaced { source } = &outcome {
            self.set_source(source.clone());
        }
        Ok(outcome)
    }
}
