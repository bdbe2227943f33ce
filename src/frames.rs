// src/frames.rs

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{PluginKind, WorkbenchError},
    render::RenderTarget,
    sanitizers::PluginInfo,
    utils::html,
};

/// Writes already-sanitized markup into a render target.
pub type InjectFn = Arc<dyn Fn(&mut dyn RenderTarget, &str) + Send + Sync>;

/// Named strategy for presenting sanitized HTML on a surface.
#[derive(Clone)]
pub struct FramePlugin {
    pub name: String,
    pub description: String,
    inject: InjectFn,
}

impl FramePlugin {
    /// Builds a frame from a document template.
    ///
    /// The returned injector always resets the target before writing, which
    /// keeps repeated injections free of stale content.
    pub fn new<F>(name: &str, description: &str, wrap: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let inject = move |target: &mut dyn RenderTarget, html: &str| {
            target.reset();
            target.write(&wrap(html));
        };
        Self {
            name: name.to_string(),
            description: description.to_string(),
            inject: Arc::new(inject),
        }
    }

    pub fn injector(&self) -> InjectFn {
        Arc::clone(&self.inject)
    }
}

impl std::fmt::Debug for FramePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePlugin")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registry of frame plugins, keyed by unique name.
#[derive(Debug, Default)]
pub struct FrameRegistry {
    plugins: HashMap<String, FramePlugin>,
    order: Vec<String>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: FramePlugin) -> Result<(), WorkbenchError> {
        if self.plugins.contains_key(&plugin.name) {
            return Err(WorkbenchError::DuplicateName {
                kind: PluginKind::Frame,
                name: plugin.name,
            });
        }
        self.order.push(plugin.name.clone());
        self.plugins.insert(plugin.name.clone(), plugin);
        Ok(())
    }

    pub fn with(mut self, plugin: FramePlugin) -> Result<Self, WorkbenchError> {
        self.register(plugin)?;
        Ok(self)
    }

    fn lookup(&self, name: &str) -> Result<&FramePlugin, WorkbenchError> {
        self.plugins
            .get(name)
            .ok_or_else(|| WorkbenchError::unknown_frame(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn describe(&self, name: &str) -> Result<&str, WorkbenchError> {
        self.lookup(name).map(|p| p.description.as_str())
    }

    pub fn injector_of(&self, name: &str) -> Result<InjectFn, WorkbenchError> {
        self.lookup(name).map(FramePlugin::injector)
    }

    pub fn list(&self) -> Vec<PluginInfo> {
        self.order
            .iter()
            .filter_map(|name| self.plugins.get(name))
            .map(|p| PluginInfo {
                name: p.name.clone(),
                description: p.description.clone(),
            })
            .collect()
    }

    /// Built-in frames. `stylesheet` is linked from the `styled` frame when set.
    pub fn builtin(stylesheet: Option<&str>) -> Self {
        let link = stylesheet
            .map(|href| {
                format!(
                    "<link rel=\"stylesheet\" media=\"all\" href=\"{}\">\n",
                    html::escape(href)
                )
            })
            .unwrap_or_default();

        let frames = [
            FramePlugin::new("clean", "Clean iframe", str::to_string),
            FramePlugin::new("redbase", "Red base style", |html| {
                format!("<html><body style=\"color: red;\">{html}</body></html>")
            }),
            FramePlugin::new("styled", "Site stylesheet", move |html| {
                format!(
                    "<html>\n{link}<body>\n<div class=\"tab-pane active\" id=\"feed\">\n\
                     <div class=\"message\"><div class=\"panel\"><div class=\"panel-body\">\n\
                     {html}\n</div></div></div></div>\n</body>\n</html>"
                )
            }),
        ];

        let mut registry = Self::new();
        for frame in frames {
            registry.register(frame).expect("builtin names are distinct");
        }
        registry
    }
}
