// src/sanitizers.rs

use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    error::{PluginKind, WorkbenchError},
    utils::html,
};

/// A single sanitizing step. Returns the transformed markup or a message
/// describing why the step could not run.
pub type SanitizeFn = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// Named, described HTML transform.
#[derive(Clone)]
pub struct SanitizerPlugin {
    pub name: String,
    pub description: String,
    transform: SanitizeFn,
}

impl SanitizerPlugin {
    pub fn new<F>(name: &str, description: &str, transform: F) -> Self
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            transform: Arc::new(transform),
        }
    }

    /// Wraps a transform that cannot report errors.
    pub fn infallible<F>(name: &str, description: &str, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(name, description, move |html| Ok(transform(html)))
    }

    pub fn transform(&self) -> SanitizeFn {
        Arc::clone(&self.transform)
    }
}

impl std::fmt::Debug for SanitizerPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanitizerPlugin")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Name and description pair, as listed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
}

/// Registry of sanitizer plugins, keyed by unique name.
///
/// Built once at startup and shared read-only. Lookups never fall back to a
/// default: a miss is always [`WorkbenchError::UnknownPlugin`].
#[derive(Debug, Default)]
pub struct SanitizerRegistry {
    plugins: HashMap<String, SanitizerPlugin>,
    order: Vec<String>,
}

impl SanitizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: SanitizerPlugin) -> Result<(), WorkbenchError> {
        if self.plugins.contains_key(&plugin.name) {
            return Err(WorkbenchError::DuplicateName {
                kind: PluginKind::Sanitizer,
                name: plugin.name,
            });
        }
        self.order.push(plugin.name.clone());
        self.plugins.insert(plugin.name.clone(), plugin);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, plugin: SanitizerPlugin) -> Result<Self, WorkbenchError> {
        self.register(plugin)?;
        Ok(self)
    }

    fn lookup(&self, name: &str) -> Result<&SanitizerPlugin, WorkbenchError> {
        self.plugins
            .get(name)
            .ok_or_else(|| WorkbenchError::unknown_sanitizer(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn describe(&self, name: &str) -> Result<&str, WorkbenchError> {
        self.lookup(name).map(|p| p.description.as_str())
    }

    pub fn transform_of(&self, name: &str) -> Result<SanitizeFn, WorkbenchError> {
        self.lookup(name).map(SanitizerPlugin::transform)
    }

    /// Applies one named transform.
    ///
    /// Errors and panics inside the transform both come back as
    /// [`WorkbenchError::SanitizationFailure`].
    pub fn sanitize(&self, html: &str, name: &str) -> Result<String, WorkbenchError> {
        let plugin = self.lookup(name)?;
        let outcome = catch_unwind(AssertUnwindSafe(|| (plugin.transform)(html)));

        match outcome {
            Ok(Ok(sanitized)) => Ok(sanitized),
            Ok(Err(message)) => Err(WorkbenchError::SanitizationFailure {
                plugin: name.to_string(),
                message,
            }),
            Err(panic) => Err(WorkbenchError::SanitizationFailure {
                plugin: name.to_string(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    /// Left fold of `names` over `html`: the output of step i feeds step i+1.
    /// An empty chain returns the input unchanged.
    pub fn sanitize_chain<S: AsRef<str>>(
        &self,
        html: &str,
        names: &[S],
    ) -> Result<String, WorkbenchError> {
        names
            .iter()
            .try_fold(html.to_string(), |acc, name| self.sanitize(&acc, name.as_ref()))
    }

    /// Plugins in registration order.
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

    /// The registry every server instance starts with.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let plugins = [
            SanitizerPlugin::infallible("original", "Original HTML", str::to_string),
            SanitizerPlugin::infallible("word-paste", "Word paste cleanup", html::clean_word_paste),
            SanitizerPlugin::infallible("ammonia", "Ammonia (standard)", html::clean_html),
            SanitizerPlugin::infallible(
                "ammonia-whitelist",
                "Ammonia (restricted whitelist)",
                html::clean_html_whitelist,
            ),
            SanitizerPlugin::infallible("text-only", "Text only", html::strip_all_tags),
        ];
        for plugin in plugins {
            registry.register(plugin).expect("builtin names are distinct");
        }
        registry
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "transform panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SanitizerRegistry {
        SanitizerRegistry::new()
            .with(SanitizerPlugin::infallible("original", "Original HTML", str::to_string))
            .unwrap()
            .with(SanitizerPlugin::infallible("upper", "Uppercase", |s| s.to_uppercase()))
            .unwrap()
            .with(SanitizerPlugin::infallible("wrap", "Wrap in div", |s| {
                format!("<div>{s}</div>")
            }))
            .unwrap()
    }

    #[test]
    fn chain_is_a_left_fold() {
        let reg = registry();
        let chain = ["original", "wrap", "upper"];
        let expected = chain.iter().fold("<p>hi</p>".to_string(), |acc, name| {
            (reg.transform_of(name).unwrap())(&acc).unwrap()
        });
        assert_eq!(reg.sanitize_chain("<p>hi</p>", &chain).unwrap(), expected);
        assert_eq!(expected, "<DIV><P>HI</P></DIV>");
    }

    #[test]
    fn empty_chain_is_identity() {
        let reg = registry();
        let empty: [&str; 0] = [];
        assert_eq!(reg.sanitize_chain("<i>x</i>", &empty).unwrap(), "<i>x</i>");
    }

    #[test]
    fn order_matters_for_non_commuting_steps() {
        let reg = SanitizerRegistry::new()
            .with(SanitizerPlugin::infallible("a", "append a", |s| format!("{s}a")))
            .unwrap()
            .with(SanitizerPlugin::infallible("b", "append b", |s| format!("{s}b")))
            .unwrap();
        assert_eq!(reg.sanitize_chain("", &["a", "b"]).unwrap(), "ab");
        assert_eq!(reg.sanitize_chain("", &["b", "a"]).unwrap(), "ba");
    }

    #[test]
    fn lookups_fail_loudly() {
        let reg = registry();
        assert_eq!(reg.describe("upper").unwrap(), "Uppercase");
        assert!(matches!(
            reg.describe("nope"),
            Err(WorkbenchError::UnknownPlugin { kind: PluginKind::Sanitizer, .. })
        ));
        assert!(reg.transform_of("nope").is_err());
        assert!(matches!(
            reg.sanitize_chain("x", &["original", "nope"]),
            Err(WorkbenchError::UnknownPlugin { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = registry();
        let err = reg
            .register(SanitizerPlugin::infallible("upper", "again", str::to_string))
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::DuplicateName { .. }));
    }

    #[test]
    fn panicking_transform_becomes_failure() {
        let reg = SanitizerRegistry::new()
            .with(SanitizerPlugin::infallible("boom", "Panics", |_| panic!("bad input")))
            .unwrap();
        match reg.sanitize("x", "boom") {
            Err(WorkbenchError::SanitizationFailure { plugin, message }) => {
                assert_eq!(plugin, "boom");
                assert_eq!(message, "bad input");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn builtin_registry_lists_in_registration_order() {
        let names: Vec<_> = SanitizerRegistry::builtin()
            .list()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            ["original", "word-paste", "ammonia", "ammonia-whitelist", "text-only"]
        );
    }
}
