// src/models/previewer.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{layout::LayoutFlags, render::ScrollOffset};

/// Declarative description of one previewer.
///
/// `sanitizers` is applied left to right; `frame` names the frame plugin
/// that presents the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PreviewerConfig {
    #[validate(length(min = 1, max = 64), custom(function = validate_identifier))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub description: String,

    #[validate(length(min = 1, message = "A previewer needs at least one sanitizer"))]
    pub sanitizers: Vec<String>,

    #[validate(length(min = 1, max = 64))]
    pub frame: String,
}

impl PreviewerConfig {
    pub fn new(name: &str, sanitizers: &[&str], frame: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            sanitizers: sanitizers.iter().map(|s| s.to_string()).collect(),
            frame: frame.to_string(),
        }
    }

    /// The previewers a fresh server starts with.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("ogclean", &["original"], "clean"),
            Self::new("whitelistStyled", &["original", "ammonia-whitelist"], "styled"),
            Self::new("wordPasteRedbase", &["original", "word-paste"], "redbase"),
            Self::new("ammoniaRedbase", &["original", "ammonia"], "redbase"),
            Self::new("whitelistRedbase", &["original", "ammonia-whitelist"], "redbase"),
        ]
    }
}

/// Names end up in element ids, so keep them to a safe alphabet.
fn validate_identifier(name: &str) -> Result<(), validator::ValidationError> {
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(validator::ValidationError::new("invalid_identifier"));
    }
    Ok(())
}

/// Body of `POST /api/workbench/init`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct InitRequest {
    /// Replaces the startup configuration when present.
    #[validate(nested)]
    pub previewers: Option<Vec<PreviewerConfig>>,
}

/// Outcome of the most recent refresh of a previewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RefreshStatus {
    Pending,
    Ok,
    Failed { error: String },
}

/// What the API reports about a previewer.
#[derive(Debug, Serialize)]
pub struct PreviewerSummary {
    pub name: String,
    pub description: String,
    pub sanitizers: Vec<String>,
    pub frame: String,
    pub chain_description: String,
    pub frame_description: String,
    pub surface_id: String,
    pub container_id: String,
    pub leader: bool,
    pub layout: LayoutFlags,
    pub refresh: RefreshStatus,
}

/// Current state of a previewer's rendering surface.
#[derive(Debug, Serialize)]
pub struct SurfaceContent {
    pub surface_id: String,
    pub content: String,
    pub body_html: String,
    pub scroll: ScrollOffset,
}
