// src/models/workbench.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    diff::DiffSummary,
    models::previewer::PreviewerSummary,
    sanitizers::PluginInfo,
    workbench::RefreshReport,
};

/// DTO for replacing the raw source.
#[derive(Debug, Deserialize, Validate)]
pub struct SourceRequest {
    #[validate(length(max = 1000000, message = "Source must be at most 1MB"))]
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub html: String,
}

/// Scroll event reported by a rendering surface.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScrollRequest {
    #[validate(length(min = 1, max = 128))]
    pub surface_id: String,
    #[validate(range(min = 0))]
    pub x: i64,
    #[validate(range(min = 0))]
    pub y: i64,
}

/// DTO for an ad-hoc diff between two documents.
#[derive(Debug, Deserialize, Validate)]
pub struct DiffRequest {
    #[validate(length(max = 1000000))]
    pub before: String,
    #[validate(length(max = 1000000))]
    pub after: String,
}

#[derive(Debug, Serialize)]
pub struct PluginsResponse {
    pub sanitizers: Vec<PluginInfo>,
    pub frames: Vec<PluginInfo>,
}

/// Result of anything that refreshed the previewers.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    #[serde(flatten)]
    pub report: RefreshReport,
    pub previewers: Vec<PreviewerSummary>,
}

#[derive(Debug, Serialize)]
pub struct DiffListResponse {
    pub diffs: Vec<DiffSummary>,
}
