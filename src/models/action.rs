// src/models/action.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{clipboard::ClipboardPayload, layout::LayoutFlag};

/// A UI command, addressed to exactly one previewer, container or diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    /// Copy the previewer's rendered body HTML as plain text.
    CopyHtml { previewer: String },
    /// Copy the rendered body HTML as HTML, with a text alternative.
    CopyRichText { previewer: String },
    /// Diff the raw source against the previewer's rendered body HTML.
    ViewDiff { previewer: String },
    /// Make the previewer's rendered body HTML the new source.
    ProcessThis { previewer: String },
    /// Flip a layout flag on a previewer or diff container.
    Toggle { container: String, flag: LayoutFlag },
    DismissDiff { diff: Uuid },
}

/// Result of dispatching an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ActionOutcome {
    Copied { payload: ClipboardPayload },
    DiffCreated { diff: Uuid },
    SourceReplaced { source: String },
    Toggled { container: String, flag: LayoutFlag, enabled: bool },
    DiffDismissed { diff: Uuid },
}
