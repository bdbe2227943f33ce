// src/handlers/page.rs

use std::fmt::Write as _;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::{
    diff::DiffView,
    error::AppError,
    fixtures,
    layout::LayoutFlag,
    previewer::Previewer,
    state::{SharedSession, lock},
    utils::html::escape,
};

const PAGE_SCRIPT: &str = r##"
async function call(method, path, body) {
  const res = await fetch(path, {
    method,
    headers: { "Content-Type": "application/json" },
    body: body === undefined ? undefined : JSON.stringify(body),
  });
  if (!res.ok) {
    const err = await res.json().catch(() => ({ error: res.statusText }));
    alert(err.error);
    throw new Error(err.error);
  }
  return res.status === 204 ? null : res.json();
}
async function act(action) {
  await call("POST", "/api/actions", action);
  if (!action.kind.startsWith("copy")) location.reload();
}
document.querySelector("#source-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  await call("PUT", "/api/source", { html: document.querySelector("#raw-html").value });
  location.reload();
});
document.querySelectorAll("[data-post]").forEach((b) =>
  b.addEventListener("click", async () => {
    await call("POST", b.dataset.post);
    location.reload();
  })
);
document.querySelectorAll("[data-action]").forEach((b) =>
  b.addEventListener("click", () => act(JSON.parse(b.dataset.action)))
);
document.querySelectorAll("iframe[data-leader]").forEach((frame) =>
  frame.addEventListener("load", () => {
    frame.contentWindow.addEventListener("scroll", async () => {
      const win = frame.contentWindow;
      const out = await call("POST", "/api/scroll", {
        surfaceId: frame.id,
        x: Math.round(win.scrollX),
        y: Math.round(win.scrollY),
      });
      out.synced.forEach((id) => {
        const follower = document.getElementById(id);
        if (follower) follower.contentWindow.scrollTo(out.offset.x, out.offset.y);
      });
    });
  })
);
"##;

const PAGE_STYLE: &str = r#"
body { font-family: sans-serif; margin: 1em; }
.previewer, .diff { border: 1px solid #ccc; margin: 0.5em 0; padding: 0.5em; }
.previewer iframe { width: 100%; height: 240px; border: 1px solid #eee; }
.maximize iframe { height: 640px; }
.fullscreen { position: fixed; inset: 0; background: #fff; z-index: 10; overflow: auto; }
.pinLeft { float: left; width: 48%; }
.pinRight { float: right; width: 48%; }
.overlay { opacity: 0.6; }
.controls button { margin-right: 0.3em; }
.split td { vertical-align: top; }
.split td.line-number { color: #999; text-align: right; }
.split td.delete { background: #fff0f0; }
.split td.insert { background: #f0fff0; }
.split td.moved { background: #f0f4ff; border-left: 3px solid #68f; }
.split del { background: #fdd; }
.split ins { background: #dfd; }
.previewer-error, .diff-error { color: #b00; }
"#;

fn action_button(out: &mut String, label: &str, action: serde_json::Value) {
    let _ = write!(
        out,
        "<button type=\"button\" data-action=\"{}\">{}</button>",
        escape(&action.to_string()),
        escape(label)
    );
}

fn render_previewer(out: &mut String, previewer: &Previewer, leader: bool) {
    let name = previewer.name();
    let container_id = previewer.container_id();
    let _ = write!(
        out,
        "<section class=\"previewer {}\" id=\"{}\"><h3>{}</h3><p class=\"chain\">{} | {}</p><div class=\"controls\">",
        previewer.layout().css_classes(),
        escape(&container_id),
        escape(name),
        escape(previewer.chain_description()),
        escape(previewer.frame_description()),
    );

    for (label, kind) in [
        ("Copy HTML", "copyHtml"),
        ("Copy rich text", "copyRichText"),
        ("View diff", "viewDiff"),
        ("Process this", "processThis"),
    ] {
        action_button(out, label, serde_json::json!({ "kind": kind, "previewer": name }));
    }
    for flag in LayoutFlag::ALL {
        action_button(
            out,
            flag.label(),
            serde_json::json!({ "kind": "toggle", "container": container_id, "flag": flag }),
        );
    }

    let _ = write!(
        out,
        "</div><iframe id=\"{}\" sandbox=\"allow-same-origin\"{} srcdoc=\"{}\"></iframe></section>",
        escape(&previewer.surface_id()),
        if leader { " data-leader" } else { "" },
        escape(&previewer.target().content()),
    );
}

fn render_diff(out: &mut String, diff: &DiffView) {
    let container_id = diff.container_id();
    let _ = write!(
        out,
        "<section class=\"diff {}\" id=\"{}\"><div class=\"controls\">",
        diff.layout().css_classes(),
        escape(&container_id),
    );
    for flag in [LayoutFlag::Maximize, LayoutFlag::Fullscreen] {
        action_button(
            out,
            flag.label(),
            serde_json::json!({ "kind": "toggle", "container": container_id, "flag": flag }),
        );
    }
    action_button(out, "Close", serde_json::json!({ "kind": "dismissDiff", "diff": diff.id() }));
    let _ = write!(
        out,
        "</div><div id=\"{}\">{}</div></section>",
        escape(&diff.surface_id()),
        diff.target().content(),
    );
}

/// The workbench page: source form, previewers in order, then diff views.
pub async fn index(State(session): State<SharedSession>) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    let workbench = session.workbench();

    let mut out = String::with_capacity(16 * 1024);
    let _ = write!(
        out,
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Sanitize bench</title><style>{}</style></head><body>",
        PAGE_STYLE
    );
    let _ = write!(
        out,
        "<form id=\"source-form\"><textarea id=\"raw-html\" rows=\"10\" cols=\"100\">{}</textarea><div class=\"controls\"><button type=\"submit\">Update</button><button type=\"button\" data-post=\"/api/source/clear\">Clear</button>",
        escape(session.source())
    );
    for fixture in fixtures::FIXTURES {
        let _ = write!(
            out,
            "<button type=\"button\" data-post=\"/api/source/example/{}\">{}</button>",
            fixture.name,
            escape(fixture.description)
        );
    }
    out.push_str("</div></form><div id=\"previewers\">");

    for (idx, previewer) in workbench.previewers().iter().enumerate() {
        render_previewer(&mut out, previewer, idx == 0);
    }
    out.push_str("</div><div id=\"diffs\">");
    for diff in workbench.diffs() {
        render_diff(&mut out, diff);
    }
    let _ = write!(out, "</div><script>{}</script></body></html>", PAGE_SCRIPT);

    Ok(Html(out))
}
