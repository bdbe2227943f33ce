use std::{
    collections::HashSet,
    sync::LazyLock,
};

use ammonia::Builder;
use regex::Regex;

/// Clean HTML content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: it preserves safe tags
/// (like <b>, <p>) while stripping dangerous tags (like <script>, <iframe>)
/// and malicious attributes (like onclick).
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Escapes text for element content and double-quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Tags kept by the restricted whitelist policy.
const WHITELIST_TAGS: &[&str] = &[
    "strong", "em", "b", "i", "p", "code", "pre", "tt", "samp", "kbd", "var", "sub", "sup", "dfn",
    "cite", "big", "small", "address", "hr", "br", "div", "span", "h1", "h2", "h3", "h4", "h5",
    "h6", "ul", "ol", "li", "dl", "dt", "dd", "abbr", "acronym", "a", "img", "blockquote", "del",
    "ins", "style", "table", "thead", "tbody", "tr", "th", "td", "font", "section", "u", "bdi",
];

/// Attributes allowed on any whitelisted tag.
const WHITELIST_ATTRIBUTES: &[&str] = &[
    "href", "src", "width", "height", "alt", "cite", "datetime", "title", "class", "name",
    "xml:lang", "abbr", "style", "color",
];

/// Sanitizes with a restricted tag/attribute whitelist, the kind of policy
/// a rails-html-sanitizer setup would apply to user messages.
///
/// `<style>` is allowed as a tag, so it has to be dropped from ammonia's
/// clean-content set (ammonia refuses a tag that is both).
pub fn clean_html_whitelist(input: &str) -> String {
    let tags: HashSet<&str> = WHITELIST_TAGS.iter().copied().collect();
    let attributes: HashSet<&str> = WHITELIST_ATTRIBUTES.iter().copied().collect();

    Builder::default()
        .tags(tags)
        .generic_attributes(attributes)
        .clean_content_tags(HashSet::from(["script"]))
        .clean(input)
        .to_string()
}

/// Removes every tag, keeping only the (escaped) text. Script and style
/// bodies go with their tags.
pub fn strip_all_tags(input: &str) -> String {
    Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string()
}

/// The text of a fragment as a reader sees it, for plain-text clipboard
/// alternatives.
pub fn plain_text(input: &str) -> String {
    unescape(&strip_all_tags(input))
}

/// Reverses the entities ammonia's serializer emits. `&amp;` goes last so
/// an escaped entity such as `&amp;lt;` stays literal.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

static CONDITIONAL_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--\[if[^\]]*\]>.*?<!\[endif\]-->|<!\[if[^\]]*\]>|<!\[endif\]>")
        .expect("conditional comment pattern is valid")
});

/// Blocks removed with their content, innermost first so a `<head>` holding
/// a `<style>` is matched whole.
static OFFICE_BLOCK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["style", "xml", "head"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("office block pattern is valid")
        })
        .collect()
});

static VOID_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(meta|link)\b[^>]*>").expect("meta pattern is valid")
});

static NAMESPACED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)</?[a-z]+:[a-z0-9_-]+\b[^>]*>").expect("namespaced tag pattern is valid")
});

static MSO_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+class=("Mso[^"]*"|'Mso[^']*'|Mso[^\s>]*)"#)
        .expect("class pattern is valid")
});

static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\s+style=("[^"]*"|'[^']*')"#).expect("style pattern is valid")
});

static DOCUMENT_SHELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)</?(html|body)\b[^>]*>").expect("document shell pattern is valid")
});

/// Cleans markup pasted from Microsoft Word.
///
/// Drops conditional comments, Office namespaced elements (`<o:p>`, `<v:shape>`),
/// document-level `meta`/`link`/`style`/`xml` blocks, `Mso*` classes and
/// `mso-*` style declarations. Everything else is passed through.
pub fn clean_word_paste(input: &str) -> String {
    let out = CONDITIONAL_COMMENT_RE.replace_all(input, "");
    let mut out = out.into_owned();
    for block in OFFICE_BLOCK_RES.iter() {
        out = block.replace_all(&out, "").into_owned();
    }
    let out = VOID_META_RE.replace_all(&out, "");
    let out = NAMESPACED_TAG_RE.replace_all(&out, "");
    let out = DOCUMENT_SHELL_RE.replace_all(&out, "");
    let out = MSO_CLASS_RE.replace_all(&out, "");
    let out = STYLE_ATTR_RE.replace_all(&out, |caps: &regex::Captures<'_>| {
        let quoted = &caps[1];
        let quote = &quoted[..1];
        let kept = strip_mso_declarations(&quoted[1..quoted.len() - 1]);
        if kept.is_empty() {
            String::new()
        } else {
            format!(" style={quote}{kept}{quote}")
        }
    });
    out.trim().to_string()
}

fn strip_mso_declarations(style: &str) -> String {
    style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| !decl.to_ascii_lowercase().starts_with("mso-"))
        .collect::<Vec<_>>()
        .join("; ")
}
