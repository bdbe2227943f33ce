// src/utils/pretty.rs

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<![^>]*>|</?[A-Za-z][^>]*>|[^<]+|<").expect("token pattern is valid")
});

static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</?\s*([A-Za-z][A-Za-z0-9:_-]*)").expect("tag name pattern is valid"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose end tag may be left out; an enclosing end tag closes them.
const OPTIONAL_END: &[&str] = &[
    "p", "li", "dt", "dd", "tr", "td", "th", "option", "thead", "tbody", "tfoot", "colgroup",
    "head", "body", "html", "rt", "rp", "optgroup",
];

/// Elements whose content is raw text.
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title"];

const INDENT: &str = "  ";

/// Reformats HTML so that two documents can be compared line by line.
///
/// Every tag, comment and text run goes on its own line, indented two
/// spaces per nesting level. Whitespace inside text and tags is collapsed
/// and tag names are lowercased; attribute text is otherwise untouched.
///
/// Fails on an end tag that does not close an open element, or that would
/// implicitly close an element whose end tag is required.
pub fn pretty_html(html: &str) -> Result<String, String> {
    let mut out: Vec<String> = Vec::new();
    let mut open: Vec<String> = Vec::new();

    for token in TOKEN_RE.find_iter(html).map(|m| m.as_str()) {
        if let Some(raw) = open.last().filter(|tag| RAW_TEXT.contains(&tag.as_str())) {
            if !is_end_tag_for(token, raw) {
                let text = token.trim();
                if !text.is_empty() {
                    push_line(&mut out, open.len(), text);
                }
                continue;
            }
        }

        if token.starts_with("<!") {
            push_line(&mut out, open.len(), token.trim());
        } else if token.starts_with("</") {
            let name = tag_name(token).ok_or_else(|| format!("Malformed end tag {token:?}"))?;
            close_element(&mut open, &name)?;
            push_line(&mut out, open.len(), &format!("</{name}>"));
        } else if token.starts_with('<') && token.len() > 1 {
            let name = tag_name(token).ok_or_else(|| format!("Malformed tag {token:?}"))?;
            let normalized = normalize_start_tag(token, &name);
            push_line(&mut out, open.len(), &normalized);
            let self_closing = token.trim_end_matches('>').trim_end().ends_with('/');
            if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                open.push(name);
            }
        } else {
            let text = WHITESPACE_RE.replace_all(token, " ");
            let text = text.trim();
            if !text.is_empty() {
                push_line(&mut out, open.len(), text);
            }
        }
    }

    let mut formatted = out.join("\n");
    formatted.push('\n');
    Ok(formatted)
}

fn push_line(out: &mut Vec<String>, depth: usize, text: &str) {
    out.push(format!("{}{}", INDENT.repeat(depth), text));
}

fn tag_name(token: &str) -> Option<String> {
    TAG_NAME_RE
        .captures(token)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn is_end_tag_for(token: &str, name: &str) -> bool {
    token.starts_with("</") && tag_name(token).as_deref() == Some(name)
}

fn normalize_start_tag(token: &str, name: &str) -> String {
    let rest = token[1..]
        .trim_start()
        .get(name.len()..)
        .unwrap_or_default()
        .trim_end_matches('>');
    let rest = WHITESPACE_RE.replace_all(rest, " ");
    let rest = rest.trim_end();
    format!("<{name}{rest}>")
}

/// Pops open elements down to and including `name`.
fn close_element(open: &mut Vec<String>, name: &str) -> Result<(), String> {
    let Some(position) = open.iter().rposition(|tag| tag == name) else {
        return Err(format!("Unexpected closing tag \"{name}\""));
    };
    if let Some(unclosed) = open[position + 1..]
        .iter()
        .find(|tag| !OPTIONAL_END.contains(&tag.as_str()))
    {
        return Err(format!(
            "Unexpected closing tag \"{name}\": element \"{unclosed}\" is still open"
        ));
    }
    open.truncate(position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puts_tags_and_text_on_their_own_lines() {
        let pretty = pretty_html("<div><p>Hello   <b>world</b></p><br></div>").unwrap();
        assert_eq!(
            pretty,
            "<div>\n  <p>\n    Hello\n    <b>\n      world\n    </b>\n  </p>\n  <br>\n</div>\n"
        );
    }

    #[test]
    fn is_deterministic_across_whitespace_changes() {
        let a = pretty_html("<ul><li>one</li><li>two</li></ul>").unwrap();
        let b = pretty_html("<UL>\n  <li>one</li>\n\n  <li>two</li>\n</UL>").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn optional_end_tags_are_closed_implicitly() {
        let pretty = pretty_html("<ul><li>one<li>two</ul>").unwrap();
        assert!(pretty.ends_with("</ul>\n"));
    }

    #[test]
    fn stray_end_tag_is_rejected() {
        assert!(pretty_html("<p>a</p></div>").is_err());
        assert!(pretty_html("<div><span>a</div>").is_err());
    }

    #[test]
    fn keeps_script_bodies_verbatim() {
        let pretty = pretty_html("<script>if (a < b) { x(); }</script>").unwrap();
        assert!(pretty.contains("if (a"));
        assert!(pretty.ends_with("</script>\n"));
    }

    #[test]
    fn keeps_comments() {
        let pretty = pretty_html("<!--[if gte mso 9]><xml></xml><![endif]--><p>x</p>").unwrap();
        assert!(pretty.starts_with("<!--[if gte mso 9]><xml></xml><![endif]-->\n"));
    }
}
