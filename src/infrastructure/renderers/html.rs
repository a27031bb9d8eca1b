#[cfg(test)]
#[path = "html_test.rs"]
mod tests;

use crate::domain::models::Renderer;

const ALLOWED_TAGS: [&str; 20] = [
    "p",
    "br",
    "strong",
    "em",
    "u",
    "s",
    "code",
    "pre",
    "ul",
    "ol",
    "li",
    "h1",
    "h2",
    "h3",
    "h4",
    "blockquote",
    "a",
    "hr",
    "del",
    "b",
];

const ALLOWED_ATTRIBUTES: [&str; 2] = ["href", "target"];

pub fn escape_html(raw: &str) -> String {
    let mut res = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#x27;"),
            ch => res.push(ch),
        }
    }

    return res;
}

/// Rebuilds one tag with only allowlisted attributes, or drops it. `<del>` and
/// `<b>` are normalised to `<s>` and `<strong>`.
fn filter_tag(tag: &str) -> Option<String> {
    let closing = tag.starts_with('/');
    let inner = tag.trim_start_matches('/').trim_end_matches('/').trim();
    let name_end = inner
        .find(|ch: char| return ch.is_whitespace())
        .unwrap_or(inner.len());
    let mut name = inner[..name_end].to_lowercase();

    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }
    if name == "del" {
        name = "s".to_string();
    } else if name == "b" {
        name = "strong".to_string();
    }

    if closing {
        return Some(format!("</{name}>"));
    }

    // Compiled markdown always double quotes and escapes attribute values.
    let mut attributes = String::new();
    let parts = inner[name_end..].split('"').collect::<Vec<&str>>();
    for pair in parts.chunks(2) {
        if pair.len() < 2 {
            continue;
        }
        let key = pair[0].trim().trim_end_matches('=').trim().to_lowercase();
        if ALLOWED_ATTRIBUTES.contains(&key.as_str()) {
            attributes.push_str(&format!(" {key}=\"{}\"", pair[1]));
        }
    }

    if name == "a" && attributes.contains("href=") && !attributes.contains("target=") {
        attributes.push_str(" target=\"_blank\"");
    }

    return Some(format!("<{name}{attributes}>"));
}

/// Keeps allowlisted tags from compiled markdown and drops every other tag,
/// leaving its text in place.
pub fn filter_html(html: &str) -> String {
    let mut res = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        res.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) => {
                if let Some(tag) = filter_tag(&after[..end]) {
                    res.push_str(&tag);
                }
                rest = &after[end + 1..];
            }
            None => {
                res.push_str(&escape_html(&rest[start..]));
                rest = "";
            }
        }
    }
    res.push_str(rest);

    return res;
}

/// HTML surface used for exported transcripts. Raw HTML in messages is
/// escaped before the markdown is compiled.
#[derive(Default)]
pub struct HtmlRenderer {}

impl Renderer for HtmlRenderer {
    fn render(&self, raw: &str) -> String {
        match markdown::to_html_with_options(raw, &markdown::Options::gfm()) {
            Ok(html) => return filter_html(&html),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to compile markdown");
                return self.escape(raw);
            }
        }
    }

    fn escape(&self, raw: &str) -> String {
        return escape_html(raw).replace('\n', "<br>\n");
    }
}
