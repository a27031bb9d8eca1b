#[cfg(test)]
#[path = "export_test.rs"]
mod tests;

use crate::domain::models::Message;
use crate::domain::models::MessageView;
use crate::domain::models::Renderer;
use crate::domain::models::Speaker;

const STYLE: &str = r#"body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; color: #1f2328; }
.message { margin: 1rem 0; padding: 0.75rem 1rem; border-radius: 0.5rem; }
.user { background: #ddf4ff; margin-left: 4rem; }
.assistant { background: #f6f8fa; margin-right: 4rem; }
.time { font-size: 0.75rem; color: #59636e; margin-top: 0.5rem; }
pre { background: #eaeef2; padding: 0.75rem; overflow-x: auto; }"#;

/// Standalone HTML document for a conversation. Assistant content goes
/// through `renderer.render`, everything else through `renderer.escape`.
pub fn export_html(title: &str, messages: &[Message], renderer: &dyn Renderer) -> String {
    let body = MessageView::project_all(messages, renderer)
        .iter()
        .map(|view| {
            let class = match view.speaker {
                Speaker::User => "user",
                Speaker::Assistant => "assistant",
                Speaker::Parley => "notice",
            };

            return format!(
                "<div class=\"message {class}\">\n<div class=\"content\">{}</div>\n<div class=\"time\">{}</div>\n</div>",
                view.body, view.time
            );
        })
        .collect::<Vec<String>>()
        .join("\n");

    let title = renderer.escape(title);

    return format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    );
}
