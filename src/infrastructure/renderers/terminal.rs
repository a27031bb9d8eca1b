#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;

use crate::domain::models::Renderer;

const TAB: &str = "    ";
const ESC: char = '\u{1b}';
const BEL: char = '\u{7}';

/// Removes escape sequences and control characters so message text can't
/// move the cursor, change colours or retitle the terminal.
pub fn sanitize(raw: &str) -> String {
    let mut res = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
            match chars.next() {
                // CSI: parameters and intermediates, ended by a final byte.
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC, DCS and friends: ended by BEL or ST.
                Some(']') | Some('P') | Some('X') | Some('^') | Some('_') => {
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        match ch {
            '\n' => res.push('\n'),
            '\t' => res.push_str(TAB),
            ch if ch.is_control() => {}
            ch => res.push(ch),
        }
    }

    return res;
}

/// Terminal surface. Markdown is shown as written.
#[derive(Default)]
pub struct TerminalRenderer {}

impl Renderer for TerminalRenderer {
    fn render(&self, raw: &str) -> String {
        return sanitize(raw);
    }

    fn escape(&self, raw: &str) -> String {
        return sanitize(raw);
    }
}
