//! Server-rendered HTML. Pages are plain `format!` templates; every value
//! that came from a user or an extract goes through [`escape`].

pub mod chart;
pub mod pages;

use crate::middleware::Flash;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap `body` in the shared page chrome: navigation for the current user
/// and any pending flash messages.
pub fn layout(title: &str, username: Option<&str>, flash: &Flash, body: &str) -> String {
    let nav = match username {
        Some(name) => format!(
            "<a href=\"/\">Home</a> <a href=\"/dashboard\">Dashboard</a> <a href=\"/search\">Search</a> \
             <span class=\"user\">{}</span> <a href=\"/logout\">Logout</a>",
            escape(name)
        ),
        None => "<a href=\"/\">Home</a> <a href=\"/login\">Login</a> <a href=\"/register\">Register</a>"
            .to_string(),
    };

    let messages: String = flash
        .messages()
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    let flashes = if messages.is_empty() {
        String::new()
    } else {
        format!("<ul class=\"flashes\">{}</ul>", messages)
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Spend Dashboard</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav>{nav}</nav>\n<hr>\n{flashes}\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em}nav a{margin-right:1em}\
.flashes{color:#a40}table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:4px 8px}\
.error{color:#b00}.charts svg{margin:1em 1em 0 0}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"Tom & Jerry's\"</b>"), "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;");
    }

    #[test]
    fn layout_shows_user_and_flashes() {
        let page = layout("Home", Some("<alice>"), &Flash::default(), "<p>hi</p>");
        assert!(page.contains("&lt;alice&gt;"));
        assert!(page.contains("/logout"));
        assert!(!page.contains("class=\"flashes\""));

        let anonymous = layout("Home", None, &Flash::default(), "");
        assert!(anonymous.contains("/register"));
    }
}
