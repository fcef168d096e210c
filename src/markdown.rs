//! Converts content bodies from markdown to HTML for the renderer and feed.

use pulldown_cmark::{html, Options, Parser};

/// The marker which separates a body's summary from the rest of it.
pub const FOLD_TAG: &str = "<!-- more -->";

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts `markdown` to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options()));
    out
}

/// Returns the HTML excerpt of `markdown` and whether it was truncated. The
/// excerpt is everything above the [`FOLD_TAG`] or, if there's no fold, the
/// first paragraph.
pub fn excerpt(markdown: &str) -> (String, bool) {
    if let Some(i) = markdown.find(FOLD_TAG) {
        return (to_html(&markdown[..i]), true);
    }
    let trimmed = markdown.trim_start();
    match trimmed.find("\n\n") {
        Some(i) => (to_html(&trimmed[..i]), !trimmed[i..].trim().is_empty()),
        None => (to_html(trimmed), false),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_html() {
        assert_eq!("<h1>Hello</h1>\n<p>World</p>\n", to_html("# Hello\n\nWorld"));
        assert!(to_html("~~gone~~").contains("<del>gone</del>"));
    }

    #[test]
    fn test_excerpt_fold() {
        let (summary, truncated) = excerpt("Intro\n\n<!-- more -->\n\nRest");
        assert_eq!("<p>Intro</p>\n", summary);
        assert!(truncated);
    }

    #[test]
    fn test_excerpt_first_paragraph() {
        let (summary, truncated) = excerpt("\nFirst\n\nSecond");
        assert_eq!("<p>First</p>\n", summary);
        assert!(truncated);

        let (summary, truncated) = excerpt("Only\n\n");
        assert_eq!("<p>Only</p>\n", summary);
        assert!(!truncated);
    }
}
