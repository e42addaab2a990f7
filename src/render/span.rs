//! Text runs to classed `<span>` markup.

use crate::format::TextRun;

/// Class carried by every emitted span.
pub const BASE_CLASS: &str = "mcformat";

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Space-separated classes for a run: base, color, then styles in code order.
pub fn class_list(run: &TextRun) -> String {
    let mut classes = vec![BASE_CLASS];
    classes.extend(run.state.color.map(|c| c.css_class()));
    classes.extend(run.state.styles.iter().map(|s| s.css_class()));
    classes.join(" ")
}

/// Append the markup for one run; empty runs append nothing.
pub fn render_run(run: &TextRun, out: &mut String) {
    if run.text.is_empty() {
        return;
    }
    out.push_str("<span class=\"");
    out.push_str(&class_list(run));
    out.push_str("\">");
    out.push_str(&escape_html(&run.text));
    out.push_str("</span>");
}

/// Render runs into one markup fragment.
///
/// ```
/// use motd_embed::format::parse_runs;
/// use motd_embed::render::render_runs;
///
/// let html = render_runs(&parse_runs("§l§cHot <stuff>"));
/// assert_eq!(
///     html,
///     r#"<span class="mcformat mcformat-red">Hot &lt;stuff&gt;</span>"#
/// );
/// ```
pub fn render_runs(runs: &[TextRun]) -> String {
    let mut out = String::new();
    for run in runs {
        render_run(run, &mut out);
    }
    out
}
