//! HTML output: classed spans for MOTD runs and the embed document around them.

mod page;
mod span;

pub use page::{validate_favicon, EmbedPage, FaviconRejection, MAX_FAVICON_LEN};
pub use span::{class_list, escape_html, render_run, render_runs, BASE_CLASS};
