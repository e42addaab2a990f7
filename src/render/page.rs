//! The embeddable HTML document.

use tracing::warn;

use super::span::{escape_html, BASE_CLASS};

/// Longest favicon data URI accepted (a 64x64 PNG is far smaller).
pub const MAX_FAVICON_LEN: usize = 150_000;

/// Image types a favicon data URI may declare.
const ALLOWED_FAVICON_PREFIXES: &[&str] = &[
    "data:image/png",
    "data:image/jpeg",
    "data:image/jpg",
    "data:image/gif",
    "data:image/webp",
];

/// Icon shown when the server has none or sent one that was rejected.
const FALLBACK_ICON: &str = "unknown_server.jpg";

/// Why a favicon was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaviconRejection {
    NotDataUri,
    DisallowedType,
    NotBase64,
    TooLarge,
}

/// Check that a favicon is a small base64 image data URI.
pub fn validate_favicon(favicon: &str) -> Result<(), FaviconRejection> {
    if !favicon.starts_with("data:") {
        return Err(FaviconRejection::NotDataUri);
    }
    if !ALLOWED_FAVICON_PREFIXES
        .iter()
        .any(|prefix| favicon.starts_with(prefix))
    {
        return Err(FaviconRejection::DisallowedType);
    }
    if !favicon.contains("base64,") {
        return Err(FaviconRejection::NotBase64);
    }
    if favicon.len() > MAX_FAVICON_LEN {
        return Err(FaviconRejection::TooLarge);
    }
    Ok(())
}

/// Everything needed to render the embed document.
#[derive(Debug, Clone)]
pub struct EmbedPage<'a> {
    /// Shown as the title and the name line; escaped on output.
    pub server_name: &'a str,
    /// Already-rendered MOTD markup; inserted as is.
    pub motd_html: &'a str,
    pub favicon: Option<&'a str>,
    /// Where the stylesheet, background and fallback icon are served from.
    pub static_base_url: &'a str,
}

impl EmbedPage<'_> {
    fn icon_src(&self) -> String {
        if let Some(favicon) = self.favicon {
            match validate_favicon(favicon) {
                Ok(()) => return favicon.to_string(),
                Err(reason) => {
                    warn!(server = self.server_name, ?reason, "rejected favicon, using fallback");
                }
            }
        }
        format!("{}/{}", self.static_base_url, FALLBACK_ICON)
    }

    /// Render the complete document.
    pub fn render(&self) -> String {
        let name = escape_html(self.server_name);
        let base = escape_html(self.static_base_url);
        let icon = escape_html(&self.icon_src());
        let motd = if self.motd_html.is_empty() {
            format!(r#"<span class="{BASE_CLASS}">No MOTD</span>"#)
        } else {
            self.motd_html.to_string()
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} - MOTD</title>
    <link rel="stylesheet" href="{base}/motd-embed.css">
    <style>
        * {{ box-sizing: border-box; }}
        html, body {{ margin: 0; padding: 0; width: 100%; height: 100%; overflow: hidden; }}
        body {{
            display: block;
            background-image: url({base}/minecraft-background-dark.png);
            background-repeat: repeat;
            background-size: 80px;
            image-rendering: pixelated;
        }}
    </style>
</head>
<body>
    <div class="editor-container">
        <div class="editor-inner mcformat-background mcformat-motd">
            <div class="server-icon">
                <img width="64" height="64" src="{icon}" alt="Minecraft server icon">
            </div>
            <div class="text">
                <div class="name">{name}</div>
                <div class="editor">
                    <div class="mcformat-editor">
                        <div class="mcformat-output mcformat-code-hidden">
                            <span class="mcformat-wrapper">{motd}</span>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    </div>
</body>
</html>
"#
        )
    }
}
