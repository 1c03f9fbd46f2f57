//! Initial Document
//!
//! Builds the HTML page a browser loads first.
//!
//! - Live mode: the page carries the descriptor tree as a JSON literal in a
//!   `<script type="application/json">` block, loads `/runtime.js` and tells
//!   it which port the WebSocket listens on.
//! - Static mode: the tree lives in `app.js` (see [`crate::export`]). The page
//!   instead carries markup pre-rendered by the reference client runtime, so
//!   content is visible before the script runs.

use crate::app::AppMeta;
use crate::client::{ClientRuntime, Document, RuntimeError};
use crate::client::dom::{escape_attr, escape_text};
use crate::descriptor::{Descriptor, DescriptorError};

/// The browser runtime, live sections included.
pub const RUNTIME_JS: &str = include_str!("../assets/runtime.js");

/// Marks the first line of a live-only block in [`RUNTIME_JS`].
pub const LIVE_BEGIN: &str = "// live:begin";
/// Marks the last line of a live-only block in [`RUNTIME_JS`].
pub const LIVE_END: &str = "// live:end";

/// Id of the element the runtime mounts into.
pub const MOUNT_ID: &str = "app";
/// Id of the JSON block holding the tree in live documents.
pub const TREE_ID: &str = "trellis-tree";

const BASE_STYLE: &str = "\
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Helvetica Neue', sans-serif;
            -webkit-font-smoothing: antialiased;
            -moz-osx-font-smoothing: grayscale;
        }
        #app { width: 100%; min-height: 100vh; }";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to encode the descriptor tree: {0}")]
    Encode(#[from] DescriptorError),

    #[error("failed to pre-render the descriptor tree: {0}")]
    Prerender(#[from] RuntimeError),
}

/// How the document reaches the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMode {
    /// Served by the live server; the runtime connects to `ws_port`.
    Live { ws_port: u16 },
    /// Written to disk next to `app.js`.
    Static,
}

/// Remove every live-only block, marker lines included.
pub fn strip_live_section(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut live = false;
    for line in source.lines() {
        let marker = line.trim();
        if marker == LIVE_BEGIN {
            live = true;
        } else if marker == LIVE_END {
            live = false;
        } else if !live {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// JSON for the tree, safe to place inside a `<script>` element.
pub fn embed_json(tree: &Descriptor) -> Result<String, DocumentError> {
    Ok(tree.to_json()?.replace("</", "<\\/"))
}

/// Render `tree` with the reference runtime and return its markup.
pub fn prerender(tree: &Descriptor) -> Result<String, DocumentError> {
    let mut doc = Document::new();
    let mount = doc.create_element("div");
    doc.append(doc.body(), mount).map_err(RuntimeError::from)?;

    let root = ClientRuntime::inert(mount).render(&mut doc, tree)?;
    Ok(doc.to_html(root).map_err(RuntimeError::from)?)
}

/// The full HTML page for `tree`.
pub fn initial_document(meta: &AppMeta, tree: &Descriptor, mode: DocumentMode) -> Result<String, DocumentError> {
    let head_tags = meta.head_tags.join("\n    ");
    let (mount, scripts) = match mode {
        DocumentMode::Live { ws_port } => (
            format!("<div id=\"{MOUNT_ID}\" data-ws-port=\"{ws_port}\"></div>"),
            format!(
                "<script id=\"{TREE_ID}\" type=\"application/json\">{}</script>\n    \
                 <script src=\"/runtime.js\"></script>",
                embed_json(tree)?
            ),
        ),
        DocumentMode::Static => (
            format!("<div id=\"{MOUNT_ID}\">{}</div>", prerender(tree)?),
            "<script src=\"app.js\"></script>".to_string(),
        ),
    };

    Ok(format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <meta name=\"description\" content=\"{description}\">
    <title>{title}</title>
    {head_tags}
    <style>
{BASE_STYLE}
    </style>
</head>
<body>
    {mount}
    {scripts}
</body>
</html>
",
        description = escape_attr(&meta.description),
        title = escape_text(&meta.title),
    ))
}

/// `app.js` of a static build: the runtime without its live sections, the
/// tree literal and the initial render call.
pub fn static_script(tree: &Descriptor) -> Result<String, DocumentError> {
    Ok(format!(
        "{runtime}
(function () {{
    const componentTree = {tree};
    const runtime = new TrellisRuntime(document.getElementById('{MOUNT_ID}'));
    runtime.init(componentTree);
}})();
",
        runtime = strip_live_section(RUNTIME_JS),
        tree = embed_json(tree)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ElementDescriptor;

    fn tree() -> Descriptor {
        ElementDescriptor::new("Column")
            .with_child(ElementDescriptor::new("Text").with_prop("text", "</script><b>"))
            .with_child(ElementDescriptor::new("Button").with_prop("text", "+").with_event("click", "on_click_1_0"))
            .into()
    }

    #[test]
    fn strip_removes_every_live_block() {
        let source = "a\n// live:begin\nb\n// live:end\nc\n    // live:begin\nd\n    // live:end\ne\n";
        assert_eq!(strip_live_section(source), "a\nc\ne\n");
    }

    #[test]
    fn runtime_asset_has_balanced_live_markers() {
        let begins = RUNTIME_JS.lines().filter(|l| l.trim() == LIVE_BEGIN).count();
        let ends = RUNTIME_JS.lines().filter(|l| l.trim() == LIVE_END).count();
        assert!(begins > 0);
        assert_eq!(begins, ends);

        let stripped = strip_live_section(RUNTIME_JS);
        assert!(!stripped.contains("new WebSocket"));
        assert!(stripped.contains("class TrellisRuntime"));
    }

    #[test]
    fn live_document_embeds_one_tree() {
        let html = initial_document(&AppMeta::new("Demo"), &tree(), DocumentMode::Live { ws_port: 8001 }).unwrap();

        assert_eq!(html.matches(TREE_ID).count(), 1);
        assert!(html.contains("data-ws-port=\"8001\""));
        assert!(html.contains("<script src=\"/runtime.js\"></script>"));
        assert!(html.contains("<title>Demo</title>"));
        // The text prop must not close the JSON block early.
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn embedded_json_still_decodes() {
        let json = embed_json(&tree()).unwrap();
        assert!(!json.contains("</"));
        assert_eq!(Descriptor::from_json(&json).unwrap(), tree());
    }

    #[test]
    fn static_document_is_prerendered() {
        let meta = AppMeta::new("A & B").head_tag("<link rel=\"icon\" href=\"icon.png\">");
        let html = initial_document(&meta, &tree(), DocumentMode::Static).unwrap();

        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<link rel=\"icon\" href=\"icon.png\">"));
        assert!(html.contains("&lt;/script&gt;&lt;b&gt;"));
        assert!(html.contains("<button"));
        assert!(html.contains("<script src=\"app.js\"></script>"));
        assert!(!html.contains(TREE_ID));
    }

    #[test]
    fn static_script_inits_without_live_code() {
        let script = static_script(&tree()).unwrap();
        assert!(script.contains("const componentTree = {"));
        assert!(script.contains("runtime.init(componentTree)"));
        assert!(!script.contains("connect("));
    }
}
