//! Static export: the two-file production artifact.
//!
//! `index.html` holds the pre-rendered page, `app.js` the runtime (live code
//! stripped), the tree literal and the initial render. Nothing else is needed
//! to serve the application from any static host.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::{App, AppError, AppHost, AppMeta};
use crate::descriptor::Descriptor;
use crate::document::{initial_document, static_script, DocumentError, DocumentMode};

pub const INDEX_FILE: &str = "index.html";
pub const SCRIPT_FILE: &str = "app.js";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{action} `{path}`: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    App(#[from] AppError),
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub bytes: usize,
}

/// Writes static builds into one output directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output: PathBuf,
}

impl Exporter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into() }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Render the application once and export the result.
    pub fn export<A: App>(&self, host: &mut AppHost<A>) -> Result<ExportReport, ExportError> {
        let tree = host.render()?;
        self.export_tree(&host.meta(), &tree)
    }

    /// Export an already serialized tree, replacing the output directory.
    pub fn export_tree(&self, meta: &AppMeta, tree: &Descriptor) -> Result<ExportReport, ExportError> {
        let html = initial_document(meta, tree, DocumentMode::Static)?;
        let script = static_script(tree)?;

        if self.output.exists() {
            fs::remove_dir_all(&self.output).map_err(|source| ExportError::Io {
                action: "failed to clear",
                path: self.output.clone(),
                source,
            })?;
        }
        fs::create_dir_all(&self.output).map_err(|source| ExportError::Io {
            action: "failed to create",
            path: self.output.clone(),
            source,
        })?;

        let mut files = Vec::with_capacity(2);
        for (name, contents) in [(INDEX_FILE, &html), (SCRIPT_FILE, &script)] {
            let path = self.output.join(name);
            fs::write(&path, contents).map_err(|source| ExportError::Io {
                action: "failed to write",
                path: path.clone(),
                source,
            })?;
            files.push(path);
        }

        let bytes = html.len() + script.len();
        info!(dir = %self.output.display(), bytes, "static build written");
        Ok(ExportReport {
            dir: self.output.clone(),
            files,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Widget;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct Hello;

    impl App for Hello {
        fn build(&self) -> Widget {
            Widget::center(Widget::text("Hello, world").size("2xl"))
        }

        fn meta(&self) -> AppMeta {
            AppMeta::new("Hello").description("A static page")
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("trellis-{name}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn writes_exactly_two_files() {
        let dir = scratch_dir("export");
        fs::create_dir_all(dir.join("stale")).unwrap();

        let report = Exporter::new(&dir).export(&mut AppHost::new(Hello)).unwrap();

        let mut names: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec![SCRIPT_FILE, INDEX_FILE]);
        assert_eq!(report.files.len(), 2);

        let html = fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
        assert!(html.contains("Hello, world"));
        assert!(html.contains("content=\"A static page\""));

        let script = fs::read_to_string(dir.join(SCRIPT_FILE)).unwrap();
        assert!(script.contains("const componentTree"));
        assert!(!script.contains("new WebSocket"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
