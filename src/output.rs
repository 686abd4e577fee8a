use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const MARKET_DATA_FILE: &str = "market_data.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const HISTORY_DIR: &str = "history";

const PROJECT_OUTPUT_DIRS: [&str; 3] = ["data", "web/public/data", "web/src/data"];

/// Mirrored output roots. Reads come from the first root; writes go to all of them.
#[derive(Debug, Clone)]
pub struct OutputSink {
    roots: Vec<PathBuf>,
}

impl OutputSink {
    /// `data/`, `web/public/data/` and `web/src/data/` under the project root.
    pub fn for_project<P: AsRef<Path>>(project_root: P) -> Self {
        let project_root = project_root.as_ref();
        Self {
            roots: PROJECT_OUTPUT_DIRS
                .iter()
                .map(|dir| project_root.join(dir))
                .collect(),
        }
    }

    pub fn primary(&self) -> &Path {
        &self.roots[0]
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn primary_path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.primary().join(relative)
    }

    pub fn write_json<T: Serialize, P: AsRef<Path>>(&self, relative: P, payload: &T) -> Result<()> {
        let rendered = render_json(payload)?;
        for root in &self.roots {
            let path = root.join(relative.as_ref());
            write_atomic(&path, rendered.as_bytes())?;
            debug!("Wrote {}", path.display());
        }
        Ok(())
    }

    /// Reads a document from the primary root. `Ok(None)` when the file does not exist.
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(&self, relative: P) -> Result<Option<T>> {
        let path = self.primary_path(relative);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }
}

/// Pretty JSON with mapping keys sorted. Going through `Value` sorts object keys
/// while leaving list order untouched.
pub fn render_json<T: Serialize>(payload: &T) -> Result<String> {
    let value = serde_json::to_value(payload).context("Failed to serialize payload")?;
    serde_json::to_string_pretty(&value).context("Failed to render JSON")
}

/// Writes into a sibling temp file and renames it over the destination.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid output path {}", path.display()))?;
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("Unable to create {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(contents)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        writer
            .into_inner()
            .map_err(|err| anyhow!("Failed to flush {}: {}", tmp_path.display(), err.error()))?
            .sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;
    }

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            tmp_path.display(),
            path.display()
        )
    })
}
