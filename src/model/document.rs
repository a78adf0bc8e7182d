use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors raised while reading a table document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk description of a set of tables.
///
/// ```toml
/// [[tables]]
/// title = "Inventory"
///
/// [[tables.rows]]
/// cells = ["Item", { text = "Qty", selectable = false }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub title: String,
    /// Tables that are not navigable are shown but never join a session.
    #[serde(default = "default_true")]
    pub navigable: bool,
    #[serde(default)]
    pub rows: Vec<RowSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowSpec {
    #[serde(default)]
    pub selectable: Option<bool>,
    #[serde(default)]
    pub cells: Vec<CellSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellSpec {
    Text(String),
    Detailed {
        text: String,
        #[serde(default)]
        selectable: Option<bool>,
    },
}

impl CellSpec {
    pub fn text(&self) -> &str {
        match self {
            CellSpec::Text(text) | CellSpec::Detailed { text, .. } => text,
        }
    }

    pub fn selectable(&self) -> Option<bool> {
        match self {
            CellSpec::Text(_) => None,
            CellSpec::Detailed { selectable, .. } => *selectable,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Document {
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Built-in sample shown when no document is configured.
    pub fn demo() -> Self {
        toml::from_str(include_str!("../../config/demo.toml")).unwrap_or_else(|err| {
            tracing::error!("built-in demo document is invalid: {err}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cells_accept_plain_and_detailed_forms() {
        let doc: Document = toml::from_str(
            r#"
            [[tables]]
            title = "t"

            [[tables.rows]]
            selectable = false
            cells = ["a", { text = "b", selectable = false }, { text = "c" }]
            "#,
        )
        .unwrap();

        let table = &doc.tables[0];
        assert!(table.navigable);
        let row = &table.rows[0];
        assert_eq!(row.selectable, Some(false));
        let texts: Vec<&str> = row.cells.iter().map(CellSpec::text).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        let flags: Vec<Option<bool>> = row.cells.iter().map(CellSpec::selectable).collect();
        assert_eq!(flags, [None, Some(false), None]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[tables]]\ntitle = \"disk\"\nnavigable = false\n[[tables.rows]]\ncells = [\"x\"]"
        )
        .unwrap();

        let doc = Document::from_path(file.path()).unwrap();

        assert_eq!(doc.tables[0].title, "disk");
        assert!(!doc.tables[0].navigable);
    }

    #[test]
    fn reports_path_on_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = Document::from_path(&missing).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[[tables]]\ntitle = ").unwrap();
        let err = Document::from_path(&broken).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn demo_document_parses() {
        let raw = include_str!("../../config/demo.toml");
        let doc: Document = toml::from_str(raw).unwrap();
        assert!(doc.tables.len() >= 2);
        assert!(doc.tables.iter().any(|table| !table.navigable));
    }
}
