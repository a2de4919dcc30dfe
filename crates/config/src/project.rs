//! Project memory: the human-editable `orangutan.md` kept per project.
//!
//! The file is a Markdown document made of `## <Section>` blocks. The model
//! keeps it current through the `update_config` tool; the developer can edit
//! it by hand. Its contents are appended to the system prompt.

use std::path::PathBuf;

use crate::ConfigError;

/// Directory (relative to the project root) holding the memory file.
pub const MEMORY_DIR: &str = ".orangutan-config";

/// File name of the memory file.
pub const MEMORY_FILE: &str = "orangutan.md";

/// Trailing section new sections are inserted in front of.
const NOTES_HEADER: &str = "## Notes";

/// How [`apply_section`] changed the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChange {
    /// An existing section body was replaced
    Replaced,
    /// A new section was inserted before `## Notes`
    InsertedBeforeNotes,
    /// A new section was appended at the end
    Appended,
}

/// Handle to the memory file of one project.
#[derive(Debug, Clone)]
pub struct ProjectMemory {
    root: PathBuf,
}

impl ProjectMemory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path to `orangutan.md`.
    pub fn path(&self) -> PathBuf {
        self.root.join(MEMORY_DIR).join(MEMORY_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Read the memory file. `None` when it does not exist.
    pub fn read(&self) -> Result<Option<String>, ConfigError> {
        let path = self.path();
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Write the memory file, creating its directory if needed.
    pub fn write(&self, content: &str) -> Result<PathBuf, ConfigError> {
        let path = self.path();
        let write_err = |e: std::io::Error| ConfigError::WriteError {
            path: path.clone(),
            reason: e.to_string(),
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        std::fs::write(&path, content).map_err(write_err)?;
        Ok(path)
    }

    /// Replace or add `section` in the existing memory file.
    ///
    /// Returns `Ok(None)` when there is no (or an empty) memory file; the
    /// file is never created here.
    pub fn update_section(
        &self,
        section: &str,
        content: &str,
    ) -> Result<Option<SectionChange>, ConfigError> {
        let current = match self.read()? {
            Some(doc) if !doc.is_empty() => doc,
            _ => return Ok(None),
        };

        let (updated, change) = apply_section(&current, section, content);
        self.write(&updated)?;
        tracing::debug!(section, ?change, path = %self.path().display(), "Project memory updated");
        Ok(Some(change))
    }
}

/// Replace the body of `## <section>` (up to the next `## ` header or end of
/// file), or add the section if it is missing.
pub fn apply_section(doc: &str, section: &str, content: &str) -> (String, SectionChange) {
    let header = format!("## {section}");

    if let Some(start) = find_header(doc, &header) {
        let after_header = start + header.len();
        let end = doc[after_header..]
            .find("\n## ")
            .map(|i| after_header + i)
            .unwrap_or(doc.len());
        let updated = format!("{}\n{content}\n{}", &doc[..after_header], &doc[end..]);
        return (updated, SectionChange::Replaced);
    }

    if let Some(notes) = find_header(doc, NOTES_HEADER) {
        let updated = format!("{}{header}\n{content}\n\n{}", &doc[..notes], &doc[notes..]);
        return (updated, SectionChange::InsertedBeforeNotes);
    }

    let updated = format!("{}\n\n{header}\n{content}\n", doc.trim_end());
    (updated, SectionChange::Appended)
}

/// Byte offset of the line that is exactly `header` (trailing whitespace ignored).
fn find_header(doc: &str, header: &str) -> Option<usize> {
    let mut offset = 0;
    for line in doc.split_inclusive('\n') {
        if line.trim_end() == header {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Project\n\n## Tech Stack\n- Python\n\n## Conventions\n- tabs\n\n## Notes\n- none\n";

    #[test]
    fn replaces_existing_section_body() {
        let (out, change) = apply_section(DOC, "Tech Stack", "- Rust\n- Tokio");
        assert_eq!(change, SectionChange::Replaced);
        assert!(out.contains("## Tech Stack\n- Rust\n- Tokio\n\n## Conventions"));
        assert!(!out.contains("Python"));
        assert!(out.contains("- tabs"));
    }

    #[test]
    fn replaces_last_section_to_end_of_file() {
        let (out, change) = apply_section(DOC, "Notes", "- uses nightly");
        assert_eq!(change, SectionChange::Replaced);
        assert!(out.ends_with("## Notes\n- uses nightly\n"));
        assert!(!out.contains("- none"));
    }

    #[test]
    fn inserts_new_section_before_notes() {
        let (out, change) = apply_section(DOC, "Testing", "- cargo test");
        assert_eq!(change, SectionChange::InsertedBeforeNotes);
        let testing = out.find("## Testing").unwrap();
        let notes = out.find("## Notes").unwrap();
        assert!(testing < notes);
        assert!(out.contains("## Testing\n- cargo test\n\n## Notes"));
    }

    #[test]
    fn appends_when_no_notes_section() {
        let doc = "# Project\n\n## Overview\nA tool.\n\n";
        let (out, change) = apply_section(doc, "Testing", "- cargo test");
        assert_eq!(change, SectionChange::Appended);
        assert_eq!(out, "# Project\n\n## Overview\nA tool.\n\n## Testing\n- cargo test\n");
    }

    #[test]
    fn header_match_is_whole_line() {
        let doc = "## Setup Steps\n- a\n";
        let (out, change) = apply_section(doc, "Setup", "- b");
        assert_eq!(change, SectionChange::Appended);
        assert!(out.contains("## Setup Steps\n- a"));
    }

    #[test]
    fn update_is_idempotent() {
        for section in ["Tech Stack", "Notes", "Testing"] {
            let (once, _) = apply_section(DOC, section, "- same");
            let (twice, change) = apply_section(&once, section, "- same");
            assert_eq!(once, twice, "section {section}");
            assert_eq!(change, SectionChange::Replaced);
        }
    }

    #[test]
    fn missing_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ProjectMemory::new(dir.path());
        assert!(!memory.exists());
        assert_eq!(memory.update_section("Notes", "x").unwrap(), None);
        assert!(!memory.exists());
    }

    #[test]
    fn update_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ProjectMemory::new(dir.path());
        memory.write(DOC).unwrap();
        assert!(memory.path().ends_with(".orangutan-config/orangutan.md"));

        let change = memory.update_section("Conventions", "- spaces").unwrap();
        assert_eq!(change, Some(SectionChange::Replaced));
        let doc = memory.read().unwrap().unwrap();
        assert!(doc.contains("## Conventions\n- spaces\n"));
    }
}
