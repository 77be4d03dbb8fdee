// ============================================================
// Layer 6 — Atomic File Writes
// ============================================================
// Every artifact a reader may pick up mid-run (best F1, dev
// predictions) goes through a temp file in the same directory
// followed by a rename, so a crash never leaves half a file.

use anyhow::{Context, Result};
use std::{fs, io::Write, path::Path};

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Cannot create temp file in '{}'", dir.display()))?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("Cannot move temp file to '{}'", path.display()))?;
    Ok(())
}
