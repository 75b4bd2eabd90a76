// copyguard-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes a report (sanitized slots, gate output) so readers never see a half-written file.
///
/// The content goes to a temporary file next to `path`, which is then renamed over it.
/// Missing parent directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory as the target, so the rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Serializes `value` as pretty JSON (trailing newline) and writes it atomically.
pub fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    atomic_write(path, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_overwrites_and_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("out/nested/slots.json");

        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;

        assert_eq!(fs::read_to_string(&file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn test_write_json_is_pretty() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.json");
        write_json(&file_path, &json!({"ok": true}))?;
        assert_eq!(fs::read_to_string(&file_path)?, "{\n  \"ok\": true\n}\n");
        Ok(())
    }
}
