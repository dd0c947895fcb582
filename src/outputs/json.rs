//! JSON output of the simplified capsule data.
//!
//! The document is pretty-printed with 2-space indentation and written as
//! UTF-8 with non-ASCII names left as-is. It goes to a sibling temporary file
//! first and is renamed over `path`, so an interrupted write leaves any
//! previous output intact.

use crate::errors::ScrapeError;
use crate::models::SimpleData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `simple_data` to `path`, replacing any existing file.
///
/// # Arguments
///
/// * `simple_data` - The grouped document to serialize
/// * `path` - Destination file; its parent directory must already exist
///
/// # Errors
///
/// [`ScrapeError::Io`] if the file cannot be written, e.g. the parent
/// directory is missing or not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_simple_data(simple_data: &SimpleData, path: &Path) -> Result<(), ScrapeError> {
    let json = serde_json::to_string_pretty(simple_data).map_err(|e| ScrapeError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let tmp_path = temp_path(path);
    let io_err = |source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = fs::write(&tmp_path, json.as_bytes()).await {
        error!(path = %tmp_path.display(), error = %e, "Failed writing temporary output");
        let _ = fs::remove_file(&tmp_path).await;
        return Err(io_err(e));
    }
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(io_err(e));
    }

    info!(ranges = simple_data.len(), bytes = json.len(), "Saved data");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichedItem, RangeItems};
    use tempfile::tempdir;

    fn sample() -> SimpleData {
        let mut items = RangeItems::new();
        items.insert(
            "Melozio".into(),
            EnrichedItem {
                caffeine_mg: Some(65),
                image_url: "https://nespresso.com/assets/melozio.jpg".into(),
            },
        );
        items.insert(
            "薄荷巧克力".into(),
            EnrichedItem {
                caffeine_mg: None,
                image_url: "https://nespresso.com".into(),
            },
        );
        let mut data = SimpleData::new();
        data.insert("Vertuo 經典".into(), items);
        data.insert("Empty".into(), RangeItems::new());
        data
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let data = sample();

        write_simple_data(&data, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: SimpleData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_pretty_printed_with_literal_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_simple_data(&sample(), &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("薄荷巧克力"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\n  \"Empty\": {}"));
        assert!(text.contains("\n      \"caffeine_mg\": null"));
    }

    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "stale").unwrap();

        write_simple_data(&SimpleData::new(), &path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_missing_parent_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/data.json");

        let err = write_simple_data(&sample(), &path).await.unwrap_err();
        match err {
            ScrapeError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        // Every write through this link fails with ENOSPC.
        std::os::unix::fs::symlink("/dev/full", temp_path(&path)).unwrap();

        let err = write_simple_data(&sample(), &path).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Io { .. }));
        assert!(std::fs::symlink_metadata(temp_path(&path)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/out/data.json")),
            PathBuf::from("/out/data.json.tmp")
        );
    }
}
