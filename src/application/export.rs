use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Scoped sink that materializes a streamed payload at `final_path`.
///
/// Bytes land in a sibling `.part` file; `commit` syncs and renames it into
/// place. If the sink is dropped without committing (write error, stream
/// error, any early exit) the part file is removed, so a failed attempt
/// never leaves a half-written video behind.
pub struct ExportSink {
    file: Option<tokio::fs::File>,
    part_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl ExportSink {
    pub async fn create(final_path: &Path) -> std::io::Result<Self> {
        let mut part_name = final_path.file_name().unwrap_or_default().to_os_string();
        part_name.push(".part");
        let part_path = final_path.with_file_name(part_name);

        let file = tokio::fs::File::create(&part_path).await?;
        Ok(Self {
            file: Some(file),
            part_path,
            final_path: final_path.to_path_buf(),
            committed: false,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(chunk).await,
            None => Err(std::io::Error::other("sink already committed")),
        }
    }

    /// Flushes everything to disk and moves the part file to its final name.
    pub async fn commit(&mut self) -> std::io::Result<PathBuf> {
        if let Some(file) = self.file.take() {
            file.sync_all().await?;
        }
        tokio::fs::rename(&self.part_path, &self.final_path).await?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for ExportSink {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.part_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("downlink_test_{}_{}", Uuid::new_v4(), name))
    }

    #[tokio::test]
    async fn test_commit_renames_part_file() {
        let target = scratch_path("clip.mp4");

        let mut sink = ExportSink::create(&target).await.unwrap();
        sink.write(b"payload bytes").await.unwrap();
        let saved = sink.commit().await.unwrap();
        drop(sink);

        assert_eq!(saved, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"payload bytes");

        let mut part_name = target.file_name().unwrap().to_os_string();
        part_name.push(".part");
        assert!(!target.with_file_name(part_name).exists());

        std::fs::remove_file(&target).unwrap();
    }

    #[tokio::test]
    async fn test_drop_without_commit_removes_part_file() {
        let target = scratch_path("aborted.mp4");

        {
            let mut sink = ExportSink::create(&target).await.unwrap();
            sink.write(b"partial").await.unwrap();
            // dropped uncommitted, as after a mid-stream transport failure
        }

        let mut part_name = target.file_name().unwrap().to_os_string();
        part_name.push(".part");
        assert!(!target.with_file_name(part_name).exists());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_release_happens_once() {
        let target = scratch_path("once.mp4");

        let mut sink = ExportSink::create(&target).await.unwrap();
        sink.write(b"data").await.unwrap();
        sink.commit().await.unwrap();
        drop(sink);

        // Committed file survives the drop.
        assert!(target.exists());
        std::fs::remove_file(&target).unwrap();
    }
}
