//! File access used by the importer.

use std::{future::Future, io, path::PathBuf, pin::Pin};

/// Future returned by [`DocumentSource`] reads
pub type ReadFuture<'a> = Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + 'a>>;

/// Where question documents come from.
pub trait DocumentSource: Send + Sync {
    /// Read a user-selected document in full.
    fn open_for_read<'a>(&'a self, source_ref: &'a str) -> ReadFuture<'a>;

    /// Read an asset bundled with the application in full.
    fn read_bundled_asset<'a>(&'a self, name: &'a str) -> ReadFuture<'a>;
}

/// Reads documents from the local filesystem
#[derive(Debug, Clone)]
pub struct FsSource {
    assets_dir: PathBuf,
}

impl FsSource {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }
}

impl DocumentSource for FsSource {
    fn open_for_read<'a>(&'a self, source_ref: &'a str) -> ReadFuture<'a> {
        Box::pin(tokio::fs::read(source_ref))
    }

    fn read_bundled_asset<'a>(&'a self, name: &'a str) -> ReadFuture<'a> {
        let path = self.assets_dir.join(name);
        Box::pin(async move { tokio::fs::read(path).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let source = FsSource::new("/nonexistent-quizbank-assets");

        let err = source.read_bundled_asset("default_bank.json").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = source.open_for_read("/nonexistent-quizbank/bank.json").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
