// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chunked file reader feeding the worker a complete buffer.

use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::CliError;

/// Default read size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Read `path` in `chunk_size` pieces, reporting `(bytes_read, total)` after each.
pub async fn read_chunked<F>(
    path: &Path,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<Vec<u8>, CliError>
where
    F: FnMut(u64, u64),
{
    if chunk_size == 0 {
        return Err(CliError::InvalidChunkSize);
    }

    let read_err = |source: std::io::Error| CliError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).await.map_err(read_err)?;
    let total = file.metadata().await.map_err(read_err)?.len();

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let n = file.read(&mut chunk).await.map_err(read_err)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);

        let read = bytes.len() as u64;
        tracing::debug!(
            read,
            total,
            percent = if total == 0 { 100.0 } else { read as f64 / total as f64 * 100.0 },
            "file chunk"
        );
        on_chunk(read, total);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_whole_file_in_chunks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        file.write_all(&data).unwrap();

        let mut calls = Vec::new();
        let bytes = read_chunked(file.path(), 4096, |read, total| calls.push((read, total)))
            .await
            .unwrap();

        assert_eq!(bytes, data);
        assert_eq!(calls.last().copied(), Some((10_000, 10_000)));
        assert!(calls.len() >= 3);
        assert!(calls.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[tokio::test]
    async fn test_zero_chunk_size_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_chunked(file.path(), 0, |_, _| {}).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidChunkSize));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_chunked(&dir.path().join("missing.stl"), 16, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
