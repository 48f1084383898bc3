//! Where the dataset bytes come from.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::error::{FunderError, Result};
use crate::network::HttpClient;

/// Chunked dataset body.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// An opened dataset: its byte stream and declared length, if known.
pub struct DatasetBody {
    pub total_bytes: Option<u64>,
    pub stream: ByteStream,
}

/// A newline-delimited funder dataset that can be opened for reading.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Start reading. Failing here is fatal to ingestion.
    async fn open(&self) -> Result<DatasetBody>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Dataset fetched over HTTP.
pub struct HttpDatasetSource {
    url: String,
    client: HttpClient,
}

impl HttpDatasetSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(url, HttpClient::new()?))
    }

    pub fn with_client(url: impl Into<String>, client: HttpClient) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn open(&self) -> Result<DatasetBody> {
        let response = self.client.get(&self.url).await?;
        let total_bytes = response.content_length();
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(FunderError::from))
            .boxed();

        Ok(DatasetBody {
            total_bytes,
            stream,
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Dataset read from a local file.
pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    async fn open(&self) -> Result<DatasetBody> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| FunderError::Fetch {
                url: self.path.display().to_string(),
                message: e.to_string(),
                status: None,
            })?;
        let total_bytes = file.metadata().await.ok().map(|m| m.len());
        debug!("Reading dataset from {} ({:?} bytes)", self.path.display(), total_bytes);

        let path = self.path.clone();
        let stream = stream::unfold(Some(file), move |state| {
            let path = path.clone();
            async move {
                let mut file = state?;
                let mut buf = vec![0u8; NetworkConfig::FILE_CHUNK_SIZE];
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        Some((Ok(Bytes::from(buf)), Some(file)))
                    }
                    Err(e) => Some((Err(FunderError::io_with_path(e, path)), None)),
                }
            }
        })
        .boxed();

        Ok(DatasetBody {
            total_bytes,
            stream,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Dataset held in memory, split into fixed chunks.
#[derive(Debug, Clone)]
pub struct MemoryDatasetSource {
    chunks: Vec<Bytes>,
    declare_length: bool,
    failure: Option<String>,
}

impl MemoryDatasetSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self::from_chunks(vec![text.into()])
    }

    /// Serve `chunks` one stream item each, in order.
    pub fn from_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks
                .into_iter()
                .map(|c| Bytes::from(c.into().into_bytes()))
                .collect(),
            declare_length: true,
            failure: None,
        }
    }

    /// A source whose `open` always fails like an unreachable server.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            chunks: Vec::new(),
            declare_length: false,
            failure: Some(message.into()),
        }
    }

    /// Do not report a total length, as with a chunked HTTP response.
    pub fn without_length(mut self) -> Self {
        self.declare_length = false;
        self
    }
}

#[async_trait]
impl DatasetSource for MemoryDatasetSource {
    async fn open(&self) -> Result<DatasetBody> {
        if let Some(message) = &self.failure {
            return Err(FunderError::Fetch {
                url: self.describe(),
                message: message.clone(),
                status: None,
            });
        }

        let total: u64 = self.chunks.iter().map(|c| c.len() as u64).sum();
        let items: Vec<Result<Bytes>> = self.chunks.iter().cloned().map(Ok).collect();
        Ok(DatasetBody {
            total_bytes: self.declare_length.then_some(total),
            stream: stream::iter(items).boxed(),
        })
    }

    fn describe(&self) -> String {
        "memory://dataset".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn read_all(body: DatasetBody) -> Vec<u8> {
        let chunks: Vec<Result<Bytes>> = body.stream.collect().await;
        chunks
            .into_iter()
            .flat_map(|c| c.unwrap().to_vec())
            .collect()
    }

    #[tokio::test]
    async fn test_memory_source_declares_length() {
        let source = MemoryDatasetSource::from_chunks(["{\"id\":", "\"a\"}\n"]);
        let body = source.open().await.unwrap();
        assert_eq!(body.total_bytes, Some(11));
        assert_eq!(read_all(body).await, b"{\"id\":\"a\"}\n");

        let body = source.without_length().open().await.unwrap();
        assert_eq!(body.total_bytes, None);
    }

    #[tokio::test]
    async fn test_failing_source_is_fetch_error() {
        let err = MemoryDatasetSource::failing("offline")
            .open()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FunderError::Fetch { .. }));
        assert!(err.is_fatal_to_ingestion());
    }

    #[tokio::test]
    async fn test_file_source_reads_whole_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("funders.jsonl");
        let content = "{\"id\":\"a\"}\n".repeat(10_000);
        std::fs::write(&path, &content).unwrap();

        let body = FileDatasetSource::new(&path).open().await.unwrap();
        assert_eq!(body.total_bytes, Some(content.len() as u64));
        assert_eq!(read_all(body).await, content.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileDatasetSource::new(temp_dir.path().join("absent.jsonl"));
        assert!(matches!(
            source.open().await.err().unwrap(),
            FunderError::Fetch { .. }
        ));
    }
}
