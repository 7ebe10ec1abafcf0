//! Upload payload sources.

use std::io::{Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, ReadBuf};

use crate::checksum::ChecksumError;
use storegate_protocol::ChecksumType;

/// Readers that can also be rewound.
pub trait SeekableRead: AsyncRead + AsyncSeek + Send + Sync + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Sync + Unpin> SeekableRead for T {}

/// Payload of an upload.
///
/// Computing a checksum consumes the stream, so only [`UploadData::Seekable`]
/// data can be checksummed and then sent.
pub enum UploadData {
    Seekable(Box<dyn SeekableRead>),
    Sequential(Box<dyn AsyncRead + Send + Sync + Unpin>),
}

impl UploadData {
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        UploadData::Seekable(Box::new(Cursor::new(data.into())))
    }

    pub fn from_file(file: tokio::fs::File) -> Self {
        UploadData::Seekable(Box::new(file))
    }

    pub fn seekable<R: SeekableRead + 'static>(reader: R) -> Self {
        UploadData::Seekable(Box::new(reader))
    }

    pub fn sequential<R: AsyncRead + Send + Sync + Unpin + 'static>(reader: R) -> Self {
        UploadData::Sequential(Box::new(reader))
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self, UploadData::Seekable(_))
    }

    /// Seeks back to the first byte.
    ///
    /// `consumed_by` names the checksum that read the stream and is only
    /// used for the error.
    pub async fn rewind(&mut self, consumed_by: ChecksumType) -> Result<(), ChecksumError> {
        match self {
            UploadData::Seekable(reader) => {
                reader.seek(SeekFrom::Start(0)).await?;
                Ok(())
            }
            UploadData::Sequential(_) => Err(ChecksumError::NotSeekable(consumed_by)),
        }
    }
}

impl std::fmt::Debug for UploadData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadData::Seekable(_) => f.write_str("UploadData::Seekable"),
            UploadData::Sequential(_) => f.write_str("UploadData::Sequential"),
        }
    }
}

impl AsyncRead for UploadData {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            UploadData::Seekable(reader) => Pin::new(reader).poll_read(cx, buf),
            UploadData::Sequential(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}
