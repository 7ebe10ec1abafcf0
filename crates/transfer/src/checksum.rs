use md5::Md5;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::data::UploadData;
use storegate_protocol::{ChecksumPriority, ChecksumType};

/// Read buffer used while digesting a stream.
const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// Errors raised while negotiating or computing a checksum.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("invalid checksum type: {0}")]
    Unsupported(ChecksumType),

    #[error("data stream is not seekable and cannot be sent after computing its {0} checksum")]
    NotSeekable(ChecksumType),

    #[error("I/O error while computing checksum: {0}")]
    Io(#[from] std::io::Error),
}

/// Negotiated checksum for one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChecksumSelection {
    pub checksum_type: ChecksumType,
    pub digest: String,
}

impl ChecksumSelection {
    /// No checksum is sent.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.checksum_type.is_unset()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Picks the offered algorithm with the numerically smallest priority.
///
/// Ties keep the first entry; an empty list yields [`ChecksumType::Unset`].
pub fn select_checksum_type(offered: &[ChecksumPriority]) -> ChecksumType {
    let mut selected = ChecksumType::Unset;
    let mut best = u32::MAX;
    for xs in offered {
        if xs.priority < best {
            best = xs.priority;
            selected = xs.checksum_type;
        }
    }
    selected
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

enum Hasher {
    Adler32(adler2::Adler32),
    Md5(Md5),
    Sha1(Sha1),
}

impl Hasher {
    fn new(checksum_type: ChecksumType) -> Result<Option<Self>, ChecksumError> {
        match checksum_type {
            ChecksumType::Unset => Ok(None),
            ChecksumType::Adler32 => Ok(Some(Hasher::Adler32(adler2::Adler32::new()))),
            ChecksumType::Md5 => Ok(Some(Hasher::Md5(Md5::new()))),
            ChecksumType::Sha1 => Ok(Some(Hasher::Sha1(Sha1::new()))),
            ChecksumType::Invalid => Err(ChecksumError::Unsupported(checksum_type)),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Adler32(h) => h.write_slice(data),
            Hasher::Md5(h) => h.update(data),
            Hasher::Sha1(h) => h.update(data),
        }
    }

    fn finalize(self) -> String {
        match self {
            Hasher::Adler32(h) => hex::encode(h.checksum().to_be_bytes()),
            Hasher::Md5(h) => hex::encode(h.finalize()),
            Hasher::Sha1(h) => hex::encode(h.finalize()),
        }
    }
}

/// Reads `data` to the end and returns its lowercase hex digest.
///
/// [`ChecksumType::Unset`] returns an empty digest without reading.
pub async fn compute_checksum<R>(
    checksum_type: ChecksumType,
    data: &mut R,
) -> Result<String, ChecksumError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let Some(mut hasher) = Hasher::new(checksum_type)? else {
        return Ok(String::new());
    };

    let mut buf = vec![0u8; DIGEST_BUFFER_SIZE];
    loop {
        let n = data.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Selects an algorithm from `offered`, digests `data` with it and rewinds.
///
/// Fails before reading anything when a checksum is required but `data`
/// cannot be rewound afterwards.
pub async fn negotiate_checksum(
    offered: &[ChecksumPriority],
    data: &mut UploadData,
) -> Result<ChecksumSelection, ChecksumError> {
    let checksum_type = select_checksum_type(offered);
    match checksum_type {
        ChecksumType::Unset => {
            debug!("no checksum offered by endpoint");
            return Ok(ChecksumSelection::none());
        }
        ChecksumType::Invalid => return Err(ChecksumError::Unsupported(checksum_type)),
        _ => {}
    }
    if !data.is_seekable() {
        return Err(ChecksumError::NotSeekable(checksum_type));
    }

    let digest = compute_checksum(checksum_type, data).await?;
    data.rewind(checksum_type).await?;

    debug!(checksum_type = %checksum_type, digest = %digest, "checksum computed");
    Ok(ChecksumSelection {
        checksum_type,
        digest,
    })
}
