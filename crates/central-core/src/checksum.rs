//! Content hashing for backup artifacts.
//!
//! Checksums are SHA-256 over the plaintext bytes, hex-encoded. Streams are
//! consumed in bounded chunks so a large dump never has to sit in memory a
//! second time just to be hashed. The input reader is left at EOF; callers
//! that need the bytes again must reopen the stream.

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read buffer size for streaming digests
const CHUNK_SIZE: usize = 8 * 1024;

/// Compute the hex-encoded SHA-256 digest of an in-memory buffer.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compute the hex-encoded SHA-256 digest of an async byte stream,
/// consuming it chunk-wise until EOF.
pub async fn sha256_hex_stream<R>(mut reader: R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Incremental digest for callers that already receive the content in
/// chunks (e.g. a storage download stream).
#[derive(Default)]
pub struct StreamingChecksum {
    hasher: Sha256,
}

impl StreamingChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = sha256_hex(b"college dump bytes");
        let b = sha256_hex(b"college dump bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_trailing_byte_changes_digest() {
        let a = sha256_hex(b"dump");
        let b = sha256_hex(b"dump\0");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_stream_digest_matches_buffered() {
        // Spans multiple read chunks
        let data = vec![7u8; CHUNK_SIZE * 3 + 17];
        let streamed = sha256_hex_stream(std::io::Cursor::new(data.clone()))
            .await
            .unwrap();
        assert_eq!(streamed, sha256_hex(&data));
    }

    #[test]
    fn test_incremental_matches_buffered() {
        let mut checksum = StreamingChecksum::new();
        checksum.update(b"part one ");
        checksum.update(b"part two");
        assert_eq!(checksum.finalize(), sha256_hex(b"part one part two"));
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let digest = sha256_hex_stream(std::io::Cursor::new(Vec::new()))
            .await
            .unwrap();
        assert_eq!(digest, sha256_hex(b""));
    }
}
