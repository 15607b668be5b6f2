//! Content fingerprints used as the dedup key and as a file share's identity.

use futures::stream::StreamExt;
use md5::{Digest, Md5};

use codeshare_core::error::{AppError, ErrorKind};
use codeshare_core::result::AppResult;
use codeshare_core::traits::storage::ByteStream;

/// Compute the lowercase hex MD5 digest (128 bits) of a byte stream.
///
/// Chunks are hashed as they arrive; the content is never held in memory
/// as a whole.
pub async fn fingerprint(mut stream: ByteStream) -> AppResult<String> {
    let mut hasher = Md5::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read content for hashing", e)
        })?;
        hasher.update(&chunk);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn chunks(parts: &[&'static [u8]]) -> ByteStream {
        let items: Vec<Result<Bytes, std::io::Error>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(*p)))
            .collect();
        Box::pin(futures::stream::iter(items))
    }

    #[tokio::test]
    async fn test_known_digests() {
        assert_eq!(
            fingerprint(chunks(&[])).await.unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            fingerprint(chunks(&[&b"hello"[..]])).await.unwrap(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[tokio::test]
    async fn test_chunking_does_not_change_digest() {
        let whole = fingerprint(chunks(&[&b"hello world"[..]])).await.unwrap();
        let split = fingerprint(chunks(&[&b"hel"[..], &b"lo w"[..], &b"orld"[..]])).await.unwrap();
        assert_eq!(whole, split);
        assert_eq!(whole.len(), 32);
    }

    #[tokio::test]
    async fn test_read_error_is_storage_error() {
        let items: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::other("disk gone")),
        ];
        let err = fingerprint(Box::pin(futures::stream::iter(items)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
