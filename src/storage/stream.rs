//! Byte stream helpers
//!
//! Blobs travel as single-pass streams of byte chunks in both directions.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Finite, ordered, single-pass sequence of byte chunks
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Wraps an in-memory buffer as a one-chunk stream.
pub fn from_bytes(data: impl Into<Bytes>) -> ByteStream {
    stream::once(futures::future::ready(Ok(data.into()))).boxed()
}

/// Wraps pre-split chunks as a stream, preserving their order.
pub fn from_chunks<I>(chunks: I) -> ByteStream
where
    I: IntoIterator<Item = Bytes>,
    I::IntoIter: Send + 'static,
{
    stream::iter(chunks.into_iter().map(Ok)).boxed()
}

/// Lazily reads `reader` in chunks of exactly `chunk_size` bytes; only the
/// last chunk may be shorter. The reader is dropped once exhausted.
pub fn from_reader<R>(reader: R, chunk_size: usize) -> ByteStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let chunk_size = chunk_size.max(1);
    stream::try_unfold(reader, move |reader| read_chunk(reader, chunk_size)).boxed()
}

async fn read_chunk<R>(mut reader: R, chunk_size: usize) -> io::Result<Option<(Bytes, R)>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk_size];
    let mut filled = 0;

    // Short reads are normal; keep filling until the chunk is full or EOF.
    while filled < chunk_size {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled == 0 {
        return Ok(None);
    }

    buf.truncate(filled);
    Ok(Some((Bytes::from(buf), reader)))
}

/// Drains a stream into one contiguous buffer. Unbounded in memory.
pub async fn collect(stream: ByteStream) -> io::Result<Bytes> {
    let buffer = stream
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await?;
    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_preserves_order() {
        let chunks = vec![
            Bytes::from_static(b"Hello"),
            Bytes::from_static(b", "),
            Bytes::from_static(b"world!"),
        ];
        let data = collect(from_chunks(chunks)).await.unwrap();
        assert_eq!(&data[..], b"Hello, world!");
    }

    #[tokio::test]
    async fn test_from_reader_chunk_sizes() {
        let reader = std::io::Cursor::new(b"Hello, world!".to_vec());
        let chunks: Vec<Bytes> = from_reader(reader, 4).try_collect().await.unwrap();

        let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![4, 4, 4, 1]);
        assert_eq!(chunks.concat(), b"Hello, world!");
    }

    #[tokio::test]
    async fn test_from_reader_empty() {
        let reader = std::io::Cursor::new(Vec::<u8>::new());
        let chunks: Vec<Bytes> = from_reader(reader, 8).try_collect().await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_collect_propagates_stream_error() {
        let failing: ByteStream = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
        ])
        .boxed();

        let err = collect(failing).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
