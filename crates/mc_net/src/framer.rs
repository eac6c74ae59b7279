use std::io::{Cursor, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use mc_protocol::{Decode, Encode, VarInt};

/// The compression threshold, once the server has announced one. `None`
/// means the uncompressed framing is in effect; modeled as `Option<u32>`
/// rather than a nullable signed int so "no threshold yet" and "threshold of
/// zero" can't be confused.
pub type Threshold = Option<u32>;

/// Framer-level failures. Codec errors from `mc_protocol` bubble up
/// unchanged; both kinds are fatal to the connection.
#[derive(Debug, thiserror::Error)]
pub enum FramerError {
    #[error(transparent)]
    Protocol(#[from] mc_protocol::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("compressed payload length mismatch: expected {expected}, got {actual}")]
    CompressedLengthMismatch { expected: usize, actual: usize },

    #[error("zlib decompression failed: {0}")]
    DecompressionFailure(String),
}

fn map_eof(err: std::io::Error) -> FramerError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        FramerError::UnexpectedEof
    } else {
        FramerError::Io(err)
    }
}

/// Reads a `VarInt` one byte at a time off an async source. A half-closed
/// socket surfaces as `UnexpectedEof`, never `MalformedVarInt` -- that
/// distinction only applies once five bytes have actually arrived with the
/// continuation bit still set.
async fn read_varint_async(reader: &mut (impl AsyncRead + Unpin)) -> Result<i32, FramerError> {
    let mut value: i32 = 0;
    for i in 0..5 {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte).await.map_err(map_eof)?;
        value |= ((byte[0] & 0x7F) as i32) << (7 * i);
        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(FramerError::Protocol(mc_protocol::Error::MalformedVarInt))
}

/// Reads the next packet off the wire, stripping the length prefix and
/// undoing compression if `threshold` is set.
///
/// Returns the packet ID and its raw (still-encoded) payload bytes; decoding
/// the payload into a typed packet is the dispatcher's job.
pub async fn read_frame(
    reader: &mut (impl AsyncRead + Unpin),
    threshold: Threshold,
) -> Result<(i32, Vec<u8>), FramerError> {
    let packet_length = read_varint_async(reader).await?;
    if packet_length < 0 {
        return Err(FramerError::Protocol(mc_protocol::Error::ShortRead {
            expected: 0,
            actual: 0,
        }));
    }

    // Drain exactly `packet_length` bytes, looping internally over
    // fragmented socket reads.
    let mut body = vec![0u8; packet_length as usize];
    reader.read_exact(&mut body).await.map_err(map_eof)?;

    let mut cursor = Cursor::new(body);

    let id_and_payload = match threshold {
        None => {
            let mut rest = Vec::new();
            cursor.read_to_end(&mut rest)?;
            rest
        }
        Some(_) => {
            let data_length = VarInt::decode(&mut cursor)?.0;
            if data_length < 0 {
                return Err(FramerError::Protocol(mc_protocol::Error::ShortRead {
                    expected: 0,
                    actual: 0,
                }));
            }
            let mut rest = Vec::new();
            cursor.read_to_end(&mut rest)?;

            if data_length == 0 {
                // Sentinel: this packet rode uncompressed inside the
                // compressed envelope.
                rest
            } else {
                let mut decoder = ZlibDecoder::new(&rest[..]);
                let mut inflated = Vec::with_capacity(data_length as usize);
                decoder
                    .read_to_end(&mut inflated)
                    .map_err(|err| FramerError::DecompressionFailure(err.to_string()))?;

                if inflated.len() != data_length as usize {
                    return Err(FramerError::CompressedLengthMismatch {
                        expected: data_length as usize,
                        actual: inflated.len(),
                    });
                }
                inflated
            }
        }
    };

    let mut id_cursor = Cursor::new(id_and_payload);
    let packet_id = VarInt::decode(&mut id_cursor)?.0;
    let mut payload = Vec::new();
    id_cursor.read_to_end(&mut payload)?;

    Ok((packet_id, payload))
}

/// Writes one packet to the wire, wrapping/compressing per `threshold`. The
/// caller is responsible for not calling this concurrently from two tasks
/// on the same writer -- writes are serialized by the client facade.
pub async fn write_frame(
    writer: &mut (impl AsyncWrite + Unpin),
    packet_id: i32,
    payload: &[u8],
    threshold: Threshold,
) -> Result<(), FramerError> {
    let mut id_and_data = Vec::with_capacity(payload.len() + 1);
    VarInt(packet_id).encode(&mut id_and_data)?;
    id_and_data.extend_from_slice(payload);

    let body = match threshold {
        None => id_and_data,
        Some(threshold) => {
            let mut out = Vec::new();
            if (id_and_data.len() as u64) < threshold as u64 {
                VarInt(0).encode(&mut out)?;
                out.extend_from_slice(&id_and_data);
            } else {
                VarInt(id_and_data.len() as i32).encode(&mut out)?;
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&id_and_data)?;
                let compressed = encoder.finish()?;
                out.extend_from_slice(&compressed);
            }
            out
        }
    };

    let mut framed = Vec::with_capacity(body.len() + 5);
    VarInt(body.len() as i32).encode(&mut framed)?;
    framed.extend_from_slice(&body);

    writer.write_all(&framed).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use futures_lite::io::Cursor as AsyncCursor;

    #[async_std::test]
    async fn uncompressed_roundtrip_s2() {
        let mut out = Vec::new();
        write_frame(&mut out, 0x00, &[], None).await.unwrap();
        assert_eq!(out, vec![0x01, 0x00]);

        let mut reader = AsyncCursor::new(out);
        let (id, payload) = read_frame(&mut reader, None).await.unwrap();
        assert_eq!(id, 0);
        assert!(payload.is_empty());
    }

    #[async_std::test]
    async fn compressed_below_threshold_s3() {
        let payload = [0xAA, 0xBB, 0xCC, 0xDD];
        let mut out = Vec::new();
        write_frame(&mut out, 0x10, &payload, Some(256))
            .await
            .unwrap();

        // packet_length varint, then data_length == 0, then id + payload literally.
        let mut reader = AsyncCursor::new(out.clone());
        let (id, decoded_payload) = read_frame(&mut reader, Some(256)).await.unwrap();
        assert_eq!(id, 0x10);
        assert_eq!(decoded_payload, payload);

        // Verify the data_length sentinel is literally zero on the wire.
        let mut cursor = Cursor::new(&out[..]);
        let _packet_length = VarInt::decode(&mut cursor).unwrap();
        let data_length = VarInt::decode(&mut cursor).unwrap();
        assert_eq!(data_length.0, 0);
    }

    #[async_std::test]
    async fn compressed_above_threshold_s4() {
        let payload = vec![0xAB; 32];
        let mut out = Vec::new();
        write_frame(&mut out, 0x20, &payload, Some(4)).await.unwrap();

        let mut cursor = Cursor::new(&out[..]);
        let _packet_length = VarInt::decode(&mut cursor).unwrap();
        let data_length = VarInt::decode(&mut cursor).unwrap();
        assert_eq!(data_length.0, 33); // 1 id byte + 32 payload bytes

        let mut reader = AsyncCursor::new(out);
        let (id, decoded_payload) = read_frame(&mut reader, Some(4)).await.unwrap();
        assert_eq!(id, 0x20);
        assert_eq!(decoded_payload, payload);
    }

    #[async_std::test]
    async fn zero_threshold_compresses_everything() {
        let mut out = Vec::new();
        write_frame(&mut out, 0x01, &[1, 2, 3], Some(0)).await.unwrap();
        let mut reader = AsyncCursor::new(out);
        let (id, payload) = read_frame(&mut reader, Some(0)).await.unwrap();
        assert_eq!(id, 0x01);
        assert_eq!(payload, vec![1, 2, 3]);
    }

    #[async_std::test]
    async fn huge_threshold_compresses_nothing() {
        let payload = vec![9u8; 1000];
        let mut out = Vec::new();
        write_frame(&mut out, 0x02, &payload, Some(u32::MAX))
            .await
            .unwrap();
        let mut reader = AsyncCursor::new(out);
        let (id, decoded_payload) = read_frame(&mut reader, Some(u32::MAX)).await.unwrap();
        assert_eq!(id, 0x02);
        assert_eq!(decoded_payload, payload);
    }

    #[async_std::test]
    async fn half_closed_socket_during_varint_is_unexpected_eof() {
        let mut reader = AsyncCursor::new(Vec::<u8>::new());
        let result = read_frame(&mut reader, None).await;
        assert_matches::assert_matches!(result, Err(FramerError::UnexpectedEof));
    }

    #[async_std::test]
    async fn malformed_varint_six_continuation_bytes() {
        let bytes = vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x80];
        let mut reader = AsyncCursor::new(bytes);
        let result = read_varint_async(&mut reader).await;
        assert_matches::assert_matches!(
            result,
            Err(FramerError::Protocol(mc_protocol::Error::MalformedVarInt))
        );
    }

    #[async_std::test]
    async fn decompressed_length_mismatch_is_rejected() {
        // Build a compressed frame, then corrupt the declared data_length.
        let mut out = Vec::new();
        write_frame(&mut out, 0x01, &[1, 2, 3, 4, 5], Some(0)).await.unwrap();

        // Re-encode with a wrong data_length but the same compressed body.
        let mut cursor = Cursor::new(&out[..]);
        let _packet_length = VarInt::decode(&mut cursor).unwrap();
        let _data_length = VarInt::decode(&mut cursor).unwrap();
        let mut compressed_body = Vec::new();
        cursor.read_to_end(&mut compressed_body).unwrap();

        let mut corrupted_inner = Vec::new();
        VarInt(999).encode(&mut corrupted_inner).unwrap();
        corrupted_inner.extend_from_slice(&compressed_body);

        let mut corrupted = Vec::new();
        VarInt(corrupted_inner.len() as i32)
            .encode(&mut corrupted)
            .unwrap();
        corrupted.extend_from_slice(&corrupted_inner);

        let mut reader = AsyncCursor::new(corrupted);
        let result = read_frame(&mut reader, Some(0)).await;
        assert_matches::assert_matches!(
            result,
            Err(FramerError::CompressedLengthMismatch { .. })
        );
    }
}
