//! Delivery of encoded audio
//!
//! Two sinks: a file under an output directory (batch use) and a lazy,
//! single-pass stream of fixed-size chunks (HTTP streaming).

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;

use crate::encoder::EncodedAudio;
use crate::PipelineError;

/// Split `audio` into `chunk_size` slices, pausing after each one
///
/// The pause lets the transport flush the chunk before the next slice is
/// produced. It does not track how fast the client actually reads.
/// Slices share the underlying buffer, so no bytes are copied.
pub fn chunk_stream(
    audio: Bytes,
    chunk_size: usize,
    pause: Duration,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let chunk_size = chunk_size.max(1);

    async_stream::stream! {
        tracing::info!(total_bytes = audio.len(), chunk_size, "Streaming audio to client");

        let mut offset = 0;
        while offset < audio.len() {
            let end = usize::min(offset + chunk_size, audio.len());
            yield Ok::<Bytes, std::io::Error>(audio.slice(offset..end));
            offset = end;

            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        tracing::info!("Streaming audio finished");
    }
}

/// Write `audio` to `output_dir/filename`, creating the directory if needed
pub async fn write_to_dir(
    output_dir: &Path,
    filename: &str,
    audio: &EncodedAudio,
) -> Result<PathBuf, PipelineError> {
    tokio::fs::create_dir_all(output_dir).await?;

    let path = output_dir.join(filename);
    tokio::fs::write(&path, audio.bytes()).await?;

    tracing::debug!(path = %path.display(), bytes = audio.len(), "Audio written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_wav;
    use aksa_tts_core::Waveform;
    use futures::StreamExt;

    async fn collect(stream: impl Stream<Item = Result<Bytes, std::io::Error>>) -> Vec<Bytes> {
        stream.map(|chunk| chunk.unwrap()).collect().await
    }

    #[tokio::test]
    async fn test_chunks_reassemble_exactly() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let chunks = collect(chunk_stream(Bytes::from(payload.clone()), 4096, Duration::ZERO)).await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 4096);
        assert_eq!(chunks[2].len(), 10_000 - 8192);
        assert_eq!(chunks.concat(), payload);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_empty_chunk() {
        let chunks = collect(chunk_stream(Bytes::from(vec![7u8; 2048]), 1024, Duration::ZERO)).await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 1024));
    }

    #[tokio::test]
    async fn test_empty_buffer_yields_nothing() {
        let chunks = collect(chunk_stream(Bytes::new(), 1024, Duration::ZERO)).await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_clamped() {
        let chunks = collect(chunk_stream(Bytes::from_static(b"RIFF"), 0, Duration::ZERO)).await;
        assert_eq!(chunks.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_between_chunks() {
        let start = tokio::time::Instant::now();
        let chunks = collect(chunk_stream(
            Bytes::from(vec![0u8; 3000]),
            1000,
            Duration::from_millis(10),
        ))
        .await;

        assert_eq!(chunks.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_wav_stream_matches_single_encoding() {
        let wave = Waveform::new((0..50_000).map(|i| ((i % 100) as f32 / 100.0) - 0.5).collect(), 24000);
        let encoded = encode_wav(&wave).unwrap();

        let chunks = collect(chunk_stream(encoded.bytes().clone(), 16 * 1024, Duration::ZERO)).await;
        assert_eq!(chunks.concat(), encoded.bytes().to_vec());
    }

    #[tokio::test]
    async fn test_write_to_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("output");
        let encoded = encode_wav(&Waveform::silence(100, 24000)).unwrap();

        let path = write_to_dir(&output_dir, "hasil.wav", &encoded).await.unwrap();

        assert_eq!(path, output_dir.join("hasil.wav"));
        assert_eq!(std::fs::read(&path).unwrap(), encoded.bytes().to_vec());
    }
}
