//! Track loading: asset fetch plus Symphonia decode
//!
//! The loader produces a [`DecodedAsset`] and nothing else - it never touches
//! the processing graph. Guarding against stale in-flight loads is the
//! controller's job (it epoch-checks every async continuation).

use crate::asset::DecodedAsset;
use crate::error::{AudioError, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Loads remote audio assets into decoded in-memory buffers
///
/// Supports the compressed-audio containers the demo tracks ship in
/// (AAC/MP4, MP3, OGG/Vorbis, FLAC, WAV). The byte stream itself is treated
/// as opaque; Symphonia probes the container and picks the codec.
#[derive(Debug, Default)]
pub struct TrackLoader;

/// ITU-R BS.775-1 coefficient for folding extra channels into stereo
const DOWNMIX_GAIN: f32 = 0.707;

impl TrackLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self
    }

    /// Fetch a remote asset and decode it
    ///
    /// Fails with [`AudioError::Network`] on transport errors or non-success
    /// HTTP status, and with [`AudioError::Decode`] on malformed audio data.
    pub async fn fetch(&self, url: &str) -> Result<DecodedAsset> {
        debug!(url, "fetching audio asset");

        let network = |reason: String| AudioError::Network {
            url: url.to_string(),
            reason,
        };

        let response = reqwest::get(url)
            .await
            .map_err(|e| network(e.to_string()))?
            .error_for_status()
            .map_err(|e| network(e.to_string()))?;

        let bytes = response.bytes().await.map_err(|e| network(e.to_string()))?;
        self.decode_with_hint(bytes.to_vec(), extension_of(url))
    }

    /// Decode an in-memory byte buffer into an asset
    pub fn decode(&self, bytes: Vec<u8>) -> Result<DecodedAsset> {
        self.decode_with_hint(bytes, None)
    }

    /// Decode with an optional file-extension hint for the format probe
    pub fn decode_with_hint(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAsset> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::Decode(format!("failed to probe container: {e}")))?;

        let mut format = probed.format;

        let track = format.default_track().ok_or(AudioError::NoAudioTrack)?;
        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Decode(format!("failed to create decoder: {e}")))?;

        let mut samples: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(AudioError::Decode(format!("error reading packet: {e}")));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();

                    let buf = sample_buf.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                    });
                    buf.copy_interleaved_ref(decoded);

                    downmix_into(&mut samples, buf.samples(), channels);
                }
                // A corrupt packet is recoverable; skip it and keep decoding
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(error = %e, "skipping undecodable packet");
                }
                Err(e) => {
                    return Err(AudioError::Decode(format!("decode failed: {e}")));
                }
            }
        }

        if samples.is_empty() {
            return Err(AudioError::Decode(
                "container held no decodable audio".to_string(),
            ));
        }

        let asset = DecodedAsset::from_interleaved(samples, sample_rate);
        debug!(
            sample_rate,
            frames = asset.frames(),
            duration_secs = asset.duration().as_secs_f64(),
            "decoded audio asset"
        );
        Ok(asset)
    }
}

/// Fold interleaved `channels`-wide frames into interleaved stereo
///
/// Mono is duplicated, stereo passes through, and any further channels are
/// mixed into both sides at -3 dB.
fn downmix_into(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    match channels {
        0 => {}
        1 => {
            out.reserve(interleaved.len() * 2);
            for &s in interleaved {
                out.push(s);
                out.push(s);
            }
        }
        2 => out.extend_from_slice(interleaved),
        _ => {
            out.reserve(interleaved.len() / channels * 2);
            for frame in interleaved.chunks_exact(channels) {
                let mut left = frame[0];
                let mut right = frame[1];
                for &extra in &frame[2..] {
                    left += extra * DOWNMIX_GAIN;
                    right += extra * DOWNMIX_GAIN;
                }
                out.push(left.clamp(-1.0, 1.0));
                out.push(right.clamp(-1.0, 1.0));
            }
        }
    }
}

/// Best-effort file extension of a URL, for the format probe hint
fn extension_of(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next()?;
    let plausible = !ext.contains('/') && (1..=4).contains(&ext.len());
    plausible.then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_extraction() {
        assert_eq!(extension_of("https://cdn.example.com/track.aac"), Some("aac"));
        assert_eq!(
            extension_of("https://cdn.example.com/track.mp3?token=abc"),
            Some("mp3")
        );
        assert_eq!(extension_of("https://cdn.example.com/track"), None);
    }

    #[test]
    fn mono_downmix_duplicates() {
        let mut out = Vec::new();
        downmix_into(&mut out, &[0.5, -0.25], 1);
        assert_eq!(out, vec![0.5, 0.5, -0.25, -0.25]);
    }

    #[test]
    fn surround_downmix_folds_extra_channels() {
        let mut out = Vec::new();
        // One frame of L, R, C
        downmix_into(&mut out, &[0.2, 0.4, 0.1], 3);
        assert_eq!(out.len(), 2);
        assert!((out[0] - (0.2 + 0.1 * DOWNMIX_GAIN)).abs() < 1e-6);
        assert!((out[1] - (0.4 + 0.1 * DOWNMIX_GAIN)).abs() < 1e-6);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let loader = TrackLoader::new();
        let result = loader.decode(b"definitely not audio data".to_vec());
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }
}
