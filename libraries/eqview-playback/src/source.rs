//! Source nodes: one-shot readers over a decoded asset
//!
//! Mirrors the one-shot discipline of buffer sources in audio graphs: a node
//! is created already started at an offset, renders forward until the buffer
//! runs out, and is discarded rather than restarted. Every `play` makes a
//! fresh node.

use eqview_audio::DecodedAsset;
use std::sync::Arc;
use std::time::Duration;

/// One-shot sample reader bound to a decoded asset
#[derive(Debug, Clone)]
pub struct SourceNode {
    asset: Arc<DecodedAsset>,
    /// Read cursor into the interleaved sample buffer
    cursor: usize,
}

impl SourceNode {
    /// Create a node started at `offset` into the asset
    ///
    /// Offsets past the end clamp to the end, producing an immediately
    /// exhausted node.
    pub fn start(asset: Arc<DecodedAsset>, offset: Duration) -> Self {
        let cursor = asset.sample_index_at(offset);
        Self { asset, cursor }
    }

    /// Fill an interleaved stereo buffer, zero-filling past the end
    ///
    /// Returns the number of samples actually read from the asset.
    pub fn render(&mut self, out: &mut [f32]) -> usize {
        let samples = self.asset.samples();
        let available = samples.len().saturating_sub(self.cursor);
        let to_read = available.min(out.len());

        out[..to_read].copy_from_slice(&samples[self.cursor..self.cursor + to_read]);
        out[to_read..].fill(0.0);

        self.cursor += to_read;
        to_read
    }

    /// Whether the node has read past the end of the asset
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.asset.samples().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_asset(frames: usize, sample_rate: u32) -> Arc<DecodedAsset> {
        // Interleaved ramp: frame i carries (i, -i) scaled into range
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let v = i as f32 / frames as f32;
            samples.push(v);
            samples.push(-v);
        }
        Arc::new(DecodedAsset::from_interleaved(samples, sample_rate))
    }

    #[test]
    fn renders_from_the_requested_offset() {
        let asset = ramp_asset(1000, 1000);
        let mut node = SourceNode::start(Arc::clone(&asset), Duration::from_millis(500));

        let mut out = [0.0_f32; 4];
        let read = node.render(&mut out);
        assert_eq!(read, 4);
        // Frame 500 of the ramp
        assert_eq!(out[0], 0.5);
        assert_eq!(out[1], -0.5);
    }

    #[test]
    fn zero_fills_past_the_end() {
        let asset = ramp_asset(10, 1000);
        let mut node = SourceNode::start(Arc::clone(&asset), Duration::from_millis(8));

        let mut out = [1.0_f32; 8];
        let read = node.render(&mut out);
        assert_eq!(read, 4); // 2 frames remained
        assert!(out[4..].iter().all(|s| *s == 0.0));
        assert!(node.is_exhausted());
    }

    #[test]
    fn offset_past_end_is_immediately_exhausted() {
        let asset = ramp_asset(10, 1000);
        let node = SourceNode::start(asset, Duration::from_secs(5));
        assert!(node.is_exhausted());
    }
}
