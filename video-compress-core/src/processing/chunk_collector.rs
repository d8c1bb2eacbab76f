use sha2::{Digest, Sha256};

/// One compressed unit emitted by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    pub sequence: u64,
    pub data: Vec<u8>,
}

/// Append-only store for encoder output.
///
/// Held by the session's encoder sink behind a `parking_lot::Mutex`. Once sealed (finalized or
/// discarded) further chunks are dropped, so a late callback can never
/// leak into a finished artifact.
#[derive(Debug, Default)]
pub struct ChunkCollector {
    chunks: Vec<EncodedChunk>,
    total_bytes: u64,
    next_sequence: u64,
    sealed: bool,
}

impl ChunkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Empty chunks are ignored.
    ///
    /// Returns the chunk's sequence number, or `None` if nothing was stored.
    pub fn push(&mut self, data: Vec<u8>) -> Option<u64> {
        if self.sealed {
            log::warn!("Dropping {} byte chunk delivered after seal", data.len());
            return None;
        }
        if data.is_empty() {
            return None;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.total_bytes += data.len() as u64;
        log::debug!("Chunk #{} ({} bytes, {} total)", sequence, data.len(), self.total_bytes);
        self.chunks.push(EncodedChunk { sequence, data });
        Some(sequence)
    }

    /// Chunks accepted since creation, including ones already drained by `finalize`.
    pub fn emitted(&self) -> u64 {
        self.next_sequence
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Concatenate all chunks in emission order and seal the collector.
    pub fn finalize(&mut self) -> Vec<u8> {
        self.sealed = true;
        let mut artifact = Vec::with_capacity(self.total_bytes as usize);
        for chunk in self.chunks.drain(..) {
            artifact.extend_from_slice(&chunk.data);
        }
        artifact
    }

    /// Drop everything buffered so far and seal the collector.
    pub fn discard(&mut self) {
        if !self.chunks.is_empty() {
            log::debug!("Discarding {} buffered chunks ({} bytes)", self.chunks.len(), self.total_bytes);
        }
        self.chunks.clear();
        self.sealed = true;
    }
}

/// SHA-256 hex digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_concatenates_in_order() {
        let mut collector = ChunkCollector::new();
        assert_eq!(collector.push(vec![1, 2]), Some(0));
        assert_eq!(collector.push(vec![3]), Some(1));
        assert_eq!(collector.push(vec![4, 5, 6]), Some(2));

        assert_eq!(collector.total_bytes(), 6);
        assert_eq!(collector.finalize(), vec![1, 2, 3, 4, 5, 6]);
        assert!(collector.is_sealed());
        assert_eq!(collector.emitted(), 3);
    }

    #[test]
    fn empty_chunks_are_skipped() {
        let mut collector = ChunkCollector::new();
        assert_eq!(collector.push(Vec::new()), None);
        assert_eq!(collector.push(vec![9]), Some(0));
        assert_eq!(collector.chunk_count(), 1);
    }

    #[test]
    fn late_chunks_after_seal_are_dropped() {
        let mut collector = ChunkCollector::new();
        collector.push(vec![1]);
        collector.discard();

        assert_eq!(collector.push(vec![2]), None);
        assert_eq!(collector.chunk_count(), 0);
        assert!(collector.finalize().is_empty());
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
