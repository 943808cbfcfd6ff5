// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport layer: deterministic packetization of compressed pages into
//! `PAGE / BURST / CHUNK` frames, plus the per-burst integrity hash.
//!
//! The sender side ([`build_stream`]) walks a list of compressed page blobs
//! and produces a [`Stream`] of already-encoded, on-wire [`DataFrame`]
//! bytes together with a matching per-burst SHA-256 table. The receiver
//! side ([`reassemble_pages`]) reverses this: it strips the 3-byte header
//! from every accepted frame and concatenates data back into page blobs.

use sha2::{Digest, Sha256};

use crate::config::TransferConfig;
use crate::error::{Error, Result};
use crate::link::frame::Frame;

/// One burst's worth of encoded data frames plus its integrity hash.
///
/// `frames[i]` is the exact on-wire byte sequence for chunk `i` (3-byte
/// header plus up to 29 data bytes — never padded to 32 bytes).
#[derive(Debug, Clone, Default)]
pub struct Burst {
    /// Encoded `DataFrame` bytes, indexed by `ChunkID`.
    pub frames: Vec<Vec<u8>>,
    /// `SHA256(concat(frames))`, computed over full on-wire bytes, headers
    /// included (specification §9).
    pub checksum: [u8; 32],
}

/// One page's bursts, indexed by `BurstID`.
#[derive(Debug, Clone, Default)]
pub struct PageStream {
    /// Bursts belonging to this page.
    pub bursts: Vec<Burst>,
}

/// The full `STREAM`: every chunk of the transfer, indexed by
/// `PageID -> BurstID -> ChunkID`.
#[derive(Debug, Clone, Default)]
pub struct Stream {
    /// Pages, indexed by `PageID`.
    pub pages: Vec<PageStream>,
}

/// One page's `TransferInfo` descriptor: `(burstsInPage, chunksInLastBurst,
/// bytesInLastChunk)`, each one byte on the wire (§3).
///
/// `chunks_in_last_burst` uses a 0-means-256 wraparound: a last burst always
/// has at least one chunk when `bursts_in_page > 0`, so the all-zero byte is
/// free to mean "a full 256-chunk burst" — the one case a page's final burst
/// can legitimately be full (every *other* burst in the page is always
/// full by construction, so this ambiguity only ever touches the last one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    /// Number of bursts in the page, 0 if the page is empty.
    pub bursts_in_page: u8,
    /// Chunks in the final burst, wraparound-encoded (see struct docs).
    pub chunks_in_last_burst: u8,
    /// Data bytes in the final chunk, 1..=29 (meaningless if the page is
    /// empty).
    pub bytes_in_last_chunk: u8,
}

impl PageDescriptor {
    /// Encode the count of chunks in the last burst (1..=256) into its
    /// wraparound byte representation.
    fn encode_last_burst_chunks(count: usize) -> u8 {
        if count == 256 {
            0
        } else {
            count as u8
        }
    }

    /// Decode the wraparound byte back into a chunk count (1..=256).
    pub fn last_burst_chunk_count(&self) -> usize {
        if self.bursts_in_page == 0 {
            0
        } else if self.chunks_in_last_burst == 0 {
            256
        } else {
            self.chunks_in_last_burst as usize
        }
    }

    /// Derive a page's descriptor from its already-built [`PageStream`].
    pub fn from_page_stream(page: &PageStream) -> Result<Self> {
        if page.bursts.len() > 255 {
            return Err(Error::TooManyPages(page.bursts.len()));
        }
        let Some(last_burst) = page.bursts.last() else {
            return Ok(Self {
                bursts_in_page: 0,
                chunks_in_last_burst: 0,
                bytes_in_last_chunk: 0,
            });
        };
        let chunk_count = last_burst.frames.len();
        let last_frame = last_burst
            .frames
            .last()
            .expect("a burst always has at least one chunk");
        let bytes_in_last_chunk = (last_frame.len() - TransferConfig::HEADER_WIDTH) as u8;

        Ok(Self {
            bursts_in_page: page.bursts.len() as u8,
            chunks_in_last_burst: Self::encode_last_burst_chunks(chunk_count),
            bytes_in_last_chunk,
        })
    }

    /// Expected on-wire length (bytes) of chunk `chunk_id` in burst
    /// `burst_id` of this page — used by the receiver to validate frame
    /// lengths per §4.4.3 rule 2.
    pub fn expected_chunk_len(&self, burst_id: u8, chunk_id: u8) -> Option<usize> {
        if self.bursts_in_page == 0 || burst_id as usize >= self.bursts_in_page as usize {
            return None;
        }
        let is_last_burst = burst_id as usize == self.bursts_in_page as usize - 1;
        let chunks_in_this_burst = if is_last_burst {
            self.last_burst_chunk_count()
        } else {
            TransferConfig::CHUNKS_PER_BURST
        };
        if chunk_id as usize >= chunks_in_this_burst {
            return None;
        }
        let is_last_chunk = is_last_burst && chunk_id as usize == chunks_in_this_burst - 1;
        let data_len = if is_last_chunk {
            self.bytes_in_last_chunk as usize
        } else {
            TransferConfig::CHUNK_WIDTH
        };
        Some(TransferConfig::HEADER_WIDTH + data_len)
    }
}

/// Slice a list of compressed page blobs into bursts and chunks, encode
/// every chunk as a `DataFrame`, and compute each burst's checksum.
pub fn build_stream(pages: &[Vec<u8>]) -> Result<Stream> {
    let mut stream = Stream {
        pages: Vec::with_capacity(pages.len()),
    };

    for (page_idx, page_bytes) in pages.iter().enumerate() {
        let page_id = u8::try_from(page_idx).map_err(|_| Error::TooManyPages(page_idx + 1))?;
        let mut bursts = Vec::new();

        for (burst_idx, burst_bytes) in page_bytes.chunks(TransferConfig::BURST_WIDTH).enumerate()
        {
            if burst_idx > 255 {
                return Err(Error::TooManyPages(burst_idx + 1));
            }
            let burst_id = burst_idx as u8;
            let mut frames = Vec::new();
            let mut hasher = Sha256::new();

            for (chunk_idx, chunk_bytes) in
                burst_bytes.chunks(TransferConfig::CHUNK_WIDTH).enumerate()
            {
                if chunk_idx > 255 {
                    return Err(Error::TooManyPages(chunk_idx + 1));
                }
                let frame = Frame::Data {
                    page: page_id,
                    burst: burst_id,
                    chunk: chunk_idx as u8,
                    data: chunk_bytes.to_vec(),
                }
                .encode()?;
                hasher.update(&frame);
                frames.push(frame);
            }

            let checksum = hasher.finalize().into();
            bursts.push(Burst { frames, checksum });
        }

        stream.pages.push(PageStream { bursts });
    }

    Ok(stream)
}

/// Reverse the transport layer on the receiver: strip headers from every
/// accepted frame and concatenate data back into compressed page blobs.
pub fn reassemble_pages(stream: &Stream) -> Result<Vec<Vec<u8>>> {
    stream
        .pages
        .iter()
        .map(|page| {
            let mut buf = Vec::new();
            for burst in &page.bursts {
                for frame in &burst.frames {
                    match Frame::decode(frame)? {
                        Frame::Data { data, .. } => buf.extend(data),
                        other => {
                            return Err(Error::InvalidFrame(format!(
                                "expected DataFrame in STREAM, found {other:?}"
                            )))
                        }
                    }
                }
            }
            Ok(buf)
        })
        .collect()
}

/// Recompute a burst's checksum over its currently-stored frames — used by
/// the receiver to verify a just-completed burst against the sender's ACK
/// payload.
pub fn checksum_of(frames: &[Vec<u8>]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for frame in frames {
        hasher.update(frame);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_byte_page_hashes_the_four_byte_frame() {
        let pages = vec![b"A".to_vec()];
        let stream = build_stream(&pages).unwrap();
        let burst = &stream.pages[0].bursts[0];
        assert_eq!(burst.frames.len(), 1);
        assert_eq!(burst.frames[0], vec![0, 0, 0, b'A']);

        let mut hasher = Sha256::new();
        hasher.update([0u8, 0, 0, b'A']);
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(burst.checksum, expected);
    }

    #[test]
    fn full_burst_has_32_data_frames_at_928_bytes() {
        let data = vec![7u8; 928];
        let pages = vec![data];
        let stream = build_stream(&pages).unwrap();
        let burst = &stream.pages[0].bursts[0];
        assert_eq!(burst.frames.len(), 32);
        assert!(burst.frames.iter().all(|f| f.len() == 32));
    }

    #[test]
    fn two_bursts_for_7906_bytes() {
        let data = vec![3u8; 7906];
        let pages = vec![data];
        let stream = build_stream(&pages).unwrap();
        assert_eq!(stream.pages[0].bursts.len(), 2);
        let d0 = PageDescriptor::from_page_stream(&stream.pages[0]).unwrap();
        assert_eq!(d0.bursts_in_page, 2);
    }

    #[test]
    fn reassembly_round_trips() {
        let pages: Vec<Vec<u8>> = (0..10)
            .map(|i| vec![i as u8; 100 + i * 37])
            .collect();
        let stream = build_stream(&pages).unwrap();
        let back = reassemble_pages(&stream).unwrap();
        assert_eq!(back, pages);
    }

    #[test]
    fn page_descriptor_bounds_coordinates() {
        let pages = vec![vec![1u8; 7424]]; // exactly one full burst, 256 chunks
        let stream = build_stream(&pages).unwrap();
        let desc = PageDescriptor::from_page_stream(&stream.pages[0]).unwrap();
        assert_eq!(desc.bursts_in_page, 1);
        assert_eq!(desc.last_burst_chunk_count(), 256);
        assert_eq!(desc.expected_chunk_len(0, 255), Some(32));
        assert_eq!(desc.expected_chunk_len(0, 256), None);
    }

    #[test]
    fn empty_page_descriptor_has_zero_bursts() {
        let pages = vec![Vec::new()];
        let stream = build_stream(&pages).unwrap();
        let desc = PageDescriptor::from_page_stream(&stream.pages[0]).unwrap();
        assert_eq!(desc.bursts_in_page, 0);
        assert_eq!(desc.expected_chunk_len(0, 0), None);
    }
}
