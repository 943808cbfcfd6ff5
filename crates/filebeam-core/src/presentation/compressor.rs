// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stateful, per-page deflate (zlib) compression and decompression.
//!
//! A single [`PageCompressor`] is opened for the whole transfer. Each page
//! is compressed and then sync-flushed: output is aligned to a byte
//! boundary and the current compressed block is closed without ending the
//! zlib stream, so a [`PageDecompressor`] fed the blobs in order can emit
//! each page's plaintext as soon as that blob arrives.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::error::{Error, Result};

/// Deflate level used for every page (§4.1: "deflate (zlib) at level 6").
const LEVEL: u32 = 6;

/// Sender-side stateful compressor, one instance per transfer.
pub struct PageCompressor {
    compress: Compress,
}

impl PageCompressor {
    /// Open a fresh compressor.
    pub fn new() -> Self {
        Self {
            compress: Compress::new(Compression::new(LEVEL), true),
        }
    }

    /// Compress one page and sync-flush, returning a self-contained blob.
    ///
    /// An empty page is returned as an empty blob without touching the
    /// compressor at all: a sync flush has nothing useful to emit for zero
    /// bytes, and skipping it here means [`PageDecompressor::decompress_page`]
    /// can symmetrically skip the matching page without the two sides'
    /// shared zlib state drifting out of sync.
    pub fn compress_page(&mut self, page: &[u8]) -> Result<Vec<u8>> {
        if page.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(page.len() + 16);
        let mut input_offset = 0;

        loop {
            let before_out = out.len();
            let before_in = self.compress.total_in();
            let status = self
                .compress
                .compress_vec(&page[input_offset..], &mut out, FlushCompress::Sync)
                .map_err(|e| Error::Compression(e.to_string()))?;

            input_offset = (self.compress.total_in() - before_in) as usize + input_offset;
            let made_progress = out.len() > before_out || input_offset >= page.len();

            match status {
                Status::Ok | Status::BufError if input_offset >= page.len() => break,
                Status::StreamEnd => break,
                _ if made_progress => continue,
                _ => {
                    return Err(Error::Compression(
                        "compressor stalled without consuming input".to_string(),
                    ))
                }
            }
        }

        Ok(out)
    }
}

impl Default for PageCompressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver-side stateful decompressor, one instance per transfer.
pub struct PageDecompressor {
    decompress: Decompress,
}

impl PageDecompressor {
    /// Open a fresh decompressor.
    pub fn new() -> Self {
        Self {
            decompress: Decompress::new(true),
        }
    }

    /// Decompress one page blob, returning the page's plaintext bytes.
    pub fn decompress_page(&mut self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(blob.len() * 3);
        let mut input_offset = 0;

        loop {
            let before_out = out.len();
            let before_in = self.decompress.total_in();
            let status = self
                .decompress
                .decompress_vec(&blob[input_offset..], &mut out, FlushDecompress::Sync)
                .map_err(|e| Error::Compression(e.to_string()))?;

            input_offset = (self.decompress.total_in() - before_in) as usize + input_offset;
            let made_progress = out.len() > before_out || input_offset >= blob.len();

            match status {
                Status::Ok | Status::BufError if input_offset >= blob.len() => break,
                Status::StreamEnd => break,
                _ if made_progress => continue,
                _ => {
                    return Err(Error::Compression(
                        "decompressor stalled without consuming input".to_string(),
                    ))
                }
            }
        }

        Ok(out)
    }
}

impl Default for PageDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_round_trips() {
        let mut c = PageCompressor::new();
        let mut d = PageDecompressor::new();
        let blob = c.compress_page(&[]).unwrap();
        let back = d.decompress_page(&blob).unwrap();
        assert_eq!(back, Vec::<u8>::new());
    }

    #[test]
    fn single_page_round_trips() {
        let mut c = PageCompressor::new();
        let mut d = PageDecompressor::new();
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let blob = c.compress_page(&data).unwrap();
        let back = d.decompress_page(&blob).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn sequential_pages_round_trip_independently() {
        let mut c = PageCompressor::new();
        let mut d = PageDecompressor::new();

        let pages: Vec<Vec<u8>> = (0..10)
            .map(|i| format!("page {i}: {}", "x".repeat(i * 7)).into_bytes())
            .collect();

        let blobs: Vec<Vec<u8>> = pages
            .iter()
            .map(|p| c.compress_page(p).unwrap())
            .collect();

        for (page, blob) in pages.iter().zip(blobs.iter()) {
            let decoded = d.decompress_page(blob).unwrap();
            assert_eq!(&decoded, page);
        }
    }
}
