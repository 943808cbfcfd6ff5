// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Presentation layer: paging and streaming compression.
//!
//! The sender splits the input into [`TransferConfig::number_of_pages`]
//! pages and compresses each independently-flushed page with
//! [`PageCompressor`]; the receiver reverses both steps.

mod compressor;
mod pager;

pub use compressor::{PageCompressor, PageDecompressor};
pub use pager::paginate;

use crate::config::TransferConfig;
use crate::error::Result;

/// Paginate and compress a whole input file, producing one compressed blob
/// per page, ready to hand to the transport layer.
///
/// An empty file short-circuits to an all-empty-blob result without opening
/// a compressor at all: a sync-flushed deflate stream over zero bytes still
/// emits header/flush-marker bytes, which would give every page a nonzero
/// `bursts_in_page` it doesn't need. Scenario 1 of the specification's
/// testable properties requires page descriptors that are all zero-length
/// for a genuinely empty input.
pub fn compress_input(data: &[u8], config: TransferConfig) -> Result<Vec<Vec<u8>>> {
    if data.is_empty() {
        return Ok(vec![Vec::new(); config.number_of_pages as usize]);
    }
    let pages = paginate(data, config.number_of_pages);
    let mut compressor = PageCompressor::new();
    pages.iter().map(|p| compressor.compress_page(p)).collect()
}

/// Decompress a sequence of page blobs (in `PageID` order) and concatenate
/// them back into the original file bytes.
pub fn decompress_pages(blobs: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut decompressor = PageDecompressor::new();
    let mut out = Vec::new();
    for blob in blobs {
        out.extend(decompressor.decompress_page(blob)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_round_trips_to_empty_output() {
        let config = TransferConfig::default();
        let blobs = compress_input(&[], config).unwrap();
        assert_eq!(blobs.len(), config.number_of_pages as usize);
        let out = decompress_pages(&blobs).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn empty_file_yields_zero_length_page_blobs() {
        // Scenario 1 of the specification's testable properties: every page
        // descriptor must be zero-length, not just the final decompressed
        // output.
        let config = TransferConfig::default();
        let blobs = compress_input(&[], config).unwrap();
        assert!(blobs.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn one_byte_input_yields_one_nonempty_page_blob() {
        // Scenario 2 of the specification's testable properties: a one-byte
        // file produces exactly one page with data; the rest must compress
        // to truly empty blobs, not just an empty plaintext.
        let config = TransferConfig::default();
        let blobs = compress_input(b"A", config).unwrap();
        assert!(!blobs[0].is_empty());
        assert!(blobs[1..].iter().all(|b| b.is_empty()));
        assert_eq!(decompress_pages(&blobs).unwrap(), b"A");
    }

    #[test]
    fn full_file_round_trips() {
        let config = TransferConfig::default();
        let data: Vec<u8> = (0u8..=255).cycle().take(79_050).collect();
        let blobs = compress_input(&data, config).unwrap();
        let out = decompress_pages(&blobs).unwrap();
        assert_eq!(out, data);
    }
}
