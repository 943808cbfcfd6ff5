// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the filebeam protocol stack.

use thiserror::Error;

/// Result type used throughout `filebeam-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for presentation/transport/link operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying file or stream I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The deflate compressor or decompressor failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// Neither the requested input nor the bundled fallback file could be found.
    #[error("input file not found and no fallback available")]
    InputNotFound,

    /// A page/burst/chunk count exceeded what a single-byte wire field (or
    /// a single `TransferInfo` frame) can represent.
    #[error("count {0} exceeds the protocol's single-frame/single-byte limit")]
    TooManyPages(usize),

    /// A chunk would not fit in a single 32-byte frame.
    #[error("frame too large for one chunk: {0} bytes")]
    FrameTooLarge(usize),

    /// The radio reported a bring-up failure (GPIO/SPI daemon unreachable, etc.).
    #[error("radio bring-up failed: {0}")]
    RadioBringUp(String),

    /// `wait_until_sent` (or equivalent) did not complete within the radio's timeout.
    #[error("radio send timed out")]
    RadioTimeout,

    /// The receiver never produced a valid burst checksum within the wait window.
    #[error("checksum wait timed out for page {page} burst {burst}")]
    ChecksumTimeout {
        /// Page the burst belongs to.
        page: u8,
        /// Burst within the page.
        burst: u8,
    },

    /// A received frame had an unrecognized type tag or malformed header.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The user interrupted the transfer (SIGINT).
    #[error("transfer interrupted")]
    Interrupted,
}
