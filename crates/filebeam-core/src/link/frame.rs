// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The wire frame taxonomy (§4.4.1): a tagged union packed into the radio's
//! 32-byte MTU. The first byte's high nibble routes a received frame to its
//! variant; `DataFrame`s additionally use the low nibble for `PageID`.

use crate::config::TransferConfig;
use crate::error::{Error, Result};
use crate::transport::PageDescriptor;

/// Control-frame type tag: `TransferInfo`.
const TAG_TRANSFER_INFO: u8 = 0xF0;
/// Control-frame type tag: `EmptyFrame`.
const TAG_EMPTY: u8 = 0xF3;
/// Control-frame type tag: `TransferFinish`.
const TAG_FINISH: u8 = 0xFA;

/// A decoded or about-to-be-encoded radio frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A chunk of page data. `page` is 0..=15 (packed into the first
    /// byte's low nibble, high nibble `0x0`).
    Data {
        /// `PageID`, 0..=15.
        page: u8,
        /// `BurstID`, 0..=255.
        burst: u8,
        /// `ChunkID`, 0..=255.
        chunk: u8,
        /// Up to 29 bytes of compressed page data.
        data: Vec<u8>,
    },
    /// Sent once at transfer start (re-sent if lost); describes every
    /// page's layout so the receiver can pre-allocate `STREAM`.
    TransferInfo {
        /// One descriptor per page, in `PageID` order.
        pages: Vec<PageDescriptor>,
    },
    /// Solicits a hardware ACK payload without carrying fresh data.
    Empty,
    /// Sent once at transfer end; terminates the receiver's main loop.
    Finish,
}

impl Frame {
    /// Encode this frame to its on-wire byte representation.
    ///
    /// `DataFrame`s are exactly `3 + data.len()` bytes (no padding — the
    /// radio's dynamic-payload feature carries the true length). Control
    /// frames fill the entire 32-byte MTU with their tag byte, per §4.4.1's
    /// robustness note, except `TransferInfo` which is `1 + 3*pages.len()`
    /// bytes (never padded, since its exact length IS the page count).
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Frame::Data {
                page,
                burst,
                chunk,
                data,
            } => {
                if *page > 0x0F {
                    return Err(Error::InvalidFrame(format!("PageID {page} exceeds 4 bits")));
                }
                if data.len() > TransferConfig::CHUNK_WIDTH {
                    return Err(Error::FrameTooLarge(data.len() + TransferConfig::HEADER_WIDTH));
                }
                let mut buf = Vec::with_capacity(TransferConfig::HEADER_WIDTH + data.len());
                buf.push(*page & 0x0F);
                buf.push(*burst);
                buf.push(*chunk);
                buf.extend_from_slice(data);
                Ok(buf)
            }
            Frame::TransferInfo { pages } => {
                if pages.len() > 10 {
                    return Err(Error::TooManyPages(pages.len()));
                }
                let mut buf = Vec::with_capacity(1 + pages.len() * 3);
                buf.push(TAG_TRANSFER_INFO);
                for desc in pages {
                    buf.push(desc.bursts_in_page);
                    buf.push(desc.chunks_in_last_burst);
                    buf.push(desc.bytes_in_last_chunk);
                }
                Ok(buf)
            }
            Frame::Empty => Ok(vec![TAG_EMPTY; TransferConfig::FRAME_WIDTH]),
            Frame::Finish => Ok(vec![TAG_FINISH; TransferConfig::FRAME_WIDTH]),
        }
    }

    /// Decode a frame from its on-wire bytes, classifying by the first
    /// byte's high nibble (§4.4.1).
    pub fn decode(buf: &[u8]) -> Result<Frame> {
        let Some(&tag) = buf.first() else {
            return Err(Error::InvalidFrame("empty frame".to_string()));
        };

        if tag & 0xF0 == 0x00 {
            if buf.len() < TransferConfig::HEADER_WIDTH
                || buf.len() > TransferConfig::FRAME_WIDTH
            {
                return Err(Error::InvalidFrame(format!(
                    "DataFrame length {} out of range",
                    buf.len()
                )));
            }
            return Ok(Frame::Data {
                page: tag & 0x0F,
                burst: buf[1],
                chunk: buf[2],
                data: buf[TransferConfig::HEADER_WIDTH..].to_vec(),
            });
        }

        match tag {
            TAG_TRANSFER_INFO => {
                let body = &buf[1..];
                if body.len() % 3 != 0 {
                    return Err(Error::InvalidFrame(
                        "TransferInfo body not a multiple of 3 bytes".to_string(),
                    ));
                }
                let pages = body
                    .chunks_exact(3)
                    .map(|t| PageDescriptor {
                        bursts_in_page: t[0],
                        chunks_in_last_burst: t[1],
                        bytes_in_last_chunk: t[2],
                    })
                    .collect();
                Ok(Frame::TransferInfo { pages })
            }
            TAG_EMPTY => Ok(Frame::Empty),
            TAG_FINISH => Ok(Frame::Finish),
            other => Err(Error::InvalidFrame(format!("unknown frame tag 0x{other:02X}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_frame_round_trips_full_chunk() {
        let frame = Frame::Data {
            page: 3,
            burst: 7,
            chunk: 200,
            data: vec![0xAB; 29],
        };
        let encoded = frame.encode().unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[0], 3);
        let decoded = Frame::decode(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn data_frame_round_trips_short_chunk() {
        let frame = Frame::Data {
            page: 0,
            burst: 0,
            chunk: 0,
            data: vec![b'A'],
        };
        let encoded = frame.encode().unwrap();
        assert_eq!(encoded, vec![0, 0, 0, b'A']);
        assert_eq!(Frame::decode(&encoded).unwrap(), frame);
    }

    #[test]
    fn data_frame_rejects_oversized_chunk() {
        let frame = Frame::Data {
            page: 0,
            burst: 0,
            chunk: 0,
            data: vec![0u8; 30],
        };
        assert!(frame.encode().is_err());
    }

    #[test]
    fn data_frame_rejects_page_over_four_bits() {
        let frame = Frame::Data {
            page: 16,
            burst: 0,
            chunk: 0,
            data: vec![],
        };
        assert!(frame.encode().is_err());
    }

    #[test]
    fn empty_and_finish_fill_all_32_bytes() {
        let empty = Frame::Empty.encode().unwrap();
        assert_eq!(empty, vec![0xF3; 32]);
        assert_eq!(Frame::decode(&empty).unwrap(), Frame::Empty);

        let finish = Frame::Finish.encode().unwrap();
        assert_eq!(finish, vec![0xFA; 32]);
        assert_eq!(Frame::decode(&finish).unwrap(), Frame::Finish);
    }

    #[test]
    fn transfer_info_round_trips() {
        let pages = vec![
            PageDescriptor {
                bursts_in_page: 1,
                chunks_in_last_burst: 32,
                bytes_in_last_chunk: 29,
            },
            PageDescriptor {
                bursts_in_page: 0,
                chunks_in_last_burst: 0,
                bytes_in_last_chunk: 0,
            },
        ];
        let frame = Frame::TransferInfo { pages: pages.clone() };
        let encoded = frame.encode().unwrap();
        assert_eq!(encoded[0], 0xF0);
        assert_eq!(encoded.len(), 1 + 2 * 3);
        match Frame::decode(&encoded).unwrap() {
            Frame::TransferInfo { pages: decoded } => assert_eq!(decoded, pages),
            other => panic!("expected TransferInfo, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(Frame::decode(&[0xF5; 32]).is_err());
    }
}
