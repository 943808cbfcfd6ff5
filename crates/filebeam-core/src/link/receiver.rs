// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PRX state machine (§4.4.3): accept `TransferInfo`, validate and
//! strictly order incoming `DataFrame`s into `STREAM`, answer checksum
//! requests, and stop on `TransferFinish`.

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::link::frame::Frame;
use crate::link::radio::Radio;
use crate::progress::{NullProgress, ProgressSink};
use crate::transport::{Burst, PageDescriptor, PageStream, Stream};

/// Counters surfaced to the CLI at the end of a transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiverStats {
    /// Frames matching the most recently accepted coordinate — a hardware
    /// retransmit of a frame we already have. Harmless; just discarded.
    pub duplicate_frames: u32,
    /// Frames dropped for any other reason: before `TransferInfo`, bad
    /// coordinates, wrong length, or out of strict order.
    pub dropped_frames: u32,
    /// Bursts whose checksum was computed (i.e. fully received).
    pub bursts_completed: u32,
}

/// The next `(PageID, BurstID, ChunkID)` this receiver will accept.
type Coordinate = (u8, u8, u8);

/// Drives a [`Radio`] through a full receive, producing the reassembled
/// `STREAM` of compressed page blobs.
pub struct Receiver<'a, R: Radio + ?Sized> {
    radio: &'a mut R,
    descriptors: Option<Vec<PageDescriptor>>,
    stream: Stream,
    expect: Option<Coordinate>,
    last_accepted: Option<Coordinate>,
    /// The `(page, burst)` whose checksum was most recently confirmed ready
    /// (i.e. `expect` has moved past it). Tracked so a chunk-0 retransmit of
    /// that exact burst — the sender's response to a checksum mismatch it
    /// detected on its end — can be recognized and accepted instead of
    /// dropped as out-of-order (SPEC_FULL.md §12, open question 1).
    last_completed_burst: Option<(u8, u8)>,
    hasher: Option<Sha256>,
    pending_ack: Vec<u8>,
    stats: ReceiverStats,
    progress: Box<dyn ProgressSink>,
    current_page: Option<u8>,
}

impl<'a, R: Radio + ?Sized> Receiver<'a, R> {
    /// Build a receiver around an already configured, already-"up" radio.
    /// Reports no progress; use [`Receiver::with_progress`] to attach a sink.
    pub fn new(radio: &'a mut R) -> Self {
        Self {
            radio,
            descriptors: None,
            stream: Stream::default(),
            expect: None,
            last_accepted: None,
            last_completed_burst: None,
            hasher: None,
            pending_ack: Vec::new(),
            stats: ReceiverStats::default(),
            progress: Box::new(NullProgress),
            current_page: None,
        }
    }

    /// Attach a [`ProgressSink`] to be notified at page/burst boundaries.
    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Run the full PRX state machine until `TransferFinish` arrives (or
    /// `should_stop` requests an unwind).
    pub fn run(mut self, mut should_stop: impl FnMut() -> bool) -> Result<(Stream, ReceiverStats)> {
        loop {
            if should_stop() {
                return Err(Error::Interrupted);
            }
            if !self.radio.data_ready() {
                continue;
            }
            let raw = self.radio.recv()?;
            let frame = match Frame::decode(&raw) {
                Ok(frame) => frame,
                Err(e) => {
                    self.stats.dropped_frames += 1;
                    warn!(error = %e, "dropping undecodable frame");
                    continue;
                }
            };

            match frame {
                Frame::TransferInfo { pages } => self.on_transfer_info(pages),
                Frame::Data {
                    page,
                    burst,
                    chunk,
                    data,
                } => self.on_data_frame(page, burst, chunk, &raw, data.len())?,
                Frame::Empty => {
                    self.radio.set_ack_payload(&self.pending_ack)?;
                }
                Frame::Finish => {
                    debug!("TransferFinish received, stopping");
                    let pages = self.descriptors.as_ref().map_or(0, |d| d.len() as u8);
                    self.progress.on_transfer_done(pages);
                    return Ok((self.stream, self.stats));
                }
            }
        }
    }

    fn on_transfer_info(&mut self, pages: Vec<PageDescriptor>) {
        if self.descriptors.is_some() {
            // Re-sent TransferInfo the sender resends defensively; already
            // initialized, so this is a no-op (§4.4.2 idempotence).
            return;
        }
        debug!(pages = pages.len(), "TransferInfo received");
        self.stream.pages = pages.iter().map(|_| PageStream::default()).collect();
        self.expect = first_data_coordinate(&pages);
        self.descriptors = Some(pages);
    }

    fn on_data_frame(
        &mut self,
        page: u8,
        burst: u8,
        chunk: u8,
        raw: &[u8],
        data_len: usize,
    ) -> Result<()> {
        let Some(descriptors) = &self.descriptors else {
            self.stats.dropped_frames += 1;
            warn!("dropping DataFrame received before TransferInfo");
            return Ok(());
        };
        let Some(desc) = descriptors.get(page as usize) else {
            self.stats.dropped_frames += 1;
            warn!(page, "dropping DataFrame with out-of-range PageID");
            return Ok(());
        };
        let Some(expected_len) = desc.expected_chunk_len(burst, chunk) else {
            self.stats.dropped_frames += 1;
            warn!(page, burst, chunk, "dropping DataFrame with invalid coordinate");
            return Ok(());
        };
        if expected_len != crate::config::TransferConfig::HEADER_WIDTH + data_len {
            self.stats.dropped_frames += 1;
            warn!(page, burst, chunk, "dropping DataFrame with wrong length");
            return Ok(());
        }

        let coordinate = (page, burst, chunk);
        if self.last_accepted == Some(coordinate) {
            self.stats.duplicate_frames += 1;
            return Ok(());
        }
        if self.expect != Some(coordinate) {
            if chunk == 0 && self.last_completed_burst == Some((page, burst)) {
                // The sender detected a checksum mismatch on this burst and
                // is retransmitting it from chunk 0. Forget what we already
                // have for it and rewind so the positional invariant holds
                // (spec.md §9, §4.4.4).
                debug!(page, burst, "rewinding burst for checksum-mismatch retransmit");
                self.stream.pages[page as usize].bursts[burst as usize] = Burst::default();
                self.last_completed_burst = None;
                self.expect = Some(coordinate);
            } else {
                self.stats.dropped_frames += 1;
                warn!(page, burst, chunk, expect = ?self.expect, "dropping out-of-order DataFrame");
                return Ok(());
            }
        }

        if self.current_page != Some(page) {
            self.progress.on_page_start(page, desc.bursts_in_page);
            self.current_page = Some(page);
        }

        if chunk == 0 {
            self.hasher = Some(Sha256::new());
            self.pending_ack.clear();
            // §9: the ACK payload must be explicitly reset to empty at the
            // start of every burst, not just left stale from the last one —
            // otherwise a "not ready yet" EmptyFrame reply would still carry
            // the previous burst's 32-byte checksum.
            self.radio.set_ack_payload(&[])?;
        }
        self.hasher
            .get_or_insert_with(Sha256::new)
            .update(raw);

        let page_stream = &mut self.stream.pages[page as usize];
        if page_stream.bursts.len() == burst as usize {
            page_stream.bursts.push(Burst::default());
        }
        page_stream.bursts[burst as usize].frames.push(raw.to_vec());
        self.last_accepted = Some(coordinate);

        if is_last_chunk_of_burst(desc, burst, chunk) {
            let checksum: [u8; 32] = self
                .hasher
                .take()
                .expect("hasher is always set before the last chunk of a burst")
                .finalize()
                .into();
            self.stream.pages[page as usize].bursts[burst as usize].checksum = checksum;
            self.pending_ack = checksum.to_vec();
            // §4.4.3 step 5: install the checksum on the pipe as soon as the
            // burst is complete, so the sender's next solicitation reads it
            // back without waiting for a further loop iteration.
            self.radio.set_ack_payload(&self.pending_ack)?;
            self.stats.bursts_completed += 1;
            self.last_completed_burst = Some((page, burst));
            debug!(page, burst, "burst complete, checksum ready");

            self.expect = if is_last_burst_of_page(desc, burst) {
                next_data_coordinate(descriptors, page)
            } else {
                Some((page, burst + 1, 0))
            };
        } else {
            self.expect = Some((page, burst, chunk + 1));
        }
        Ok(())
    }
}

/// First `(page, 0, 0)` whose page actually carries data, skipping pages
/// with `bursts_in_page == 0`.
fn first_data_coordinate(descriptors: &[PageDescriptor]) -> Option<Coordinate> {
    descriptors
        .iter()
        .position(|d| d.bursts_in_page > 0)
        .map(|idx| (idx as u8, 0, 0))
}

/// First `(page, 0, 0)` after `after_page` whose page carries data.
fn next_data_coordinate(descriptors: &[PageDescriptor], after_page: u8) -> Option<Coordinate> {
    descriptors
        .iter()
        .enumerate()
        .skip(after_page as usize + 1)
        .find(|(_, d)| d.bursts_in_page > 0)
        .map(|(idx, _)| (idx as u8, 0, 0))
}

fn is_last_chunk_of_burst(desc: &PageDescriptor, burst: u8, chunk: u8) -> bool {
    if chunk == u8::MAX {
        return true;
    }
    desc.expected_chunk_len(burst, chunk + 1).is_none()
}

fn is_last_burst_of_page(desc: &PageDescriptor, burst: u8) -> bool {
    if burst == u8::MAX {
        return true;
    }
    desc.expected_chunk_len(burst + 1, 0).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(bursts_in_page: u8, chunks_in_last_burst: u8, bytes_in_last_chunk: u8) -> PageDescriptor {
        PageDescriptor {
            bursts_in_page,
            chunks_in_last_burst,
            bytes_in_last_chunk,
        }
    }

    #[test]
    fn first_data_coordinate_skips_empty_pages() {
        let descriptors = vec![desc(0, 0, 0), desc(1, 1, 5)];
        assert_eq!(first_data_coordinate(&descriptors), Some((1, 0, 0)));
    }

    #[test]
    fn next_data_coordinate_skips_trailing_empty_pages() {
        let descriptors = vec![desc(1, 1, 5), desc(0, 0, 0), desc(1, 1, 5)];
        assert_eq!(next_data_coordinate(&descriptors, 0), Some((2, 0, 0)));
        assert_eq!(next_data_coordinate(&descriptors, 2), None);
    }

    #[test]
    fn burst_retransmit_after_mismatch_rewinds_and_overwrites_corrupted_data() {
        use crate::testing::LoopbackRadio;

        let (mut radio, _peer) = LoopbackRadio::pair(vec![], vec![]);
        let mut receiver = Receiver::new(&mut radio);
        // One burst of two chunks: a full 29-byte chunk, then a 1-byte
        // final chunk (the only place a short chunk may legally appear).
        let descriptors = vec![desc(1, 2, 1)];
        receiver.on_transfer_info(descriptors);

        let chunk0 = [[0u8, 0, 0].as_slice(), &[0xAAu8; 29]].concat();

        // First delivery of the burst: the last chunk is corrupted in flight.
        receiver.on_data_frame(0, 0, 0, &chunk0, 29).unwrap();
        receiver.on_data_frame(0, 0, 1, &[0, 0, 1, b'X'], 1).unwrap();
        assert_eq!(receiver.last_completed_burst, Some((0, 0)));
        let wrong_checksum = receiver.stream.pages[0].bursts[0].checksum;

        // Sender noticed the checksum mismatch and resends the whole burst
        // with correct data, starting again from chunk 0.
        receiver.on_data_frame(0, 0, 0, &chunk0, 29).unwrap();
        assert_eq!(receiver.stream.pages[0].bursts[0].frames.len(), 1);
        receiver.on_data_frame(0, 0, 1, &[0, 0, 1, b'B'], 1).unwrap();

        let fixed_checksum = receiver.stream.pages[0].bursts[0].checksum;
        assert_ne!(wrong_checksum, fixed_checksum);
        assert_eq!(
            receiver.stream.pages[0].bursts[0].frames,
            vec![chunk0.to_vec(), vec![0, 0, 1, b'B']]
        );
        assert_eq!(receiver.stats.bursts_completed, 2);
    }

    #[test]
    fn last_chunk_and_burst_detection() {
        let d = desc(2, 10, 3);
        assert!(!is_last_chunk_of_burst(&d, 0, 254));
        assert!(is_last_chunk_of_burst(&d, 0, 255));
        assert!(!is_last_burst_of_page(&d, 0));
        assert!(is_last_chunk_of_burst(&d, 1, 9));
        assert!(is_last_burst_of_page(&d, 1));
    }
}
