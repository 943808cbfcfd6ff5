// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PTX state machine (§4.4.2): `SEND_TRANSFER_INFO -> SEND_DATA ->
//! REQUEST_CHECKSUM -> ... -> SEND_TRANSFER_FINISH -> DONE`.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::link::frame::Frame;
use crate::link::radio::Radio;
use crate::progress::{NullProgress, ProgressSink};
use crate::transport::{self, PageDescriptor, Stream};

/// How long the sender waits for a valid 32-byte checksum ACK before giving
/// up on a burst and advancing anyway (§9 "checksum wait timeout").
pub const CHECKSUM_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// How many times the sender will retransmit a whole burst after a checksum
/// mismatch before giving up and advancing regardless (open question
/// resolution, SPEC_FULL.md §12).
pub const MAX_BURST_RETRANSMITS: u32 = 3;

/// Counters surfaced to the CLI at the end of a transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SenderStats {
    /// Number of times the outer per-frame send loop had to resend a frame
    /// because the radio reported a nonzero `packages_lost` (or timed out)
    /// after a send attempt.
    pub retry_events: u32,
    /// Number of bursts whose checksum ACK never matched after
    /// [`MAX_BURST_RETRANSMITS`] retransmissions.
    pub checksum_mismatches: u32,
    /// Number of bursts whose checksum ACK never arrived within
    /// [`CHECKSUM_WAIT_TIMEOUT`].
    pub checksum_timeouts: u32,
}

/// Drives a [`Radio`] through a full transfer of an already-packetized
/// [`Stream`].
pub struct Sender<'a, R: Radio + ?Sized> {
    radio: &'a mut R,
    stats: SenderStats,
    progress: Box<dyn ProgressSink>,
}

impl<'a, R: Radio + ?Sized> Sender<'a, R> {
    /// Build a sender around an already configured, already-"up" radio.
    /// Reports no progress; use [`Sender::with_progress`] to attach a sink.
    pub fn new(radio: &'a mut R) -> Self {
        Self {
            radio,
            stats: SenderStats::default(),
            progress: Box::new(NullProgress),
        }
    }

    /// Attach a [`ProgressSink`] to be notified at page/burst boundaries.
    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Run the full PTX state machine to completion.
    ///
    /// `should_stop` is polled between every app-level frame attempt so a
    /// SIGINT can unwind the loop instead of retrying forever.
    pub fn run(
        &mut self,
        descriptors: &[PageDescriptor],
        stream: &Stream,
        mut should_stop: impl FnMut() -> bool,
    ) -> Result<SenderStats> {
        self.send_transfer_info(descriptors, &mut should_stop)?;

        for (page_idx, page) in stream.pages.iter().enumerate() {
            self.progress
                .on_page_start(page_idx as u8, page.bursts.len() as u8);
            for (burst_idx, burst) in page.bursts.iter().enumerate() {
                self.send_burst(
                    page_idx as u8,
                    burst_idx as u8,
                    burst,
                    &mut should_stop,
                )?;
                self.progress
                    .on_burst_done(page_idx as u8, burst_idx as u8);
            }
        }

        self.send_transfer_finish(&mut should_stop)?;
        self.progress.on_transfer_done(descriptors.len() as u8);
        Ok(self.stats)
    }

    fn send_transfer_info(
        &mut self,
        descriptors: &[PageDescriptor],
        should_stop: &mut impl FnMut() -> bool,
    ) -> Result<()> {
        let frame = Frame::TransferInfo {
            pages: descriptors.to_vec(),
        }
        .encode()?;
        debug!(pages = descriptors.len(), "sending TransferInfo");
        self.send_until_acked(&frame, should_stop)?;
        Ok(())
    }

    fn send_burst(
        &mut self,
        page: u8,
        burst_id: u8,
        burst: &transport::Burst,
        should_stop: &mut impl FnMut() -> bool,
    ) -> Result<()> {
        let mut attempts = 0u32;
        loop {
            for frame in &burst.frames {
                self.send_until_acked(frame, should_stop)?;
            }

            match self.request_checksum(page, burst_id, should_stop) {
                Ok(ack_checksum) if ack_checksum == burst.checksum => {
                    debug!(page, burst = burst_id, "burst checksum confirmed");
                    return Ok(());
                }
                Ok(_) => {
                    attempts += 1;
                    self.stats.checksum_mismatches += 1;
                    warn!(page, burst = burst_id, attempts, "burst checksum mismatch");
                    if attempts >= MAX_BURST_RETRANSMITS {
                        warn!(
                            page,
                            burst = burst_id,
                            "giving up on burst after {attempts} retransmits, advancing anyway"
                        );
                        return Ok(());
                    }
                }
                Err(Error::ChecksumTimeout { .. }) => {
                    self.stats.checksum_timeouts += 1;
                    warn!(page, burst = burst_id, "checksum wait timed out, advancing anyway");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send an `EmptyFrame` (re-sending as needed) until a 32-byte checksum
    /// ACK payload arrives, or [`CHECKSUM_WAIT_TIMEOUT`] elapses.
    fn request_checksum(
        &mut self,
        page: u8,
        burst_id: u8,
        should_stop: &mut impl FnMut() -> bool,
    ) -> Result<[u8; 32]> {
        let frame = Frame::Empty.encode()?;
        let deadline = Instant::now() + CHECKSUM_WAIT_TIMEOUT;
        loop {
            if Instant::now() >= deadline {
                return Err(Error::ChecksumTimeout { page, burst: burst_id });
            }
            let ack = self.send_until_acked(&frame, should_stop)?;
            if ack.len() == 32 {
                let mut checksum = [0u8; 32];
                checksum.copy_from_slice(&ack);
                return Ok(checksum);
            }
        }
    }

    fn send_transfer_finish(&mut self, should_stop: &mut impl FnMut() -> bool) -> Result<()> {
        let frame = Frame::Finish.encode()?;
        debug!("sending TransferFinish");
        self.send_until_acked(&frame, should_stop)?;
        Ok(())
    }

    /// Send one already-encoded frame, resending until the radio reports a
    /// clean delivery (`packages_lost() == 0`), per §4.4.2's outer retry
    /// loop. A `RadioTimeout` from the radio's `wait_until_sent` is treated
    /// exactly like a lossy send: just retry.
    fn send_until_acked(
        &mut self,
        frame: &[u8],
        should_stop: &mut impl FnMut() -> bool,
    ) -> Result<Vec<u8>> {
        loop {
            if should_stop() {
                return Err(Error::Interrupted);
            }
            self.radio.reset_lost_counter();
            match self.radio.send(frame) {
                Ok(ack) => {
                    if self.radio.packages_lost() == 0 {
                        return Ok(ack);
                    }
                    self.stats.retry_events += 1;
                    debug!(packages_lost = self.radio.packages_lost(), "resending frame");
                }
                Err(Error::RadioTimeout) => {
                    self.stats.retry_events += 1;
                    warn!("radio send timed out, resending frame");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
