// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! An in-memory pair of [`Radio`] implementations, wired together by
//! channels, for exercising [`crate::link::sender::Sender`] and
//! [`crate::link::receiver::Receiver`] without real SPI/GPIO hardware.
//!
//! Each endpoint of a [`LoopbackRadio::pair`] should run on its own thread,
//! the same way a real PTX and PRX are two separate physical devices.

use std::sync::mpsc::{self, Receiver as MpscReceiver, Sender as MpscSender};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::link::radio::{AckPayload, Radio};

/// A scripted failure injected on a specific send attempt, 1-indexed over
/// that endpoint's own send calls.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// The Nth frame sent never reaches the peer; the hardware reports a
    /// lost packet (`packages_lost` becomes nonzero) but the app-level
    /// retry loop simply resends (§4.4.2, §8 scenario "injected loss").
    DropNth(usize),
    /// The Nth frame sent reaches the peer with its last byte flipped,
    /// simulating in-flight corruption that a checksum mismatch should
    /// catch downstream.
    CorruptNth(usize),
}

/// One end of an in-memory radio pair.
pub struct LoopbackRadio {
    outgoing: MpscSender<Vec<u8>>,
    incoming: MpscReceiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
    /// Payload this endpoint has installed via `set_ack_payload`, read by
    /// the peer's `send()` as the ACK payload for frames sent to us.
    own_ack_payload: Arc<Mutex<Vec<u8>>>,
    /// The peer's installed ACK payload, read when we send a frame.
    peer_ack_payload: Arc<Mutex<Vec<u8>>>,
    packages_lost: u32,
    retries: u8,
    faults: Vec<Fault>,
    sent_count: usize,
}

impl LoopbackRadio {
    /// Build a connected pair. `faults_a`/`faults_b` are applied to frames
    /// sent *from* that side.
    pub fn pair(faults_a: Vec<Fault>, faults_b: Vec<Fault>) -> (Self, Self) {
        let (a_to_b_tx, a_to_b_rx) = mpsc::channel();
        let (b_to_a_tx, b_to_a_rx) = mpsc::channel();
        let ack_a = Arc::new(Mutex::new(Vec::new()));
        let ack_b = Arc::new(Mutex::new(Vec::new()));

        let a = LoopbackRadio {
            outgoing: a_to_b_tx,
            incoming: b_to_a_rx,
            pending: None,
            own_ack_payload: ack_a.clone(),
            peer_ack_payload: ack_b.clone(),
            packages_lost: 0,
            retries: 0,
            faults: faults_a,
            sent_count: 0,
        };
        let b = LoopbackRadio {
            outgoing: b_to_a_tx,
            incoming: a_to_b_rx,
            pending: None,
            own_ack_payload: ack_b,
            peer_ack_payload: ack_a,
            packages_lost: 0,
            retries: 0,
            faults: faults_b,
            sent_count: 0,
        };
        (a, b)
    }
}

impl Radio for LoopbackRadio {
    fn send(&mut self, frame: &[u8]) -> Result<AckPayload> {
        self.sent_count += 1;
        let mut payload = frame.to_vec();
        let mut lost = false;

        for fault in &self.faults {
            match *fault {
                Fault::DropNth(n) if n == self.sent_count => lost = true,
                Fault::CorruptNth(n) if n == self.sent_count => {
                    if let Some(last) = payload.last_mut() {
                        *last ^= 0xFF;
                    }
                }
                _ => {}
            }
        }

        if lost {
            self.packages_lost = self.packages_lost.saturating_add(1);
            self.retries = self.retries.saturating_add(1);
            return Ok(Vec::new());
        }

        self.outgoing
            .send(payload)
            .map_err(|_| Error::RadioBringUp("peer endpoint disconnected".to_string()))?;

        Ok(self.peer_ack_payload.lock().unwrap().clone())
    }

    fn packages_lost(&self) -> u32 {
        self.packages_lost
    }

    fn reset_lost_counter(&mut self) {
        self.packages_lost = 0;
    }

    fn retries(&self) -> u8 {
        self.retries
    }

    fn data_ready(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        match self.incoming.try_recv() {
            Ok(frame) => {
                self.pending = Some(frame);
                true
            }
            Err(_) => false,
        }
    }

    fn recv(&mut self) -> Result<Vec<u8>> {
        if let Some(frame) = self.pending.take() {
            return Ok(frame);
        }
        self.incoming
            .recv()
            .map_err(|_| Error::RadioBringUp("peer endpoint disconnected".to_string()))
    }

    fn set_ack_payload(&mut self, payload: &[u8]) -> Result<()> {
        *self.own_ack_payload.lock().unwrap() = payload.to_vec();
        Ok(())
    }

    fn power_down(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sent_by_a_is_received_by_b() {
        let (mut a, mut b) = LoopbackRadio::pair(vec![], vec![]);
        a.send(&[1, 2, 3]).unwrap();
        assert!(b.data_ready());
        assert_eq!(b.recv().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn dropped_frame_never_arrives_but_is_counted() {
        let (mut a, b) = LoopbackRadio::pair(vec![Fault::DropNth(1)], vec![]);
        a.reset_lost_counter();
        a.send(&[9]).unwrap();
        assert_eq!(a.packages_lost(), 1);
        drop(b);
    }

    #[test]
    fn ack_payload_round_trips() {
        let (mut a, mut b) = LoopbackRadio::pair(vec![], vec![]);
        b.set_ack_payload(&[0xAA; 32]).unwrap();
        let ack = a.send(&[1]).unwrap();
        assert_eq!(ack, vec![0xAA; 32]);
    }
}
