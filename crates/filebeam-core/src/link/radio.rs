// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Radio` trait: the boundary between this crate's Link-layer state
//! machines and the physical nRF24L01+ driver.
//!
//! The driver itself — register-level SPI/GPIO bit-banging, pipe address
//! programming, the host GPIO/SPI daemon — is an external collaborator
//! (§1, §6 of the specification): this crate only depends on the
//! capabilities below, which any real driver (or a test double) must
//! provide.

use crate::error::Result;

/// Bytes attached to the hardware ACK of a received frame (0..32 B).
pub type AckPayload = Vec<u8>;

/// The capabilities a Link-layer driver must expose (§6 "Radio interface").
///
/// Pipe addresses, channel, data rate, PA level, CRC width, payload mode,
/// and retransmission parameters are all configured once, out-of-band,
/// before a `Radio` is handed to [`crate::link::sender::Sender`] or
/// [`crate::link::receiver::Receiver`] — construction/bring-up is part of
/// the external driver boundary, not this trait.
pub trait Radio {
    /// Transmit one frame and block until the hardware either confirms
    /// delivery or exhausts its auto-retransmit budget.
    ///
    /// Returns the ACK payload attached to the confirming hardware ACK
    /// (empty if none was attached). A [`crate::error::Error::RadioTimeout`]
    /// means the underlying `wait_until_sent` primitive itself timed out;
    /// callers should treat this exactly like an exhausted retransmit
    /// budget and resend (§4.4.2, §4.4.5).
    fn send(&mut self, frame: &[u8]) -> Result<AckPayload>;

    /// Number of packets the hardware auto-retransmit mechanism reports
    /// lost since the last [`Radio::reset_lost_counter`] call.
    fn packages_lost(&self) -> u32;

    /// Reset the lost-packet counter; called before every app-level send
    /// attempt (§4.4.2).
    fn reset_lost_counter(&mut self);

    /// Number of hardware retries the most recent send actually used.
    fn retries(&self) -> u8;

    /// Non-blocking poll: is a frame waiting in the RX FIFO?
    fn data_ready(&mut self) -> bool;

    /// Pull exactly one frame from the RX FIFO. Callers should check
    /// [`Radio::data_ready`] first; behavior when the FIFO is empty is
    /// driver-defined (a test double may block or return an empty frame).
    fn recv(&mut self) -> Result<Vec<u8>>;

    /// Install a payload to be attached to the hardware ACK of the *next*
    /// received frame on this pipe (§3 `AckPayload`, §4.4.3 step 5).
    fn set_ack_payload(&mut self, payload: &[u8]) -> Result<()>;

    /// Power down the radio and release any underlying resources.
    fn power_down(&mut self) -> Result<()>;
}
