// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol constants and radio configuration.
//!
//! [`TransferConfig`] fixes the page/burst/chunk geometry that both
//! endpoints must agree on; it is not meant to vary per-run. [`RadioConfig`]
//! holds the CLI-configurable nRF24 parameters (§6 of the specification).

use crate::error::{Error, Result};

/// Wire-format geometry shared by sender and receiver.
///
/// Canonicalized per the specification's resolution of the `BURST_WIDTH` /
/// `CHUNK_WIDTH` open question: headers are included in every frame, so a
/// chunk carries at most 29 data bytes (32 - 3 header bytes), and a burst
/// holds at most 256 chunks (`ChunkID` is one byte), giving `29 * 256 =
/// 7424` bytes per burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Number of pages the input file is split into.
    pub number_of_pages: u8,
}

impl TransferConfig {
    /// Frame header size in bytes (`PageID:1B ‖ BurstID:1B ‖ ChunkID:1B`).
    pub const HEADER_WIDTH: usize = 3;

    /// Radio MTU; every frame is exactly this many bytes on the wire except
    /// the final short chunk of a page.
    pub const FRAME_WIDTH: usize = 32;

    /// Maximum data bytes carried by one chunk.
    pub const CHUNK_WIDTH: usize = Self::FRAME_WIDTH - Self::HEADER_WIDTH;

    /// Maximum chunks per burst (`ChunkID` is one byte).
    pub const CHUNKS_PER_BURST: usize = 256;

    /// Maximum data bytes carried by one burst.
    pub const BURST_WIDTH: usize = Self::CHUNK_WIDTH * Self::CHUNKS_PER_BURST;

    /// Default page count used by the reference CLI.
    pub const DEFAULT_PAGES: u8 = 10;

    /// Maximum pages representable in a single `TransferInfo` frame:
    /// `(32 - 1) / 3 = 10`. The `PageID` nibble would technically allow up
    /// to 16, but `TransferInfo` is sent as one frame and not chunked, so
    /// this tighter bound is the one that actually matters (§4.4.1, §9).
    pub const MAX_PAGES: u8 = 10;

    /// Build a config, rejecting page counts that don't fit in one
    /// `TransferInfo` frame.
    pub fn new(number_of_pages: u8) -> Result<Self> {
        if number_of_pages == 0 || number_of_pages > Self::MAX_PAGES {
            return Err(Error::TooManyPages(number_of_pages as usize));
        }
        Ok(Self { number_of_pages })
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            number_of_pages: Self::DEFAULT_PAGES,
        }
    }
}

/// Over-the-air data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataRate {
    /// 250 kbps — longest range, NRF24L01+ only.
    Rate250Kbps,
    /// 1 Mbps — default, good balance.
    #[default]
    Rate1Mbps,
    /// 2 Mbps — shortest range, lowest latency.
    Rate2Mbps,
}

/// Transmit power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaLevel {
    /// -18 dBm (minimum).
    #[default]
    Min,
    /// -12 dBm.
    Low,
    /// -6 dBm.
    High,
    /// 0 dBm (maximum).
    Max,
}

/// Hardware CRC width, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcBytes {
    /// CRC disabled.
    Disabled,
    /// 1-byte CRC.
    One,
    /// 2-byte CRC (default, recommended).
    Two,
}

impl Default for CrcBytes {
    fn default() -> Self {
        Self::Two
    }
}

impl CrcBytes {
    /// Build from the raw `--crc-bytes` CLI value.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(Error::RadioBringUp(format!(
                "invalid crc-bytes {other} (expected 0, 1, or 2)"
            ))),
        }
    }
}

/// The two fixed pipe addresses used by the point-to-point link.
///
/// PTX writes on `TA1` and reads `TA0`; PRX is crossed: writes on `TA0` and
/// reads `TA1` (§5). This makes the pair a private logical link regardless
/// of which physical radio happens to power up first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeRole {
    /// Primary transmitter: writes `TA1`, reads `TA0`.
    Ptx,
    /// Primary receiver: writes `TA0`, reads `TA1`.
    Prx,
}

/// Default 3-byte pipe addresses (§4.4: "3-byte addresses").
pub const PIPE_TA0: [u8; 3] = [0xE7, 0xE7, 0xE7];
/// Default 3-byte pipe addresses (§4.4: "3-byte addresses").
pub const PIPE_TA1: [u8; 3] = [0xC2, 0xC2, 0xC2];

impl PipeRole {
    /// Address this role transmits on.
    pub fn write_address(self) -> [u8; 3] {
        match self {
            Self::Ptx => PIPE_TA1,
            Self::Prx => PIPE_TA0,
        }
    }

    /// Address this role listens on.
    pub fn read_address(self) -> [u8; 3] {
        match self {
            Self::Ptx => PIPE_TA0,
            Self::Prx => PIPE_TA1,
        }
    }
}

/// CLI-configurable nRF24 radio parameters (§6).
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// GPIO pin driving CE.
    pub ce_pin: u8,
    /// RF channel, 0..125 (frequency = 2400 + N MHz).
    pub channel: u8,
    /// Modulation data rate.
    pub data_rate: DataRate,
    /// Transmit power.
    pub pa_level: PaLevel,
    /// Hardware CRC width.
    pub crc_bytes: CrcBytes,
    /// Automatic retransmit count, 0..15.
    pub retransmission_tries: u8,
    /// Automatic retransmit delay, in units of 250us, 0..15.
    pub retransmission_delay: u8,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            ce_pin: 22,
            channel: 76,
            data_rate: DataRate::Rate1Mbps,
            pa_level: PaLevel::Min,
            crc_bytes: CrcBytes::Two,
            retransmission_tries: 15,
            retransmission_delay: 2,
        }
    }
}

impl RadioConfig {
    /// Validate the configurable ranges named in §6.
    pub fn validate(&self) -> Result<()> {
        if self.channel > 125 {
            return Err(Error::RadioBringUp(format!(
                "channel {} out of range 0..125",
                self.channel
            )));
        }
        if self.retransmission_tries > 15 {
            return Err(Error::RadioBringUp(format!(
                "retransmission-tries {} out of range 0..15",
                self.retransmission_tries
            )));
        }
        if self.retransmission_delay > 15 {
            return Err(Error::RadioBringUp(format!(
                "retransmission-delay {} out of range 0..15",
                self.retransmission_delay
            )));
        }
        Ok(())
    }

    /// Frequency in MHz for the configured channel.
    pub fn frequency_mhz(&self) -> u16 {
        2400 + self.channel as u16
    }
}
