// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Command-line arguments (§6 of the specification).

use clap::{Parser, Subcommand};
use filebeam_core::config::{CrcBytes, DataRate, PaLevel, RadioConfig, TransferConfig};

/// Send or receive a file over a point-to-point nRF24L01+ link.
#[derive(Parser, Debug)]
#[command(name = "filebeam")]
#[command(version)]
#[command(about = "Reliable unidirectional file transfer over an nRF24L01+ radio link")]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,

    /// GPIO pin driving radio CE, 0..31.
    #[arg(long, default_value_t = 22, global = true)]
    pub ce_pin: u8,

    /// RF channel, 0..125 (frequency = 2400 + N MHz).
    #[arg(long, default_value_t = 76, global = true)]
    pub channel: u8,

    /// Modulation data rate: 250kbps, 1mbps, 2mbps.
    #[arg(long, default_value = "1mbps", global = true)]
    pub data_rate: DataRateArg,

    /// Transmit power: min, low, high, max.
    #[arg(long, default_value = "min", global = true)]
    pub pa_level: PaLevelArg,

    /// Hardware CRC width in bytes: 0, 1, or 2.
    #[arg(long, default_value_t = 2, global = true)]
    pub crc_bytes: u8,

    /// Automatic retransmit count, 0..15.
    #[arg(long, default_value_t = 15, global = true)]
    pub retransmission_tries: u8,

    /// Automatic retransmit delay, in units of 250us, 0..15.
    #[arg(long, default_value_t = 2, global = true)]
    pub retransmission_delay: u8,

    /// Skip any interactive confirmation before starting the transfer.
    #[arg(long, global = true)]
    pub autostart: bool,

    /// Echo the resolved radio and page configuration before starting.
    #[arg(long, global = true)]
    pub print_config: bool,

    /// Number of pages the file is split into, 1..=10.
    #[arg(long, default_value_t = TransferConfig::DEFAULT_PAGES, global = true)]
    pub pages: u8,

    /// Log level filter, also overridable with `RUST_LOG`.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Send a file (PTX role).
    Tx {
        /// Source file. Unset: scan removable media, then the bundled
        /// fallback.
        #[arg(long)]
        file_path: Option<String>,
    },
    /// Receive a file (PRX role).
    Rx {
        /// Sink directory. Unset: scan removable media, then the current
        /// directory.
        #[arg(long)]
        file_path: Option<String>,
    },
    /// Run a full transfer against an in-memory loopback radio pair, for
    /// smoke-testing the protocol stack without real hardware.
    SelfTest {
        /// Source file to send through the loopback pair. Unset: the
        /// bundled fallback.
        #[arg(long)]
        file_path: Option<String>,

        /// Drop the Nth frame the sender transmits, on its first attempt.
        #[arg(long)]
        drop_nth: Option<usize>,

        /// Corrupt the Nth frame the sender transmits.
        #[arg(long)]
        corrupt_nth: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataRateArg(pub DataRate);

impl std::str::FromStr for DataRateArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "250kbps" | "250" => Ok(Self(DataRate::Rate250Kbps)),
            "1mbps" | "1" => Ok(Self(DataRate::Rate1Mbps)),
            "2mbps" | "2" => Ok(Self(DataRate::Rate2Mbps)),
            other => Err(format!("unknown data rate: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaLevelArg(pub PaLevel);

impl std::str::FromStr for PaLevelArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min" => Ok(Self(PaLevel::Min)),
            "low" => Ok(Self(PaLevel::Low)),
            "high" => Ok(Self(PaLevel::High)),
            "max" => Ok(Self(PaLevel::Max)),
            other => Err(format!("unknown PA level: {other}")),
        }
    }
}

impl Args {
    /// Build the resolved [`RadioConfig`] from the parsed flags.
    pub fn radio_config(&self) -> anyhow::Result<RadioConfig> {
        let config = RadioConfig {
            ce_pin: self.ce_pin,
            channel: self.channel,
            data_rate: self.data_rate.0,
            pa_level: self.pa_level.0,
            crc_bytes: CrcBytes::from_u8(self.crc_bytes)?,
            retransmission_tries: self.retransmission_tries,
            retransmission_delay: self.retransmission_delay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the resolved [`TransferConfig`] from the parsed flags.
    pub fn transfer_config(&self) -> anyhow::Result<TransferConfig> {
        Ok(TransferConfig::new(self.pages)?)
    }
}
