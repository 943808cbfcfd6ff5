// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # filebeam-core
//!
//! A reliable, unidirectional file-transfer protocol for point-to-point
//! nRF24L01+ links.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Application (filebeam-cli)              |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Presentation (paging, deflate)          |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Transport (PAGE / BURST / CHUNK, SHA-256)|
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Link (wire frames, PTX/PRX, Radio trait)|
//! +-----------------------------------------+
//! ```
//!
//! Only the `Radio` trait crosses into real hardware; everything above it
//! is plain, host-testable Rust, exercised in CI against
//! [`testing::LoopbackRadio`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Protocol constants and radio configuration.
pub mod config;

/// Error types for the filebeam protocol stack.
pub mod error;

/// Link layer: wire frames, the `Radio` trait, PTX/PRX state machines.
pub mod link;

/// Presentation layer: paging and streaming compression.
pub mod presentation;

/// Progress reporting seam used by the Link layer's state machines.
pub mod progress;

/// Transport layer: PAGE/BURST/CHUNK packetization and burst checksums.
pub mod transport;

/// In-memory `Radio` test double, for host-side integration tests.
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use crate::config::{RadioConfig, TransferConfig};
pub use crate::error::{Error, Result};
pub use crate::link::{Frame, Radio, Receiver, ReceiverStats, Sender, SenderStats};
pub use crate::progress::{NullProgress, ProgressSink};
pub use crate::transport::{PageDescriptor, Stream};

/// Version of filebeam-core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
