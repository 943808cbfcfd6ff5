// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The concrete [`ProgressSink`](filebeam_core::ProgressSink) this binary
//! attaches to [`Sender`](filebeam_core::Sender) and
//! [`Receiver`](filebeam_core::Receiver).
//!
//! A rendered terminal progress bar is an external collaborator this repo
//! doesn't own; this reports via `tracing` instead.

use filebeam_core::ProgressSink;

/// Reports via `tracing::info!`, one line per page and a summary line at
/// the end of the transfer.
pub struct LoggingProgress;

impl ProgressSink for LoggingProgress {
    fn on_page_start(&self, page: u8, bursts: u8) {
        tracing::info!(page, bursts, "starting page");
    }

    fn on_burst_done(&self, page: u8, burst: u8) {
        tracing::debug!(page, burst, "burst done");
    }

    fn on_transfer_done(&self, pages: u8) {
        tracing::info!(pages, "transfer done");
    }
}
