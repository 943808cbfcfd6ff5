// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The seam where a real nRF24L01+ driver would be wired in.
//!
//! The physical radio (SPI/GPIO bit-banging, the host daemon that owns the
//! device) is an external collaborator (§1, §6): this crate depends only on
//! [`filebeam_core::link::Radio`]. No hardware driver crate ships here, so
//! bringing up a real device fails with a clear, actionable error instead of
//! silently doing nothing; `filebeam selftest` exercises the exact same
//! state machines over an in-memory loopback pair instead.

use anyhow::{bail, Result};
use filebeam_core::config::{PipeRole, RadioConfig};
use filebeam_core::link::Radio;

/// Bring up a physical radio for `role`. Always fails in this build: no
/// hardware driver is linked in (the external collaborator named above).
pub fn bring_up(_config: &RadioConfig, role: PipeRole) -> Result<Box<dyn Radio>> {
    bail!(
        "no nRF24L01+ driver is linked into this build (role {role:?}); \
         wire a hardware Radio implementation at tools/filebeam-cli::radio_bringup::bring_up, \
         or run `filebeam selftest` to exercise the protocol over a loopback pair"
    )
}
