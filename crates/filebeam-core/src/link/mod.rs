// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Link layer: the wire frame codec, the `Radio` hardware boundary, and the
//! PTX/PRX state machines that drive a transfer over it (§4.4, §6).

pub mod frame;
pub mod nrf24;
pub mod radio;
pub mod receiver;
pub mod sender;

pub use frame::Frame;
pub use radio::{AckPayload, Radio};
pub use receiver::{Receiver, ReceiverStats};
pub use sender::{Sender, SenderStats};
