// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end PTX/PRX transfers over [`filebeam_core::testing::LoopbackRadio`].
//!
//! Run with `cargo test --features test-util` — the loopback harness is
//! gated behind that feature so release builds never pull it in.
#![cfg(feature = "test-util")]

use filebeam_core::config::TransferConfig;
use filebeam_core::link::{Receiver, Sender};
use filebeam_core::presentation;
use filebeam_core::testing::{Fault, LoopbackRadio};
use filebeam_core::transport::{self, PageDescriptor};

/// Run a full transfer of `data` split into `pages` pages, with the given
/// fault injection on each side, and return the bytes the receiver ends up
/// with.
struct TransferOutcome {
    data: Vec<u8>,
    sender_stats: filebeam_core::link::SenderStats,
    receiver_stats: filebeam_core::link::ReceiverStats,
}

fn transfer(data: &[u8], pages: u8, faults_ptx: Vec<Fault>, faults_prx: Vec<Fault>) -> TransferOutcome {
    let config = TransferConfig::new(pages).unwrap();
    let blobs = presentation::compress_input(data, config).unwrap();
    let stream = transport::build_stream(&blobs).unwrap();
    let descriptors: Vec<PageDescriptor> = stream
        .pages
        .iter()
        .map(PageDescriptor::from_page_stream)
        .collect::<Result<_, _>>()
        .unwrap();

    let (mut ptx, mut prx) = LoopbackRadio::pair(faults_ptx, faults_prx);

    let sender = std::thread::spawn(move || {
        Sender::new(&mut ptx)
            .run(&descriptors, &stream, || false)
            .unwrap()
    });
    let receiver = std::thread::spawn(move || Receiver::new(&mut prx).run(|| false).unwrap());

    let sender_stats = sender.join().unwrap();
    let (received_stream, receiver_stats) = receiver.join().unwrap();

    let received_blobs = transport::reassemble_pages(&received_stream).unwrap();
    let data = presentation::decompress_pages(&received_blobs).unwrap();
    TransferOutcome {
        data,
        sender_stats,
        receiver_stats,
    }
}

#[test]
fn empty_file_round_trips() {
    let outcome = transfer(&[], 4, vec![], vec![]);
    assert!(outcome.data.is_empty());
    assert_eq!(outcome.receiver_stats.dropped_frames, 0);
}

#[test]
fn single_byte_file_round_trips() {
    let outcome = transfer(b"A", 1, vec![], vec![]);
    assert_eq!(outcome.data, b"A");
    assert_eq!(outcome.sender_stats.checksum_mismatches, 0);
}

#[test]
fn multi_page_file_round_trips() {
    let data: Vec<u8> = (0u8..=255).cycle().take(79_050).collect();
    let outcome = transfer(&data, 10, vec![], vec![]);
    assert_eq!(outcome.data, data);
    assert_eq!(outcome.receiver_stats.dropped_frames, 0);
}

#[test]
fn exact_burst_boundary_round_trips() {
    // 7424 bytes is exactly one full burst before compression; compression
    // will shrink it further, but this exercises the single-full-burst path.
    let data = vec![0x5Au8; 7424];
    let outcome = transfer(&data, 2, vec![], vec![]);
    assert_eq!(outcome.data, data);
}

#[test]
fn single_dropped_frame_is_recovered_by_app_level_retry() {
    let data: Vec<u8> = (0u8..=255).cycle().take(5_000).collect();
    // Drop the 3rd frame the PTX ever sends (the TransferInfo is frame 1,
    // so this lands on an early DataFrame) on its first attempt.
    let outcome = transfer(&data, 3, vec![Fault::DropNth(3)], vec![]);
    assert_eq!(outcome.data, data);
    assert!(outcome.sender_stats.retry_events >= 1);
}

#[test]
fn corrupted_data_frame_is_caught_by_burst_checksum() {
    let data: Vec<u8> = (0u8..=255).cycle().take(5_000).collect();
    let outcome = transfer(&data, 3, vec![Fault::CorruptNth(5)], vec![]);
    // The checksum mismatch forces a burst retransmit; final bytes still
    // match because the sender keeps resending the whole burst (bounded by
    // MAX_BURST_RETRANSMITS) until the checksum matches or it gives up.
    assert_eq!(outcome.data, data);
}
