// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! filebeam - send or receive a file over a point-to-point nRF24L01+ link.

mod cli;
mod discovery;
mod logging;
mod progress;
mod radio_bringup;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use colored::*;
use filebeam_core::config::{PipeRole, TransferConfig};
use filebeam_core::link::{Receiver, Sender};
use filebeam_core::testing::{Fault, LoopbackRadio};
use filebeam_core::{presentation, transport};

use cli::{Args, Mode};
use progress::LoggingProgress;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.no_color || !is_tty() {
        colored::control::set_override(false);
    }
    logging::init(&args.log_level);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let radio_config = args.radio_config()?;
    let transfer_config = args.transfer_config()?;

    if args.print_config {
        print_config(&radio_config, transfer_config);
    }
    if args.autostart {
        tracing::debug!("--autostart set (no interactive prompt exists to skip)");
    }

    let result = match &args.mode {
        Mode::Tx { file_path } => run_tx(file_path.as_deref(), transfer_config, &radio_config, &running),
        Mode::Rx { file_path } => run_rx(file_path.as_deref(), &radio_config, &running),
        Mode::SelfTest {
            file_path,
            drop_nth,
            corrupt_nth,
        } => run_selftest(
            file_path.as_deref(),
            transfer_config,
            *drop_nth,
            *corrupt_nth,
            &running,
        ),
    };

    if let Err(e) = &result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
    }
    result
}

fn run_tx(
    file_path: Option<&str>,
    transfer_config: TransferConfig,
    radio_config: &filebeam_core::config::RadioConfig,
    running: &Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let data = discovery::find_tx_input(file_path)?;
    let start = Instant::now();

    let blobs = presentation::compress_input(&data, transfer_config)?;
    let stream = transport::build_stream(&blobs)?;
    let descriptors: Vec<_> = stream
        .pages
        .iter()
        .map(filebeam_core::PageDescriptor::from_page_stream)
        .collect::<Result<_, _>>()?;

    let mut radio = radio_bringup::bring_up(radio_config, PipeRole::Ptx)?;
    let stats = Sender::new(&mut *radio)
        .with_progress(LoggingProgress)
        .run(&descriptors, &stream, || !running.load(Ordering::SeqCst))?;
    radio.power_down()?;

    println!(
        "{} {} bytes sent in {:?} ({} retries, {} checksum mismatches)",
        "Done".green().bold(),
        data.len(),
        start.elapsed(),
        stats.retry_events,
        stats.checksum_mismatches
    );
    Ok(())
}

fn run_rx(
    file_path: Option<&str>,
    radio_config: &filebeam_core::config::RadioConfig,
    running: &Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let sink = discovery::resolve_rx_sink(file_path)?;

    let mut radio = radio_bringup::bring_up(radio_config, PipeRole::Prx)?;
    let (stream, stats) = Receiver::new(&mut *radio)
        .with_progress(LoggingProgress)
        .run(|| !running.load(Ordering::SeqCst))?;
    radio.power_down()?;

    let blobs = transport::reassemble_pages(&stream)?;
    let data = presentation::decompress_pages(&blobs)?;
    let path = discovery::persist(&sink, &data)?;

    println!(
        "{} {} bytes written to {} ({} bursts, {} dropped frames)",
        "Done".green().bold(),
        data.len(),
        path.display(),
        stats.bursts_completed,
        stats.dropped_frames
    );
    Ok(())
}

fn run_selftest(
    file_path: Option<&str>,
    transfer_config: TransferConfig,
    drop_nth: Option<usize>,
    corrupt_nth: Option<usize>,
    running: &Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let data = discovery::find_tx_input(file_path)?;
    let start = Instant::now();

    let blobs = presentation::compress_input(&data, transfer_config)?;
    let stream = transport::build_stream(&blobs)?;
    let descriptors: Vec<_> = stream
        .pages
        .iter()
        .map(filebeam_core::PageDescriptor::from_page_stream)
        .collect::<Result<_, _>>()?;

    let mut faults = Vec::new();
    if let Some(n) = drop_nth {
        faults.push(Fault::DropNth(n));
    }
    if let Some(n) = corrupt_nth {
        faults.push(Fault::CorruptNth(n));
    }
    let (mut ptx, mut prx) = LoopbackRadio::pair(faults, vec![]);

    let running_ptx = running.clone();
    let sender = std::thread::spawn(move || {
        Sender::new(&mut ptx)
            .with_progress(LoggingProgress)
            .run(&descriptors, &stream, move || {
                !running_ptx.load(Ordering::SeqCst)
            })
    });
    let running_prx = running.clone();
    let receiver = std::thread::spawn(move || {
        Receiver::new(&mut prx)
            .with_progress(LoggingProgress)
            .run(move || !running_prx.load(Ordering::SeqCst))
    });

    let sender_stats = sender
        .join()
        .map_err(|_| anyhow::anyhow!("sender thread panicked"))??;
    let (received_stream, receiver_stats) = receiver
        .join()
        .map_err(|_| anyhow::anyhow!("receiver thread panicked"))??;

    let received_blobs = transport::reassemble_pages(&received_stream)?;
    let out = presentation::decompress_pages(&received_blobs)?;
    let ok = out == data;
    let elapsed = start.elapsed();

    println!(
        "{} {} bytes in {:?} ({} pages) — {}",
        if ok { "PASS".green().bold() } else { "FAIL".red().bold() },
        data.len(),
        elapsed,
        transfer_config.number_of_pages,
        if ok { "output matches input".dimmed() } else { "output MISMATCH".red() }
    );
    println!(
        "  sender: {} retries, {} checksum mismatches, {} checksum timeouts",
        sender_stats.retry_events, sender_stats.checksum_mismatches, sender_stats.checksum_timeouts
    );
    println!(
        "  receiver: {} bursts, {} duplicates, {} dropped frames",
        receiver_stats.bursts_completed, receiver_stats.duplicate_frames, receiver_stats.dropped_frames
    );

    if !ok {
        anyhow::bail!("selftest output did not match input");
    }
    Ok(())
}

fn print_config(radio: &filebeam_core::config::RadioConfig, transfer: TransferConfig) {
    eprintln!("{}", "Resolved configuration".bold());
    eprintln!(
        "  radio: ce_pin={} channel={} ({} MHz) data_rate={:?} pa_level={:?} crc_bytes={:?}",
        radio.ce_pin,
        radio.channel,
        radio.frequency_mhz(),
        radio.data_rate,
        radio.pa_level,
        radio.crc_bytes
    );
    eprintln!(
        "  retransmission: tries={} delay={}",
        radio.retransmission_tries, radio.retransmission_delay
    );
    eprintln!("  pages: {}", transfer.number_of_pages);
    eprintln!();
}

fn is_tty() -> bool {
    #[cfg(unix)]
    unsafe {
        libc::isatty(libc::STDOUT_FILENO) != 0
    }
    #[cfg(not(unix))]
    true
}
