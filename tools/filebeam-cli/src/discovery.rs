// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! File discovery and output persistence (§6 "File I/O", §11).

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

/// Bundled fallback content, used when no TX file can be found any other way.
const FALLBACK: &[u8] = include_bytes!("../assets/fallback.txt");

/// Conventional removable-media mount roots to scan for a source file.
const USB_MOUNT_ROOTS: &[&str] = &["/media", "/mnt"];

/// Resolve the TX input: an explicit path, then the first regular file
/// found under a removable-media mount point, then the bundled fallback.
pub fn find_tx_input(explicit: Option<&str>) -> Result<Vec<u8>> {
    if let Some(path) = explicit {
        return std::fs::read(path).with_context(|| format!("reading {path}"));
    }

    if let Some(path) = scan_usb_mounts() {
        tracing::info!(path = %path.display(), "found TX file on removable media");
        return std::fs::read(&path).with_context(|| format!("reading {}", path.display()));
    }

    tracing::info!("no --file-path given and no removable media found, using bundled fallback");
    Ok(FALLBACK.to_vec())
}

/// Resolve the RX sink directory: an explicit path, then the first mounted
/// removable-media root, then the current directory.
pub fn resolve_rx_sink(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        std::fs::create_dir_all(&path).with_context(|| format!("creating {}", path.display()))?;
        return Ok(path);
    }

    for root in USB_MOUNT_ROOTS {
        if let Ok(entries) = std::fs::read_dir(root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    return Ok(path);
                }
            }
        }
    }

    std::env::current_dir().context("resolving current directory")
}

/// Write received bytes to `<sink_dir>/filebeam-transfer-<unix-ts>.bin`.
pub fn persist(sink_dir: &Path, data: &[u8]) -> Result<PathBuf> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = sink_dir.join(format!("filebeam-transfer-{timestamp}.bin"));
    std::fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn scan_usb_mounts() -> Option<PathBuf> {
    for root in USB_MOUNT_ROOTS {
        let Ok(mount_entries) = std::fs::read_dir(root) else {
            continue;
        };
        for mount in mount_entries.flatten() {
            let Ok(file_entries) = std::fs::read_dir(mount.path()) else {
                continue;
            };
            for file in file_entries.flatten() {
                if file.path().is_file() {
                    return Some(file.path());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_tx_input_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"hello").unwrap();
        let data = find_tx_input(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(data, b"hello");
    }

    #[test]
    fn find_tx_input_falls_back_to_bundled_content() {
        let data = find_tx_input(None).unwrap();
        assert_eq!(data, FALLBACK);
    }

    #[test]
    fn resolve_rx_sink_creates_explicit_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = dir.path().join("nested/out");
        let resolved = resolve_rx_sink(Some(sink.to_str().unwrap())).unwrap();
        assert_eq!(resolved, sink);
        assert!(resolved.is_dir());
    }

    #[test]
    fn persist_writes_timestamped_file_under_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = persist(dir.path(), b"contents").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"contents");
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("filebeam-transfer-"));
    }
}
