// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Splits raw input bytes into a fixed number of pages.

/// Split `data` into exactly `pages` pages of `ceil(len / pages)` bytes
/// each; the last non-empty page may be shorter. If `data` is empty, every
/// page is empty (scenario 1 of the specification's testable properties).
pub fn paginate(data: &[u8], pages: u8) -> Vec<Vec<u8>> {
    let pages = pages as usize;
    if data.is_empty() {
        return vec![Vec::new(); pages];
    }

    let page_size = data.len().div_ceil(pages);
    let mut result: Vec<Vec<u8>> = data.chunks(page_size).map(|c| c.to_vec()).collect();
    result.resize(pages, Vec::new());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_all_empty_pages() {
        let pages = paginate(&[], 10);
        assert_eq!(pages.len(), 10);
        assert!(pages.iter().all(|p| p.is_empty()));
    }

    #[test]
    fn one_byte_input_yields_one_nonempty_page() {
        let pages = paginate(b"A", 10);
        assert_eq!(pages.len(), 10);
        assert_eq!(pages[0], b"A");
        assert!(pages[1..].iter().all(|p| p.is_empty()));
    }

    #[test]
    fn evenly_divisible_input_splits_evenly() {
        let data = vec![7u8; 100];
        let pages = paginate(&data, 10);
        assert_eq!(pages.len(), 10);
        assert!(pages.iter().all(|p| p.len() == 10));
    }

    #[test]
    fn uneven_input_leaves_last_page_short() {
        let data = vec![1u8; 95];
        let pages = paginate(&data, 10);
        assert_eq!(pages.len(), 10);
        // page_size = ceil(95/10) = 10, so first nine pages are full and
        // the tenth carries the 5 remaining bytes.
        for p in &pages[..9] {
            assert_eq!(p.len(), 10);
        }
        assert_eq!(pages[9].len(), 5);
    }

    #[test]
    fn reassembly_is_lossless() {
        let data: Vec<u8> = (0u8..=255).cycle().take(7906).collect();
        let pages = paginate(&data, 10);
        let joined: Vec<u8> = pages.into_iter().flatten().collect();
        assert_eq!(joined, data);
    }
}
