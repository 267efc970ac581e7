// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Blocking downloads for URL sources.
//!
//! Always called from a loader thread, never from the UI thread.

use crate::error::FetchError;
use std::io::Read;

/// Upper bound on a single download.
const MAX_DOWNLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// Normalize user-typed URL text; `None` when nothing usable was typed.
pub fn normalize_url(input: &str) -> Option<&str> {
    let url = input.trim();
    (!url.is_empty()).then_some(url)
}

/// Download `url` into memory.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let url = normalize_url(url).ok_or(FetchError::EmptyUrl)?;
    log::info!("Downloading {}", url);

    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => FetchError::Status(code),
        other => FetchError::Transport(other.to_string()),
    })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES)
        .read_to_end(&mut bytes)?;
    log::info!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}
