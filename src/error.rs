// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Typed errors for media loading and batch import.
//!
//! The UI uses these to tell a failure the user must see (a download or read
//! that failed) apart from input that simply had nothing usable in it.

use thiserror::Error;

/// Remote download failures.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no URL given")]
    EmptyUrl,

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("reading response failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while importing a numeric box batch.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("reading archive failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("archive has no entry named '{0}'")]
    MissingEntry(String),

    #[error("malformed array: {0}")]
    Npy(String),

    #[error("expected an N x 4 array, got shape {0:?}")]
    Shape(Vec<usize>),
}

impl ImportError {
    /// True for I/O failures the user should be told about. Everything else
    /// means the source had nothing to import.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ImportError::Io(_) | ImportError::Fetch(_))
    }
}

/// Failures while opening or decoding media.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("reading media failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("could not decode media: {0}")]
    Decode(String),

    #[error("unsupported media: {0}")]
    Unsupported(String),
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        MediaError::Decode(err.to_string())
    }
}

#[cfg(feature = "video-opencv")]
impl From<opencv::Error> for MediaError {
    fn from(err: opencv::Error) -> Self {
        MediaError::Decode(err.to_string())
    }
}
