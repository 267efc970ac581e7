// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos).
//!
//! This module opens a media source (local path or URL), reports its native
//! size and duration, and decodes RGBA frames for display in egui. Still
//! images are decoded with the `image` crate and behave like a zero-length
//! video; real video playback needs the `video-opencv` feature.

use crate::error::MediaError;
use crate::models::playback::VideoMeta;
use std::fmt;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];

/// Where the media comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    Url(String),
}

impl MediaSource {
    fn extension(&self) -> Option<String> {
        let name = match self {
            MediaSource::File(path) => path.to_string_lossy().into_owned(),
            // Ignore query strings and fragments
            MediaSource::Url(url) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
        };
        Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// True when the source should be decoded as a single still frame.
    pub fn is_still_image(&self) -> bool {
        self.extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::File(path) => write!(f, "{}", path.display()),
            MediaSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// One decoded RGBA frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// A decoder that can produce the frame shown at a given playback time.
pub trait FrameSource: Send {
    fn meta(&self) -> VideoMeta;

    /// Frame for `time` seconds, or `None` when the displayed frame is unchanged.
    fn frame_at(&mut self, time: f64) -> Result<Option<Frame>, MediaError>;
}

/// A single still image treated as a zero-length video.
pub struct StillImage {
    frame: Frame,
    delivered: bool,
}

impl StillImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MediaError> {
        Ok(Self::from_image(image::load_from_memory(bytes)?))
    }

    pub fn open(path: &Path) -> Result<Self, MediaError> {
        Ok(Self::from_image(image::open(path)?))
    }

    fn from_image(img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            frame: Frame {
                width,
                height,
                pixels: rgba.into_raw(),
            },
            delivered: false,
        }
    }
}

impl FrameSource for StillImage {
    fn meta(&self) -> VideoMeta {
        VideoMeta {
            width: self.frame.width,
            height: self.frame.height,
            duration: 0.0,
        }
    }

    fn frame_at(&mut self, _time: f64) -> Result<Option<Frame>, MediaError> {
        if self.delivered {
            return Ok(None);
        }
        self.delivered = true;
        Ok(Some(self.frame.clone()))
    }
}

/// An opened source together with its first frame.
pub struct LoadedMedia {
    pub source: MediaSource,
    pub decoder: Box<dyn FrameSource>,
    pub first_frame: Option<Frame>,
}

impl fmt::Debug for LoadedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedMedia")
            .field("source", &self.source)
            .field("meta", &self.decoder.meta())
            .finish()
    }
}

/// Open `source` and decode the frame at time zero.
pub fn load(source: MediaSource) -> Result<LoadedMedia, MediaError> {
    let mut decoder = open(&source)?;
    let meta = decoder.meta();
    if !meta.has_frame() {
        return Err(MediaError::Decode(format!("{} has no video frames", source)));
    }
    let first_frame = decoder.frame_at(0.0)?;
    log::info!(
        "Opened {} ({}x{}, {:.1}s)",
        source,
        meta.width,
        meta.height,
        meta.duration
    );
    Ok(LoadedMedia {
        source,
        decoder,
        first_frame,
    })
}

fn open(source: &MediaSource) -> Result<Box<dyn FrameSource>, MediaError> {
    if source.is_still_image() {
        let still = match source {
            MediaSource::File(path) => StillImage::open(path)?,
            MediaSource::Url(url) => StillImage::from_bytes(&crate::io::remote::fetch_bytes(url)?)?,
        };
        return Ok(Box::new(still));
    }
    open_video(source)
}

#[cfg(not(feature = "video-opencv"))]
fn open_video(source: &MediaSource) -> Result<Box<dyn FrameSource>, MediaError> {
    if let MediaSource::File(path) = source {
        if !path.exists() {
            return Err(MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
    }
    Err(MediaError::Unsupported(format!(
        "{} is not a still image; video playback requires the video-opencv feature",
        source
    )))
}

#[cfg(feature = "video-opencv")]
fn open_video(source: &MediaSource) -> Result<Box<dyn FrameSource>, MediaError> {
    Ok(Box::new(video::OpencvVideo::open(source)?))
}

#[cfg(feature = "video-opencv")]
mod video {
    use super::{Frame, FrameSource, MediaError, MediaSource};
    use crate::models::playback::VideoMeta;
    use opencv::{
        core::Mat,
        imgproc,
        prelude::*,
        videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst},
    };

    /// Video decoded through OpenCV `VideoCapture` (files and network streams).
    pub struct OpencvVideo {
        cap: VideoCapture,
        fps: f64,
        meta: VideoMeta,
        /// Index of the frame last handed out.
        last_index: Option<i64>,
    }

    impl OpencvVideo {
        pub fn open(source: &MediaSource) -> Result<Self, MediaError> {
            let location = source.to_string();
            let cap = VideoCapture::from_file(&location, videoio::CAP_ANY)?;
            if !cap.is_opened()? {
                return Err(MediaError::Decode(format!("failed to open {}", location)));
            }

            let fps = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FPS)?;
            let frames = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_COUNT)?;
            let width = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_WIDTH)? as u32;
            let height = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
            let fps = if fps > 0.0 { fps } else { 30.0 };
            let duration = if frames > 0.0 { frames / fps } else { 0.0 };

            Ok(Self {
                cap,
                fps,
                meta: VideoMeta {
                    width,
                    height,
                    duration,
                },
                last_index: None,
            })
        }
    }

    impl FrameSource for OpencvVideo {
        fn meta(&self) -> VideoMeta {
            self.meta
        }

        fn frame_at(&mut self, time: f64) -> Result<Option<Frame>, MediaError> {
            let index = (time.max(0.0) * self.fps).floor() as i64;
            if self.last_index == Some(index) {
                return Ok(None);
            }
            if self.last_index.map(|last| last + 1) != Some(index) {
                VideoCaptureTrait::set(&mut self.cap, videoio::CAP_PROP_POS_FRAMES, index as f64)?;
            }

            let mut mat = Mat::default();
            if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
                return Ok(None);
            }
            self.last_index = Some(index);

            let mut rgba = Mat::default();
            imgproc::cvt_color(&mat, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
            Ok(Some(Frame {
                width: rgba.cols() as u32,
                height: rgba.rows() as u32,
                pixels: rgba.data_bytes()?.to_vec(),
            }))
        }
    }
}
