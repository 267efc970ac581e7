// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback clock for the loaded media.
//!
//! Tracks current time, duration and play/pause state. The canvas reads it to
//! decide which frame to show; the annotation engine never mutates it.

/// Native properties of the loaded media.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    /// Duration in seconds; zero for still frames.
    pub duration: f64,
}

impl VideoMeta {
    pub fn has_frame(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Playback {
    meta: VideoMeta,
    current_time: f64,
    playing: bool,
}

impl Playback {
    pub fn new(meta: VideoMeta) -> Self {
        Self {
            meta,
            current_time: 0.0,
            playing: false,
        }
    }

    pub fn meta(&self) -> VideoMeta {
        self.meta
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.meta.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Fraction of the media already played, 0.0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.meta.duration > 0.0 {
            (self.current_time / self.meta.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn play(&mut self) {
        if self.meta.duration <= 0.0 {
            return;
        }
        if self.current_time >= self.meta.duration {
            self.current_time = 0.0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to a fraction (0.0 to 1.0) of the duration.
    pub fn seek_fraction(&mut self, fraction: f64) {
        self.seek(fraction.clamp(0.0, 1.0) * self.meta.duration);
    }

    pub fn seek(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.meta.duration.max(0.0));
    }

    /// Advance the clock by `dt` seconds while playing. Returns true if time moved.
    pub fn advance(&mut self, dt: f64) -> bool {
        if !self.playing || dt <= 0.0 {
            return false;
        }
        self.current_time += dt;
        if self.current_time >= self.meta.duration {
            self.current_time = self.meta.duration;
            self.playing = false;
        }
        true
    }
}

/// Format seconds as `mm:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(duration: f64) -> Playback {
        Playback::new(VideoMeta {
            width: 1920,
            height: 1080,
            duration,
        })
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.9), "01:05");
        assert_eq!(format_time(3599.0), "59:59");
        assert_eq!(format_time(f64::NAN), "00:00");
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut p = clip(2.0);
        p.play();
        assert!(p.advance(1.5));
        assert!(p.is_playing());
        p.advance(1.0);
        assert_eq!(p.current_time(), 2.0);
        assert!(!p.is_playing());
        assert_eq!(p.progress(), 1.0);
    }

    #[test]
    fn test_play_at_end_restarts() {
        let mut p = clip(2.0);
        p.seek(2.0);
        p.play();
        assert_eq!(p.current_time(), 0.0);
        assert!(p.is_playing());
    }

    #[test]
    fn test_still_frame_never_plays() {
        let mut p = clip(0.0);
        p.toggle();
        assert!(!p.is_playing());
        assert!(!p.advance(1.0));
        assert_eq!(p.progress(), 0.0);
    }

    #[test]
    fn test_seek_fraction_is_clamped() {
        let mut p = clip(10.0);
        p.seek_fraction(0.25);
        assert_eq!(p.current_time(), 2.5);
        p.seek_fraction(4.0);
        assert_eq!(p.current_time(), 10.0);
    }
}
