// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the annotation state, the playback clock and
//! the open media, runs loads on background threads, and routes the actions
//! produced by the UI panels into the annotation reducer.

use crate::error::{ImportError, MediaError};
use crate::io::media::{
    self, Frame, FrameSource, LoadedMedia, MediaSource, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
use crate::io::{npz, remote, serialization};
use crate::models::annotation::{ProvenanceKind, Rect};
use crate::models::playback::Playback;
use crate::models::settings::Settings;
use crate::models::state::{Action, AnnotationState};
use crate::ui::properties::{PropertiesAction, SourceInputs};
use crate::ui::timeline::TimelineAction;
use crate::ui::{canvas, properties, timeline, toolbar};
use crate::util::geometry::SurfaceSync;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

/// A pending background job and the message shown while it runs.
struct Loader<T> {
    receiver: Receiver<T>,
    message: String,
}

impl<T: Send + 'static> Loader<T> {
    fn spawn(message: impl Into<String>, job: impl FnOnce() -> T + Send + 'static) -> Self {
        let (sender, receiver) = channel();
        std::thread::spawn(move || {
            // Receiver is gone when a newer job replaced this one
            let _ = sender.send(job());
        });
        Self {
            receiver,
            message: message.into(),
        }
    }
}

/// Take the finished result out of `slot`, if any.
fn poll<T>(slot: &mut Option<Loader<T>>) -> Option<T> {
    let loader = slot.as_ref()?;
    match loader.receiver.try_recv() {
        Ok(result) => {
            *slot = None;
            Some(result)
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            log::error!("Background job ended without a result: {}", loader.message);
            *slot = None;
            None
        }
    }
}

/// The open media: decoder, clock and the texture showing the current frame.
struct MediaSession {
    source: MediaSource,
    decoder: Box<dyn FrameSource>,
    playback: Playback,
    texture: Option<egui::TextureHandle>,
}

fn color_image(frame: &Frame) -> egui::ColorImage {
    let size = [frame.width as usize, frame.height as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels)
}

/// Show `frame` in `texture`, allocating the texture on first use.
fn upload_frame(ctx: &egui::Context, texture: &mut Option<egui::TextureHandle>, frame: &Frame) {
    let image = color_image(frame);
    if let Some(handle) = texture.as_mut() {
        handle.set(image, egui::TextureOptions::LINEAR);
    } else {
        *texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
    }
}

/// Main application state.
pub struct AnnotatorApp {
    settings: Settings,
    state: AnnotationState,
    media: Option<MediaSession>,
    surface: SurfaceSync,

    /// Receiver for background media loading
    media_loader: Option<Loader<Result<LoadedMedia, MediaError>>>,
    /// Receiver for background batch import
    import_loader: Option<Loader<Result<Vec<Rect>, ImportError>>>,

    /// Non-fatal message shown in red in the properties panel
    error_message: Option<String>,
    video_url: String,
    npz_url: String,
}

impl Default for AnnotatorApp {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AnnotatorApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AnnotationState::new(&settings),
            settings,
            media: None,
            surface: SurfaceSync::default(),
            media_loader: None,
            import_loader: None,
            error_message: None,
            video_url: String::new(),
            npz_url: String::new(),
        }
    }

    fn is_playing(&self) -> bool {
        self.media.as_ref().is_some_and(|m| m.playback.is_playing())
    }

    fn has_frame(&self) -> bool {
        self.state.video().is_some_and(|v| v.has_frame())
    }

    /// Load a video (or still frame) on a background thread.
    fn load_media(&mut self, source: MediaSource) {
        log::info!("Loading media: {}", source);
        let message = format!("Loading {}...", source);
        self.media_loader = Some(Loader::spawn(message, move || media::load(source)));
    }

    fn load_video_url(&mut self, url: &str) {
        match remote::normalize_url(url) {
            Some(url) => self.load_media(MediaSource::Url(url.to_string())),
            None => self.error_message = Some("Enter a video URL first".to_string()),
        }
    }

    fn import_npz_file(&mut self, path: PathBuf) {
        let entry = self.settings.import.entry_name.clone();
        let message = format!("Importing {}...", path.display());
        self.import_loader = Some(Loader::spawn(message, move || npz::import_file(&path, &entry)));
    }

    fn import_npz_url(&mut self, url: &str) {
        let Some(url) = remote::normalize_url(url).map(str::to_string) else {
            self.error_message = Some("Enter an archive URL first".to_string());
            return;
        };
        let entry = self.settings.import.entry_name.clone();
        let message = format!("Importing {}...", url);
        self.import_loader = Some(Loader::spawn(message, move || {
            let bytes = remote::fetch_bytes(&url)?;
            npz::decode_npz(&bytes, &entry)
        }));
    }

    fn close_media(&mut self) {
        if let Some(session) = self.media.take() {
            log::info!("Closed {}", session.source);
        }
        self.state.dispatch(Action::VideoCleared);
    }

    fn poll_loaders(&mut self, ctx: &egui::Context) {
        if let Some(result) = poll(&mut self.media_loader) {
            match result {
                Ok(loaded) => self.install_media(ctx, loaded),
                Err(e) => {
                    log::error!("Failed to load media: {}", e);
                    self.error_message = Some(format!("Failed to load media: {}", e));
                }
            }
        }

        if let Some(result) = poll(&mut self.import_loader) {
            match result {
                Ok(rects) => {
                    self.error_message = None;
                    self.state.dispatch(Action::ImportBatch(rects));
                }
                Err(e) if e.is_user_visible() => {
                    log::error!("Failed to import boxes: {}", e);
                    self.error_message = Some(format!("Failed to import boxes: {}", e));
                }
                Err(e) => log::warn!("Nothing imported: {}", e),
            }
        }
    }

    /// Replace the current media, releasing the previous texture and decoder.
    fn install_media(&mut self, ctx: &egui::Context, loaded: LoadedMedia) {
        let LoadedMedia {
            source,
            decoder,
            first_frame,
        } = loaded;
        let meta = decoder.meta();
        let mut texture = None;
        if let Some(frame) = first_frame {
            upload_frame(ctx, &mut texture, &frame);
        }

        let needs_frame = texture.is_none();
        self.media = Some(MediaSession {
            source,
            decoder,
            playback: Playback::new(meta),
            texture,
        });
        self.error_message = None;
        self.state.dispatch(Action::VideoLoaded(meta));
        if needs_frame {
            self.refresh_frame(ctx);
        }
        log::info!("Media loaded successfully");
    }

    /// Decode the frame for the current playback time into the texture.
    fn refresh_frame(&mut self, ctx: &egui::Context) {
        let Some(session) = self.media.as_mut() else {
            return;
        };
        match session.decoder.frame_at(session.playback.current_time()) {
            Ok(Some(frame)) => upload_frame(ctx, &mut session.texture, &frame),
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to decode frame: {}", e);
                session.playback.pause();
                self.error_message = Some(format!("Failed to decode frame: {}", e));
            }
        }
    }

    fn advance(&mut self, ctx: &egui::Context, dt: f32) {
        let moved = self
            .media
            .as_mut()
            .is_some_and(|m| m.playback.advance(dt as f64));
        if moved {
            self.refresh_frame(ctx);
        }
        self.state.dispatch(Action::Tick(dt));
    }

    fn handle_timeline(&mut self, ctx: &egui::Context, action: TimelineAction) {
        let Some(session) = self.media.as_mut() else {
            return;
        };
        match action {
            TimelineAction::TogglePlay => session.playback.toggle(),
            TimelineAction::Seek(fraction) => {
                session.playback.seek_fraction(fraction);
                self.refresh_frame(ctx);
            }
            TimelineAction::None => {}
        }
    }

    fn handle_properties(&mut self, action: PropertiesAction) {
        match action {
            PropertiesAction::Annotation(action) => self.state.dispatch(action),
            PropertiesAction::OpenVideoFile => self.pick_video(),
            PropertiesAction::OpenVideoUrl(url) => self.load_video_url(&url),
            PropertiesAction::ImportNpzFile => self.pick_npz(),
            PropertiesAction::ImportNpzUrl(url) => self.import_npz_url(&url),
        }
    }

    fn pick_video(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Media", &[VIDEO_EXTENSIONS, IMAGE_EXTENSIONS].concat())
            .pick_file()
        {
            self.load_media(MediaSource::File(path));
        }
    }

    fn pick_npz(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("NumPy archive", &["npz"])
            .pick_file()
        {
            self.import_npz_file(path);
        }
    }

    fn load_settings_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Settings", &["yaml", "yml", "json"])
            .pick_file()
        else {
            return;
        };
        match serialization::import_settings(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                self.state.dispatch(Action::ApplySettings(Box::new(settings.clone())));
                self.settings = settings;
            }
            Err(e) => {
                log::error!("Failed to load settings: {}", e);
                self.error_message = Some(format!("Failed to load settings: {}", e));
            }
        }
    }

    fn save_settings_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("YAML", &["yaml", "yml"])
            .add_filter("JSON", &["json"])
            .set_file_name(serialization::DEFAULT_CONFIG_FILE)
            .save_file()
        else {
            return;
        };
        self.settings.styles = *self.state.styles();
        match serialization::export_settings(&self.settings, &path) {
            Ok(()) => log::info!("Saved settings to {}", path.display()),
            Err(e) => {
                log::error!("Failed to save settings: {}", e);
                self.error_message = Some(format!("Failed to save settings: {}", e));
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Leave keys alone while a text field has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        if self.has_frame() && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.handle_timeline(ctx, TimelineAction::TogglePlay);
        }

        let delete_last = ctx.input(|i| {
            i.key_pressed(egui::Key::Delete)
                || (i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::Z))
        });
        if delete_last && !self.is_playing() {
            self.state.dispatch(Action::DeleteLast);
        }
    }

    fn show_menu(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Video...").clicked() {
                    self.pick_video();
                    ui.close_menu();
                }
                if ui.add_enabled(self.media.is_some(), egui::Button::new("Close Video")).clicked() {
                    self.close_media();
                    ui.close_menu();
                }
                if ui.button("Import Boxes (.npz)...").clicked() {
                    self.pick_npz();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Load Settings...").clicked() {
                    self.load_settings_file();
                    ui.close_menu();
                }
                if ui.button("Save Settings...").clicked() {
                    self.save_settings_file();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let editable = !self.state.store().is_empty() && !self.is_playing();
                if ui
                    .add_enabled(editable, egui::Button::new("Delete Last (Ctrl+Z)"))
                    .clicked()
                {
                    self.state.dispatch(Action::DeleteLast);
                    ui.close_menu();
                }
                ui.separator();
                for kind in ProvenanceKind::ALL {
                    let count = self.state.store().count_of(kind);
                    let label = format!("Clear {} Boxes", kind.label());
                    if ui.add_enabled(editable && count > 0, egui::Button::new(label)).clicked() {
                        self.state.dispatch(Action::ClearKind(kind));
                        ui.close_menu();
                    }
                }
                if ui.add_enabled(editable, egui::Button::new("Clear All")).clicked() {
                    self.state.dispatch(Action::ClearAll);
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                let has_frame = self.has_frame();
                if ui.add_enabled(has_frame, egui::Button::new("Zoom In")).clicked() {
                    self.state.dispatch(Action::ZoomStep(1));
                    ui.close_menu();
                }
                if ui.add_enabled(has_frame, egui::Button::new("Zoom Out")).clicked() {
                    self.state.dispatch(Action::ZoomStep(-1));
                    ui.close_menu();
                }
                if ui.add_enabled(has_frame, egui::Button::new("Reset Zoom")).clicked() {
                    self.state.dispatch(Action::ResetZoom);
                    ui.close_menu();
                }
            });
        });
    }

    fn loading_message(&self) -> Option<&str> {
        self.media_loader
            .as_ref()
            .map(|l| l.message.as_str())
            .or(self.import_loader.as_ref().map(|l| l.message.as_str()))
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let revision = self.state.revision();

        self.poll_loaders(ctx);
        self.handle_shortcuts(ctx);
        self.advance(ctx, ctx.input(|i| i.stable_dt));

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.show_menu(ctx, ui);
        });

        // Toolbar
        let playing = self.is_playing();
        let toolbar_actions = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.state, playing))
            .inner;
        for action in toolbar_actions {
            self.state.dispatch(action);
        }

        // Timeline (bottom)
        let timeline_action = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let action = timeline::show(ui, self.media.as_ref().map(|m| &m.playback));
                if let Some(message) = self.loading_message() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(egui::RichText::new(message).weak());
                    });
                }
                ui.add_space(2.0);
                action
            })
            .inner;
        self.handle_timeline(ctx, timeline_action);

        // Properties panel (right side)
        let playing = self.is_playing();
        let properties_actions = egui::SidePanel::right("properties")
            .default_width(300.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    &self.state,
                    SourceInputs {
                        video_url: &mut self.video_url,
                        npz_url: &mut self.npz_url,
                    },
                    playing,
                    self.error_message.as_deref(),
                )
            })
            .inner;
        for action in properties_actions {
            self.handle_properties(action);
        }

        // Main canvas (center)
        let canvas_actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(loader) = self.media_loader.as_ref() {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(&loader.message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    Vec::new()
                } else {
                    let texture = self.media.as_ref().and_then(|m| m.texture.as_ref());
                    canvas::show(ui, &self.state, texture, &mut self.surface)
                }
            })
            .inner;
        for action in canvas_actions {
            self.state.dispatch(action);
        }

        // Keep animating while playing, highlighting or loading
        if self.state.revision() != revision
            || self.is_playing()
            || self.state.highlight().is_some()
            || self.loading_message().is_some()
        {
            ctx.request_repaint();
        }
    }
}
