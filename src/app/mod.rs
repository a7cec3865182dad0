//! `CanvasApp` — the top-level egui application state.
//!
//! This module declares the `CanvasApp` struct, its constructor, and the
//! `eframe::App` impl. Drawing is split across the sibling sub-modules:
//!
//! - `toolbar` — compose box, send button, sound/stats toggles
//! - `content` — the orb field canvas and the decrypt overlay

pub mod toolbar;
pub mod content;

use std::time::Instant;

use eframe::egui;

use crate::audio::AudioEngine;
use crate::scene::{self, CameraParams, DecryptHold};
use crate::store::{MessageStore, StoreEvent};

/// Messages seeded into the canvas at startup. They appear in place
/// (no fly-in) and exercise every encoder branch.
pub const SEED_MESSAGES: &[&str] = &[
    "Welcome to CipherCanvas",
    "Secrets hide in plain sight",
    "I am angry!",
    "Calm waves...",
];

// ─── Application state ───────────────────────────────────────────────────────

pub struct CanvasApp {
    pub input: String,
    pub store: MessageStore,
    pub cam: CameraParams,
    pub audio: AudioEngine,
    pub sound_on: bool,
    pub show_stats: bool,
    /// Currently inspected orb.
    pub selected: Option<u64>,
    /// Active press-and-hold, if the decrypt button is down.
    pub hold: Option<DecryptHold>,
    /// When the selected message was revealed (typewriter start).
    pub revealed_at: Option<f64>,
    pub app_start: Instant,
}

impl CanvasApp {
    pub fn new() -> Self {
        let mut store = MessageStore::new();
        store.seed(SEED_MESSAGES, 0.0);

        Self {
            input: String::new(),
            store,
            cam: CameraParams::default(),
            audio: AudioEngine::create(),
            sound_on: true,
            show_stats: false,
            selected: None,
            hold: None,
            revealed_at: None,
            app_start: Instant::now(),
        }
    }

    /// Session clock, seconds since startup. All store and scene math
    /// runs off this one value per frame.
    pub fn now(&self) -> f64 {
        self.app_start.elapsed().as_secs_f64()
    }

    /// Lazily open the audio stream. Only called from user-input
    /// handlers; failures degrade to silence.
    pub fn ensure_audio(&mut self) {
        if self.sound_on && !self.audio.is_ready() {
            if let Err(e) = self.audio.init() {
                log::warn!("audio unavailable: {e}");
            }
        }
    }

    pub fn select(&mut self, id: u64) {
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.hold = None;
            self.revealed_at = None;
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.hold = None;
        self.revealed_at = None;
    }

    fn draw_stats_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Canvas");
        ui.separator();
        ui.label(format!("Messages: {}", self.store.len()));

        let mut anger = 0;
        let mut calm = 0;
        let mut secrecy = 0;
        let mut other = 0;
        for m in self.store.messages() {
            match m.signature.category {
                Some("ANGER") => anger += 1,
                Some("CALM") => calm += 1,
                Some("SECRECY") => secrecy += 1,
                _ => other += 1,
            }
        }
        ui.colored_label(egui::Color32::from_rgb(0xef, 0x44, 0x44), format!("Anger: {anger}"));
        ui.colored_label(egui::Color32::from_rgb(0x3b, 0x82, 0xf6), format!("Calm: {calm}"));
        ui.colored_label(egui::Color32::from_rgb(0xa8, 0x55, 0xf7), format!("Secrecy: {secrecy}"));
        ui.label(format!("Unclassified: {other}"));

        ui.separator();
        ui.heading("Camera");
        ui.label(format!("Distance: {:.1}", self.cam.distance));
        ui.label(format!("Azimuth: {:.2}", self.cam.azimuth));

        ui.separator();
        ui.heading("Audio");
        ui.label(if self.audio.is_ready() {
            "Stream: running"
        } else {
            "Stream: not started"
        });
    }
}

impl Default for CanvasApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.now();

        // Store timers: expired highlights, resonance pulse.
        for event in self.store.tick(now) {
            let StoreEvent::Resonance { id } = event;
            if self.sound_on {
                if let Some(sig) = self.store.get(id).map(|m| m.signature) {
                    self.audio.play_chime(&sig);
                }
            }
        }

        // Retire completed entry animations.
        let done: Vec<u64> = self
            .store
            .messages()
            .iter()
            .filter(|m| m.spawn_pending && now - m.spawned_at >= scene::SPAWN_DURATION)
            .map(|m| m.id)
            .collect();
        for id in done {
            self.store.mark_spawned(id);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.draw_toolbar(ui);
            ui.add_space(4.0);
        });

        if self.show_stats {
            egui::SidePanel::right("stats")
                .default_width(180.0)
                .show(ctx, |ui| {
                    self.draw_stats_panel(ui);
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.draw_content(ui, now);
            });

        // The orb field animates continuously.
        ctx.request_repaint();
    }
}
