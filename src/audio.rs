//! Tone synthesis for orb interactions.
//!
//! Explicit lifecycle instead of an ambient singleton:
//! `create → init (first user gesture) → play_tone / play_chime → dispose`.
//! Until `init()` has succeeded every `play_*` call is a silent no-op,
//! which models the platform rule that audio output may only start from a
//! user-initiated event. Failures never propagate to the UI: a missing
//! device or a dead stream logs a warning and leaves the engine inert.
//!
//! Synthesis is a small additive mixer: each tone is a sine (plus an
//! optional second harmonic for "metallic" signatures) with a fast attack
//! and linear decay, mixed in the cpal output callback. The voice bank is
//! shared with the callback behind a `parking_lot::Mutex`.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use thiserror::Error;

use crate::encode::{tone_frequency, Signature};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Simultaneous voice cap; oldest voices are dropped beyond this.
const MAX_VOICES: usize = 12;

/// Master gain, kept low — these are UI cues, not music.
const MASTER_GAIN: f32 = 0.18;

const TONE_DURATION: f32 = 0.9;
const CHIME_DURATION: f32 = 0.45;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error(transparent)]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}

// ─── Voice bank ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Voice {
    freq: f32,
    phase: f32,
    age: f32,
    duration: f32,
    amp: f32,
    /// Second-harmonic mix, 0.0 for pure sine.
    harmonic: f32,
}

struct VoiceBank {
    voices: Vec<Voice>,
    sample_rate: f32,
}

impl VoiceBank {
    fn new(sample_rate: f32) -> Self {
        Self {
            voices: Vec::new(),
            sample_rate,
        }
    }

    fn push(&mut self, voice: Voice) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        self.voices.push(voice);
    }

    /// Mix all live voices into an interleaved output buffer.
    fn mix_into(&mut self, data: &mut [f32], channels: usize) {
        let dt = 1.0 / self.sample_rate;
        for frame in data.chunks_mut(channels.max(1)) {
            let mut sample = 0.0f32;
            for v in &mut self.voices {
                let env = (v.age * 60.0).min(1.0) * (1.0 - v.age / v.duration).max(0.0);
                sample += v.amp
                    * env
                    * (v.phase.sin() + v.harmonic * (v.phase * 2.0).sin());
                v.phase += std::f32::consts::TAU * v.freq * dt;
                if v.phase > std::f32::consts::TAU {
                    v.phase -= std::f32::consts::TAU;
                }
                v.age += dt;
            }
            self.voices.retain(|v| v.age < v.duration);

            let sample = (sample * MASTER_GAIN).clamp(-1.0, 1.0);
            for out in frame {
                *out = sample;
            }
        }
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct AudioEngine {
    bank: Arc<Mutex<VoiceBank>>,
    stream: Option<cpal::Stream>,
}

impl AudioEngine {
    /// Construct without touching any device. Playback stays a no-op
    /// until `init()`.
    pub fn create() -> Self {
        Self {
            bank: Arc::new(Mutex::new(VoiceBank::new(44_100.0))),
            stream: None,
        }
    }

    /// Open the default output stream. Must be called from a user-input
    /// handler; idempotent once it has succeeded.
    pub fn init(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let config = device.default_output_config()?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(config.sample_format()));
        }

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        self.bank.lock().sample_rate = sample_rate;

        let bank = Arc::clone(&self.bank);
        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                bank.lock().mix_into(data, channels);
            },
            |err| log::warn!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        log::info!("audio initialized: {sample_rate} Hz, {channels} ch");
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.stream.is_some()
    }

    /// The selection tone for an orb. Fire-and-forget; silent before
    /// `init()`.
    pub fn play_tone(&self, sig: &Signature) {
        if self.stream.is_none() {
            return;
        }
        self.bank.lock().push(Voice {
            freq: tone_frequency(sig),
            phase: 0.0,
            age: 0.0,
            duration: TONE_DURATION,
            amp: 0.9,
            harmonic: sig.metalness * 0.5,
        });
    }

    /// Short resonance chime, one octave up from the orb's tone.
    pub fn play_chime(&self, sig: &Signature) {
        if self.stream.is_none() {
            return;
        }
        self.bank.lock().push(Voice {
            freq: tone_frequency(sig) * 2.0,
            phase: 0.0,
            age: 0.0,
            duration: CHIME_DURATION,
            amp: 0.5,
            harmonic: 0.2,
        });
    }

    /// Stop playback and release the device.
    pub fn dispose(&mut self) {
        self.stream = None;
        self.bank.lock().voices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    #[test]
    fn play_is_noop_before_init() {
        let engine = AudioEngine::create();
        assert!(!engine.is_ready());
        let sig = encode("hello");
        // Must neither panic nor queue anything.
        engine.play_tone(&sig);
        engine.play_chime(&sig);
        assert!(engine.bank.lock().voices.is_empty());
    }

    #[test]
    fn voice_bank_mixes_and_expires() {
        let mut bank = VoiceBank::new(1_000.0);
        bank.push(Voice {
            freq: 220.0,
            phase: 0.0,
            age: 0.0,
            duration: 0.05,
            amp: 1.0,
            harmonic: 0.0,
        });

        let mut buf = vec![0.0f32; 40]; // 20 ms stereo
        bank.mix_into(&mut buf, 2);
        assert!(buf.iter().any(|s| *s != 0.0));
        assert!(buf.iter().all(|s| s.abs() <= 1.0));
        // Both channels carry the same mono mix.
        assert_eq!(buf[0], buf[1]);

        // Run past the voice's duration; it must expire.
        let mut rest = vec![0.0f32; 200];
        bank.mix_into(&mut rest, 2);
        assert!(bank.voices.is_empty());
    }

    #[test]
    fn voice_cap_drops_oldest() {
        let mut bank = VoiceBank::new(44_100.0);
        for i in 0..(MAX_VOICES + 3) {
            bank.push(Voice {
                freq: 100.0 + i as f32,
                phase: 0.0,
                age: 0.0,
                duration: 1.0,
                amp: 0.1,
                harmonic: 0.0,
            });
        }
        assert_eq!(bank.voices.len(), MAX_VOICES);
        assert_eq!(bank.voices[0].freq, 103.0);
    }
}
