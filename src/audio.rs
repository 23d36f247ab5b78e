//! Audio cue routing
//!
//! The simulation emits named cues; this module turns them into concrete
//! sound effects, applies volume and mute, and hands them to a sink. In the
//! browser the sink synthesises everything with the Web Audio API - no
//! external files needed.

use crate::settings::Settings;
use crate::sim::{CueEvent, Material, SoundCue};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Segment placed (wood, stone, concrete)
    Hammer,
    /// Segment placed (steel)
    MetalClang,
    /// Load reached the far side
    Success,
    /// Bridge gave way
    Failure,
    /// Load hit the water
    Splash,
    /// Crowd cheer after a success
    Applause,
}

impl SoundEffect {
    /// Effect that plays a cue
    pub fn for_cue(cue: SoundCue) -> Self {
        match cue {
            SoundCue::Construction(Material::Steel) => SoundEffect::MetalClang,
            SoundCue::Construction(_) => SoundEffect::Hammer,
            SoundCue::Success => SoundEffect::Success,
            SoundCue::Failure => SoundEffect::Failure,
            SoundCue::Splash => SoundEffect::Splash,
            SoundCue::Applause => SoundEffect::Applause,
        }
    }
}

/// Something that can make noise. Fire and forget: no result, no ordering
/// guarantee beyond the requested delay.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32, delay_secs: f64);
}

/// Sink that only logs, for native builds and headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32, delay_secs: f64) {
        log::debug!("sfx {:?} at {:.2} (+{:.2}s)", effect, volume, delay_secs);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            volume: 0.5,
            muted: false,
        }
    }

    pub fn with_settings(sink: S, settings: &Settings) -> Self {
        let mut manager = Self::new(sink);
        manager.apply_settings(settings);
        manager
    }

    /// Pick up volume and mute from settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.volume.min(100) as f32 / 100.0;
        self.muted = !settings.sound_enabled;
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Play one cue
    pub fn play_cue(&mut self, event: CueEvent) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let effect = SoundEffect::for_cue(event.cue);
        self.sink.play(effect, vol, event.delay_ms as f64 / 1000.0);
    }

    pub fn play_all(&mut self, events: impl IntoIterator<Item = CueEvent>) {
        for event in events {
            self.play_cue(event);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};

    /// Procedural synth on a Web Audio context
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
    }

    impl Default for WebAudioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioSink {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single decaying tone starting at `t`
        #[allow(clippy::too_many_arguments)]
        fn tone(
            &self,
            ctx: &AudioContext,
            t: f64,
            freq: f32,
            end_freq: Option<f32>,
            osc_type: OscillatorType,
            level: f32,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if let Some(end) = end_freq {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + length)
                    .ok();
            }
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Hammer - wooden knock, two quick hits
        fn play_hammer(&self, ctx: &AudioContext, t: f64, vol: f32) {
            for hit in 0..2 {
                let at = t + hit as f64 * 0.12;
                self.tone(ctx, at, 180.0, Some(70.0), OscillatorType::Triangle, vol * 0.5, 0.08);
                self.tone(ctx, at, 900.0, None, OscillatorType::Square, vol * 0.08, 0.03);
            }
        }

        /// Metal clang - bright inharmonic ring
        fn play_metal_clang(&self, ctx: &AudioContext, t: f64, vol: f32) {
            for (freq, level) in [(520.0, 0.3), (1370.0, 0.18), (2150.0, 0.1)] {
                self.tone(ctx, t, freq, None, OscillatorType::Sine, vol * level, 0.6);
            }
            self.tone(ctx, t, 90.0, Some(50.0), OscillatorType::Sine, vol * 0.3, 0.15);
        }

        /// Success - rising major arpeggio
        fn play_success(&self, ctx: &AudioContext, t: f64, vol: f32) {
            for (i, freq) in [523.25, 659.25, 783.99, 1046.5].iter().enumerate() {
                let at = t + i as f64 * 0.1;
                self.tone(ctx, at, *freq, None, OscillatorType::Triangle, vol * 0.3, 0.3);
            }
        }

        /// Failure - falling sawtooth groan
        fn play_failure(&self, ctx: &AudioContext, t: f64, vol: f32) {
            self.tone(ctx, t, 300.0, Some(60.0), OscillatorType::Sawtooth, vol * 0.35, 0.8);
            self.tone(ctx, t, 80.0, Some(40.0), OscillatorType::Sine, vol * 0.4, 0.5);
        }

        /// Splash - low thump with a hiss of high partials
        fn play_splash(&self, ctx: &AudioContext, t: f64, vol: f32) {
            self.tone(ctx, t, 120.0, Some(40.0), OscillatorType::Sine, vol * 0.5, 0.3);
            for (i, freq) in [3200.0, 4100.0, 2700.0, 5000.0].iter().enumerate() {
                let at = t + i as f64 * 0.03;
                self.tone(ctx, at, *freq, Some(*freq * 0.5), OscillatorType::Square, vol * 0.05, 0.2);
            }
        }

        /// Applause - a scatter of short claps
        fn play_applause(&self, ctx: &AudioContext, t: f64, vol: f32) {
            // Fixed offsets so the clap pattern is the same every time
            let offsets = [0.0, 0.05, 0.09, 0.16, 0.2, 0.27, 0.31, 0.4, 0.46, 0.52, 0.6, 0.68];
            for (i, dt) in offsets.iter().enumerate() {
                let freq = 1800.0 + (i % 4) as f32 * 350.0;
                self.tone(ctx, t + dt, freq, Some(600.0), OscillatorType::Square, vol * 0.07, 0.05);
            }
        }
    }

    impl AudioSink for WebAudioSink {
        fn play(&mut self, effect: SoundEffect, vol: f32, delay_secs: f64) {
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let t = ctx.current_time() + delay_secs;
            match effect {
                SoundEffect::Hammer => self.play_hammer(ctx, t, vol),
                SoundEffect::MetalClang => self.play_metal_clang(ctx, t, vol),
                SoundEffect::Success => self.play_success(ctx, t, vol),
                SoundEffect::Failure => self.play_failure(ctx, t, vol),
                SoundEffect::Splash => self.play_splash(ctx, t, vol),
                SoundEffect::Applause => self.play_applause(ctx, t, vol),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        played: Vec<(SoundEffect, f32, f64)>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, effect: SoundEffect, volume: f32, delay_secs: f64) {
            self.played.push((effect, volume, delay_secs));
        }
    }

    #[test]
    fn test_construction_cue_depends_on_material() {
        assert_eq!(
            SoundEffect::for_cue(SoundCue::Construction(Material::Steel)),
            SoundEffect::MetalClang
        );
        for material in [Material::Wood, Material::Stone, Material::Concrete] {
            assert_eq!(
                SoundEffect::for_cue(SoundCue::Construction(material)),
                SoundEffect::Hammer
            );
        }
    }

    #[test]
    fn test_delay_and_volume_pass_through() {
        let mut settings = Settings::default();
        settings.volume = 80;
        let mut audio = AudioManager::with_settings(RecordingSink::default(), &settings);
        audio.play_all([
            CueEvent::now(SoundCue::Success),
            CueEvent::after(SoundCue::Applause, 500),
        ]);
        assert_eq!(
            audio.sink().played,
            vec![
                (SoundEffect::Success, 0.8, 0.0),
                (SoundEffect::Applause, 0.8, 0.5)
            ]
        );
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut settings = Settings::default();
        settings.sound_enabled = false;
        let mut audio = AudioManager::with_settings(RecordingSink::default(), &settings);
        audio.play_cue(CueEvent::now(SoundCue::Failure));
        assert!(audio.sink().played.is_empty());

        audio.set_muted(false);
        audio.set_volume(2.0);
        audio.play_cue(CueEvent::now(SoundCue::Splash));
        assert_eq!(audio.sink().played, vec![(SoundEffect::Splash, 1.0, 0.0)]);
    }
}
