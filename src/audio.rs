//! Sound cues
//!
//! Games emit [`GameEvent`]s; the session maps them to [`SoundCue`]s and hands
//! them to a [`CueSink`]. Every cue is a short list of oscillator beeps, so no
//! audio files are needed. On the web the sink drives the Web Audio API.

use crate::sim::GameEvent;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One beep: fixed frequency with an exponential fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    /// Length in seconds
    pub secs: f64,
    pub wave: Waveform,
    /// Peak gain at the reference volume
    pub gain: f32,
    /// Offset from the cue start in seconds
    pub delay: f64,
}

const fn tone(freq: f32, secs: f64, wave: Waveform, gain: f32, delay: f64) -> Tone {
    Tone {
        freq,
        secs,
        wave,
        gain,
        delay,
    }
}

/// Master volume at which tones play at their listed gain
pub const REFERENCE_VOLUME: f32 = 0.5;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Start,
    Jump,
    Land,
    Score,
    GameOver,
    Countdown,
    Go,
    Flip,
    Match,
    Mismatch,
    Complete,
    Shoot,
    EnemyHit,
    PlayerHit,
    LevelUp,
    PaddleHit,
    WallHit,
}

impl SoundCue {
    /// Beeps making up this cue, ordered by delay
    pub fn tones(self) -> &'static [Tone] {
        use Waveform::*;
        match self {
            SoundCue::Start => const { &[
                tone(440.0, 0.2, Sine, 0.1, 0.0),
                tone(550.0, 0.2, Sine, 0.1, 0.1),
                tone(660.0, 0.3, Sine, 0.1, 0.2),
            ] },
            SoundCue::Jump => const { &[tone(400.0, 0.1, Sine, 0.05, 0.0), tone(600.0, 0.1, Sine, 0.03, 0.05)] },
            SoundCue::Land => const { &[tone(150.0, 0.05, Triangle, 0.03, 0.0)] },
            SoundCue::Score => const { &[tone(800.0, 0.05, Square, 0.03, 0.0), tone(1000.0, 0.05, Square, 0.03, 0.05)] },
            SoundCue::GameOver => const { &[
                tone(300.0, 0.2, Sawtooth, 0.1, 0.0),
                tone(200.0, 0.3, Sawtooth, 0.1, 0.1),
            ] },
            SoundCue::Countdown => const { &[tone(440.0, 0.15, Sine, 0.08, 0.0)] },
            SoundCue::Go => const { &[tone(880.0, 0.3, Sine, 0.08, 0.0)] },
            SoundCue::Flip => const { &[tone(600.0, 0.1, Sine, 0.05, 0.0)] },
            SoundCue::Match => const { &[tone(800.0, 0.2, Sine, 0.08, 0.0), tone(1000.0, 0.2, Sine, 0.08, 0.1)] },
            SoundCue::Mismatch => const { &[tone(300.0, 0.3, Sawtooth, 0.06, 0.0)] },
            SoundCue::Complete => const { &[
                tone(500.0, 0.3, Sine, 0.1, 0.0),
                tone(600.0, 0.3, Sine, 0.1, 0.15),
                tone(800.0, 0.3, Sine, 0.1, 0.3),
                tone(1000.0, 0.5, Sine, 0.1, 0.45),
            ] },
            SoundCue::Shoot => const { &[tone(800.0, 0.05, Square, 0.03, 0.0)] },
            SoundCue::EnemyHit => const { &[
                tone(300.0, 0.1, Sawtooth, 0.05, 0.0),
                tone(200.0, 0.1, Triangle, 0.03, 0.05),
            ] },
            SoundCue::PlayerHit => const { &[tone(150.0, 0.3, Sawtooth, 0.1, 0.0)] },
            SoundCue::LevelUp => const { &[
                tone(500.0, 0.2, Sine, 0.08, 0.0),
                tone(600.0, 0.2, Sine, 0.08, 0.1),
                tone(700.0, 0.3, Sine, 0.08, 0.2),
            ] },
            SoundCue::PaddleHit => const { &[tone(440.0, 0.1, Square, 0.1, 0.0)] },
            SoundCue::WallHit => const { &[tone(220.0, 0.15, Sawtooth, 0.1, 0.0)] },
        }
    }
}

/// Cue for a game event; silent events map to `None`
pub fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    let cue = match event {
        GameEvent::Start => SoundCue::Start,
        GameEvent::Jump | GameEvent::DoubleJump => SoundCue::Jump,
        GameEvent::Land => SoundCue::Land,
        GameEvent::Score(_) | GameEvent::Point { .. } => SoundCue::Score,
        GameEvent::Collision => SoundCue::PlayerHit,
        GameEvent::GameOver { .. } => SoundCue::GameOver,
        GameEvent::Countdown(_) => SoundCue::Countdown,
        GameEvent::Go => SoundCue::Go,
        GameEvent::Flip => SoundCue::Flip,
        GameEvent::Match => SoundCue::Match,
        GameEvent::Mismatch => SoundCue::Mismatch,
        GameEvent::Complete => SoundCue::Complete,
        GameEvent::Shoot => SoundCue::Shoot,
        GameEvent::EnemyHit => SoundCue::EnemyHit,
        GameEvent::PlayerHit { .. } => SoundCue::PlayerHit,
        GameEvent::LevelUp(_) => SoundCue::LevelUp,
        GameEvent::PaddleHit => SoundCue::PaddleHit,
        GameEvent::WallHit => SoundCue::WallHit,
        GameEvent::SpeedUp | GameEvent::Paused | GameEvent::Resumed | GameEvent::Reset => return None,
    };
    Some(cue)
}

/// Fire-and-forget cue output. Playback must never block or fail the loop.
pub trait CueSink {
    fn play(&mut self, cue: SoundCue);

    /// Master volume (0.0 - 1.0); 0 mutes
    fn set_volume(&mut self, volume: f32);
}

/// Discards every cue (headless runs, tests, audio unavailable)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&mut self, _cue: SoundCue) {}

    fn set_volume(&mut self, _volume: f32) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{CueSink, REFERENCE_VOLUME, SoundCue, Tone, Waveform};

    /// Web Audio output
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudioSink {
        pub fn new(volume: f32) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        fn create_osc(&self, ctx: &AudioContext, tone: &Tone) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match tone.wave {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Triangle => OscillatorType::Triangle,
            });
            osc.frequency().set_value(tone.freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    impl CueSink for WebAudioSink {
        fn play(&mut self, cue: SoundCue) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let scale = self.volume / REFERENCE_VOLUME;
            let now = ctx.current_time();
            for tone in cue.tones() {
                let Some((osc, gain)) = self.create_osc(ctx, tone) else {
                    continue;
                };
                let t = now + tone.delay;
                gain.gain().set_value_at_time(tone.gain * scale, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.001, t + tone.secs)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + tone.secs).ok();
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}
