use log::{debug, warn};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// A short synthesized cue at a flat gain, optionally sweeping its
/// frequency exponentially
#[derive(Debug, Clone)]
pub struct Tone {
    waveform: Waveform,
    start_freq: f32,
    end_freq: f32,
    sweep: Duration,
    duration: Duration,
    gain: f32,
    sample_rate: u32,
    index: usize,
    phase: f32,
}

impl Tone {
    pub fn new(waveform: Waveform, freq: f32, duration: Duration, gain: f32) -> Self {
        Self {
            waveform,
            start_freq: freq,
            end_freq: freq,
            sweep: duration,
            duration,
            gain,
            sample_rate: SAMPLE_RATE,
            index: 0,
            phase: 0.0,
        }
    }

    /// Sweeps from the starting frequency to `end_freq` over `sweep`, then
    /// holds it until the tone ends
    pub fn with_sweep(mut self, end_freq: f32, sweep: Duration) -> Self {
        self.end_freq = end_freq;
        self.sweep = sweep.min(self.duration);
        self
    }

    /// Gun shot: a brief high sine blip
    pub fn fire() -> Self {
        Self::new(Waveform::Sine, 900.0, Duration::from_millis(40), 0.06)
    }

    /// Balloon pop: a falling square-wave chirp
    pub fn pop() -> Self {
        Self::new(Waveform::Square, 700.0, Duration::from_millis(90), 0.14)
            .with_sweep(120.0, Duration::from_millis(80))
    }

    pub fn total_samples(&self) -> usize {
        (self.duration.as_secs_f32() * self.sample_rate as f32).round() as usize
    }

    fn frequency_at(&self, t: f32) -> f32 {
        let sweep = self.sweep.as_secs_f32();
        if sweep <= 0.0 || t >= sweep || self.start_freq <= 0.0 {
            return self.end_freq;
        }
        self.start_freq * (self.end_freq / self.start_freq).powf(t / sweep)
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.total_samples() {
            return None;
        }
        let t = self.index as f32 / self.sample_rate as f32;
        let wave = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        let sample = wave * self.gain;

        self.phase = (self.phase + self.frequency_at(t) / self.sample_rate as f32).fract();
        self.index += 1;
        Some(sample)
    }
}

impl Source for Tone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples().saturating_sub(self.index))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration)
    }
}

/// Audio manager for playing sound effects
pub struct AudioManager {
    /// `None` when no output device could be opened
    output: Option<(OutputStream, OutputStreamHandle)>,
    volume: f32,
    muted: bool,
}

impl AudioManager {
    /// Opens the default output device, falling back to silence
    pub fn new(volume: f32, muted: bool) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                warn!("audio output unavailable, continuing without sound: {err}");
                None
            }
        };
        Self {
            output,
            volume: volume.clamp(0.0, 1.0),
            muted,
        }
    }

    /// A manager that never opens a device
    pub fn silent() -> Self {
        Self {
            output: None,
            volume: 0.0,
            muted: true,
        }
    }

    pub fn is_available(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flips the mute flag and returns the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn play_fire(&self) {
        self.play(Tone::fire());
    }

    pub fn play_pop(&self) {
        self.play(Tone::pop());
    }

    fn play(&self, tone: Tone) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let Some((_, handle)) = &self.output else {
            return;
        };
        // Playback problems never reach the game loop
        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                sink.append(tone);
                sink.detach();
            }
            Err(err) => debug!("dropping sound cue: {err}"),
        }
    }
}
