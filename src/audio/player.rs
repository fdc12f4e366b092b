use crate::audio::pcm::{decode_pcm16, PcmClip};
use crate::audio::AudioError;
use crate::engine::services::SpeechSynthesizer;

/// A device that can hold one playing clip at a time.
pub trait AudioOutput {
    /// Opens the device if it is not open yet (or failed to open before).
    fn ensure_ready(&mut self) -> Result<(), AudioError>;
    fn start(&mut self, clip: PcmClip) -> Result<(), AudioError>;
    fn stop(&mut self);
    /// Becomes false once the started clip finishes on its own.
    fn is_playing(&self) -> bool;
}

/// Single-slot narration: starting a clip always tears down the previous
/// one first. Errors end up in the log, never with the caller.
pub struct NarrationPlayer<S, O> {
    synth: S,
    output: O,
    active: bool,
}

impl<S: SpeechSynthesizer, O: AudioOutput> NarrationPlayer<S, O> {
    pub fn new(synth: S, output: O) -> Self {
        Self {
            synth,
            output,
            active: false,
        }
    }

    fn prepare(&self, text: &str) -> Result<PcmClip, AudioError> {
        let bytes = self.synth.synthesize(text)?;
        decode_pcm16(&bytes)
    }

    fn start(&mut self, clip: PcmClip) {
        self.stop();
        let secs = clip.duration_secs();

        let started = self
            .output
            .ensure_ready()
            .and_then(|()| self.output.start(clip));
        match started {
            Ok(()) => {
                tracing::debug!(secs, "narration started");
                self.active = true;
            }
            Err(err) => tracing::warn!("narration not played: {err}"),
        }
    }

    /// Replaces the current clip with `text`. `still_current` is checked
    /// before and after synthesis; once it turns false the request is dropped.
    pub fn play_if(&mut self, text: &str, still_current: impl Fn() -> bool) {
        self.stop();
        if !still_current() {
            return;
        }

        match self.prepare(text) {
            Ok(clip) if still_current() => self.start(clip),
            Ok(_) => tracing::debug!("dropping superseded narration"),
            Err(err) => tracing::warn!("narration skipped: {err}"),
        }
    }

    /// Safe to call when nothing is playing.
    pub fn stop(&mut self) {
        if self.active {
            self.output.stop();
            self.active = false;
        }
    }

    /// Forgets a clip that has finished by itself.
    pub fn poll(&mut self) {
        if self.active && !self.output.is_playing() {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::test_support::{FakeOutput, FakeSynth};

    fn current() -> bool {
        true
    }

    #[test]
    fn each_play_replaces_the_previous_source() {
        let output = FakeOutput::default();
        let mut player = NarrationPlayer::new(FakeSynth::default(), output.clone());

        player.play_if("第一句", current);
        player.play_if("第二句", current);
        player.play_if("第三句", current);

        let stats = output.stats();
        assert_eq!(stats.starts, 3);
        assert_eq!(stats.stops, 2);
        assert_eq!(stats.starts, stats.stops + 1);
        assert_eq!(stats.max_active, 1);
        assert!(player.is_active());
    }

    #[test]
    fn stop_then_play_keeps_a_single_source() {
        let output = FakeOutput::default();
        let mut player = NarrationPlayer::new(FakeSynth::default(), output.clone());

        player.play_if("甲", current);
        player.stop();
        player.play_if("乙", current);

        let stats = output.stats();
        assert_eq!(stats.starts, stats.stops + 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.max_active, 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let output = FakeOutput::default();
        let mut player = NarrationPlayer::new(FakeSynth::default(), output.clone());

        player.stop();
        player.play_if("甲", current);
        player.stop();
        player.stop();

        let stats = output.stats();
        assert_eq!(stats.starts, 1);
        assert_eq!(stats.stops, 1);
        assert!(!player.is_active());
    }

    #[test]
    fn synthesis_failure_is_swallowed() {
        let output = FakeOutput::default();
        let synth = FakeSynth::failing();
        let mut player = NarrationPlayer::new(synth.clone(), output.clone());

        player.play_if("无声", current);

        assert_eq!(synth.requests(), vec!["无声".to_string()]);
        assert_eq!(output.stats().starts, 0);
        assert!(!player.is_active());
    }

    #[test]
    fn device_failure_is_swallowed_and_retried_next_time() {
        let output = FakeOutput::default();
        output.fail_device(true);
        let mut player = NarrationPlayer::new(FakeSynth::default(), output.clone());

        player.play_if("甲", current);
        assert!(!player.is_active());
        assert_eq!(output.stats().starts, 0);

        output.fail_device(false);
        player.play_if("乙", current);
        assert!(player.is_active());
        assert_eq!(output.stats().ready_calls, 2);
    }

    #[test]
    fn natural_completion_clears_the_current_source() {
        let output = FakeOutput::default();
        let mut player = NarrationPlayer::new(FakeSynth::default(), output.clone());

        player.play_if("甲", current);
        output.finish();
        player.poll();
        assert!(!player.is_active());

        player.stop();
        assert_eq!(output.stats().stops, 0);
    }

    #[test]
    fn superseded_request_is_dropped_after_synthesis() {
        let output = FakeOutput::default();
        let synth = FakeSynth::default();
        let mut player = NarrationPlayer::new(synth.clone(), output.clone());

        // current for the first check only, as if a newer request arrived
        // while speech was being synthesized
        let checks = Cell::new(0);
        player.play_if("旧话", || {
            checks.set(checks.get() + 1);
            checks.get() == 1
        });

        assert_eq!(synth.requests(), vec!["旧话".to_string()]);
        assert_eq!(output.stats().starts, 0);
        assert!(!player.is_active());
    }

    #[test]
    fn stale_request_skips_synthesis_but_still_stops() {
        let output = FakeOutput::default();
        let synth = FakeSynth::default();
        let mut player = NarrationPlayer::new(synth.clone(), output.clone());

        player.play_if("甲", current);
        player.play_if("乙", || false);

        assert_eq!(synth.requests(), vec!["甲".to_string()]);
        let stats = output.stats();
        assert_eq!(stats.starts, 1);
        assert_eq!(stats.stops, 1);
        assert_eq!(stats.active, 0);
    }
}
