use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio::player::{AudioOutput, NarrationPlayer};
use crate::engine::services::{Narrator, SpeechSynthesizer};
use crate::shutdown::join_within;

/// How often a playing clip is checked for natural completion.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on waiting for an in-flight synthesis when the player is dropped.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

enum AudioCommand {
    Play { text: String, ticket: u64 },
    Stop,
}

/// Handle to the narration thread. `play` and `stop` never block: speech is
/// synthesized and played on the worker.
///
/// Each request takes a ticket from `latest`; a synthesis that finishes after
/// a newer play or stop was issued is thrown away instead of played.
pub struct AudioPlayer {
    tx: Option<Sender<AudioCommand>>,
    latest: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// `make_output` runs on the worker thread, so outputs that are tied to
    /// their thread (like a rodio stream) can be used.
    pub fn spawn<S, O, F>(synth: S, make_output: F) -> Self
    where
        S: SpeechSynthesizer + 'static,
        O: AudioOutput,
        F: FnOnce() -> O + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&latest);

        let worker = thread::Builder::new()
            .name("narration".into())
            .spawn(move || {
                let mut player = NarrationPlayer::new(synth, make_output());
                run_worker(&mut player, &rx, &seen);
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!("narration thread not started, playing silently: {err}");
                None
            }
        };

        Self {
            tx: Some(tx),
            latest,
            worker,
        }
    }

    pub fn play(&self, text: &str) {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(AudioCommand::Play {
            text: text.to_string(),
            ticket,
        });
    }

    pub fn stop(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.send(AudioCommand::Stop);
    }

    fn send(&self, cmd: AudioCommand) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(cmd);
        }
    }
}

impl Narrator for AudioPlayer {
    fn play(&mut self, text: &str) {
        AudioPlayer::play(self, text);
    }

    fn stop(&mut self) {
        AudioPlayer::stop(self);
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            join_within(worker, SHUTDOWN_GRACE);
        }
    }
}

fn run_worker<S, O>(player: &mut NarrationPlayer<S, O>, rx: &Receiver<AudioCommand>, latest: &AtomicU64)
where
    S: SpeechSynthesizer,
    O: AudioOutput,
{
    loop {
        let cmd = if player.is_active() {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => {
                    player.poll();
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            }
        };

        match cmd {
            AudioCommand::Stop => player.stop(),
            AudioCommand::Play { text, ticket } => {
                player.play_if(&text, || ticket == latest.load(Ordering::SeqCst));
            }
        }
    }

    player.stop();
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Instant;

    use super::*;
    use crate::engine::error::ServiceError;
    use crate::test_support::{FakeOutput, FakeSynth};

    /// Synthesis that hangs until the test releases it, like a slow TTS call.
    struct GatedSynth {
        gate: Mutex<Receiver<()>>,
    }

    impl SpeechSynthesizer for GatedSynth {
        fn synthesize(&self, _: &str) -> Result<Vec<u8>, ServiceError> {
            if let Ok(gate) = self.gate.lock() {
                let _ = gate.recv();
            }
            Ok(vec![0x10, 0x00])
        }
    }

    #[test]
    fn queued_play_runs_before_shutdown() {
        let output = FakeOutput::default();
        let synth = FakeSynth::default();
        let out = output.clone();

        let player = AudioPlayer::spawn(synth.clone(), move || out);
        player.play("悟空");
        drop(player);

        let stats = output.stats();
        assert_eq!(synth.requests(), vec!["悟空".to_string()]);
        assert_eq!(stats.starts, 1);
        assert_eq!(stats.stops, 1);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn bursts_never_overlap_and_end_silent() {
        let output = FakeOutput::default();
        let out = output.clone();

        let mut player = AudioPlayer::spawn(FakeSynth::default(), move || out);
        for text in ["一", "二", "三", "四"] {
            Narrator::play(&mut player, text);
        }
        Narrator::stop(&mut player);
        drop(player);

        let stats = output.stats();
        assert!(stats.max_active <= 1);
        assert_eq!(stats.starts, stats.stops);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn dropping_during_slow_synthesis_does_not_hang() {
        let (release, gate) = mpsc::channel();
        let synth = GatedSynth {
            gate: Mutex::new(gate),
        };
        let output = FakeOutput::default();
        let out = output.clone();

        let player = AudioPlayer::spawn(synth, move || out);
        player.play("慢");

        let started = Instant::now();
        drop(player);
        assert!(started.elapsed() < SHUTDOWN_GRACE + Duration::from_secs(2));

        drop(release);
    }
}
