use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(10);

/// Waits at most `grace` for a background thread to finish.
///
/// Blocking service calls cannot be interrupted, so a thread still busy at
/// the deadline is detached and left to the process exit. Returns whether
/// the thread was joined.
pub fn join_within(handle: JoinHandle<()>, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            let name = handle.thread().name().unwrap_or("unnamed").to_string();
            tracing::warn!(thread = %name, "still busy at shutdown, not waiting for it");
            return false;
        }
        thread::sleep(POLL);
    }

    if handle.join().is_err() {
        tracing::warn!("background thread panicked");
    }
    true
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn finished_thread_is_joined() {
        let handle = thread::spawn(|| {});
        assert!(join_within(handle, Duration::from_secs(5)));
    }

    #[test]
    fn busy_thread_is_left_behind_after_grace() {
        let (release, gate) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let _ = gate.recv();
        });

        let started = Instant::now();
        assert!(!join_within(handle, Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_secs(5));

        drop(release);
    }
}
