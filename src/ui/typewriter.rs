use std::time::Instant;

/// Reveals feedback text a few characters at a time.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    started: Instant,
    chars_per_sec: f32,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, started: Instant, chars_per_sec: f32) -> Self {
        Self {
            text: text.into(),
            started,
            chars_per_sec: chars_per_sec.max(1.0),
        }
    }

    /// Prefix visible at `now`, cut on a char boundary.
    pub fn visible(&self, now: Instant) -> &str {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        let shown = (elapsed * self.chars_per_sec) as usize;
        match self.text.char_indices().nth(shown) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.visible(now).len() == self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn reveals_whole_characters_over_time() {
        let start = Instant::now();
        let tw = Typewriter::new("悟空举棒", start, 2.0);

        assert_eq!(tw.visible(start), "");
        assert_eq!(tw.visible(start + Duration::from_millis(500)), "悟");
        assert_eq!(tw.visible(start + Duration::from_millis(1500)), "悟空举");
        assert!(!tw.is_done(start + Duration::from_millis(1500)));
        assert_eq!(tw.visible(start + Duration::from_secs(10)), "悟空举棒");
        assert!(tw.is_done(start + Duration::from_secs(2)));
    }

    #[test]
    fn zero_speed_still_progresses() {
        let start = Instant::now();
        let tw = Typewriter::new("经", start, 0.0);
        assert!(tw.is_done(start + Duration::from_secs(1)));
    }
}
