//! Explicit handle on the audio device playing an episode.
//!
//! The tracker never looks a device up; the presentation layer attaches
//! one to a [`PlaybackSession`] when it exists. Every control on a session
//! without a device is a no-op.

use tracing::debug;

use super::tracker::ProgressKey;

/// Position/duration signals and transport controls of an audio device
pub trait PlaybackDevice: Send {
    /// Current position in seconds
    fn position_seconds(&self) -> f64;

    /// Duration in seconds, once known
    fn duration_seconds(&self) -> Option<f64>;

    fn is_playing(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position_seconds: f64);
}

/// An episode being listened to, with an optional attached device
pub struct PlaybackSession {
    key: ProgressKey,
    device: Option<Box<dyn PlaybackDevice>>,
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("key", &self.key)
            .field("device", &self.device.is_some())
            .finish()
    }
}

impl PlaybackSession {
    /// Session with no device attached yet
    pub fn new(key: ProgressKey) -> Self {
        Self { key, device: None }
    }

    /// Session with a device
    pub fn with_device(key: ProgressKey, device: Box<dyn PlaybackDevice>) -> Self {
        Self {
            key,
            device: Some(device),
        }
    }

    pub fn key(&self) -> &ProgressKey {
        &self.key
    }

    /// Attach a device, replacing any previous one
    pub fn attach(&mut self, device: Box<dyn PlaybackDevice>) {
        self.device = Some(device);
    }

    /// Detach and return the device
    pub fn detach(&mut self) -> Option<Box<dyn PlaybackDevice>> {
        self.device.take()
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn position(&self) -> Option<f64> {
        self.device.as_ref().map(|d| d.position_seconds())
    }

    pub fn duration(&self) -> Option<f64> {
        self.device.as_ref().and_then(|d| d.duration_seconds())
    }

    pub fn is_playing(&self) -> bool {
        self.device.as_ref().map(|d| d.is_playing()).unwrap_or(false)
    }

    /// Toggle play/pause; returns whether a device handled it
    pub fn toggle_play(&mut self) -> bool {
        self.control("toggle", |device| {
            if device.is_playing() {
                device.pause();
            } else {
                device.play();
            }
        })
    }

    pub fn play(&mut self) -> bool {
        self.control("play", |device| device.play())
    }

    pub fn pause(&mut self) -> bool {
        self.control("pause", |device| device.pause())
    }

    pub fn seek(&mut self, position_seconds: f64) -> bool {
        self.control("seek", |device| device.seek(position_seconds))
    }

    fn control<F>(&mut self, command: &str, f: F) -> bool
    where
        F: FnOnce(&mut (dyn PlaybackDevice + 'static)),
    {
        match self.device.as_deref_mut() {
            Some(device) => {
                f(device);
                true
            }
            None => {
                debug!(command, episode = %self.key.episode_id, "No playback device, ignoring");
                false
            }
        }
    }
}

/// Format seconds as `MM:SS`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeDevice {
        position: f64,
        playing: bool,
    }

    impl PlaybackDevice for FakeDevice {
        fn position_seconds(&self) -> f64 {
            self.position
        }

        fn duration_seconds(&self) -> Option<f64> {
            Some(300.0)
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn play(&mut self) {
            self.playing = true;
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn seek(&mut self, position_seconds: f64) {
            self.position = position_seconds;
        }
    }

    fn key() -> ProgressKey {
        ProgressKey::new("1", "1", "1-1-1")
    }

    #[test]
    fn test_controls_without_device_are_noops() {
        let mut session = PlaybackSession::new(key());
        assert!(!session.has_device());
        assert!(!session.toggle_play());
        assert!(!session.seek(10.0));
        assert!(!session.is_playing());
        assert_eq!(session.position(), None);
    }

    #[test]
    fn test_controls_with_device() {
        let mut session = PlaybackSession::with_device(key(), Box::new(FakeDevice::default()));

        assert!(session.toggle_play());
        assert!(session.is_playing());
        assert!(session.toggle_play());
        assert!(!session.is_playing());

        assert!(session.seek(42.0));
        assert_eq!(session.position(), Some(42.0));
        assert_eq!(session.duration(), Some(300.0));

        assert!(session.detach().is_some());
        assert!(!session.play());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.9), "00:59");
        assert_eq!(format_time(61.0), "01:01");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(-5.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
    }
}
