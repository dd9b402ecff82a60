//! Background music toggle with persisted play state and position.
//!
//! Browsers may refuse to start audio until the visitor interacts with the
//! page. A refused start arms a [`GestureSignal`]; the first gesture from any
//! of its sources retries playback and, on success, unsubscribes them all.

use crate::{storage::PreferenceStore, Result};

/// Storage key for the play/pause preference.
pub const PLAYING_KEY: &str = "musicPlaying";
/// Storage key for the playback position in seconds.
pub const POSITION_KEY: &str = "musicCurrentTime";

/// Returned by an [`AudioSink`] when the host refuses to start playback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("playback blocked: {reason}")]
pub struct PlaybackBlocked {
    pub reason: String,
}

impl PlaybackBlocked {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Host audio element.
pub trait AudioSink {
    fn play(&mut self) -> std::result::Result<(), PlaybackBlocked>;

    fn pause(&mut self);

    /// Playback position in seconds.
    fn position(&self) -> f64;

    fn seek(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f32);
}

/// Raw page events that count as a user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureSource {
    Click,
    TouchStart,
    TouchEnd,
    PointerDown,
    KeyDown,
    Scroll,
    Wheel,
    Resize,
}

impl GestureSource {
    pub const ALL: [GestureSource; 8] = [
        GestureSource::Click,
        GestureSource::TouchStart,
        GestureSource::TouchEnd,
        GestureSource::PointerDown,
        GestureSource::KeyDown,
        GestureSource::Scroll,
        GestureSource::Wheel,
        GestureSource::Resize,
    ];
}

/// Single "first user gesture" signal fed by every [`GestureSource`].
#[derive(Debug, Default, Clone)]
pub struct GestureSignal {
    subscribed: Vec<GestureSource>,
}

impl GestureSignal {
    /// Subscribes every source. Arming twice does not duplicate them.
    pub fn arm(&mut self) {
        self.subscribed = GestureSource::ALL.to_vec();
    }

    /// Unsubscribes every source at once.
    pub fn disarm(&mut self) {
        self.subscribed.clear();
    }

    pub fn is_armed(&self) -> bool {
        !self.subscribed.is_empty()
    }

    pub fn subscribed(&self) -> &[GestureSource] {
        &self.subscribed
    }

    /// Whether `source` should be treated as the awaited gesture.
    pub fn accepts(&self, source: GestureSource) -> bool {
        self.subscribed.contains(&source)
    }
}

/// Persisted music preference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicPreferences {
    pub playing: bool,
    pub current_time: f64,
}

impl Default for MusicPreferences {
    fn default() -> Self {
        Self {
            playing: true,
            current_time: 0.0,
        }
    }
}

impl MusicPreferences {
    /// Reads the preference. Anything but the literal `"false"` means
    /// playing. The position is read from its leading number, so `12.5s`
    /// restores 12.5; a missing, unparseable or non-positive one means zero.
    pub fn load<P: PreferenceStore + ?Sized>(store: &P) -> Self {
        let playing = store.get(PLAYING_KEY).as_deref() != Some("false");
        let current_time = store
            .get(POSITION_KEY)
            .and_then(|raw| leading_number(&raw))
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .unwrap_or(0.0);

        Self {
            playing,
            current_time,
        }
    }
}

/// Longest numeric prefix of `raw` after leading whitespace.
fn leading_number(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    raw.char_indices()
        .map(|(start, ch)| start + ch.len_utf8())
        .rev()
        .find_map(|end| raw[..end].parse::<f64>().ok())
}

/// Controller for the background music toggle.
#[derive(Debug)]
pub struct MusicController<A, P> {
    sink: A,
    store: P,
    playing: bool,
    prompt_visible: bool,
    gesture: GestureSignal,
}

impl<A: AudioSink, P: PreferenceStore> MusicController<A, P> {
    /// Restores the saved preference into `sink` without starting playback.
    pub fn new(mut sink: A, store: P, volume: f32) -> Self {
        let preferences = MusicPreferences::load(&store);
        tracing::debug!(
            playing = preferences.playing,
            position = preferences.current_time,
            "restored music preference"
        );

        sink.set_volume(volume);
        if preferences.current_time > 0.0 {
            sink.seek(preferences.current_time);
        }

        Self {
            sink,
            store,
            playing: preferences.playing,
            prompt_visible: false,
            gesture: GestureSignal::default(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the "tap to enable music" prompt should be shown.
    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    pub fn gesture(&self) -> &GestureSignal {
        &self.gesture
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Applies the current preference to the sink. Called once shortly after
    /// page load.
    pub fn sync(&mut self) {
        if !self.playing {
            self.sink.pause();
            self.prompt_visible = false;
            return;
        }

        match self.sink.play() {
            Ok(()) => {
                tracing::info!("background music playing");
                self.prompt_visible = false;
            }
            Err(blocked) => {
                tracing::warn!(%blocked, "autoplay blocked, waiting for a user gesture");
                self.prompt_visible = true;
                self.gesture.arm();
            }
        }
    }

    /// Feeds one raw page event. Returns whether it started playback.
    pub fn on_gesture(&mut self, source: GestureSource) -> bool {
        if !self.playing || !self.gesture.accepts(source) {
            return false;
        }

        match self.sink.play() {
            Ok(()) => {
                tracing::info!(?source, "background music enabled by user gesture");
                self.prompt_visible = false;
                self.gesture.disarm();
                true
            }
            Err(_) => false,
        }
    }

    /// Handles the music button and persists the new preference.
    pub fn toggle(&mut self) -> Result<()> {
        if self.playing {
            self.playing = false;
            self.sink.pause();
            self.prompt_visible = false;
            self.gesture.disarm();
        } else {
            self.playing = true;
            match self.sink.play() {
                Ok(()) => {
                    self.prompt_visible = false;
                    self.gesture.disarm();
                }
                Err(blocked) => tracing::warn!(%blocked, "play failed on toggle"),
            }
        }

        self.store.set(PLAYING_KEY, self.playing.to_string())?;
        self.store
            .set(POSITION_KEY, self.sink.position().to_string())?;
        Ok(())
    }

    /// Periodic, visibility-hidden and unload save. The position is only
    /// written once playback has advanced.
    pub fn save(&mut self) -> Result<()> {
        let position = self.sink.position();
        if position > 0.0 {
            self.store.set(POSITION_KEY, position.to_string())?;
        }
        self.store.set(PLAYING_KEY, self.playing.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Debug, Default)]
    struct FakeSink {
        blocked: bool,
        playing: bool,
        position: f64,
        volume: f32,
        play_calls: usize,
    }

    impl AudioSink for FakeSink {
        fn play(&mut self) -> std::result::Result<(), PlaybackBlocked> {
            self.play_calls += 1;
            if self.blocked {
                return Err(PlaybackBlocked::new("NotAllowedError"));
            }
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn position(&self) -> f64 {
            self.position
        }

        fn seek(&mut self, seconds: f64) {
            self.position = seconds;
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }
    }

    fn store_with(playing: Option<&str>, position: Option<&str>) -> MemoryStore {
        let mut store = MemoryStore::new();
        if let Some(playing) = playing {
            store.set(PLAYING_KEY, playing.to_string()).unwrap();
        }
        if let Some(position) = position {
            store.set(POSITION_KEY, position.to_string()).unwrap();
        }
        store
    }

    #[test]
    fn defaults_to_playing_from_the_start() {
        let prefs = MusicPreferences::load(&MemoryStore::new());
        assert_eq!(prefs, MusicPreferences::default());
    }

    #[test]
    fn only_literal_false_pauses() {
        assert!(!MusicPreferences::load(&store_with(Some("false"), None)).playing);
        assert!(MusicPreferences::load(&store_with(Some("nope"), None)).playing);
    }

    #[test]
    fn bad_positions_fall_back_to_zero() {
        for raw in ["abc", "-3", "NaN", "0", "s12", "-1.5s"] {
            let prefs = MusicPreferences::load(&store_with(None, Some(raw)));
            assert_eq!(prefs.current_time, 0.0, "position `{raw}`");
        }
    }

    #[test]
    fn positions_keep_their_leading_number() {
        for (raw, expected) in [("12.5s", 12.5), (" 7", 7.0), ("3.25 seconds", 3.25), ("1e2x", 100.0)] {
            let prefs = MusicPreferences::load(&store_with(None, Some(raw)));
            assert_eq!(prefs.current_time, expected, "position `{raw}`");
        }
    }

    #[test]
    fn restores_volume_and_position() {
        let controller =
            MusicController::new(FakeSink::default(), store_with(None, Some("42.5")), 0.4);
        assert_eq!(controller.sink().position, 42.5);
        assert_eq!(controller.sink().volume, 0.4);
        assert!(controller.is_playing());
        assert_eq!(controller.sink().play_calls, 0);
    }

    #[test]
    fn blocked_autoplay_arms_every_gesture_source() {
        let sink = FakeSink {
            blocked: true,
            ..Default::default()
        };
        let mut controller = MusicController::new(sink, MemoryStore::new(), 0.4);
        controller.sync();

        assert!(controller.prompt_visible());
        assert_eq!(controller.gesture().subscribed(), GestureSource::ALL.as_slice());

        // Still blocked: stays armed.
        assert!(!controller.on_gesture(GestureSource::Scroll));
        assert!(controller.gesture().is_armed());

        controller.sink.blocked = false;
        assert!(controller.on_gesture(GestureSource::KeyDown));
        assert!(!controller.prompt_visible());
        assert!(!controller.gesture().is_armed());

        // Later gestures are ignored once unsubscribed.
        let calls = controller.sink().play_calls;
        assert!(!controller.on_gesture(GestureSource::Click));
        assert_eq!(controller.sink().play_calls, calls);
    }

    #[test]
    fn sync_pauses_when_preference_is_off() {
        let sink = FakeSink {
            playing: true,
            ..Default::default()
        };
        let mut controller = MusicController::new(sink, store_with(Some("false"), None), 0.4);
        controller.sync();
        assert!(!controller.sink().playing);
        assert!(!controller.prompt_visible());
    }

    #[test]
    fn toggle_persists_both_keys() {
        let mut controller = MusicController::new(FakeSink::default(), MemoryStore::new(), 0.4);
        controller.sync();
        controller.sink.position = 12.0;

        controller.toggle().unwrap();
        assert!(!controller.is_playing());
        assert!(!controller.sink().playing);
        assert_eq!(controller.store().get(PLAYING_KEY).as_deref(), Some("false"));
        assert_eq!(controller.store().get(POSITION_KEY).as_deref(), Some("12"));

        controller.toggle().unwrap();
        assert!(controller.is_playing());
        assert!(controller.sink().playing);
        assert_eq!(controller.store().get(PLAYING_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn save_skips_zero_position() {
        let mut controller =
            MusicController::new(FakeSink::default(), store_with(None, Some("30")), 0.4);
        controller.sink.position = 0.0;
        controller.save().unwrap();

        assert_eq!(controller.store().get(POSITION_KEY).as_deref(), Some("30"));
        assert_eq!(controller.store().get(PLAYING_KEY).as_deref(), Some("true"));
    }
}
