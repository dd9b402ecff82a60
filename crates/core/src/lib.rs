//! Core library for the event page effects.
//!
//! The two animation loops (the ambient particle field and the confetti
//! burst) are plain state machines driven by a host frame scheduler and a
//! drawing surface, both expressed as traits so they run headless. The
//! remaining modules cover the small page features that sit around them:
//! countdown, background music, reveal effects and the RSVP form.

pub mod ambient;
pub mod audio;
pub mod config;
pub mod confetti;
pub mod countdown;
pub mod error;
pub mod page;
pub mod render;
pub mod reveal;
pub mod rsvp;
pub mod storage;
pub mod timeline;

pub use ambient::{pool_size, AmbientField, AmbientParticle};
pub use audio::{
    AudioSink, GestureSignal, GestureSource, MusicController, MusicPreferences, PlaybackBlocked,
};
pub use config::{AmbientConfig, ConfettiConfig, FxConfig, PageConfig};
pub use confetti::{BurstState, ConfettiBurst, ConfettiPiece};
pub use countdown::{unix_now_ms, Countdown, CountdownParts};
pub use error::{FxError, Result};
pub use page::Page;
pub use render::{DrawCommand, RecordingSurface, Rgba, Surface, SurfaceSize};
pub use reveal::{FadeInSet, NamePart, NameReveal, NavDots, Span};
pub use rsvp::{Attendance, RsvpOutcome, RsvpResponse, RsvpSubmission, RsvpTransport};
pub use storage::{JsonFileStore, MemoryStore, PreferenceStore};
pub use timeline::{FrameHandle, FrameQueue, FrameScheduler, PlaybackClock, ScheduledEvent, Scheduler};
