//! Confetti burst: a finite batch of falling, spinning rectangles launched on
//! a successful RSVP.
//!
//! A batch ends when every piece has faded out below the bottom edge, or when
//! the launch deadline passes, whichever comes first. Only one batch is ever
//! animated: launching again replaces the running batch and cancels its
//! pending frame.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::ConfettiConfig,
    render::{Rgba, Surface, SurfaceSize},
    timeline::{FrameHandle, FrameScheduler},
    FxError, Result,
};

/// One rectangle of a confetti batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiPiece {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgba,
    pub speed_x: f32,
    pub speed_y: f32,
    /// Degrees.
    pub rotation: f32,
    /// Degrees per frame.
    pub rotation_speed: f32,
    pub opacity: f32,
}

impl ConfettiPiece {
    /// Creates a piece somewhere in the upper half-height band above the
    /// visible area.
    pub fn spawn<R: Rng + ?Sized>(bounds: SurfaceSize, palette: &[Rgba], rng: &mut R) -> Self {
        let band = (bounds.height * 0.5).max(1.0);
        Self {
            x: rng.random::<f32>() * bounds.width,
            y: -(1.0 - rng.random::<f32>()) * band,
            width: rng.random::<f32>() * 10.0 + 5.0,
            height: rng.random::<f32>() * 6.0 + 3.0,
            color: palette[rng.random_range(0..palette.len())],
            speed_y: rng.random::<f32>() * 4.0 + 2.0,
            speed_x: (rng.random::<f32>() - 0.5) * 4.0,
            rotation: rng.random::<f32>() * 360.0,
            rotation_speed: (rng.random::<f32>() - 0.5) * 12.0,
            opacity: 1.0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.opacity > 0.0
    }

    /// Advances a live piece by one frame. Fading starts once the piece is
    /// below `floor`; it keeps falling and spinning while it fades.
    pub fn step(&mut self, floor: f32, gravity: f32, fade_step: f32) {
        self.y += self.speed_y;
        self.speed_y += gravity;
        self.x += self.speed_x;
        self.rotation += self.rotation_speed;

        if self.y > floor {
            self.opacity -= fade_step;
        }
    }
}

/// Where the burst loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    /// No batch has been launched yet.
    Idle,
    /// A frame is scheduled.
    Running,
    /// Every piece faded out before the deadline.
    Finished,
    /// The deadline fired.
    TimedOut,
}

/// Controller that owns the current confetti batch and its frame loop.
#[derive(Debug)]
pub struct ConfettiBurst {
    config: ConfettiConfig,
    palette: Vec<Rgba>,
    rng: StdRng,
    bounds: SurfaceSize,
    pieces: Vec<ConfettiPiece>,
    pending_frame: Option<FrameHandle>,
    deadline_ms: Option<f64>,
    state: BurstState,
    frames_drawn: u64,
    launches: u64,
}

impl ConfettiBurst {
    pub fn new(config: ConfettiConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Same as [`ConfettiBurst::new`] with a reproducible random sequence.
    pub fn with_seed(config: ConfettiConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ConfettiConfig, rng: StdRng) -> Result<Self> {
        let palette = config
            .palette
            .iter()
            .map(|hex| Rgba::from_hex(hex))
            .collect::<Result<Vec<_>>>()?;
        if palette.is_empty() {
            return Err(FxError::InvalidInput("confetti palette must not be empty"));
        }

        Ok(Self {
            config,
            palette,
            rng,
            bounds: SurfaceSize::default(),
            pieces: Vec::new(),
            pending_frame: None,
            deadline_ms: None,
            state: BurstState::Idle,
            frames_drawn: 0,
            launches: 0,
        })
    }

    pub fn state(&self) -> BurstState {
        self.state
    }

    pub fn pieces(&self) -> &[ConfettiPiece] {
        &self.pieces
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn launches(&self) -> u64 {
        self.launches
    }

    pub fn deadline_ms(&self) -> Option<f64> {
        self.deadline_ms
    }

    /// Whether `handle` is the frame this burst is waiting on.
    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.pending_frame == Some(handle)
    }

    /// Starts a new batch sized to the surface's container.
    ///
    /// Without a surface this does nothing and returns `false`. A batch that
    /// is still running is dropped and its pending frame cancelled.
    pub fn launch<S: Surface, F: FrameScheduler>(
        &mut self,
        surface: Option<(&mut S, SurfaceSize)>,
        now_ms: f64,
        scheduler: &mut F,
    ) -> bool {
        let Some((surface, container)) = surface else {
            tracing::debug!("confetti surface missing, skipping burst");
            return false;
        };

        if let Some(previous) = self.pending_frame.take() {
            scheduler.cancel_frame(previous);
            tracing::debug!("replacing running confetti batch");
        }

        surface.resize(container);
        self.bounds = container;
        self.pieces = (0..self.config.piece_count)
            .map(|_| ConfettiPiece::spawn(container, &self.palette, &mut self.rng))
            .collect();
        self.deadline_ms = Some(now_ms + self.config.timeout_ms as f64);
        self.state = BurstState::Running;
        self.frames_drawn = 0;
        self.launches += 1;
        tracing::info!(
            pieces = self.pieces.len(),
            width = container.width,
            height = container.height,
            "confetti launched"
        );

        self.draw_frame(surface, scheduler);
        true
    }

    /// Host callback for a fired frame request.
    pub fn on_frame<S: Surface, F: FrameScheduler>(
        &mut self,
        handle: FrameHandle,
        surface: &mut S,
        scheduler: &mut F,
    ) {
        if !self.owns(handle) {
            return;
        }
        self.pending_frame = None;
        self.draw_frame(surface, scheduler);
    }

    /// Clears, advances and draws every live piece, then re-arms the loop if
    /// anything was still live.
    fn draw_frame<S: Surface, F: FrameScheduler>(&mut self, surface: &mut S, scheduler: &mut F) {
        surface.clear();
        let floor = self.bounds.height;
        let mut any_live = false;

        for piece in self.pieces.iter_mut().filter(|piece| piece.is_live()) {
            any_live = true;
            piece.step(floor, self.config.gravity, self.config.fade_step);
            surface.fill_rotated_rect(
                piece.x,
                piece.y,
                piece.width,
                piece.height,
                piece.rotation.to_radians(),
                piece.color.with_alpha(piece.opacity.max(0.0)),
            );
        }
        self.frames_drawn += 1;

        if any_live {
            self.pending_frame = Some(scheduler.request_frame());
        } else {
            self.state = BurstState::Finished;
            self.pieces.clear();
            tracing::debug!(frames = self.frames_drawn, "confetti settled");
        }
    }

    /// Fires the launch deadline once `now_ms` reaches it: cancels any
    /// pending frame and clears the surface regardless of the batch's state.
    /// Returns whether the deadline fired on this call.
    pub fn expire_if_due<S: Surface, F: FrameScheduler>(
        &mut self,
        now_ms: f64,
        surface: &mut S,
        scheduler: &mut F,
    ) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {}
            _ => return false,
        }

        self.deadline_ms = None;
        if let Some(pending) = self.pending_frame.take() {
            scheduler.cancel_frame(pending);
            self.state = BurstState::TimedOut;
            tracing::debug!(frames = self.frames_drawn, "confetti timed out");
        }
        self.pieces.clear();
        surface.clear();
        true
    }
}
