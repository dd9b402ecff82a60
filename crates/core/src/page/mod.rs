//! Page-load entry point. Owns one controller per subsystem and routes host
//! events (refresh ticks, resizes, RSVP results) to them.

use crate::{
    ambient::AmbientField,
    config::FxConfig,
    confetti::ConfettiBurst,
    countdown::{Countdown, CountdownParts},
    render::{Surface, SurfaceSize},
    rsvp::RsvpOutcome,
    timeline::{FrameQueue, PlaybackClock},
    Result,
};

/// The animated page: ambient field, confetti burst and countdown driven by
/// an in-memory frame queue and a simulated clock.
#[derive(Debug)]
pub struct Page<S> {
    ambient_surface: S,
    confetti_surface: Option<S>,
    confetti_container: SurfaceSize,
    scheduler: FrameQueue,
    clock: PlaybackClock,
    ambient: AmbientField,
    confetti: ConfettiBurst,
    countdown: Countdown,
}

impl<S: Surface> Page<S> {
    /// Builds every controller and starts the ambient loop. `seed` makes the
    /// particle motion reproducible.
    pub fn load(
        config: &FxConfig,
        viewport: SurfaceSize,
        mut ambient_surface: S,
        confetti_surface: Option<S>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut scheduler = FrameQueue::new();
        let mut ambient = match seed {
            Some(seed) => {
                AmbientField::with_seed(config.ambient.clone(), viewport, &mut ambient_surface, seed)?
            }
            None => AmbientField::new(config.ambient.clone(), viewport, &mut ambient_surface)?,
        };
        let confetti = match seed {
            Some(seed) => ConfettiBurst::with_seed(config.confetti.clone(), seed.wrapping_add(1))?,
            None => ConfettiBurst::new(config.confetti.clone())?,
        };
        ambient.start(&mut scheduler);

        let confetti_container = confetti_surface
            .as_ref()
            .map(|surface| surface.size())
            .unwrap_or_default();
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            confetti = confetti_surface.is_some(),
            "page loaded"
        );

        Ok(Self {
            ambient_surface,
            confetti_surface,
            confetti_container,
            scheduler,
            clock: PlaybackClock::default(),
            ambient,
            confetti,
            countdown: Countdown::new(config.page.countdown_target_ms),
        })
    }

    pub fn ambient(&self) -> &AmbientField {
        &self.ambient
    }

    pub fn confetti(&self) -> &ConfettiBurst {
        &self.confetti
    }

    pub fn ambient_surface(&self) -> &S {
        &self.ambient_surface
    }

    pub fn confetti_surface(&self) -> Option<&S> {
        self.confetti_surface.as_ref()
    }

    pub fn scheduler(&self) -> &FrameQueue {
        &self.scheduler
    }

    /// Simulated milliseconds since load.
    pub fn now_ms(&self) -> f64 {
        self.clock.now()
    }

    /// Viewport resize notification. Only the ambient surface follows it.
    pub fn resize(&mut self, viewport: SurfaceSize) {
        self.ambient.resize(viewport, &mut self.ambient_surface);
    }

    /// Records the current size of the section hosting the confetti surface.
    pub fn set_confetti_container(&mut self, size: SurfaceSize) {
        self.confetti_container = size;
    }

    /// Triggers a burst directly. Returns `false` when there is no confetti
    /// surface.
    pub fn launch_confetti(&mut self) -> bool {
        let container = self.confetti_container;
        self.confetti.launch(
            self.confetti_surface
                .as_mut()
                .map(|surface| (surface, container)),
            self.clock.now(),
            &mut self.scheduler,
        )
    }

    /// RSVP success path. Launches confetti for attending guests.
    pub fn rsvp_resolved(&mut self, outcome: RsvpOutcome) -> bool {
        if outcome.should_celebrate() {
            self.launch_confetti()
        } else {
            false
        }
    }

    /// Advances the clock by one refresh and runs every frame callback that
    /// was due.
    pub fn advance(&mut self, delta_ms: f64) {
        self.clock.advance(delta_ms);
        let now = self.clock.now();

        if let Some(surface) = self.confetti_surface.as_mut() {
            self.confetti
                .expire_if_due(now, surface, &mut self.scheduler);
        }

        for handle in self.scheduler.take_due() {
            if self.ambient.owns(handle) {
                self.ambient
                    .on_frame(handle, &mut self.ambient_surface, &mut self.scheduler);
            } else if self.confetti.owns(handle) {
                if let Some(surface) = self.confetti_surface.as_mut() {
                    self.confetti.on_frame(handle, surface, &mut self.scheduler);
                }
            }
        }
    }

    /// Countdown to the event at wall-clock `now_unix_ms`.
    pub fn countdown(&self, now_unix_ms: i64) -> CountdownParts {
        self.countdown.remaining(now_unix_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{confetti::BurstState, render::RecordingSurface};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn load_page(with_confetti: bool) -> Page<RecordingSurface> {
        let confetti = with_confetti.then(|| RecordingSurface::new(SurfaceSize::new(600.0, 400.0)));
        Page::load(
            &FxConfig::default(),
            SurfaceSize::new(1024.0, 768.0),
            RecordingSurface::default(),
            confetti,
            Some(21),
        )
        .unwrap()
    }

    #[test]
    fn ambient_loop_runs_from_load() {
        let mut page = load_page(true);
        for _ in 0..30 {
            page.advance(FRAME_MS);
        }
        assert_eq!(page.ambient().frames_drawn(), 30);
        assert_eq!(page.ambient_surface().commands().len(), 160);
        assert_eq!(page.scheduler().pending(), 1);
    }

    #[test]
    fn attending_rsvp_launches_confetti_alongside_the_field() {
        let mut page = load_page(true);
        page.advance(FRAME_MS);

        assert!(page.rsvp_resolved(RsvpOutcome::Confirmed { celebrate: true }));
        assert_eq!(page.scheduler().pending(), 2);
        assert_eq!(
            page.confetti_surface().unwrap().size(),
            SurfaceSize::new(600.0, 400.0)
        );

        while page.now_ms() < 7_000.0 {
            page.advance(FRAME_MS);
        }
        assert_ne!(page.confetti().state(), BurstState::Running);
        assert!(page.confetti_surface().unwrap().is_blank());
        assert_eq!(page.scheduler().pending(), 1);
        assert!(page.ambient().frames_drawn() > 400);
    }

    #[test]
    fn quiet_outcomes_do_not_launch() {
        let mut page = load_page(true);
        assert!(!page.rsvp_resolved(RsvpOutcome::Confirmed { celebrate: false }));
        assert!(!page.rsvp_resolved(RsvpOutcome::Rejected));
        assert!(!page.rsvp_resolved(RsvpOutcome::Failed));
        assert_eq!(page.confetti().launches(), 0);
    }

    #[test]
    fn missing_confetti_surface_is_tolerated() {
        let mut page = load_page(false);
        assert!(!page.launch_confetti());
        page.advance(FRAME_MS);
        assert_eq!(page.confetti().state(), BurstState::Idle);
    }

    #[test]
    fn resize_only_touches_the_ambient_surface() {
        let mut page = load_page(true);
        page.resize(SurfaceSize::new(500.0, 900.0));

        assert_eq!(page.ambient_surface().size(), SurfaceSize::new(500.0, 900.0));
        assert_eq!(
            page.confetti_surface().unwrap().size(),
            SurfaceSize::new(600.0, 400.0)
        );
        // Pool size is fixed at load.
        assert_eq!(page.ambient().particles().len(), 80);
    }

    #[test]
    fn confetti_follows_the_latest_container_size() {
        let mut page = load_page(true);
        page.set_confetti_container(SurfaceSize::new(320.0, 480.0));
        page.launch_confetti();
        assert_eq!(
            page.confetti_surface().unwrap().size(),
            SurfaceSize::new(320.0, 480.0)
        );
    }
}
