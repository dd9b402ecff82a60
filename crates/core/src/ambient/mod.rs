//! Ambient particle field: a fixed pool of glowing points that drift upward
//! for the whole lifetime of the page.
//!
//! Particles are never freed. When one fades out or leaves the viewport it is
//! recycled in place with fresh random attributes.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::AmbientConfig,
    render::{Rgba, Surface, SurfaceSize},
    timeline::{FrameHandle, FrameScheduler},
    Result,
};

/// A single point of the ambient field.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientParticle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub opacity: f32,
    pub fade_rate: f32,
    pub growing: bool,
}

impl AmbientParticle {
    /// Creates a particle at a random position inside `bounds`.
    pub fn spawn<R: Rng + ?Sized>(bounds: SurfaceSize, rng: &mut R) -> Self {
        let mut particle = Self {
            x: 0.0,
            y: 0.0,
            size: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            opacity: 0.0,
            fade_rate: 0.0,
            growing: false,
        };
        particle.recycle(bounds, rng);
        particle
    }

    /// Re-randomises every attribute in place.
    pub fn recycle<R: Rng + ?Sized>(&mut self, bounds: SurfaceSize, rng: &mut R) {
        self.x = rng.random::<f32>() * bounds.width;
        self.y = rng.random::<f32>() * bounds.height;
        self.size = rng.random::<f32>() * 3.0 + 0.5;
        self.speed_x = (rng.random::<f32>() - 0.5) * 0.5;
        self.speed_y = -rng.random::<f32>() * 0.8 - 0.2;
        self.opacity = rng.random::<f32>() * 0.6 + 0.1;
        self.fade_rate = rng.random::<f32>() * 0.005 + 0.002;
        self.growing = rng.random_bool(0.5);
    }

    /// Advances the particle by one frame.
    ///
    /// A particle that leaves through the top or either side is recycled and
    /// re-enters from `margin` pixels below the bottom edge. That override is
    /// applied last, so it wins over a fade-out recycle in the same frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        bounds: SurfaceSize,
        ceiling: f32,
        margin: f32,
        rng: &mut R,
    ) {
        self.x += self.speed_x;
        self.y += self.speed_y;

        if self.growing {
            self.opacity += self.fade_rate;
            if self.opacity >= ceiling {
                self.growing = false;
            }
        } else {
            self.opacity -= self.fade_rate;
            if self.opacity <= 0.0 {
                self.recycle(bounds, rng);
            }
        }

        if self.y < -margin || self.x < -margin || self.x > bounds.width + margin {
            self.recycle(bounds, rng);
            self.y = bounds.height + margin;
        }
    }
}

/// Number of particles for a viewport of the given width.
pub fn pool_size(config: &AmbientConfig, viewport_width: f32) -> usize {
    if viewport_width < config.breakpoint {
        config.narrow_count
    } else {
        config.wide_count
    }
}

/// Controller that owns the particle pool and its frame loop.
#[derive(Debug)]
pub struct AmbientField {
    config: AmbientConfig,
    core_color: Rgba,
    halo_color: Rgba,
    bounds: SurfaceSize,
    particles: Vec<AmbientParticle>,
    rng: StdRng,
    pending_frame: Option<FrameHandle>,
    frames_drawn: u64,
}

impl AmbientField {
    /// Sizes `surface` to the viewport and fills the pool.
    pub fn new<S: Surface>(config: AmbientConfig, viewport: SurfaceSize, surface: &mut S) -> Result<Self> {
        Self::with_rng(config, viewport, surface, StdRng::from_os_rng())
    }

    /// Same as [`AmbientField::new`] with a reproducible random sequence.
    pub fn with_seed<S: Surface>(
        config: AmbientConfig,
        viewport: SurfaceSize,
        surface: &mut S,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(config, viewport, surface, StdRng::seed_from_u64(seed))
    }

    fn with_rng<S: Surface>(
        config: AmbientConfig,
        viewport: SurfaceSize,
        surface: &mut S,
        mut rng: StdRng,
    ) -> Result<Self> {
        let core_color = Rgba::from_hex(&config.core_color)?;
        let halo_color = Rgba::from_hex(&config.halo_color)?;

        surface.resize(viewport);
        let count = pool_size(&config, viewport.width);
        let particles = (0..count)
            .map(|_| AmbientParticle::spawn(viewport, &mut rng))
            .collect();
        tracing::info!(count, width = viewport.width, "ambient field populated");

        Ok(Self {
            config,
            core_color,
            halo_color,
            bounds: viewport,
            particles,
            rng,
            pending_frame: None,
            frames_drawn: 0,
        })
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    pub fn bounds(&self) -> SurfaceSize {
        self.bounds
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Requests the first frame. The loop then re-arms itself forever.
    pub fn start<F: FrameScheduler>(&mut self, scheduler: &mut F) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(scheduler.request_frame());
        }
    }

    /// Whether `handle` is the frame this field is waiting on.
    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.pending_frame == Some(handle)
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
        self.frame(surface);
        self.pending_frame = Some(scheduler.request_frame());
    }

    /// Updates and draws every particle once.
    pub fn frame<S: Surface>(&mut self, surface: &mut S) {
        surface.clear();
        let ceiling = self.config.opacity_ceiling;
        let margin = self.config.edge_margin;

        for particle in &mut self.particles {
            particle.update(self.bounds, ceiling, margin, &mut self.rng);

            surface.fill_circle(
                particle.x,
                particle.y,
                particle.size,
                self.core_color.with_alpha(particle.opacity),
            );
            surface.fill_circle(
                particle.x,
                particle.y,
                particle.size * self.config.halo_scale,
                self.halo_color
                    .with_alpha(particle.opacity * self.config.halo_alpha),
            );
        }

        self.frames_drawn += 1;
    }

    /// Follows a viewport resize. Existing positions are left as they are
    /// and settle as particles get recycled.
    pub fn resize<S: Surface>(&mut self, viewport: SurfaceSize, surface: &mut S) {
        surface.resize(viewport);
        self.bounds = viewport;
        tracing::debug!(width = viewport.width, height = viewport.height, "ambient surface resized");
    }
}
