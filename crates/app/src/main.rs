use std::path::PathBuf;

use celebration_fx_core::{
    unix_now_ms, AmbientField, AudioSink, BurstState, ConfettiBurst, Countdown, FrameQueue,
    FxConfig, JsonFileStore, MusicController, PlaybackBlocked, PlaybackClock, RecordingSurface,
    RsvpSubmission, SurfaceSize,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> celebration_fx_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FxConfig::load(path)?,
        None => FxConfig::default(),
    };

    match cli.command {
        Commands::Ambient {
            width,
            height,
            frames,
            seed,
        } => run_ambient(&config, SurfaceSize::new(width, height), frames, seed),
        Commands::Confetti {
            width,
            height,
            seed,
        } => run_confetti(&config, SurfaceSize::new(width, height), seed),
        Commands::Countdown { now } => run_countdown(&config, now),
        Commands::Rsvp {
            name,
            attendance,
            message,
        } => run_rsvp(&config, &name, &attendance, &message),
        Commands::Music { store, toggle } => run_music(&config, store, toggle),
    }
}

fn run_ambient(
    config: &FxConfig,
    viewport: SurfaceSize,
    frames: u64,
    seed: u64,
) -> celebration_fx_core::Result<()> {
    tracing::info!(frames, seed, "running ambient field");

    let mut surface = RecordingSurface::default();
    let mut queue = FrameQueue::new();
    let mut field = AmbientField::with_seed(config.ambient.clone(), viewport, &mut surface, seed)?;
    field.start(&mut queue);

    while field.frames_drawn() < frames {
        for handle in queue.take_due() {
            field.on_frame(handle, &mut surface, &mut queue);
        }
    }

    let mean_opacity = field
        .particles()
        .iter()
        .map(|particle| particle.opacity)
        .sum::<f32>()
        / field.particles().len().max(1) as f32;
    println!(
        "particles={} frames={} draw_commands={} mean_opacity={mean_opacity:.3}",
        field.particles().len(),
        field.frames_drawn(),
        surface.commands().len(),
    );
    Ok(())
}

fn run_confetti(
    config: &FxConfig,
    container: SurfaceSize,
    seed: u64,
) -> celebration_fx_core::Result<()> {
    tracing::info!(seed, "running confetti burst");

    let mut surface = RecordingSurface::default();
    let mut queue = FrameQueue::new();
    let mut clock = PlaybackClock::default();
    let mut burst = ConfettiBurst::with_seed(config.confetti.clone(), seed)?;

    burst.launch(Some((&mut surface, container)), clock.now(), &mut queue);
    while burst.deadline_ms().is_some() {
        clock.advance(config.page.frame_interval_ms);
        burst.expire_if_due(clock.now(), &mut surface, &mut queue);
        for handle in queue.take_due() {
            burst.on_frame(handle, &mut surface, &mut queue);
        }
    }

    let ending = match burst.state() {
        BurstState::Finished => "settled",
        BurstState::TimedOut => "timed out",
        BurstState::Idle | BurstState::Running => "interrupted",
    };
    println!(
        "frames={} ending={ending} elapsed_ms={:.0}",
        burst.frames_drawn(),
        clock.now()
    );
    Ok(())
}

fn run_countdown(config: &FxConfig, now: Option<i64>) -> celebration_fx_core::Result<()> {
    let countdown = Countdown::new(config.page.countdown_target_ms);
    let [days, hours, minutes, seconds] = countdown.remaining(now.unwrap_or_else(unix_now_ms)).labels();
    println!("{days} days {hours} hours {minutes} minutes {seconds} seconds");
    Ok(())
}

fn run_rsvp(
    config: &FxConfig,
    name: &str,
    attendance: &str,
    message: &str,
) -> celebration_fx_core::Result<()> {
    let submission = RsvpSubmission::from_form(name, message, attendance)
        .ok_or("RSVP needs a name and an attendance of `yes` or `no`")?;
    tracing::info!(endpoint = %config.page.rsvp_endpoint, "prepared RSVP body");
    println!("{}", submission.to_json()?);
    Ok(())
}

fn run_music(config: &FxConfig, store: PathBuf, toggle: bool) -> celebration_fx_core::Result<()> {
    let store = JsonFileStore::open(store)?;
    let mut music = MusicController::new(HeadlessSink::default(), store, config.page.music_volume);
    music.sync();
    if toggle {
        music.toggle()?;
    }
    music.save()?;

    println!(
        "playing={} position={:.1}s store={}",
        music.is_playing(),
        music.sink().position,
        music.store().path().display()
    );
    Ok(())
}

/// Audio sink with no output device; playback is never blocked.
#[derive(Debug, Default)]
struct HeadlessSink {
    position: f64,
    volume: f32,
}

impl AudioSink for HeadlessSink {
    fn play(&mut self) -> Result<(), PlaybackBlocked> {
        tracing::debug!(volume = self.volume, "headless playback started");
        Ok(())
    }

    fn pause(&mut self) {}

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

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Event page effects, simulated headless", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the ambient particle field for a number of frames.
    Ambient {
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        #[arg(long, default_value_t = 720.0)]
        height: f32,
        #[arg(long, default_value_t = 600)]
        frames: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Launch one confetti burst and run it until it ends.
    Confetti {
        #[arg(long, default_value_t = 800.0)]
        width: f32,
        #[arg(long, default_value_t = 600.0)]
        height: f32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print the time left until the event.
    Countdown {
        /// Wall-clock time in Unix milliseconds; defaults to now.
        #[arg(long, allow_hyphen_values = true)]
        now: Option<i64>,
    },
    /// Print the JSON body an RSVP submission would post.
    Rsvp {
        #[arg(long)]
        name: String,
        /// `yes` or `no`.
        #[arg(long)]
        attendance: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Restore the saved music preference, optionally toggle it, and save.
    Music {
        /// JSON file holding the persisted preference.
        #[arg(long, default_value = "music-preferences.json")]
        store: PathBuf,
        #[arg(long)]
        toggle: bool,
    },
}
