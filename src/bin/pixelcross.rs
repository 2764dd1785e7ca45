use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser, Debug)]
#[command(name = "pixelcross", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and upload clips in a paced loop.
    Run(RunArgs),
    /// Render one MP4 clip locally (requires `ffmpeg` on PATH).
    Clip(ClipArgs),
    /// Render a single frame of a clip as a PNG.
    Frame(FrameArgs),
    /// Print a random title.
    Title(TitleArgs),
}

#[derive(Args, Debug)]
struct Common {
    /// JSON config file; every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct RenderFlags {
    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Disable static-frame elision.
    #[arg(long, default_value_t = false)]
    no_elision: bool,
}

impl RenderFlags {
    fn opts(&self) -> pixelcross::RenderOpts {
        pixelcross::RenderOpts {
            parallel: self.parallel,
            threads: self.threads,
            chunk_size: self.chunk_size,
            static_frame_elision: !self.no_elision,
            channel_capacity: 4,
            enable_audio: true,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: Common,

    #[command(flatten)]
    render: RenderFlags,

    /// Number of clips to produce.
    #[arg(long, conflicts_with = "forever")]
    count: Option<u64>,

    /// Loop until interrupted.
    #[arg(long)]
    forever: bool,

    /// Target seconds between clip starts.
    #[arg(long)]
    interval_secs: Option<f64>,

    /// Directory for clip files.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Generate clips but skip uploading.
    #[arg(long)]
    no_upload: bool,

    /// Keep clip files after upload.
    #[arg(long)]
    keep_files: bool,
}

#[derive(Args, Debug)]
struct ClipArgs {
    #[command(flatten)]
    common: Common,

    #[command(flatten)]
    render: RenderFlags,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: Common,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct TitleArgs {
    /// RNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of block glyphs after the cross.
    #[arg(long, default_value_t = 6)]
    blocks: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Clip(args) => cmd_clip(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Title(args) => cmd_title(args),
    }
}

fn load_config(common: &Common) -> anyhow::Result<pixelcross::RunConfig> {
    let mut cfg = match common.config.as_deref() {
        Some(path) => pixelcross::RunConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => pixelcross::RunConfig::default(),
    };
    if common.seed.is_some() {
        cfg.seed = common.seed;
    }
    Ok(cfg)
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn init_stderr_logging() {
    // Only fails if a subscriber is already installed, which is harmless here.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.common)?;
    if args.forever {
        cfg.count = None;
    } else if args.count.is_some() {
        cfg.count = args.count;
    }
    if let Some(s) = args.interval_secs {
        cfg.interval_secs = s;
    }
    if let Some(dir) = args.work_dir {
        cfg.work_dir = dir;
    }
    if args.no_upload {
        cfg.upload = pixelcross::UploadConfig::None;
    }
    cfg.keep_files |= args.keep_files;
    cfg.validate()?;

    let _guard = pixelcross::logging::init_logger(&cfg.log.level, &cfg.log.file)?;

    anyhow::ensure!(
        pixelcross::is_ffmpeg_on_path(),
        "ffmpeg is required for MP4 encoding, but was not found on PATH"
    );

    let uploader = pixelcross::uploader_from_config(&cfg.upload)?;
    let writer = pixelcross::FfmpegClipWriter {
        opts: args.render.opts(),
    };
    let mut runner = pixelcross::Runner::new(cfg, writer, uploader)?;
    let summary = runner.run()?;

    eprintln!(
        "{} clips attempted, {} uploaded, {} failed",
        summary.attempted, summary.uploaded, summary.failed
    );
    Ok(())
}

fn cmd_clip(args: ClipArgs) -> anyhow::Result<()> {
    init_stderr_logging();
    let cfg = load_config(&args.common)?;
    let mut rng = rng_for(cfg.seed);
    let plan = pixelcross::ClipPlan::generate(&cfg.clip, &mut rng)?;

    use pixelcross::ClipWriter as _;
    let mut writer = pixelcross::FfmpegClipWriter {
        opts: args.render.opts(),
    };
    let stats = writer.write_clip(&plan, &args.out)?;

    eprintln!(
        "wrote {} ({} frames, {} painted)",
        args.out.display(),
        stats.frames_total,
        stats.frames_rendered
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    init_stderr_logging();
    let cfg = load_config(&args.common)?;
    let mut rng = rng_for(cfg.seed);
    let plan = pixelcross::ClipPlan::generate(&cfg.clip, &mut rng)?;

    let sess = pixelcross::RenderSession::new(&plan, pixelcross::RenderOpts::default());
    let frame = sess.render_frame(pixelcross::FrameIndex(args.frame))?;

    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_title(args: TitleArgs) -> anyhow::Result<()> {
    let mut rng = rng_for(args.seed);
    println!("{}", pixelcross::random_title(&mut rng, args.blocks));
    Ok(())
}

fn write_png(out: &Path, frame: &pixelcross::FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
