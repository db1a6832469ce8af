// Mudra Command Line Interface
// Text-to-sign translation and landmark preprocessing from the shell

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use mudra_core::{DatasetIndex, GlossSpace, MudraConfig};
use mudra_lmk::{
    augment_dataset, augment_landmarks, augment_with_rng, preprocess_dataset, preprocess_landmarks,
    read_landmarks, read_parts_dir, write_landmarks, AugmentConfig, BatchReport, Landmarks,
    PreprocessConfig,
};
use mudra_syn::{
    ConcatenativeSynthesis, GlossMapper, SynthesisConfig, TextToSign, TranslationOutcome,
    VideoEncoder,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mudra")]
#[command(about = "Mudra - concatenative text-to-sign synthesis", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or YAML); MUDRA_* environment
    /// variables are used when omitted
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate text into a sign sequence
    Translate {
        /// Text to translate
        text: String,

        /// Text language (english, urdu, hindi)
        #[arg(long)]
        text_lang: Option<String>,

        /// Sign language (psl, wlasl)
        #[arg(long)]
        sign_lang: Option<String>,

        /// Output format (landmarks, video)
        #[arg(long)]
        format: Option<String>,

        /// Resolve an ambiguous word up front, e.g. `--choose bank=bank(river)`
        #[arg(long, value_name = "WORD=FORM")]
        choose: Vec<String>,

        /// Save the sequence (.npy/.csv for landmarks, .mp4/.mkv/... for video)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Replace an existing output file
        #[arg(long)]
        overwrite: bool,
    },

    /// Canonicalize one landmark sequence to a fixed length
    Preprocess {
        /// Input `.npy`/`.csv` file, or a directory of per-part `.npy` files
        input: PathBuf,

        /// Output `.npy`/`.csv` file
        output: PathBuf,

        #[arg(long, default_value = "190")]
        target_frames: usize,

        #[arg(long, default_value = "1.0")]
        sigma: f64,

        #[arg(long, default_value = "3.0")]
        threshold: f64,
    },

    /// Write a randomly perturbed copy of one landmark sequence
    Augment {
        input: PathBuf,
        output: PathBuf,

        /// Seed for a reproducible perturbation
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        options: AugmentArgs,
    },

    /// Dataset-wide landmark jobs
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Map a gloss between namespaces (psl, english, wlasl_video)
    Gloss {
        gloss: String,

        #[arg(long, default_value = "psl")]
        from: String,

        #[arg(long, default_value = "english")]
        to: String,
    },

    /// Show the effective configuration and asset status
    Info,
}

#[derive(Subcommand)]
enum BatchCommands {
    /// Preprocess `landmarks_complete.npy` of every dataset row
    Preprocess {
        /// Dataset index (CSV or filtered WLASL JSON)
        #[arg(long)]
        dataset: PathBuf,

        /// Directory of `<video_name>/` landmark folders
        #[arg(long)]
        landmarks_dir: PathBuf,

        #[arg(long, default_value = "190")]
        target_frames: usize,

        #[arg(long, default_value = "1.0")]
        sigma: f64,

        #[arg(long, default_value = "3.0")]
        threshold: f64,
    },

    /// Fill rows without landmarks with augmented copies of rows with them
    Augment {
        #[arg(long)]
        dataset: PathBuf,

        #[arg(long)]
        landmarks_dir: PathBuf,

        /// Targets filled from each source
        #[arg(long, default_value = "1")]
        per_source: usize,

        #[command(flatten)]
        options: AugmentArgs,
    },
}

#[derive(clap::Args)]
struct AugmentArgs {
    /// Maximum rotation in degrees
    #[arg(long, default_value = "10.0")]
    rotation_angle: f64,

    #[arg(long, default_value = "1.1")]
    scale_factor: f64,

    #[arg(long, default_value = "0.01")]
    noise_std: f64,

    #[arg(long, default_value = "0.1")]
    frame_drop_prob: f64,
}

impl From<AugmentArgs> for AugmentConfig {
    fn from(args: AugmentArgs) -> Self {
        Self {
            rotation_angle: args.rotation_angle,
            scale_factor: args.scale_factor,
            noise_std: args.noise_std,
            frame_drop_prob: args.frame_drop_prob,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MudraConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => MudraConfig::from_env()?,
    };

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Translate {
            text,
            text_lang,
            sign_lang,
            format,
            choose,
            output,
            overwrite,
        } => {
            let mut config = config;
            if let Some(lang) = text_lang {
                config.translation.text_language = lang.parse()?;
            }
            if let Some(lang) = sign_lang {
                config.translation.sign_language = lang.parse()?;
            }
            if let Some(format) = format {
                config.translation.sign_format = format.parse()?;
            }
            translate(&config, &text, &choose, output.as_deref(), overwrite)?;
        }
        Commands::Preprocess {
            input,
            output,
            target_frames,
            sigma,
            threshold,
        } => {
            let options = PreprocessConfig {
                target_frames,
                sigma,
                threshold,
            };
            let landmarks = load_input(&input)?;
            let processed = preprocess_landmarks(&landmarks, &options)?;
            write_landmarks(&output, &processed)?;
            println!(
                "✅ {} frames -> {} frames: {}",
                landmarks.dim().0,
                processed.dim().0,
                output.display()
            );
        }
        Commands::Augment {
            input,
            output,
            seed,
            options,
        } => {
            let options = AugmentConfig::from(options);
            let landmarks = load_input(&input)?;
            let augmented = match seed {
                Some(seed) => {
                    augment_with_rng(&landmarks, &options, &mut StdRng::seed_from_u64(seed))?
                }
                None => augment_landmarks(&landmarks, &options)?,
            };
            write_landmarks(&output, &augmented)?;
            println!(
                "✅ {} frames -> {} frames: {}",
                landmarks.dim().0,
                augmented.dim().0,
                output.display()
            );
        }
        Commands::Batch(cmd) => handle_batch_command(cmd)?,
        Commands::Gloss { gloss, from, to } => {
            let source: GlossSpace = from.parse()?;
            let target: GlossSpace = to.parse()?;
            let mapper = load_mapper(&config)?;
            let mapped = mapper.map(source, target, &gloss);
            if mapped.is_empty() {
                bail!("no {} gloss for {} '{}'", target, source, gloss);
            }
            for gloss in mapped {
                println!("{}", gloss);
            }
        }
        Commands::Info => show_info(&config),
    }

    Ok(())
}

/// Translate `text`, applying `--choose` answers to ambiguity interrupts
fn translate(
    config: &MudraConfig,
    text: &str,
    choose: &[String],
    output: Option<&Path>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let choices = parse_choices(choose)?;

    if let Some(path) = output {
        if path.exists() && !overwrite {
            bail!("{} exists (pass --overwrite to replace it)", path.display());
        }
    }

    let engine = ConcatenativeSynthesis::from_mudra_config(config)?;
    let mut text = text.to_string();
    let mut answered = HashSet::new();

    let sign = loop {
        match engine.translate(&text)? {
            TranslationOutcome::Translated(sign) => break sign,
            TranslationOutcome::NeedsDisambiguation(request) => {
                let word = request.word.to_lowercase();
                match choices.get(&word) {
                    Some(choice) if answered.insert(word.clone()) => {
                        debug!("Resolving '{}' as '{}'", request.word, choice);
                        text = request.apply(&text, choice)?;
                    }
                    _ => {
                        println!("'{}' has several signs:", request.word);
                        for candidate in &request.candidates {
                            println!("  {}", candidate);
                        }
                        bail!(
                            "'{}' is ambiguous; pass --choose {}=<form>",
                            request.word,
                            request.word
                        );
                    }
                }
            }
        }
    };

    println!("Sign: {}", sign.name());
    println!("Length: {}", sign.len());
    if !sign.skipped().is_empty() {
        println!("Skipped: {}", sign.skipped().join(", "));
    }

    if let Some(path) = output {
        sign.save_with(path, &VideoEncoder::from_config(&engine.config().video))?;
        println!("✅ Saved {}", path.display());
    }
    Ok(())
}

/// `word=form` pairs keyed by the lower-cased word
fn parse_choices(choose: &[String]) -> anyhow::Result<HashMap<String, String>> {
    choose
        .iter()
        .map(|pair| -> anyhow::Result<(String, String)> {
            let (word, form) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("--choose expects WORD=FORM, got '{}'", pair))?;
            if word.trim().is_empty() || form.trim().is_empty() {
                bail!("--choose expects WORD=FORM, got '{}'", pair);
            }
            Ok((word.trim().to_lowercase(), form.trim().to_string()))
        })
        .collect()
}

fn load_input(input: &Path) -> anyhow::Result<Landmarks> {
    let landmarks = if input.is_dir() {
        read_parts_dir(input)?
    } else {
        read_landmarks(input)?
    };
    Ok(landmarks)
}

fn load_mapper(config: &MudraConfig) -> anyhow::Result<Arc<GlossMapper>> {
    let mapper = GlossMapper::load(
        config.assets.gloss_mapping_path(),
        config.assets.dataset_index_path(),
    )?;
    Ok(Arc::new(mapper))
}

fn handle_batch_command(cmd: BatchCommands) -> anyhow::Result<()> {
    let report = match cmd {
        BatchCommands::Preprocess {
            dataset,
            landmarks_dir,
            target_frames,
            sigma,
            threshold,
        } => {
            let index = DatasetIndex::load(&dataset)?;
            let options = PreprocessConfig {
                target_frames,
                sigma,
                threshold,
            };
            preprocess_dataset(&index, &landmarks_dir, &options)?
        }
        BatchCommands::Augment {
            dataset,
            landmarks_dir,
            per_source,
            options,
        } => {
            let index = DatasetIndex::load(&dataset)?;
            augment_dataset(&index, &landmarks_dir, per_source, &options.into())?
        }
    };
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("✅ Processed: {}", report.processed);
    if !report.failed.is_empty() {
        println!("⚠️  Failed: {}", report.failed.len());
        for name in &report.failed {
            println!("  {}", name);
        }
    }
}

fn show_info(config: &MudraConfig) {
    let synthesis = SynthesisConfig::from_core(config);
    println!("Mudra {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Translation:");
    println!("  text language:  {}", config.translation.text_language);
    println!("  sign language:  {}", config.translation.sign_language);
    println!("  sign format:    {}", config.translation.sign_format);
    println!("  miss policy:    {:?}", config.translation.miss_policy);
    println!();
    println!("Assets:");
    println!("  gloss mapping:  {}", config.assets.gloss_mapping_path().display());
    println!("  dataset index:  {}", config.assets.dataset_index_path().display());
    println!("  landmarks:      {}", synthesis.layout.landmarks_dir.display());
    println!("  videos:         {}", synthesis.layout.videos_dir.display());
    println!();

    match load_mapper(config) {
        Ok(mapper) => println!(
            "Glosses: {} English, {} PSL",
            mapper.gloss_count(),
            mapper.psl_glosses().len()
        ),
        Err(e) => println!("Glosses: unavailable ({})", e),
    }

    let encoder = VideoEncoder::from_config(&synthesis.video);
    if encoder.is_available() {
        println!("ffmpeg: available");
    } else {
        println!("ffmpeg: not found (video output disabled)");
    }
    if let Err(e) = config.validate() {
        info!("Configuration is invalid: {}", e);
        println!("⚠️  Configuration is invalid: {}", e);
    }
}
