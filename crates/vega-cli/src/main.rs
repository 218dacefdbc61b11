//! `vega` CLI: create lip-synced avatar videos from the terminal.
//!
//! Drives the same creation wizard as the server, either in one shot
//! (`vega generate`) or step by step on stdin (`vega wizard`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod interactive;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vega_core::cancel::{CancelHandle, cancel_pair};
use vega_core::catalog::{AvatarOption, Catalog};
use vega_core::client::LipsyncClient;
use vega_core::config::{CredentialSource, GenerationSettings};
use vega_core::error::GenerationError;
use vega_core::script::{PlaceholderScript, ScriptSource};
use vega_core::wizard::{GenerationStatus, Wizard};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// Vega Video: turn a script into a lip-synced avatar video.
#[derive(Parser)]
#[command(
    name = "vega",
    version,
    about = "Vega Video CLI: choose an avatar, write a script, generate a video",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         GOOEY_API_KEY           Vendor API key\n  \
         VEGA_CATALOG            JSON avatar catalog (default: built-in)\n  \
         VEGA_LIPSYNC_ENDPOINT   Vendor endpoint\n\n\
         {DIM}Examples:{RESET}\n  \
         vega avatars\n  \
         vega generate --avatar 1 --generated-script\n  \
         vega generate --avatar 2 --script-file intro.txt\n  \
         vega wizard"
    ),
)]
struct Cli {
    #[command(flatten)]
    vendor: VendorArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct VendorArgs {
    /// JSON avatar catalog to use instead of the built-in avatars.
    #[arg(long, env = "VEGA_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Lip-sync vendor endpoint.
    #[arg(long, env = "VEGA_LIPSYNC_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Vendor API key.
    #[arg(long, env = "GOOEY_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Give up on the vendor after this many seconds (default: wait).
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl VendorArgs {
    /// Environment settings with command-line overrides applied.
    fn settings(&self) -> GenerationSettings {
        let mut settings = GenerationSettings::from_env();
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint.clone_from(endpoint);
        }
        if let Some(key) = &self.api_key {
            settings.credential = CredentialSource::Fixed(key.clone());
        }
        if let Some(secs) = self.timeout.filter(|s| *s > 0) {
            settings.timeout = Some(Duration::from_secs(secs));
        }
        settings
    }

    fn catalog(&self) -> Result<Arc<Catalog>> {
        let catalog = Catalog::load_or_builtin(self.catalog.as_deref())
            .context("failed to load avatar catalog")?;
        Ok(Arc::new(catalog))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the avatars in the catalog.
    Avatars {
        /// Print the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a generated script.
    Script,
    /// Generate a video without prompting.
    Generate {
        /// Avatar id from `vega avatars`.
        #[arg(long)]
        avatar: u32,
        #[command(flatten)]
        input: ScriptInput,
    },
    /// Walk through the three steps interactively.
    Wizard,
}

/// Where the script comes from. Omitting all three sends an empty script.
#[derive(Args)]
#[group(required = false, multiple = false)]
struct ScriptInput {
    /// Script text.
    #[arg(long)]
    script: Option<String>,
    /// Read the script from a file.
    #[arg(long)]
    script_file: Option<PathBuf>,
    /// Use a generated script.
    #[arg(long)]
    generated_script: bool,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

/// Why an avatar can or cannot be used for generation.
fn readiness(avatar: &AvatarOption) -> String {
    match (&avatar.reference_video_uri, &avatar.voice_id) {
        (Some(_), Some(_)) => format!("{GREEN}ready{RESET}"),
        (None, _) => format!("{YELLOW}no reference video{RESET}"),
        (Some(_), None) => format!("{YELLOW}no voice{RESET}"),
    }
}

fn print_avatar_table(catalog: &Catalog) {
    for avatar in catalog.avatars() {
        println!(
            "  {BOLD}{:>3}{RESET}  {WHITE}{:<24}{RESET} {}",
            avatar.id,
            avatar.display_name,
            readiness(avatar)
        );
    }
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

/// Plain log lines on stderr so stdout stays clean for piping.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Avatars { json } => cmd_avatars(&*cli.vendor.catalog()?, json),
        Commands::Script => {
            println!("{}", PlaceholderScript.generate_script());
            Ok(())
        }
        Commands::Generate { avatar, input } => {
            let video_uri = cmd_generate(&cli.vendor, avatar, &input).await?;
            println!("{video_uri}");
            Ok(())
        }
        Commands::Wizard => {
            interactive::run(cli.vendor.catalog()?, &cli.vendor.settings()).await
        }
    }
}

fn cmd_avatars(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let out =
            serde_json::to_string_pretty(catalog.avatars()).context("failed to encode catalog")?;
        println!("{out}");
        return Ok(());
    }

    header("◉", "Avatars");
    print_avatar_table(catalog);
    Ok(())
}

async fn cmd_generate(vendor: &VendorArgs, avatar_id: u32, input: &ScriptInput) -> Result<String> {
    let mut wizard = Wizard::new(vendor.catalog()?);
    wizard.select_avatar(avatar_id)?;
    wizard.advance_to_script()?;

    if let Some(text) = &input.script {
        wizard.set_script(text.as_str())?;
    } else if let Some(path) = &input.script_file {
        wizard.set_script(read_script_file(path)?)?;
    } else if input.generated_script {
        wizard.use_generated_script(&PlaceholderScript)?;
    }

    generate(&mut wizard, &vendor.settings()).await
}

fn read_script_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script file {}", path.display()))
}

/// Run step 3 for a wizard sitting at step 2 and return the video URI.
///
/// Ctrl-C while waiting cancels the request; the vendor's eventual answer
/// is dropped.
async fn generate(wizard: &mut Wizard, settings: &GenerationSettings) -> Result<String> {
    let client = LipsyncClient::new(settings).context("failed to build vendor client")?;
    let (handle, token) = cancel_pair();
    let watcher = tokio::spawn(cancel_on_ctrl_c(handle));

    eprintln!("{DIM}{}{RESET}", GenerationStatus::InProgress.headline());
    let status = wizard.generate(&settings.defaults, &client, &token).await;
    watcher.abort();

    if token.is_cancelled() {
        bail!(GenerationError::Cancelled.user_message());
    }
    match status? {
        GenerationStatus::Succeeded { video_uri } => Ok(video_uri),
        GenerationStatus::Failed { message } => bail!(message),
        GenerationStatus::InProgress | GenerationStatus::Preparing => {
            bail!("video generation did not complete")
        }
    }
}

async fn cancel_on_ctrl_c(handle: CancelHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        handle.cancel();
    }
}
