//! `vega wizard`: the three creation steps as terminal prompts.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use vega_core::catalog::Catalog;
use vega_core::config::GenerationSettings;
use vega_core::script::PlaceholderScript;
use vega_core::wizard::{Step, Wizard};

use crate::{BOLD, CYAN, DIM, GREEN, RESET, header, print_avatar_table, success, warning};

/// First-line command in step 2 that asks for a generated script.
const GENERATE_COMMAND: &str = "/generate";

/// What the user supplied in step 2.
#[derive(Debug, PartialEq, Eq)]
enum ScriptChoice {
    Typed(String),
    Generated,
}

pub async fn run(catalog: Arc<Catalog>, settings: &GenerationSettings) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut wizard = Wizard::new(catalog);

    step_header(Step::SelectAvatar);
    print_avatar_table(wizard.catalog());
    println!();
    loop {
        prompt("Avatar id");
        let line = next_line(&mut lines).await?;
        let Ok(id) = line.trim().parse::<u32>() else {
            warning("Please enter an avatar id from the list.");
            continue;
        };
        match wizard.select_avatar(id) {
            Ok(avatar) => {
                success(&format!("Selected {BOLD}{}{RESET}", avatar.display_name));
                break;
            }
            Err(e) => warning(&e.to_string()),
        }
    }
    wizard.advance_to_script()?;

    println!();
    step_header(Step::WriteScript);
    println!("  {DIM}Type your script and finish with an empty line.{RESET}");
    println!("  {DIM}Enter {GENERATE_COMMAND} on the first line to use a generated script.{RESET}");
    match read_script(&mut lines).await? {
        ScriptChoice::Generated => {
            let text = wizard.use_generated_script(&PlaceholderScript)?;
            println!("{text}");
        }
        ScriptChoice::Typed(text) => wizard.set_script(text)?,
    }

    println!();
    step_header(Step::Generate);
    let video_uri = crate::generate(&mut wizard, settings).await?;
    success(wizard.status().headline());
    println!("  {DIM}Video:{RESET} {GREEN}{BOLD}{video_uri}{RESET}");
    Ok(())
}

fn step_header(step: Step) {
    header(&format!("Step {step}"), step.label());
}

fn prompt(label: &str) {
    print!("  {CYAN}›{RESET} {label}: ");
    let _ = std::io::stdout().flush();
}

async fn next_line<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<String> {
    lines
        .next_line()
        .await
        .context("failed to read from stdin")?
        .context("input closed before the wizard finished")
}

/// Read script lines up to the first empty line or end of input.
async fn read_script<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<ScriptChoice> {
    let mut text: Vec<String> = Vec::new();
    while let Some(line) = lines.next_line().await.context("failed to read from stdin")? {
        if text.is_empty() && line.trim() == GENERATE_COMMAND {
            return Ok(ScriptChoice::Generated);
        }
        if line.trim().is_empty() {
            break;
        }
        text.push(line);
    }
    Ok(ScriptChoice::Typed(text.join("\n")))
}
