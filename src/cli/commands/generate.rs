//! Generate command: one lecture in, one cheat sheet out.

use crate::cli::preflight;
use crate::cli::{Output, StageSpinner};
use crate::config::{Prompts, Settings};
use crate::error::CruxError;
use crate::pipeline::Pipeline;
use console::style;
use std::path::PathBuf;

/// Run the generate command.
pub async fn run_generate(
    url: &str,
    output: Option<String>,
    print: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CruxError::MissingUrl.into());
    }

    let credentials = preflight::check(&settings)?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let pipeline = Pipeline::new(&settings, &credentials, prompts)?;

    Output::info(&format!("Building cheat sheet for {}", style(url).cyan()));

    let spinner = StageSpinner::new();
    let job = pipeline.submit_with_progress(url, &spinner).await;
    spinner.finish();

    let sheet = match job?.outcome() {
        Ok(sheet) => sheet,
        Err(failure) => {
            Output::error(&failure.message);
            anyhow::bail!("{} stage failed", failure.stage);
        }
    };

    let path = output
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| PathBuf::from(sheet.filename()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &sheet.document)?;

    if print {
        println!("\n{}\n", sheet.summary);
    }

    Output::success(&format!(
        "Cheat sheet ready: {} ({} KB)",
        path.display(),
        sheet.document.len().div_ceil(1024)
    ));

    Ok(())
}
