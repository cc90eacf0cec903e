use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use visionai_core::{announce_time, classify, explain, ProfileSet};
use visionai_ocr::{
    Language, OcrBackend, ReadMode, ReaderPipeline, ScanOutcome, ScanReport, SCAN_FAILED_MESSAGE,
};

mod config;

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "visionai")]
#[command(about = "Reads currency notes, documents and the time aloud")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "VISIONAI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify recognized text as a currency note. Reads stdin without TEXT.
    Classify {
        text: Option<String>,
        /// Show every profile's score
        #[arg(long)]
        explain: bool,
        #[arg(long)]
        json: bool,
    },
    /// Recognize an image and report on it
    Scan {
        image: PathBuf,
        #[arg(long)]
        mode: Option<ReadMode>,
        #[arg(long)]
        lang: Option<Language>,
        /// Speak the whole report instead of its first line
        #[arg(long)]
        read_all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Scan every image dropped into a folder
    Watch {
        dir: PathBuf,
        #[arg(long)]
        mode: Option<ReadMode>,
        #[arg(long)]
        lang: Option<Language>,
        /// Speak the whole report instead of its first line
        #[arg(long)]
        read_all: bool,
    },
    /// Announce the current local time
    Time,
    /// List the active currency profiles
    Profiles,
    /// List the recognition languages
    Languages,
}

#[derive(Debug, Serialize)]
struct ScanOutput<'a> {
    scan_id: &'a str,
    language: Language,
    report: &'a ScanReport,
    speech: &'a str,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let profiles = config.load_profiles().context("failed to load currency profiles")?;

    match cli.command {
        Command::Classify { text, explain, json } => {
            let text = match text {
                Some(t) => t,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read text from stdin")?;
                    buf
                }
            };
            run_classify(&text, &profiles, explain, json)?;
        }
        Command::Scan { image, mode, lang, read_all, json } => {
            let mode = mode.unwrap_or(config.mode);
            let lang = mode.language(lang.unwrap_or(config.language));
            let pipeline = build_pipeline(&config, profiles, lang);
            match pipeline.process_file(&image, mode).await {
                Ok(outcome) => print_outcome(&outcome, lang, read_all, json)?,
                Err(e) => {
                    println!("{SCAN_FAILED_MESSAGE}");
                    return Err(e).with_context(|| format!("failed to scan {}", image.display()));
                }
            }
        }
        Command::Watch { dir, mode, lang, read_all } => {
            let mode = mode.unwrap_or(config.mode);
            let lang = mode.language(lang.unwrap_or(config.language));
            let pipeline = build_pipeline(&config, profiles, lang);
            run_watch(&dir, &pipeline, mode, lang, read_all).await?;
        }
        Command::Time => {
            let line = announce_time(&chrono::Local::now());
            println!("{line}");
            speak(&line, config.language);
        }
        Command::Profiles => {
            for p in profiles.as_slice() {
                println!(
                    "{}\n  symbols:       {}\n  denominations: {}\n  keywords:      {}",
                    p.code,
                    p.symbols.join(", "),
                    p.denominations.join(", "),
                    p.keywords.join(", ")
                );
            }
        }
        Command::Languages => {
            for line in language_lines(config.language) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn run_classify(text: &str, profiles: &ProfileSet, show_scores: bool, json: bool) -> Result<()> {
    let result = classify(text, profiles.as_slice());

    if json {
        let out = if show_scores {
            serde_json::json!({ "result": result, "scores": explain(text, profiles.as_slice()) })
        } else {
            serde_json::to_value(&result)?
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if show_scores {
        for s in explain(text, profiles.as_slice()) {
            println!(
                "{:<4} score={:<3} confidence={:>6.1}% denomination={}{}",
                s.currency,
                s.score,
                s.confidence,
                s.denomination.as_deref().unwrap_or("-"),
                if s.qualifies() { "  (qualifies)" } else { "" }
            );
        }
    }
    match result {
        Some(r) => println!(
            "{} {} ({:.1}% confidence)",
            r.currency, r.denomination, r.confidence
        ),
        None => println!("{}", visionai_ocr::NOT_FOUND_MESSAGE),
    }
    Ok(())
}

fn build_pipeline(
    config: &AppConfig,
    profiles: ProfileSet,
    lang: Language,
) -> ReaderPipeline<Box<dyn OcrBackend>> {
    let pipeline = ReaderPipeline::new(build_recognizer(config, lang), profiles);
    match &config.archive_dir {
        Some(dir) => pipeline.with_archive(dir.clone()),
        None => pipeline,
    }
}

#[cfg(feature = "tesseract")]
fn build_recognizer(config: &AppConfig, lang: Language) -> Box<dyn OcrBackend> {
    let data_path = config.tessdata.as_ref().map(|p| p.display().to_string());
    Box::new(visionai_ocr::TesseractRecognizer::new(data_path, lang))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_config: &AppConfig, _lang: Language) -> Box<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature; image scans will fail");
    Box::new(visionai_ocr::UnavailableRecognizer)
}

const SETTLE_POLL: Duration = Duration::from_millis(250);
const SETTLE_MAX_POLLS: u32 = 40;

async fn run_watch(
    dir: &Path,
    pipeline: &ReaderPipeline<Box<dyn OcrBackend>>,
    mode: ReadMode,
    lang: Language,
    read_all: bool,
) -> Result<()> {
    // Captures are handled one at a time in arrival order.
    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    let _watcher = visionai_ocr::spawn_intake_watcher(dir, tx)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    tracing::info!("Watching for captures in {}", dir.display());

    loop {
        tokio::select! {
            Some(path) = rx.recv() => {
                let settled =
                    visionai_ocr::pipeline::wait_until_settled(&path, SETTLE_POLL, SETTLE_MAX_POLLS)
                        .await;
                if let Err(e) = settled {
                    tracing::warn!("skipping {}: {e}", path.display());
                    continue;
                }
                tracing::info!("Scanning {}", path.display());
                match pipeline.process_file(&path, mode).await {
                    Ok(outcome) => print_outcome(&outcome, lang, read_all, false)?,
                    Err(e) => {
                        tracing::warn!("scan of {} failed: {e}", path.display());
                        println!("{SCAN_FAILED_MESSAGE}");
                        speak(SCAN_FAILED_MESSAGE, lang);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watcher");
                return Ok(());
            }
        }
    }
}

fn print_outcome(outcome: &ScanOutcome, lang: Language, read_all: bool, json: bool) -> Result<()> {
    let report = &outcome.report;
    let speech = report.speech_text(read_all);
    if json {
        let out = ScanOutput { scan_id: &outcome.scan_id, language: lang, report, speech };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", report.text);
        speak(speech, lang);
    }
    Ok(())
}

/// One row per recognition language; the configured one is starred.
fn language_lines(configured: Language) -> Vec<String> {
    Language::ALL
        .into_iter()
        .map(|lang| {
            let marker = if lang == configured { "*" } else { " " };
            format!("{marker} {:<8} {}", lang.ocr_code(), lang.display_name())
        })
        .collect()
}

/// Hands a line to the speech collaborator. Printed here; there is no
/// synthesizer in this binary.
fn speak(line: &str, lang: Language) {
    println!("\n[speak:{}] {line}", lang.speech_tag());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_listing_marks_configured() {
        let lines = language_lines(Language::French);
        assert_eq!(lines.len(), Language::ALL.len());
        assert_eq!(lines[0], "  eng      English");
        assert_eq!(lines[2], "* fra      French");
        assert_eq!(lines[4], "  chi_sim  Chinese (Simplified)");
    }

    #[test]
    fn scan_flags_parse() {
        let cli = Cli::try_parse_from([
            "visionai", "scan", "note.png", "--mode", "braille", "--lang", "deu", "--read-all",
        ])
        .unwrap();
        match cli.command {
            Command::Scan { mode, lang, read_all, .. } => {
                assert_eq!(mode, Some(ReadMode::Braille));
                assert_eq!(mode.unwrap().language(lang.unwrap()), Language::English);
                assert!(read_all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
