//! CLI binary for pdftranslate.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `TranslationConfig` and writes the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdftranslate::backend::mock::MockBackend;
use pdftranslate::bundle::output_file_name;
use pdftranslate::{
    inspect_file, translate_pdf_to_file, BackendConfig, BackendKind, ErrorCategory, LlmConfig,
    MachineConfig, PageLayout, TranslateError, TranslationConfig,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Japanese PDF to Spanish with the machine-translation backend
  pdftranslate document.pdf --target es

  # Same, via an LLM, with the record bundled alongside the PDF
  pdftranslate document.pdf --backend llm --target Spanish --bundle

  # A4 output to a chosen path
  pdftranslate document.pdf -t fr --profile a4 -o out/document_fr.pdf

  # Check what pdfium extracts (no backend, no API key)
  pdftranslate --inspect-only document.pdf

  # Exercise the whole pipeline without calling any service
  pdftranslate document.pdf -t de --dry-run --json

  # Show the accepted target languages for a backend
  pdftranslate --list-languages --backend llm

ENVIRONMENT VARIABLES:
  GOOGLE_TRANSLATE_API_KEY  API key for the machine backend
  PDFTRANSLATE_ENDPOINT     Machine-translation endpoint URL
  OPENAI_API_KEY            OpenAI API key (llm backend)
  ANTHROPIC_API_KEY         Anthropic API key (llm backend)
  EDGEQUAKE_PROVIDER        LLM provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL           LLM model ID
  PDFIUM_LIB_PATH           Path to libpdfium (file or directory)
  PDFTRANSLATE_FONT         TrueType/OpenType font embedded in the output

FONTS:
  The standard PDF fonts only cover Western European text. For Russian,
  Chinese, Japanese, Korean and other scripts pass --font with a .ttf/.otf
  that covers the target script (e.g. NotoSansCJK, DejaVuSans).

EXIT CODES:
  0   success
  1   other failure (bad arguments, unreadable prompt file, ...)
  3   no extractable text in the PDF
  4   unsupported target language
  10  source could not be read
  11  PDF could not be parsed or decrypted
  12  translation backend failed
  13  output could not be rendered or written
  14  configuration error
  15  internal error

OUTPUT:
  Without --output the result is written to the current directory as
  translated_document_<target>.pdf, or translated_document_<target>.zip
  with --bundle.
"#;

/// Translate the text of a PDF and re-render it as a new PDF.
#[derive(Parser, Debug)]
#[command(
    name = "pdftranslate",
    version,
    about = "Translate the text of a PDF and re-render it as a new PDF",
    long_about = "Extract the text layer of a PDF, translate it with a machine-translation \
service or an LLM, and lay the translation out on fresh pages. Source formatting, images \
and columns are not preserved.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source PDF file.
    #[arg(required_unless_present = "list_languages")]
    input: Option<PathBuf>,

    /// Target language: a code (es, zh-CN) or display name (Spanish).
    #[arg(
        short,
        long,
        env = "PDFTRANSLATE_TARGET",
        required_unless_present_any = ["list_languages", "inspect_only"]
    )]
    target: Option<String>,

    /// Translation backend.
    #[arg(short, long, env = "PDFTRANSLATE_BACKEND", value_enum, default_value = "machine")]
    backend: BackendArg,

    /// Source language. Default: ja (machine) / Japanese (llm).
    #[arg(short, long, env = "PDFTRANSLATE_SOURCE")]
    source: Option<String>,

    /// Write output to this file.
    #[arg(short, long, env = "PDFTRANSLATE_OUTPUT")]
    output: Option<PathBuf>,

    /// Write a zip with the PDF and a JSON translation record.
    #[arg(long, env = "PDFTRANSLATE_BUNDLE")]
    bundle: bool,

    /// Output page profile.
    #[arg(long, env = "PDFTRANSLATE_PROFILE", value_enum, default_value = "letter")]
    profile: ProfileArg,

    /// Maximum characters per backend request.
    #[arg(long, env = "PDFTRANSLATE_CHUNK_CHARS", default_value_t = pdftranslate::config::DEFAULT_MAX_CHUNK_CHARS)]
    chunk_chars: usize,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID. Default: gpt-4.1-nano.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Path to a text file with a custom system prompt ({source}/{target} placeholders).
    #[arg(long, env = "PDFTRANSLATE_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDFTRANSLATE_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per chunk.
    #[arg(long, env = "PDFTRANSLATE_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// API key for the machine-translation backend.
    #[arg(long, env = "GOOGLE_TRANSLATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Machine-translation endpoint URL.
    #[arg(long, env = "PDFTRANSLATE_ENDPOINT")]
    endpoint: Option<String>,

    /// HTTP timeout for machine-translation requests, in seconds.
    #[arg(long, env = "PDFTRANSLATE_TIMEOUT")]
    timeout: Option<u64>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFTRANSLATE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// TrueType/OpenType font to embed; required for non-Latin targets.
    #[arg(long, env = "PDFTRANSLATE_FONT")]
    font: Option<PathBuf>,

    /// Print the accepted target languages and exit.
    #[arg(long)]
    list_languages: bool,

    /// Print page count and extracted characters per page, no translation.
    #[arg(long)]
    inspect_only: bool,

    /// Use an in-process echo backend instead of a real service.
    #[arg(long)]
    dry_run: bool,

    /// Print run statistics as JSON on stdout.
    #[arg(long, env = "PDFTRANSLATE_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDFTRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFTRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFTRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Machine,
    Llm,
}

impl From<BackendArg> for BackendKind {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Machine => BackendKind::Machine,
            BackendArg::Llm => BackendKind::Llm,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Letter,
    A4,
}

impl From<ProfileArg> for PageLayout {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Letter => PageLayout::letter(),
            ProfileArg::A4 => PageLayout::a4(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = ErrorReport::from_error(&err);
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("{}", report.message),
                }
            } else {
                let label = match report.category {
                    Some(category) => format!("error[{category}]"),
                    None => "error".to_string(),
                };
                eprintln!("{}: {}", red(&bold(&label)), report.message);
            }
            ExitCode::from(exit_code(report.category))
        }
    }
}

/// What the user sees when a run fails.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport {
    /// None when the failure happened outside the library (CLI arguments).
    category: Option<ErrorCategory>,
    message: String,
    user_correctable: bool,
}

impl ErrorReport {
    fn from_error(err: &anyhow::Error) -> Self {
        let typed = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<TranslateError>());
        Self {
            category: typed.map(TranslateError::category),
            message: format!("{err:#}"),
            user_correctable: typed.is_some_and(TranslateError::is_user_correctable),
        }
    }
}

/// Process exit status for a failure. User-correctable categories sit
/// below 10, everything else at 10 and above.
fn exit_code(category: Option<ErrorCategory>) -> u8 {
    match category {
        None => 1,
        Some(ErrorCategory::EmptyContent) => 3,
        Some(ErrorCategory::UnsupportedLanguage) => 4,
        Some(ErrorCategory::SourceRead) => 10,
        Some(ErrorCategory::Extraction) => 11,
        Some(ErrorCategory::TranslationBackend) => 12,
        Some(ErrorCategory::Render) => 13,
        Some(ErrorCategory::Configuration) => 14,
        Some(ErrorCategory::Internal) => 15,
    }
}

async fn run(cli: Cli) -> Result<()> {

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs; --verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;

    // ── List languages ───────────────────────────────────────────────────
    if cli.list_languages {
        if cli.json {
            let langs: Vec<_> = config.languages.iter().collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&langs).context("Failed to serialize languages")?
            );
        } else {
            for lang in config.languages.iter() {
                println!("{:<24} {}", lang.display_name, lang.code);
            }
        }
        return Ok(());
    }

    let input = cli
        .input
        .as_deref()
        .context("An input PDF is required")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect_file(input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize document info")?
            );
        } else {
            println!("File:         {}", input.display());
            println!("Pages:        {}", info.page_count);
            println!("Text chars:   {}", info.total_chars());
            println!("Output lines: {} per page", config.layout.lines_per_page());
            for (i, chars) in info.chars_per_page.iter().enumerate() {
                println!("  page {:>4}:  {}", i + 1, chars);
            }
            if info.is_blank() {
                println!("No text layer found; this document cannot be translated without OCR.");
            }
        }
        return Ok(());
    }

    // ── Resolve target ───────────────────────────────────────────────────
    let requested = cli.target.as_deref().context("--target is required")?;
    // Display names resolve to codes; unknown input passes through so the
    // library reports it with the supported list.
    let target = config
        .languages
        .resolve(requested)
        .unwrap_or(requested)
        .to_string();

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output_file_name(&target, config.bundle)));

    // ── Run translation ──────────────────────────────────────────────────
    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Translating");
        bar.set_message(format!("{} → {}", input.display(), target));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = translate_pdf_to_file(input, &output_path, &target, &config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let stats = result.with_context(|| format!("Translation of {} failed", input.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} page(s) → {} page(s)  {}ms  →  {}",
            green("✔"),
            stats.source_pages,
            stats.output_pages,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} chars in {} chunk(s), {} line(s) rendered",
                stats.extracted_chars, stats.chunks, stats.translated_lines
            )),
        );
    }

    Ok(())
}

/// Map CLI args to `TranslationConfig`.
async fn build_config(cli: &Cli) -> Result<TranslationConfig> {
    let backend = match BackendKind::from(cli.backend) {
        BackendKind::Machine => {
            let mut machine = MachineConfig {
                api_key: cli.api_key.clone(),
                timeout_secs: cli.timeout,
                ..Default::default()
            };
            if let Some(ref endpoint) = cli.endpoint {
                machine.endpoint = endpoint.clone();
            }
            BackendConfig::Machine(machine)
        }
        BackendKind::Llm => {
            let system_prompt = if let Some(ref path) = cli.system_prompt {
                Some(
                    tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
                )
            } else {
                None
            };
            BackendConfig::Llm(LlmConfig {
                provider_name: cli.provider.clone(),
                model: cli.model.clone(),
                temperature: cli.temperature,
                max_tokens: cli.max_tokens,
                system_prompt,
                ..Default::default()
            })
        }
    };

    let mut builder = TranslationConfig::builder()
        .backend(backend)
        .max_chunk_chars(cli.chunk_chars)
        .layout(cli.profile.into())
        .bundle(cli.bundle);

    if let Some(ref source) = cli.source {
        builder = builder.source_language(source.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path.clone());
    }
    if let Some(ref path) = cli.font {
        builder = builder.font_path(path.clone());
    }
    if cli.dry_run {
        builder = builder.backend_override(Arc::new(MockBackend::echo()));
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let categories = [
            ErrorCategory::SourceRead,
            ErrorCategory::Extraction,
            ErrorCategory::EmptyContent,
            ErrorCategory::UnsupportedLanguage,
            ErrorCategory::TranslationBackend,
            ErrorCategory::Render,
            ErrorCategory::Configuration,
            ErrorCategory::Internal,
        ];
        let mut codes: Vec<u8> = categories.iter().map(|c| exit_code(Some(*c))).collect();
        codes.push(exit_code(None));
        let count = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), count);
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&2), "2 is clap's usage error");
    }

    #[test]
    fn user_correctable_errors_exit_below_ten() {
        assert!(exit_code(Some(ErrorCategory::EmptyContent)) < 10);
        assert!(exit_code(Some(ErrorCategory::UnsupportedLanguage)) < 10);
        assert!(exit_code(Some(ErrorCategory::TranslationBackend)) >= 10);
    }

    #[test]
    fn report_finds_library_error_under_context() {
        let err = anyhow::Error::new(TranslateError::UnsupportedLanguage {
            code: "tlh".into(),
            supported: vec!["en".into(), "es".into()],
        })
        .context("Translation of doc.pdf failed");

        let report = ErrorReport::from_error(&err);
        assert_eq!(report.category, Some(ErrorCategory::UnsupportedLanguage));
        assert!(report.user_correctable);
        assert!(report.message.starts_with("Translation of doc.pdf failed: "));
        assert!(report.message.contains("tlh"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["category"], "unsupported_language");
        assert_eq!(json["userCorrectable"], true);
    }

    #[test]
    fn report_for_untyped_error_has_no_category() {
        let err = anyhow::anyhow!("An input PDF is required");
        let report = ErrorReport::from_error(&err);
        assert_eq!(report.category, None);
        assert!(!report.user_correctable);
        assert_eq!(exit_code(report.category), 1);

        let err = anyhow::Error::new(TranslateError::FileNotFound {
            path: PathBuf::from("missing.pdf"),
        });
        assert_eq!(exit_code(ErrorReport::from_error(&err).category), 10);
    }

    #[test]
    fn font_flag_reaches_config() {
        let cli = Cli::parse_from(["pdftranslate", "doc.pdf", "-t", "ru", "--font", "/f/Noto.ttf"]);
        assert_eq!(cli.font, Some(PathBuf::from("/f/Noto.ttf")));
    }
}
