use clap::{CommandFactory, Parser, ValueEnum};
use log::debug;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use sumie_apiframe::{
    ApiframeClient, ApiframeError, DEFAULT_POLL_INTERVAL, ImagineService, PollConfig, PollOutcome,
    TaskStatus, poll_until_terminal,
};
use sumie_art::{
    ArtError, InterviewMode, PromptParams, apply_art_direction, build_prompt, templates,
};
use sumie_assets::{AssetNameContext, DownloadError, download_all};
use sumie_config::{Config, ConfigError, load_or_init, save};
use thiserror::Error;

const PROMPT_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Art(#[from] ArtError),
    #[error(transparent)]
    Api(#[from] ApiframeError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("'{kind}' requires --prompt <TEXT>")]
    MissingPrompt { kind: &'static str },
    #[error("no API key configured; set APIFRAME_API_KEY or run `sumie --set-api-key <KEY>`")]
    MissingApiKey,
    #[error("generation failed: {reason}")]
    GenerationFailed { reason: String },
    #[error("generation timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}

/// sumie CLI entry point.
///
/// Generates brand assets for the interview platform by driving the APIframe
/// Midjourney proxy with a catalog of art-direction prompt templates.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sumie",
    author,
    version,
    about = "Generate art-direction assets via the APIframe Midjourney API.",
    long_about = None
)]
struct Cli {
    /// Template name from the catalog, or `custom`/`raw` for ad-hoc prompts.
    #[arg(value_name = "TEMPLATE")]
    template: Option<String>,
    /// Prompt text for the `custom` and `raw` templates.
    #[arg(short, long, value_name = "TEXT")]
    prompt: Option<String>,
    /// Aspect ratio for `custom`/`raw` prompts; catalog templates carry their own.
    #[arg(
        long = "ar",
        visible_alias = "aspect-ratio",
        value_name = "RATIO",
        default_value = "1:1"
    )]
    aspect_ratio: String,
    /// Feature name substituted into templates that require one.
    #[arg(short, long, value_name = "NAME")]
    feature: Option<String>,
    /// Interview pairing rendered by the mode-specific templates.
    #[arg(short, long, value_enum, default_value_t = InterviewMode::HumanHuman)]
    mode: InterviewMode,
    /// Print the generated image URLs instead of downloading them.
    #[arg(long)]
    no_download: bool,
    /// Prefix for downloaded asset filenames; defaults to the template name.
    #[arg(short, long, value_name = "PREFIX")]
    output_prefix: Option<String>,
    /// Give up polling after this many seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    timeout: u64,
    /// List available templates and exit.
    #[arg(short, long)]
    list: bool,
    /// Set the APIframe API key persisted in the sumie config file.
    #[arg(long, value_name = "KEY")]
    set_api_key: Option<String>,
}

fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();

    if let Err(error) = run(&cli) {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.list {
        print!("{}", render_catalog());
        return Ok(());
    }

    let outcome = load_or_init()?;
    if outcome.created {
        eprintln!("Created sumie configuration at {}", outcome.path.display());
    }
    let mut config = outcome.config;

    if let Some(key) = cli.set_api_key.as_deref() {
        config.api_key = key.to_string();
        save(&config, &outcome.path)?;
        eprintln!("Updated API key in {}", outcome.path.display());
        if cli.template.is_none() {
            return Ok(());
        }
    }

    if cli.template.is_none() {
        let _ = Cli::command().print_help();
        println!();
        print!("{}", render_catalog());
        return Ok(());
    }

    config.apply_env();
    if !config.has_api_key() {
        return Err(CliError::MissingApiKey);
    }

    let request = prepare_request(cli)?;
    debug!(
        "prepared prompt ({} chars) at aspect ratio {}",
        request.prompt.len(),
        request.aspect_ratio
    );

    let client = ApiframeClient::new(&config.base_url, &config.api_key)?;
    generate(&client, &config, cli, &request)
}

/// What one invocation asks the generator for, resolved from the CLI
/// arguments before any network traffic happens.
#[derive(Debug, Clone, PartialEq)]
struct GenerationRequest {
    template: String,
    prompt: String,
    aspect_ratio: String,
    output_prefix: String,
}

fn prepare_request(cli: &Cli) -> Result<GenerationRequest, CliError> {
    let template = cli.template.as_deref().unwrap_or_default();

    let (prompt, aspect_ratio) = match template {
        "custom" => {
            let text = required_prompt(cli, "custom")?;
            (apply_art_direction(text), cli.aspect_ratio.clone())
        }
        "raw" => (
            required_prompt(cli, "raw")?.to_string(),
            cli.aspect_ratio.clone(),
        ),
        name => {
            let params = PromptParams {
                feature: cli.feature.as_deref(),
                mode: Some(cli.mode),
            };
            let built = build_prompt(name, &params)?;
            (built.text, built.aspect_ratio.to_string())
        }
    };

    let output_prefix = cli
        .output_prefix
        .clone()
        .unwrap_or_else(|| template.to_string());

    Ok(GenerationRequest {
        template: template.to_string(),
        prompt,
        aspect_ratio,
        output_prefix,
    })
}

fn required_prompt<'a>(cli: &'a Cli, kind: &'static str) -> Result<&'a str, CliError> {
    cli.prompt
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(CliError::MissingPrompt { kind })
}

fn generate(
    service: &dyn ImagineService,
    config: &Config,
    cli: &Cli,
    request: &GenerationRequest,
) -> Result<(), CliError> {
    let preview: String = request.prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    eprintln!(
        "Generating '{}' (aspect ratio {})",
        request.template, request.aspect_ratio
    );
    eprintln!("  Prompt: {preview}...");

    let task_id = service.submit(&request.prompt, &request.aspect_ratio)?;
    eprintln!("  Task: {task_id}");

    let poll = PollConfig {
        timeout: Duration::from_secs(cli.timeout),
        interval: DEFAULT_POLL_INTERVAL,
    };
    let outcome = poll_until_terminal(service, &task_id, &poll, |status| {
        eprint!(
            "\r  Status: {} ({}%)",
            status.status,
            status.percentage_display()
        );
        let _ = io::stderr().flush();
    });
    eprintln!();

    let status = match outcome {
        PollOutcome::Completed(status) => status,
        PollOutcome::Failed(status) => {
            return Err(CliError::GenerationFailed {
                reason: describe_failure(&status),
            });
        }
        PollOutcome::TimedOut => {
            return Err(CliError::TimedOut {
                seconds: cli.timeout,
            });
        }
    };

    let urls = status.resolve_image_urls();
    if urls.is_empty() {
        return Err(DownloadError::NoImages.into());
    }
    eprintln!("Generation complete: {} image(s)", urls.len());

    if cli.no_download {
        for url in &urls {
            println!("{url}");
        }
        return Ok(());
    }

    let names = AssetNameContext::new(&request.output_prefix);
    let output_dir = PathBuf::from(&config.output_dir);
    match download_all(&urls, &output_dir, &names) {
        Ok(paths) => {
            eprintln!(
                "Downloaded {} asset(s) to {}",
                paths.len(),
                output_dir.display()
            );
            for path in &paths {
                println!("{}", path.display());
            }
            Ok(())
        }
        Err(error) => {
            if let DownloadError::Incomplete { saved, .. } = &error {
                for path in saved {
                    println!("{}", path.display());
                }
            }
            Err(error.into())
        }
    }
}

fn describe_failure(status: &TaskStatus) -> String {
    match status.message.as_deref() {
        Some(message) => format!("{} ({message})", status.status),
        None => status.status.clone(),
    }
}

fn render_catalog() -> String {
    let mut out = String::from("Available templates:\n");
    for template in templates() {
        let requires = if template.requires.is_empty() {
            String::new()
        } else {
            let flags = template
                .requires
                .iter()
                .map(|required| format!("--{}", required.flag()))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" (requires: {flags})")
        };
        out.push_str(&format!(
            "  {:<20} {:<8} - {}{}\n",
            template.name, template.aspect_ratio, template.description, requires
        ));
    }

    let modes = InterviewMode::value_variants()
        .iter()
        .filter_map(|mode| mode.to_possible_value())
        .map(|value| value.get_name().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("\nInterview banner modes: {modes}\n"));
    out
}
