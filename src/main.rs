use chrono::Local;
use clap::Parser;
use confluence_reminder::config::{self, ConfigError, ConfigOverrides};
use confluence_reminder::page::HttpPageSource;
use confluence_reminder::{notify, output, reminder};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confluence-reminder")]
#[command(about = "Email reminders for outdated wiki pages")]
#[command(long_about = "\
Email reminders for outdated wiki pages

Looks up every configured page through the content REST API, compares the
date of its last change with the page's maximum age, and mails the page's
recipients through the local mail relay when the page is older than that.

Example config (~/.confluence_reminder.toml):

  base_url = \"https://wiki.example.com/rest/api/content\"
  sender = \"wiki-reminder@example.com\"

  [[pages]]
  page_id = 42
  max_age = 30
  email = [\"a@example.com\", \"b@example.com\"]

Run 'confluence-reminder --gen-config' to print a documented config.")]
#[command(version)]
struct Cli {
    /// Read configuration from this file instead of ~/.confluence_reminder.toml
    #[arg(short = 'c', long = "configfile", value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Don't print status messages to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Print a stock config file with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("confluence_reminder=warn")),
        )
        .init();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    let path = cli.config_file.unwrap_or_else(config::default_config_path);
    let overrides = ConfigOverrides { quiet: cli.quiet };
    let config = match config::load_config(&path, &overrides) {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            return ExitCode::from(1);
        }
    };
    tracing::debug!(?config, path = %path.display(), "configuration loaded");

    let notifier = match notify::smtp_notifier(&config) {
        Ok(notifier) => notifier,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    let source = HttpPageSource::new(config.base_url.as_str());
    let today = Local::now().date_naive();
    let quiet = cli.quiet;

    let summary = reminder::run(&config, &source, notifier.as_ref(), today, |report| {
        if !quiet {
            output::print_page_report(report, config.verbose);
        }
    });

    if let Some(line) = output::format_summary(&summary) {
        eprintln!("{}", line);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn report_config_error(error: &ConfigError) {
    if matches!(error, ConfigError::Toml(_) | ConfigError::Validation(_)) {
        eprintln!("There is a problem in your config file!");
    }
    eprintln!("{}", error);
}
