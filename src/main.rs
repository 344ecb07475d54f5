use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use launchpix::commands;
use launchpix::data::{load_settings_from, save_settings_to, settings_path, Settings};

/// Rocket launch image downloader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (JSON). Defaults to the per-user application directory.
    #[arg(short, long, env = "LAUNCHPIX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding launches.json, download_report.json and images/
    #[arg(short, long, env = "LAUNCHPIX_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Seconds to wait for a connection or for the next piece of a response
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the upcoming-launch feed into the data directory
    FetchLaunches {
        /// Override the feed URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Download one image per launch and write the report
    GetPictures,
    /// Print a one-line summary of the last report
    Notify,
    /// Write the effective settings to the settings file
    SaveSettings,
}

impl Args {
    /// An explicit `--config` must exist, except for `save-settings`, which creates it.
    fn settings(&self) -> Result<(Settings, PathBuf)> {
        let path = self.config.clone().unwrap_or_else(settings_path);
        if self.config.is_some() && !path.exists() && !matches!(self.command, Command::SaveSettings) {
            bail!("settings file {} does not exist", path.display());
        }
        let mut settings = load_settings_from(&path);
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        if let Some(t) = self.timeout {
            settings.timeout_secs = t;
        }
        if let Command::FetchLaunches { url: Some(url) } = &self.command {
            settings.launches_url = url.clone();
        }
        Ok((settings, path))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (settings, settings_file) = args.settings()?;
    tracing::debug!("running {:?} with {:#?}", args.command, settings);

    match args.command {
        Command::FetchLaunches { .. } => {
            commands::fetch_launches(&settings).await?;
        }
        Command::GetPictures => {
            commands::get_pictures(&settings).await?;
        }
        Command::Notify => {
            println!("{}", commands::notify(&settings)?);
        }
        Command::SaveSettings => {
            save_settings_to(&settings, &settings_file)?;
            println!("Settings saved to {}", settings_file.display());
        }
    }
    Ok(())
}
