use anyhow::Context;
use citycast_core::{
    Config, Coordinates, FileStore, Lookup, RecentCitiesStore, View, WeatherPresenter,
    locator_from_config, source_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use std::process::ExitCode;

use crate::render::{render, render_recent};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather and 5-day forecast by city")]
pub struct Cli {
    /// Without a subcommand, starts the interactive prompt.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print views as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and location preference.
    Configure,

    /// Show weather for a city.
    Search {
        /// City name; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Show weather for your current location.
    Here {
        /// Latitude; skips automatic location lookup.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude; skips automatic location lookup.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List recently searched cities.
    Recent {
        /// Choose one from a menu and show its weather.
        #[arg(long)]
        pick: bool,
    },

    /// Prompt for cities until `:q`.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::load()?;
        let out = Output { json: self.json };

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => {
                configure(config)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Search { city } => {
                let mut lookup = build_lookup(&config, None)?;
                Ok(out.show(&lookup.search(&city.join(" ")).await))
            }
            Command::Here { lat, lon } => {
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });
                let mut lookup = build_lookup(&config, explicit)?;
                Ok(out.show(&lookup.locate().await))
            }
            Command::Recent { pick: false } => {
                let recent = RecentCitiesStore::load(FileStore::new(Config::data_dir()?));
                print!("{}", render_recent(recent.list()));
                Ok(ExitCode::SUCCESS)
            }
            Command::Recent { pick: true } => {
                let mut lookup = build_lookup(&config, None)?;
                match pick_recent(&lookup)? {
                    Some(city) => Ok(out.show(&lookup.search_recent(&city).await)),
                    None => Ok(ExitCode::SUCCESS),
                }
            }
            Command::Interactive => {
                let mut lookup = build_lookup(&config, None)?;
                interactive(&mut lookup, out).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_lookup(
    config: &Config,
    explicit: Option<Coordinates>,
) -> anyhow::Result<Lookup<FileStore>> {
    let source = source_from_config(config)?;
    let locator = locator_from_config(config, explicit)?;
    let recent = RecentCitiesStore::load(FileStore::new(Config::data_dir()?));

    Ok(Lookup::new(source, locator, recent, WeatherPresenter::new(&config.icon_base)))
}

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn format(&self, view: &View) -> String {
        if self.json {
            // View holds only strings and numbers.
            serde_json::to_string_pretty(view).unwrap_or_default() + "\n"
        } else {
            render(view)
        }
    }

    fn show(&self, view: &View) -> ExitCode {
        print!("{}", self.format(view));
        if view.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
    }
}

/// Cancelled prompts end the current action rather than the program with an error.
fn cancelled<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let Some(api_key) = cancelled(
        Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt(),
    )?
    else {
        return Ok(());
    };

    let Some(use_ip) = cancelled(
        Confirm::new("Resolve `citycast here` from your IP address?")
            .with_default(config.location.enabled)
            .prompt(),
    )?
    else {
        return Ok(());
    };

    config.set_api_key(api_key.trim().to_string());
    config.location.enabled = use_ip;
    config.save()?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn pick_recent(lookup: &Lookup<FileStore>) -> anyhow::Result<Option<String>> {
    if lookup.recent().is_empty() {
        print!("{}", render_recent(&[]));
        return Ok(None);
    }

    let options = lookup.recent().to_vec();
    cancelled(Select::new("Recent cities:", options).prompt())
}

async fn interactive(lookup: &mut Lookup<FileStore>, out: Output) -> anyhow::Result<()> {
    loop {
        let Some(input) = cancelled(
            Text::new("City:")
                .with_help_message(":here for your location, :recent to pick, :q to quit")
                .prompt(),
        )
        .context("Failed to read input")?
        else {
            return Ok(());
        };

        let view = match input.trim() {
            ":q" | ":quit" => return Ok(()),
            ":here" => lookup.locate().await,
            ":recent" => match pick_recent(lookup)? {
                Some(city) => lookup.search_recent(&city).await,
                None => continue,
            },
            city => lookup.search(city).await,
        };

        println!("{}", out.format(&view));
    }
}
