use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use quizify::{
    cli::{self, App},
    config::{self, Settings},
    error,
    types::Track,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in to Spotify and manage the session
    Auth(AuthOptions),

    /// Manage stored playlists
    Lists(ListsOptions),

    /// Append a clip to a playlist
    AddTrack(AddTrackOptions),

    /// Play clips and reveal answers
    Quiz(QuizOptions),

    /// Show Spotify playback devices
    Devices(DevicesOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthSubcommand {
    /// Log in through the browser (OAuth PKCE)
    Login,
    /// Show whether a valid token is stored
    Status,
    /// Renew the access token with the stored refresh token
    Refresh,
    /// Forget all stored tokens
    Logout,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Manage stored playlists")]
pub struct ListsOptions {
    /// Subcommands under `lists`; lists all playlists when omitted
    #[command(subcommand)]
    pub command: Option<ListsSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListsSubcommand {
    /// Show the tracks of a playlist
    Show { name: String },
    /// Create an empty playlist and select it
    Create { name: String },
    /// Delete a playlist
    Delete { name: String },
    /// Import a playlist from a JSON URL or file, overwriting it
    Import(ImportOpts),
    /// Print a playlist as JSON
    Export {
        name: String,
        /// Single-line JSON
        #[clap(long)]
        compact: bool,
    },
    /// Select the playlist used by `quiz` and `add-track`
    Select {
        name: Option<String>,
        /// Clear the selection
        #[clap(long, conflicts_with = "name")]
        clear: bool,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOpts {
    pub name: String,

    /// Remote JSON document
    #[clap(long, conflicts_with = "file")]
    pub url: Option<String>,

    /// Local JSON file
    #[clap(long)]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct AddTrackOptions {
    /// Track URI, e.g. spotify:track:4uLU6hMCjMI75M1A2tKUQC
    pub uri: String,

    /// Clip start offset in milliseconds
    #[clap(long, default_value_t = 0)]
    pub start_ms: u64,

    /// Clip duration in milliseconds
    #[clap(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
    pub duration_ms: u64,

    /// Display name; looked up from Spotify when omitted
    #[clap(long)]
    pub name: Option<String>,

    /// Target playlist instead of the selected one
    #[clap(long)]
    pub list: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct QuizOptions {
    #[command(subcommand)]
    pub command: QuizSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum QuizSubcommand {
    /// Play the clip of track number INDEX (1-based)
    Play {
        index: usize,
        #[clap(long)]
        list: Option<String>,
    },
    /// Reveal artist and title of track number INDEX (1-based)
    Reveal {
        index: usize,
        #[clap(long)]
        list: Option<String>,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct DevicesOptions {
    /// Keep polling and print status changes
    #[clap(long)]
    watch: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    };
    let app = match App::new(settings) {
        Ok(app) => app,
        Err(e) => error!("{}", e),
    };

    match cli.command {
        Command::Auth(opt) => match opt.command {
            AuthSubcommand::Login => cli::login(&app).await,
            AuthSubcommand::Status => cli::status(&app).await,
            AuthSubcommand::Refresh => cli::refresh(&app).await,
            AuthSubcommand::Logout => cli::logout(&app).await,
        },

        Command::Lists(opt) => match opt.command {
            None => cli::list_lists(&app).await,
            Some(ListsSubcommand::Show { name }) => cli::show_list(&app, &name).await,
            Some(ListsSubcommand::Create { name }) => cli::create_list(&app, &name).await,
            Some(ListsSubcommand::Delete { name }) => cli::delete_list(&app, &name).await,
            Some(ListsSubcommand::Import(i)) => cli::import_list(&app, &i.name, i.url, i.file).await,
            Some(ListsSubcommand::Export { name, compact }) => {
                cli::export_list(&app, &name, compact).await
            }
            Some(ListsSubcommand::Select { name, clear }) => {
                if name.is_none() && !clear {
                    error!("Pass a playlist name or --clear.");
                }
                cli::select_list(&app, name).await
            }
        },

        Command::AddTrack(opt) => {
            let mut track = Track::new(opt.uri, opt.start_ms, opt.duration_ms);
            track.name = opt.name;
            cli::add_track(&app, opt.list, track).await
        }

        Command::Quiz(opt) => match opt.command {
            QuizSubcommand::Play { index, list } => cli::play(&app, list, index).await,
            QuizSubcommand::Reveal { index, list } => cli::reveal(&app, list, index).await,
        },

        Command::Devices(opt) => {
            if opt.watch {
                cli::watch_devices(&app).await
            } else {
                cli::devices(&app).await
            }
        }

        Command::Completions(_) => {}
    }
}
