use std::{path::PathBuf, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    QuizError,
    cli::App,
    error, info, success,
    types::{TrackListTableRow, TrackTableRow},
    warning,
};

pub async fn list_lists(app: &App) {
    let names = match app.lists.list_names().await {
        Ok(names) => names,
        Err(e) => error!("Failed to read playlists. Err: {}", e),
    };

    if names.is_empty() {
        warning!("No playlists found. Create one with `quizify lists create <name>`.");
        return;
    }

    let selected = app
        .lists
        .load_selection(&app.settings.context)
        .await
        .unwrap_or_default();

    let mut rows: Vec<TrackListTableRow> = Vec::new();
    for name in names {
        let tracks = match app.lists.load_list(&name).await {
            Ok(Some(tracks)) => tracks.len().to_string(),
            _ => "unreadable".to_string(),
        };
        rows.push(TrackListTableRow {
            selected: if selected.as_deref() == Some(name.as_str()) {
                "*".into()
            } else {
                String::new()
            },
            name,
            tracks,
        });
    }
    rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    info!("Found {} playlist(s).", rows.len());
    println!("{}", Table::new(rows));
}

pub async fn show_list(app: &App, name: &str) {
    let tracks = match app.lists.load_list(name).await {
        Ok(Some(tracks)) => tracks,
        Ok(None) => error!("Could not load playlist \"{}\".", name),
        Err(e) => error!("Could not load playlist \"{}\". Err: {}", name, e),
    };

    if tracks.is_empty() {
        info!("No tracks in this playlist.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            index: i + 1,
            name: t.display_name().to_string(),
            start: format_ms(t.start_ms()),
            clip: format!("{:.1}s", t.clip_duration_ms() as f64 / 1000.0),
        })
        .collect();

    info!(
        "Playlist: {} ({} track{})",
        name,
        tracks.len(),
        if tracks.len() == 1 { "" } else { "s" }
    );
    println!("{}", Table::new(rows));
}

pub async fn create_list(app: &App, name: &str) {
    let mut builder = app.builder();
    match builder.create_list(name).await {
        Ok(()) => success!("Created new playlist \"{}\".", name.trim()),
        Err(e) => error!("{}", e),
    }
}

pub async fn delete_list(app: &App, name: &str) {
    match app.lists.contains(name).await {
        Ok(true) => {}
        Ok(false) => error!("{}", QuizError::ListNotFound(name.to_string())),
        Err(e) => error!("{}", e),
    }
    if let Err(e) = app.lists.delete_list(name).await {
        error!("Failed to delete playlist \"{}\". Err: {}", name, e);
    }
    success!("Deleted playlist \"{}\".", name);
}

/// Imports from a URL or a local JSON file, overwriting any list of that name.
pub async fn import_list(app: &App, name: &str, url: Option<String>, file: Option<PathBuf>) {
    let result = match (url, file) {
        (Some(url), None) => {
            let pb = ProgressBar::new_spinner();
            pb.set_message(format!("Loading playlist from {url}..."));
            pb.enable_steady_tick(Duration::from_millis(100));
            if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
                pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            let result = app.lists.import_from_url(name, &url).await;
            pb.finish_and_clear();
            result
        }
        (None, Some(file)) => app.lists.import_from_file(name, &file).await,
        _ => error!("Pass exactly one of --url or --file."),
    };

    match result {
        Ok(count) => success!("Saved {} track(s) to playlist \"{}\".", count, name),
        Err(e) => error!("Import failed: {}", e),
    }
}

pub async fn export_list(app: &App, name: &str, compact: bool) {
    match app.lists.export_list(name, !compact).await {
        Ok(json) if json.is_empty() => error!("{}", QuizError::ListNotFound(name.to_string())),
        Ok(json) => println!("{json}"),
        Err(e) => error!("Export failed: {}", e),
    }
}

/// Remembers `name` as the active list, or clears the selection.
pub async fn select_list(app: &App, name: Option<String>) {
    match name {
        Some(name) => match app.quiz().select(&name).await {
            Ok(tracks) => success!(
                "Selected playlist \"{}\" ({} track(s)).",
                name,
                tracks.len()
            ),
            Err(e) => error!("{}", e),
        },
        None => match app.lists.save_selection(&app.settings.context, None).await {
            Ok(()) => success!("Selection cleared."),
            Err(e) => error!("{}", e),
        },
    }
}

fn format_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}.{:03}", secs / 60, secs % 60, ms % 1000)
}
