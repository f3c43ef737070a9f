use crate::{
    cli::App,
    error, info, success,
    types::{Reveal, Track},
    warning,
};

/// Resolves `list` (or the selected list) and the 1-based track `index`.
async fn resolve(app: &App, list: Option<String>, index: usize) -> (String, Vec<Track>, usize) {
    let quiz = app.quiz();
    let (name, tracks) = match list {
        Some(name) => match app.lists.load_list(&name).await {
            Ok(Some(tracks)) => (name, tracks),
            Ok(None) => error!("Could not load playlist \"{}\".", name),
            Err(e) => error!("{}", e),
        },
        None => match quiz.load_selected().await {
            Ok(Some(selected)) => selected,
            Ok(None) => error!("No playlist selected. Run `quizify lists select <name>`."),
            Err(e) => error!("{}", e),
        },
    };

    if index == 0 || index > tracks.len() {
        error!(
            "Track #{} does not exist; \"{}\" has {} track(s).",
            index,
            name,
            tracks.len()
        );
    }
    (name, tracks, index - 1)
}

pub async fn play(app: &App, list: Option<String>, index: usize) {
    let (_, tracks, i) = resolve(app, list, index).await;
    let track = &tracks[i];

    info!("Playing clip #{}...", index);
    match app.quiz().on_play_requested(track).await {
        Ok(()) => success!("Clip #{} played.", index),
        Err(e) if e.is_no_active_device() => error!(
            "Could not play clip. Check you have an active Spotify device and (usually) a Premium account."
        ),
        Err(e) if e.is_auth_error() => error!("{} Run `quizify auth login`.", e),
        Err(e) => error!("Could not play clip: {}", e),
    }
}

/// Reveals the answer and caches it in the stored list.
pub async fn reveal(app: &App, list: Option<String>, index: usize) {
    let (name, mut tracks, i) = resolve(app, list, index).await;

    let reveal: Reveal = match app.quiz().on_confirm_requested(&mut tracks[i]).await {
        Ok(reveal) => reveal,
        Err(e) => error!("Could not load track info: {}", e),
    };

    if let Err(e) = app.lists.save_list(&name, &tracks).await {
        warning!("Could not cache track info: {}", e);
    }

    success!("Artist: {}", reveal.artist);
    success!("Song: {}", reveal.title);
}

/// Appends a clip to `list` (or the selected list). Naming a list does not
/// change the selection.
pub async fn add_track(app: &App, list: Option<String>, track: Track) {
    let mut builder = app.builder();
    let selected = match list {
        Some(name) => builder.open(&name).await.map(|_| Some(name)),
        None => builder.restore().await,
    };

    match selected {
        Ok(Some(_)) => {}
        Ok(None) => error!("No playlist selected. Run `quizify lists select <name>`."),
        Err(e) => error!("{}", e),
    }

    match builder.add_track(track).await {
        Ok(count) => success!(
            "Added track to \"{}\" ({} track(s)).",
            builder.current().unwrap_or_default(),
            count
        ),
        Err(e) => error!("{}", e),
    }
}
