mod clock;
mod session;
mod token;
mod tracklist;

pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use session::PkceSessionStore;
pub use token::TokenStore;
pub use tracklist::SELECTION_PREFIX;
pub use tracklist::TRACKLIST_PREFIX;
pub use tracklist::TrackListStore;
pub use tracklist::normalize_track_list;
pub use tracklist::parse_lenient;
