//! Thin domain endpoint wrappers.
//!
//! Each operation is a one-line call into the client core with a path
//! template; the core owns every reliability concern.

pub mod game_config;
pub mod leaderboard;
pub mod session;
pub mod storage;

pub use game_config::GameConfigService;
pub use leaderboard::LeaderboardService;
pub use session::SessionService;
pub use storage::StorageService;

/// Substitutes `{param}` placeholders by exact string replacement.
pub(crate) fn render_path(template: &str, params: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(&format!("{{{name}}}"), value);
    }
    path
}
