pub mod audio;
pub mod i18n;
pub mod leaderboard;
pub mod player;
pub mod provider;
pub mod question;
pub mod round_timer;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod sfx;
pub mod terminal;
