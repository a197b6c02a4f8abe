// hgnotify-hook: Mercurial commit hook that notifies a build server.

pub mod config;
pub mod hg;
pub mod hook;
pub mod notifier;
