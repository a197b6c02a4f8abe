// hgnotify-common: payload and endpoint types shared across the hgnotify crates

pub mod endpoint;
pub mod payload;
