//! ClassifyIt Frontend Entry Point

mod app;
mod commands;
mod components;
mod context;
mod widget;

use app::App;
use leptos::prelude::*;

/// `?log=debug` in the page url raises the console level
fn log_level(search: &str) -> Option<log::Level> {
    search
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("log="))
        .and_then(|level| level.parse().ok())
}

fn main() {
    console_error_panic_hook::set_once();

    let level = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .and_then(|search| log_level(&search))
        .unwrap_or(log::Level::Info);
    if let Err(e) = console_log::init_with_level(level) {
        web_sys::console::warn_1(&format!("logger already set: {}", e).into());
    }

    mount_to_body(App);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_query() {
        assert_eq!(log_level("?log=debug"), Some(log::Level::Debug));
        assert_eq!(log_level("?item=p1&log=warn"), Some(log::Level::Warn));
        assert_eq!(log_level("?log=loud"), None);
        assert_eq!(log_level(""), None);
    }
}
