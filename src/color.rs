//! Color-aware stderr lines.
//!
//! stdout carries command results only (created path, prepare lines, docker
//! output); previews and the final failure line go to stderr through here.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

/// First call wins; later calls are ignored.
pub fn set_color_mode(mode: ColorMode) {
    let _ = COLOR_MODE.set(mode);
}

/// `--color` beats `DOCKER_STARTUP_COLOR`; `NO_COLOR` (https://no-color.org/) beats both.
fn effective_mode(flag: Option<ColorMode>, env_pref: Option<&str>, no_color: bool) -> ColorMode {
    if no_color {
        return ColorMode::Never;
    }
    flag.or_else(|| env_pref.and_then(|v| ColorMode::from_str(v.trim(), true).ok()))
        .unwrap_or(ColorMode::Auto)
}

pub fn color_enabled_stderr() -> bool {
    let env_pref = std::env::var("DOCKER_STARTUP_COLOR").ok();
    let mode = effective_mode(
        COLOR_MODE.get().copied(),
        env_pref.as_deref(),
        std::env::var_os("NO_COLOR").is_some(),
    );
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => atty::is(atty::Stream::Stderr),
    }
}

/// Wrap string with ANSI color code when enabled; otherwise return unchanged.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

pub fn log_info_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[36;1m", msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[31;1m", msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_is_noop_when_disabled() {
        assert_eq!(paint(false, "\x1b[31m", "x"), "x");
        assert_eq!(paint(true, "\x1b[31m", "x"), "\x1b[31mx\x1b[0m");
    }

    #[test]
    fn flag_beats_env_and_no_color_beats_all() {
        assert_eq!(effective_mode(None, None, false), ColorMode::Auto);
        assert_eq!(effective_mode(None, Some(" Always "), false), ColorMode::Always);
        assert_eq!(effective_mode(None, Some("sometimes"), false), ColorMode::Auto);
        assert_eq!(
            effective_mode(Some(ColorMode::Never), Some("always"), false),
            ColorMode::Never
        );
        assert_eq!(
            effective_mode(Some(ColorMode::Always), None, true),
            ColorMode::Never
        );
    }
}
