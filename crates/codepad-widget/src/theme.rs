use codepad_config::ThemeMode;

/// Resolves a theme mode to dark (`true`) or light.
///
/// `System` asks the OS and falls back to dark when it can't tell.
pub fn resolve_dark_mode(mode: ThemeMode) -> bool {
    match mode {
        ThemeMode::Dark => true,
        ThemeMode::Light => false,
        ThemeMode::System => !matches!(dark_light::detect(), Ok(dark_light::Mode::Light)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes() {
        assert!(resolve_dark_mode(ThemeMode::Dark));
        assert!(!resolve_dark_mode(ThemeMode::Light));
    }
}
