//! Safety filter
//!
//! Decides whether a process name must never be frozen. Matching is a
//! case-sensitive substring test, so any name that merely contains a
//! protected token is left alone.

/// Built-in names that are never frozen: shell/UI processes, this tool,
/// and the terminals and toolchains it is usually launched from.
pub const BUILTIN_BLACKLIST: &[&str] = &[
    "Finder",
    "Dock",
    "Electron",
    "WindowServer",
    "loginwindow",
    "kernel_task",
    "snoozr",
    "Terminal",
    "iTerm2",
    "Code",
    "gnome-terminal",
    "kgx",
    "konsole",
    "xfce4-terminal",
    "terminator",
    "tilix",
    "alacritty",
    "kitty",
    "wezterm",
    "xterm",
    "urxvt",
    "code",
    "clang",
    "make",
    "gnome-shell",
    "plasmashell",
    "Xorg",
    "Xwayland",
    "systemd",
];

/// Why a name was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption<'a> {
    Builtin(&'a str),
    Whitelist(&'a str),
}

/// Blacklist plus the user's VIP whitelist
#[derive(Debug, Clone, Default)]
pub struct SafetyFilter {
    whitelist: Vec<String>,
}

impl SafetyFilter {
    pub fn new(whitelist: Vec<String>) -> Self {
        Self { whitelist }
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// True when `name` must never be acted upon
    pub fn is_critical(&self, name: &str) -> bool {
        self.exemption(name).is_some()
    }

    /// Which token protects `name`, built-in entries first
    pub fn exemption<'a>(&'a self, name: &str) -> Option<Exemption<'a>> {
        if let Some(token) = BUILTIN_BLACKLIST.iter().find(|t| name.contains(*t)) {
            return Some(Exemption::Builtin(token));
        }

        self.whitelist
            .iter()
            .filter(|entry| !entry.is_empty())
            .find(|entry| name.contains(entry.as_str()))
            .map(|entry| Exemption::Whitelist(entry.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with(entries: &[&str]) -> SafetyFilter {
        SafetyFilter::new(entries.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_builtin_names_are_critical() {
        let filter = SafetyFilter::default();

        for token in BUILTIN_BLACKLIST {
            assert!(filter.is_critical(token), "{} should be critical", token);
        }
    }

    #[test]
    fn test_substring_match_anywhere() {
        let filter = SafetyFilter::default();

        assert!(filter.is_critical("Visual Studio Code"));
        assert!(filter.is_critical("com.apple.Dock.extra"));
        assert!(filter.is_critical("cmake"));
    }

    #[test]
    fn test_linux_terminals_and_editors_are_critical() {
        let filter = SafetyFilter::default();

        // Names as the kernel reports them, truncated to 15 bytes
        for name in [
            "gnome-terminal-",
            "konsole",
            "alacritty",
            "kitty",
            "xterm",
            "code",
            "wezterm-gui",
            "tilix",
            "xfce4-terminal",
            "urxvt",
        ] {
            assert!(filter.is_critical(name), "{} should be critical", name);
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let filter = SafetyFilter::default();

        assert!(!filter.is_critical("finder"));
        assert!(!filter.is_critical("dock"));
    }

    #[test]
    fn test_whitelist_entries_are_critical() {
        let filter = filter_with(&["Spotify", "Discord"]);

        assert!(filter.is_critical("Spotify"));
        assert!(filter.is_critical("Discord Helper"));
        assert_eq!(
            filter.exemption("Discord Helper"),
            Some(Exemption::Whitelist("Discord"))
        );
    }

    #[test]
    fn test_builtin_reported_before_whitelist() {
        let filter = filter_with(&["Code"]);

        assert_eq!(
            filter.exemption("Code Helper"),
            Some(Exemption::Builtin("Code"))
        );
    }

    #[test]
    fn test_ordinary_names_are_not_critical() {
        let filter = filter_with(&["Spotify"]);

        assert!(!filter.is_critical("firefox"));
        assert!(!filter.is_critical("Slack"));
        assert!(!filter.is_critical(""));
        assert_eq!(filter.exemption("firefox"), None);
    }

    #[test]
    fn test_empty_whitelist_entry_never_matches() {
        let filter = filter_with(&[""]);

        assert!(!filter.is_critical("firefox"));
    }
}
