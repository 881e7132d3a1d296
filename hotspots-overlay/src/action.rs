//! Click action resolution

use hotspots_core::ClickAction;

/// Browsing context a link opens in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// The current page
    Top,
    /// A new tab
    Blank,
}

/// What the host player should do after a hotspot click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing to do
    None,
    Navigate {
        url: String,
        target: LinkTarget,
        pause_playback: bool,
    },
    Seek { time_ms: i64 },
}

/// Resolves a hotspot's click action into a host command
pub fn resolve_click(action: Option<&ClickAction>) -> ClickOutcome {
    match action {
        None => ClickOutcome::None,
        Some(ClickAction::OpenUrl { url }) if !url.trim().is_empty() => ClickOutcome::Navigate {
            url: prepare_url(url),
            target: LinkTarget::Top,
            pause_playback: false,
        },
        Some(ClickAction::OpenUrlInNewTab { url }) if !url.trim().is_empty() => {
            ClickOutcome::Navigate {
                url: prepare_url(url),
                target: LinkTarget::Blank,
                pause_playback: true,
            }
        }
        Some(ClickAction::JumpToTime { jump_to_time }) if *jump_to_time >= 0 => {
            ClickOutcome::Seek {
                time_ms: *jump_to_time,
            }
        }
        Some(_) => ClickOutcome::None,
    }
}

/// Prefixes `http://` when the URL has no http(s) scheme
pub fn prepare_url(url: &str) -> String {
    let url = url.trim();
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_url_adds_missing_scheme() {
        assert_eq!(prepare_url("example.com/a"), "http://example.com/a");
        assert_eq!(prepare_url("https://example.com"), "https://example.com");
        assert_eq!(prepare_url("HTTP://EXAMPLE.COM"), "HTTP://EXAMPLE.COM");
        assert_eq!(prepare_url("ftp://example.com"), "http://ftp://example.com");
    }

    #[test]
    fn open_url_navigates_current_page() {
        let action = ClickAction::OpenUrl {
            url: "example.com".to_string(),
        };
        assert_eq!(
            resolve_click(Some(&action)),
            ClickOutcome::Navigate {
                url: "http://example.com".to_string(),
                target: LinkTarget::Top,
                pause_playback: false,
            }
        );
    }

    #[test]
    fn new_tab_pauses_playback() {
        let action = ClickAction::OpenUrlInNewTab {
            url: "https://example.com".to_string(),
        };
        assert_eq!(
            resolve_click(Some(&action)),
            ClickOutcome::Navigate {
                url: "https://example.com".to_string(),
                target: LinkTarget::Blank,
                pause_playback: true,
            }
        );
    }

    #[test]
    fn empty_url_and_missing_action_do_nothing() {
        let action = ClickAction::OpenUrl {
            url: "  ".to_string(),
        };
        assert_eq!(resolve_click(Some(&action)), ClickOutcome::None);
        assert_eq!(resolve_click(None), ClickOutcome::None);
    }

    #[test]
    fn jump_to_time_seeks() {
        let action = ClickAction::JumpToTime {
            jump_to_time: 42_000,
        };
        assert_eq!(resolve_click(Some(&action)), ClickOutcome::Seek { time_ms: 42_000 });
    }
}
