//! Light/dark appearance and OS preference detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

impl Theme {
    #[must_use]
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    /// Parse the stored `theme` value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Returns true if this is the dark theme.
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Detect the current OS appearance.
    ///
    /// On macOS this queries NSAppearance. Elsewhere it reads `GTK_THEME`
    /// (a `:dark` variant means dark) and otherwise reports light.
    #[must_use]
    pub fn system() -> Self {
        #[cfg(target_os = "macos")]
        {
            detect_macos_theme()
        }
        #[cfg(not(target_os = "macos"))]
        {
            from_gtk_theme(std::env::var("GTK_THEME").ok().as_deref())
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(not(target_os = "macos"))]
fn from_gtk_theme(raw: Option<&str>) -> Theme {
    match raw {
        Some(name) if name.to_ascii_lowercase().ends_with(":dark") => Theme::Dark,
        _ => Theme::Light,
    }
}

#[cfg(target_os = "macos")]
fn detect_macos_theme() -> Theme {
    use objc2::msg_send;
    use objc2::rc::autoreleasepool;
    use objc2::runtime::AnyObject;
    use objc2_foundation::NSString;

    autoreleasepool(|_| {
        let ns_app_class = objc2::class!(NSApplication);
        let ns_app: *mut AnyObject = unsafe { msg_send![ns_app_class, sharedApplication] };
        if ns_app.is_null() {
            return Theme::Light;
        }

        let effective_appearance: *mut AnyObject =
            unsafe { msg_send![ns_app, effectiveAppearance] };
        if effective_appearance.is_null() {
            return Theme::Light;
        }

        let name: *mut AnyObject = unsafe { msg_send![effective_appearance, name] };
        if name.is_null() {
            return Theme::Light;
        }

        let name_nsstring = unsafe { &*(name as *const NSString) };
        if name_nsstring.to_string().contains("Dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    })
}
