//! Layout chrome: header title, background theme, dark mode, breadcrumbs and sidebar.

use crate::{search::SearchContext, session::AuthContext};

/// Viewports narrower than this start with the sidebar minimized.
pub const SIDEBAR_COLLAPSE_WIDTH: u32 = 768;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeConfig {
    /// Background used when the user profile carries no theme.
    pub default_theme: String,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            default_theme: "bg-gray-100".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Only an explicit `dark` preference enables dark mode.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("dark") => ThemeMode::Dark,
            _ => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = Vec::new();
    let mut prefix = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        prefix.push('/');
        prefix.push_str(segment);
        crumbs.push(Breadcrumb {
            label: crumb_label(segment),
            path: prefix.clone(),
        });
    }
    crumbs
}

fn crumb_label(segment: &str) -> String {
    match segment {
        "teacherGroups" => "Groups".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

pub struct Chrome {
    config: ChromeConfig,
    auth: AuthContext,
    search: SearchContext,
    mode: ThemeMode,
    sidebar_minimized: bool,
}

impl Chrome {
    pub fn new(
        config: ChromeConfig,
        auth: AuthContext,
        search: SearchContext,
        stored_mode: ThemeMode,
        viewport_width: u32,
    ) -> Self {
        Self {
            config,
            auth,
            search,
            mode: stored_mode,
            sidebar_minimized: viewport_width < SIDEBAR_COLLAPSE_WIDTH,
        }
    }

    pub fn title(&self) -> String {
        self.search.title()
    }

    pub fn background_theme(&self) -> String {
        self.auth
            .user()
            .and_then(|user| user.theme().map(str::to_string))
            .unwrap_or_else(|| self.config.default_theme.clone())
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn dark_mode(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    /// Flips the mode and returns it so the caller can persist the preference.
    pub fn toggle_dark_mode(&mut self) -> ThemeMode {
        self.mode = match self.mode {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        };
        self.mode
    }

    pub fn sidebar_minimized(&self) -> bool {
        self.sidebar_minimized
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_minimized = !self.sidebar_minimized;
    }

    pub fn on_resize(&mut self, viewport_width: u32) {
        self.sidebar_minimized = viewport_width < SIDEBAR_COLLAPSE_WIDTH;
    }
}
