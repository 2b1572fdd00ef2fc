//! Static application metadata

use serde::Serialize;

/// Fixed facts about the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppMetadata {
    pub name: &'static str,
    pub author: &'static str,
    pub repo: &'static str,
    pub tauri_site: &'static str,
    pub nuxt_site: &'static str,
    pub uno_site: &'static str,
}

pub const METADATA: AppMetadata = AppMetadata {
    name: "Vindicator Test System",
    author: "Barix",
    repo: "https://github.com/jotapebatista",
    tauri_site: "https://v2.tauri.app",
    nuxt_site: "https://nuxt.com",
    uno_site: "https://unocss.dev",
};

impl AppMetadata {
    /// Reference documentation links as (label, url)
    pub fn references(&self) -> [(&'static str, &'static str); 3] {
        [
            ("Tauri", self.tauri_site),
            ("Nuxt", self.nuxt_site),
            ("UnoCSS", self.uno_site),
        ]
    }
}
