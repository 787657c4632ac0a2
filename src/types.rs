use serde::{Deserialize, Serialize};

use crate::fs::join_logical;

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    /// Client-facing path, `/`-separated, always starting with `/`.
    pub logical_path: String,
    /// Byte count, 0 for directories and the parent link.
    pub size: u64,
    /// `YYYY-MM-DD HH:MM`, local time. Empty for the parent link.
    pub modified_at: String,
    pub is_directory: bool,
}

impl DirectoryEntry {
    /// The synthetic `..` entry pointing at `parent_logical`.
    pub fn parent_link(parent_logical: String) -> Self {
        Self {
            name: "..".to_string(),
            logical_path: parent_logical,
            size: 0,
            modified_at: String::new(),
            is_directory: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parses `light`/`dark`; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

// DTOs handed to the listing renderer
#[derive(Debug, Clone, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: DirectoryEntry,
    pub size_display: String,
    pub icon: &'static str,
}

impl From<DirectoryEntry> for EntryView {
    fn from(entry: DirectoryEntry) -> Self {
        let size_display = if entry.is_directory { String::new() } else { format_size(entry.size) };
        let icon = if entry.is_directory { "folder.png" } else { icon_for_extension(&entry.name) };
        Self { entry, size_display, icon }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub current_path: String,
    pub theme: Theme,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub entries: Vec<EntryView>,
}

impl ListingView {
    pub fn new(current_path: String, theme: Theme, entries: Vec<DirectoryEntry>) -> Self {
        Self {
            breadcrumbs: breadcrumbs(&current_path),
            current_path,
            theme,
            entries: entries.into_iter().map(EntryView::from).collect(),
        }
    }
}

/// Splits a logical path into cumulative navigation links.
pub fn breadcrumbs(logical: &str) -> Vec<Breadcrumb> {
    let mut path = String::from("/");
    let mut crumbs = Vec::new();
    for segment in logical.split('/').filter(|s| !s.is_empty()) {
        path = join_logical(&path, segment);
        crumbs.push(Breadcrumb { name: segment.to_string(), path: path.clone() });
    }
    crumbs
}

/// Human readable size with binary units (`512`, `1.5K`, `10.0M`).
pub fn format_size(size: u64) -> String {
    const SUFFIXES: [&str; 6] = ["", "K", "M", "G", "T", "P"];
    if size < 1024 {
        return size.to_string();
    }
    let mut value = size as f64;
    let mut order = 0;
    while value >= 1024.0 && order < SUFFIXES.len() - 1 {
        value /= 1024.0;
        order += 1;
    }
    format!("{:.1}{}", value, SUFFIXES[order])
}

/// Icon file name for a listing entry, chosen by extension.
pub fn icon_for_extension(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "zip" | "rar" | "7z" | "tar" | "gz" | "xz" => "archive.png",
        "jpg" | "jpeg" | "png" | "gif" | "bmp" => "image.png",
        "txt" | "md" | "csv" => "text.png",
        _ => "unknown.png",
    }
}

/// Query string shared by `/upload` and `/mkdir`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MkdirForm {
    #[serde(default)]
    pub dirname: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeForm {
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannedPage {
    pub banned: bool,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BanListResponse {
    pub items: Vec<String>,
}
