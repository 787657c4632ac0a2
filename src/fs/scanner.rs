use std::{fs, path::Path};

use chrono::{DateTime, Local};
use globset::{Glob, GlobSet, GlobSetBuilder};

use super::{join_logical, logical_parent, FsError};
use crate::config::ListingConfig;
use crate::types::DirectoryEntry;

/// Which directory children show up in a listing.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    show_hidden: bool,
    excludes: Option<GlobSet>,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self { show_hidden: true, excludes: None }
    }
}

impl EntryFilter {
    pub fn new(show_hidden: bool, excludes: &[String]) -> Result<Self, globset::Error> {
        Ok(Self { show_hidden, excludes: build_globset(excludes)? })
    }

    pub fn from_config(cfg: &ListingConfig) -> Result<Self, globset::Error> {
        Self::new(cfg.show_hidden, &cfg.excludes)
    }

    pub fn allows(&self, name: &str) -> bool {
        if !self.show_hidden && name.starts_with('.') {
            return false;
        }
        match &self.excludes {
            Some(gs) => !gs.is_match(name),
            None => true,
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, globset::Error> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    Ok(Some(builder.build()?))
}

/// Lists the immediate children of a directory as [`DirectoryEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    filter: EntryFilter,
}

impl DirectoryScanner {
    pub fn new(filter: EntryFilter) -> Self {
        Self { filter }
    }

    /// Reads `path` (non-recursive) and builds the listing for `logical_base`.
    ///
    /// Unless `is_root` is set, the listing starts with a `..` entry pointing at the
    /// logical parent. Directories follow before files, each group sorted by name.
    /// Children whose metadata cannot be read are skipped and logged; only failing
    /// to read the directory itself is an error.
    pub fn scan(&self, path: &Path, logical_base: &str, is_root: bool) -> Result<Vec<DirectoryEntry>, FsError> {
        let read_dir = fs::read_dir(path).map_err(|source| FsError::Scan { path: path.to_path_buf(), source })?;

        let mut children: Vec<DirectoryEntry> = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.filter.allows(&name) {
                continue;
            }
            match describe(&entry.path(), &name, logical_base) {
                Ok(item) => children.push(item),
                Err(e) => {
                    tracing::warn!("Skipping problematic entry {}: {}", entry.path().display(), e);
                }
            }
        }

        children.sort_by(|a, b| b.is_directory.cmp(&a.is_directory).then_with(|| a.name.cmp(&b.name)));

        let mut listing = Vec::with_capacity(children.len() + 1);
        if !is_root {
            listing.push(DirectoryEntry::parent_link(logical_parent(logical_base)));
        }
        listing.extend(children);
        Ok(listing)
    }
}

fn describe(path: &Path, name: &str, logical_base: &str) -> std::io::Result<DirectoryEntry> {
    let md = fs::symlink_metadata(path)?;
    let modified: DateTime<Local> = md.modified()?.into();
    let is_directory = md.is_dir();
    Ok(DirectoryEntry {
        name: name.to_string(),
        logical_path: join_logical(logical_base, name),
        size: if is_directory { 0 } else { md.len() },
        modified_at: modified.format("%Y-%m-%d %H:%M").to_string(),
        is_directory,
    })
}
