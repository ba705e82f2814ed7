//! Media type registry.
//!
//! Maps file extensions to media categories. The table is embedded in the
//! binary and parsed on first use; startup forces that first use so a later
//! drag-and-drop does not stall the window.

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::OnceLock;

const MEDIA_TYPES_YAML: &str = include_str!("../../resources/media_types.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Video,
    Subtitle,
    Audio,
    Archive,
    Verification,
}

impl MediaCategory {
    pub fn name(self) -> &'static str {
        match self {
            MediaCategory::Video => "video",
            MediaCategory::Subtitle => "subtitle",
            MediaCategory::Audio => "audio",
            MediaCategory::Archive => "archive",
            MediaCategory::Verification => "verification",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaTypes {
    by_extension: IndexMap<String, MediaCategory>,
}

static DEFAULT: OnceLock<MediaTypes> = OnceLock::new();

impl MediaTypes {
    /// The embedded registry, parsed once per process
    pub fn get_default() -> Result<&'static MediaTypes> {
        if let Some(types) = DEFAULT.get() {
            return Ok(types);
        }

        let parsed = Self::parse(MEDIA_TYPES_YAML).context("Failed to load media types")?;
        Ok(DEFAULT.get_or_init(|| parsed))
    }

    /// Parse a `category: [extension, ...]` table
    pub fn parse(yaml: &str) -> Result<Self> {
        let table: IndexMap<MediaCategory, Vec<String>> = serde_yaml_ng::from_str(yaml)?;

        let mut by_extension = IndexMap::new();
        for (category, extensions) in table {
            for extension in extensions {
                let extension = extension.trim_start_matches('.').to_ascii_lowercase();
                if let Some(previous) = by_extension.insert(extension.clone(), category) {
                    bail!(
                        "Extension {} listed as both {:?} and {:?}",
                        extension,
                        previous,
                        category
                    );
                }
            }
        }

        Ok(Self { by_extension })
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }

    pub fn category(&self, path: &Utf8Path) -> Option<MediaCategory> {
        let extension = path.extension()?.to_ascii_lowercase();
        self.by_extension.get(&extension).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table() {
        let types = MediaTypes::get_default().unwrap();
        assert!(!types.is_empty());
        assert_eq!(
            types.category(Utf8Path::new("/tv/Show.S01E01.MKV")),
            Some(MediaCategory::Video)
        );
        assert_eq!(
            types.category(Utf8Path::new("movie.srt")),
            Some(MediaCategory::Subtitle)
        );
        assert_eq!(
            types.category(Utf8Path::new("check.sfv")),
            Some(MediaCategory::Verification)
        );
        assert_eq!(types.category(Utf8Path::new("notes.txt")), None);
        assert_eq!(types.category(Utf8Path::new("README")), None);
        assert!(std::ptr::eq(types, MediaTypes::get_default().unwrap()));
    }

    #[test]
    fn test_duplicate_extension_rejected() {
        let result = MediaTypes::parse("video: [mkv]\naudio: [mkv]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let types = MediaTypes::parse("archive: [zip, .RAR]\nvideo: [mkv]\n").unwrap();
        assert_eq!(types.len(), 3);
        assert_eq!(
            types.category(Utf8Path::new("disc.part1.rar")),
            Some(MediaCategory::Archive)
        );
        assert_eq!(MediaCategory::Archive.name(), "archive");
    }
}
