//! Group key derivation from source filenames.
//!
//! Every source image lands in an archive folder named after its *group key*,
//! and both of its variants reuse the key as their filename stem. The key is
//! the part of the extension-stripped name before the first underscore:
//!
//! - `001_badge.png` → `001`
//! - `badge.png` → `badge` (no underscore: the whole base name)
//! - `_badge.png` → `_badge` (empty first segment: the whole base name)
//!
//! Derivation is pure and never yields an empty key. No sanitization happens
//! here; keys are used verbatim as archive path components.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Key used when a filename has no usable characters at all.
const UNNAMED_KEY: &str = "unnamed";

/// Non-empty grouping key derived from a filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remove the trailing `.ext` from a filename.
///
/// Only a non-empty extension without path separators is removed, and a
/// leading dot does not count (`.png` stays `.png`), so the base name of a
/// non-empty filename is never empty.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        None | Some(0) => filename,
        Some(pos) => {
            let ext = &filename[pos + 1..];
            if ext.is_empty() || ext.contains('/') {
                filename
            } else {
                &filename[..pos]
            }
        }
    }
}

/// Derive the group key for a filename.
pub fn group_key(filename: &str) -> GroupKey {
    let base = strip_extension(filename);
    let key = match base.split('_').next() {
        Some(first) if !first.is_empty() => first,
        _ => base,
    };
    if key.is_empty() {
        GroupKey(UNNAMED_KEY.to_string())
    } else {
        GroupKey(key.to_string())
    }
}

/// Find group keys shared by more than one distinct filename.
///
/// A batch keeps only the last file's variants under a shared key, so these
/// are the files that would silently overwrite each other.
pub fn find_collisions<'a>(
    filenames: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<GroupKey, Vec<String>> {
    let mut by_key: BTreeMap<GroupKey, BTreeSet<&str>> = BTreeMap::new();
    for name in filenames {
        by_key.entry(group_key(name)).or_default().insert(name);
    }
    by_key
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(key, names)| (key, names.into_iter().map(str::to_string).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_prefix_is_key() {
        assert_eq!(group_key("001_badge.png").as_str(), "001");
    }

    #[test]
    fn no_underscore_uses_base_name() {
        assert_eq!(group_key("badge.png").as_str(), "badge");
    }

    #[test]
    fn leading_underscore_falls_back_to_base_name() {
        assert_eq!(group_key("_badge.png").as_str(), "_badge");
    }

    #[test]
    fn only_first_underscore_splits() {
        assert_eq!(group_key("A12_front_left.jpeg").as_str(), "A12");
    }

    #[test]
    fn only_last_extension_is_stripped() {
        assert_eq!(strip_extension("archive.tar.png"), "archive.tar");
        assert_eq!(group_key("v1.2_photo.jpg").as_str(), "v1.2");
    }

    #[test]
    fn name_without_extension_is_kept() {
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(group_key("123_meter").as_str(), "123");
    }

    #[test]
    fn trailing_dot_is_not_an_extension() {
        assert_eq!(strip_extension("photo."), "photo.");
    }

    #[test]
    fn dotfile_keeps_its_name() {
        assert_eq!(strip_extension(".png"), ".png");
        assert_eq!(group_key(".png").as_str(), ".png");
    }

    #[test]
    fn underscores_only_fall_back_to_base_name() {
        assert_eq!(group_key("__.jpg").as_str(), "__");
    }

    #[test]
    fn empty_filename_still_has_a_key() {
        assert_eq!(group_key("").as_str(), UNNAMED_KEY);
    }

    #[test]
    fn extraction_is_idempotent() {
        for name in ["001_badge.png", "badge.png", "_badge.png", "a_b_c.webp", ""] {
            assert_eq!(group_key(name), group_key(name));
            assert!(!group_key(name).as_str().is_empty());
        }
    }

    #[test]
    fn collisions_list_distinct_files_per_key() {
        let collisions = find_collisions([
            "001_front.jpg",
            "001_back.jpg",
            "002_front.jpg",
            "003.png",
            "003.png",
        ]);
        assert_eq!(collisions.len(), 1);
        let names = &collisions[&group_key("001.jpg")];
        assert_eq!(names, &vec!["001_back.jpg".to_string(), "001_front.jpg".to_string()]);
    }

    #[test]
    fn display_matches_as_str() {
        let key = group_key("77_x.png");
        assert_eq!(key.to_string(), "77");
    }
}
