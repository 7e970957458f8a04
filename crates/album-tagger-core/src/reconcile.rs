//! Repair of metadata keys whose files were renamed or moved.
//!
//! Matching is by file name only: an orphaned key moves to the one current
//! image sharing its basename. Anything less certain is left in place.

use std::collections::{HashMap, HashSet};

use crate::config::ReconcileStrategy;
use crate::sidecar::MetadataDocument;
use crate::types::ImageRecord;

/// One key moved to a new path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub from: String,
    pub to: String,
}

/// An orphaned key that could not be matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub key: String,

    /// Paths of current images with the same basename (none, or several)
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub migrated: Vec<Migration>,
    pub unresolved: Vec<Unresolved>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.migrated.is_empty() && self.unresolved.is_empty()
    }
}

/// Last slash-separated segment of a metadata key
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Keys with no image at exactly that path, in key order
pub fn orphaned_keys<'a>(document: &'a MetadataDocument, images: &[ImageRecord]) -> Vec<&'a str> {
    let current: HashSet<&str> = images.iter().map(|i| i.relative_path.as_str()).collect();
    document
        .keys()
        .filter(|key| !current.contains(key))
        .collect()
}

/// Move orphaned keys onto uniquely named current images.
///
/// When several orphaned keys share the one matching image, none of them
/// moves; all are reported unresolved. Running it again on its own output
/// changes nothing.
pub fn reconcile(
    document: &mut MetadataDocument,
    images: &[ImageRecord],
    strategy: ReconcileStrategy,
) -> ReconcileReport {
    let mut by_name: HashMap<&str, Vec<&str>> = HashMap::new();
    for image in images {
        by_name
            .entry(image.name.as_str())
            .or_default()
            .push(image.relative_path.as_str());
    }

    let orphans: Vec<String> = orphaned_keys(document, images)
        .into_iter()
        .map(str::to_string)
        .collect();

    // Orphan -> its single candidate, and how many orphans claim each candidate
    let mut assigned: Vec<(&str, &str)> = Vec::new();
    let mut claims: HashMap<&str, usize> = HashMap::new();
    let mut report = ReconcileReport::default();

    for key in &orphans {
        let candidates = by_name.get(basename(key)).cloned().unwrap_or_default();
        if let [target] = candidates.as_slice() {
            assigned.push((key.as_str(), *target));
            *claims.entry(*target).or_default() += 1;
        } else {
            report.unresolved.push(Unresolved {
                key: key.clone(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            });
        }
    }

    for (key, target) in assigned {
        if claims.get(target).copied().unwrap_or_default() > 1 {
            // Several old keys claim the same file; none of them wins
            report.unresolved.push(Unresolved {
                key: key.to_string(),
                candidates: vec![target.to_string()],
            });
            continue;
        }

        let Some(tags) = document.take(key) else {
            continue;
        };
        match strategy {
            ReconcileStrategy::Replace => document.replace(target, tags),
            ReconcileStrategy::Merge => document.merge_into(target, &tags),
        }
        log::info!("Moved tags for {} to {}", key, target);
        report.migrated.push(Migration {
            from: key.to_string(),
            to: target.to_string(),
        });
    }

    report.unresolved.sort_by(|a, b| a.key.cmp(&b.key));
    for unresolved in &report.unresolved {
        if unresolved.candidates.is_empty() {
            log::warn!("No current image matches {}; keeping its tags", unresolved.key);
        } else {
            log::warn!(
                "Ambiguous match for {}: {}; keeping its tags",
                unresolved.key,
                unresolved.candidates.join(", ")
            );
        }
    }

    report
}
