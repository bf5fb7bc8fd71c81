use phf::{Map, phf_map};
use std::fmt;

/// Files larger than this should live outside the archive repository.
pub const MAX_INLINE_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// One of the standard files every curated archive is built from.
///
/// Object-level files (`stimuli.csv`, `molecules.csv`, `physics.csv`) describe the odorants;
/// subject-level files (`behavior*.csv`, `subjects.csv`) describe who was tested and what was
/// measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFile {
    Manifest,
    ProcessingScript,
    Stimuli,
    Molecules,
    Behavior(Option<u32>), // `behavior.csv` or `behavior_<n>.csv`
    Subjects,
    Physics,
}

static FIXED_NAMES: Map<&'static str, StandardFile> = phf_map! {
    "manifest.toml" => StandardFile::Manifest,
    "main.py" => StandardFile::ProcessingScript,
    "stimuli.csv" => StandardFile::Stimuli,
    "molecules.csv" => StandardFile::Molecules,
    "behavior.csv" => StandardFile::Behavior(None),
    "subjects.csv" => StandardFile::Subjects,
    "physics.csv" => StandardFile::Physics,
};

impl StandardFile {
    pub fn classify(file_name: &str) -> Option<Self> {
        if let Some(kind) = FIXED_NAMES.get(file_name) {
            return Some(*kind);
        }
        let n = file_name
            .strip_prefix("behavior_")?
            .strip_suffix(".csv")?;
        if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) || n.starts_with('0') {
            return None;
        }
        n.parse().ok().map(|n| StandardFile::Behavior(Some(n)))
    }

    pub fn file_name(&self) -> String {
        match self {
            StandardFile::Manifest => "manifest.toml".to_string(),
            StandardFile::ProcessingScript => "main.py".to_string(),
            StandardFile::Stimuli => "stimuli.csv".to_string(),
            StandardFile::Molecules => "molecules.csv".to_string(),
            StandardFile::Behavior(None) => "behavior.csv".to_string(),
            StandardFile::Behavior(Some(n)) => format!("behavior_{n}.csv"),
            StandardFile::Subjects => "subjects.csv".to_string(),
            StandardFile::Physics => "physics.csv".to_string(),
        }
    }

    /// The column a standard table is indexed on, or `None` for non-tabular files.
    pub fn index_column(&self) -> Option<&'static str> {
        match self {
            StandardFile::Stimuli | StandardFile::Behavior(_) => Some("Stimulus"),
            StandardFile::Molecules | StandardFile::Physics => Some("CID"),
            StandardFile::Subjects => Some("Subject"),
            StandardFile::Manifest | StandardFile::ProcessingScript => None,
        }
    }

    /// Long-format tables may repeat the primary index, keyed together with a subject.
    pub fn is_long_format(&self) -> bool {
        matches!(self, StandardFile::Behavior(_))
    }
}

impl fmt::Display for StandardFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// True for file names that look like an attempt at a behavior file but miss the convention.
pub fn is_misnamed_behavior_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    (lower.starts_with("behavior") || lower.starts_with("behaviour"))
        && StandardFile::classify(file_name).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognizes_fixed_names() {
        assert_eq!(
            StandardFile::classify("molecules.csv"),
            Some(StandardFile::Molecules)
        );
        assert_eq!(
            StandardFile::classify("manifest.toml"),
            Some(StandardFile::Manifest)
        );
        assert_eq!(StandardFile::classify("notes.txt"), None);
    }

    #[test]
    fn classify_recognizes_numbered_behavior_files() {
        assert_eq!(
            StandardFile::classify("behavior_2.csv"),
            Some(StandardFile::Behavior(Some(2)))
        );
        assert_eq!(
            StandardFile::classify("behavior.csv"),
            Some(StandardFile::Behavior(None))
        );
        assert_eq!(StandardFile::classify("behavior_.csv"), None);
        assert_eq!(StandardFile::classify("behavior_02.csv"), None);
        assert_eq!(StandardFile::classify("behavior_a.csv"), None);
    }

    #[test]
    fn file_name_round_trips_through_classify() {
        for file in [
            StandardFile::Stimuli,
            StandardFile::Behavior(None),
            StandardFile::Behavior(Some(3)),
            StandardFile::Physics,
        ] {
            assert_eq!(StandardFile::classify(&file.file_name()), Some(file));
        }
    }

    #[test]
    fn index_columns_follow_the_archive_convention() {
        assert_eq!(StandardFile::Molecules.index_column(), Some("CID"));
        assert_eq!(StandardFile::Behavior(Some(1)).index_column(), Some("Stimulus"));
        assert_eq!(StandardFile::Subjects.index_column(), Some("Subject"));
        assert_eq!(StandardFile::ProcessingScript.index_column(), None);
    }

    #[test]
    fn misnamed_behavior_files_are_detected() {
        assert!(is_misnamed_behavior_file("behaviour.csv"));
        assert!(is_misnamed_behavior_file("behavior-1.csv"));
        assert!(is_misnamed_behavior_file("Behavior.csv"));
        assert!(!is_misnamed_behavior_file("behavior_1.csv"));
        assert!(!is_misnamed_behavior_file("stimuli.csv"));
    }
}
