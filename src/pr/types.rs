use serde::Deserialize;

/// Identifies the pull request a run operates on.
/// Read once at startup (from a PR URL or the Actions environment),
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PrContext {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// One file touched by the pull request, as returned by the
/// GitHub "list pull request files" endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root
    pub filename: String,
    /// What happened to the file in this PR
    pub status: FileStatus,
    /// Unified-diff fragment for this file. Absent for binary files
    /// and for very large diffs GitHub declines to include.
    pub patch: Option<String>,
}

/// Change status reported by GitHub per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    /// GitHub also reports "copied", "changed" and "unchanged";
    /// they are reviewable like any non-removed file.
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_file_deserializes_github_payload() {
        let json = r#"{
            "filename": "src/index.ts",
            "status": "modified",
            "patch": "@@ -1,3 +1,4 @@",
            "additions": 2,
            "deletions": 1
        }"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.filename, "src/index.ts");
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.patch.as_deref(), Some("@@ -1,3 +1,4 @@"));
    }

    #[test]
    fn test_unknown_status_maps_to_other() {
        let json = r#"{"filename": "a.js", "status": "copied"}"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.status, FileStatus::Other);
        assert!(file.patch.is_none());
    }
}
