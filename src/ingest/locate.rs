use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::schema::EntityKind;
use super::IngestError;

/// A file in the data directory that could feed one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub created: SystemTime,
}

/// Regular files whose name contains the kind's marker (case-insensitive).
pub fn candidates(dir: &Path, kind: EntityKind) -> Result<Vec<Candidate>, IngestError> {
    let entries = fs::read_dir(dir).map_err(|source| IngestError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if !name.contains(kind.file_marker()) {
            continue;
        }

        let metadata = entry.metadata().map_err(|source| IngestError::Io {
            path: entry.path(),
            source,
        })?;
        if !metadata.is_file() {
            continue;
        }

        // Not every filesystem records a birth time.
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push(Candidate { path: entry.path(), created });
    }

    Ok(found)
}

/// Most recently created candidate; equal times fall back to the file name.
pub fn newest(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates
        .into_iter()
        .max_by(|a, b| a.created.cmp(&b.created).then_with(|| a.path.cmp(&b.path)))
}

pub fn locate_latest(dir: &Path, kind: EntityKind) -> Result<Option<PathBuf>, IngestError> {
    Ok(newest(candidates(dir, kind)?).map(|c| c.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn candidate(name: &str, secs: u64) -> Candidate {
        Candidate {
            path: PathBuf::from(name),
            created: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    #[test]
    fn newest_prefers_latest_creation_time() {
        let picked = newest(vec![
            candidate("400_transactions.csv", 10),
            candidate("401_transactions.csv", 30),
            candidate("402_transactions.csv", 20),
        ]);
        assert_eq!(picked.unwrap().path, PathBuf::from("401_transactions.csv"));
    }

    #[test]
    fn newest_breaks_ties_by_name() {
        let picked = newest(vec![candidate("b_product.csv", 5), candidate("a_product.csv", 5)]);
        assert_eq!(picked.unwrap().path, PathBuf::from("b_product.csv"));
        assert!(newest(Vec::new()).is_none());
    }

    #[test]
    fn locates_by_marker_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("400_Households.csv"), "x").unwrap();
        fs::write(dir.path().join("400_products.csv"), "x").unwrap();
        fs::create_dir(dir.path().join("transaction_archive")).unwrap();

        let household = locate_latest(dir.path(), EntityKind::Household).unwrap();
        assert_eq!(household, Some(dir.path().join("400_Households.csv")));

        let product = locate_latest(dir.path(), EntityKind::Product).unwrap();
        assert_eq!(product, Some(dir.path().join("400_products.csv")));

        assert_eq!(locate_latest(dir.path(), EntityKind::Transaction).unwrap(), None);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            locate_latest(&missing, EntityKind::Household),
            Err(IngestError::DirectoryUnreadable { .. })
        ));
    }
}
