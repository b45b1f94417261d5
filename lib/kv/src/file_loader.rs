use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::KvError;
use crate::overlay::OverlayStore;
use crate::traits::KvStore;

/// Subdirectories of the config dir and the key prefix each one maps to.
///
/// ```text
/// config/
/// ├── qc-reasons/dhaka-1.yaml     → config:qc_reasons:dhaka-1
/// ├── ai/optimize_schedule.yaml   → config:ai:optimize_schedule
/// └── factory-defaults.yaml       → config:factory-defaults
/// ```
const NAMESPACES: &[(&str, &str)] = &[
    ("qc-reasons", "config:qc_reasons:"),
    ("ai", "config:ai:"),
];

/// Seeds an [`OverlayStore`]'s read-only layer from a directory of
/// YAML files.
pub struct FileLoader;

impl FileLoader {
    /// Load every YAML file under `config_dir`. Returns how many
    /// entries were seeded; a missing directory seeds nothing.
    pub fn load<B: KvStore>(config_dir: &Path, overlay: &OverlayStore<B>) -> Result<usize, KvError> {
        if !config_dir.is_dir() {
            debug!(dir = %config_dir.display(), "no config dir, file layer stays empty");
            return Ok(0);
        }

        let mut seeded = Self::load_dir(config_dir, "config:", overlay)?;
        for (subdir, prefix) in NAMESPACES {
            let dir = config_dir.join(subdir);
            if dir.is_dir() {
                seeded += Self::load_dir(&dir, prefix, overlay)?;
            }
        }

        debug!(seeded, dir = %config_dir.display(), "config files loaded");
        Ok(seeded)
    }

    /// Seed every `{stem}.yaml` in `dir` (non-recursive) as `{prefix}{stem}`.
    fn load_dir<B: KvStore>(
        dir: &Path,
        prefix: &str,
        overlay: &OverlayStore<B>,
    ) -> Result<usize, KvError> {
        let mut seeded = 0;
        for entry in fs::read_dir(dir).map_err(|e| KvError::Backend(e.to_string()))? {
            let path = entry.map_err(|e| KvError::Backend(e.to_string()))?.path();
            let yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
            if !path.is_file() || !yaml {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let body = fs::read(&path).map_err(|e| KvError::Backend(e.to_string()))?;
            overlay.seed(format!("{prefix}{stem}"), body);
            seeded += 1;
        }
        Ok(seeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redb::RedbStore;

    #[test]
    fn seeds_reason_lists_templates_and_top_level_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("qc-reasons")).unwrap();
        fs::create_dir_all(dir.path().join("ai")).unwrap();
        fs::write(dir.path().join("qc-reasons/dhaka-1.yaml"), "- Broken stitch\n- Open seam\n")
            .unwrap();
        fs::write(dir.path().join("ai/optimize_schedule.yaml"), "template: optimize\n").unwrap();
        fs::write(dir.path().join("factory-defaults.yaml"), "line: L-1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let tmp = tempfile::NamedTempFile::new().unwrap();
        let overlay = OverlayStore::new(RedbStore::open(tmp.path()).unwrap());
        let seeded = FileLoader::load(dir.path(), &overlay).unwrap();

        assert_eq!(seeded, 3);
        assert!(overlay.get("config:qc_reasons:dhaka-1").unwrap().is_some());
        assert!(overlay.get("config:ai:optimize_schedule").unwrap().is_some());
        assert!(overlay.get("config:factory-defaults").unwrap().is_some());
        assert!(overlay.is_readonly("config:qc_reasons:dhaka-1"));
    }

    #[test]
    fn a_missing_config_dir_is_not_an_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let overlay = OverlayStore::new(RedbStore::open(tmp.path()).unwrap());
        let seeded = FileLoader::load(Path::new("/nonexistent/stitchline"), &overlay).unwrap();
        assert_eq!(seeded, 0);
        assert_eq!(overlay.seeded(), 0);
    }
}
