use std::path::PathBuf;

/// Filesystem layout for the embedded stores.
///
/// Everything lives under one data directory unless a path is pinned
/// explicitly: the SQLite file, the redb file, the tantivy index
/// directory, and the read-only `config/` tree that the KV file layer
/// is seeded from.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub sqlite_path: Option<PathBuf>,
    pub kv_path: Option<PathBuf>,
    pub search_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Layout rooted at `data_dir`, every store in its default spot.
    pub fn under(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// SQLite database file, default `{data_dir}/stitchline.sqlite`.
    pub fn resolve_sqlite(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("stitchline.sqlite"))
    }

    /// redb database file, default `{data_dir}/stitchline.redb`.
    pub fn resolve_kv(&self) -> PathBuf {
        self.kv_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("stitchline.redb"))
    }

    /// Tantivy index directory, default `{data_dir}/search`.
    pub fn resolve_search(&self) -> PathBuf {
        self.search_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("search"))
    }

    /// Directory of YAML files loaded into the KV file layer.
    pub fn config_dir(&self) -> PathBuf {
        self.data_dir.join("config")
    }
}
