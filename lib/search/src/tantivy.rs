use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value as _;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};

use crate::error::SearchError;
use crate::traits::{Hit, SearchEngine};

fn index_err(e: impl std::fmt::Display) -> SearchError {
    SearchError::Index(e.to_string())
}

fn query_err(e: impl std::fmt::Display) -> SearchError {
    SearchError::Query(e.to_string())
}

/// One tantivy index. Three fields per document:
///
/// - `_id` (STRING | STORED): untokenized document id, the upsert key
/// - `_body` (TEXT): all field values joined, what queries run against
/// - `_fields` (STORED): the original fields as JSON, read back on hits
struct Collection {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    id: Field,
    body: Field,
    fields: Field,
}

impl Collection {
    fn open(dir: &Path) -> Result<Self, SearchError> {
        std::fs::create_dir_all(dir).map_err(index_err)?;

        let mut builder = Schema::builder();
        let id = builder.add_text_field("_id", STRING | STORED);
        let body = builder.add_text_field("_body", TEXT);
        let fields = builder.add_text_field("_fields", STORED);

        let mmap = tantivy::directory::MmapDirectory::open(dir).map_err(index_err)?;
        let index = Index::open_or_create(mmap, builder.build()).map_err(index_err)?;
        let writer = index.writer(15_000_000).map_err(index_err)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(index_err)?;

        Ok(Self { index, reader, writer: Mutex::new(writer), id, body, fields })
    }

    fn upsert(&self, id: &str, doc_fields: &HashMap<String, String>) -> Result<(), SearchError> {
        // Field values only — keys would pollute the full-text index.
        let body = doc_fields.values().cloned().collect::<Vec<_>>().join(" ");
        let stored = serde_json::to_string(doc_fields).map_err(index_err)?;

        let mut writer = self.writer.lock().map_err(index_err)?;
        writer.delete_term(Term::from_field_text(self.id, id));
        writer
            .add_document(doc!(self.id => id, self.body => body, self.fields => stored))
            .map_err(index_err)?;
        writer.commit().map_err(index_err)?;
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), SearchError> {
        let mut writer = self.writer.lock().map_err(index_err)?;
        writer.delete_term(Term::from_field_text(self.id, id));
        writer.commit().map_err(index_err)?;
        Ok(())
    }

    fn query(&self, text: &str, limit: usize) -> Result<Vec<Hit>, SearchError> {
        self.reader.reload().map_err(query_err)?;
        let searcher = self.reader.searcher();

        let parsed = QueryParser::for_index(&self.index, vec![self.body])
            .parse_query(text)
            .map_err(query_err)?;
        let top = searcher.search(&parsed, &TopDocs::with_limit(limit)).map_err(query_err)?;

        let mut hits = Vec::with_capacity(top.len());
        for (score, addr) in top {
            let found: TantivyDocument = searcher.doc(addr).map_err(query_err)?;
            let id = found
                .get_first(self.id)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let fields = found
                .get_first(self.fields)
                .and_then(|v| v.as_str())
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();
            hits.push(Hit { id, score, fields });
        }
        Ok(hits)
    }
}

/// [`SearchEngine`] over tantivy, one index directory per collection,
/// created lazily on first touch.
pub struct TantivyEngine {
    base_dir: PathBuf,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl TantivyEngine {
    pub fn open(base_dir: &Path) -> Result<Self, SearchError> {
        std::fs::create_dir_all(base_dir).map_err(index_err)?;
        Ok(Self { base_dir: base_dir.to_path_buf(), collections: RwLock::new(HashMap::new()) })
    }

    fn collection(&self, name: &str) -> Result<Arc<Collection>, SearchError> {
        if let Some(col) = self.collections.read().map_err(index_err)?.get(name) {
            return Ok(Arc::clone(col));
        }

        let mut collections = self.collections.write().map_err(index_err)?;
        if let Some(col) = collections.get(name) {
            return Ok(Arc::clone(col));
        }
        let col = Arc::new(Collection::open(&self.base_dir.join(name))?);
        collections.insert(name.to_string(), Arc::clone(&col));
        Ok(col)
    }
}

impl SearchEngine for TantivyEngine {
    fn index(
        &self,
        collection: &str,
        id: &str,
        doc: HashMap<String, String>,
    ) -> Result<(), SearchError> {
        self.collection(collection)?.upsert(id, &doc)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), SearchError> {
        self.collection(collection)?.remove(id)
    }

    fn search(&self, collection: &str, query: &str, limit: usize)
    -> Result<Vec<Hit>, SearchError> {
        self.collection(collection)?.query(query, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (TantivyEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let engine = TantivyEngine::open(dir.path()).unwrap();
        (engine, dir)
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn indexed_documents_are_found_and_removable() {
        let (engine, _dir) = engine();
        engine
            .index("machines", "m1", fields(&[("code", "M-001"), ("name", "Juki overlock")]))
            .unwrap();

        let hits = engine.search("machines", "overlock", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "m1");
        assert_eq!(hits[0].fields.get("code").map(String::as_str), Some("M-001"));

        engine.delete("machines", "m1").unwrap();
        assert!(engine.search("machines", "overlock", 10).unwrap().is_empty());
    }

    #[test]
    fn reindexing_an_id_replaces_the_old_document() {
        let (engine, _dir) = engine();
        engine.index("machines", "m1", fields(&[("name", "single needle")])).unwrap();
        engine.index("machines", "m1", fields(&[("name", "double needle")])).unwrap();

        assert!(engine.search("machines", "single", 10).unwrap().is_empty());
        assert_eq!(engine.search("machines", "double", 10).unwrap().len(), 1);
    }

    #[test]
    fn collections_are_isolated() {
        let (engine, _dir) = engine();
        engine.index("machines", "m1", fields(&[("name", "overlock")])).unwrap();
        assert!(engine.search("workers", "overlock", 10).unwrap().is_empty());
    }
}
