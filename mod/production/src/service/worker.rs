use std::collections::HashMap;

use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{CreateWorker, Worker};
use crate::service::{ProductionError, ProductionService};

#[derive(Debug, Default)]
pub struct WorkerFilters {
    pub designation: Option<String>,
    pub production_line: Option<String>,
    pub active: Option<bool>,
}

impl ProductionService {
    pub fn create_worker(&self, input: CreateWorker) -> Result<Worker, ProductionError> {
        if input.code.trim().is_empty() {
            return Err(ProductionError::Validation("worker code cannot be empty".into()));
        }

        let id = new_id();
        let now = now_rfc3339();
        let record = Worker {
            id: id.clone(),
            factory: self.factory.clone(),
            code: input.code.trim().to_string(),
            name: input.name,
            designation: input.designation,
            production_line: input.production_line,
            active: true,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record("workers", &id, &record, &[
            ("code", Value::Text(record.code.clone())),
            ("designation", Value::Text(record.designation.clone())),
            (
                "production_line",
                match &record.production_line {
                    Some(line) => Value::Text(line.clone()),
                    None => Value::Null,
                },
            ),
            ("active", Value::Integer(1)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        self.index_worker(&record);

        Ok(record)
    }

    pub fn get_worker(&self, id: &str) -> Result<Worker, ProductionError> {
        self.get_record("workers", id)
    }

    pub fn list_workers(
        &self,
        params: &ListQuery,
        filters: &WorkerFilters,
    ) -> Result<Page<Worker>, ProductionError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref d) = filters.designation {
            f.push(("designation", Value::Text(d.clone())));
        }
        if let Some(ref line) = filters.production_line {
            f.push(("production_line", Value::Text(line.clone())));
        }
        if let Some(active) = filters.active {
            f.push(("active", Value::Integer(active as i64)));
        }
        self.list_records("workers", &f, limit, params.offset)
    }

    pub fn update_worker(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Worker, ProductionError> {
        let current: Worker = self.get_record("workers", id)?;
        let updated: Worker = Self::apply_patch(&current, patch)?;

        self.update_record("workers", id, &updated, &[
            ("code", Value::Text(updated.code.clone())),
            ("designation", Value::Text(updated.designation.clone())),
            (
                "production_line",
                match &updated.production_line {
                    Some(line) => Value::Text(line.clone()),
                    None => Value::Null,
                },
            ),
            ("active", Value::Integer(updated.active as i64)),
            ("updated_at", Value::Text(updated.updated_at.clone())),
        ])?;

        self.index_worker(&updated);

        Ok(updated)
    }

    pub fn delete_worker(&self, id: &str) -> Result<(), ProductionError> {
        self.delete_record("workers", id)?;
        let _ = self.search.delete(&self.collection("workers"), id);
        Ok(())
    }

    pub fn search_workers(&self, query: &str, limit: usize) -> Result<Vec<Worker>, ProductionError> {
        let results = self.search
            .search(&self.collection("workers"), query, limit)
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let mut workers = Vec::new();
        for r in results {
            if let Ok(w) = self.get_worker(&r.id) {
                workers.push(w);
            }
        }
        Ok(workers)
    }

    fn index_worker(&self, record: &Worker) {
        let mut doc = HashMap::new();
        doc.insert("code".into(), record.code.clone());
        doc.insert("name".into(), record.name.clone());
        doc.insert("designation".into(), record.designation.clone());
        let _ = self.search.index(&self.collection("workers"), &record.id, doc);
    }
}
