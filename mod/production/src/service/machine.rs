use std::collections::HashMap;

use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{CreateMachine, Machine};
use crate::service::{ProductionError, ProductionService};

#[derive(Debug, Default)]
pub struct MachineFilters {
    pub machine_type: Option<String>,
    pub production_line: Option<String>,
    pub status: Option<String>,
}

impl ProductionService {
    pub fn create_machine(&self, input: CreateMachine) -> Result<Machine, ProductionError> {
        if input.code.trim().is_empty() {
            return Err(ProductionError::Validation("machine code cannot be empty".into()));
        }

        let id = new_id();
        let now = now_rfc3339();
        let record = Machine {
            id: id.clone(),
            factory: self.factory.clone(),
            code: input.code.trim().to_string(),
            name: input.name,
            machine_type: input.machine_type,
            brand: input.brand,
            production_line: input.production_line,
            status: input.status.unwrap_or_default(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let status_str = status_label(&record)?;
        self.insert_record("machines", &id, &record, &[
            ("code", Value::Text(record.code.clone())),
            ("machine_type", Value::Text(record.machine_type.clone())),
            (
                "production_line",
                match &record.production_line {
                    Some(line) => Value::Text(line.clone()),
                    None => Value::Null,
                },
            ),
            ("status", Value::Text(status_str)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        self.index_machine(&record);

        Ok(record)
    }

    pub fn get_machine(&self, id: &str) -> Result<Machine, ProductionError> {
        self.get_record("machines", id)
    }

    pub fn list_machines(
        &self,
        params: &ListQuery,
        filters: &MachineFilters,
    ) -> Result<Page<Machine>, ProductionError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref t) = filters.machine_type {
            f.push(("machine_type", Value::Text(t.clone())));
        }
        if let Some(ref line) = filters.production_line {
            f.push(("production_line", Value::Text(line.clone())));
        }
        if let Some(ref s) = filters.status {
            f.push(("status", Value::Text(s.clone())));
        }
        self.list_records("machines", &f, limit, params.offset)
    }

    pub fn update_machine(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Machine, ProductionError> {
        let current: Machine = self.get_record("machines", id)?;
        let updated: Machine = Self::apply_patch(&current, patch)?;

        let status_str = status_label(&updated)?;
        self.update_record("machines", id, &updated, &[
            ("code", Value::Text(updated.code.clone())),
            ("machine_type", Value::Text(updated.machine_type.clone())),
            (
                "production_line",
                match &updated.production_line {
                    Some(line) => Value::Text(line.clone()),
                    None => Value::Null,
                },
            ),
            ("status", Value::Text(status_str)),
            ("updated_at", Value::Text(updated.updated_at.clone())),
        ])?;

        self.index_machine(&updated);

        Ok(updated)
    }

    pub fn delete_machine(&self, id: &str) -> Result<(), ProductionError> {
        self.delete_record("machines", id)?;
        let _ = self.search.delete(&self.collection("machines"), id);
        Ok(())
    }

    pub fn search_machines(&self, query: &str, limit: usize) -> Result<Vec<Machine>, ProductionError> {
        let results = self.search
            .search(&self.collection("machines"), query, limit)
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let mut machines = Vec::new();
        for r in results {
            if let Ok(m) = self.get_machine(&r.id) {
                machines.push(m);
            }
        }
        Ok(machines)
    }

    fn index_machine(&self, record: &Machine) {
        let mut doc = HashMap::new();
        doc.insert("code".into(), record.code.clone());
        doc.insert("name".into(), record.name.clone());
        doc.insert("machineType".into(), record.machine_type.clone());
        if let Some(ref brand) = record.brand {
            doc.insert("brand".into(), brand.clone());
        }
        let _ = self.search.index(&self.collection("machines"), &record.id, doc);
    }
}

fn status_label(record: &Machine) -> Result<String, ProductionError> {
    serde_json::to_value(record.status)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .ok_or_else(|| ProductionError::Internal("unserializable machine status".into()))
}
