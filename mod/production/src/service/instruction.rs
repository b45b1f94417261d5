use std::collections::HashMap;

use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{CreateInstruction, Instruction};
use crate::service::{ProductionError, ProductionService};

impl ProductionService {
    pub fn create_instruction(
        &self,
        input: CreateInstruction,
    ) -> Result<Instruction, ProductionError> {
        if input.operation.trim().is_empty() {
            return Err(ProductionError::Validation("operation cannot be empty".into()));
        }
        if input.smv <= 0.0 {
            return Err(ProductionError::Validation("smv must be positive".into()));
        }

        let id = new_id();
        let now = now_rfc3339();
        let record = Instruction {
            id: id.clone(),
            factory: self.factory.clone(),
            operation: input.operation.trim().to_string(),
            machine_type: input.machine_type,
            smv: input.smv,
            description: input.description,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record("instructions", &id, &record, &[
            ("operation", Value::Text(record.operation.clone())),
            ("machine_type", Value::Text(record.machine_type.clone())),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        self.index_instruction(&record);

        Ok(record)
    }

    pub fn get_instruction(&self, id: &str) -> Result<Instruction, ProductionError> {
        self.get_record("instructions", id)
    }

    pub fn list_instructions(
        &self,
        params: &ListQuery,
        machine_type: Option<&str>,
    ) -> Result<Page<Instruction>, ProductionError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(t) = machine_type {
            f.push(("machine_type", Value::Text(t.to_string())));
        }
        self.list_records("instructions", &f, limit, params.offset)
    }

    pub fn update_instruction(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Instruction, ProductionError> {
        let current: Instruction = self.get_record("instructions", id)?;
        let updated: Instruction = Self::apply_patch(&current, patch)?;

        if updated.smv <= 0.0 {
            return Err(ProductionError::Validation("smv must be positive".into()));
        }

        self.update_record("instructions", id, &updated, &[
            ("operation", Value::Text(updated.operation.clone())),
            ("machine_type", Value::Text(updated.machine_type.clone())),
            ("updated_at", Value::Text(updated.updated_at.clone())),
        ])?;

        self.index_instruction(&updated);

        Ok(updated)
    }

    pub fn delete_instruction(&self, id: &str) -> Result<(), ProductionError> {
        self.delete_record("instructions", id)?;
        let _ = self.search.delete(&self.collection("instructions"), id);
        Ok(())
    }

    pub fn search_instructions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Instruction>, ProductionError> {
        let results = self.search
            .search(&self.collection("instructions"), query, limit)
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let mut instructions = Vec::new();
        for r in results {
            if let Ok(op) = self.get_instruction(&r.id) {
                instructions.push(op);
            }
        }
        Ok(instructions)
    }

    fn index_instruction(&self, record: &Instruction) {
        let mut doc = HashMap::new();
        doc.insert("operation".into(), record.operation.clone());
        doc.insert("machineType".into(), record.machine_type.clone());
        if let Some(ref description) = record.description {
            doc.insert("description".into(), description.clone());
        }
        let _ = self.search.index(&self.collection("instructions"), &record.id, doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::test_service;

    #[test]
    fn crud_with_smv_validation() {
        let (svc, _dir) = test_service();

        assert!(matches!(
            svc.create_instruction(CreateInstruction {
                operation: "Attach collar".into(),
                machine_type: "Single Needle".into(),
                smv: 0.0,
                description: None,
            }),
            Err(ProductionError::Validation(_))
        ));

        let instruction = svc
            .create_instruction(CreateInstruction {
                operation: "Attach collar".into(),
                machine_type: "Single Needle".into(),
                smv: 0.55,
                description: Some("Fold, align notches, topstitch".into()),
            })
            .unwrap();

        let updated = svc
            .update_instruction(&instruction.id, serde_json::json!({"smv": 0.48}))
            .unwrap();
        assert_eq!(updated.smv, 0.48);

        let by_type = svc
            .list_instructions(&Default::default(), Some("Single Needle"))
            .unwrap();
        assert_eq!(by_type.total, 1);

        svc.delete_instruction(&instruction.id).unwrap();
        assert!(svc.get_instruction(&instruction.id).is_err());
    }

    #[test]
    fn search_by_operation_text() {
        let (svc, _dir) = test_service();
        let instruction = svc
            .create_instruction(CreateInstruction {
                operation: "Attach collar".into(),
                machine_type: "Single Needle".into(),
                smv: 0.55,
                description: None,
            })
            .unwrap();

        let hits = svc.search_instructions("collar", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, instruction.id);
    }
}
