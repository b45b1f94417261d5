use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{CheckPoint, CreateCheckPoint};
use crate::service::{ProductionError, ProductionService};

impl ProductionService {
    pub fn create_checkpoint(&self, input: CreateCheckPoint) -> Result<CheckPoint, ProductionError> {
        if input.name.trim().is_empty() {
            return Err(ProductionError::Validation("checkpoint name cannot be empty".into()));
        }

        let id = new_id();
        let now = now_rfc3339();
        let record = CheckPoint {
            id: id.clone(),
            factory: self.factory.clone(),
            name: input.name.trim().to_string(),
            cp_type: input.cp_type,
            is_production_entry: input.is_production_entry,
            is_production_exit: input.is_production_exit,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record("checkpoints", &id, &record, &[
            ("name", Value::Text(record.name.clone())),
            ("cp_type", Value::Text(record.cp_type.clone())),
            ("is_production_entry", Value::Integer(record.is_production_entry as i64)),
            ("is_production_exit", Value::Integer(record.is_production_exit as i64)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_checkpoint(&self, id: &str) -> Result<CheckPoint, ProductionError> {
        self.get_record("checkpoints", id)
    }

    pub fn list_checkpoints(
        &self,
        params: &ListQuery,
    ) -> Result<Page<CheckPoint>, ProductionError> {
        let limit = params.limit.min(500);
        self.list_records("checkpoints", &[], limit, params.offset)
    }

    pub fn update_checkpoint(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<CheckPoint, ProductionError> {
        let current: CheckPoint = self.get_record("checkpoints", id)?;
        let updated: CheckPoint = Self::apply_patch(&current, patch)?;

        self.update_record("checkpoints", id, &updated, &[
            ("name", Value::Text(updated.name.clone())),
            ("cp_type", Value::Text(updated.cp_type.clone())),
            ("is_production_entry", Value::Integer(updated.is_production_entry as i64)),
            ("is_production_exit", Value::Integer(updated.is_production_exit as i64)),
            ("updated_at", Value::Text(updated.updated_at.clone())),
        ])?;

        Ok(updated)
    }

    pub fn delete_checkpoint(&self, id: &str) -> Result<(), ProductionError> {
        self.delete_record("checkpoints", id)
    }

    /// All checkpoints flagged as production entries, in registry
    /// (creation) order.
    pub fn list_entry_points(&self) -> Result<Vec<CheckPoint>, ProductionError> {
        self.checkpoints_in_registry_order(Some("is_production_entry = 1"))
    }

    /// The sensible default station for a new scan session: the first
    /// entry point, else the first checkpoint in registry order, else none.
    pub fn default_checkpoint(&self) -> Result<Option<CheckPoint>, ProductionError> {
        let entries = self.list_entry_points()?;
        if let Some(first) = entries.into_iter().next() {
            return Ok(Some(first));
        }
        let all = self.checkpoints_in_registry_order(None)?;
        Ok(all.into_iter().next())
    }

    fn checkpoints_in_registry_order(
        &self,
        extra_where: Option<&str>,
    ) -> Result<Vec<CheckPoint>, ProductionError> {
        let where_sql = match extra_where {
            Some(cond) => format!("factory = ?1 AND {}", cond),
            None => "factory = ?1".to_string(),
        };
        let sql = format!(
            "SELECT data FROM checkpoints WHERE {} ORDER BY created_at ASC",
            where_sql
        );
        let rows = self.sql
            .query(&sql, &[Value::Text(self.factory.clone())])
            .map_err(|e| ProductionError::Store(e.to_string()))?;

        let mut checkpoints = Vec::new();
        for row in &rows {
            if let Some(data) = row.get_str("data") {
                let cp: CheckPoint = serde_json::from_str(data)
                    .map_err(|e| ProductionError::Internal(e.to_string()))?;
                checkpoints.push(cp);
            }
        }
        Ok(checkpoints)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::service::tests::test_service;

    pub(crate) fn checkpoint(name: &str, cp_type: &str, entry: bool, exit: bool) -> CreateCheckPoint {
        CreateCheckPoint {
            name: name.into(),
            cp_type: cp_type.into(),
            is_production_entry: entry,
            is_production_exit: exit,
        }
    }

    #[test]
    fn names_are_unique_per_factory() {
        let (svc, _dir) = test_service();
        svc.create_checkpoint(checkpoint("Sewing In", "Sewing", true, false)).unwrap();
        let err = svc
            .create_checkpoint(checkpoint("Sewing In", "Sewing", false, false))
            .unwrap_err();
        assert!(matches!(err, ProductionError::Conflict(_)));
    }

    #[test]
    fn entry_points_and_default() {
        let (svc, _dir) = test_service();

        // No checkpoints at all → no default.
        assert!(svc.default_checkpoint().unwrap().is_none());

        // No entry point yet → first checkpoint in registry order.
        let cutting = svc
            .create_checkpoint(checkpoint("Cutting Done", "Cutting", false, false))
            .unwrap();
        assert_eq!(svc.default_checkpoint().unwrap().unwrap().id, cutting.id);

        // An entry point beats registry order.
        let sewing_in = svc
            .create_checkpoint(checkpoint("Sewing In", "Sewing", true, false))
            .unwrap();
        svc.create_checkpoint(checkpoint("Sewing Out", "Sewing", false, true)).unwrap();

        let entries = svc.list_entry_points().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, sewing_in.id);
        assert_eq!(svc.default_checkpoint().unwrap().unwrap().id, sewing_in.id);
    }

    #[test]
    fn flags_are_independent() {
        let (svc, _dir) = test_service();
        // A single-station factory: one checkpoint that is both entry and exit.
        let both = svc
            .create_checkpoint(checkpoint("Pack", "Finishing", true, true))
            .unwrap();
        assert!(both.is_production_entry && both.is_production_exit);

        let updated = svc
            .update_checkpoint(&both.id, serde_json::json!({"isProductionEntry": false}))
            .unwrap();
        assert!(!updated.is_production_entry);
        assert!(updated.is_production_exit);
    }
}
