use std::collections::HashMap;

use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{CreateWorkOrder, WorkOrder};
use crate::service::{ProductionError, ProductionService};

#[derive(Debug, Default)]
pub struct WorkOrderFilters {
    pub production_line: Option<String>,
    pub garment_type: Option<String>,
}

impl ProductionService {
    pub fn create_workorder(&self, input: CreateWorkOrder) -> Result<WorkOrder, ProductionError> {
        if input.work_order_no.trim().is_empty() {
            return Err(ProductionError::Validation("workOrderNo cannot be empty".into()));
        }

        let id = new_id();
        let now = now_rfc3339();
        let record = WorkOrder {
            id: id.clone(),
            factory: self.factory.clone(),
            work_order_no: input.work_order_no.trim().to_string(),
            style_no: input.style_no,
            garment_type: input.garment_type,
            production_line: input.production_line,
            size_breakdown: input.size_breakdown,
            order_date: input.order_date,
            delivery_date: input.delivery_date,
            target_output: input.target_output,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record("workorders", &id, &record, &[
            ("work_order_no", Value::Text(record.work_order_no.clone())),
            ("style_no", Value::Text(record.style_no.clone())),
            ("garment_type", Value::Text(record.garment_type.clone())),
            ("production_line", Value::Text(record.production_line.clone())),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ])?;

        self.index_workorder(&record);

        Ok(record)
    }

    pub fn get_workorder(&self, id: &str) -> Result<WorkOrder, ProductionError> {
        self.get_record("workorders", id)
    }

    /// Look up a work order by its business key.
    pub fn get_workorder_by_no(&self, work_order_no: &str) -> Result<WorkOrder, ProductionError> {
        let rows = self.sql
            .query(
                "SELECT data FROM workorders WHERE factory = ?1 AND work_order_no = ?2",
                &[
                    Value::Text(self.factory.clone()),
                    Value::Text(work_order_no.to_string()),
                ],
            )
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ProductionError::NotFound(format!("work order '{}'", work_order_no)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ProductionError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ProductionError::Internal(e.to_string()))
    }

    pub fn list_workorders(
        &self,
        params: &ListQuery,
        filters: &WorkOrderFilters,
    ) -> Result<Page<WorkOrder>, ProductionError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref line) = filters.production_line {
            f.push(("production_line", Value::Text(line.clone())));
        }
        if let Some(ref gt) = filters.garment_type {
            f.push(("garment_type", Value::Text(gt.clone())));
        }
        self.list_records("workorders", &f, limit, params.offset)
    }

    pub fn update_workorder(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<WorkOrder, ProductionError> {
        let current: WorkOrder = self.get_record("workorders", id)?;
        let updated: WorkOrder = Self::apply_patch(&current, patch)?;

        // The business key is referenced from QR codes — it cannot change.
        if updated.work_order_no != current.work_order_no {
            return Err(ProductionError::Validation(
                "workOrderNo cannot be changed after creation".into(),
            ));
        }

        self.update_record("workorders", id, &updated, &[
            ("style_no", Value::Text(updated.style_no.clone())),
            ("garment_type", Value::Text(updated.garment_type.clone())),
            ("production_line", Value::Text(updated.production_line.clone())),
            ("updated_at", Value::Text(updated.updated_at.clone())),
        ])?;

        self.index_workorder(&updated);

        Ok(updated)
    }

    pub fn delete_workorder(&self, id: &str) -> Result<(), ProductionError> {
        self.delete_record("workorders", id)?;
        let _ = self.search.delete(&self.collection("workorders"), id);
        Ok(())
    }

    pub fn search_workorders(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<WorkOrder>, ProductionError> {
        let results = self.search
            .search(&self.collection("workorders"), query, limit)
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let mut orders = Vec::new();
        for r in results {
            if let Ok(wo) = self.get_workorder(&r.id) {
                orders.push(wo);
            }
        }
        Ok(orders)
    }

    fn index_workorder(&self, record: &WorkOrder) {
        let mut doc = HashMap::new();
        doc.insert("workOrderNo".into(), record.work_order_no.clone());
        doc.insert("styleNo".into(), record.style_no.clone());
        doc.insert("garmentType".into(), record.garment_type.clone());
        doc.insert("productionLine".into(), record.production_line.clone());
        let _ = self.search.index(&self.collection("workorders"), &record.id, doc);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::service::tests::test_service;

    pub(crate) fn sample_workorder(no: &str) -> CreateWorkOrder {
        CreateWorkOrder {
            work_order_no: no.into(),
            style_no: "ST-4119".into(),
            garment_type: "Polo Shirt".into(),
            production_line: "Line-3".into(),
            size_breakdown: [("M".to_string(), 600u32), ("L".to_string(), 400u32)]
                .into_iter()
                .collect(),
            order_date: Some("2025-02-01".into()),
            delivery_date: Some("2025-04-15".into()),
            target_output: 850,
        }
    }

    #[test]
    fn create_get_by_no() {
        let (svc, _dir) = test_service();
        let wo = svc.create_workorder(sample_workorder("WO-01")).unwrap();
        assert_eq!(wo.factory, "dhaka-1");

        let found = svc.get_workorder_by_no("WO-01").unwrap();
        assert_eq!(found.id, wo.id);
        assert!(svc.get_workorder_by_no("WO-99").is_err());
    }

    #[test]
    fn duplicate_number_conflicts() {
        let (svc, _dir) = test_service();
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let err = svc.create_workorder(sample_workorder("WO-01")).unwrap_err();
        assert!(matches!(err, ProductionError::Conflict(_)));
    }

    #[test]
    fn update_cannot_change_business_key() {
        let (svc, _dir) = test_service();
        let wo = svc.create_workorder(sample_workorder("WO-01")).unwrap();

        let err = svc
            .update_workorder(&wo.id, serde_json::json!({"workOrderNo": "WO-02"}))
            .unwrap_err();
        assert!(matches!(err, ProductionError::Validation(_)));

        let updated = svc
            .update_workorder(&wo.id, serde_json::json!({"targetOutput": 900}))
            .unwrap();
        assert_eq!(updated.target_output, 900);
    }

    #[test]
    fn factories_are_isolated() {
        let (a, b, _dir) = crate::service::tests::test_service_pair();
        a.create_workorder(sample_workorder("WO-01")).unwrap();

        // The same number is free in the other factory, and lookups
        // never cross over.
        assert!(b.get_workorder_by_no("WO-01").is_err());
        b.create_workorder(sample_workorder("WO-01")).unwrap();
    }
}
