//! Bundle lifecycle engine — validates and executes checkpoint passes.
//!
//! A pass deliberately enforces no ordering between checkpoints: any
//! registered checkpoint may be recorded at any time, for any bundle.
//! Downstream reporting reads `QrCode.status` purely as "the most recent
//! checkpoint name". Concurrent passes on the same bundle are
//! last-writer-wins on `status`; the history log keeps every row.

use serde::Serialize;
use tracing::info;

use stitchline_core::now_rfc3339;
use stitchline_sql::Value;

use crate::model::{BundleHistoryRecord, QrCode, STATUS_PASSED, WorkOrder};
use crate::service::{ProductionError, ProductionService};

/// A resolved bundle: the scanned code plus its owning work order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleContext {
    pub qr_code: QrCode,
    pub work_order: WorkOrder,
}

impl ProductionService {
    /// Resolve a scanned code for the scanning workflow. Pure lookup —
    /// no side effects.
    ///
    /// Fails with NotFound when no code matches (case-insensitively),
    /// InvalidState when the code exists but is unassigned blank stock,
    /// and WorkOrderMissing when the assignment dangles.
    pub fn find_bundle(&self, code: &str) -> Result<BundleContext, ProductionError> {
        let qr_code = self.find_code(code)?;

        let work_order_no = qr_code.work_order_id.clone().ok_or_else(|| {
            ProductionError::InvalidState(format!(
                "bundle '{}' is not assigned to a work order",
                qr_code.id
            ))
        })?;

        let work_order = self.get_workorder_by_no(&work_order_no).map_err(|_| {
            ProductionError::WorkOrderMissing(format!(
                "bundle '{}' references work order '{}' which does not exist",
                qr_code.id, work_order_no
            ))
        })?;

        Ok(BundleContext { qr_code, work_order })
    }

    /// Record one checkpoint pass for a resolved bundle.
    ///
    /// Sets the code's status to the checkpoint name and appends a
    /// history row — together or not at all (single transaction). The
    /// same checkpoint may be passed repeatedly: status is idempotent,
    /// history is cumulative.
    pub fn confirm_pass(
        &self,
        qr_code_id: &str,
        checkpoint_id: &str,
    ) -> Result<BundleHistoryRecord, ProductionError> {
        let context = self.find_bundle(qr_code_id)?;
        let checkpoint = self.get_checkpoint(checkpoint_id).map_err(|_| {
            ProductionError::NotFound(format!("checkpoint '{}'", checkpoint_id))
        })?;

        let now = now_rfc3339();

        let mut qr_code = context.qr_code;
        qr_code.status = checkpoint.name.clone();
        qr_code.updated_at = now.clone();
        let qr_json = serde_json::to_string(&qr_code)
            .map_err(|e| ProductionError::Internal(e.to_string()))?;

        let record = BundleHistoryRecord {
            seq: 0, // assigned by the store
            factory: self.factory.clone(),
            qr_code_id: qr_code.id.clone(),
            work_order_id: context.work_order.work_order_no.clone(),
            check_point_name: checkpoint.name.clone(),
            status: STATUS_PASSED.to_string(),
            recorded_at: now.clone(),
        };
        let record_json = serde_json::to_string(&record)
            .map_err(|e| ProductionError::Internal(e.to_string()))?;

        let update_params = [
            Value::Text(qr_json),
            Value::Text(checkpoint.name.clone()),
            Value::Text(now.clone()),
            Value::Text(qr_code.id.clone()),
            Value::Text(self.factory.clone()),
        ];
        let insert_params = [
            Value::Text(self.factory.clone()),
            Value::Text(record_json),
            Value::Text(record.qr_code_id.clone()),
            Value::Text(record.work_order_id.clone()),
            Value::Text(record.check_point_name.clone()),
            Value::Text(record.status.clone()),
            Value::Text(now.clone()),
        ];

        self.sql
            .exec_all(&[
                (
                    "UPDATE qrcodes SET data = ?1, status = ?2, updated_at = ?3 \
                     WHERE id = ?4 AND factory = ?5",
                    &update_params[..],
                ),
                (
                    "INSERT INTO bundle_history \
                     (factory, data, qr_code_id, work_order_id, check_point_name, status, recorded_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    &insert_params[..],
                ),
            ])
            .map_err(|e| ProductionError::Store(e.to_string()))?;

        info!(
            code = %qr_code.id,
            checkpoint = %checkpoint.name,
            work_order = %record.work_order_id,
            "bundle pass recorded"
        );

        // Read the stored row back to pick up its assigned seq.
        self.latest_history_row(&qr_code.id)
    }

    /// Full passage history for one code, in chronological order.
    pub fn bundle_history(
        &self,
        qr_code_id: &str,
    ) -> Result<Vec<BundleHistoryRecord>, ProductionError> {
        let rows = self.sql
            .query(
                "SELECT seq, data FROM bundle_history \
                 WHERE factory = ?1 AND qr_code_id = ?2 COLLATE NOCASE ORDER BY seq ASC",
                &[
                    Value::Text(self.factory.clone()),
                    Value::Text(qr_code_id.to_string()),
                ],
            )
            .map_err(|e| ProductionError::Store(e.to_string()))?;

        let mut records = Vec::new();
        for row in &rows {
            records.push(history_from_row(row)?);
        }
        Ok(records)
    }

    fn latest_history_row(
        &self,
        qr_code_id: &str,
    ) -> Result<BundleHistoryRecord, ProductionError> {
        let rows = self.sql
            .query(
                "SELECT seq, data FROM bundle_history \
                 WHERE factory = ?1 AND qr_code_id = ?2 ORDER BY seq DESC LIMIT 1",
                &[
                    Value::Text(self.factory.clone()),
                    Value::Text(qr_code_id.to_string()),
                ],
            )
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ProductionError::Internal("history row vanished".into()))?;
        history_from_row(row)
    }
}

fn history_from_row(row: &stitchline_sql::Row) -> Result<BundleHistoryRecord, ProductionError> {
    let seq = row
        .get_i64("seq")
        .ok_or_else(|| ProductionError::Internal("missing seq column".into()))?;
    let data = row
        .get_str("data")
        .ok_or_else(|| ProductionError::Internal("missing data column".into()))?;
    let mut record: BundleHistoryRecord = serde_json::from_str(data)
        .map_err(|e| ProductionError::Internal(e.to_string()))?;
    record.seq = seq;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::STATUS_UNASSIGNED;
    use crate::service::checkpoint::tests::checkpoint;
    use crate::service::qrcode::AssignCodes;
    use crate::service::tests::test_service;
    use crate::service::workorder::tests::sample_workorder;

    /// One work order, two checkpoints, `total` codes with `assigned` of
    /// them assigned to the work order.
    fn scanning_fixture(
        svc: &ProductionService,
        total: i64,
        assigned: usize,
    ) -> (Vec<String>, String, String) {
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let sewing_in = svc
            .create_checkpoint(checkpoint("Sewing In", "Sewing", true, false))
            .unwrap();
        let sewing_out = svc
            .create_checkpoint(checkpoint("Sewing Out", "Sewing", false, true))
            .unwrap();

        let ids: Vec<String> = svc
            .generate_codes(total)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        svc.assign_codes(AssignCodes {
            ids: ids[..assigned].to_vec(),
            work_order_no: "WO-01".into(),
            size: "M".into(),
            bundle_qty: 20,
        })
        .unwrap();

        (ids, sewing_in.id, sewing_out.id)
    }

    #[test]
    fn find_bundle_requires_assignment() {
        let (svc, _dir) = test_service();
        let (ids, _, _) = scanning_fixture(&svc, 10, 5);

        for id in &ids[..5] {
            let ctx = svc.find_bundle(id).unwrap();
            assert_eq!(ctx.work_order.work_order_no, "WO-01");
            assert_eq!(ctx.qr_code.id, *id);
        }
        for id in &ids[5..] {
            assert!(matches!(
                svc.find_bundle(id),
                Err(ProductionError::InvalidState(_))
            ));
        }
        assert!(matches!(
            svc.find_bundle("QR-NOPE"),
            Err(ProductionError::NotFound(_))
        ));
    }

    #[test]
    fn find_bundle_is_case_insensitive() {
        let (svc, _dir) = test_service();
        let (ids, _, _) = scanning_fixture(&svc, 1, 1);
        let ctx = svc.find_bundle(&ids[0].to_lowercase()).unwrap();
        assert_eq!(ctx.qr_code.id, ids[0]);
    }

    #[test]
    fn find_bundle_flags_dangling_work_order() {
        let (svc, _dir) = test_service();
        let (ids, _, _) = scanning_fixture(&svc, 1, 1);

        let wo = svc.get_workorder_by_no("WO-01").unwrap();
        svc.delete_workorder(&wo.id).unwrap();

        assert!(matches!(
            svc.find_bundle(&ids[0]),
            Err(ProductionError::WorkOrderMissing(_))
        ));
    }

    #[test]
    fn confirm_pass_updates_status_and_appends_history() {
        let (svc, _dir) = test_service();
        let (ids, sewing_in, sewing_out) = scanning_fixture(&svc, 1, 1);
        let code = &ids[0];

        let record = svc.confirm_pass(code, &sewing_in).unwrap();
        assert_eq!(record.check_point_name, "Sewing In");
        assert_eq!(record.status, STATUS_PASSED);
        assert_eq!(record.qr_code_id, *code);
        assert_eq!(record.work_order_id, "WO-01");

        assert_eq!(svc.find_code(code).unwrap().status, "Sewing In");

        let second = svc.confirm_pass(code, &sewing_out).unwrap();
        assert!(second.seq > record.seq);
        assert_eq!(svc.find_code(code).unwrap().status, "Sewing Out");

        let history = svc.bundle_history(code).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].check_point_name, "Sewing In");
        assert_eq!(history[1].check_point_name, "Sewing Out");
    }

    #[test]
    fn repeated_pass_is_idempotent_on_status_cumulative_on_history() {
        let (svc, _dir) = test_service();
        let (ids, sewing_in, _) = scanning_fixture(&svc, 1, 1);
        let code = &ids[0];

        svc.confirm_pass(code, &sewing_in).unwrap();
        svc.confirm_pass(code, &sewing_in).unwrap();

        assert_eq!(svc.find_code(code).unwrap().status, "Sewing In");
        let history = svc.bundle_history(code).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.check_point_name == "Sewing In"));
    }

    #[test]
    fn no_ordering_is_enforced_between_checkpoints() {
        let (svc, _dir) = test_service();
        let (ids, sewing_in, sewing_out) = scanning_fixture(&svc, 1, 1);
        let code = &ids[0];

        // Exit before entry is accepted — routing is manual by design.
        svc.confirm_pass(code, &sewing_out).unwrap();
        svc.confirm_pass(code, &sewing_in).unwrap();
        assert_eq!(svc.find_code(code).unwrap().status, "Sewing In");
    }

    #[test]
    fn unknown_checkpoint_leaves_everything_untouched() {
        let (svc, _dir) = test_service();
        let (ids, _, _) = scanning_fixture(&svc, 1, 1);
        let code = &ids[0];

        assert!(matches!(
            svc.confirm_pass(code, "no-such-checkpoint"),
            Err(ProductionError::NotFound(_))
        ));
        assert_eq!(svc.find_code(code).unwrap().status, STATUS_UNASSIGNED);
        assert!(svc.bundle_history(code).unwrap().is_empty());
    }

    #[test]
    fn unassigned_code_cannot_pass() {
        let (svc, _dir) = test_service();
        let (ids, sewing_in, _) = scanning_fixture(&svc, 2, 1);

        assert!(matches!(
            svc.confirm_pass(&ids[1], &sewing_in),
            Err(ProductionError::InvalidState(_))
        ));
        assert!(svc.bundle_history(&ids[1]).unwrap().is_empty());
    }
}
