//! Finish-sewing QC checklist flow.
//!
//! Eligibility here is expressed against `status` ("has passed at least
//! one checkpoint"), NOT against `workOrderId` as the scanning workflow
//! does. The two predicates co-occur today but are kept independent on
//! purpose — they may diverge.

use tracing::info;

use stitchline_core::{ListQuery, Page, new_id, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{
    QcChecklist, QcChecklistItem, QcFailure, QcItemResult, QcOutcome, QcReport, QrCode,
    STATUS_UNASSIGNED,
};
use crate::service::{ProductionError, ProductionService};

impl ProductionService {
    /// Resolve a code for the QC workflow: it must exist and have passed
    /// at least one checkpoint.
    pub fn qc_find_bundle(&self, code: &str) -> Result<QrCode, ProductionError> {
        let qr_code = self.find_code(code)?;
        if qr_code.status == STATUS_UNASSIGNED {
            return Err(ProductionError::InvalidState(format!(
                "bundle '{}' has not passed any checkpoint yet",
                qr_code.id
            )));
        }
        Ok(qr_code)
    }

    /// Materialize the checklist for an eligible bundle: exactly
    /// `bundleQty` line items, all unset.
    pub fn qc_checklist(&self, code: &str) -> Result<QcChecklist, ProductionError> {
        let qr_code = self.qc_find_bundle(code)?;
        let items = (1..=qr_code.bundle_qty)
            .map(|seq| QcChecklistItem { seq, outcome: QcOutcome::Unset })
            .collect();
        Ok(QcChecklist { qr_code, items })
    }

    /// The factory's configured failure reasons (KV file layer). An empty
    /// list means no list is configured — membership is then not checked.
    pub fn qc_failure_reasons(&self) -> Result<Vec<String>, ProductionError> {
        let key = format!("config:qc_reasons:{}", self.factory);
        match self.kv.get(&key) {
            Ok(Some(bytes)) => serde_yaml::from_slice(&bytes)
                .map_err(|e| ProductionError::Internal(format!("bad reason list: {}", e))),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(ProductionError::Store(e.to_string())),
        }
    }

    /// Validate and record a checklist submission.
    ///
    /// Submission is a terminal reporting action: it never calls back
    /// into the lifecycle engine, so the bundle's status is untouched.
    pub fn submit_qc(
        &self,
        code: &str,
        items: Vec<QcItemResult>,
    ) -> Result<QcReport, ProductionError> {
        let qr_code = self.qc_find_bundle(code)?;

        if items.len() as u32 != qr_code.bundle_qty {
            return Err(ProductionError::Validation(format!(
                "checklist must contain exactly {} items, got {}",
                qr_code.bundle_qty,
                items.len()
            )));
        }

        let reasons = self.qc_failure_reasons()?;

        let mut passed = 0u32;
        let mut failed = 0u32;
        let mut unset = 0u32;
        let mut failures = Vec::new();

        for item in &items {
            match (item.passed, item.failed) {
                (true, true) => {
                    return Err(ProductionError::Validation(format!(
                        "item {} cannot be both passed and failed",
                        item.seq
                    )));
                }
                (true, false) => passed += 1,
                (false, true) => {
                    let reason = item
                        .reason
                        .as_deref()
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .ok_or_else(|| {
                            ProductionError::Validation(format!(
                                "item {} failed without a reason",
                                item.seq
                            ))
                        })?;
                    if !reasons.is_empty() && !reasons.iter().any(|r| r == reason) {
                        return Err(ProductionError::Validation(format!(
                            "item {}: '{}' is not a configured failure reason",
                            item.seq, reason
                        )));
                    }
                    failed += 1;
                    failures.push(QcFailure { seq: item.seq, reason: reason.to_string() });
                }
                (false, false) => unset += 1,
            }
        }

        let id = new_id();
        let now = now_rfc3339();
        let report = QcReport {
            id: id.clone(),
            factory: self.factory.clone(),
            qr_code_id: qr_code.id.clone(),
            work_order_id: qr_code.work_order_id.clone(),
            passed,
            failed,
            unset,
            failures,
            recorded_at: now.clone(),
        };

        self.insert_record("qc_reports", &id, &report, &[
            ("qr_code_id", Value::Text(report.qr_code_id.clone())),
            (
                "work_order_id",
                match &report.work_order_id {
                    Some(wo) => Value::Text(wo.clone()),
                    None => Value::Null,
                },
            ),
            ("created_at", Value::Text(now)),
        ])?;

        info!(
            code = %report.qr_code_id,
            passed,
            failed,
            unset,
            "qc checklist submitted"
        );

        Ok(report)
    }

    /// Past QC reports for one code.
    pub fn list_qc_reports(
        &self,
        qr_code_id: &str,
        params: &ListQuery,
    ) -> Result<Page<QcReport>, ProductionError> {
        self.list_records(
            "qc_reports",
            &[("qr_code_id", Value::Text(qr_code_id.to_string()))],
            params.limit.min(500),
            params.offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::checkpoint::tests::checkpoint;
    use crate::service::qrcode::AssignCodes;
    use crate::service::tests::test_service;
    use crate::service::workorder::tests::sample_workorder;

    /// One assigned bundle of 20 pieces that has passed "Sewing Out".
    fn qc_fixture(svc: &ProductionService) -> String {
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let cp = svc
            .create_checkpoint(checkpoint("Sewing Out", "Sewing", false, true))
            .unwrap();
        let codes = svc.generate_codes(1).unwrap();
        svc.assign_codes(AssignCodes {
            ids: vec![codes[0].id.clone()],
            work_order_no: "WO-01".into(),
            size: "M".into(),
            bundle_qty: 20,
        })
        .unwrap();
        svc.confirm_pass(&codes[0].id, &cp.id).unwrap();
        codes[0].id.clone()
    }

    fn all_passed(count: u32) -> Vec<QcItemResult> {
        (1..=count)
            .map(|seq| QcItemResult { seq, passed: true, failed: false, reason: None })
            .collect()
    }

    #[test]
    fn eligibility_is_by_status_not_assignment() {
        let (svc, _dir) = test_service();
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let codes = svc.generate_codes(1).unwrap();
        svc.assign_codes(AssignCodes {
            ids: vec![codes[0].id.clone()],
            work_order_no: "WO-01".into(),
            size: "M".into(),
            bundle_qty: 20,
        })
        .unwrap();

        // Assigned but never scanned: scanning would accept it, QC does not.
        assert!(svc.find_bundle(&codes[0].id).is_ok());
        assert!(matches!(
            svc.qc_find_bundle(&codes[0].id),
            Err(ProductionError::InvalidState(_))
        ));
    }

    #[test]
    fn checklist_materializes_bundle_qty_items() {
        let (svc, _dir) = test_service();
        let code = qc_fixture(&svc);

        let checklist = svc.qc_checklist(&code).unwrap();
        assert_eq!(checklist.items.len(), 20);
        assert!(checklist.items.iter().all(|i| i.outcome == QcOutcome::Unset));
        assert_eq!(checklist.items[0].seq, 1);
        assert_eq!(checklist.items[19].seq, 20);
    }

    #[test]
    fn failed_item_requires_reason() {
        let (svc, _dir) = test_service();
        let code = qc_fixture(&svc);

        let mut items = all_passed(20);
        items[2] = QcItemResult { seq: 3, passed: false, failed: true, reason: None };
        assert!(matches!(
            svc.submit_qc(&code, items),
            Err(ProductionError::Validation(_))
        ));

        let mut items = all_passed(20);
        items[2] = QcItemResult {
            seq: 3,
            passed: false,
            failed: true,
            reason: Some("Broken stitch".into()),
        };
        let report = svc.submit_qc(&code, items).unwrap();
        assert_eq!(report.passed, 19);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures, vec![QcFailure { seq: 3, reason: "Broken stitch".into() }]);
    }

    #[test]
    fn passed_and_failed_are_mutually_exclusive() {
        let (svc, _dir) = test_service();
        let code = qc_fixture(&svc);

        let mut items = all_passed(20);
        items[0] = QcItemResult {
            seq: 1,
            passed: true,
            failed: true,
            reason: Some("Broken stitch".into()),
        };
        assert!(matches!(
            svc.submit_qc(&code, items),
            Err(ProductionError::Validation(_))
        ));
    }

    #[test]
    fn configured_reason_list_is_enforced() {
        let (svc, _dir) = test_service();
        let code = qc_fixture(&svc);

        svc.kv
            .set(
                "config:qc_reasons:dhaka-1",
                b"- Broken stitch\n- Skipped stitch\n- Oil stain\n",
            )
            .unwrap();

        let mut items = all_passed(20);
        items[4] = QcItemResult {
            seq: 5,
            passed: false,
            failed: true,
            reason: Some("Made up reason".into()),
        };
        assert!(matches!(
            svc.submit_qc(&code, items),
            Err(ProductionError::Validation(_))
        ));

        let mut items = all_passed(20);
        items[4] = QcItemResult {
            seq: 5,
            passed: false,
            failed: true,
            reason: Some("Oil stain".into()),
        };
        svc.submit_qc(&code, items).unwrap();
    }

    #[test]
    fn submission_never_advances_status() {
        let (svc, _dir) = test_service();
        let code = qc_fixture(&svc);

        let before = svc.find_code(&code).unwrap().status;
        svc.submit_qc(&code, all_passed(20)).unwrap();
        assert_eq!(svc.find_code(&code).unwrap().status, before);

        // And the report is queryable afterwards.
        let reports = svc.list_qc_reports(&code, &Default::default()).unwrap();
        assert_eq!(reports.total, 1);
        assert_eq!(reports.items[0].unset, 0);
    }

    #[test]
    fn item_count_must_match_bundle_qty() {
        let (svc, _dir) = test_service();
        let code = qc_fixture(&svc);
        assert!(matches!(
            svc.submit_qc(&code, all_passed(19)),
            Err(ProductionError::Validation(_))
        ));
    }
}
