use serde::Deserialize;

use stitchline_core::{ListQuery, Page, now_rfc3339};
use stitchline_sql::Value;

use crate::model::{QrCode, STATUS_UNASSIGNED};
use crate::service::{ProductionError, ProductionService};

/// Generation batch bounds. The upper bound keeps one batch printable and
/// exportable in a single go.
const MIN_BATCH: i64 = 1;
const MAX_BATCH: i64 = 500;

/// Input for assigning generated codes to a work order. Size and bundle
/// quantity are fixed on the codes at this point; bundle numbers are
/// assigned sequentially, continuing from what the work order already has.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCodes {
    pub ids: Vec<String>,
    pub work_order_no: String,
    pub size: String,
    pub bundle_qty: u32,
}

#[derive(Debug, Default)]
pub struct QrCodeFilters {
    pub status: Option<String>,
    pub work_order_id: Option<String>,
}

impl ProductionService {
    /// Generate a batch of blank codes.
    ///
    /// Ids are timestamp + random suffix; collisions are treated as
    /// negligible and not formally deduplicated (a real collision
    /// surfaces as a primary-key conflict).
    pub fn generate_codes(&self, count: i64) -> Result<Vec<QrCode>, ProductionError> {
        if !(MIN_BATCH..=MAX_BATCH).contains(&count) {
            return Err(ProductionError::Validation(format!(
                "quantity must be between {} and {}, got {}",
                MIN_BATCH, MAX_BATCH, count
            )));
        }

        let mut codes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let now = now_rfc3339();
            let code = QrCode {
                id: new_code_id(),
                factory: self.factory.clone(),
                work_order_id: None,
                status: STATUS_UNASSIGNED.to_string(),
                size: None,
                bundle_qty: 0,
                bundle_no: 0,
                created_at: now.clone(),
                updated_at: now.clone(),
            };

            self.insert_record("qrcodes", &code.id, &code, &[
                ("work_order_id", Value::Null),
                ("status", Value::Text(STATUS_UNASSIGNED.into())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ])?;

            codes.push(code);
        }

        Ok(codes)
    }

    /// Case-insensitive exact lookup of a code by its scanned id.
    pub fn find_code(&self, code: &str) -> Result<QrCode, ProductionError> {
        let rows = self.sql
            .query(
                "SELECT data FROM qrcodes WHERE factory = ?1 AND id = ?2 COLLATE NOCASE",
                &[
                    Value::Text(self.factory.clone()),
                    Value::Text(code.to_string()),
                ],
            )
            .map_err(|e| ProductionError::Store(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ProductionError::NotFound(format!("bundle '{}'", code)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ProductionError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ProductionError::Internal(e.to_string()))
    }

    /// Assign blank codes to a work order. The codes' status stays
    /// "Unassigned" until the first checkpoint pass.
    pub fn assign_codes(&self, input: AssignCodes) -> Result<Vec<QrCode>, ProductionError> {
        if input.ids.is_empty() {
            return Err(ProductionError::Validation("no code ids given".into()));
        }
        if input.bundle_qty == 0 {
            return Err(ProductionError::Validation("bundleQty must be positive".into()));
        }
        let workorder = self.get_workorder_by_no(&input.work_order_no)?;

        // Resolve everything first so a bad id fails the whole request
        // before any code is touched.
        let mut resolved = Vec::with_capacity(input.ids.len());
        for id in &input.ids {
            let code = self.find_code(id)?;
            if code.is_assigned() {
                return Err(ProductionError::InvalidState(format!(
                    "code '{}' is already assigned to work order '{}'",
                    code.id,
                    code.work_order_id.as_deref().unwrap_or_default()
                )));
            }
            resolved.push(code);
        }

        // Bundle numbering continues from what the work order already has.
        let existing = self.count_records(
            "qrcodes",
            &[("work_order_id", Value::Text(workorder.work_order_no.clone()))],
        )? as u32;

        let mut assigned = Vec::with_capacity(resolved.len());
        for (i, mut code) in resolved.into_iter().enumerate() {
            code.work_order_id = Some(workorder.work_order_no.clone());
            code.size = Some(input.size.clone());
            code.bundle_qty = input.bundle_qty;
            code.bundle_no = existing + i as u32 + 1;
            code.updated_at = now_rfc3339();

            self.update_record("qrcodes", &code.id, &code, &[
                ("work_order_id", Value::Text(workorder.work_order_no.clone())),
                ("updated_at", Value::Text(code.updated_at.clone())),
            ])?;

            assigned.push(code);
        }

        Ok(assigned)
    }

    pub fn get_qrcode(&self, id: &str) -> Result<QrCode, ProductionError> {
        self.get_record("qrcodes", id)
    }

    pub fn list_qrcodes(
        &self,
        params: &ListQuery,
        filters: &QrCodeFilters,
    ) -> Result<Page<QrCode>, ProductionError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref s) = filters.status {
            f.push(("status", Value::Text(s.clone())));
        }
        if let Some(ref wo) = filters.work_order_id {
            f.push(("work_order_id", Value::Text(wo.clone())));
        }
        self.list_records("qrcodes", &f, limit, params.offset)
    }
}

/// Build a new code id: `QR` + base-36 millisecond timestamp + random
/// suffix. Short enough to type by hand when the label is damaged.
fn new_code_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("QR{}-{}", base36(millis), suffix[..6].to_uppercase())
}

/// Unsigned base-36 rendering, uppercase.
fn base36(mut n: i64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n <= 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::service::tests::{test_service, test_service_pair};
    use crate::service::workorder::tests::sample_workorder;

    #[test]
    fn base36_renders() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn generate_produces_distinct_blank_codes() {
        let (svc, _dir) = test_service();
        let codes = svc.generate_codes(10).unwrap();
        assert_eq!(codes.len(), 10);

        let ids: HashSet<&str> = codes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 10);

        for code in &codes {
            assert!(code.id.starts_with("QR"));
            assert_eq!(code.work_order_id, None);
            assert_eq!(code.status, STATUS_UNASSIGNED);
        }
    }

    #[test]
    fn generate_bounds() {
        let (svc, _dir) = test_service();
        assert!(matches!(svc.generate_codes(0), Err(ProductionError::Validation(_))));
        assert!(matches!(svc.generate_codes(-1), Err(ProductionError::Validation(_))));
        assert!(matches!(svc.generate_codes(501), Err(ProductionError::Validation(_))));
        assert_eq!(svc.generate_codes(1).unwrap().len(), 1);
        assert_eq!(svc.generate_codes(500).unwrap().len(), 500);
    }

    #[test]
    fn find_is_case_insensitive() {
        let (svc, _dir) = test_service();
        let codes = svc.generate_codes(1).unwrap();
        let id = &codes[0].id;

        let lower = svc.find_code(&id.to_lowercase()).unwrap();
        let upper = svc.find_code(&id.to_uppercase()).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.id, *id);

        assert!(matches!(
            svc.find_code("QR-DOES-NOT-EXIST"),
            Err(ProductionError::NotFound(_))
        ));
    }

    #[test]
    fn assignment_sets_attributes_but_not_status() {
        let (svc, _dir) = test_service();
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let codes = svc.generate_codes(3).unwrap();

        let assigned = svc
            .assign_codes(AssignCodes {
                ids: codes.iter().map(|c| c.id.clone()).collect(),
                work_order_no: "WO-01".into(),
                size: "M".into(),
                bundle_qty: 20,
            })
            .unwrap();

        for (i, code) in assigned.iter().enumerate() {
            assert_eq!(code.work_order_id.as_deref(), Some("WO-01"));
            assert_eq!(code.size.as_deref(), Some("M"));
            assert_eq!(code.bundle_qty, 20);
            assert_eq!(code.bundle_no, i as u32 + 1);
            // Status is only ever advanced by checkpoint passes.
            assert_eq!(code.status, STATUS_UNASSIGNED);
        }

        // A second batch continues the numbering.
        let more = svc.generate_codes(2).unwrap();
        let assigned = svc
            .assign_codes(AssignCodes {
                ids: more.iter().map(|c| c.id.clone()).collect(),
                work_order_no: "WO-01".into(),
                size: "L".into(),
                bundle_qty: 20,
            })
            .unwrap();
        assert_eq!(assigned[0].bundle_no, 4);
        assert_eq!(assigned[1].bundle_no, 5);
    }

    #[test]
    fn assignment_rejects_unknown_workorder_and_reassignment() {
        let (svc, _dir) = test_service();
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let codes = svc.generate_codes(1).unwrap();
        let ids: Vec<String> = codes.iter().map(|c| c.id.clone()).collect();

        assert!(matches!(
            svc.assign_codes(AssignCodes {
                ids: ids.clone(),
                work_order_no: "WO-99".into(),
                size: "M".into(),
                bundle_qty: 20,
            }),
            Err(ProductionError::NotFound(_))
        ));

        svc.assign_codes(AssignCodes {
            ids: ids.clone(),
            work_order_no: "WO-01".into(),
            size: "M".into(),
            bundle_qty: 20,
        })
        .unwrap();

        // Attributes are fixed at assignment time — no silent overwrite.
        assert!(matches!(
            svc.assign_codes(AssignCodes {
                ids,
                work_order_no: "WO-01".into(),
                size: "L".into(),
                bundle_qty: 10,
            }),
            Err(ProductionError::InvalidState(_))
        ));
    }

    #[test]
    fn codes_are_scoped_per_factory() {
        let (a, b, _dir) = test_service_pair();
        let codes = a.generate_codes(1).unwrap();
        assert!(a.find_code(&codes[0].id).is_ok());
        assert!(b.find_code(&codes[0].id).is_err());
    }
}
