use serde::Serialize;

use stitchline_sql::Value;

use crate::model::STATUS_UNASSIGNED;
use crate::service::{ProductionError, ProductionService};

/// Bundle tally for one status label (= most recent checkpoint name).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Factory dashboard summary. `bundles_by_status` groups purely on the
/// stored status label — there is no flow-graph position to report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub machines: i64,
    pub workers: i64,
    pub workorders: i64,
    pub checkpoints: i64,
    pub bundles: i64,
    pub bundles_unassigned: i64,
    pub bundles_in_production: i64,
    pub bundles_by_status: Vec<StatusCount>,
}

impl ProductionService {
    pub fn dashboard_summary(&self) -> Result<DashboardSummary, ProductionError> {
        let machines = self.count_records("machines", &[])?;
        let workers = self.count_records("workers", &[])?;
        let workorders = self.count_records("workorders", &[])?;
        let checkpoints = self.count_records("checkpoints", &[])?;
        let bundles = self.count_records("qrcodes", &[])?;
        let bundles_unassigned = self.count_records(
            "qrcodes",
            &[("status", Value::Text(STATUS_UNASSIGNED.into()))],
        )?;

        let rows = self.sql
            .query(
                "SELECT status, COUNT(*) as cnt FROM qrcodes \
                 WHERE factory = ?1 AND status != ?2 \
                 GROUP BY status ORDER BY cnt DESC",
                &[
                    Value::Text(self.factory.clone()),
                    Value::Text(STATUS_UNASSIGNED.into()),
                ],
            )
            .map_err(|e| ProductionError::Store(e.to_string()))?;

        let mut bundles_by_status = Vec::new();
        for row in &rows {
            if let (Some(status), Some(count)) = (row.get_str("status"), row.get_i64("cnt")) {
                bundles_by_status.push(StatusCount { status: status.to_string(), count });
            }
        }

        Ok(DashboardSummary {
            machines,
            workers,
            workorders,
            checkpoints,
            bundles,
            bundles_unassigned,
            bundles_in_production: bundles - bundles_unassigned,
            bundles_by_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::service::checkpoint::tests::checkpoint;
    use crate::service::qrcode::AssignCodes;
    use crate::service::tests::test_service;
    use crate::service::workorder::tests::sample_workorder;

    #[test]
    fn tallies_reflect_most_recent_checkpoint_only() {
        let (svc, _dir) = test_service();
        svc.create_workorder(sample_workorder("WO-01")).unwrap();
        let sewing_in = svc
            .create_checkpoint(checkpoint("Sewing In", "Sewing", true, false))
            .unwrap();
        let sewing_out = svc
            .create_checkpoint(checkpoint("Sewing Out", "Sewing", false, true))
            .unwrap();

        let ids: Vec<String> = svc
            .generate_codes(4)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        svc.assign_codes(AssignCodes {
            ids: ids[..3].to_vec(),
            work_order_no: "WO-01".into(),
            size: "M".into(),
            bundle_qty: 20,
        })
        .unwrap();

        // Two bundles at Sewing In; one of them moves on to Sewing Out.
        svc.confirm_pass(&ids[0], &sewing_in.id).unwrap();
        svc.confirm_pass(&ids[1], &sewing_in.id).unwrap();
        svc.confirm_pass(&ids[1], &sewing_out.id).unwrap();

        let summary = svc.dashboard_summary().unwrap();
        assert_eq!(summary.bundles, 4);
        // Assigned-but-unscanned still counts as Unassigned: the tally
        // groups on the status label, nothing else.
        assert_eq!(summary.bundles_unassigned, 2);
        assert_eq!(summary.bundles_in_production, 2);
        assert_eq!(summary.checkpoints, 2);

        let by_status: std::collections::HashMap<_, _> = summary
            .bundles_by_status
            .iter()
            .map(|s| (s.status.as_str(), s.count))
            .collect();
        assert_eq!(by_status.get("Sewing In"), Some(&1));
        assert_eq!(by_status.get("Sewing Out"), Some(&1));
    }
}
