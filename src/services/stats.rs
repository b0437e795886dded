//! Dashboard, alerts and reports

use chrono::{Duration, NaiveDate, Utc};
use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentKind, EquipmentStatus},
        equipment::StatusCounts,
        failure::FailureQuery,
        report::{
            Alert, AlertLevel, DashboardPercentages, DashboardStats, DashboardTotals,
            EquipmentStatusReport, ExecutiveSummary, FailureReport, OverallStatus, RecentActivity,
        },
    },
    repository::{stats::FailureGroup, Repository},
};

const CRITICAL_ALERTS: i64 = 3;
const WARNING_ALERTS: i64 = 3;
const INFO_ALERTS: i64 = 2;
const RECENT_FAILURES: i64 = 5;
const RECENT_CAMERAS: i64 = 5;
const UPCOMING_DAYS: i64 = 7;
const TOP_EQUIPMENT: i64 = 10;
const DEFAULT_REPORT_DAYS: i64 = 30;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part` as a percentage of `whole`, 0 when `whole` is 0
pub fn percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / whole as f64)
}

pub fn percentages(totals: &DashboardTotals, resolved_failures: i64) -> DashboardPercentages {
    DashboardPercentages {
        active_cameras: percent(totals.active_cameras, totals.cameras),
        inactive_cameras: percent(totals.cameras - totals.active_cameras, totals.cameras),
        open_failures: percent(totals.open_failures, totals.failures),
        resolved_failures: percent(resolved_failures, totals.failures),
    }
}

/// Share of `part` in `whole` as an unrounded fraction, 0 when `whole` is 0
fn ratio(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// 100 minus penalties for inactive cameras, open failures, no maintenance history
/// and no users; only the final score is rounded
pub fn health_score(totals: &DashboardTotals) -> f64 {
    let mut score = 100.0;
    score -= ratio(totals.cameras - totals.active_cameras, totals.cameras) * 30.0;
    score -= ratio(totals.open_failures, totals.failures) * 40.0;
    if totals.maintenance == 0 {
        score -= 10.0;
    }
    if totals.users == 0 {
        score -= 20.0;
    }
    round1(score.clamp(0.0, 100.0))
}

pub fn overall_status(uptime: f64, open_failures: i64) -> OverallStatus {
    if uptime >= 95.0 && open_failures <= 5 {
        OverallStatus::Excellent
    } else if uptime >= 90.0 && open_failures <= 10 {
        OverallStatus::Good
    } else if uptime >= 80.0 && open_failures <= 20 {
        OverallStatus::Regular
    } else {
        OverallStatus::Critical
    }
}

pub fn recommendations(uptime: f64, open_failures: i64, critical_failures: i64) -> Vec<String> {
    let mut out = Vec::new();
    if critical_failures > 0 {
        out.push(format!(
            "Attend the {} critical failure(s) first",
            critical_failures
        ));
    }
    if uptime < 90.0 {
        out.push("Review cameras with connectivity or power problems".to_string());
    }
    if open_failures > 10 {
        out.push("Prioritise resolving open failures".to_string());
    }
    if uptime < 80.0 {
        out.push("Plan a general preventive maintenance round".to_string());
    }
    out
}

/// Report range; defaults to the last 30 days ending today
pub fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(end - Duration::days(DEFAULT_REPORT_DAYS));
    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok((start, end))
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let totals = self.repository.stats.dashboard_totals().await?;
        let resolved = self.repository.stats.resolved_failures().await?;
        let pct = percentages(&totals, resolved);
        let score = health_score(&totals);

        Ok(DashboardStats {
            totals,
            percentages: pct,
            health_score: score,
            generated_at: Utc::now(),
        })
    }

    /// Cameras down, newest open tickets and overdue maintenance
    pub async fn alerts(&self) -> AppResult<Vec<Alert>> {
        let mut alerts = Vec::new();

        for camera in self
            .repository
            .stats
            .cameras_needing_attention(CRITICAL_ALERTS)
            .await?
        {
            let state = match camera.status {
                EquipmentStatus::Failing => "is failing",
                EquipmentStatus::Maintenance => "is under maintenance",
                _ => "is inactive",
            };
            alerts.push(Alert {
                level: AlertLevel::Critical,
                title: format!("Camera {}", camera.code),
                message: format!("{} {}", camera.name, state),
                equipment_kind: Some(EquipmentKind::Camera),
                equipment_id: Some(camera.id),
                failure_id: None,
                maintenance_id: None,
            });
        }

        let open = FailureQuery {
            pending: Some(true),
            per_page: Some(WARNING_ALERTS),
            ..Default::default()
        };
        let (failures, _) = self.repository.failures.list(&open).await?;
        for details in failures {
            let f = &details.failure;
            alerts.push(Alert {
                level: AlertLevel::Warning,
                title: format!(
                    "Open failure {}",
                    f.code.clone().unwrap_or_else(|| f.id.to_string())
                ),
                message: format!(
                    "{} ({} priority) on {}",
                    f.title,
                    f.priority,
                    details.equipment_code.as_deref().unwrap_or("unknown equipment")
                ),
                equipment_kind: Some(f.equipment_kind),
                equipment_id: Some(f.equipment_id),
                failure_id: Some(f.id),
                maintenance_id: None,
            });
        }

        for m in self.repository.maintenance.overdue(Some(INFO_ALERTS)).await? {
            let due = m
                .scheduled_for
                .map(|d| d.to_string())
                .unwrap_or_default();
            alerts.push(Alert {
                level: AlertLevel::Info,
                title: "Overdue maintenance".to_string(),
                message: format!("{} was scheduled for {}", m.title, due),
                equipment_kind: Some(m.equipment_kind),
                equipment_id: Some(m.equipment_id),
                failure_id: None,
                maintenance_id: Some(m.id),
            });
        }

        Ok(alerts)
    }

    pub async fn recent(&self) -> AppResult<RecentActivity> {
        let latest = FailureQuery {
            per_page: Some(RECENT_FAILURES),
            ..Default::default()
        };
        let (recent_failures, _) = self.repository.failures.list(&latest).await?;
        let until = Utc::now().date_naive() + Duration::days(UPCOMING_DAYS);
        let upcoming_maintenance = self.repository.maintenance.upcoming(until).await?;
        let cameras_with_failures = self
            .repository
            .stats
            .cameras_with_open_failures(RECENT_CAMERAS)
            .await?;

        Ok(RecentActivity {
            recent_failures,
            upcoming_maintenance,
            cameras_with_failures,
        })
    }

    pub async fn executive_summary(&self) -> AppResult<ExecutiveSummary> {
        let totals = self.repository.stats.dashboard_totals().await?;
        let critical = self.repository.stats.critical_open_failures().await?;
        let since = Utc::now().date_naive() - Duration::days(30);
        let failures_last_30_days = self.repository.stats.failures_since(since).await?;
        let maintenance_completed_last_30_days = self
            .repository
            .stats
            .maintenance_completed_since(since)
            .await?;

        let uptime = percent(totals.active_cameras, totals.cameras);
        let open = totals.open_failures + totals.in_progress_failures;

        Ok(ExecutiveSummary {
            total_cameras: totals.cameras,
            operational_cameras: totals.active_cameras,
            uptime_percent: uptime,
            open_failures: open,
            critical_failures: critical,
            failures_last_30_days,
            maintenance_completed_last_30_days,
            overall_status: overall_status(uptime, open),
            recommendations: recommendations(uptime, open, critical),
            generated_at: Utc::now(),
        })
    }

    pub async fn failure_report(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<FailureReport> {
        let (start, end) = resolve_period(start, end, Utc::now().date_naive())?;
        let stats = &self.repository.stats;

        let by_status: IndexMap<String, i64> = stats
            .failures_grouped(FailureGroup::Status, start, end)
            .await?
            .into_iter()
            .collect();
        let by_priority: IndexMap<String, i64> = stats
            .failures_grouped(FailureGroup::Priority, start, end)
            .await?
            .into_iter()
            .collect();
        let by_equipment_kind: IndexMap<String, i64> = stats
            .failures_grouped(FailureGroup::EquipmentKind, start, end)
            .await?
            .into_iter()
            .collect();

        Ok(FailureReport {
            start_date: start,
            end_date: end,
            total: by_status.values().sum(),
            by_status,
            by_priority,
            by_equipment_kind,
            per_day: stats.failures_per_day(start, end).await?,
            mean_resolution_hours: stats.mean_resolution_hours(start, end).await?,
            top_equipment: stats.top_failing_equipment(start, end, TOP_EQUIPMENT).await?,
        })
    }

    pub async fn equipment_status(&self) -> AppResult<EquipmentStatusReport> {
        let mut kinds = IndexMap::new();
        let mut totals = StatusCounts::default();
        for kind in EquipmentKind::ALL {
            let mut counts = StatusCounts::default();
            for (status, n) in self.repository.equipment.status_counts(*kind).await? {
                counts.add(status, n);
                totals.add(status, n);
            }
            kinds.insert(kind.as_str().to_string(), counts);
        }
        Ok(EquipmentStatusReport { kinds, totals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(cameras: i64, active: i64, failures: i64, open: i64) -> DashboardTotals {
        DashboardTotals {
            users: 3,
            cameras,
            active_cameras: active,
            failures,
            open_failures: open,
            maintenance: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_percent_rounds_and_handles_zero() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(5, 0), 0.0);
    }

    #[test]
    fn test_health_score_healthy_system() {
        let t = totals(100, 100, 10, 0);
        assert_eq!(health_score(&t), 100.0);
    }

    #[test]
    fn test_health_score_penalties() {
        // 20% inactive -> -6, 50% open -> -20
        let t = totals(100, 80, 10, 5);
        assert_eq!(health_score(&t), 74.0);

        let empty = DashboardTotals::default();
        // no maintenance and no users
        assert_eq!(health_score(&empty), 70.0);
    }

    #[test]
    fn test_health_score_rounds_only_the_result() {
        // 3 of 7 open is 42.857%, rounding it first would give 82.8
        let t = totals(10, 10, 7, 3);
        assert_eq!(health_score(&t), 82.9);
        // 4 of 7 open is 57.143%, rounding it first would give 77.2
        let t = totals(10, 10, 7, 4);
        assert_eq!(health_score(&t), 77.1);
    }

    #[test]
    fn test_health_score_is_bounded() {
        let t = DashboardTotals {
            cameras: 10,
            failures: 10,
            open_failures: 10,
            ..Default::default()
        };
        let score = health_score(&t);
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_overall_status_thresholds() {
        assert_eq!(overall_status(99.0, 2), OverallStatus::Excellent);
        assert_eq!(overall_status(99.0, 6), OverallStatus::Good);
        assert_eq!(overall_status(91.0, 10), OverallStatus::Good);
        assert_eq!(overall_status(85.0, 3), OverallStatus::Regular);
        assert_eq!(overall_status(85.0, 21), OverallStatus::Critical);
        assert_eq!(overall_status(50.0, 0), OverallStatus::Critical);
    }

    #[test]
    fn test_recommendations() {
        assert!(recommendations(99.0, 0, 0).is_empty());
        assert_eq!(recommendations(75.0, 11, 0).len(), 3);
        assert_eq!(recommendations(99.0, 0, 2).len(), 1);
    }

    #[test]
    fn test_resolve_period() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let (start, end) = resolve_period(None, None, today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());

        let later = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert!(resolve_period(Some(later), Some(today), today).is_err());
    }
}
