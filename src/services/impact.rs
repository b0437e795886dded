//! Failure impact analysis over the power, network and recording dependencies

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    error::AppResult,
    models::{
        enums::EquipmentKind,
        equipment::EquipmentSummary,
        impact::{EquipmentRef, ImpactAnalysis, ImpactReason, ImpactedDevice},
    },
    repository::{equipment::DependencyRow, Repository},
};

/// A device reached by the walk
#[derive(Debug, Clone, PartialEq)]
pub struct Reached {
    pub device: EquipmentRef,
    pub reason: ImpactReason,
    pub depth: u32,
    pub via: Option<EquipmentRef>,
}

/// Directed graph, upstream device -> devices depending on it
#[derive(Debug, Default)]
pub struct DependencyGraph {
    edges: HashMap<EquipmentRef, Vec<(EquipmentRef, ImpactReason)>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, upstream: EquipmentRef, downstream: EquipmentRef, reason: ImpactReason) {
        if upstream == downstream {
            return;
        }
        self.edges.entry(upstream).or_default().push((downstream, reason));
    }

    pub fn from_rows(rows: &[DependencyRow]) -> Self {
        let mut graph = Self::new();
        for row in rows {
            let reason = match row.link.as_str() {
                "power" => ImpactReason::PowerLoss,
                "recording" => ImpactReason::RecordingLoss,
                _ => ImpactReason::ConnectivityLoss,
            };
            graph.add(
                EquipmentRef::new(row.upstream_kind, row.upstream_id),
                EquipmentRef::new(row.downstream_kind, row.downstream_id),
                reason,
            );
        }
        graph
    }

    /// Breadth-first walk from `origin`; every device is reported once, at its shallowest depth.
    ///
    /// A recording loss does not propagate further: a camera losing its recorder keeps streaming.
    pub fn walk(&self, origin: EquipmentRef) -> Vec<Reached> {
        let mut seen: HashSet<EquipmentRef> = HashSet::from([origin]);
        let mut queue = VecDeque::from([(origin, 0u32)]);
        let mut reached = vec![Reached {
            device: origin,
            reason: ImpactReason::InitialFailure,
            depth: 0,
            via: None,
        }];

        while let Some((current, depth)) = queue.pop_front() {
            let Some(children) = self.edges.get(&current) else {
                continue;
            };
            for (child, reason) in children {
                if !seen.insert(*child) {
                    continue;
                }
                reached.push(Reached {
                    device: *child,
                    reason: *reason,
                    depth: depth + 1,
                    via: Some(current),
                });
                if *reason != ImpactReason::RecordingLoss {
                    queue.push_back((*child, depth + 1));
                }
            }
        }
        reached
    }
}

/// Attach names and statuses and count the cameras affected
pub fn build_analysis(
    origin: EquipmentRef,
    reached: Vec<Reached>,
    summaries: &HashMap<EquipmentRef, EquipmentSummary>,
) -> ImpactAnalysis {
    let affected: Vec<ImpactedDevice> = reached
        .into_iter()
        .map(|r| {
            let summary = summaries.get(&r.device);
            ImpactedDevice {
                equipment: r.device,
                code: summary.map(|s| s.code.clone()),
                name: summary.map(|s| s.name.clone()),
                status: summary.map(|s| s.status),
                reason: r.reason,
                depth: r.depth,
                via: r.via,
            }
        })
        .collect();

    let cameras = affected
        .iter()
        .filter(|d| d.equipment.kind == EquipmentKind::Camera && d.depth > 0);
    let affected_cameras = cameras.clone().count();
    let cameras_without_recording = cameras
        .filter(|d| d.reason == ImpactReason::RecordingLoss)
        .count();

    ImpactAnalysis {
        origin,
        affected,
        affected_cameras,
        cameras_without_recording,
    }
}

#[derive(Clone)]
pub struct ImpactService {
    repository: Repository,
}

impl ImpactService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn analyze(&self, kind: EquipmentKind, id: i32) -> AppResult<ImpactAnalysis> {
        // 404 for unknown equipment
        self.repository.equipment.summary(kind, id).await?;

        let origin = EquipmentRef::new(kind, id);
        let graph = DependencyGraph::from_rows(&self.repository.equipment.dependencies().await?);
        let reached = graph.walk(origin);

        let summaries: HashMap<EquipmentRef, EquipmentSummary> = self
            .repository
            .equipment
            .all_summaries()
            .await?
            .into_iter()
            .map(|s| (EquipmentRef::new(s.kind, s.id), s))
            .collect();

        let analysis = build_analysis(origin, reached, &summaries);
        tracing::debug!(
            origin = %origin,
            affected = analysis.affected.len(),
            cameras = analysis.affected_cameras,
            "Impact analysis"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EquipmentKind::*;

    fn r(kind: EquipmentKind, id: i32) -> EquipmentRef {
        EquipmentRef::new(kind, id)
    }

    /// UPS 1 powers PS 1 and switch 1; switch 1 feeds cameras 1, 2 and NVR 1; NVR 1 records camera 3
    fn campus() -> DependencyGraph {
        let mut g = DependencyGraph::new();
        g.add(r(Ups, 1), r(PowerSupply, 1), ImpactReason::PowerLoss);
        g.add(r(Ups, 1), r(Switch, 1), ImpactReason::PowerLoss);
        g.add(r(PowerSupply, 1), r(Switch, 1), ImpactReason::PowerLoss);
        g.add(r(Switch, 1), r(Camera, 1), ImpactReason::ConnectivityLoss);
        g.add(r(Switch, 1), r(Camera, 2), ImpactReason::ConnectivityLoss);
        g.add(r(Switch, 1), r(Nvr, 1), ImpactReason::ConnectivityLoss);
        g.add(r(Nvr, 1), r(Camera, 3), ImpactReason::RecordingLoss);
        g.add(r(Nvr, 1), r(Camera, 1), ImpactReason::RecordingLoss);
        g
    }

    #[test]
    fn test_walk_visits_each_device_once() {
        let reached = campus().walk(r(Ups, 1));
        let mut devices: Vec<_> = reached.iter().map(|x| x.device).collect();
        let before = devices.len();
        devices.sort_by_key(|d| (d.kind.as_str(), d.id));
        devices.dedup();
        assert_eq!(devices.len(), before);
        assert_eq!(before, 7);
    }

    #[test]
    fn test_walk_records_depth_and_via() {
        let reached = campus().walk(r(Ups, 1));
        assert_eq!(reached[0].reason, ImpactReason::InitialFailure);
        assert_eq!(reached[0].depth, 0);

        let switch = reached.iter().find(|x| x.device == r(Switch, 1)).unwrap();
        assert_eq!(switch.depth, 1);
        assert_eq!(switch.via, Some(r(Ups, 1)));

        let camera = reached.iter().find(|x| x.device == r(Camera, 1)).unwrap();
        assert_eq!(camera.depth, 2);
        assert_eq!(camera.reason, ImpactReason::ConnectivityLoss);

        let recorded = reached.iter().find(|x| x.device == r(Camera, 3)).unwrap();
        assert_eq!(recorded.depth, 3);
        assert_eq!(recorded.reason, ImpactReason::RecordingLoss);
        assert_eq!(recorded.via, Some(r(Nvr, 1)));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut g = DependencyGraph::new();
        g.add(r(Switch, 1), r(Switch, 2), ImpactReason::ConnectivityLoss);
        g.add(r(Switch, 2), r(Switch, 1), ImpactReason::ConnectivityLoss);
        g.add(r(Switch, 2), r(Camera, 9), ImpactReason::ConnectivityLoss);
        let reached = g.walk(r(Switch, 1));
        assert_eq!(reached.len(), 3);
    }

    #[test]
    fn test_leaf_failure_only_reports_itself() {
        let reached = campus().walk(r(Camera, 2));
        assert_eq!(reached.len(), 1);
    }

    #[test]
    fn test_analysis_counts_cameras() {
        let origin = r(Switch, 1);
        let reached = campus().walk(origin);
        let analysis = build_analysis(origin, reached, &HashMap::new());
        // cameras 1 and 2 by connectivity, camera 3 through the NVR
        assert_eq!(analysis.affected_cameras, 3);
        assert_eq!(analysis.cameras_without_recording, 1);
        assert!(analysis.affected.iter().all(|d| d.code.is_none()));
    }
}
