//! Tree orientation
//!
//! A breadth-first traversal from the root body gives every reachable joint a
//! parent -> child direction and every reachable body a level (distance from the
//! root). Joints the traversal never crosses are oriented afterwards from those
//! levels. Each joint's origin is computed in the root frame while orienting it.
//! A joint connecting a body to itself is reported and left out of the table.

use std::collections::{HashMap, VecDeque};

use glam::DVec3;

use crate::diagnostics::Diagnostic;
use crate::error::{ExportError, ExportResult};
use crate::geometry::{APPROX_TOLERANCE, Units};
use crate::graph::ConnectivityGraph;
use crate::joint::{Body, JointKind, RawJoint};
use crate::table::{JointTable, Resolution, ResolvedJoint};

/// Output of the orientation pass
#[derive(Debug, Clone, Default)]
pub struct TreeResolution {
    pub table: JointTable,
    /// BFS level of every body reachable from the root
    pub levels: HashMap<Body, usize>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Orient every joint and compute its origin in the root frame
pub fn resolve_tree(
    joints: &[RawJoint],
    graph: &ConnectivityGraph,
    root: &Body,
    units: &Units,
) -> ExportResult<TreeResolution> {
    let mut resolution = TreeResolution::default();
    let mut resolved = vec![false; joints.len()];

    resolution.levels.insert(root.clone(), 0);
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(node) = queue.pop_front() {
        let level = resolution.levels[&node];
        for edge in graph.neighbors(&node) {
            if resolution.levels.contains_key(&edge.neighbor) {
                continue;
            }
            resolution.levels.insert(edge.neighbor.clone(), level + 1);
            queue.push_back(edge.neighbor.clone());

            let raw = &joints[edge.joint];
            let origin = select_origin(raw, &node)?;
            let joint = ResolvedJoint::from_raw(
                raw,
                node.clone(),
                edge.neighbor.clone(),
                units.to_meters_vec(origin),
                Resolution::Traversal,
            );
            tracing::debug!(
                "Oriented {} as {} -> {} (level {})",
                joint.name,
                joint.parent,
                joint.child,
                level + 1
            );
            resolution.table.insert(joint);
            resolved[edge.joint] = true;
        }
    }

    for (index, raw) in joints.iter().enumerate() {
        if resolved[index] {
            continue;
        }
        resolution
            .diagnostics
            .push(fallback_diagnostic(raw, &resolution.levels));
        // parent == child has no place in a tree; the diagnostic is all that remains
        if raw.body_a == raw.body_b {
            tracing::warn!("Dropping self-connected joint {}", raw.name);
            continue;
        }
        let (parent, child) = orient_fallback(raw, &resolution.levels);

        let origin = fallback_origin(raw)?;
        tracing::debug!(
            "Fallback orientation for {}: {} -> {}",
            raw.name,
            parent,
            child
        );
        resolution.table.insert(ResolvedJoint::from_raw(
            raw,
            parent,
            child,
            units.to_meters_vec(origin),
            Resolution::Fallback,
        ));
    }

    for raw in joints.iter().filter(|j| j.kind == JointKind::Unsupported) {
        resolution.diagnostics.push(Diagnostic::UnsupportedJointKind {
            joint: raw.name.clone(),
            host_kind: raw.host_kind.to_string(),
        });
    }

    tracing::info!(
        "Resolved {} joints ({} reachable bodies)",
        resolution.table.len(),
        resolution.levels.len()
    );
    Ok(resolution)
}

/// Pick the world origin of a joint crossed by the traversal.
///
/// With both candidates available, the one closer to the parent occurrence's
/// translation wins; ties go to the `body_a` candidate.
pub fn select_origin(raw: &RawJoint, parent: &Body) -> ExportResult<DVec3> {
    match (raw.candidate_a(), raw.candidate_b()) {
        (Some(a), Some(b)) => {
            let anchor = raw.anchor_of(parent);
            if a.distance(anchor) <= b.distance(anchor) + APPROX_TOLERANCE {
                Ok(a)
            } else {
                Ok(b)
            }
        }
        (Some(a), None) => Ok(a),
        (None, Some(b)) => Ok(b),
        (None, None) => Err(ExportError::MissingJointOrigin(raw.name.clone())),
    }
}

/// World origin of a joint the traversal never reached; prefers the `body_b` side
pub fn fallback_origin(raw: &RawJoint) -> ExportResult<DVec3> {
    raw.candidate_b()
        .or_else(|| raw.candidate_a())
        .ok_or_else(|| ExportError::MissingJointOrigin(raw.name.clone()))
}

/// `(parent, child)` for a joint left over after the traversal.
///
/// The endpoint with the lower level is the parent (ties go to `body_a`); a single
/// leveled endpoint is the parent; with no levels at all the joint is taken as
/// `body_b -> body_a`.
pub fn orient_fallback(raw: &RawJoint, levels: &HashMap<Body, usize>) -> (Body, Body) {
    let a = raw.body_a.clone();
    let b = raw.body_b.clone();
    match (levels.get(&raw.body_a), levels.get(&raw.body_b)) {
        (Some(la), Some(lb)) if la <= lb => (a, b),
        (Some(_), Some(_)) => (b, a),
        (Some(_), None) => (a, b),
        (None, Some(_)) => (b, a),
        (None, None) => (b, a),
    }
}

fn fallback_diagnostic(raw: &RawJoint, levels: &HashMap<Body, usize>) -> Diagnostic {
    if raw.body_a == raw.body_b {
        return Diagnostic::SelfConnected {
            joint: raw.name.clone(),
            body: raw.body_a.clone(),
        };
    }
    if levels.contains_key(&raw.body_a) && levels.contains_key(&raw.body_b) {
        Diagnostic::LoopClosure {
            joint: raw.name.clone(),
        }
    } else {
        Diagnostic::DisconnectedJoint {
            joint: raw.name.clone(),
        }
    }
}
