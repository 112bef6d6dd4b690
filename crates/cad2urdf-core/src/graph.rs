//! Undirected body connectivity built from joint endpoint pairs

use std::collections::HashMap;

use crate::joint::{Body, RawJoint};

/// One direction of a joint edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub neighbor: Body,
    /// Index of the joint in the extracted joint list
    pub joint: usize,
    pub joint_name: String,
}

/// Adjacency over bodies. Neighbor lists keep joint insertion order.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityGraph {
    adjacency: HashMap<Body, Vec<Edge>>,
    /// Bodies in first-seen order
    bodies: Vec<Body>,
    edge_count: usize,
}

impl ConnectivityGraph {
    /// Insert both directions of every joint
    pub fn build(joints: &[RawJoint]) -> Self {
        let mut graph = Self::default();
        for (index, joint) in joints.iter().enumerate() {
            graph.connect(&joint.body_a, &joint.body_b, index, &joint.name);
        }
        tracing::debug!(
            "Built connectivity graph: {} bodies, {} joints",
            graph.body_count(),
            graph.edge_count()
        );
        graph
    }

    fn connect(&mut self, a: &Body, b: &Body, joint: usize, joint_name: &str) {
        self.entry(a).push(Edge {
            neighbor: b.clone(),
            joint,
            joint_name: joint_name.to_string(),
        });
        self.entry(b).push(Edge {
            neighbor: a.clone(),
            joint,
            joint_name: joint_name.to_string(),
        });
        self.edge_count += 1;
    }

    fn entry(&mut self, body: &Body) -> &mut Vec<Edge> {
        if !self.adjacency.contains_key(body) {
            self.bodies.push(body.clone());
        }
        self.adjacency.entry(body.clone()).or_default()
    }

    /// Edges leaving `body`; empty for unknown bodies
    pub fn neighbors(&self, body: &Body) -> &[Edge] {
        self.adjacency.get(body).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, body: &Body) -> bool {
        self.adjacency.contains_key(body)
    }

    /// Bodies in the order they were first referenced
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of joints (each contributes two directed edges)
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::Transform;
    use crate::joint::JointKind;
    use glam::DVec3;

    /// Fixed joint between two bodies with identity transforms and an origin on each side
    pub(crate) fn raw(name: &str, a: &str, b: &str) -> RawJoint {
        RawJoint {
            name: name.to_string(),
            kind: JointKind::Fixed,
            host_kind: "Rigid",
            axis: DVec3::ZERO,
            upper_limit: 0.0,
            lower_limit: 0.0,
            body_a: Body::new(a),
            body_b: Body::new(b),
            local_origin_a: Some(DVec3::ZERO),
            local_origin_b: Some(DVec3::ZERO),
            world_transform_a: Transform::IDENTITY,
            world_transform_b: Transform::IDENTITY,
        }
    }

    #[test]
    fn test_build_inserts_both_directions() {
        let joints = vec![raw("j1", "arm", "base_link"), raw("j2", "hand", "arm")];
        let graph = ConnectivityGraph::build(&joints);

        assert_eq!(graph.body_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.bodies(),
            &[Body::new("arm"), Body::new("base_link"), Body::new("hand")]
        );

        let arm: Vec<_> = graph
            .neighbors(&Body::new("arm"))
            .iter()
            .map(|e| (e.neighbor.as_str(), e.joint_name.as_str()))
            .collect();
        assert_eq!(arm, vec![("base_link", "j1"), ("hand", "j2")]);
        assert_eq!(graph.neighbors(&Body::new("hand"))[0].joint, 1);
    }

    #[test]
    fn test_multi_edges_are_kept() {
        let joints = vec![raw("a", "x", "y"), raw("b", "y", "x")];
        let graph = ConnectivityGraph::build(&joints);
        let names: Vec<_> = graph
            .neighbors(&Body::new("x"))
            .iter()
            .map(|e| e.joint_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(graph.neighbors(&Body::new("missing")).is_empty());
        assert!(!graph.contains(&Body::new("missing")));
    }
}
