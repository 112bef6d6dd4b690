//! Resolved joints and the joint table

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::DVec3;
use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::joint::{Body, JointKind, RawJoint};
use crate::mimic::{MimicAnnotation, clean_name};

/// How a joint got its orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Oriented by the breadth-first traversal from the root
    Traversal,
    /// Oriented by the level-based fallback pass
    Fallback,
}

/// A joint with parent/child assigned and its origin in the root frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedJoint {
    pub name: String,
    /// Name with any mimic suffix stripped
    pub output_name: String,
    pub kind: JointKind,
    pub axis: DVec3,
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub parent: Body,
    pub child: Body,
    /// Meters, root frame
    pub origin_world: DVec3,
    pub resolution: Resolution,
    pub mimic: Option<MimicAnnotation>,
}

impl ResolvedJoint {
    pub fn from_raw(
        raw: &RawJoint,
        parent: Body,
        child: Body,
        origin_world: DVec3,
        resolution: Resolution,
    ) -> Self {
        Self {
            name: raw.name.clone(),
            output_name: clean_name(&raw.name).to_string(),
            kind: raw.kind,
            axis: raw.axis,
            upper_limit: raw.upper_limit,
            lower_limit: raw.lower_limit,
            parent,
            child,
            origin_world,
            resolution,
            mimic: None,
        }
    }

    /// One-line summary used in the export log
    pub fn summary(&self) -> String {
        let mimic = match &self.mimic {
            Some(m) => format!(
                "{{joint:{}, multiplier:{}, offset:{}}}",
                m.joint, m.multiplier, m.offset
            ),
            None => "None".to_string(),
        };
        format!(
            "name={} type={} parent={} child={} mimic={}",
            self.name, self.kind, self.parent, self.child, mimic
        )
    }
}

/// Name-indexed joints in resolution order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct JointTable {
    joints: Vec<ResolvedJoint>,
    #[serde(skip)]
    name_index: HashMap<String, usize>,
}

impl JointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint. A repeated name points the index at the newest entry.
    pub(crate) fn insert(&mut self, joint: ResolvedJoint) {
        self.name_index
            .insert(joint.name.clone(), self.joints.len());
        self.joints.push(joint);
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedJoint> {
        self.position(name).map(|i| &self.joints[i])
    }

    /// Index of the joint with this exact name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedJoint> {
        self.joints.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedJoint] {
        &self.joints
    }

    pub(crate) fn get_index_mut(&mut self, index: usize) -> Option<&mut ResolvedJoint> {
        self.joints.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Number of joints carrying a mimic annotation
    pub fn mimic_count(&self) -> usize {
        self.joints.iter().filter(|j| j.mimic.is_some()).count()
    }

    /// Joints whose output name was already taken by an earlier joint
    pub fn output_name_collisions(&self) -> Vec<Diagnostic> {
        let mut first_use: HashMap<&str, &str> = HashMap::new();
        let mut collisions = Vec::new();
        for joint in &self.joints {
            match first_use.entry(joint.output_name.as_str()) {
                Entry::Occupied(first) => collisions.push(Diagnostic::DuplicateOutputName {
                    joint: joint.name.clone(),
                    first: first.get().to_string(),
                    output_name: joint.output_name.clone(),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(joint.name.as_str());
                }
            }
        }
        collisions
    }

    /// The joint whose child is `body`, preferring traversal-resolved joints
    pub fn parent_joint_of(&self, body: &Body) -> Option<&ResolvedJoint> {
        self.joints
            .iter()
            .filter(|j| j.child == *body)
            .min_by_key(|j| j.resolution == Resolution::Fallback)
    }
}

impl Extend<ResolvedJoint> for JointTable {
    fn extend<I: IntoIterator<Item = ResolvedJoint>>(&mut self, iter: I) {
        for joint in iter {
            self.insert(joint);
        }
    }
}

impl FromIterator<ResolvedJoint> for JointTable {
    fn from_iter<I: IntoIterator<Item = ResolvedJoint>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a> IntoIterator for &'a JointTable {
    type Item = &'a ResolvedJoint;
    type IntoIter = std::slice::Iter<'a, ResolvedJoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.joints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::raw;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = JointTable::new();
        let r = raw("wheelR-Link-wheelL:-1.0", "wheel_r", "base_link");
        table.insert(ResolvedJoint::from_raw(
            &r,
            Body::new("base_link"),
            Body::new("wheel_r"),
            DVec3::ZERO,
            Resolution::Traversal,
        ));

        assert_eq!(table.len(), 1);
        let joint = table.get("wheelR-Link-wheelL:-1.0").unwrap();
        assert_eq!(joint.output_name, "wheelR");
        assert!(table.get("wheelR").is_none());
        assert_eq!(
            joint.summary(),
            "name=wheelR-Link-wheelL:-1.0 type=fixed parent=base_link child=wheel_r mimic=None"
        );
    }

    #[test]
    fn test_output_name_collisions() {
        let mut table = JointTable::new();
        for (name, child) in [("wheelL", "a"), ("arm", "b"), ("wheelL-Link-x:1", "c")] {
            table.insert(ResolvedJoint::from_raw(
                &raw(name, child, "base_link"),
                Body::new("base_link"),
                Body::new(child),
                DVec3::ZERO,
                Resolution::Traversal,
            ));
        }
        assert_eq!(
            table.output_name_collisions(),
            vec![Diagnostic::DuplicateOutputName {
                joint: "wheelL-Link-x:1".into(),
                first: "wheelL".into(),
                output_name: "wheelL".into(),
            }]
        );
    }

    #[test]
    fn test_parent_joint_prefers_traversal() {
        let mut table = JointTable::new();
        let a = raw("loop", "b", "c");
        let b = raw("tree", "b", "c");
        table.insert(ResolvedJoint::from_raw(
            &b,
            Body::new("b"),
            Body::new("c"),
            DVec3::ZERO,
            Resolution::Traversal,
        ));
        table.insert(ResolvedJoint::from_raw(
            &a,
            Body::new("b"),
            Body::new("c"),
            DVec3::ONE,
            Resolution::Fallback,
        ));
        assert_eq!(table.parent_joint_of(&Body::new("c")).unwrap().name, "tree");
        assert!(table.parent_joint_of(&Body::new("b")).is_none());
    }
}
