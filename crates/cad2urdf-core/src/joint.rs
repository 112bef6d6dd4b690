//! Joint records extracted from the host snapshot

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult, LimitBound};
use crate::geometry::{Transform, Units};
use crate::host::{HostJoint, HostLimits, HostMotion, HostOccurrence};

/// Identifier of a rigid body (sanitized occurrence name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body(String);

impl Body {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Body for an occurrence. Occurrences of the root component map to `root`.
    pub fn from_occurrence(occurrence: &HostOccurrence, root: &str) -> Self {
        if occurrence.component == root {
            Self::new(root)
        } else {
            Self::new(sanitize_name(&occurrence.name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace characters that are illegal in link names (space, colon, parentheses)
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | ':' | '(' | ')' => '_',
            c => c,
        })
        .collect()
}

/// Joint kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    #[default]
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
    Unsupported,
}

impl JointKind {
    /// Check if this joint kind has an axis
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointKind::Revolute | JointKind::Continuous | JointKind::Prismatic
        )
    }

    /// Check if this joint kind has limits
    pub fn has_limits(&self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }

    /// Name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute => "revolute",
            JointKind::Continuous => "continuous",
            JointKind::Prismatic => "prismatic",
            JointKind::Unsupported => "unsupported",
        }
    }

    /// Name written to URDF; unsupported joints are pinned as fixed
    pub fn urdf_name(&self) -> &'static str {
        match self {
            JointKind::Unsupported => "fixed",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A joint with both endpoints still unordered
#[derive(Debug, Clone, PartialEq)]
pub struct RawJoint {
    pub name: String,
    pub kind: JointKind,
    /// Host motion name, kept for diagnostics on unsupported joints
    pub host_kind: &'static str,
    pub axis: DVec3,
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub body_a: Body,
    pub body_b: Body,
    pub local_origin_a: Option<DVec3>,
    pub local_origin_b: Option<DVec3>,
    pub world_transform_a: Transform,
    pub world_transform_b: Transform,
}

impl RawJoint {
    /// World position of the origin read on the `body_a` side
    pub fn candidate_a(&self) -> Option<DVec3> {
        self.local_origin_a
            .map(|p| self.world_transform_a.transform_point(p))
    }

    /// World position of the origin read on the `body_b` side
    pub fn candidate_b(&self) -> Option<DVec3> {
        self.local_origin_b
            .map(|p| self.world_transform_b.transform_point(p))
    }

    /// World translation of the occurrence behind `body`
    pub fn anchor_of(&self, body: &Body) -> DVec3 {
        if *body == self.body_b {
            self.world_transform_b.translation()
        } else {
            self.world_transform_a.translation()
        }
    }
}

/// Extract every joint, stopping at the first failure
pub fn extract_joints(
    joints: &[HostJoint],
    root: &str,
    units: &Units,
) -> ExportResult<Vec<RawJoint>> {
    joints
        .iter()
        .map(|joint| extract_joint(joint, root, units))
        .collect()
}

/// Extract one joint record
pub fn extract_joint(host: &HostJoint, root: &str, units: &Units) -> ExportResult<RawJoint> {
    let mut kind = JointKind::Unsupported;
    let mut axis = DVec3::ZERO;
    let mut upper_limit = 0.0;
    let mut lower_limit = 0.0;

    match &host.motion {
        HostMotion::Rigid => kind = JointKind::Fixed,
        HostMotion::Revolute {
            rotation_axis,
            limits,
        } => {
            axis = units.round_vec(DVec3::from_array(*rotation_axis).normalize_or_zero());
            match read_limits(&host.name, limits)? {
                Some((upper, lower)) => {
                    kind = JointKind::Revolute;
                    upper_limit = units.round(upper);
                    lower_limit = units.round(lower);
                }
                None => kind = JointKind::Continuous,
            }
        }
        HostMotion::Slider {
            slide_direction,
            limits,
        } => {
            kind = JointKind::Prismatic;
            axis = units.round_vec(DVec3::from_array(*slide_direction).normalize_or_zero());
            if let Some((upper, lower)) = read_limits(&host.name, limits)? {
                upper_limit = units.to_meters(upper);
                lower_limit = units.to_meters(lower);
            }
        }
        HostMotion::Cylindrical | HostMotion::PinSlot | HostMotion::Planar | HostMotion::Ball => {}
    }

    let local_origin_a = host.geometry_or_origin_one.as_ref().map(|o| o.local_point());
    let local_origin_b = host.geometry_or_origin_two.as_ref().map(|o| o.local_point());
    if local_origin_a.is_none() && local_origin_b.is_none() {
        return Err(ExportError::MissingJointOrigin(host.name.clone()));
    }

    let joint = RawJoint {
        name: host.name.clone(),
        kind,
        host_kind: host.motion.name(),
        axis,
        upper_limit,
        lower_limit,
        body_a: Body::from_occurrence(&host.occurrence_one, root),
        body_b: Body::from_occurrence(&host.occurrence_two, root),
        local_origin_a,
        local_origin_b,
        world_transform_a: host.occurrence_one.transform,
        world_transform_b: host.occurrence_two.transform,
    };

    tracing::debug!(
        "Extracted joint {} ({}) between {} and {}",
        joint.name,
        joint.kind,
        joint.body_a,
        joint.body_b
    );
    Ok(joint)
}

/// `(upper, lower)` if both bounds are enabled, `None` if neither is
fn read_limits(joint: &str, limits: &HostLimits) -> ExportResult<Option<(f64, f64)>> {
    match (limits.maximum_enabled, limits.minimum_enabled) {
        (true, true) => Ok(Some((limits.maximum, limits.minimum))),
        (true, false) => Err(ExportError::AsymmetricLimit {
            joint: joint.to_string(),
            missing: LimitBound::Lower,
        }),
        (false, true) => Err(ExportError::AsymmetricLimit {
            joint: joint.to_string(),
            missing: LimitBound::Upper,
        }),
        (false, false) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostOrigin;
    use approx::assert_abs_diff_eq;

    fn occurrence(name: &str, component: &str) -> HostOccurrence {
        HostOccurrence::new(name, component, Transform::IDENTITY)
    }

    fn host_joint(name: &str, motion: HostMotion) -> HostJoint {
        HostJoint {
            name: name.to_string(),
            motion,
            occurrence_one: occurrence("arm (left):1", "arm"),
            occurrence_two: occurrence("base:1", "base_link"),
            geometry_or_origin_one: Some(HostOrigin::point(DVec3::new(1.0, 0.0, 0.0))),
            geometry_or_origin_two: Some(HostOrigin::joint_origin(DVec3::new(0.0, 1.0, 0.0))),
        }
    }

    fn extract(joint: &HostJoint) -> ExportResult<RawJoint> {
        extract_joint(joint, "base_link", &Units::default())
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("arm (left):1"), "arm__left__1");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn test_root_sentinel_and_bodies() {
        let joint = extract(&host_joint("rigid", HostMotion::Rigid)).unwrap();
        assert_eq!(joint.kind, JointKind::Fixed);
        assert_eq!(joint.body_a.as_str(), "arm__left__1");
        assert_eq!(joint.body_b.as_str(), "base_link");
        assert_eq!(joint.local_origin_a, Some(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(joint.local_origin_b, Some(DVec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_revolute_limits_are_rounded_not_scaled() {
        let motion = HostMotion::Revolute {
            rotation_axis: [0.0, 0.0, 1.0],
            limits: HostLimits::range(-1.23456789, 2.00000049),
        };
        let joint = extract(&host_joint("elbow", motion)).unwrap();
        assert_eq!(joint.kind, JointKind::Revolute);
        assert_eq!(joint.axis, DVec3::Z);
        assert_abs_diff_eq!(joint.upper_limit, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(joint.lower_limit, -1.234568, epsilon = 1e-12);
    }

    #[test]
    fn test_revolute_without_limits_is_continuous() {
        let motion = HostMotion::Revolute {
            rotation_axis: [0.0, 1.0, 0.0],
            limits: HostLimits::default(),
        };
        let joint = extract(&host_joint("wheel", motion)).unwrap();
        assert_eq!(joint.kind, JointKind::Continuous);
        assert_eq!(joint.upper_limit, 0.0);
        assert_eq!(joint.lower_limit, 0.0);
    }

    #[test]
    fn test_prismatic_limits_are_scaled() {
        let motion = HostMotion::Slider {
            slide_direction: [1.0, 0.0, 0.0],
            limits: HostLimits::range(-5.0, 12.3456789),
        };
        let joint = extract(&host_joint("slide", motion)).unwrap();
        assert_eq!(joint.kind, JointKind::Prismatic);
        assert_abs_diff_eq!(joint.upper_limit, 0.123457, epsilon = 1e-12);
        assert_abs_diff_eq!(joint.lower_limit, -0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_asymmetric_limit_fails() {
        let motion = HostMotion::Revolute {
            rotation_axis: [0.0, 0.0, 1.0],
            limits: HostLimits {
                maximum_enabled: true,
                maximum: 1.0,
                ..HostLimits::default()
            },
        };
        assert_eq!(
            extract(&host_joint("shoulder", motion)),
            Err(ExportError::AsymmetricLimit {
                joint: "shoulder".into(),
                missing: LimitBound::Lower,
            })
        );

        let motion = HostMotion::Slider {
            slide_direction: [0.0, 0.0, 1.0],
            limits: HostLimits {
                minimum_enabled: true,
                ..HostLimits::default()
            },
        };
        assert!(matches!(
            extract(&host_joint("lift", motion)),
            Err(ExportError::AsymmetricLimit {
                missing: LimitBound::Upper,
                ..
            })
        ));
    }

    #[test]
    fn test_unsupported_kind_keeps_edge() {
        let joint = extract(&host_joint("ball", HostMotion::Ball)).unwrap();
        assert_eq!(joint.kind, JointKind::Unsupported);
        assert_eq!(joint.host_kind, "Ball");
        assert_eq!(joint.axis, DVec3::ZERO);
        assert_eq!(joint.kind.urdf_name(), "fixed");
    }

    #[test]
    fn test_missing_origin_stops_extraction() {
        let good = host_joint("good", HostMotion::Rigid);
        let mut bad = host_joint("bad", HostMotion::Rigid);
        bad.geometry_or_origin_one = None;
        bad.geometry_or_origin_two = None;
        let after = host_joint("after", HostMotion::Rigid);

        let result = extract_joints(&[good, bad, after], "base_link", &Units::default());
        assert_eq!(result, Err(ExportError::MissingJointOrigin("bad".into())));
    }

    #[test]
    fn test_single_origin_is_enough() {
        let mut joint = host_joint("half", HostMotion::Rigid);
        joint.geometry_or_origin_one = None;
        let raw = extract(&joint).unwrap();
        assert!(raw.candidate_a().is_none());
        assert_eq!(raw.candidate_b(), Some(DVec3::new(0.0, 1.0, 0.0)));
    }
}
