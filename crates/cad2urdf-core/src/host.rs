//! Host snapshot
//!
//! Everything the exporter needs from the CAD host, captured once as plain data.
//! The host add-in serializes this to JSON; nothing downstream talks to the host.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::geometry::Transform;

/// Complete input of an export run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Name of the design's root component
    pub root_component: String,
    #[serde(default)]
    pub joints: Vec<HostJoint>,
    #[serde(default)]
    pub bodies: Vec<HostBody>,
}

impl HostSnapshot {
    pub fn from_json(content: &str) -> Result<Self, ExportError> {
        serde_json::from_str(content).map_err(|e| ExportError::Snapshot(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Snapshot(e.to_string()))
    }
}

/// A joint as the host reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostJoint {
    pub name: String,
    pub motion: HostMotion,
    pub occurrence_one: HostOccurrence,
    pub occurrence_two: HostOccurrence,
    #[serde(default)]
    pub geometry_or_origin_one: Option<HostOrigin>,
    #[serde(default)]
    pub geometry_or_origin_two: Option<HostOrigin>,
}

/// Joint motion as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMotion {
    Rigid,
    Revolute {
        rotation_axis: [f64; 3],
        limits: HostLimits,
    },
    Slider {
        slide_direction: [f64; 3],
        limits: HostLimits,
    },
    Cylindrical,
    PinSlot,
    Planar,
    Ball,
}

impl HostMotion {
    /// Host-side name of the motion type
    pub fn name(&self) -> &'static str {
        match self {
            HostMotion::Rigid => "Rigid",
            HostMotion::Revolute { .. } => "Revolute",
            HostMotion::Slider { .. } => "Slider",
            HostMotion::Cylindrical => "Cylindrical",
            HostMotion::PinSlot => "PinSlot",
            HostMotion::Planar => "Planar",
            HostMotion::Ball => "Ball",
        }
    }
}

/// Optional travel limits; values are in host units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostLimits {
    pub maximum_enabled: bool,
    pub maximum: f64,
    pub minimum_enabled: bool,
    pub minimum: f64,
}

impl HostLimits {
    pub fn range(minimum: f64, maximum: f64) -> Self {
        Self {
            maximum_enabled: true,
            maximum,
            minimum_enabled: true,
            minimum,
        }
    }
}

/// An occurrence placed in the assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostOccurrence {
    /// Occurrence name, e.g. `arm:1`
    pub name: String,
    /// Name of the component this is an occurrence of
    pub component: String,
    /// World transform, row-major
    #[serde(default)]
    pub transform: Transform,
}

impl HostOccurrence {
    pub fn new(name: impl Into<String>, component: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            transform,
        }
    }
}

/// Local joint origin: either a point directly, or a joint-origin feature wrapping one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostOrigin {
    Point { origin: [f64; 3] },
    JointOrigin { geometry: HostOriginGeometry },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostOriginGeometry {
    pub origin: [f64; 3],
}

impl HostOrigin {
    pub fn point(origin: DVec3) -> Self {
        HostOrigin::Point {
            origin: origin.to_array(),
        }
    }

    pub fn joint_origin(origin: DVec3) -> Self {
        HostOrigin::JointOrigin {
            geometry: HostOriginGeometry {
                origin: origin.to_array(),
            },
        }
    }

    /// The local point, read through the joint-origin indirection if needed
    pub fn local_point(&self) -> DVec3 {
        match self {
            HostOrigin::Point { origin } => DVec3::from_array(*origin),
            HostOrigin::JointOrigin { geometry } => DVec3::from_array(geometry.origin),
        }
    }
}

/// Physical properties of an occurrence in host units (kg, cm, kg*cm^2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostBody {
    pub occurrence: String,
    pub component: String,
    pub mass: f64,
    pub center_of_mass: [f64; 3],
    /// Moments about the host origin: `[ixx, iyy, izz, ixy, iyz, ixz]`
    pub inertia: [f64; 6],
}
