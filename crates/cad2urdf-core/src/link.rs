//! Link records derived from the resolved joint table

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use serde::Serialize;

use crate::geometry::Units;
use crate::host::HostBody;
use crate::joint::{Body, sanitize_name};
use crate::table::JointTable;

/// Inertia tensor components (kg*m^2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InertiaMatrix {
    pub ixx: f64,
    pub ixy: f64,
    pub ixz: f64,
    pub iyy: f64,
    pub iyz: f64,
    pub izz: f64,
}

/// Inertial properties for a link
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InertialProperties {
    /// Center of mass relative to the link frame (m)
    pub origin: DVec3,
    /// Mass in kg
    pub mass: f64,
    /// Inertia about the center of mass
    pub inertia: InertiaMatrix,
}

/// A link of the exported robot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRecord {
    pub name: Body,
    /// Link frame in the root frame (m): origin of the joint it hangs from
    pub frame_origin: DVec3,
    pub inertial: InertialProperties,
    /// Mesh file, relative to the package root
    pub mesh: String,
}

impl LinkRecord {
    fn new(name: Body, frame_origin: DVec3) -> Self {
        let mesh = format!("meshes/{}.stl", name);
        Self {
            name,
            frame_origin,
            inertial: InertialProperties::default(),
            mesh,
        }
    }
}

/// Inertial properties of a host body, shifted to its center of mass and converted to SI
pub fn convert_inertial(body: &HostBody, frame_origin: DVec3, units: &Units) -> InertialProperties {
    let [x, y, z] = body.center_of_mass;
    let m = body.mass;
    let [ixx, iyy, izz, ixy, iyz, ixz] = body.inertia;
    let area = units.length_scale * units.length_scale;

    // Parallel-axis shift from the host origin to the center of mass
    let about_com = |value: f64, shift: f64| units.round((value - m * shift) / area);

    InertialProperties {
        origin: units
            .round_vec(units.to_meters_vec(DVec3::from_array(body.center_of_mass)) - frame_origin),
        mass: units.round(m),
        inertia: InertiaMatrix {
            ixx: about_com(ixx, y * y + z * z),
            iyy: about_com(iyy, x * x + z * z),
            izz: about_com(izz, x * x + y * y),
            ixy: about_com(ixy, -x * y),
            iyz: about_com(iyz, -y * z),
            ixz: about_com(ixz, -x * z),
        },
    }
}

/// One link per body: root first, then children in table order, then parents
/// that only appear on fallback-oriented joints.
pub fn build_links(
    table: &JointTable,
    bodies: &[HostBody],
    root: &Body,
    units: &Units,
) -> Vec<LinkRecord> {
    let physical: HashMap<Body, &HostBody> = bodies
        .iter()
        .map(|b| {
            let body = if b.component == root.as_str() {
                root.clone()
            } else {
                Body::new(sanitize_name(&b.occurrence))
            };
            (body, b)
        })
        .collect();

    let mut seen: HashSet<Body> = HashSet::new();
    let mut order = vec![root.clone()];
    seen.insert(root.clone());
    for joint in table {
        if seen.insert(joint.child.clone()) {
            order.push(joint.child.clone());
        }
    }
    for joint in table {
        if seen.insert(joint.parent.clone()) {
            order.push(joint.parent.clone());
        }
    }

    order
        .into_iter()
        .map(|body| {
            let frame_origin = if body == *root {
                DVec3::ZERO
            } else {
                table
                    .parent_joint_of(&body)
                    .map(|j| j.origin_world)
                    .unwrap_or(DVec3::ZERO)
            };
            let mut link = LinkRecord::new(body, frame_origin);
            if let Some(host) = physical.get(&link.name) {
                link.inertial = convert_inertial(host, frame_origin, units);
            } else {
                tracing::debug!("No physical properties for link {}", link.name);
            }
            link
        })
        .collect()
}
