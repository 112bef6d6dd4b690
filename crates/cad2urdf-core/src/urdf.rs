//! URDF serialization of the resolved tree
//!
//! Writing goes through a quick-xml event writer; the result can be re-read
//! with `urdf-rs` by [`validate_urdf`].

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::config::ExportConfig;
use crate::geometry::Units;
use crate::joint::Body;
use crate::link::LinkRecord;
use crate::table::{JointTable, ResolvedJoint};

const TRANSMISSION_TYPE: &str = "transmission_interface/SimpleTransmission";
const HARDWARE_INTERFACE: &str = "hardware_interface/EffortJointInterface";

/// URDF writing and validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UrdfError {
    #[error("Failed to write URDF: {0}")]
    Write(String),

    #[error("URDF parse error: {0}")]
    Parse(String),

    #[error("Joint {joint} references missing link {link}")]
    DanglingLink { joint: String, link: String },

    #[error("Joint {joint} connects link {link} to itself")]
    SelfConnected { joint: String, link: String },

    #[error("Link {link} has two parent joints: {first} and {second}")]
    MultipleParents {
        link: String,
        first: String,
        second: String,
    },
}

/// Counts read back from a written document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrdfSummary {
    pub robot: String,
    pub links: usize,
    pub joints: usize,
    pub mimics: usize,
}

/// Renders links and joints as a `<robot>` document
pub struct UrdfWriter<'a> {
    robot_name: &'a str,
    package: &'a str,
    config: &'a ExportConfig,
    units: Units,
}

impl<'a> UrdfWriter<'a> {
    pub fn new(robot_name: &'a str, package: &'a str, config: &'a ExportConfig) -> Self {
        Self {
            robot_name,
            package,
            config,
            units: config.units(),
        }
    }

    pub fn write(&self, links: &[LinkRecord], table: &JointTable) -> Result<String, UrdfError> {
        let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);

        write(
            &mut xml,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        start(&mut xml, "robot", &[("name", self.robot_name)])?;

        for link in links {
            self.write_link(&mut xml, link)?;
        }

        let frames: HashMap<&Body, DVec3> =
            links.iter().map(|l| (&l.name, l.frame_origin)).collect();
        let tree = tree_joints(table);
        for joint in &tree {
            let parent_frame = frames.get(&joint.parent).copied().unwrap_or(DVec3::ZERO);
            self.write_joint(&mut xml, joint, parent_frame)?;
        }

        if self.config.write_transmissions {
            for joint in tree.iter().filter(|j| j.kind.has_axis()) {
                write_transmission(&mut xml, joint.output_name.as_str())?;
            }
        }

        end(&mut xml, "robot")?;

        String::from_utf8(xml.into_inner()).map_err(|e| UrdfError::Write(e.to_string()))
    }

    fn write_link(&self, xml: &mut Writer<Vec<u8>>, link: &LinkRecord) -> Result<(), UrdfError> {
        start(xml, "link", &[("name", link.name.as_str())])?;

        let inertial = &link.inertial;
        let i = &inertial.inertia;
        start(xml, "inertial", &[])?;
        empty(
            xml,
            "origin",
            &[("xyz", self.vec_attr(inertial.origin).as_str()), ("rpy", "0 0 0")],
        )?;
        empty(xml, "mass", &[("value", inertial.mass.to_string().as_str())])?;
        empty(
            xml,
            "inertia",
            &[
                ("ixx", i.ixx.to_string().as_str()),
                ("iyy", i.iyy.to_string().as_str()),
                ("izz", i.izz.to_string().as_str()),
                ("ixy", i.ixy.to_string().as_str()),
                ("iyz", i.iyz.to_string().as_str()),
                ("ixz", i.ixz.to_string().as_str()),
            ],
        )?;
        end(xml, "inertial")?;

        let mesh_origin = self.vec_attr(-link.frame_origin);
        let filename = format!("package://{}/{}", self.package, link.mesh);
        let scale = self.config.mesh_scale.to_string();
        let scale = format!("{scale} {scale} {scale}");
        for tag in ["visual", "collision"] {
            start(xml, tag, &[])?;
            empty(xml, "origin", &[("xyz", mesh_origin.as_str()), ("rpy", "0 0 0")])?;
            start(xml, "geometry", &[])?;
            empty(xml, "mesh", &[("filename", filename.as_str()), ("scale", scale.as_str())])?;
            end(xml, "geometry")?;
            end(xml, tag)?;
        }

        end(xml, "link")
    }

    fn write_joint(
        &self,
        xml: &mut Writer<Vec<u8>>,
        joint: &ResolvedJoint,
        parent_frame: DVec3,
    ) -> Result<(), UrdfError> {
        start(
            xml,
            "joint",
            &[("name", joint.output_name.as_str()), ("type", joint.kind.urdf_name())],
        )?;
        empty(
            xml,
            "origin",
            &[
                ("xyz", self.vec_attr(joint.origin_world - parent_frame).as_str()),
                ("rpy", "0 0 0"),
            ],
        )?;
        empty(xml, "parent", &[("link", joint.parent.as_str())])?;
        empty(xml, "child", &[("link", joint.child.as_str())])?;

        if joint.kind.has_axis() {
            empty(xml, "axis", &[("xyz", self.vec_attr(joint.axis).as_str())])?;
            let effort = self.config.effort.to_string();
            let velocity = self.config.velocity.to_string();
            if joint.kind.has_limits() {
                empty(
                    xml,
                    "limit",
                    &[
                        ("lower", joint.lower_limit.to_string().as_str()),
                        ("upper", joint.upper_limit.to_string().as_str()),
                        ("effort", effort.as_str()),
                        ("velocity", velocity.as_str()),
                    ],
                )?;
            } else {
                empty(xml, "limit", &[("effort", effort.as_str()), ("velocity", velocity.as_str())])?;
            }
        }

        if let Some(mimic) = &joint.mimic {
            empty(
                xml,
                "mimic",
                &[
                    ("joint", mimic.joint.as_str()),
                    ("multiplier", mimic.multiplier.to_string().as_str()),
                    ("offset", mimic.offset.to_string().as_str()),
                ],
            )?;
        }

        end(xml, "joint")
    }

    fn vec_attr(&self, v: DVec3) -> String {
        let v = self.units.round_vec(v);
        format!("{} {} {}", v.x, v.y, v.z)
    }
}

/// Joints that keep the document a tree: the first joint per child wins,
/// later ones (loop closures) and self-connections are left out.
fn tree_joints(table: &JointTable) -> Vec<&ResolvedJoint> {
    let mut children: HashSet<&Body> = HashSet::new();
    table
        .iter()
        .filter(|joint| {
            if joint.parent == joint.child || !children.insert(&joint.child) {
                tracing::warn!("Joint {} not written: it would break the link tree", joint.name);
                return false;
            }
            true
        })
        .collect()
}

/// Render a complete URDF document
pub fn write_urdf(
    robot_name: &str,
    package: &str,
    links: &[LinkRecord],
    table: &JointTable,
    config: &ExportConfig,
) -> Result<String, UrdfError> {
    UrdfWriter::new(robot_name, package, config).write(links, table)
}

/// Re-read a document and check that its joints form a tree over existing links
pub fn validate_urdf(text: &str) -> Result<UrdfSummary, UrdfError> {
    let robot = urdf_rs::read_from_string(text).map_err(|e| UrdfError::Parse(e.to_string()))?;

    let link_names: HashSet<&str> = robot.links.iter().map(|l| l.name.as_str()).collect();
    let mut parent_joint: HashMap<&str, &str> = HashMap::new();
    for joint in &robot.joints {
        for link in [&joint.parent.link, &joint.child.link] {
            if !link_names.contains(link.as_str()) {
                return Err(UrdfError::DanglingLink {
                    joint: joint.name.clone(),
                    link: link.clone(),
                });
            }
        }
        if joint.parent.link == joint.child.link {
            return Err(UrdfError::SelfConnected {
                joint: joint.name.clone(),
                link: joint.child.link.clone(),
            });
        }
        if let Some(first) = parent_joint.insert(&joint.child.link, &joint.name) {
            return Err(UrdfError::MultipleParents {
                link: joint.child.link.clone(),
                first: first.to_string(),
                second: joint.name.clone(),
            });
        }
    }

    Ok(UrdfSummary {
        robot: robot.name.clone(),
        links: robot.links.len(),
        joints: robot.joints.len(),
        mimics: robot.joints.iter().filter(|j| j.mimic.is_some()).count(),
    })
}

fn write_transmission(xml: &mut Writer<Vec<u8>>, joint: &str) -> Result<(), UrdfError> {
    start(xml, "transmission", &[("name", format!("{joint}_tran").as_str())])?;
    text_element(xml, "type", TRANSMISSION_TYPE)?;

    start(xml, "joint", &[("name", joint)])?;
    text_element(xml, "hardwareInterface", HARDWARE_INTERFACE)?;
    end(xml, "joint")?;

    start(xml, "actuator", &[("name", format!("{joint}_actr").as_str())])?;
    text_element(xml, "hardwareInterface", HARDWARE_INTERFACE)?;
    text_element(xml, "mechanicalReduction", "1")?;
    end(xml, "actuator")?;

    end(xml, "transmission")
}

fn write(xml: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), UrdfError> {
    xml.write_event(event)
        .map_err(|e| UrdfError::Write(e.to_string()))
}

fn element<'b>(tag: &'b str, attrs: &[(&str, &str)]) -> BytesStart<'b> {
    let mut element = BytesStart::new(tag);
    for &attr in attrs {
        element.push_attribute(attr);
    }
    element
}

fn start(xml: &mut Writer<Vec<u8>>, tag: &str, attrs: &[(&str, &str)]) -> Result<(), UrdfError> {
    write(xml, Event::Start(element(tag, attrs)))
}

fn empty(xml: &mut Writer<Vec<u8>>, tag: &str, attrs: &[(&str, &str)]) -> Result<(), UrdfError> {
    write(xml, Event::Empty(element(tag, attrs)))
}

fn end(xml: &mut Writer<Vec<u8>>, tag: &str) -> Result<(), UrdfError> {
    write(xml, Event::End(BytesEnd::new(tag)))
}

fn text_element(xml: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), UrdfError> {
    start(xml, tag, &[])?;
    write(xml, Event::Text(BytesText::new(text)))?;
    end(xml, tag)
}
