//! Export pipeline
//!
//! Passes run strictly in order: extraction, graph build, tree resolution,
//! mimic annotation, link building. A fatal error in any pass aborts the run
//! before a joint table is produced.

use serde::Serialize;

use crate::config::ExportConfig;
use crate::diagnostics::{Diagnostic, ExportLog};
use crate::error::{ExportError, ExportResult};
use crate::graph::ConnectivityGraph;
use crate::host::HostSnapshot;
use crate::joint::{Body, extract_joints, sanitize_name};
use crate::link::{LinkRecord, build_links};
use crate::mimic::{MimicReport, annotate_mimics};
use crate::resolve::resolve_tree;
use crate::table::JointTable;
use crate::urdf::{UrdfError, write_urdf};

/// Everything produced by one successful export run
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub robot_name: String,
    pub table: JointTable,
    pub links: Vec<LinkRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub mimics: MimicReport,
    pub log: ExportLog,
}

/// Counts printed at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub robot: String,
    pub links: usize,
    pub joints: usize,
    pub mimics_annotated: usize,
    pub mimics_unmatched: usize,
    pub diagnostics: usize,
}

impl ExportReport {
    /// ROS package name for this robot
    pub fn package_name(&self) -> String {
        format!("{}_description", self.robot_name)
    }

    pub fn to_urdf(&self, package: &str, config: &ExportConfig) -> Result<String, UrdfError> {
        write_urdf(&self.robot_name, package, &self.links, &self.table, config)
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            robot: self.robot_name.clone(),
            links: self.links.len(),
            joints: self.table.len(),
            mimics_annotated: self.mimics.annotated,
            mimics_unmatched: self.mimics.unmatched,
            diagnostics: self.diagnostics.len(),
        }
    }
}

/// Robot name: the first whitespace-separated token of the root component name
pub fn robot_name_from(root_component: &str) -> String {
    root_component
        .split_whitespace()
        .next()
        .map(sanitize_name)
        .unwrap_or_else(|| "robot".to_string())
}

/// Run every pass over a host snapshot
pub fn export(snapshot: &HostSnapshot, config: &ExportConfig) -> ExportResult<ExportReport> {
    config.validate()?;
    if snapshot.joints.is_empty() {
        return Err(ExportError::EmptySnapshot);
    }

    let units = config.units();
    let root = Body::new(config.root_body.as_str());
    let robot_name = config
        .robot_name
        .clone()
        .unwrap_or_else(|| robot_name_from(&snapshot.root_component));
    let mut log = ExportLog::new();

    log.step("Extracting joints...");
    let raw = extract_joints(&snapshot.joints, &config.root_body, &units)?;

    log.step("Building connectivity graph...");
    let graph = ConnectivityGraph::build(&raw);

    log.step("Resolving kinematic tree...");
    let resolution = resolve_tree(&raw, &graph, &root, &units)?;
    let mut table = resolution.table;
    let mut diagnostics = resolution.diagnostics;

    log.step("Resolving name-based mimics...");
    let mimics = annotate_mimics(&mut table, &mut diagnostics, &mut log);
    diagnostics.extend(table.output_name_collisions());

    log.step("Building links...");
    let links = build_links(&table, &snapshot.bodies, &root, &units);

    for diagnostic in &diagnostics {
        tracing::warn!("{}", diagnostic);
        log.push(format!("[warn] {diagnostic}"));
    }

    log.push("[summary] joints:");
    for joint in &table {
        log.push(format!("[joint] {}", joint.summary()));
    }
    log.push(format!(
        "[summary] links={} joints={} mimic={} unmatched={} skipped={}",
        links.len(),
        table.len(),
        mimics.annotated,
        mimics.unmatched,
        mimics.skipped
    ));
    tracing::info!(
        "Exported {}: {} links, {} joints, {} mimics",
        robot_name,
        links.len(),
        table.len(),
        table.mimic_count()
    );

    Ok(ExportReport {
        robot_name,
        table,
        links,
        diagnostics,
        mimics,
        log,
    })
}
