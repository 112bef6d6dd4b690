//! Mimic relations encoded in joint names
//!
//! The authoring convention is `<follower>-Link-<leader>:<multiplier>[:<offset>]`.
//! A name is parsed once into a [`MimicLink`]; the annotation attached to the
//! joint table is a [`MimicAnnotation`] naming the leader's output name.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, ExportLog};
use crate::joint::JointKind;
use crate::table::JointTable;

/// Separator between the clean joint name and the mimic suffix
pub const LINK_MARKER: &str = "-Link-";

static MIMIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    const NUMBER: &str = r"[+-]?(?:\d+\.\d*|\d*\.\d+|\d+)(?:[eE][+-]?\d+)?";
    Regex::new(&format!(
        r"^(?P<base>.+?){LINK_MARKER}(?P<leader>[^:]+):(?P<mult>{NUMBER})(?::(?P<offset>{NUMBER}))?$"
    ))
    .expect("mimic pattern is valid")
});

/// Coupling of a follower joint to a leader: `value = multiplier * leader + offset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MimicAnnotation {
    /// Output name of the leader joint
    pub joint: String,
    pub multiplier: f64,
    pub offset: f64,
}

impl MimicAnnotation {
    /// Follower position for a given leader position
    pub fn calculate(&self, leader_position: f64) -> f64 {
        self.multiplier * leader_position + self.offset
    }
}

/// Parsed name suffix, before the leader is looked up
#[derive(Debug, Clone, PartialEq)]
pub struct MimicLink {
    pub follower: String,
    pub leader: String,
    pub multiplier: f64,
    pub offset: f64,
}

/// Name with any mimic suffix removed
pub fn clean_name(name: &str) -> &str {
    match name.find(LINK_MARKER) {
        Some(end) => &name[..end],
        None => name,
    }
}

/// Parse the mimic suffix of a joint name
pub fn parse_mimic_name(name: &str) -> Option<MimicLink> {
    let caps = MIMIC_RE.captures(name)?;
    let multiplier = caps["mult"].parse().ok()?;
    let offset = match caps.name("offset") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0.0,
    };
    Some(MimicLink {
        follower: caps["base"].to_string(),
        leader: caps["leader"].to_string(),
        multiplier,
        offset,
    })
}

/// Outcome counts of one annotation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MimicReport {
    /// Mimics attached in this pass
    pub annotated: usize,
    /// Followers whose leader could not be found
    pub unmatched: usize,
    /// Followers (or leaders) of a kind that cannot mimic
    pub skipped: usize,
}

fn accepts_mimic(kind: JointKind) -> bool {
    matches!(
        kind,
        JointKind::Revolute | JointKind::Continuous | JointKind::Prismatic
    )
}

/// Find the leader for `follower`: exact name, then clean name, then clean name ignoring case
fn resolve_leader(table: &JointTable, follower: usize, token: &str) -> Option<usize> {
    if let Some(index) = table.position(token)
        && index != follower
    {
        return Some(index);
    }

    let joints = table.as_slice();
    joints
        .iter()
        .enumerate()
        .rev()
        .find(|(i, j)| *i != follower && clean_name(&j.name) == token)
        .or_else(|| {
            let token = token.to_lowercase();
            joints
                .iter()
                .enumerate()
                .find(|(i, j)| *i != follower && clean_name(&j.name).to_lowercase() == token)
        })
        .map(|(i, _)| i)
}

/// Attach mimic annotations to every joint whose name carries a resolvable suffix.
///
/// A joint that already has a mimic is left untouched, so running this twice
/// changes nothing.
pub fn annotate_mimics(
    table: &mut JointTable,
    diagnostics: &mut Vec<Diagnostic>,
    log: &mut ExportLog,
) -> MimicReport {
    let mut report = MimicReport::default();
    let mut pending = Vec::new();

    for (index, joint) in table.iter().enumerate() {
        let Some(link) = parse_mimic_name(&joint.name) else {
            continue;
        };

        let Some(leader_index) = resolve_leader(table, index, &link.leader) else {
            report.unmatched += 1;
            log.push(format!(
                "[name-link] follower={}: leader '{}' not found -> skipped",
                joint.name, link.leader
            ));
            tracing::warn!(
                "Mimic leader '{}' for joint {} not found",
                link.leader,
                joint.name
            );
            diagnostics.push(Diagnostic::UnmatchedMimicLeader {
                follower: joint.name.clone(),
                leader: link.leader,
            });
            continue;
        };

        if !accepts_mimic(joint.kind) {
            report.skipped += 1;
            log.push(format!(
                "[skip-name] follower={}: unsupported type {}",
                joint.name, joint.kind
            ));
            diagnostics.push(Diagnostic::UnsupportedMimicFollowerKind {
                follower: joint.name.clone(),
                kind: joint.kind,
            });
            continue;
        }

        let leader = &table.as_slice()[leader_index];
        if !accepts_mimic(leader.kind) {
            report.skipped += 1;
            log.push(format!(
                "[skip-name] follower={}: leader {} has unsupported type {}",
                joint.name, leader.name, leader.kind
            ));
            diagnostics.push(Diagnostic::UnsupportedMimicLeaderKind {
                follower: joint.name.clone(),
                leader: leader.name.clone(),
            });
            continue;
        }

        if joint.mimic.is_some() {
            continue;
        }

        let annotation = MimicAnnotation {
            joint: leader.output_name.clone(),
            multiplier: link.multiplier,
            offset: link.offset,
        };
        log.push(format!(
            "[mimic-name] follower={} leader={} mult={} offset={}",
            joint.output_name, annotation.joint, annotation.multiplier, annotation.offset
        ));
        tracing::info!(
            "Joint {} mimics {} (multiplier {}, offset {})",
            joint.output_name,
            annotation.joint,
            annotation.multiplier,
            annotation.offset
        );
        pending.push((index, annotation));
    }

    for (index, annotation) in pending {
        if let Some(joint) = table.get_index_mut(index) {
            joint.mimic = Some(annotation);
            report.annotated += 1;
        }
    }

    report
}
