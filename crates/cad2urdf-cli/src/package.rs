//! ROS description package on disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use cad2urdf_core::{ExportConfig, ExportReport, validate_urdf};
use regex::Regex;

pub const LOG_FILE: &str = "urdf_export_log.txt";
pub const JOINTS_FILE: &str = "joints.json";

/// Paths of a written package
#[derive(Debug, Clone)]
pub struct WrittenPackage {
    pub name: String,
    pub root: PathBuf,
    pub urdf: PathBuf,
}

/// Pick a directory name under `parent` that does not collide with earlier exports.
///
/// `<base>` counts as version 0, `<base>_vN` as version N; the next free name is
/// `<base>_v(max + 1)`.
pub fn versioned_package_name(parent: &Path, base: &str) -> Result<String> {
    if !parent.exists() {
        return Ok(base.to_string());
    }

    let pattern = Regex::new(&format!(r"^{}_v(\d+)$", regex::escape(base)))?;
    let mut latest: Option<u32> = None;
    for entry in fs::read_dir(parent)
        .with_context(|| format!("Failed to list {}", parent.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let version = if name == base {
            Some(0)
        } else {
            pattern
                .captures(name)
                .and_then(|c| c[1].parse::<u32>().ok())
        };
        if let Some(version) = version {
            latest = Some(latest.map_or(version, |l| l.max(version)));
        }
    }

    match latest {
        Some(version) => {
            let next = version
                .checked_add(1)
                .ok_or_else(|| anyhow!("No version left after {base}_v{version}"))?;
            Ok(format!("{base}_v{next}"))
        }
        None => Ok(base.to_string()),
    }
}

/// Write `urdf/<robot>.urdf`, the export log and the joint table; create `meshes/`
pub fn write_package(
    output: &Path,
    report: &ExportReport,
    config: &ExportConfig,
) -> Result<WrittenPackage> {
    let name = versioned_package_name(output, &report.package_name())?;

    // Nothing touches the disk until the document is known to be valid
    let text = report.to_urdf(&name, config)?;
    let summary = validate_urdf(&text)?;
    tracing::debug!(
        "URDF check: {} links, {} joints, {} mimics",
        summary.links,
        summary.joints,
        summary.mimics
    );

    let root = output.join(&name);
    let urdf_dir = root.join("urdf");
    let meshes_dir = root.join("meshes");
    for dir in [&urdf_dir, &meshes_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let urdf = urdf_dir.join(format!("{}.urdf", report.robot_name));
    fs::write(&urdf, text).with_context(|| format!("Failed to write {}", urdf.display()))?;

    let log = root.join(LOG_FILE);
    fs::write(&log, report.log.to_text() + "\n")
        .with_context(|| format!("Failed to write {}", log.display()))?;

    let joints = root.join(JOINTS_FILE);
    let json = serde_json::to_string_pretty(&report.table)?;
    fs::write(&joints, json).with_context(|| format!("Failed to write {}", joints.display()))?;

    tracing::info!("Wrote package {}", root.display());
    Ok(WrittenPackage { name, root, urdf })
}
