//! Non-fatal diagnostics and the human-readable export log

use crate::joint::{Body, JointKind};

/// Conditions worth reporting that never stop an export
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    #[error("Mimic leader '{leader}' of joint {follower} not found")]
    UnmatchedMimicLeader { follower: String, leader: String },

    #[error("Joint {follower} of type {kind} cannot mimic another joint")]
    UnsupportedMimicFollowerKind { follower: String, kind: JointKind },

    #[error("Joint {follower} cannot mimic {leader}: leader type cannot be mimicked")]
    UnsupportedMimicLeaderKind { follower: String, leader: String },

    #[error("Joint {joint} has unsupported motion {host_kind}; exported as fixed")]
    UnsupportedJointKind { joint: String, host_kind: String },

    #[error("Joint {joint} closes a kinematic loop; its child already has a parent")]
    LoopClosure { joint: String },

    #[error("Joint {joint} connects body {body} to itself")]
    SelfConnected { joint: String, body: Body },

    #[error("Joint {joint} is not connected to the root; orientation is a guess")]
    DisconnectedJoint { joint: String },

    #[error("Joints {first} and {joint} are both written as {output_name}")]
    DuplicateOutputName {
        joint: String,
        first: String,
        output_name: String,
    },
}

/// Ordered log lines written next to the exported package
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportLog {
    lines: Vec<String>,
}

impl ExportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Record the start of a pass
    pub fn step(&mut self, message: &str) {
        tracing::info!("{}", message);
        self.push(format!("[step] {message}"));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-joined text
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lines_keep_order() {
        let mut log = ExportLog::new();
        log.step("Building joints...");
        log.push("[summary] joints:");
        assert_eq!(log.to_text(), "[step] Building joints...\n[summary] joints:");
    }

    #[test]
    fn test_diagnostic_messages() {
        let d = Diagnostic::UnmatchedMimicLeader {
            follower: "flap-Link-x:1".into(),
            leader: "x".into(),
        };
        assert_eq!(d.to_string(), "Mimic leader 'x' of joint flap-Link-x:1 not found");

        let d = Diagnostic::SelfConnected {
            joint: "weld".into(),
            body: Body::new("plate"),
        };
        assert_eq!(d.to_string(), "Joint weld connects body plate to itself");
    }
}
