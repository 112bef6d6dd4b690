use cad2urdf_core::{
    ExportConfig, ExportError, HostSnapshot, JointKind, LimitBound, Resolution, export,
    validate_urdf,
};
use glam::DVec3;

const ARM_SNAPSHOT: &str = r#"{
    "root_component": "picker v2",
    "joints": [
        {
            "name": "shoulder",
            "motion": {
                "type": "revolute",
                "rotation_axis": [0.0, 1.0, 0.0],
                "limits": {"maximum_enabled": true, "maximum": 1.57, "minimum_enabled": true, "minimum": -1.57}
            },
            "occurrence_one": {
                "name": "arm:1", "component": "arm",
                "transform": [1,0,0,0, 0,1,0,0, 0,0,1,20, 0,0,0,1]
            },
            "occurrence_two": {"name": "base:1", "component": "base_link"},
            "geometry_or_origin_one": {"kind": "point", "origin": [0.0, 0.0, 0.0]},
            "geometry_or_origin_two": {"kind": "joint_origin", "geometry": {"origin": [0.0, 0.0, 20.0]}}
        },
        {
            "name": "finger_l",
            "motion": {
                "type": "slider",
                "slide_direction": [1.0, 0.0, 0.0],
                "limits": {"maximum_enabled": true, "maximum": 2.0, "minimum_enabled": true, "minimum": 0.0}
            },
            "occurrence_one": {
                "name": "finger_l:1", "component": "finger",
                "transform": [1,0,0,5, 0,1,0,0, 0,0,1,30, 0,0,0,1]
            },
            "occurrence_two": {
                "name": "arm:1", "component": "arm",
                "transform": [1,0,0,0, 0,1,0,0, 0,0,1,20, 0,0,0,1]
            },
            "geometry_or_origin_one": {"kind": "point", "origin": [0.0, 0.0, 0.0]}
        },
        {
            "name": "finger_r-Link-finger_l:1",
            "motion": {
                "type": "slider",
                "slide_direction": [-1.0, 0.0, 0.0],
                "limits": {"maximum_enabled": true, "maximum": 2.0, "minimum_enabled": true, "minimum": 0.0}
            },
            "occurrence_one": {
                "name": "finger_r:1", "component": "finger",
                "transform": [1,0,0,-5, 0,1,0,0, 0,0,1,30, 0,0,0,1]
            },
            "occurrence_two": {
                "name": "arm:1", "component": "arm",
                "transform": [1,0,0,0, 0,1,0,0, 0,0,1,20, 0,0,0,1]
            },
            "geometry_or_origin_one": {"kind": "point", "origin": [0.0, 0.0, 0.0]}
        }
    ],
    "bodies": [
        {
            "occurrence": "arm:1",
            "component": "arm",
            "mass": 1.0,
            "center_of_mass": [0.0, 0.0, 25.0],
            "inertia": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        }
    ]
}"#;

#[test]
fn test_full_pipeline_produces_valid_urdf() {
    let snapshot = HostSnapshot::from_json(ARM_SNAPSHOT).unwrap();
    let config = ExportConfig::default();
    let report = export(&snapshot, &config).unwrap();

    assert_eq!(report.robot_name, "picker");
    assert_eq!(report.table.len(), 3);
    assert!(report.diagnostics.is_empty());
    assert!(report.table.iter().all(|j| j.resolution == Resolution::Traversal));

    let shoulder = report.table.get("shoulder").unwrap();
    assert_eq!(shoulder.kind, JointKind::Revolute);
    assert_eq!(shoulder.parent.as_str(), "base_link");
    assert_eq!(shoulder.child.as_str(), "arm_1");
    assert_eq!(shoulder.origin_world, DVec3::new(0.0, 0.0, 0.2));

    let finger = report.table.get("finger_l").unwrap();
    assert_eq!(finger.kind, JointKind::Prismatic);
    assert_eq!(finger.parent.as_str(), "arm_1");
    assert_eq!(finger.upper_limit, 0.02);
    assert_eq!(finger.origin_world, DVec3::new(0.05, 0.0, 0.3));

    let follower = report.table.get("finger_r-Link-finger_l:1").unwrap();
    assert_eq!(follower.output_name, "finger_r");
    assert_eq!(follower.mimic.as_ref().unwrap().joint, "finger_l");

    let text = report.to_urdf(&report.package_name(), &config).unwrap();
    let summary = validate_urdf(&text).unwrap();
    assert_eq!(summary.robot, "picker");
    assert_eq!(summary.links, 4);
    assert_eq!(summary.joints, 3);
    assert_eq!(summary.mimics, 1);

    let robot = urdf_rs::read_from_string(&text).unwrap();
    let finger_r = robot.joints.iter().find(|j| j.name == "finger_r").unwrap();
    let xyz = finger_r.origin.xyz.0;
    assert!((xyz[0] + 0.05).abs() < 1e-9);
    assert!((xyz[2] - 0.1).abs() < 1e-9);

    let arm = robot.links.iter().find(|l| l.name == "arm_1").unwrap();
    assert!((arm.inertial.mass.value - 1.0).abs() < 1e-9);
    assert!((arm.inertial.origin.xyz.0[2] - 0.05).abs() < 1e-9);
}

#[test]
fn test_asymmetric_limit_aborts_export() {
    let json = ARM_SNAPSHOT.replacen(
        r#""maximum_enabled": true, "maximum": 1.57"#,
        r#""maximum_enabled": false, "maximum": 1.57"#,
        1,
    );
    let snapshot = HostSnapshot::from_json(&json).unwrap();
    assert_eq!(
        export(&snapshot, &ExportConfig::default()).unwrap_err(),
        ExportError::AsymmetricLimit {
            joint: "shoulder".into(),
            missing: LimitBound::Upper,
        }
    );
}

#[test]
fn test_missing_origin_aborts_export() {
    let mut snapshot = HostSnapshot::from_json(ARM_SNAPSHOT).unwrap();
    snapshot.joints[1].geometry_or_origin_one = None;
    assert_eq!(
        export(&snapshot, &ExportConfig::default()).unwrap_err(),
        ExportError::MissingJointOrigin("finger_l".into())
    );
}

#[test]
fn test_millimeter_design_from_ron_config() {
    let config = ExportConfig::from_ron("(length_scale: 1000.0, root_body: \"base_link\")").unwrap();
    let snapshot = HostSnapshot::from_json(ARM_SNAPSHOT).unwrap();
    let report = export(&snapshot, &config).unwrap();

    let shoulder = report.table.get("shoulder").unwrap();
    assert_eq!(shoulder.origin_world, DVec3::new(0.0, 0.0, 0.02));
}
