use juju_query::model::Model;
use juju_query::projection::{ProjectionError, project};
use juju_query::query::{EntityKind, run_query};
use juju_query::snapshot::parse_snapshot;

const SCENARIO: &str = r#"{
    "applications": {
        "ubuntu": {
            "charm-name": "ubuntu",
            "charm-rev": 24,
            "units": {
                "ubuntu/0": {
                    "machine": "0",
                    "workload-status": {"current": "active"},
                    "juju-status": {"current": "idle"},
                    "public-address": "10.0.0.5",
                    "leader": true,
                    "subordinates": {
                        "ntp/0": {"public-address": "10.0.0.5"}
                    }
                }
            }
        },
        "ntp": {"charm-name": "ntp", "charm-rev": 50, "subordinate-to": ["ubuntu"]}
    },
    "machines": {
        "0": {
            "hostname": "juju-abc",
            "series": "jammy",
            "hardware": "arch=amd64",
            "ip-addresses": ["10.0.0.5", "252.0.0.1"]
        }
    }
}"#;

fn scenario_model() -> Model {
    Model::from_snapshot(&parse_snapshot(SCENARIO).expect("valid JSON")).expect("consistent")
}

#[test]
fn test_default_unit_columns_in_declared_order() {
    let model = scenario_model();
    let matches = run_query(&model, EntityKind::Unit, &[]).unwrap();
    let projection = project(&model, &matches, None).unwrap();

    assert_eq!(
        projection.columns,
        vec![
            "unit",
            "machine",
            "hostname",
            "app",
            "charm",
            "workload",
            "agent",
            "ip",
            "leader",
            "subordinate",
            "principal"
        ]
    );

    let principal = &projection.rows[0];
    assert_eq!(principal[0], "ubuntu/0");
    assert_eq!(principal[1], "0");
    assert_eq!(principal[2], "juju-abc");
    assert_eq!(principal[8], "true");
    assert_eq!(principal[9], "false");
    assert_eq!(principal[10], "");
}

#[test]
fn test_subordinate_rows_resolve_through_the_principal() {
    let model = scenario_model();
    let matches = run_query(&model, EntityKind::Unit, &[]).unwrap();
    let projection = project(&model, &matches, None).unwrap();

    let subordinate = &projection.rows[1];
    assert_eq!(subordinate[0], "ntp/0");
    // machine and hostname are inherited from ubuntu/0
    assert_eq!(subordinate[1], "0");
    assert_eq!(subordinate[2], "juju-abc");
    assert_eq!(subordinate[9], "true");
    assert_eq!(subordinate[10], "ubuntu/0");
}

#[test]
fn test_column_selection() {
    let model = scenario_model();
    let matches = run_query(&model, EntityKind::Unit, &[]).unwrap();
    let columns = vec!["hostname".to_string(), "unit".to_string()];
    let projection = project(&model, &matches, Some(&columns)).unwrap();

    assert_eq!(projection.columns, vec!["hostname", "unit"]);
    assert_eq!(projection.rows[0], vec!["juju-abc", "ubuntu/0"]);
}

#[test]
fn test_unknown_column_is_a_usage_error() {
    let model = scenario_model();
    let matches = run_query(&model, EntityKind::Unit, &[]).unwrap();
    let columns = vec!["nope".to_string()];
    let err = project(&model, &matches, Some(&columns)).unwrap_err();

    match err {
        ProjectionError::UnknownColumn { column, valid, .. } => {
            assert_eq!(column, "nope");
            assert!(valid.contains("hostname"));
        }
        other => panic!("expected UnknownColumn, got {other:?}"),
    }
}

#[test]
fn test_machine_rows_render_ips_and_base() {
    let model = scenario_model();
    let matches = run_query(&model, EntityKind::Machine, &[]).unwrap();
    let projection = project(&model, &matches, None).unwrap();

    assert_eq!(
        projection.columns,
        vec!["machine", "hostname", "base", "hardware", "ips"]
    );
    assert_eq!(
        projection.rows[0],
        vec!["0", "juju-abc", "jammy", "arch=amd64", "10.0.0.5, 252.0.0.1"]
    );
}

#[test]
fn test_application_rows() {
    let model = scenario_model();
    let matches = run_query(&model, EntityKind::Application, &[]).unwrap();
    let projection = project(&model, &matches, None).unwrap();

    assert_eq!(projection.columns, vec!["app", "charm", "charm-rev"]);
    assert_eq!(projection.rows[0], vec!["ubuntu", "ubuntu", "24"]);
    assert_eq!(projection.rows[1], vec!["ntp", "ntp", "50"]);
}

#[test]
fn test_absent_optional_fields_render_empty() {
    let model = Model::from_snapshot(
        &parse_snapshot(
            r#"{
                "applications": {},
                "machines": {"0": {}}
            }"#,
        )
        .unwrap(),
    )
    .unwrap();

    let matches = run_query(&model, EntityKind::Machine, &[]).unwrap();
    let projection = project(&model, &matches, None).unwrap();
    assert_eq!(projection.rows[0], vec!["0", "", "", "", ""]);
}
