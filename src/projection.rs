//! Field registries and projection.
//!
//! One static registry per entity kind maps column names to render
//! functions, in the schema's declared order. The registries replace
//! any-field-by-name reflection: the projector and the CLI both validate
//! column names against them, and an unknown name is a usage error rather
//! than a silent no-op.

use thiserror::Error;

use crate::model::{Application, Machine, Model, SchemaError, Unit};
use crate::query::{EntityKind, QueryMatches};
use crate::resolver;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("unknown column '{column}' for {kind}. Valid columns are: {valid}")]
    UnknownColumn {
        column: String,
        kind: EntityKind,
        valid: String,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A named column and how to render it for one entity.
pub struct FieldSpec<T> {
    pub name: &'static str,
    render: fn(&Model, &T) -> Result<String, SchemaError>,
}

pub static APPLICATION_FIELDS: &[FieldSpec<Application>] = &[
    FieldSpec {
        name: "app",
        render: |_, a| Ok(a.name.clone()),
    },
    FieldSpec {
        name: "charm",
        render: |_, a| Ok(a.charm.clone()),
    },
    FieldSpec {
        name: "charm-rev",
        render: |_, a| Ok(a.charm_rev.to_string()),
    },
];

pub static UNIT_FIELDS: &[FieldSpec<Unit>] = &[
    FieldSpec {
        name: "unit",
        render: |_, u| Ok(u.name.clone()),
    },
    FieldSpec {
        name: "machine",
        render: |model, u| Ok(resolver::machine_of(model, u)?.id.clone()),
    },
    FieldSpec {
        name: "hostname",
        render: |model, u| {
            let machine = resolver::machine_of(model, u)?;
            Ok(machine.hostname.clone().unwrap_or_default())
        },
    },
    FieldSpec {
        name: "app",
        render: |_, u| Ok(u.app.clone()),
    },
    FieldSpec {
        name: "charm",
        render: |_, u| Ok(u.charm.clone()),
    },
    FieldSpec {
        name: "workload",
        render: |_, u| Ok(u.workload.clone()),
    },
    FieldSpec {
        name: "agent",
        render: |_, u| Ok(u.agent.clone()),
    },
    FieldSpec {
        name: "ip",
        render: |_, u| Ok(u.address.clone().unwrap_or_default()),
    },
    FieldSpec {
        name: "leader",
        render: |_, u| Ok(u.leader.to_string()),
    },
    FieldSpec {
        name: "subordinate",
        render: |_, u| Ok(u.subordinate.to_string()),
    },
    FieldSpec {
        name: "principal",
        render: |_, u| Ok(u.principal.clone().unwrap_or_default()),
    },
];

pub static MACHINE_FIELDS: &[FieldSpec<Machine>] = &[
    FieldSpec {
        name: "machine",
        render: |_, m| Ok(m.id.clone()),
    },
    FieldSpec {
        name: "hostname",
        render: |_, m| Ok(m.hostname.clone().unwrap_or_default()),
    },
    FieldSpec {
        name: "base",
        render: |_, m| Ok(m.base.clone().unwrap_or_default()),
    },
    FieldSpec {
        name: "hardware",
        render: |_, m| Ok(m.hardware.clone().unwrap_or_default()),
    },
    FieldSpec {
        name: "ips",
        render: |_, m| Ok(m.ips.join(", ")),
    },
];

/// A projected result: column names plus string-rendered rows.
#[derive(Debug)]
pub struct Projection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Render the matched entities into rows.
///
/// With no column selection the full registry is used, in declared order.
pub fn project(
    model: &Model,
    matches: &QueryMatches<'_>,
    columns: Option<&[String]>,
) -> Result<Projection, ProjectionError> {
    match matches {
        QueryMatches::Applications(items) => project_kind(
            model,
            items,
            APPLICATION_FIELDS,
            EntityKind::Application,
            columns,
        ),
        QueryMatches::Units(items) => {
            project_kind(model, items, UNIT_FIELDS, EntityKind::Unit, columns)
        }
        QueryMatches::Machines(items) => {
            project_kind(model, items, MACHINE_FIELDS, EntityKind::Machine, columns)
        }
    }
}

fn project_kind<T>(
    model: &Model,
    items: &[&T],
    fields: &'static [FieldSpec<T>],
    kind: EntityKind,
    columns: Option<&[String]>,
) -> Result<Projection, ProjectionError> {
    let selected: Vec<&FieldSpec<T>> = match columns {
        None => fields.iter().collect(),
        Some(names) => names
            .iter()
            .map(|name| {
                fields.iter().find(|f| f.name == name).ok_or_else(|| {
                    ProjectionError::UnknownColumn {
                        column: name.clone(),
                        kind,
                        valid: fields
                            .iter()
                            .map(|f| f.name)
                            .collect::<Vec<_>>()
                            .join(", "),
                    }
                })
            })
            .collect::<Result<_, _>>()?,
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let mut row = Vec::with_capacity(selected.len());
        for field in &selected {
            row.push((field.render)(model, item)?);
        }
        rows.push(row);
    }

    Ok(Projection {
        columns: selected.iter().map(|f| f.name.to_string()).collect(),
        rows,
    })
}
