//! Relationship lookups over the entity model.
//!
//! All lookups are pure. A key that simply does not exist is an ordinary
//! `None`; a miss while resolving the principal/subordinate attachment or a
//! unit's machine reference means the snapshot violates a modeled invariant
//! and surfaces as a [`SchemaError`] instead.

use crate::model::{Application, Machine, Model, SchemaError, Unit};

/// Application a unit belongs to, derived from its name prefix.
pub fn application_of<'a>(model: &'a Model, unit_name: &str) -> Option<&'a Application> {
    let (app, _) = unit_name.split_once('/')?;
    model.application(app)
}

/// Charm an application runs.
pub fn charm_of<'a>(model: &'a Model, app_name: &str) -> Option<&'a str> {
    model.application(app_name).map(|a| a.charm.as_str())
}

/// Units owned by an application, in snapshot order.
pub fn units_of<'a>(model: &'a Model, app_name: &'a str) -> impl Iterator<Item = &'a Unit> {
    model.units().iter().filter(move |u| u.app == app_name)
}

/// The principal unit a unit ultimately runs under.
///
/// A principal unit resolves to itself. A subordinate resolves through the
/// attachment recorded at construction; if the record carries none, the
/// principal units of the applications this unit's application is
/// subordinate to are scanned for one that lists it. Either miss is a
/// data-integrity failure, not a normal lookup miss.
pub fn principal_unit_of<'a>(model: &'a Model, unit: &'a Unit) -> Result<&'a Unit, SchemaError> {
    if !unit.subordinate {
        return Ok(unit);
    }

    if let Some(principal) = &unit.principal {
        return model
            .unit(principal)
            .ok_or_else(|| SchemaError::MissingPrincipal {
                unit: unit.name.clone(),
                principal: principal.clone(),
            });
    }

    if let Some(app) = model.application(&unit.app) {
        for principal_app in &app.subordinate_to {
            for candidate in units_of(model, principal_app) {
                if candidate.subordinates.iter().any(|s| s == &unit.name) {
                    return Ok(candidate);
                }
            }
        }
    }

    Err(SchemaError::NoPrincipal {
        unit: unit.name.clone(),
    })
}

/// Machine a unit runs on, resolving subordinates through their principal.
pub fn machine_of<'a>(model: &'a Model, unit: &'a Unit) -> Result<&'a Machine, SchemaError> {
    let principal = principal_unit_of(model, unit)?;
    let machine_id = principal
        .machine
        .as_ref()
        .ok_or_else(|| SchemaError::UnassignedUnit {
            unit: principal.name.clone(),
        })?;
    model
        .machine(machine_id)
        .ok_or_else(|| SchemaError::MissingMachine {
            unit: principal.name.clone(),
            machine: machine_id.clone(),
        })
}

/// Hostname of a machine. Container records carry their own hostname.
pub fn hostname_of(machine: &Machine) -> Option<&str> {
    machine.hostname.as_deref()
}

/// IP addresses of a machine, in snapshot order.
pub fn ips_of(machine: &Machine) -> &[String] {
    &machine.ips
}

/// All units (principal and subordinate) resolving onto a machine.
pub fn units_on<'a>(model: &'a Model, machine: &Machine) -> Result<Vec<&'a Unit>, SchemaError> {
    let mut found = Vec::new();
    for unit in model.units() {
        if machine_of(model, unit)?.id == machine.id {
            found.push(unit);
        }
    }
    Ok(found)
}

/// Machine owning an IP address. Linear scan over machines and containers.
pub fn machine_by_ip<'a>(model: &'a Model, ip: &str) -> Option<&'a Machine> {
    model
        .machines()
        .iter()
        .find(|m| m.ips.iter().any(|a| a == ip))
}

/// Machine with a hostname. Linear scan over machines and containers.
pub fn machine_by_hostname<'a>(model: &'a Model, hostname: &str) -> Option<&'a Machine> {
    model
        .machines()
        .iter()
        .find(|m| m.hostname.as_deref() == Some(hostname))
}
