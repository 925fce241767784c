//! The entity model: a typed, immutable view over one status snapshot.
//!
//! Built once per invocation and never mutated afterwards. Entities keep the
//! snapshot's own enumeration order: machines are listed physical machine
//! first, immediately followed by their containers; units are listed
//! principal first, immediately followed by their subordinates.

use std::collections::HashMap;
use thiserror::Error;

use crate::snapshot::{RawMachine, RawUnit, StatusSnapshot};

mod entities;

pub use entities::{Application, Machine, Unit};

/// The snapshot violates a modeled invariant.
///
/// This is distinct from an ordinary filter miss: the input data itself is
/// inconsistent, and silently treating it as "no match" would produce
/// misleading empty results. The whole query fails instead.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unit name '{0}' is not in <application>/<index> form")]
    MalformedUnitName(String),
    #[error("unit '{unit}' belongs to unknown application '{application}'")]
    MissingApplication { unit: String, application: String },
    #[error("subordinate unit '{unit}' is not attached to any principal unit")]
    NoPrincipal { unit: String },
    #[error("subordinate unit '{unit}' names principal '{principal}', which does not exist")]
    MissingPrincipal { unit: String, principal: String },
    #[error("unit '{unit}' is not assigned to a machine")]
    UnassignedUnit { unit: String },
    #[error("unit '{unit}' references machine '{machine}', which does not exist")]
    MissingMachine { unit: String, machine: String },
}

/// All entities of one snapshot, with name lookup tables.
#[derive(Debug, Clone)]
pub struct Model {
    applications: Vec<Application>,
    units: Vec<Unit>,
    machines: Vec<Machine>,
    app_index: HashMap<String, usize>,
    unit_index: HashMap<String, usize>,
    machine_index: HashMap<String, usize>,
}

impl Model {
    /// Build the entity model from a parsed snapshot.
    ///
    /// Structural problems (a unit name without `/`, a subordinate whose
    /// application is missing from the document) fail here; referential
    /// integrity against the machine set is checked lazily, when resolution
    /// is actually attempted.
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Result<Self, SchemaError> {
        let mut applications = Vec::with_capacity(snapshot.applications.len());
        for (name, raw) in &snapshot.applications {
            applications.push(Application {
                name: name.clone(),
                charm: raw.charm_name.clone(),
                charm_rev: raw.charm_rev,
                subordinate_to: raw.subordinate_to.clone(),
            });
        }

        let mut machines = Vec::new();
        for (id, raw) in &snapshot.machines {
            collect_machine(&mut machines, id, raw, None);
        }

        let mut units = Vec::new();
        for (app_name, raw_app) in &snapshot.applications {
            for (unit_name, raw_unit) in &raw_app.units {
                split_unit_name(unit_name)?;
                units.push(build_unit(
                    unit_name,
                    raw_unit,
                    app_name,
                    &raw_app.charm_name,
                    None,
                ));

                for (sub_name, raw_sub) in &raw_unit.subordinates {
                    let sub_app = split_unit_name(sub_name)?;
                    let charm = snapshot
                        .applications
                        .iter()
                        .find(|(name, _)| name == sub_app)
                        .map(|(_, raw)| raw.charm_name.as_str())
                        .ok_or_else(|| SchemaError::MissingApplication {
                            unit: sub_name.clone(),
                            application: sub_app.to_string(),
                        })?;
                    units.push(build_unit(
                        sub_name,
                        raw_sub,
                        sub_app,
                        charm,
                        Some(unit_name.as_str()),
                    ));
                }
            }
        }

        let app_index = index_by(&applications, |a| &a.name);
        let unit_index = index_by(&units, |u| &u.name);
        let machine_index = index_by(&machines, |m| &m.id);

        Ok(Self {
            applications,
            units,
            machines,
            app_index,
            unit_index,
            machine_index,
        })
    }

    /// Applications in snapshot order.
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Units in snapshot order, each principal followed by its subordinates.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Machines in snapshot order, each followed by its containers.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn application(&self, name: &str) -> Option<&Application> {
        self.app_index.get(name).map(|&i| &self.applications[i])
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.unit_index.get(name).map(|&i| &self.units[i])
    }

    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machine_index.get(id).map(|&i| &self.machines[i])
    }
}

/// Application-name prefix of a unit name.
fn split_unit_name(name: &str) -> Result<&str, SchemaError> {
    name.split_once('/')
        .map(|(app, _)| app)
        .filter(|app| !app.is_empty())
        .ok_or_else(|| SchemaError::MalformedUnitName(name.to_string()))
}

fn build_unit(
    name: &str,
    raw: &RawUnit,
    app: &str,
    charm: &str,
    principal: Option<&str>,
) -> Unit {
    Unit {
        name: name.to_string(),
        app: app.to_string(),
        charm: charm.to_string(),
        workload: raw
            .workload_status
            .as_ref()
            .map(|s| s.current.clone())
            .unwrap_or_default(),
        agent: raw
            .juju_status
            .as_ref()
            .map(|s| s.current.clone())
            .unwrap_or_default(),
        address: raw.public_address.clone(),
        leader: raw.leader,
        subordinate: principal.is_some(),
        principal: principal.map(str::to_string),
        machine: if principal.is_some() {
            None
        } else {
            raw.machine.clone()
        },
        subordinates: raw
            .subordinates
            .iter()
            .map(|(sub_name, _)| sub_name.clone())
            .collect(),
    }
}

/// Flatten a machine record and its containers, depth first.
fn collect_machine(machines: &mut Vec<Machine>, id: &str, raw: &RawMachine, parent: Option<&str>) {
    machines.push(Machine {
        id: id.to_string(),
        hostname: raw.hostname.clone(),
        base: base_label(raw),
        hardware: raw.hardware.clone(),
        ips: raw.ip_addresses.clone(),
        parent: parent.map(str::to_string),
        containers: raw
            .containers
            .iter()
            .map(|(container_id, _)| container_id.clone())
            .collect(),
    });

    for (container_id, raw_container) in &raw.containers {
        collect_machine(machines, container_id, raw_container, Some(id));
    }
}

/// One canonical base identifier out of the two document forms.
fn base_label(raw: &RawMachine) -> Option<String> {
    raw.series
        .clone()
        .or_else(|| raw.base.as_ref().map(|b| format!("{}:{}", b.name, b.channel)))
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item).clone(), i))
        .collect()
}
