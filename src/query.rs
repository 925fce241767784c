//! The query engine.
//!
//! Evaluates a conjunction of parsed filters against every candidate of the
//! requested entity kind. Filters are partitioned by target kind once, then
//! checked per candidate in increasing cost order: same-kind fields first,
//! one-hop joins next, machine-dependent joins last — and machine resolution
//! is skipped entirely when no filter asks for it. Candidates come out in
//! snapshot enumeration order; no extra sort is imposed.

use std::fmt;
use thiserror::Error;

use crate::filter::{Filter, ObjectKind};
use crate::model::{Application, Machine, Model, SchemaError, Unit};
use crate::resolver;

/// The kinds of entity a query can enumerate.
///
/// Charm, ip, and hostname are filter targets only; asking for them as the
/// output kind is a usage error caught before any snapshot access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Application,
    Unit,
    Machine,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Application => f.write_str("applications"),
            EntityKind::Unit => f.write_str("units"),
            EntityKind::Machine => f.write_str("machines"),
        }
    }
}

#[derive(Debug, Error)]
#[error("cannot query {0} objects; query applications, units, or machines")]
pub struct NotQueryable(pub ObjectKind);

impl TryFrom<ObjectKind> for EntityKind {
    type Error = NotQueryable;

    fn try_from(kind: ObjectKind) -> Result<Self, NotQueryable> {
        match kind {
            ObjectKind::Application => Ok(EntityKind::Application),
            ObjectKind::Unit => Ok(EntityKind::Unit),
            ObjectKind::Machine => Ok(EntityKind::Machine),
            other => Err(NotQueryable(other)),
        }
    }
}

/// Entities retained by a query, in snapshot order.
#[derive(Debug)]
pub enum QueryMatches<'a> {
    Applications(Vec<&'a Application>),
    Units(Vec<&'a Unit>),
    Machines(Vec<&'a Machine>),
}

impl QueryMatches<'_> {
    pub fn len(&self) -> usize {
        match self {
            QueryMatches::Applications(items) => items.len(),
            QueryMatches::Units(items) => items.len(),
            QueryMatches::Machines(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names (or ids) of the matched entities.
    pub fn names(&self) -> Vec<&str> {
        match self {
            QueryMatches::Applications(items) => {
                items.iter().map(|a| a.name.as_str()).collect()
            }
            QueryMatches::Units(items) => items.iter().map(|u| u.name.as_str()).collect(),
            QueryMatches::Machines(items) => items.iter().map(|m| m.id.as_str()).collect(),
        }
    }
}

/// Filters partitioned by the object kind they target.
#[derive(Debug, Default)]
struct FilterSet<'f> {
    charm: Vec<&'f Filter>,
    app: Vec<&'f Filter>,
    unit: Vec<&'f Filter>,
    machine: Vec<&'f Filter>,
    hostname: Vec<&'f Filter>,
    ip: Vec<&'f Filter>,
}

impl<'f> FilterSet<'f> {
    fn partition(filters: &'f [Filter]) -> Self {
        let mut set = FilterSet::default();
        for filter in filters {
            match filter.kind {
                ObjectKind::Charm => set.charm.push(filter),
                ObjectKind::Application => set.app.push(filter),
                ObjectKind::Unit => set.unit.push(filter),
                ObjectKind::Machine => set.machine.push(filter),
                ObjectKind::Hostname => set.hostname.push(filter),
                ObjectKind::Ip => set.ip.push(filter),
            }
        }
        set
    }

    fn needs_machine(&self) -> bool {
        !(self.machine.is_empty() && self.hostname.is_empty() && self.ip.is_empty())
    }

    fn needs_units(&self) -> bool {
        !(self.unit.is_empty() && self.app.is_empty() && self.charm.is_empty())
    }
}

/// Run a query: all filters must hold for a candidate to be kept.
///
/// An empty filter list returns every entity of the requested kind. A broken
/// snapshot invariant encountered during resolution fails the whole query.
pub fn run_query<'a>(
    model: &'a Model,
    kind: EntityKind,
    filters: &[Filter],
) -> Result<QueryMatches<'a>, SchemaError> {
    let set = FilterSet::partition(filters);

    match kind {
        EntityKind::Unit => {
            let mut hits = Vec::new();
            for unit in model.units() {
                if unit_matches(model, unit, &set)? {
                    hits.push(unit);
                }
            }
            Ok(QueryMatches::Units(hits))
        }
        EntityKind::Application => {
            let mut hits = Vec::new();
            for app in model.applications() {
                if application_matches(model, app, &set)? {
                    hits.push(app);
                }
            }
            Ok(QueryMatches::Applications(hits))
        }
        EntityKind::Machine => {
            let mut hits = Vec::new();
            for machine in model.machines() {
                if machine_matches(model, machine, &set)? {
                    hits.push(machine);
                }
            }
            Ok(QueryMatches::Machines(hits))
        }
    }
}

fn unit_matches(model: &Model, unit: &Unit, set: &FilterSet<'_>) -> Result<bool, SchemaError> {
    if !set.unit.iter().all(|f| f.matches(&unit.name)) {
        return Ok(false);
    }
    if !set.app.iter().all(|f| f.matches(&unit.app)) {
        return Ok(false);
    }
    if !set.charm.iter().all(|f| f.matches(&unit.charm)) {
        return Ok(false);
    }

    if !set.needs_machine() {
        return Ok(true);
    }

    let machine = resolver::machine_of(model, unit)?;
    if !set.machine.iter().all(|f| f.matches(&machine.id)) {
        return Ok(false);
    }
    if !set
        .hostname
        .iter()
        .all(|f| f.holds(resolver::hostname_of(machine)))
    {
        return Ok(false);
    }
    let ips = resolver::ips_of(machine);
    if !set
        .ip
        .iter()
        .all(|f| f.matches_any(ips.iter().map(String::as_str)))
    {
        return Ok(false);
    }

    Ok(true)
}

fn application_matches(
    model: &Model,
    app: &Application,
    set: &FilterSet<'_>,
) -> Result<bool, SchemaError> {
    if !set.app.iter().all(|f| f.matches(&app.name)) {
        return Ok(false);
    }
    if !set.charm.iter().all(|f| f.matches(&app.charm)) {
        return Ok(false);
    }

    if set.unit.is_empty() && !set.needs_machine() {
        return Ok(true);
    }

    // Joins below hold if any unit of the application satisfies the filter.
    let units: Vec<&Unit> = resolver::units_of(model, &app.name).collect();
    for filter in &set.unit {
        if !units.iter().any(|u| filter.matches(&u.name)) {
            return Ok(false);
        }
    }

    if !set.needs_machine() {
        return Ok(true);
    }

    let mut machines = Vec::with_capacity(units.len());
    for unit in &units {
        machines.push(resolver::machine_of(model, unit)?);
    }
    for filter in &set.machine {
        if !machines.iter().any(|m| filter.matches(&m.id)) {
            return Ok(false);
        }
    }
    for filter in &set.hostname {
        if !machines
            .iter()
            .any(|m| filter.holds(resolver::hostname_of(m)))
        {
            return Ok(false);
        }
    }
    for filter in &set.ip {
        if !machines
            .iter()
            .any(|m| filter.matches_any(resolver::ips_of(m).iter().map(String::as_str)))
        {
            return Ok(false);
        }
    }

    Ok(true)
}

fn machine_matches(
    model: &Model,
    machine: &Machine,
    set: &FilterSet<'_>,
) -> Result<bool, SchemaError> {
    if !set.machine.iter().all(|f| f.matches(&machine.id)) {
        return Ok(false);
    }
    if !set
        .hostname
        .iter()
        .all(|f| f.holds(resolver::hostname_of(machine)))
    {
        return Ok(false);
    }
    let ips = resolver::ips_of(machine);
    if !set
        .ip
        .iter()
        .all(|f| f.matches_any(ips.iter().map(String::as_str)))
    {
        return Ok(false);
    }

    if !set.needs_units() {
        return Ok(true);
    }

    // Reverse join: the filter holds if any unit on this machine satisfies it.
    let units = resolver::units_on(model, machine)?;
    for filter in &set.unit {
        if !units.iter().any(|u| filter.matches(&u.name)) {
            return Ok(false);
        }
    }
    for filter in &set.app {
        if !units.iter().any(|u| filter.matches(&u.app)) {
            return Ok(false);
        }
    }
    for filter in &set.charm {
        if !units.iter().any(|u| filter.matches(&u.charm)) {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filters;
    use crate::snapshot::parse_snapshot;

    fn model() -> Model {
        Model::from_snapshot(
            &parse_snapshot(
                r#"{
                    "applications": {
                        "ubuntu": {
                            "charm-name": "ubuntu",
                            "charm-rev": 24,
                            "units": {
                                "ubuntu/0": {"machine": "0", "subordinates": {"ntp/0": {}}}
                            }
                        },
                        "ntp": {
                            "charm-name": "ntp",
                            "charm-rev": 50,
                            "subordinate-to": ["ubuntu"]
                        }
                    },
                    "machines": {
                        "0": {"hostname": "juju-abc", "ip-addresses": ["10.0.0.5"]}
                    }
                }"#,
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn filters(exprs: &[&str]) -> Vec<Filter> {
        parse_filters(&exprs.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn test_empty_filter_list_returns_everything() {
        let model = model();
        let matches = run_query(&model, EntityKind::Unit, &[]).unwrap();
        assert_eq!(matches.names(), vec!["ubuntu/0", "ntp/0"]);
    }

    #[test]
    fn test_machine_resolution_is_skipped_without_machine_filters() {
        // The unit references a machine that does not exist; as long as no
        // filter needs the machine, the query must not touch it.
        let model = Model::from_snapshot(
            &parse_snapshot(
                r#"{
                    "applications": {
                        "ubuntu": {
                            "charm-name": "ubuntu",
                            "charm-rev": 24,
                            "units": {"ubuntu/0": {"machine": "9"}}
                        }
                    },
                    "machines": {}
                }"#,
            )
            .unwrap(),
        )
        .unwrap();

        let matches = run_query(&model, EntityKind::Unit, &filters(&["app=ubuntu"])).unwrap();
        assert_eq!(matches.names(), vec!["ubuntu/0"]);

        let err = run_query(&model, EntityKind::Unit, &filters(&["hostname~x"]));
        assert!(matches!(err, Err(SchemaError::MissingMachine { .. })));
    }

    #[test]
    fn test_filtering_applications_by_ip_resolves_the_forward_path() {
        let model = model();
        let matches =
            run_query(&model, EntityKind::Application, &filters(&["ip~10.0.0"])).unwrap();
        assert_eq!(matches.names(), vec!["ubuntu", "ntp"]);

        let matches =
            run_query(&model, EntityKind::Application, &filters(&["ip=192.168.0.1"])).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_filtering_machines_by_application() {
        let model = model();
        let matches = run_query(&model, EntityKind::Machine, &filters(&["app=ntp"])).unwrap();
        assert_eq!(matches.names(), vec!["0"]);
    }

    #[test]
    fn test_queryable_kind_conversion() {
        assert!(EntityKind::try_from(ObjectKind::Unit).is_ok());
        assert!(EntityKind::try_from(ObjectKind::Charm).is_err());
        assert!(EntityKind::try_from(ObjectKind::Ip).is_err());
        assert!(EntityKind::try_from(ObjectKind::Hostname).is_err());
    }
}
