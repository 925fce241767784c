/// A deployed application and the charm backing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    /// Application name, unique within the snapshot
    pub name: String,
    /// Name of the charm the application runs
    pub charm: String,
    /// Revision of the deployed charm
    pub charm_rev: i64,
    /// Principal applications this one is attached to; empty for principals
    pub subordinate_to: Vec<String>,
}

impl Application {
    /// A principal application owns machines directly; a subordinate one is
    /// only ever attached to principal units of other applications.
    pub fn is_principal(&self) -> bool {
        self.subordinate_to.is_empty()
    }
}

/// A machine or a container nested inside one.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    /// Machine id, e.g. "0" or "0/lxd/3" for a container
    pub id: String,
    pub hostname: Option<String>,
    /// Base identifier: the legacy `series` string, or `name:channel`
    pub base: Option<String>,
    pub hardware: Option<String>,
    /// IP addresses in snapshot order
    pub ips: Vec<String>,
    /// Id of the hosting machine, set for containers only
    pub parent: Option<String>,
    /// Ids of containers hosted on this machine
    pub containers: Vec<String>,
}

impl Machine {
    pub fn is_container(&self) -> bool {
        self.parent.is_some()
    }
}

/// A unit of an application.
///
/// Principal units carry the id of the machine they are assigned to;
/// subordinate units carry the name of the principal unit they are attached
/// to instead and inherit its machine transitively.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Unit name in `<application>/<index>` form
    pub name: String,
    /// Name of the owning application
    pub app: String,
    /// Charm of the owning application
    pub charm: String,
    /// Current workload status, e.g. "active"
    pub workload: String,
    /// Current agent status, e.g. "idle"
    pub agent: String,
    /// Public address, when the snapshot reports one
    pub address: Option<String>,
    pub leader: bool,
    pub subordinate: bool,
    /// Principal unit name; set for subordinate units only
    pub principal: Option<String>,
    /// Assigned machine id; set for principal units only
    pub machine: Option<String>,
    /// Names of subordinate units attached to this unit
    pub subordinates: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_principality() {
        let principal = Application {
            name: "ubuntu".to_string(),
            charm: "ubuntu".to_string(),
            charm_rev: 24,
            subordinate_to: Vec::new(),
        };
        assert!(principal.is_principal());

        let subordinate = Application {
            name: "ntp".to_string(),
            charm: "ntp".to_string(),
            charm_rev: 50,
            subordinate_to: vec!["ubuntu".to_string()],
        };
        assert!(!subordinate.is_principal());
    }

    #[test]
    fn test_machine_container_flag() {
        let machine = Machine {
            id: "0".to_string(),
            hostname: Some("juju-abc-0".to_string()),
            base: Some("ubuntu:22.04/stable".to_string()),
            hardware: None,
            ips: vec!["10.0.0.5".to_string()],
            parent: None,
            containers: vec!["0/lxd/0".to_string()],
        };
        assert!(!machine.is_container());

        let container = Machine {
            id: "0/lxd/0".to_string(),
            parent: Some("0".to_string()),
            containers: Vec::new(),
            ..machine
        };
        assert!(container.is_container());
    }
}
