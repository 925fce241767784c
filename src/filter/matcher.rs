use super::parser::{Filter, FilterMode};

impl Filter {
    /// Check if a single value satisfies this filter.
    pub fn matches(&self, value: &str) -> bool {
        match self.mode {
            FilterMode::Equals => value == self.pattern,
            FilterMode::NotEquals => value != self.pattern,
            FilterMode::Matches => self.search(value),
            FilterMode::NotMatches => !self.search(value),
        }
    }

    /// Check a value that may be missing.
    ///
    /// A missing value is an ordinary lookup miss: the filter does not hold,
    /// whatever its mode. It is not an error.
    pub fn holds(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| self.matches(v))
    }

    /// Check a set of values: the filter holds if any one of them matches.
    pub fn matches_any<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> bool {
        values.into_iter().any(|v| self.matches(v))
    }

    fn search(&self, value: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(s: &str) -> Filter {
        Filter::parse(s).unwrap()
    }

    #[test]
    fn test_equals_is_exact() {
        assert!(filter("app=ubuntu").matches("ubuntu"));
        assert!(!filter("app=ubuntu").matches("ubuntu-lite"));
        assert!(!filter("app=ubuntu").matches("Ubuntu"));
    }

    #[test]
    fn test_not_equals() {
        assert!(filter("app!=ubuntu").matches("ntp"));
        assert!(!filter("app!=ubuntu").matches("ubuntu"));
    }

    #[test]
    fn test_matches_is_a_regex_search() {
        assert!(filter("hostname~ubun").matches("juju-ubuntu-0"));
        assert!(filter("hostname~^juju").matches("juju-ubuntu-0"));
        assert!(!filter("hostname~^ubuntu").matches("juju-ubuntu-0"));
        assert!(filter("ip~10.0.0").matches("10.0.0.5"));
    }

    #[test]
    fn test_not_matches() {
        assert!(filter("hostname!~prod").matches("staging-3"));
        assert!(!filter("hostname!~prod").matches("prod-3"));
    }

    #[test]
    fn test_missing_value_never_holds() {
        assert!(!filter("hostname=host").holds(None));
        assert!(!filter("hostname!=host").holds(None));
        assert!(!filter("hostname!~host").holds(None));
        assert!(filter("hostname=host").holds(Some("host")));
    }

    #[test]
    fn test_matches_any_is_or_across_the_set() {
        let f = filter("ip~10.0.0");
        assert!(f.matches_any(["192.168.1.4", "10.0.0.5"].into_iter()));
        assert!(!f.matches_any(["192.168.1.4", "172.16.0.9"].into_iter()));
        assert!(!f.matches_any(std::iter::empty()));
    }
}
