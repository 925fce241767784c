use super::error::FilterParseError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Kinds of objects a filter can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// The charm behind an application
    Charm,
    Application,
    Unit,
    Machine,
    /// An IP address of a machine
    Ip,
    /// The hostname of a machine
    Hostname,
}

impl FromStr for ObjectKind {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "charm" | "charms" | "c" => Ok(ObjectKind::Charm),
            "app" | "apps" | "application" | "applications" | "a" => Ok(ObjectKind::Application),
            "unit" | "units" | "u" => Ok(ObjectKind::Unit),
            "machine" | "machines" | "m" => Ok(ObjectKind::Machine),
            "ip" | "ips" | "address" | "addresses" | "i" => Ok(ObjectKind::Ip),
            "hostname" | "hostnames" | "host" | "hosts" | "h" => Ok(ObjectKind::Hostname),
            _ => Err(FilterParseError::UnknownObjectKind(s.to_string())),
        }
    }
}

impl ObjectKind {
    /// Get the canonical name of this object kind
    pub fn canonical_name(&self) -> &'static str {
        match self {
            ObjectKind::Charm => "charm",
            ObjectKind::Application => "application",
            ObjectKind::Unit => "unit",
            ObjectKind::Machine => "machine",
            ObjectKind::Ip => "ip",
            ObjectKind::Hostname => "hostname",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Comparison mode of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Equals,
    NotEquals,
    /// Regex search over the value
    Matches,
    NotMatches,
}

impl FilterMode {
    pub fn token(&self) -> &'static str {
        match self {
            FilterMode::Equals => "=",
            FilterMode::NotEquals => "!=",
            FilterMode::Matches => "~",
            FilterMode::NotMatches => "!~",
        }
    }
}

/// Operator table, longest token first so `!=` is matched before `=` or `!`.
const OPERATORS: &[(&str, FilterMode)] = &[
    ("!=", FilterMode::NotEquals),
    ("!~", FilterMode::NotMatches),
    ("=", FilterMode::Equals),
    ("~", FilterMode::Matches),
];

/// Characters the operator token is built from
const OPERATOR_CHARS: &[char] = &['=', '!', '~'];

/// Characters that cannot appear in an operand; used elsewhere as structural
/// delimiters.
const RESERVED_CHARS: &[char] = &['_', ':', ';', '\\', '\t', '\n', ','];

/// A single parsed filter: target object kind, comparison mode, operand.
#[derive(Debug, Clone)]
pub struct Filter {
    pub kind: ObjectKind,
    pub mode: FilterMode,
    pub pattern: String,
    /// Compiled operand, present for the regex modes
    pub(super) regex: Option<Regex>,
}

impl Filter {
    /// Parse a filter expression like `app=nova-compute` or `hostname~ubun`.
    ///
    /// The operator token is the single maximal run of operator characters in
    /// the string; requiring a maximal run means a two-character operator is
    /// never misread as two one-character operators in sequence.
    pub fn parse(s: &str) -> Result<Self, FilterParseError> {
        let mut runs = operator_runs(s);
        let (start, end) = match (runs.next(), runs.next()) {
            (None, _) => return Err(FilterParseError::MissingOperator(s.to_string())),
            (Some(run), None) => run,
            (Some(_), Some(_)) => return Err(FilterParseError::MultipleOperators(s.to_string())),
        };

        let token = &s[start..end];
        let mode = OPERATORS
            .iter()
            .find(|(op, _)| *op == token)
            .map(|&(_, mode)| mode)
            .ok_or_else(|| FilterParseError::UnknownOperator {
                filter: s.to_string(),
                operator: token.to_string(),
            })?;

        let kind: ObjectKind = s[..start].parse()?;

        let pattern = &s[end..];
        if pattern.is_empty() {
            return Err(FilterParseError::EmptyOperand(s.to_string()));
        }
        if let Some(character) = pattern.chars().find(|c| RESERVED_CHARS.contains(c)) {
            return Err(FilterParseError::ReservedCharacter {
                operand: pattern.to_string(),
                character,
            });
        }

        let regex = match mode {
            FilterMode::Matches | FilterMode::NotMatches => Some(Regex::new(pattern).map_err(
                |source| FilterParseError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                },
            )?),
            FilterMode::Equals | FilterMode::NotEquals => None,
        };

        Ok(Filter {
            kind,
            mode,
            pattern: pattern.to_string(),
            regex,
        })
    }
}

/// Parse a list of filter expressions, failing on the first invalid one.
pub fn parse_filters(exprs: &[String]) -> Result<Vec<Filter>, FilterParseError> {
    exprs.iter().map(|expr| Filter::parse(expr)).collect()
}

/// Byte ranges of maximal runs of operator characters.
fn operator_runs(s: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut chars = s.char_indices().peekable();
    std::iter::from_fn(move || {
        let (start, _) = chars
            .by_ref()
            .find(|(_, c)| OPERATOR_CHARS.contains(c))?;
        let mut end = start + 1;
        while let Some(&(i, c)) = chars.peek() {
            if !OPERATOR_CHARS.contains(&c) {
                break;
            }
            chars.next();
            end = i + c.len_utf8();
        }
        Some((start, end))
    })
}
