//! Typed filter conditions.
//!
//! A [`Condition`] is one `(header, operator, criterion)` triple. A data row
//! passes [`Table::advanced_filter`](super::Table::advanced_filter) when every
//! condition holds for the cell under its header.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tabula_engine::engine::{GridError, Value};

use crate::error::Result;

/// Comparison applied between a cell value and a criterion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Regex search over the cell's display text.
    Matches,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Matches => "=~",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
        }
    }
}

impl FromStr for Operator {
    type Err = GridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let op = match s.trim() {
            "==" | "=" | "eq" => Operator::Eq,
            "!=" | "<>" | "ne" => Operator::Ne,
            "<" | "lt" => Operator::Lt,
            "<=" | "le" => Operator::Le,
            ">" | "gt" => Operator::Gt,
            ">=" | "ge" => Operator::Ge,
            "=~" | "~" | "matches" => Operator::Matches,
            "contains" | "include?" => Operator::Contains,
            "starts_with" | "start_with?" => Operator::StartsWith,
            "ends_with" | "end_with?" => Operator::EndsWith,
            other => {
                return Err(GridError::InvalidArguments(format!(
                    "unknown operator: {}",
                    other
                )));
            }
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One `(header, operator, criterion)` test.
#[derive(Clone, Debug)]
pub struct Condition {
    pub header: String,
    pub operator: Operator,
    pub criterion: Value,
    pattern: Option<Regex>,
}

impl Condition {
    /// Build a condition. For [`Operator::Matches`] the criterion's text is
    /// compiled as a regex; an invalid pattern is rejected here rather than
    /// when rows are tested.
    pub fn new(
        header: impl Into<String>,
        operator: Operator,
        criterion: impl Into<Value>,
    ) -> Result<Condition> {
        let criterion = criterion.into();
        let pattern = match operator {
            Operator::Matches => Some(Regex::new(&criterion.to_string()).map_err(|e| {
                GridError::InvalidArguments(format!("invalid pattern {}: {}", criterion, e))
            })?),
            _ => None,
        };
        Ok(Condition {
            header: header.into(),
            operator,
            criterion,
            pattern,
        })
    }

    /// Shorthand for a regex condition.
    pub fn matching(header: impl Into<String>, pattern: &str) -> Result<Condition> {
        Condition::new(header, Operator::Matches, pattern)
    }

    /// Test a cell value. Ordering comparisons between values of different
    /// kinds are false.
    pub fn test(&self, value: &Value) -> bool {
        let ord = value.compare(&self.criterion);
        match self.operator {
            Operator::Eq => ord == Some(Ordering::Equal),
            Operator::Ne => ord != Some(Ordering::Equal),
            Operator::Lt => ord == Some(Ordering::Less),
            Operator::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            Operator::Gt => ord == Some(Ordering::Greater),
            Operator::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
            Operator::Matches => self
                .pattern
                .as_ref()
                .is_some_and(|re| !value.is_blank() && re.is_match(&value.to_string())),
            Operator::Contains => value.to_string().contains(&self.criterion.to_string()),
            Operator::StartsWith => value.to_string().starts_with(&self.criterion.to_string()),
            Operator::EndsWith => value.to_string().ends_with(&self.criterion.to_string()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.header, self.operator, self.criterion)
    }
}

/// Turn a flat `header, operator, criterion, ...` list into conditions.
///
/// The list length must be a multiple of three and every operator must be
/// known. Criteria are read with [`Value::from_input`], except regex
/// criteria which are kept as raw text.
pub fn parse_triples(args: &[&str]) -> Result<Vec<Condition>> {
    if args.len() % 3 != 0 {
        return Err(GridError::InvalidArguments(format!(
            "number of arguments must be a multiple of 3, got {}",
            args.len()
        ))
        .into());
    }
    args.chunks_exact(3)
        .map(|triple| {
            let operator: Operator = triple[1].parse()?;
            let criterion = match operator {
                Operator::Matches
                | Operator::Contains
                | Operator::StartsWith
                | Operator::EndsWith => Value::from(triple[2]),
                _ => Value::from_input(triple[2]),
            };
            Condition::new(triple[0], operator, criterion)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabulaError;

    #[test]
    fn test_operator_parse() {
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("include?".parse::<Operator>().unwrap(), Operator::Contains);
        assert_eq!(">=".parse::<Operator>().unwrap().to_string(), ">=");
        assert!("<=>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_numeric_comparisons() {
        let gt = Condition::new("Qty", Operator::Gt, 1).unwrap();
        assert!(gt.test(&Value::from(3)));
        assert!(!gt.test(&Value::from(1)));
        assert!(!gt.test(&Value::from("many")));
        assert!(!gt.test(&Value::Empty));
    }

    #[test]
    fn test_text_operators() {
        let re = Condition::matching("Part", "Type[13]").unwrap();
        assert!(re.test(&Value::from("Type3")));
        assert!(!re.test(&Value::from("Type2")));

        let contains = Condition::new("Ref1", Operator::Contains, "X").unwrap();
        assert!(contains.test(&Value::from("XT1")));
        assert!(!contains.test(&Value::from("QT1")));

        let ends = Condition::new("Ref2", Operator::EndsWith, "3").unwrap();
        assert!(ends.test(&Value::from("123")));
    }

    #[test]
    fn test_bad_pattern_is_rejected_up_front() {
        let err = Condition::matching("Part", "Type[").unwrap_err();
        assert!(matches!(
            err,
            TabulaError::Grid(GridError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_parse_triples() {
        let conds = parse_triples(&["Part", "=~", "Type[13]", "Qty", ">", "1"]).unwrap();
        assert_eq!(conds.len(), 2);
        assert_eq!(conds[1].criterion, Value::Number(1.0));
        assert_eq!(conds[0].to_string(), "Part =~ Type[13]");

        assert!(parse_triples(&["Part", "=="]).is_err());
        assert!(parse_triples(&["Part", "??", "x"]).is_err());
    }
}
