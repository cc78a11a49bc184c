use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifier of a contribution.
///
/// Spreadsheets hand out integer cells while the comment export references
/// its parent as a string. An integer is kept as `Numeric` and a string is
/// `Numeric` only when it is exactly the decimal form of an integer, so two
/// ids are equal precisely when their string forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContributionId {
    Numeric(i64),
    Text(String),
}

impl ContributionId {
    /// `"7"` is `Numeric(7)`; `"007"`, `"7.0"` and `" 7 "` stay text.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(value) if value.to_string() == raw => ContributionId::Numeric(value),
            _ => ContributionId::Text(raw.to_string()),
        }
    }

    /// Numeric spreadsheet cells arrive as floats; integral ones are integers.
    pub fn from_float(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            ContributionId::Numeric(value as i64)
        } else {
            ContributionId::Text(value.to_string())
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(int) => ContributionId::Numeric(int),
                None => ContributionId::Text(number.to_string()),
            },
            Value::String(text) => Self::parse(text),
            Value::Null => ContributionId::Text(String::new()),
            other => ContributionId::Text(other.to_string()),
        }
    }
}

impl fmt::Display for ContributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContributionId::Numeric(value) => write!(f, "{}", value),
            ContributionId::Text(value) => write!(f, "{}", value),
        }
    }
}

impl FromStr for ContributionId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for ContributionId {
    fn from(value: i64) -> Self {
        ContributionId::Numeric(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub id: ContributionId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub contribution_id: ContributionId,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_match_their_decimal_string() {
        let expected = ContributionId::Numeric(17);
        assert_eq!(ContributionId::parse("17"), expected);
        assert_eq!(ContributionId::parse("-17"), ContributionId::Numeric(-17));
        assert_eq!(ContributionId::from_float(17.0), expected);
        assert_eq!(ContributionId::from_json(&json!(17)), expected);
        assert_eq!(ContributionId::from_json(&json!("17")), expected);
    }

    #[test]
    fn other_spellings_of_a_number_stay_text() {
        for raw in ["007", "7.0", " 7 ", "+7", "-0"] {
            assert_eq!(ContributionId::parse(raw), ContributionId::Text(raw.into()));
            assert_ne!(ContributionId::parse(raw), ContributionId::Numeric(7));
        }
        assert_eq!(
            ContributionId::from_json(&json!(7.0)),
            ContributionId::Text("7.0".into())
        );
        assert_eq!(
            ContributionId::from_json(&json!(7.0)),
            ContributionId::parse("7.0")
        );
    }

    #[test]
    fn non_numeric_ids_stay_text() {
        assert_eq!(
            ContributionId::parse("abc-4"),
            ContributionId::Text("abc-4".into())
        );
        assert_eq!(
            ContributionId::from_json(&Value::Null),
            ContributionId::Text(String::new())
        );
        assert_eq!(ContributionId::from_float(1.5).to_string(), "1.5");
        assert_eq!(ContributionId::from_float(1.5), ContributionId::parse("1.5"));
    }

    #[test]
    fn numeric_ids_sort_before_text_and_numerically() {
        let mut ids = vec![
            ContributionId::parse("b"),
            ContributionId::parse("10"),
            ContributionId::parse("9"),
        ];
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["9", "10", "b"]);
    }
}
