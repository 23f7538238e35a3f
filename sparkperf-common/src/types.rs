use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PerfError;

/// Values within this distance of a whole number are treated as that number
/// before integer truncation, so `200 * 0.05` lands on 10 and not 9.
const SCALE_SNAP_EPSILON: f64 = 1e-9;

/// A single candidate setting of an option axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "boolean",
            ScalarValue::Int(_) => "integer",
            ScalarValue::Float(_) => "float",
            ScalarValue::Str(_) => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarValue::Int(_) | ScalarValue::Float(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Multiply a numeric value by `factor`, keeping its subtype.
    ///
    /// Integers are truncated and never drop below 1, since they count
    /// records, partitions or tasks. Non-numeric values yield `None`.
    pub fn scale(&self, factor: f64) -> Option<ScalarValue> {
        match self {
            ScalarValue::Int(v) => {
                let product = *v as f64 * factor;
                let whole = if (product - product.round()).abs() < SCALE_SNAP_EPSILON {
                    product.round()
                } else {
                    product.trunc()
                };
                Some(ScalarValue::Int((whole as i64).max(1)))
            }
            ScalarValue::Float(v) => Some(ScalarValue::Float(v * factor)),
            ScalarValue::Bool(_) | ScalarValue::Str(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Int(v) => write!(f, "{}", v),
            // Floats always carry a fractional part so `1.0` stays distinguishable from `1`
            ScalarValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int(v as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}

/// Build a `Vec<ScalarValue>` from heterogeneous literals.
#[macro_export]
macro_rules! values {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::types::ScalarValue::from($v)),*]
    };
}

/// How an axis turns one selected value into launch-argument tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderKind {
    /// `--name value`
    FlagValue,
    /// `--name` when true, nothing when false
    BooleanFlag,
    /// A bare positional token naming the benchmark program variant
    Constant,
    /// `-Dname=value`
    SystemProperty,
}

impl Default for RenderKind {
    fn default() -> Self {
        RenderKind::FlagValue
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderKind::FlagValue => "flag-value",
            RenderKind::BooleanFlag => "boolean-flag",
            RenderKind::Constant => "constant",
            RenderKind::SystemProperty => "system-property",
        };
        f.write_str(name)
    }
}

/// Major/minor version of the benchmarked platform, used to gate axes and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "VersionRepr", into = "String")]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
}

impl PlatformVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for PlatformVersion {
    fn default() -> Self {
        Self::new(2, 0)
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PlatformVersion {
    type Err = PerfError;

    /// Accepts `2`, `1.5`, `1.5.0` and `1.5.0-SNAPSHOT`; anything past the
    /// minor component is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PerfError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        let core = trimmed.split('-').next().unwrap_or(trimmed);
        let mut parts = core.split('.');

        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(invalid)?
            .parse::<u32>()
            .map_err(|_| invalid())?;
        let minor = match parts.next() {
            Some(p) => p.parse::<u32>().map_err(|_| invalid())?,
            None => 0,
        };

        Ok(Self::new(major, minor))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VersionRepr {
    Text(String),
    Number(f64),
}

impl TryFrom<VersionRepr> for PlatformVersion {
    type Error = PerfError;

    fn try_from(repr: VersionRepr) -> Result<Self, Self::Error> {
        match repr {
            VersionRepr::Text(s) => s.parse(),
            VersionRepr::Number(n) => format!("{}", ScalarValue::Float(n)).parse(),
        }
    }
}

impl From<PlatformVersion> for String {
    fn from(v: PlatformVersion) -> Self {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(ScalarValue::from(400).to_string(), "400");
        assert_eq!(ScalarValue::from(0.66).to_string(), "0.66");
        assert_eq!(ScalarValue::from(1.0).to_string(), "1.0");
        assert_eq!(ScalarValue::from(0.0).to_string(), "0.0");
        assert_eq!(ScalarValue::from(0.001).to_string(), "0.001");
        assert_eq!(ScalarValue::from(true).to_string(), "true");
        assert_eq!(ScalarValue::from("l-bfgs").to_string(), "l-bfgs");
    }

    #[test]
    fn test_integer_scaling() {
        assert_eq!(ScalarValue::from(200).scale(0.05), Some(ScalarValue::Int(10)));
        assert_eq!(ScalarValue::from(400).scale(0.05), Some(ScalarValue::Int(20)));
        assert_eq!(ScalarValue::from(128).scale(1.0), Some(ScalarValue::Int(128)));
        assert_eq!(ScalarValue::from(7).scale(0.5), Some(ScalarValue::Int(3)));
        // Never scales a count below one
        assert_eq!(ScalarValue::from(1).scale(0.001), Some(ScalarValue::Int(1)));
    }

    #[test]
    fn test_float_and_text_scaling() {
        assert_eq!(ScalarValue::from(2.0).scale(0.5), Some(ScalarValue::Float(1.0)));
        assert_eq!(ScalarValue::from("memory").scale(2.0), None);
        assert_eq!(ScalarValue::from(false).scale(2.0), None);
    }

    #[test]
    fn test_values_macro() {
        let v = values![1, "sgd", 0.5, true];
        assert_eq!(v.len(), 4);
        assert_eq!(v[1], ScalarValue::Str("sgd".to_string()));
        assert_eq!(v[3].type_name(), "boolean");
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("2.0".parse::<PlatformVersion>().unwrap(), PlatformVersion::new(2, 0));
        assert_eq!("1.5.0-SNAPSHOT".parse::<PlatformVersion>().unwrap(), PlatformVersion::new(1, 5));
        assert_eq!("2".parse::<PlatformVersion>().unwrap(), PlatformVersion::new(2, 0));
        assert!("".parse::<PlatformVersion>().is_err());
        assert!("one.two".parse::<PlatformVersion>().is_err());
        assert!(PlatformVersion::new(1, 10) > PlatformVersion::new(1, 5));
    }

    #[test]
    fn test_version_serde() {
        #[derive(Deserialize)]
        struct Holder {
            version: PlatformVersion,
        }
        let h: Holder = toml::from_str("version = \"1.4\"").unwrap();
        assert_eq!(h.version, PlatformVersion::new(1, 4));
        let h: Holder = toml::from_str("version = 1.3").unwrap();
        assert_eq!(h.version, PlatformVersion::new(1, 3));
    }

    proptest! {
        #[test]
        fn test_unit_factor_is_identity(v in 1i64..1_000_000_000) {
            prop_assert_eq!(ScalarValue::Int(v).scale(1.0), Some(ScalarValue::Int(v)));
        }

        #[test]
        fn test_scaled_integers_stay_positive(v in 1i64..1_000_000_000, factor in 0.0001f64..10.0) {
            match ScalarValue::Int(v).scale(factor) {
                Some(ScalarValue::Int(scaled)) => prop_assert!(scaled >= 1),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
