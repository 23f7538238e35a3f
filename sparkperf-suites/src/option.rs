//! Option axes: one independently varying setting of a benchmark run
//!
//! An axis owns its candidate values and knows how to render any one of them
//! into launch-argument tokens. Axes are validated when they are built, so a
//! malformed declaration fails at catalog load time and never at render time.

use serde::Serialize;
use sparkperf_common::{AxisSpec, PerfError, RenderKind, Result, ScalarValue};

/// One named configuration dimension of a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionAxis {
    name: String,
    kind: RenderKind,
    values: Vec<ScalarValue>,
    scalable: bool,
}

impl OptionAxis {
    /// Build and validate an axis of any kind.
    pub fn new(
        kind: RenderKind,
        name: impl Into<String>,
        values: Vec<ScalarValue>,
        scalable: bool,
    ) -> Result<Self> {
        let name = name.into();

        if values.is_empty() {
            return Err(PerfError::EmptyValues { axis: name });
        }

        if name.trim().is_empty() {
            return Err(PerfError::Config(format!(
                "axis of kind {} has an empty name",
                kind
            )));
        }

        match kind {
            RenderKind::BooleanFlag => {
                if values.len() > 1 {
                    return Err(PerfError::MultipleFlagValues {
                        axis: name,
                        count: values.len(),
                    });
                }
                if let Some(bad) = values.iter().find(|v| v.as_bool().is_none()) {
                    return Err(PerfError::TypeMismatch {
                        axis: name,
                        expected: "boolean".to_string(),
                        found: bad.type_name().to_string(),
                    });
                }
            }
            RenderKind::Constant if values.len() > 1 => {
                return Err(PerfError::Config(format!(
                    "constant '{}' must have exactly one value, got {}",
                    name,
                    values.len()
                )));
            }
            _ => {}
        }

        if scalable {
            if matches!(kind, RenderKind::BooleanFlag | RenderKind::Constant) {
                return Err(PerfError::UnscalableKind {
                    axis: name,
                    kind: kind.to_string(),
                });
            }
            if let Some(bad) = values.iter().find(|v| !v.is_numeric()) {
                return Err(PerfError::TypeMismatch {
                    axis: name,
                    expected: "numeric".to_string(),
                    found: bad.type_name().to_string(),
                });
            }
        }

        Ok(Self {
            name,
            kind,
            values,
            scalable,
        })
    }

    /// `--name value`, one combination per value
    pub fn flag_value(name: impl Into<String>, values: Vec<ScalarValue>) -> Result<Self> {
        Self::new(RenderKind::FlagValue, name, values, false)
    }

    /// `--name value` whose numeric values follow the scale factor
    pub fn scalable(name: impl Into<String>, values: Vec<ScalarValue>) -> Result<Self> {
        Self::new(RenderKind::FlagValue, name, values, true)
    }

    /// `--name` when `enabled`, nothing otherwise
    pub fn boolean_flag(name: impl Into<String>, enabled: bool) -> Result<Self> {
        Self::new(RenderKind::BooleanFlag, name, vec![ScalarValue::Bool(enabled)], false)
    }

    /// Bare positional token selecting the benchmark program variant
    pub fn constant(literal: impl Into<String>) -> Result<Self> {
        let literal = literal.into();
        let value = ScalarValue::Str(literal.clone());
        Self::new(RenderKind::Constant, literal, vec![value], false)
    }

    /// `-Dname=value` JVM system property
    pub fn system_property(name: impl Into<String>, values: Vec<ScalarValue>) -> Result<Self> {
        Self::new(RenderKind::SystemProperty, name, values, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RenderKind {
        self.kind
    }

    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    pub fn is_scalable(&self) -> bool {
        self.scalable
    }

    /// Tokens for one selected value. Boolean flags set to false and nothing
    /// else render to zero tokens.
    pub fn render(&self, value: &ScalarValue) -> Result<Vec<String>> {
        let tokens = match self.kind {
            RenderKind::FlagValue => vec![format!("--{}", self.name), value.to_string()],
            RenderKind::SystemProperty => vec![format!("-D{}={}", self.name, value)],
            RenderKind::Constant => vec![self.name.clone()],
            RenderKind::BooleanFlag => match value.as_bool() {
                Some(true) => vec![format!("--{}", self.name)],
                Some(false) => Vec::new(),
                None => {
                    return Err(PerfError::TypeMismatch {
                        axis: self.name.clone(),
                        expected: "boolean".to_string(),
                        found: value.type_name().to_string(),
                    })
                }
            },
        };
        Ok(tokens)
    }

    /// Copy of this axis with numeric values multiplied by `factor`.
    ///
    /// Non-scalable axes come back unchanged. Apply once per expansion; the
    /// transform only composes trivially when `factor` is 1.
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        if !self.scalable {
            return Ok(self.clone());
        }

        let values = self
            .values
            .iter()
            .map(|v| {
                v.scale(factor).ok_or_else(|| PerfError::TypeMismatch {
                    axis: self.name.clone(),
                    expected: "numeric".to_string(),
                    found: v.type_name().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            values,
            ..self.clone()
        })
    }
}

impl TryFrom<&AxisSpec> for OptionAxis {
    type Error = PerfError;

    fn try_from(spec: &AxisSpec) -> Result<Self> {
        // A constant's literal is its name; the values list may be omitted
        if spec.kind == RenderKind::Constant && spec.values.is_empty() {
            return OptionAxis::new(
                RenderKind::Constant,
                spec.name.clone(),
                vec![ScalarValue::Str(spec.name.clone())],
                spec.scalable,
            );
        }
        OptionAxis::new(spec.kind, spec.name.clone(), spec.values.clone(), spec.scalable)
    }
}
