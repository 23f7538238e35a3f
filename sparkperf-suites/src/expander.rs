//! Cross-product expansion of option axes
//!
//! Turns an ordered axis list and a scale factor into every fully-resolved
//! argument list:
//!
//! 1. axes sharing a name collapse to the last one, kept at the position of
//!    the first (shared defaults first, per-test overrides after),
//! 2. scalable axes are multiplied by the scale factor,
//! 3. the Cartesian product is enumerated in odometer order, last axis fastest,
//! 4. each combination is rendered axis by axis into one flat token list.
//!
//! Expansion is pure and deterministic and either succeeds completely or
//! returns the first configuration error.

use indexmap::IndexMap;
use serde::Serialize;
use sparkperf_common::{PerfError, Result, ScalarValue};
use tracing::debug;

use crate::option::OptionAxis;

/// Resolved argument tokens for one combination
pub type ArgumentList = Vec<String>;

/// All combinations of one expansion, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpansionResult {
    rows: Vec<ArgumentList>,
}

impl ExpansionResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ArgumentList] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgumentList> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<ArgumentList> {
        self.rows
    }
}

impl From<Vec<ArgumentList>> for ExpansionResult {
    fn from(rows: Vec<ArgumentList>) -> Self {
        Self { rows }
    }
}

impl IntoIterator for ExpansionResult {
    type Item = ArgumentList;
    type IntoIter = std::vec::IntoIter<ArgumentList>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExpansionResult {
    type Item = &'a ArgumentList;
    type IntoIter = std::slice::Iter<'a, ArgumentList>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

pub fn validate_scale_factor(factor: f64) -> Result<f64> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(PerfError::NonPositiveScaleFactor(factor))
    }
}

/// Collapse axes sharing a name: the later axis replaces the earlier one in
/// place, values and scalability included.
///
/// Replacement only applies between axes of the same render kind. Reusing a
/// name with a different kind (a `flag-value` overridden by a `boolean-flag`,
/// say) fails with [`PerfError::ConflictingAxis`] instead of silently
/// changing how the argument is rendered.
pub fn dedupe(axes: &[OptionAxis]) -> Result<Vec<OptionAxis>> {
    let mut by_name: IndexMap<&str, &OptionAxis> = IndexMap::with_capacity(axes.len());

    for axis in axes {
        if let Some(previous) = by_name.get(axis.name()) {
            if previous.kind() != axis.kind() {
                return Err(PerfError::ConflictingAxis {
                    axis: axis.name().to_string(),
                    first: previous.kind().to_string(),
                    second: axis.kind().to_string(),
                });
            }
        }
        // IndexMap::insert keeps the original slot for an existing key
        by_name.insert(axis.name(), axis);
    }

    Ok(by_name.into_values().cloned().collect())
}

/// Axes that have been deduplicated and scaled, ready to enumerate.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAxes {
    axes: Vec<OptionAxis>,
}

impl PreparedAxes {
    pub fn new(axes: &[OptionAxis], scale_factor: f64) -> Result<Self> {
        let factor = validate_scale_factor(scale_factor)?;
        let axes = dedupe(axes)?
            .iter()
            .map(|axis| axis.scaled(factor))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { axes })
    }

    pub fn axes(&self) -> &[OptionAxis] {
        &self.axes
    }

    /// Number of combinations, saturating on overflow
    pub fn combination_count(&self) -> usize {
        self.axes
            .iter()
            .fold(1usize, |acc, axis| acc.saturating_mul(axis.values().len()))
    }

    /// Lazily enumerate value combinations, one value per axis.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations::new(&self.axes)
    }

    /// Lazily render each combination into its argument list.
    pub fn rows(&self) -> impl Iterator<Item = Result<ArgumentList>> + '_ {
        self.combinations().map(move |combination| self.render(&combination))
    }

    pub fn render(&self, combination: &[&ScalarValue]) -> Result<ArgumentList> {
        let mut tokens = Vec::with_capacity(combination.len() * 2);
        for (axis, value) in self.axes.iter().zip(combination) {
            tokens.extend(axis.render(value)?);
        }
        Ok(tokens)
    }

    pub fn expand(&self) -> Result<ExpansionResult> {
        let rows = self.rows().collect::<Result<Vec<_>>>()?;
        Ok(ExpansionResult { rows })
    }
}

/// Odometer over the value lists of a set of axes.
///
/// An empty axis list has exactly one (empty) combination.
pub struct Combinations<'a> {
    axes: &'a [OptionAxis],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(axes: &'a [OptionAxis]) -> Self {
        Self {
            axes,
            indices: vec![0; axes.len()],
            done: axes.iter().any(|axis| axis.values().is_empty()),
        }
    }

    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.axes[position].values().len() {
                return;
            }
            self.indices[position] = 0;
        }
        self.done = true;
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<&'a ScalarValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let axes = self.axes;
        let combination = axes
            .iter()
            .zip(&self.indices)
            .map(|(axis, &index)| &axis.values()[index])
            .collect();

        self.advance();
        Some(combination)
    }
}

/// Expand `axes` at `scale_factor` into every resolved argument list.
pub fn expand(axes: &[OptionAxis], scale_factor: f64) -> Result<ExpansionResult> {
    let prepared = PreparedAxes::new(axes, scale_factor)?;
    let result = prepared.expand()?;
    debug!(
        "Expanded {} axes ({} after dedupe) into {} combinations at scale {}",
        axes.len(),
        prepared.axes().len(),
        result.len(),
        scale_factor
    );
    Ok(result)
}
