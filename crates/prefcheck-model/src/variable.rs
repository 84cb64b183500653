use indexmap::{IndexMap, IndexSet};

use crate::errors::ValidationError;
use crate::outcome::Outcome;

/// A preference variable: a unique name over a finite, non-empty domain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "VariableRepr"))]
pub struct Variable {
    name: String,
    domain: IndexSet<String>,
}

#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
struct VariableRepr {
    name: String,
    domain: Vec<String>,
}

#[cfg(feature = "serialize")]
impl TryFrom<VariableRepr> for Variable {
    type Error = ValidationError;

    fn try_from(repr: VariableRepr) -> Result<Self, Self::Error> {
        Variable::new(repr.name, repr.domain)
    }
}

impl Variable {
    /// Repeated domain values collapse; the first occurrence fixes the order.
    pub fn new<I, S>(name: impl Into<String>, domain: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyVariableName);
        }
        let domain: IndexSet<String> = domain.into_iter().map(Into::into).collect();
        if domain.is_empty() {
            return Err(ValidationError::EmptyDomain { variable: name });
        }
        Ok(Self { name, domain })
    }

    /// A variable over the `{0, 1}` domain.
    pub fn binary(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, ["0", "1"])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    pub fn domain_size(&self) -> usize {
        self.domain.len()
    }

    pub fn admits(&self, value: &str) -> bool {
        self.domain.contains(value)
    }

    fn domain_display(&self) -> String {
        let values: Vec<&str> = self.domain().collect();
        format!("{{{}}}", values.join(", "))
    }
}

/// The variable catalog of one preference specification.
///
/// Only the variables matter to the reasoning core; the preference
/// statements themselves are compiled into the oracle's transition system by
/// an external translator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "SpecificationRepr"))]
pub struct PreferenceSpecification {
    name: String,
    variables: IndexMap<String, Variable>,
}

#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
struct SpecificationRepr {
    name: String,
    variables: IndexMap<String, Variable>,
}

#[cfg(feature = "serialize")]
impl TryFrom<SpecificationRepr> for PreferenceSpecification {
    type Error = ValidationError;

    fn try_from(repr: SpecificationRepr) -> Result<Self, Self::Error> {
        PreferenceSpecification::new(repr.name, repr.variables.into_values())
    }
}

impl PreferenceSpecification {
    pub fn new(
        name: impl Into<String>,
        variables: impl IntoIterator<Item = Variable>,
    ) -> Result<Self, ValidationError> {
        let mut map = IndexMap::new();
        for var in variables {
            if map.contains_key(var.name()) {
                return Err(ValidationError::DuplicateVariable {
                    variable: var.name().to_string(),
                });
            }
            map.insert(var.name().to_string(), var);
        }
        Ok(Self {
            name: name.into(),
            variables: map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Variable names in declaration order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of distinct outcomes, saturating at `u128::MAX`.
    pub fn outcome_space_size(&self) -> u128 {
        self.variables
            .values()
            .fold(1u128, |acc, v| acc.saturating_mul(v.domain_size() as u128))
    }

    /// Checks that `outcome` is complete and that every value lies in its
    /// variable's domain.
    pub fn validate(&self, outcome: &Outcome) -> Result<(), ValidationError> {
        for (var, _) in outcome.assignments() {
            if !self.variables.contains_key(var) {
                return Err(ValidationError::UnknownVariable {
                    variable: var.to_string(),
                });
            }
        }
        for var in self.variables.values() {
            let value = outcome
                .get(var.name())
                .ok_or_else(|| ValidationError::MissingAssignment {
                    variable: var.name().to_string(),
                })?;
            if !var.admits(value) {
                return Err(ValidationError::ValueOutsideDomain {
                    variable: var.name().to_string(),
                    value: value.to_string(),
                    domain: var.domain_display(),
                });
            }
        }
        Ok(())
    }

    /// Builds and validates an outcome from `(variable, value)` pairs.
    pub fn outcome<K, V>(
        &self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Outcome, ValidationError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let outcome: Outcome = pairs.into_iter().collect();
        self.validate(&outcome)?;
        Ok(outcome)
    }

    /// Enumerates every outcome in lexicographic order of declaration order
    /// and domain order. Only sensible for small specifications.
    pub fn enumerate_outcomes(&self) -> Vec<Outcome> {
        let mut out = vec![Outcome::new()];
        for var in self.variables.values() {
            let mut next = Vec::with_capacity(out.len() * var.domain_size());
            for partial in &out {
                for value in var.domain() {
                    next.push(partial.clone().with(var.name(), value));
                }
            }
            out = next;
        }
        out
    }
}
