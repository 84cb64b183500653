use prefcheck_model::Outcome;

/// Branching-time property over the oracle's transition system.
///
/// States of that system are outcomes decorated with the set of variables
/// changed by the step that entered them and the outcome the run started
/// from. Atoms read those three components; the temporal operators quantify
/// over improving-flip successors (plus the stutter step).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    /// `variable = value` in the current outcome.
    Is { variable: String, value: String },
    /// The step into the current state changed `variable`.
    Changed(String),
    /// The step into the current state changed some variable.
    AnyChanged,
    /// The current outcome equals the outcome the run started from.
    Start,

    // Boolean logic
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),

    // Temporal
    /// Some successor satisfies the operand.
    Ex(Box<Formula>),
    /// Some reachable state (including the current one) satisfies the operand.
    Ef(Box<Formula>),
    /// Every reachable state (including the current one) satisfies the operand.
    Ag(Box<Formula>),
}

#[allow(clippy::should_implement_trait)]
impl Formula {
    pub fn is(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Formula::Is {
            variable: variable.into(),
            value: value.into(),
        }
    }

    pub fn changed(variable: impl Into<String>) -> Self {
        Formula::Changed(variable.into())
    }

    /// No variable has changed on the step into the current state.
    pub fn unchanged() -> Self {
        Formula::AnyChanged.not()
    }

    /// Conjunction of every assignment of `outcome`.
    pub fn outcome(outcome: &Outcome) -> Self {
        Formula::And(
            outcome
                .assignments()
                .map(|(var, val)| Formula::is(var, val))
                .collect(),
        )
    }

    /// Disjunction of [`Formula::outcome`] over `outcomes`; `False` when empty.
    pub fn any_of<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        let disjuncts: Vec<Formula> = outcomes.into_iter().map(Formula::outcome).collect();
        if disjuncts.is_empty() {
            Formula::False
        } else {
            Formula::Or(disjuncts)
        }
    }

    pub fn and(terms: Vec<Formula>) -> Self {
        Formula::And(terms)
    }

    pub fn or(terms: Vec<Formula>) -> Self {
        Formula::Or(terms)
    }

    pub fn not(self) -> Self {
        Formula::Not(Box::new(self))
    }

    pub fn implies(self, other: Formula) -> Self {
        Formula::Implies(Box::new(self), Box::new(other))
    }

    pub fn ex(self) -> Self {
        Formula::Ex(Box::new(self))
    }

    pub fn ef(self) -> Self {
        Formula::Ef(Box::new(self))
    }

    pub fn ag(self) -> Self {
        Formula::Ag(Box::new(self))
    }

    /// True when the formula contains a temporal operator anywhere.
    pub fn is_temporal(&self) -> bool {
        match self {
            Formula::True
            | Formula::False
            | Formula::Is { .. }
            | Formula::Changed(_)
            | Formula::AnyChanged
            | Formula::Start => false,
            Formula::Not(inner) => inner.is_temporal(),
            Formula::And(terms) | Formula::Or(terms) => terms.iter().any(Formula::is_temporal),
            Formula::Implies(lhs, rhs) => lhs.is_temporal() || rhs.is_temporal(),
            Formula::Ex(_) | Formula::Ef(_) | Formula::Ag(_) => true,
        }
    }

    /// Variables mentioned by `Is` and `Changed` atoms, in first-mention order.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Formula::Is { variable, .. } | Formula::Changed(variable) => {
                if !out.contains(&variable.as_str()) {
                    out.push(variable);
                }
            }
            Formula::True | Formula::False | Formula::AnyChanged | Formula::Start => {}
            Formula::Not(inner) | Formula::Ex(inner) | Formula::Ef(inner) | Formula::Ag(inner) => {
                inner.collect_variables(out)
            }
            Formula::And(terms) | Formula::Or(terms) => {
                for term in terms {
                    term.collect_variables(out);
                }
            }
            Formula::Implies(lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }
}
