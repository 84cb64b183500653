use prefcheck_model::{ExclusionSet, Outcome};

use crate::formula::Formula;
use crate::oracle::OracleQuery;

/// Print a formula in SMV CTL syntax.
///
/// Change flags render as the `ch<var>` / `gch` booleans and the start atom
/// as `start`, matching the translator's model encoding.
pub fn to_smv(formula: &Formula) -> String {
    match formula {
        Formula::True => "TRUE".to_string(),
        Formula::False => "FALSE".to_string(),
        Formula::Is { variable, value } => format!("{variable} = {value}"),
        Formula::Changed(variable) => format!("ch{variable} = 1"),
        Formula::AnyChanged => "gch = 1".to_string(),
        Formula::Start => "start".to_string(),
        Formula::Not(inner) => format!("!({})", to_smv(inner)),
        Formula::And(terms) => join(terms, " & ", "TRUE"),
        Formula::Or(terms) => join(terms, " | ", "FALSE"),
        Formula::Implies(lhs, rhs) => format!("({} -> {})", to_smv(lhs), to_smv(rhs)),
        Formula::Ex(inner) => format!("EX ({})", to_smv(inner)),
        Formula::Ef(inner) => format!("EF ({})", to_smv(inner)),
        Formula::Ag(inner) => format!("AG ({})", to_smv(inner)),
    }
}

fn join(terms: &[Formula], separator: &str, empty: &str) -> String {
    match terms {
        [] => empty.to_string(),
        [single] => to_smv(single),
        _ => {
            let inner: Vec<String> = terms.iter().map(to_smv).collect();
            format!("({})", inner.join(separator))
        }
    }
}

/// Print a named CTL specification line for `query`.
pub fn query_to_smv(query: &OracleQuery) -> String {
    format!(
        "CTLSPEC NAME {} := {};",
        sanitize_name(&query.label),
        to_smv(&query.property)
    )
}

/// Print the invariant that removes `outcome` from the model.
pub fn exclusion_to_smv(outcome: &Outcome) -> String {
    format!("INVAR {};", to_smv(&Formula::outcome(outcome).not()))
}

/// Print every exclusion invariant, one per line.
pub fn exclusions_to_smv(exclusions: &ExclusionSet) -> String {
    let lines: Vec<String> = exclusions.iter().map(exclusion_to_smv).collect();
    lines.join("\n")
}

fn sanitize_name(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::QueryKind;

    #[test]
    fn print_dominance_shape() {
        let worse = Formula::outcome(&Outcome::new().with("a", "0").with("b", "1"));
        let better = Formula::is("a", "1");
        let property = Formula::and(vec![worse, Formula::unchanged()]).implies(better.ef().ex());
        assert_eq!(
            to_smv(&property),
            "(((a = 0 & b = 1) & !(gch = 1)) -> EX (EF (a = 1)))"
        );
    }

    #[test]
    fn print_empty_connectives_as_constants() {
        assert_eq!(to_smv(&Formula::and(Vec::new())), "TRUE");
        assert_eq!(to_smv(&Formula::or(Vec::new())), "FALSE");
        assert_eq!(to_smv(&Formula::changed("x")), "chx = 1");
    }

    #[test]
    fn print_query_and_exclusions() {
        let query = OracleQuery::new(QueryKind::CycleAbsence, "consistency check", Formula::Start);
        assert_eq!(query_to_smv(&query), "CTLSPEC NAME consistency_check := start;");

        let excluded: ExclusionSet = [Outcome::new().with("x", "1")].into_iter().collect();
        assert_eq!(exclusions_to_smv(&excluded), "INVAR !(x = 1);");
    }
}
