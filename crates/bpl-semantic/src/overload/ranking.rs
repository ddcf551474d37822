//! Ranking of viable overloads.

use bpl_core::{SemanticError, SemanticResult, Span};

use super::OverloadMatch;
use crate::lookup::Candidate;

/// Pick the single best match from `viable`.
///
/// Matches are compared by [`OverloadMatch::tier`]. Among the best tier a
/// non-generic function beats a generic one; anything still tied is
/// ambiguous.
pub fn find_best_match(
    viable: &[OverloadMatch],
    candidates: &[Candidate],
    name: &str,
    span: Span,
) -> SemanticResult<OverloadMatch> {
    let Some(best_tier) = viable.iter().map(OverloadMatch::tier).min() else {
        return Err(SemanticError::NoMatchingOverload {
            name: name.to_string(),
            message: format!("No matching function for call to '{}'.", name),
            candidates: candidates.iter().map(Candidate::describe).collect(),
            span,
        });
    };

    let mut best: Vec<&OverloadMatch> = viable
        .iter()
        .filter(|m| m.tier() == best_tier)
        .collect();

    if best.len() > 1 && best.iter().any(|m| !m.is_generic) {
        best.retain(|m| !m.is_generic);
    }

    match best.as_slice() {
        [single] => Ok((*single).clone()),
        tied => Err(ambiguous_error(name, tied, candidates, span)),
    }
}

fn ambiguous_error(
    name: &str,
    tied: &[&OverloadMatch],
    candidates: &[Candidate],
    span: Span,
) -> SemanticError {
    tracing::debug!(function = name, count = tied.len(), "ambiguous overload");
    SemanticError::AmbiguousOverload {
        name: name.to_string(),
        candidates: tied
            .iter()
            .map(|m| candidates[m.index].describe())
            .collect(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{Conversion, ConversionKind};
    use bpl_core::{FunctionType, Type};

    fn candidate(name: &str) -> Candidate {
        Candidate {
            function: None,
            name: name.to_string(),
            generic_params: Vec::new(),
            signature: FunctionType {
                params: vec![Type::named("i32")],
                ret: Box::new(Type::void()),
                is_variadic: false,
                decl: None,
            },
            is_static: false,
        }
    }

    fn matched(index: usize, conversion: Conversion, is_generic: bool) -> OverloadMatch {
        matched_all(index, vec![conversion], is_generic)
    }

    fn matched_all(index: usize, arg_conversions: Vec<Conversion>, is_generic: bool) -> OverloadMatch {
        OverloadMatch {
            index,
            signature: candidate("f").signature,
            arg_conversions,
            is_generic,
        }
    }

    #[test]
    fn lowest_tier_wins() {
        let candidates = [candidate("f"), candidate("f")];
        let viable = [
            matched(0, Conversion::compatible(), false),
            matched(1, Conversion::widening(), false),
        ];
        let best = find_best_match(&viable, &candidates, "f", Span::default()).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn tier_counts_any_widening() {
        let exact = matched_all(0, vec![Conversion::identity(), Conversion::identity()], false);
        let mixed = matched_all(1, vec![Conversion::widening(), Conversion::compatible()], false);
        let loose = matched_all(2, vec![Conversion::identity(), Conversion::compatible()], false);
        assert_eq!(exact.tier(), ConversionKind::Identity);
        assert_eq!(mixed.tier(), ConversionKind::Widening);
        assert_eq!(loose.tier(), ConversionKind::Compatible);

        let candidates = [candidate("f"), candidate("f"), candidate("f")];
        let best = find_best_match(&[loose, mixed], &candidates, "f", Span::default()).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn plain_function_beats_generic_in_same_tier() {
        let candidates = [candidate("f"), candidate("f")];
        let viable = [
            matched(0, Conversion::identity(), true),
            matched(1, Conversion::identity(), false),
        ];
        let best = find_best_match(&viable, &candidates, "f", Span::default()).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn tie_reports_tied_candidates() {
        let candidates = [candidate("f"), candidate("f"), candidate("f")];
        let viable = [
            matched(0, Conversion::identity(), false),
            matched(1, Conversion::identity(), false),
            matched(2, Conversion::compatible(), false),
        ];
        let err = find_best_match(&viable, &candidates, "f", Span::default()).unwrap_err();
        match err {
            SemanticError::AmbiguousOverload { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }
}
