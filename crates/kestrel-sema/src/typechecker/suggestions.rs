//! Fix suggestions attached to diagnostics as help text

use crate::types::{Prim, Type};

/// Suggest a fix for a type mismatch (expected vs found).
///
/// Returns `Some(suggestion)` if a common fix is known, `None` otherwise.
pub fn suggest_type_mismatch(expected: &Type, found: &Type) -> Option<String> {
    match (expected.as_prim(), found.as_prim()) {
        (Some(Prim::Bool), Some(p)) if p.is_int_like() || p.is_float_like() => {
            Some("use a comparison operator: `value != 0`".to_string())
        }
        (Some(Prim::Bool), Some(Prim::String)) => {
            Some("use a comparison: `value == \"expected\"`".to_string())
        }
        (Some(e), Some(f)) if e.is_concrete_int() && f.is_concrete_int() => Some(format!(
            "integer widths differ; declare the value as {} instead of {}",
            e.name(),
            f.name()
        )),
        (Some(e), Some(Prim::FloatLit)) if e.is_concrete_int() => {
            Some("integer types only accept whole numbers".to_string())
        }
        _ => match (expected.strip_drop(), found.strip_drop()) {
            (Type::Array { .. }, Type::Slice(_)) => {
                Some("slices have no static length; copy into a fixed array".to_string())
            }
            (_, Type::Array { elem, .. }) if elem.strip_drop() == expected.strip_drop() => {
                Some("use an index to access an element: `arr[0]`".to_string())
            }
            _ => None,
        },
    }
}

/// Suggest a fix when a condition is not Bool.
pub fn suggest_condition_fix(found: &Type) -> String {
    if found.is_int_like() || found.is_float_like() {
        return "use a comparison: `value != 0` or `value > 0`".to_string();
    }
    match found.strip_drop() {
        Type::Primitive(Prim::String) => {
            "use a comparison: `len(value) > 0` or `value != \"\"`".to_string()
        }
        Type::Array { .. } | Type::Slice(_) => {
            "use `len(xs) > 0` to check if the array is non-empty".to_string()
        }
        _ => format!(
            "expected Bool, found {}; use a comparison to get a Bool",
            found.display_name()
        ),
    }
}

/// Suggest a fix for wrong number of arguments.
pub fn suggest_arity_fix(expected: usize, found: usize, func_type: &Type) -> String {
    let direction = if found > expected { "remove" } else { "add" };
    let diff = found.abs_diff(expected);

    format!(
        "{} {} argument{}; function signature: {}",
        direction,
        diff,
        if diff == 1 { "" } else { "s" },
        func_type.display_name()
    )
}

/// Suggest a fix for immutable binding assignment.
pub fn suggest_mutability_fix(var_name: &str) -> String {
    format!(
        "declare '{}' as mutable: `let mut {} = ...`",
        var_name, var_name
    )
}

/// Find the most similar name from a list of known names (for typo suggestions).
///
/// Uses Levenshtein distance. Returns `None` if no name is close enough.
pub fn suggest_similar_name<'a>(
    unknown: &str,
    known_names: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let max_distance = match unknown.len() {
        0..=2 => 1,
        3..=5 => 2,
        _ => 3,
    };

    let mut best: Option<(&str, usize)> = None;

    for name in known_names {
        if name == unknown {
            continue;
        }
        let dist = levenshtein_distance(unknown, name);
        let closer = best.map_or(true, |(_, best_dist)| dist < best_dist);
        if dist <= max_distance && closer {
            best = Some((name, dist));
        }
    }

    best.map(|(name, _)| format!("did you mean '{}'?", name))
}

/// Compute Levenshtein edit distance between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_bool_from_number() {
        let suggestion = suggest_type_mismatch(&Type::BOOL, &Type::I32);
        assert!(suggestion.unwrap().contains("comparison"));
    }

    #[test]
    fn test_suggest_int_width() {
        let suggestion = suggest_type_mismatch(&Type::U32, &Type::I64).unwrap();
        assert!(suggestion.contains("U32"));
    }

    #[test]
    fn test_suggest_index_into_array() {
        let suggestion = suggest_type_mismatch(&Type::I32, &Type::array(Type::I32, 3, 3));
        assert!(suggestion.unwrap().contains("arr[0]"));
    }

    #[test]
    fn test_no_suggestion_for_unrelated_types() {
        assert!(suggest_type_mismatch(&Type::named("Point"), &Type::STRING).is_none());
    }

    #[test]
    fn test_suggest_condition_number() {
        assert!(suggest_condition_fix(&Type::INT_LIT).contains("!="));
        assert!(suggest_condition_fix(&Type::STRING).contains("len(value)"));
    }

    #[test]
    fn test_suggest_similar_name() {
        let names = ["print", "println", "len"];
        let suggestion = suggest_similar_name("prnt", names.iter().copied());
        assert_eq!(suggestion.as_deref(), Some("did you mean 'print'?"));
    }

    #[test]
    fn test_suggest_similar_name_no_match() {
        let names = ["print", "len"];
        assert!(suggest_similar_name("xyzabc", names.iter().copied()).is_none());
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("abc", "abcd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_suggest_arity() {
        let func = Type::function(vec![], vec![Type::I32], Type::VOID);
        let suggestion = suggest_arity_fix(1, 3, &func);
        assert!(suggestion.contains("remove 2 arguments"));
        assert!(suggestion.contains("Fn(I32)->Void"));
        assert!(suggest_arity_fix(2, 1, &func).starts_with("add 1 argument;"));
    }

    #[test]
    fn test_suggest_mutability() {
        assert!(suggest_mutability_fix("x").contains("let mut x"));
    }
}
