//! "Did you mean" suggestions for unknown field names.

use strsim::levenshtein;

/// Maximum allowed Levenshtein distance as a percentage of target length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Find up to three names close to `target`, closest first.
pub fn find_similar_names<'a, I>(target: &str, available: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<_> =
        available.into_iter().map(|name| (name.to_string(), levenshtein(target, name))).collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1))
        .take(3)
        .map(|(name, _)| name)
        .collect()
}

/// Render suggestions as a message suffix (empty when there are none).
pub fn format_suggestions(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(" (did you mean '{only}'?)"),
        many => format!(
            " (did you mean one of: {}?)",
            many.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_similar_names() {
        let names = ["selector", "children", "Lighting"];
        assert_eq!(find_similar_names("selectr", names), vec!["selector"]);
        assert_eq!(find_similar_names("Lightning", names), vec!["Lighting"]);
        assert!(find_similar_names("zzzzzz", names).is_empty());
    }

    #[test]
    fn test_format_suggestions() {
        assert_eq!(format_suggestions(&[]), "");
        assert_eq!(format_suggestions(&["a".to_string()]), " (did you mean 'a'?)");
        assert_eq!(
            format_suggestions(&["a".to_string(), "b".to_string()]),
            " (did you mean one of: 'a', 'b'?)"
        );
    }
}
