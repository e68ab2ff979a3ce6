// src/quiz/labels.rs

use std::sync::LazyLock;

use regex::Regex;

/// Matches a single display label such as `A. ` or `c) ` at the start of an option.
static OPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z])[.)]\s+(\S.*)$").expect("static regex is valid"));

/// Splits `"B. Paris"` into its zero-based label position and the remaining text.
fn split_label(text: &str) -> Option<(usize, &str)> {
    let caps = OPTION_LABEL.captures(text.trim())?;
    let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
    let rest = caps.get(2)?.as_str().trim_end();
    Some(((letter as u8 - b'A') as usize, rest))
}

/// True when option `i` starts with the `i`-th letter label (`A.`, `B.`, ...).
fn sequentially_labelled(options: &[String]) -> bool {
    !options.is_empty()
        && options
            .iter()
            .enumerate()
            .all(|(i, o)| split_label(o).is_some_and(|(pos, _)| pos == i))
}

/// Text of an option with its display label removed, if it has one.
fn label_free(text: &str) -> &str {
    split_label(text).map_or(text.trim(), |(_, rest)| rest)
}

/// Resolves a selection or answer key to the index of the option it names.
///
/// In order:
/// 1. the trimmed text equals an option;
/// 2. the text carries a label whose letter points at an option with the same text;
/// 3. every option is labelled `A.`, `B.`, ... and the label-free texts match.
///
/// Options that merely start with an initial (`"J. Joyce"`, `"K. Joyce"`) stay
/// distinct; only exact text resolves them.
pub fn resolve_option(text: &str, options: &[String]) -> Option<usize> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(idx) = options.iter().position(|o| o.trim() == trimmed) {
        return Some(idx);
    }

    if let Some((pos, rest)) = split_label(trimmed) {
        if options.get(pos).is_some_and(|o| label_free(o) == rest) {
            return Some(pos);
        }
    }

    if sequentially_labelled(options) {
        let wanted = label_free(trimmed);
        return options.iter().position(|o| label_free(o) == wanted);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_text_wins() {
        let options = opts(&["3", "4", "5", "22"]);
        assert_eq!(resolve_option(" 4 ", &options), Some(1));
        assert_eq!(resolve_option("22", &options), Some(3));
        // "22" ends with "2", which a suffix rule would wrongly accept.
        assert_eq!(resolve_option("2", &options), None);
    }

    #[test]
    fn test_initial_led_options_stay_distinct() {
        let options = opts(&["J. Joyce", "K. Joyce", "T. Eliot", "W. Yeats"]);
        assert_eq!(resolve_option("J. Joyce", &options), Some(0));
        assert_eq!(resolve_option("K. Joyce", &options), Some(1));
        assert_eq!(resolve_option("Joyce", &options), None);
    }

    #[test]
    fn test_sequential_labels_are_stripped() {
        let options = opts(&["A. Berlin", "B. Paris", "C. Rome", "D. Madrid"]);
        assert_eq!(resolve_option("Paris", &options), Some(1));
        assert_eq!(resolve_option("b) Paris", &options), Some(1));
        assert_eq!(resolve_option("B. Paris", &options), Some(1));
        assert_eq!(resolve_option("Lyon", &options), None);
    }

    #[test]
    fn test_display_label_on_plain_options() {
        // A front-end may prefix plain options with a letter for display.
        let options = opts(&["Berlin", "Paris"]);
        assert_eq!(resolve_option("B. Paris", &options), Some(1));
        // The letter must point at the option it names.
        assert_eq!(resolve_option("A. Paris", &options), None);
    }

    #[test]
    fn test_blank_and_bare_labels() {
        let options = opts(&["A. ", "B. x"]);
        assert_eq!(resolve_option("", &options), None);
        assert_eq!(resolve_option("A.", &options), Some(0));
    }
}
