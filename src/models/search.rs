/// Search box state for the character list.
///
/// `raw_input` follows every keystroke. `confirmed_term` changes only on an
/// explicit confirmation and is the value actually sent as the `name` filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub raw_input: String,
    pub confirmed_term: Option<String>,
}

impl SearchState {
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.raw_input = text.into();
    }

    /// Commit the current input as the filter and return it.
    pub fn confirm(&mut self) -> Option<String> {
        self.confirmed_term = normalize_term(&self.raw_input);
        self.confirmed_term.clone()
    }
}

/// Trim surrounding whitespace; an empty result means "no filter".
pub fn normalize_term(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_confirm_trims_input() {
        let mut search = SearchState::default();
        search.set_input("  rick  ");
        assert_eq!(search.confirm(), Some("rick".to_string()));
        assert_eq!(search.confirmed_term.as_deref(), Some("rick"));
    }

    #[test]
    fn test_confirm_blank_clears_filter() {
        let mut search = SearchState {
            raw_input: "morty".into(),
            confirmed_term: None,
        };
        search.confirm();
        search.set_input(" \t ");
        assert_eq!(search.confirm(), None);
        assert_eq!(search.confirmed_term, None);
    }

    #[test]
    fn test_input_alone_leaves_confirmed_term() {
        let mut search = SearchState::default();
        search.set_input("rick");
        search.confirm();
        search.set_input("summer");
        assert_eq!(search.confirmed_term.as_deref(), Some("rick"));
    }

    proptest! {
        #[test]
        fn prop_confirmed_term_is_absent_iff_trim_is_empty(input in "\\PC*") {
            let mut search = SearchState::default();
            search.set_input(input.clone());
            let confirmed = search.confirm();

            if input.trim().is_empty() {
                prop_assert_eq!(confirmed, None);
            } else {
                prop_assert_eq!(confirmed, Some(input.trim().to_string()));
            }
        }

        #[test]
        fn prop_confirm_is_idempotent(input in "[ a-zA-Z]{0,16}") {
            let mut search = SearchState::default();
            search.set_input(input);
            let first = search.confirm();
            let second = search.confirm();
            prop_assert_eq!(first, second);
        }
    }
}
