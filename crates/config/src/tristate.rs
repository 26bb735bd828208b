use serde::{Deserialize, Serialize};

/// A three-way filter setting.
///
/// - [`Ignore`](Self::Ignore): the property is not considered at all.
/// - [`Include`](Self::Include): only items that exhibit the property pass.
/// - [`Exclude`](Self::Exclude): only items that do *not* exhibit it pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    Ignore,
    Include,
    Exclude,
}
impl TriState {
    /// Evaluates the setting against a lazily computed property.
    ///
    /// `property` is never called for [`Ignore`](Self::Ignore), so expensive
    /// lookups are skipped when a filter is switched off.
    ///
    /// ```
    /// use shelf_config::TriState;
    ///
    /// assert!(TriState::Ignore.matches(|| unreachable!()));
    /// assert!(TriState::Include.matches(|| true));
    /// assert!(TriState::Exclude.matches(|| false));
    /// ```
    pub fn matches(self, property: impl FnOnce() -> bool) -> bool {
        match self {
            Self::Ignore => true,
            Self::Include => property(),
            Self::Exclude => !property(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TriState::Ignore, true, true)]
    #[case(TriState::Ignore, false, true)]
    #[case(TriState::Include, true, true)]
    #[case(TriState::Include, false, false)]
    #[case(TriState::Exclude, true, false)]
    #[case(TriState::Exclude, false, true)]
    fn test_matches(#[case] state: TriState, #[case] property: bool, #[case] expected: bool) {
        assert_eq!(state.matches(|| property), expected);
    }

    #[test]
    fn test_default_is_ignore() {
        assert_eq!(TriState::default(), TriState::Ignore);
        assert!(TriState::default().matches(|| unreachable!()));
    }
}
