//! Living-person privacy rule

/// Fields kept on the record of a person presumed to be alive.
pub const LIVING_PERSON_WHITELISTED_KEYS: &[&str] =
    &["id", "tree_num", "tree_version", "Slug", "name", "sex"];

pub const DEFAULT_LIVING_AGE_THRESHOLD: i64 = 100;

/// Decides whether a person should be treated as alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivingPersonPolicy {
    /// People born more than this many years ago are presumed dead.
    pub age_threshold: i64,
}

impl Default for LivingPersonPolicy {
    fn default() -> Self {
        Self {
            age_threshold: DEFAULT_LIVING_AGE_THRESHOLD,
        }
    }
}

impl LivingPersonPolicy {
    pub fn new(age_threshold: i64) -> Self {
        Self { age_threshold }
    }

    /// A missing `deceased` flag counts as not deceased.
    pub fn is_living(
        &self,
        deceased: Option<bool>,
        birth_year: Option<i64>,
        current_year: i64,
    ) -> bool {
        if deceased.unwrap_or(false) {
            return false;
        }
        match birth_year {
            Some(year) => current_year.saturating_sub(year) <= self.age_threshold,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deceased_is_never_living() {
        let policy = LivingPersonPolicy::default();
        assert!(!policy.is_living(Some(true), Some(2000), 2026));
        assert!(!policy.is_living(Some(true), None, 2026));
    }

    #[test]
    fn age_threshold_decides_for_non_deceased() {
        let policy = LivingPersonPolicy::default();
        assert!(policy.is_living(Some(false), None, 2026));
        assert!(policy.is_living(None, Some(1950), 2026));
        assert!(policy.is_living(Some(false), Some(1926), 2026));
        assert!(!policy.is_living(Some(false), Some(1925), 2026));
    }

    #[test]
    fn extreme_birth_years_do_not_overflow() {
        let policy = LivingPersonPolicy::default();
        assert!(!policy.is_living(Some(false), Some(i64::MIN), 2026));
        assert!(policy.is_living(Some(false), Some(i64::MAX), 2026));
    }
}
