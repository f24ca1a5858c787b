use crate::filter::Condition;
use crate::phonetic::PhoneticEncoder;
use serde_json::Value;

/// How one name or place value is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSpec {
    Exact(String),
    Prefix(String),
    /// Holds the phonetic code, not the original text.
    Phonetic(String),
}

impl MatchSpec {
    /// Parse `value[;modifier]`. Given names are always matched exactly since
    /// no phonetic index exists for them. Unknown modifiers fall back to an
    /// exact match on the leading part.
    pub fn parse(param: &str, value: &str, encoder: &dyn PhoneticEncoder) -> Self {
        let mut parts = value.split(';');
        let search = parts.next().unwrap_or_default().to_string();

        if param == "first_name" {
            return MatchSpec::Exact(search);
        }

        match parts.next() {
            Some("prefix") => MatchSpec::Prefix(search),
            Some("phonetic") => MatchSpec::Phonetic(encoder.encode(&search)),
            _ => MatchSpec::Exact(search),
        }
    }

    /// Field the match runs against. Phonetic codes live next to the
    /// lower-cased field: `BIRT_PLAC_lc` is searched as `BIRT_PLACS`.
    pub fn target_field(&self, indexed_field: &str) -> String {
        match self {
            MatchSpec::Phonetic(_) => {
                let base = indexed_field.split("_lc").next().unwrap_or(indexed_field);
                format!("{base}S")
            }
            MatchSpec::Exact(_) | MatchSpec::Prefix(_) => indexed_field.to_string(),
        }
    }

    pub fn condition(&self) -> Condition {
        match self {
            MatchSpec::Exact(value) | MatchSpec::Phonetic(value) => {
                Condition::Equals(Value::String(value.clone()))
            }
            MatchSpec::Prefix(value) => Condition::Prefix(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetic::Soundex;

    #[test]
    fn first_name_ignores_modifiers() {
        for value in ["yeh;phonetic", "yeh;prefix", "yeh;bogus", "yeh"] {
            assert_eq!(
                MatchSpec::parse("first_name", value, &Soundex),
                MatchSpec::Exact("yeh".into())
            );
        }
    }

    #[test]
    fn modifiers_on_other_fields() {
        assert_eq!(
            MatchSpec::parse("last_name", "coh;prefix", &Soundex),
            MatchSpec::Prefix("coh".into())
        );
        assert_eq!(
            MatchSpec::parse("birth_place", "lodz;phonetic", &Soundex),
            MatchSpec::Phonetic(Soundex.encode("lodz"))
        );
        assert_eq!(
            MatchSpec::parse("birth_place", "lodz;fuzzy", &Soundex),
            MatchSpec::Exact("lodz".into())
        );
    }

    #[test]
    fn phonetic_retargets_field() {
        let spec = MatchSpec::Phonetic("L320".into());
        assert_eq!(spec.target_field("BIRT_PLAC_lc"), "BIRT_PLACS");
        assert_eq!(spec.target_field("name_lc.1"), "nameS");
        assert_eq!(
            MatchSpec::Prefix("l".into()).target_field("BIRT_PLAC_lc"),
            "BIRT_PLAC_lc"
        );
    }
}
