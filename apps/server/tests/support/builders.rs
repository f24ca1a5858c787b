use gentree_search::{PhoneticEncoder, Soundex};
use serde_json::{json, Map, Value};

/// Builder for stored person documents, filling the derived `_lc` and
/// phonetic fields the way the importer does.
pub struct PersonBuilder {
    fields: Map<String, Value>,
}

impl PersonBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut fields = Map::new();
        fields.insert("_id".into(), json!(format!("oid-{id}")));
        fields.insert("id".into(), json!(id));
        fields.insert("tree_num".into(), json!(1196));
        fields.insert("tree_version".into(), json!(3));
        fields.insert("Slug".into(), json!({"en": format!("person_1196.{id}")}));
        fields.insert("deceased".into(), json!(true));
        Self { fields }
    }

    pub fn name(mut self, first: &str, last: &str) -> Self {
        self.fields.insert("name".into(), json!([first, last]));
        self.fields.insert(
            "name_lc".into(),
            json!([first.to_lowercase(), last.to_lowercase()]),
        );
        self.fields
            .insert("nameS".into(), json!([Soundex.encode(first), Soundex.encode(last)]));
        self
    }

    pub fn sex(mut self, sex: &str) -> Self {
        self.fields.insert("sex".into(), json!(sex));
        self
    }

    pub fn living(mut self) -> Self {
        self.fields.insert("deceased".into(), json!(false));
        self
    }

    pub fn born(mut self, year: i64, place: &str) -> Self {
        self.fields.insert("birth_year".into(), json!(year));
        self.place("BIRT_PLAC", place)
    }

    pub fn died(mut self, year: i64, place: &str) -> Self {
        self.fields.insert("death_year".into(), json!(year));
        self.place("DEAT_PLAC", place)
    }

    pub fn tree(mut self, tree_num: i64) -> Self {
        self.fields.insert("tree_num".into(), json!(tree_num));
        self
    }

    pub fn archived(mut self) -> Self {
        self.fields.insert("archived".into(), json!(true));
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.fields.insert("NOTE".into(), json!(note));
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }

    fn place(mut self, field: &str, place: &str) -> Self {
        self.fields.insert(field.into(), json!(place));
        self.fields
            .insert(format!("{field}_lc"), json!(place.to_lowercase()));
        self.fields
            .insert(format!("{field}S"), json!(Soundex.encode(place)));
        self
    }
}
