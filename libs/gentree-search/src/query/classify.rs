//! Parameter classification by key shape.
//!
//! The suffix rules are matched on the raw key exactly as clients send it;
//! existing clients depend on them, so `foo_place` and `x_year_y` are
//! classified the same way `birth_place` and `birth_year` are.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Ends in `name` or `place`: matched case-insensitively against an indexed field.
    NameOrPlace,
    /// Contains `_year`: a year with optional fudge factor.
    Year,
    Sex,
    IndividualId,
    TreeNumber,
    /// Pagination controls read by the executor.
    Paging,
    Ignored,
}

pub fn classify(key: &str) -> ParamKind {
    if key.ends_with("name") || key.ends_with("place") {
        return ParamKind::NameOrPlace;
    }
    if key.contains("_year") {
        return ParamKind::Year;
    }
    match key {
        "sex" => ParamKind::Sex,
        "individual_id" => ParamKind::IndividualId,
        "tree_number" => ParamKind::TreeNumber,
        "start" | "max_results" | "max_count_results" => ParamKind::Paging,
        _ => ParamKind::Ignored,
    }
}

/// Place and year searches are only ever run against deceased persons.
pub fn forces_deceased(key: &str) -> bool {
    key.ends_with("place") || key.contains("_year")
}
