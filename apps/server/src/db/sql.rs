//! Identifier guards for SQL assembled at runtime.

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes (the Postgres limit).
pub fn validate_identifier(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("identifier must not be empty".to_string());
    }
    if value.len() > 63 {
        return Err(format!("identifier is longer than 63 bytes: {value}"));
    }

    let mut chars = value.chars();
    let starts_well = chars
        .next()
        .map(|ch| ch.is_ascii_alphabetic() || ch == '_')
        .unwrap_or(false);
    if !starts_well || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(format!(
            "identifier may only contain letters, digits and underscores: {value}"
        ));
    }

    Ok(())
}

/// Double-quote an identifier that already passed [`validate_identifier`].
pub fn quote_identifier(value: &str) -> String {
    format!("\"{value}\"")
}
