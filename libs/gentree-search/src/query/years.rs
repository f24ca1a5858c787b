use crate::{Result, SearchError};

/// Inclusive year window, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl YearRange {
    /// `None` when the window does not fit in an `i64`.
    pub fn around(year: i64, fudge_factor: i64) -> Option<Self> {
        Some(Self {
            min: year.checked_sub(fudge_factor)?,
            max: year.checked_add(fudge_factor)?,
        })
    }

    /// Parse `YYYY` or `YYYY:F`, where `F` widens the window on both sides.
    pub fn parse(value: &str) -> Result<Self> {
        if value.contains(':') {
            let mut parts = value.split(':');
            let year = parts.next().and_then(parse_int);
            let fudge_factor = parts.next().and_then(parse_int);
            let (Some(year), Some(fudge_factor)) = (year, fudge_factor) else {
                return Err(SearchError::invalid_argument(
                    "Year and fudge factor must be integers",
                ));
            };
            if fudge_factor < 0 {
                return Err(SearchError::invalid_argument(
                    "Fudge factor must not be negative",
                ));
            }
            Self::around(year, fudge_factor)
                .ok_or_else(|| SearchError::invalid_argument("Year range is out of bounds"))
        } else {
            let year = parse_int(value)
                .ok_or_else(|| SearchError::invalid_argument("Year must be an integer"))?;
            Self::around(year, 0)
                .ok_or_else(|| SearchError::invalid_argument("Year range is out of bounds"))
        }
    }

    pub fn contains(&self, year: i64) -> bool {
        year >= self.min && year <= self.max
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
