//! Closed sets of server-side codes (tiers, item types, skill types).
//!
//! A filter over such a set is an `Option<T>`: `None` is the "ALL" entry offered by the
//! dashboard and is never sent to the server.

use std::fmt;

/// Label shown for the "no filter" entry
pub const ALL_LABEL: &str = "ALL";

pub trait Choice: Copy + Eq + fmt::Debug + 'static {
    /// All variants in display order
    const VARIANTS: &'static [Self];

    /// Code used by the API
    fn code(&self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.code() == code)
    }
}

pub fn filter_label<T: Choice>(value: Option<T>) -> &'static str {
    value.map_or(ALL_LABEL, |v| v.code())
}

/// Steps through `ALL, VARIANTS[0], VARIANTS[1], ...` and wraps around
pub fn next_filter<T: Choice>(value: Option<T>) -> Option<T> {
    match value {
        None => T::VARIANTS.first().copied(),
        Some(current) => {
            let pos = T::VARIANTS.iter().position(|v| *v == current)?;
            T::VARIANTS.get(pos + 1).copied()
        }
    }
}

pub fn previous_filter<T: Choice>(value: Option<T>) -> Option<T> {
    match value {
        None => T::VARIANTS.last().copied(),
        Some(current) => {
            let pos = T::VARIANTS.iter().position(|v| *v == current)?;
            if pos == 0 {
                None
            } else {
                T::VARIANTS.get(pos - 1).copied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::Tier;

    #[test]
    fn next_filter_cycles_through_all_and_wraps() {
        let mut value: Option<Tier> = None;
        let mut seen = vec![filter_label(value)];
        for _ in 0..Tier::VARIANTS.len() + 1 {
            value = next_filter(value);
            seen.push(filter_label(value));
        }

        assert_eq!(
            seen,
            vec!["ALL", "BRONZE", "SILVER", "GOLD", "PLATINUM", "DIAMOND", "MASTER", "GRANDMASTER", "ALL"]
        );
    }

    #[test]
    fn previous_filter_is_inverse_of_next() {
        let mut value: Option<Tier> = None;
        for _ in 0..20 {
            let next = next_filter(value);
            assert_eq!(previous_filter(next), value);
            value = next;
        }
    }
}
