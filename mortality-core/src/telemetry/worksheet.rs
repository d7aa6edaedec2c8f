//! Worksheet name matching.

use serde::Serialize;

/// How the configured worksheet name was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    Substring,
    FirstAvailable,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::CaseInsensitive => "case_insensitive",
            Self::Substring => "substring",
            Self::FirstAvailable => "first_available",
        }
    }
}

/// Pick a worksheet for `wanted` from `available` (listing order).
///
/// Tiers: exact, case-insensitive, substring in either direction, then the
/// first worksheet. `None` only when `available` is empty.
pub fn resolve_worksheet<'a>(wanted: &str, available: &'a [String]) -> Option<(&'a str, MatchTier)> {
    let first = available.first()?;

    if let Some(title) = available.iter().find(|t| t.as_str() == wanted) {
        return Some((title, MatchTier::Exact));
    }

    let wanted_lower = wanted.to_lowercase();
    if let Some(title) = available.iter().find(|t| t.to_lowercase() == wanted_lower) {
        return Some((title, MatchTier::CaseInsensitive));
    }

    if !wanted_lower.is_empty() {
        let hit = available.iter().find(|t| {
            let t = t.to_lowercase();
            !t.is_empty() && (t.contains(&wanted_lower) || wanted_lower.contains(&t))
        });
        if let Some(title) = hit {
            return Some((title, MatchTier::Substring));
        }
    }

    Some((first, MatchTier::FirstAvailable))
}
