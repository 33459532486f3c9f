//! Minimal WKT sanity checks.
//!
//! Full geometry validation and simplification belong to a dedicated service;
//! annotations only need a well-formed, non-empty shape string.

use annostack_core::{DomainError, DomainResult};

const KINDS: &[&str] = &[
    "MULTIPOLYGON",
    "MULTILINESTRING",
    "MULTIPOINT",
    "POLYGON",
    "LINESTRING",
    "POINT",
];

/// Canonical form of a WKT string: upper-case type keyword, single spaces,
/// no padding inside parentheses.
pub fn normalize_wkt(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();

    let kind = KINDS
        .iter()
        .find(|k| upper.starts_with(**k))
        .ok_or_else(|| DomainError::validation(format!("unsupported geometry: {trimmed}")))?;

    let body = trimmed[kind.len()..].trim();
    if body.eq_ignore_ascii_case("EMPTY") {
        return Err(DomainError::validation("Geometry is empty: 0 points"));
    }
    if !body.starts_with('(') || !body.ends_with(')') || !balanced(body) {
        return Err(DomainError::validation(format!("malformed geometry: {trimmed}")));
    }

    let points = count_points(body)?;
    if points == 0 {
        return Err(DomainError::validation("Geometry is empty: 0 points"));
    }

    Ok(format!("{kind} {}", compact(body)))
}

fn balanced(body: &str) -> bool {
    let mut depth: i32 = 0;
    for c in body.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn count_points(body: &str) -> DomainResult<usize> {
    let mut count = 0;
    for tuple in body
        .split(|c| c == ',' || c == '(' || c == ')')
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let coords: Vec<&str> = tuple.split_whitespace().collect();
        if coords.len() < 2 || coords.iter().any(|c| c.parse::<f64>().is_err()) {
            return Err(DomainError::validation(format!("invalid coordinate: {tuple}")));
        }
        count += 1;
    }
    Ok(count)
}

fn compact(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut pending_space = false;
    for c in body.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        match c {
            '(' | ')' | ',' => {
                pending_space = false;
                out.push(c);
                if c == ',' {
                    pending_space = true;
                }
            }
            _ => {
                if pending_space && !out.ends_with('(') && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_keyword_and_spacing() {
        let wkt = normalize_wkt("  polygon (( 0 0,  10 0 ,10 10, 0 0 ))").unwrap();
        assert_eq!(wkt, "POLYGON ((0 0, 10 0, 10 10, 0 0))");
        assert_eq!(count_points(&wkt["POLYGON ".len()..]).unwrap(), 4);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_wkt("POINT(1.5 2)").unwrap();
        assert_eq!(once, "POINT (1.5 2)");
        assert_eq!(normalize_wkt(&once).unwrap(), once);
    }

    #[test]
    fn rejects_empty_and_malformed_geometries() {
        assert!(normalize_wkt("POINT EMPTY").is_err());
        assert!(normalize_wkt("POLYGON ((0 0, 1 1)").is_err());
        assert!(normalize_wkt("CIRCLE (0 0 5)").is_err());
        assert!(normalize_wkt("POINT (a b)").is_err());
        assert!(normalize_wkt("").is_err());
    }
}
