//! Area-name inference from composite station labels
//!
//! Station labels are free text, usually "Area - City" but sometimes just
//! "City" or "Area, City". Given the search term the user typed, this
//! derives the monitoring-area name used to group readings.

/// Derive the area name for a station label under a given search term.
///
/// Rules, in order:
/// - term found inside the label at index > 0: everything before the
///   match, trimmed, with a trailing `-` separator stripped;
/// - term found at index 0: the full label unchanged;
/// - term not found (rare, callers pre-filter on containment): the first
///   `-`/`,` separated segment, or the full label when no separator
///   exists.
///
/// Matching is case-insensitive; the returned name keeps the label's
/// original casing.
#[must_use]
pub fn infer_area_name(city: &str, term: &str) -> String {
    let city_lower = city.to_lowercase();
    let term_lower = term.to_lowercase();

    match city_lower.find(&term_lower) {
        Some(0) => city.to_string(),
        // Lowercasing preserves byte offsets for ASCII labels; for the
        // rare non-ASCII label where it does not, keep the full label.
        Some(index) => city.get(..index).map_or_else(
            || city.to_string(),
            |prefix| strip_trailing_separator(prefix.trim()).to_string(),
        ),
        None => city
            .split(['-', ','])
            .next()
            .map_or_else(|| city.to_string(), |segment| segment.trim().to_string()),
    }
}

/// Strip one trailing `-` plus surrounding whitespace from an area prefix
fn strip_trailing_separator(prefix: &str) -> &str {
    let trimmed = prefix.trim_end();
    trimmed.strip_suffix('-').map_or(trimmed, str::trim_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Anand Vihar - Delhi", "delhi", "Anand Vihar")]
    #[case("Rohini - Delhi", "delhi", "Rohini")]
    #[case("Anand Vihar-Delhi", "delhi", "Anand Vihar")]
    #[case("Sector 62, Noida", "noida", "Sector 62")]
    fn test_prefix_extraction(#[case] city: &str, #[case] term: &str, #[case] expected: &str) {
        assert_eq!(infer_area_name(city, term), expected);
    }

    #[test]
    fn test_term_at_start_keeps_full_label() {
        assert_eq!(infer_area_name("Delhi - Anand Vihar", "delhi"), "Delhi - Anand Vihar");
        assert_eq!(infer_area_name("Delhi", "delhi"), "Delhi");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(infer_area_name("ANAND VIHAR - DELHI", "Delhi"), "ANAND VIHAR");
    }

    #[test]
    fn test_term_absent_falls_back_to_first_segment() {
        assert_eq!(infer_area_name("Shivaji Nagar - Pune", "mumbai"), "Shivaji Nagar");
        assert_eq!(infer_area_name("Shivaji Nagar, Pune", "mumbai"), "Shivaji Nagar");
    }

    #[test]
    fn test_term_absent_without_separator_keeps_label() {
        assert_eq!(infer_area_name("Pune", "mumbai"), "Pune");
    }

    #[test]
    fn test_whitespace_only_prefix() {
        // Label starting with spaces before the term: prefix trims to empty.
        assert_eq!(infer_area_name("  Delhi", "delhi"), "");
    }

    #[test]
    fn test_multiple_dashes_only_last_stripped() {
        assert_eq!(infer_area_name("Sector 5 - Rohini - Delhi", "delhi"), "Sector 5 - Rohini");
    }

    #[test]
    fn test_doubled_trailing_dash_strips_one() {
        // Only the separating dash is removed; an inner dash stays.
        assert_eq!(infer_area_name("Foo-- Delhi", "delhi"), "Foo-");
    }
}
