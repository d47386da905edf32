//! Common utilities shared across report generators.

/// Width of the name column of console tables.
pub const NAME_WIDTH: usize = 37;

/// Width of the value column of console tables.
pub const VALUE_WIDTH: usize = 18;

/// Width of a whole console table row.
pub const TABLE_WIDTH: usize = NAME_WIDTH + VALUE_WIDTH + "Trust".len();

/// How much a trust level can be relied upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Letter grade of a trust level, from A (best) to E.
pub fn letter_grade(trust: f64) -> char {
    if trust > 0.8 {
        'A'
    } else if trust > 0.6 {
        'B'
    } else if trust > 0.4 {
        'C'
    } else if trust > 0.2 {
        'D'
    } else {
        'E'
    }
}

pub fn confidence(trust: f64) -> Confidence {
    if trust < 0.4 {
        Confidence::Low
    } else if trust < 0.6 {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

/// Values are shown rounded to whole units.
pub fn format_value(value: f64) -> String {
    format!("{value:.0}")
}

pub fn percentile_name(p: u8) -> String {
    format!("{p}th percentile")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn grades() {
        assert_eq!(letter_grade(0.99), 'A');
        assert_eq!(letter_grade(0.8), 'B');
        assert_eq!(letter_grade(0.61), 'B');
        assert_eq!(letter_grade(0.6), 'C');
        assert_eq!(letter_grade(0.41), 'C');
        assert_eq!(letter_grade(0.3), 'D');
        assert_eq!(letter_grade(0.2), 'E');
        assert_eq!(letter_grade(0.0), 'E');
    }

    #[test]
    fn confidence_levels() {
        assert_eq!(confidence(0.1), Confidence::Low);
        assert_eq!(confidence(0.4), Confidence::Medium);
        assert_eq!(confidence(0.59), Confidence::Medium);
        assert_eq!(confidence(0.6), Confidence::High);
    }

    #[test]
    fn values_are_rounded() {
        assert_eq!(format_value(2199.6), "2200");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(percentile_name(5), "5th percentile");
    }
}
