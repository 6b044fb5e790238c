//! Parsing of extracted quantities ("0.2 m", "1.5", "20cm")

use crate::nlp::capability::Span;
use nom::{
    character::complete::{alpha1, multispace0},
    combinator::all_consuming,
    number::complete::double,
    sequence::{delimited, preceded},
    IResult, Parser,
};

/// Parse a bare number such as `0.2`, `-3` or `1.5e2`
///
/// Surrounding whitespace is allowed, anything else is not.
/// Non-finite values (`inf`, `nan`) are refused.
pub fn parse_number(input: &str) -> Option<f64> {
    let result: IResult<&str, f64> =
        all_consuming(delimited(multispace0, double, multispace0)).parse(input);
    result.ok().map(|(_, n)| n).filter(|n| n.is_finite())
}

/// Unit word following the `number` span inside `quantity`
///
/// The span's offsets locate the number, so `"B1 by 1 m"` yields `"m"`
/// rather than the word after the `1` of `B1`. Returns `None` when the
/// number is not in the quantity or no alphabetic word follows it.
pub fn unit_after(quantity: &str, number: &Span) -> Option<String> {
    let rest = number.rest_of(quantity)?;
    let result: IResult<&str, &str> = preceded(multispace0, alpha1).parse(rest);
    result.ok().map(|(_, unit)| unit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("0.2"), Some(0.2));
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
        assert_eq!(parse_number("3"), Some(3.0));
        assert_eq!(parse_number(".5"), Some(0.5));
    }

    #[test]
    fn test_parse_number_rejects_words() {
        assert_eq!(parse_number("one"), None);
        assert_eq!(parse_number("0.2 m"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("nan"), None);
    }

    fn number(quantity: &str, text: &str) -> Span {
        Span::locate(quantity, text, 0.9)
    }

    #[test]
    fn test_unit_after() {
        assert_eq!(unit_after("0.2 m", &number("0.2 m", "0.2")), Some("m".to_string()));
        assert_eq!(unit_after("20cm", &number("20cm", "20")), Some("cm".to_string()));
        assert_eq!(
            unit_after("by 1.5 meters", &number("by 1.5 meters", "1.5")),
            Some("meters".to_string())
        );
    }

    #[test]
    fn test_unit_after_repeated_digit() {
        let span = Span {
            text: "1".into(),
            score: 0.9,
            start: 6,
            end: 7,
        };
        assert_eq!(unit_after("B1 by 1 m", &span), Some("m".to_string()));
    }

    #[test]
    fn test_unit_after_missing() {
        assert_eq!(unit_after("0.2", &number("0.2", "0.2")), None);
        assert_eq!(unit_after("0.2 m", &number("7 m", "7")), None);
        assert_eq!(unit_after("0.2 m", &Span::empty()), None);
    }

    proptest! {
        #[test]
        fn prop_displayed_numbers_parse_back(x in -1.0e6f64..1.0e6f64) {
            prop_assert_eq!(parse_number(&x.to_string()), Some(x));
        }

        #[test]
        fn prop_unit_follows_number(x in 0.0f64..1.0e4f64, unit in "[a-z]{1,3}", gap in " {0,2}") {
            let number = x.to_string();
            let quantity = format!("{}{}{}", number, gap, unit);
            let span = Span::locate(&quantity, &number, 0.9);
            prop_assert_eq!(unit_after(&quantity, &span), Some(unit));
        }
    }
}
