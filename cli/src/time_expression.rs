use std::time::Duration;

use thiserror::Error;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeExpressionError {
    #[error("time expression is empty")]
    Empty,
    #[error("missing number before `{unit}` in `{expression}`")]
    MissingNumber { expression: String, unit: String },
    #[error("missing unit after `{value}` in `{expression}`; use d, h, m, s or ms")]
    MissingUnit { expression: String, value: String },
    #[error("unknown time unit `{unit}` in `{expression}`; use d, h, m, s or ms")]
    UnknownUnit { expression: String, unit: String },
    #[error("unexpected character `{ch}` in `{expression}`")]
    UnexpectedCharacter { expression: String, ch: char },
    #[error("time expression `{expression}` is too large")]
    Overflow { expression: String },
}

/// Parse a relative delay such as `1d`, `5h`, `1h 30m` or `250ms`.
///
/// Groups of `<integer><unit>` are summed; units are case-insensitive. A bare
/// integer is a number of milliseconds.
pub fn parse_time_expression(expression: &str) -> Result<Duration, TimeExpressionError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(TimeExpressionError::Empty);
    }
    let overflow = || TimeExpressionError::Overflow {
        expression: trimmed.to_string(),
    };
    if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        let millis = trimmed.parse::<u64>().map_err(|_| overflow())?;
        return Ok(Duration::from_millis(millis));
    }

    let mut total_millis: u64 = 0;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, after_digits) = rest.split_at(digits_end);
        let unit_end = after_digits
            .find(|ch: char| !ch.is_ascii_alphabetic())
            .unwrap_or(after_digits.len());
        let (unit, after_unit) = after_digits.split_at(unit_end);

        match (digits.is_empty(), unit.is_empty()) {
            (true, true) => {
                let ch = after_unit.chars().next().unwrap_or_default();
                return Err(TimeExpressionError::UnexpectedCharacter {
                    expression: trimmed.to_string(),
                    ch,
                });
            }
            (true, false) => {
                return Err(TimeExpressionError::MissingNumber {
                    expression: trimmed.to_string(),
                    unit: unit.to_string(),
                });
            }
            (false, true) => {
                return Err(TimeExpressionError::MissingUnit {
                    expression: trimmed.to_string(),
                    value: digits.to_string(),
                });
            }
            (false, false) => {}
        }

        let unit_millis = match unit.to_ascii_lowercase().as_str() {
            "d" => MILLIS_PER_DAY,
            "h" => MILLIS_PER_HOUR,
            "m" => MILLIS_PER_MINUTE,
            "s" => MILLIS_PER_SECOND,
            "ms" => 1,
            _ => {
                return Err(TimeExpressionError::UnknownUnit {
                    expression: trimmed.to_string(),
                    unit: unit.to_string(),
                });
            }
        };
        let value = digits.parse::<u64>().map_err(|_| overflow())?;
        total_millis = value
            .checked_mul(unit_millis)
            .and_then(|millis| total_millis.checked_add(millis))
            .ok_or_else(overflow)?;
        rest = after_unit.trim_start();
    }
    Ok(Duration::from_millis(total_millis))
}

#[cfg(test)]
mod tests {
    use super::TimeExpressionError;
    use super::parse_time_expression;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn parses_single_units() {
        let cases = [
            ("1d", Duration::from_secs(86_400)),
            ("5h", Duration::from_secs(5 * 3_600)),
            ("15m", Duration::from_secs(15 * 60)),
            ("30s", Duration::from_secs(30)),
            ("250ms", Duration::from_millis(250)),
            ("2D", Duration::from_secs(2 * 86_400)),
            ("100MS", Duration::from_millis(100)),
        ];
        for (expression, expected) in cases {
            assert_eq!(
                parse_time_expression(expression),
                Ok(expected),
                "{expression}"
            );
        }
    }

    #[test]
    fn sums_groups_with_optional_whitespace() {
        assert_eq!(
            parse_time_expression("1h 30m"),
            Ok(Duration::from_secs(90 * 60))
        );
        assert_eq!(
            parse_time_expression(" 1d2h3m4s5ms "),
            Ok(Duration::from_millis(93_784_005))
        );
    }

    #[test]
    fn bare_integer_is_milliseconds() {
        assert_eq!(parse_time_expression("1500"), Ok(Duration::from_millis(1_500)));
        assert_eq!(parse_time_expression("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!(parse_time_expression("  "), Err(TimeExpressionError::Empty));
        assert_eq!(
            parse_time_expression("h"),
            Err(TimeExpressionError::MissingNumber {
                expression: "h".to_string(),
                unit: "h".to_string(),
            })
        );
        assert_eq!(
            parse_time_expression("1h 30"),
            Err(TimeExpressionError::MissingUnit {
                expression: "1h 30".to_string(),
                value: "30".to_string(),
            })
        );
        assert_eq!(
            parse_time_expression("3w"),
            Err(TimeExpressionError::UnknownUnit {
                expression: "3w".to_string(),
                unit: "w".to_string(),
            })
        );
        assert_eq!(
            parse_time_expression("-1d"),
            Err(TimeExpressionError::UnexpectedCharacter {
                expression: "-1d".to_string(),
                ch: '-',
            })
        );
        assert_eq!(
            parse_time_expression("999999999999d"),
            Err(TimeExpressionError::Overflow {
                expression: "999999999999d".to_string(),
            })
        );
    }
}
