//! Coordinate-string parsing.
//!
//! Accepts the notations people paste from map services and guide books:
//! signed decimal degrees, decimal degrees with hemisphere letters,
//! degrees with decimal minutes, and degrees/minutes/seconds. Degree,
//! minute and second marks are optional.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordsError {
    #[error("Empty coordinate string")]
    Empty,

    #[error("Unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("Malformed number '{0}'")]
    MalformedNumber(String),

    #[error("Expected 1 to 3 numbers per axis with both axes alike, found {0} numbers")]
    ComponentCount(usize),

    #[error("Hemisphere letters must either all lead or all trail their numbers")]
    MisplacedHemisphere,

    #[error("Need one of N/S and one of E/W, found '{0}' and '{1}'")]
    ConflictingHemispheres(char, char),

    #[error("Signed values cannot be combined with hemisphere letters")]
    SignWithHemisphere,

    #[error("Only the degrees of an axis may carry a sign")]
    MisplacedSign,

    #[error("{name} value {value} is outside [0, 60)")]
    SubunitOutOfRange { name: &'static str, value: f64 },

    #[error("Only the last component of an axis may have a fraction")]
    FractionBeforeSubunit,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number { value: f64, signed: bool, negative: bool },
    Hemisphere(char),
}

/// Parse a coordinate string into `(latitude, longitude)` in decimal degrees.
///
/// No range check is applied; see [`crate::geo::GeoPoint::is_valid`].
///
/// ```
/// use venuedir_core::coords::parse_lat_lon;
///
/// assert_eq!(parse_lat_lon("47.5, -7.25").unwrap(), (47.5, -7.25));
/// assert_eq!(parse_lat_lon("N 47 30 E 7 15").unwrap(), (47.5, 7.25));
/// assert_eq!(parse_lat_lon("47°30'0\"S 7°15'0\"W").unwrap(), (-47.5, -7.25));
/// ```
pub fn parse_lat_lon(input: &str) -> Result<(f64, f64), CoordsError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CoordsError::Empty);
    }

    let hemispheres: Vec<(usize, char)> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match t {
            Token::Hemisphere(h) => Some((i, *h)),
            Token::Number { .. } => None,
        })
        .collect();

    if hemispheres.is_empty() {
        return parse_unlettered(&tokens);
    }
    parse_lettered(&tokens, &hemispheres)
}

fn tokenize(input: &str) -> Result<Vec<Token>, CoordsError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' | ';' | '°' | 'º' | '\'' | '′' | '’' | '"' | '″' | '”' => {
                chars.next();
            }
            'N' | 'S' | 'E' | 'W' | 'n' | 's' | 'e' | 'w' => {
                tokens.push(Token::Hemisphere(c.to_ascii_uppercase()));
                chars.next();
            }
            '+' | '-' | '.' | '0'..='9' => {
                let mut text = String::new();
                let negative = c == '-';
                let signed = c == '+' || c == '-';
                if signed {
                    chars.next();
                }
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| CoordsError::MalformedNumber(text.clone()))?;
                tokens.push(Token::Number {
                    value,
                    signed,
                    negative,
                });
            }
            other => return Err(CoordsError::UnexpectedChar(other, offset)),
        }
    }

    Ok(tokens)
}

/// Plain numbers: the first half is latitude, the second half longitude.
fn parse_unlettered(tokens: &[Token]) -> Result<(f64, f64), CoordsError> {
    let count = tokens.len();
    if !matches!(count, 2 | 4 | 6) {
        return Err(CoordsError::ComponentCount(count));
    }
    let (lat, lon) = tokens.split_at(count / 2);
    Ok((combine(lat)?, combine(lon)?))
}

fn parse_lettered(
    tokens: &[Token],
    hemispheres: &[(usize, char)],
) -> Result<(f64, f64), CoordsError> {
    if hemispheres.len() != 2 {
        return Err(CoordsError::MisplacedHemisphere);
    }
    if tokens
        .iter()
        .any(|t| matches!(t, Token::Number { signed: true, .. }))
    {
        return Err(CoordsError::SignWithHemisphere);
    }

    let (first_pos, first) = hemispheres[0];
    let (second_pos, second) = hemispheres[1];
    let last = tokens.len() - 1;

    let (first_numbers, second_numbers) = if first_pos == 0 && second_pos != last {
        (&tokens[1..second_pos], &tokens[second_pos + 1..])
    } else if second_pos == last && first_pos != 0 {
        (&tokens[..first_pos], &tokens[first_pos + 1..second_pos])
    } else {
        return Err(CoordsError::MisplacedHemisphere);
    };

    if first_numbers.len() != second_numbers.len() {
        return Err(CoordsError::ComponentCount(
            first_numbers.len() + second_numbers.len(),
        ));
    }

    let first_value = apply_hemisphere(combine(first_numbers)?, first);
    let second_value = apply_hemisphere(combine(second_numbers)?, second);

    match (is_latitude(first), is_latitude(second)) {
        (true, false) => Ok((first_value, second_value)),
        (false, true) => Ok((second_value, first_value)),
        _ => Err(CoordsError::ConflictingHemispheres(first, second)),
    }
}

fn is_latitude(hemisphere: char) -> bool {
    matches!(hemisphere, 'N' | 'S')
}

fn apply_hemisphere(value: f64, hemisphere: char) -> f64 {
    match hemisphere {
        'S' | 'W' => -value,
        _ => value,
    }
}

/// Fold degrees, optional minutes and optional seconds into decimal degrees.
fn combine(parts: &[Token]) -> Result<f64, CoordsError> {
    let values: Vec<(f64, bool, bool)> = parts
        .iter()
        .filter_map(|t| match t {
            Token::Number {
                value,
                signed,
                negative,
            } => Some((*value, *signed, *negative)),
            Token::Hemisphere(_) => None,
        })
        .collect();

    if values.is_empty() || values.len() > 3 || values.len() != parts.len() {
        return Err(CoordsError::ComponentCount(parts.len()));
    }

    let (degrees, _, negative) = values[0];
    if values[1..].iter().any(|&(_, signed, _)| signed) {
        return Err(CoordsError::MisplacedSign);
    }
    if values.len() > 1 && degrees.fract() != 0.0 {
        return Err(CoordsError::FractionBeforeSubunit);
    }

    let mut total = degrees;
    if let Some(&(minutes, _, _)) = values.get(1) {
        if !(0.0..60.0).contains(&minutes) {
            return Err(CoordsError::SubunitOutOfRange {
                name: "minutes",
                value: minutes,
            });
        }
        if values.len() == 3 && minutes.fract() != 0.0 {
            return Err(CoordsError::FractionBeforeSubunit);
        }
        total += minutes / 60.0;
    }
    if let Some(&(seconds, _, _)) = values.get(2) {
        if !(0.0..60.0).contains(&seconds) {
            return Err(CoordsError::SubunitOutOfRange {
                name: "seconds",
                value: seconds,
            });
        }
        total += seconds / 3600.0;
    }

    Ok(if negative { -total } else { total })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: (f64, f64), expected: (f64, f64)) -> bool {
        (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9
    }

    #[test]
    fn test_decimal_degrees() {
        assert_eq!(parse_lat_lon("47.9990, 7.8421").unwrap(), (47.999, 7.8421));
        assert_eq!(parse_lat_lon("-33.5 -70.25").unwrap(), (-33.5, -70.25));
        assert_eq!(parse_lat_lon("+10;+20").unwrap(), (10.0, 20.0));
    }

    #[test]
    fn test_hemisphere_letters() {
        assert_eq!(parse_lat_lon("N 47.5 E 7.25").unwrap(), (47.5, 7.25));
        assert_eq!(parse_lat_lon("47.5N 7.25W").unwrap(), (47.5, -7.25));
        assert_eq!(parse_lat_lon("s 12.5 e 130").unwrap(), (-12.5, 130.0));
    }

    #[test]
    fn test_longitude_first_with_letters() {
        assert_eq!(parse_lat_lon("E 7.25 N 47.5").unwrap(), (47.5, 7.25));
    }

    #[test]
    fn test_degrees_minutes() {
        let parsed = parse_lat_lon("N 47 59.94 E 7 50.526").unwrap();
        assert!(close(parsed, (47.999, 7.8421)));
        assert!(close(parse_lat_lon("47 30, -7 15").unwrap(), (47.5, -7.25)));
    }

    #[test]
    fn test_degrees_minutes_seconds() {
        let parsed = parse_lat_lon("47°59'56.4\"N 7°50'31.56\"E").unwrap();
        assert!(close(parsed, (47.999, 7.8421)));
        let parsed = parse_lat_lon("47° 30′ 0″ S, 7° 15′ 0″ W").unwrap();
        assert!(close(parsed, (-47.5, -7.25)));
    }

    #[test]
    fn test_no_range_check() {
        assert_eq!(parse_lat_lon("1000,1000").unwrap(), (1000.0, 1000.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_lat_lon(""), Err(CoordsError::Empty));
        assert_eq!(parse_lat_lon("  , "), Err(CoordsError::Empty));
        assert!(matches!(
            parse_lat_lon("47.5 x 7.2"),
            Err(CoordsError::UnexpectedChar('x', 5))
        ));
        assert_eq!(parse_lat_lon("47.5"), Err(CoordsError::ComponentCount(1)));
        assert_eq!(
            parse_lat_lon("1 2 3"),
            Err(CoordsError::ComponentCount(3))
        );
        assert!(matches!(
            parse_lat_lon("1.2.3 4"),
            Err(CoordsError::MalformedNumber(_))
        ));
        assert_eq!(
            parse_lat_lon("N 47 N 7"),
            Err(CoordsError::ConflictingHemispheres('N', 'N'))
        );
        assert_eq!(
            parse_lat_lon("N -47 E 7"),
            Err(CoordsError::SignWithHemisphere)
        );
        assert_eq!(
            parse_lat_lon("N 47 7 E"),
            Err(CoordsError::MisplacedHemisphere)
        );
        assert!(matches!(
            parse_lat_lon("47 75 7 10"),
            Err(CoordsError::SubunitOutOfRange { name: "minutes", .. })
        ));
        assert_eq!(
            parse_lat_lon("47.5 30 7 15"),
            Err(CoordsError::FractionBeforeSubunit)
        );
    }
}
