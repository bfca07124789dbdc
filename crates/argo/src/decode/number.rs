//! Number lexing.

use std::any::type_name;
use std::marker::PhantomData;

use super::{JsonReader, ValueDecoder};
use crate::decimal::Decimal;
use crate::error::{CodecError, Result};

/// What the caller is going to store the number in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberTarget {
    Integer,
    Float32,
    Float64,
    Fixed,
    /// Untyped: floats when a fraction is present, fixed-point otherwise.
    Any,
}

impl NumberTarget {
    fn is_float(self) -> bool {
        matches!(self, NumberTarget::Float32 | NumberTarget::Float64)
    }
}

/// Unsigned magnitude of a lexed number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    /// Plain digits, no fraction or exponent.
    Integer(u128),
    Fixed(Decimal),
    Float(f64),
}

/// A lexed JSON number with its sign kept apart, so `-0` survives for
/// floating targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    pub negative: bool,
    pub fraction: bool,
    pub magnitude: Magnitude,
}

impl Number {
    pub fn to_f64(&self) -> f64 {
        let value = match self.magnitude {
            Magnitude::Integer(m) => m as f64,
            Magnitude::Fixed(d) => d.to_f64(),
            Magnitude::Float(f) => f,
        };
        if self.negative {
            -value
        } else {
            value
        }
    }

    /// Integer value truncated toward zero.
    pub fn to_i128(&self) -> Option<i128> {
        let value = match self.magnitude {
            Magnitude::Integer(m) if self.negative => return 0i128.checked_sub_unsigned(m),
            Magnitude::Integer(m) => return i128::try_from(m).ok(),
            Magnitude::Fixed(d) => d.trunc(),
            Magnitude::Float(f) if f.is_finite() && f < 1.7e38 => f.trunc() as i128,
            Magnitude::Float(_) => return None,
        };
        Some(if self.negative { -value } else { value })
    }

    /// Integer value truncated toward zero, for unsigned targets.
    pub fn to_u128(&self) -> Option<u128> {
        match self.magnitude {
            Magnitude::Integer(m) if self.negative => (m == 0).then_some(0),
            Magnitude::Integer(m) => Some(m),
            _ => self.to_i128().and_then(|v| u128::try_from(v).ok()),
        }
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        match self.magnitude {
            Magnitude::Integer(_) => self.to_i128().map(Decimal::from),
            Magnitude::Fixed(d) if self.negative => d.checked_neg(),
            Magnitude::Fixed(d) => Some(d),
            Magnitude::Float(_) => self.to_f64().to_string().parse().ok(),
        }
    }
}

pub(super) struct NumberScan {
    pub start: usize,
    pub end: usize,
    pub negative: bool,
    /// Digits accumulated on the way, `None` after overflow.
    pub integer: Option<u128>,
    pub fraction: bool,
    pub exponent: bool,
}

impl JsonReader<'_> {
    /// Scans the shape of a number, accumulating the integer digits.
    pub(super) fn scan_number(&mut self) -> Result<NumberScan> {
        self.skip_whitespace();
        let negative = self.reader.read_if(|ch| ch == '-').is_some();
        let start = self.position();
        let mut integer = Some(0u128);
        let mut digits = 0usize;
        while let Some(ch) = self.reader.read_if(|ch| ch.is_ascii_digit()) {
            let digit = u128::from(ch as u8 - b'0');
            integer = integer.and_then(|v| v.checked_mul(10)?.checked_add(digit));
            digits += 1;
        }
        if digits == 0 {
            return Err(CodecError::malformed("a number", start));
        }
        let fraction = self.reader.read_if(|ch| ch == '.').is_some();
        if fraction {
            while self.reader.read_if(|ch| ch.is_ascii_digit()).is_some() {}
        }
        let exponent = self.reader.read_if(|ch| ch == 'e' || ch == 'E').is_some();
        if exponent {
            self.reader.read_if(|ch| ch == '+' || ch == '-');
            while self.reader.read_if(|ch| ch.is_ascii_digit()).is_some() {}
        }
        Ok(NumberScan {
            start,
            end: self.position(),
            negative,
            integer,
            fraction,
            exponent,
        })
    }

    /// Lexes a number for the given target.
    ///
    /// Plain integers are taken from the digits accumulated while scanning.
    /// Anything with a fraction or exponent, anything that overflowed, and
    /// every floating target goes through the interned text of the span.
    pub fn lex_number(&mut self, target: NumberTarget) -> Result<Number> {
        let scan = self.scan_number()?;
        let plain = !scan.fraction && !scan.exponent;
        if let (true, false, Some(value)) = (plain, target.is_float(), scan.integer) {
            return Ok(Number {
                negative: scan.negative,
                fraction: false,
                magnitude: Magnitude::Integer(value),
            });
        }

        let text = self.intern_span(scan.start, scan.end);
        let invalid = |reason: String| CodecError::InvalidNumber {
            offset: scan.start,
            reason,
        };
        let magnitude = match target {
            NumberTarget::Float32 => text
                .parse::<f32>()
                .map(|f| Magnitude::Float(f64::from(f)))
                .map_err(|e| invalid(e.to_string()))?,
            NumberTarget::Float64 => text
                .parse::<f64>()
                .map(Magnitude::Float)
                .map_err(|e| invalid(e.to_string()))?,
            NumberTarget::Any if scan.fraction => text
                .parse::<f64>()
                .map(Magnitude::Float)
                .map_err(|e| invalid(e.to_string()))?,
            NumberTarget::Any => match text.parse::<Decimal>() {
                Ok(d) => Magnitude::Fixed(d),
                Err(e) => text
                    .parse::<f64>()
                    .map(Magnitude::Float)
                    .map_err(|_| invalid(e.to_string()))?,
            },
            NumberTarget::Integer | NumberTarget::Fixed => text
                .parse::<Decimal>()
                .map(Magnitude::Fixed)
                .map_err(|e| invalid(e.to_string()))?,
        };
        Ok(Number {
            negative: scan.negative,
            fraction: scan.fraction,
            magnitude,
        })
    }
}

/// Decoder for a numeric leaf type.
pub struct NumberDecoder<T> {
    target: NumberTarget,
    convert: fn(&Number) -> Option<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> NumberDecoder<T> {
    pub fn new(target: NumberTarget, convert: fn(&Number) -> Option<T>) -> Self {
        Self {
            target,
            convert,
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> ValueDecoder<T> for NumberDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        reader.skip_whitespace();
        let offset = reader.position();
        let number = reader.lex_number(self.target)?;
        (self.convert)(&number).ok_or_else(|| CodecError::InvalidNumber {
            offset,
            reason: format!("out of range for {}", type_name::<T>()),
        })
    }
}

/// Decoder for `true` and `false`.
pub struct BoolDecoder;

impl ValueDecoder<bool> for BoolDecoder {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<bool> {
        if reader.try_consume_keyword("true") {
            Ok(true)
        } else if reader.try_consume_keyword("false") {
            Ok(false)
        } else {
            Err(CodecError::malformed("'true' or 'false'", reader.position()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DecodeOptions;
    use argo_buffers::TextEncoding;

    fn lex(text: &str, target: NumberTarget) -> Result<Number> {
        let mut reader = JsonReader::new(text.as_bytes(), TextEncoding::Utf8, DecodeOptions::default());
        reader.lex_number(target)
    }

    #[test]
    fn integers_take_the_fast_path() {
        let n = lex("123456789012345", NumberTarget::Integer).unwrap();
        assert_eq!(n.magnitude, Magnitude::Integer(123456789012345));
        assert_eq!(n.to_i128(), Some(123456789012345));
    }

    #[test]
    fn sign_is_reapplied() {
        assert_eq!(lex("-42", NumberTarget::Integer).unwrap().to_i128(), Some(-42));
        let zero = lex("-0", NumberTarget::Float64).unwrap().to_f64();
        assert_eq!(zero, 0.0);
        assert!(zero.is_sign_negative());
    }

    #[test]
    fn fractions_depend_on_target() {
        assert_eq!(
            lex("2.5", NumberTarget::Any).unwrap().magnitude,
            Magnitude::Float(2.5)
        );
        let fixed = lex("2.50", NumberTarget::Fixed).unwrap();
        assert_eq!(fixed.to_decimal().map(|d| d.to_string()), Some("2.50".to_owned()));
        let exp = lex("1e2", NumberTarget::Any).unwrap();
        assert!(!exp.fraction);
        assert_eq!(exp.to_i128(), Some(100));
    }

    #[test]
    fn overflow_falls_back_to_decimal_text() {
        let n = lex("170141183460469231731687303715884105727", NumberTarget::Integer).unwrap();
        assert_eq!(n.to_i128(), Some(i128::MAX));
        let min = lex("-170141183460469231731687303715884105728", NumberTarget::Integer).unwrap();
        assert_eq!(min.to_i128(), Some(i128::MIN));
        assert_eq!(min.to_u128(), None);
        let max = lex("340282366920938463463374607431768211455", NumberTarget::Integer).unwrap();
        assert_eq!(max.to_u128(), Some(u128::MAX));
        assert_eq!(max.to_i128(), None);
        assert_eq!(lex("-0", NumberTarget::Integer).unwrap().to_u128(), Some(0));
        let err = lex("1701411834604692317316873037158841057270", NumberTarget::Integer).unwrap_err();
        assert!(matches!(err, CodecError::InvalidNumber { .. }));
    }

    #[test]
    fn rejects_missing_digits() {
        assert!(matches!(
            lex("-x", NumberTarget::Integer),
            Err(CodecError::MalformedToken { offset: 1, .. })
        ));
        assert!(matches!(
            lex("1e+", NumberTarget::Float64),
            Err(CodecError::InvalidNumber { .. })
        ));
    }
}
