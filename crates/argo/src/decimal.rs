//! Fixed-point decimal numbers.
//!
//! [`Decimal`] is what the decoder produces for numbers that must not pass
//! through binary floating point: a signed 128-bit mantissa with a decimal
//! scale of at most [`MAX_SCALE`] digits.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Largest number of fractional digits a [`Decimal`] keeps.
pub const MAX_SCALE: u32 = 28;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    #[error("invalid decimal literal")]
    Invalid,
    #[error("decimal literal out of range")]
    Overflow,
}

/// A base-10 fixed-point number equal to `mantissa / 10^scale`.
///
/// Equality is numeric, so `1.5` and `1.50` compare equal, while
/// [`Display`](fmt::Display) keeps the scale the value was parsed with.
///
/// # Example
///
/// ```
/// use argo::Decimal;
///
/// let price: Decimal = "19.90".parse().unwrap();
/// assert_eq!(price.to_string(), "19.90");
/// assert_eq!(price, "1.99e1".parse().unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { mantissa: 0, scale: 0 };

    pub fn new(mantissa: i128, scale: u32) -> Option<Self> {
        (scale <= MAX_SCALE).then_some(Self { mantissa, scale })
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            mantissa: self.mantissa.checked_neg()?,
            scale: self.scale,
        })
    }

    /// Integer part, truncated toward zero.
    pub fn trunc(&self) -> i128 {
        self.mantissa / pow10(self.scale)
    }

    pub fn is_integral(&self) -> bool {
        self.mantissa % pow10(self.scale) == 0
    }

    /// Nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// The same value with trailing fractional zeros removed.
    pub fn normalized(self) -> Self {
        let mut value = self;
        while value.scale > 0 && value.mantissa % 10 == 0 {
            value.mantissa /= 10;
            value.scale -= 1;
        }
        value
    }
}

fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.mantissa == b.mantissa && a.scale == b.scale
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let value = self.normalized();
        value.mantissa.hash(state);
        value.scale.hash(state);
    }
}

macro_rules! decimal_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                fn from(value: $t) -> Self {
                    Decimal { mantissa: i128::from(value), scale: 0 }
                }
            }
        )*
    };
}

decimal_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes = text.as_bytes();
        let mut i = 0;
        let negative = match bytes.first() {
            Some(b'-') => {
                i = 1;
                true
            }
            Some(b'+') => {
                i = 1;
                false
            }
            _ => false,
        };

        // Significant digits, leading zeros dropped.
        let mut digits: Vec<u8> = Vec::with_capacity(bytes.len());
        let mut seen_digit = false;
        let mut fraction_digits: i64 = 0;
        while let Some(&b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
            seen_digit = true;
            if !(digits.is_empty() && b == b'0') {
                digits.push(b - b'0');
            }
            i += 1;
        }
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            while let Some(&b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
                seen_digit = true;
                if !(digits.is_empty() && b == b'0') {
                    digits.push(b - b'0');
                }
                fraction_digits += 1;
                i += 1;
            }
        }
        if !seen_digit {
            return Err(ParseDecimalError::Invalid);
        }

        let mut exponent: i64 = 0;
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            i += 1;
            let exp_negative = match bytes.get(i) {
                Some(b'-') => {
                    i += 1;
                    true
                }
                Some(b'+') => {
                    i += 1;
                    false
                }
                _ => false,
            };
            let start = i;
            while let Some(&b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
                exponent = exponent.saturating_mul(10).saturating_add(i64::from(b - b'0'));
                i += 1;
            }
            if i == start {
                return Err(ParseDecimalError::Invalid);
            }
            if exp_negative {
                exponent = -exponent;
            }
        }
        if i != bytes.len() {
            return Err(ParseDecimalError::Invalid);
        }

        let mut scale = fraction_digits.saturating_sub(exponent);
        let mut round_up = false;
        if scale > i64::from(MAX_SCALE) {
            let dropped = usize::try_from(scale - i64::from(MAX_SCALE)).unwrap_or(usize::MAX);
            if dropped <= digits.len() {
                let keep = digits.len() - dropped;
                round_up = digits[keep] >= 5;
                digits.truncate(keep);
            } else {
                digits.clear();
            }
            scale = i64::from(MAX_SCALE);
        }

        let mut mantissa: i128 = 0;
        for digit in digits {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit)))
                .ok_or(ParseDecimalError::Overflow)?;
        }
        if round_up {
            mantissa = mantissa.checked_add(1).ok_or(ParseDecimalError::Overflow)?;
        }
        if scale < 0 {
            if mantissa != 0 {
                let shift = u32::try_from(-scale).map_err(|_| ParseDecimalError::Overflow)?;
                mantissa = 10i128
                    .checked_pow(shift)
                    .and_then(|factor| mantissa.checked_mul(factor))
                    .ok_or(ParseDecimalError::Overflow)?;
            }
            scale = 0;
        }
        if negative {
            mantissa = -mantissa;
        }
        Ok(Decimal {
            mantissa,
            scale: scale as u32,
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}
