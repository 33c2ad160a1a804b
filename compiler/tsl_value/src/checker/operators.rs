//! Operator and predefined-function semantics on concrete operands.
//!
//! Every function here is pure: operands arrive already folded and the
//! result is a new [`ValueKind`] or an [`OpError`] the checker reports at
//! the expression.

use std::cmp::Ordering;
use std::num::FpCategory;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::Span;

use crate::ustring::{UniversalChar, UniversalCharstring};
use crate::value::{BinaryOp, Builtin, UnaryOp, ValueKind, ValueTag};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct OpError {
    pub(crate) code: ErrorCode,
    pub(crate) message: String,
}

impl OpError {
    pub(crate) fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        OpError {
            code,
            message: message.into(),
        }
    }

    fn operand(op: &str, expected: &str, found: &ValueKind) -> Self {
        OpError::new(
            ErrorCode::E2001,
            format!(
                "operand of `{op}` must be {expected}, found {}",
                found.tag().describe()
            ),
        )
    }

    fn operands(op: &str, left: &ValueKind, right: &ValueKind) -> Self {
        OpError::new(
            ErrorCode::E2001,
            format!(
                "operands of `{op}` have incompatible kinds {} and {}",
                left.tag().describe(),
                right.tag().describe()
            ),
        )
    }

    fn range(func: Builtin, message: impl std::fmt::Display) -> Self {
        OpError::new(ErrorCode::E2005, format!("{}: {message}", func.name()))
    }

    pub(crate) fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(span, "in this expression")
    }
}

pub(crate) type OpResult = Result<ValueKind, OpError>;

// === String units ===

/// A string split into the units that indexing, `lengthof` and `substr`
/// count: bits, hex digits, octets or characters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Units {
    pub(crate) tag: ValueTag,
    pub(crate) units: Vec<u32>,
}

fn digit(c: char) -> u32 {
    c.to_digit(16).unwrap_or(0)
}

fn hex_char(value: u32) -> char {
    char::from_digit(value & 0xf, 16)
        .unwrap_or('0')
        .to_ascii_uppercase()
}

impl Units {
    pub(crate) fn of(kind: &ValueKind) -> Option<Units> {
        let (tag, units) = match kind {
            ValueKind::Bitstring(s) => (ValueTag::Bitstring, s.chars().map(digit).collect()),
            ValueKind::Hexstring(s) => (ValueTag::Hexstring, s.chars().map(digit).collect()),
            ValueKind::Octetstring(s) => {
                let digits: Vec<u32> = s.chars().map(digit).collect();
                let octets = digits.chunks(2).map(|pair| pair.iter().fold(0, |acc, d| acc * 16 + d));
                (ValueTag::Octetstring, octets.collect())
            }
            ValueKind::Charstring(s) => (ValueTag::Charstring, s.chars().map(u32::from).collect()),
            ValueKind::UniversalCharstring(s) => (
                ValueTag::UniversalCharstring,
                s.iter().map(UniversalChar::code_point).collect(),
            ),
            _ => return None,
        };
        Some(Units { tag, units })
    }

    pub(crate) fn len(&self) -> usize {
        self.units.len()
    }

    pub(crate) fn with_units(&self, units: impl IntoIterator<Item = u32>) -> ValueKind {
        let units = units.into_iter();
        match self.tag {
            ValueTag::Bitstring => ValueKind::Bitstring(units.map(|u| hex_char(u & 1)).collect()),
            ValueTag::Hexstring => ValueKind::Hexstring(units.map(hex_char).collect()),
            ValueTag::Octetstring => ValueKind::Octetstring(
                units
                    .flat_map(|u| [hex_char(u >> 4), hex_char(u)])
                    .collect(),
            ),
            ValueTag::Charstring => {
                ValueKind::Charstring(units.filter_map(char::from_u32).collect())
            }
            _ => ValueKind::UniversalCharstring(
                units.map(UniversalChar::from_code_point).collect(),
            ),
        }
    }

    /// One-unit substring at `index`.
    pub(crate) fn element(&self, index: usize) -> Option<ValueKind> {
        self.units.get(index).map(|&u| self.with_units([u]))
    }

    fn zero_filled(&self) -> bool {
        matches!(
            self.tag,
            ValueTag::Bitstring | ValueTag::Hexstring | ValueTag::Octetstring
        )
    }
}

fn count(op: &str, value: &ValueKind) -> Result<usize, OpError> {
    match value {
        ValueKind::Integer(n) if n.is_negative() => Err(OpError::new(
            ErrorCode::E2005,
            format!("the count of `{op}` must be non-negative, found {n}"),
        )),
        ValueKind::Integer(n) => Ok(n.to_usize().unwrap_or(usize::MAX)),
        other => Err(OpError::operand(op, "an integer", other)),
    }
}

// === Operators ===

pub(crate) fn unary(op: UnaryOp, operand: &ValueKind) -> OpResult {
    match (op, operand) {
        (UnaryOp::Plus, ValueKind::Integer(i)) => Ok(ValueKind::Integer(i.clone())),
        (UnaryOp::Plus, ValueKind::Real(r)) => Ok(ValueKind::Real(*r)),
        (UnaryOp::Minus, ValueKind::Integer(i)) => Ok(ValueKind::Integer(-i)),
        (UnaryOp::Minus, ValueKind::Real(r)) => Ok(ValueKind::Real(-r)),
        (UnaryOp::Plus | UnaryOp::Minus, other) => {
            Err(OpError::operand(op.as_str(), "an integer or float", other))
        }
        (UnaryOp::Not, ValueKind::Boolean(b)) => Ok(ValueKind::Boolean(!b)),
        (UnaryOp::Not, other) => Err(OpError::operand("not", "a boolean", other)),
        (UnaryOp::Not4b, other) => match Units::of(other) {
            Some(units) if units.zero_filled() => {
                let mask = match units.tag {
                    ValueTag::Bitstring => 0x1,
                    ValueTag::Hexstring => 0xf,
                    _ => 0xff,
                };
                Ok(units.with_units(units.units.iter().map(|u| !u & mask)))
            }
            _ => Err(OpError::operand(
                "not4b",
                "a bitstring, hexstring or octetstring",
                other,
            )),
        },
    }
}

pub(crate) fn arithmetic(op: BinaryOp, left: &ValueKind, right: &ValueKind) -> OpResult {
    match (left, right) {
        (ValueKind::Integer(a), ValueKind::Integer(b)) => {
            if matches!(op, BinaryOp::Divide | BinaryOp::Mod | BinaryOp::Rem) && b.is_zero() {
                return Err(OpError::new(
                    ErrorCode::E2002,
                    format!("integer division by zero in `{}`", op.as_str()),
                ));
            }
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Rem => a % b,
                _ => {
                    let modulus = b.abs();
                    let r = a % &modulus;
                    if r.is_negative() {
                        r + modulus
                    } else {
                        r
                    }
                }
            };
            Ok(ValueKind::Integer(result))
        }
        (ValueKind::Real(a), ValueKind::Real(b)) => match op {
            BinaryOp::Add => Ok(ValueKind::Real(a + b)),
            BinaryOp::Subtract => Ok(ValueKind::Real(a - b)),
            BinaryOp::Multiply => Ok(ValueKind::Real(a * b)),
            BinaryOp::Divide if b.classify() == FpCategory::Zero => Err(OpError::new(
                ErrorCode::E2002,
                "floating point division by zero",
            )),
            BinaryOp::Divide => Ok(ValueKind::Real(a / b)),
            _ => Err(OpError::operand(op.as_str(), "an integer", left)),
        },
        (ValueKind::Integer(_) | ValueKind::Real(_), ValueKind::Integer(_) | ValueKind::Real(_)) => {
            Err(OpError::operands(op.as_str(), left, right))
        }
        (ValueKind::Integer(_) | ValueKind::Real(_), other) | (other, _) => {
            Err(OpError::operand(op.as_str(), "an integer or float", other))
        }
    }
}

pub(crate) fn ordering_holds(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    match (op, ordering) {
        (_, None) => false,
        (BinaryOp::Less, Some(o)) => o.is_lt(),
        (BinaryOp::Greater, Some(o)) => o.is_gt(),
        (BinaryOp::LessEqual, Some(o)) => o.is_le(),
        (BinaryOp::GreaterEqual, Some(o)) => o.is_ge(),
        (_, Some(o)) => o.is_eq(),
    }
}

/// `< > <= >=` on numbers. Enumerated operands are ordered by the checker,
/// which knows the item order.
pub(crate) fn compare(op: BinaryOp, left: &ValueKind, right: &ValueKind) -> OpResult {
    let ordering = match (left, right) {
        (ValueKind::Integer(a), ValueKind::Integer(b)) => Some(a.cmp(b)),
        (ValueKind::Real(a), ValueKind::Real(b)) => a.partial_cmp(b),
        (ValueKind::Integer(_) | ValueKind::Real(_), ValueKind::Integer(_) | ValueKind::Real(_)) => {
            return Err(OpError::operands(op.as_str(), left, right));
        }
        (ValueKind::Integer(_) | ValueKind::Real(_), other) | (other, _) => {
            return Err(OpError::operand(
                op.as_str(),
                "an integer, float or enumerated value",
                other,
            ));
        }
    };
    Ok(ValueKind::Boolean(ordering_holds(op, ordering)))
}

pub(crate) fn logical(op: BinaryOp, left: &ValueKind, right: &ValueKind) -> OpResult {
    match (left, right) {
        (ValueKind::Boolean(a), ValueKind::Boolean(b)) => Ok(ValueKind::Boolean(match op {
            BinaryOp::And => *a && *b,
            BinaryOp::Or => *a || *b,
            _ => a ^ b,
        })),
        (ValueKind::Boolean(_), other) | (other, _) => {
            Err(OpError::operand(op.as_str(), "a boolean", other))
        }
    }
}

pub(crate) fn bitwise(op: BinaryOp, left: &ValueKind, right: &ValueKind) -> OpResult {
    let (Some(a), Some(b)) = (Units::of(left), Units::of(right)) else {
        return Err(OpError::operands(op.as_str(), left, right));
    };
    if !a.zero_filled() || a.tag != b.tag {
        return Err(OpError::operands(op.as_str(), left, right));
    }
    if a.len() != b.len() {
        return Err(OpError::new(
            ErrorCode::E2006,
            format!(
                "operands of `{}` must have the same length, found {} and {}",
                op.as_str(),
                a.len(),
                b.len()
            ),
        ));
    }
    let combined = a.units.iter().zip(&b.units).map(|(x, y)| match op {
        BinaryOp::And4b => x & y,
        BinaryOp::Or4b => x | y,
        _ => x ^ y,
    });
    Ok(a.with_units(combined))
}

pub(crate) fn shift(op: BinaryOp, left: &ValueKind, right: &ValueKind) -> OpResult {
    let units = match Units::of(left) {
        Some(units) if units.zero_filled() => units,
        _ => {
            return Err(OpError::operand(
                op.as_str(),
                "a bitstring, hexstring or octetstring",
                left,
            ))
        }
    };
    let n = count(op.as_str(), right)?.min(units.len());
    let len = units.len();
    let shifted: Vec<u32> = if op == BinaryOp::ShiftLeft {
        units.units[n..].iter().copied().chain(std::iter::repeat(0).take(n)).collect()
    } else {
        std::iter::repeat(0)
            .take(n)
            .chain(units.units[..len - n].iter().copied())
            .collect()
    };
    Ok(units.with_units(shifted))
}

pub(crate) fn rotate(op: BinaryOp, left: &ValueKind, right: &ValueKind) -> OpResult {
    let Some(units) = Units::of(left) else {
        return Err(OpError::operand(op.as_str(), "a string", left));
    };
    let n = count(op.as_str(), right)?;
    let mut rotated = units.units.clone();
    if !rotated.is_empty() {
        let n = n % rotated.len();
        if op == BinaryOp::RotateLeft {
            rotated.rotate_left(n);
        } else {
            rotated.rotate_right(n);
        }
    }
    Ok(units.with_units(rotated))
}

pub(crate) fn concat(left: &ValueKind, right: &ValueKind) -> OpResult {
    match (left, right) {
        (ValueKind::Bitstring(a), ValueKind::Bitstring(b)) => Ok(ValueKind::Bitstring(format!("{a}{b}"))),
        (ValueKind::Hexstring(a), ValueKind::Hexstring(b)) => Ok(ValueKind::Hexstring(format!("{a}{b}"))),
        (ValueKind::Octetstring(a), ValueKind::Octetstring(b)) => {
            Ok(ValueKind::Octetstring(format!("{a}{b}")))
        }
        (ValueKind::Charstring(a), ValueKind::Charstring(b)) => Ok(ValueKind::Charstring(format!("{a}{b}"))),
        (ValueKind::UniversalCharstring(a), ValueKind::UniversalCharstring(b)) => {
            Ok(ValueKind::UniversalCharstring(a.concat(b)))
        }
        (ValueKind::Charstring(a), ValueKind::UniversalCharstring(b)) => Ok(
            ValueKind::UniversalCharstring(UniversalCharstring::from(a.as_str()).concat(b)),
        ),
        (ValueKind::UniversalCharstring(a), ValueKind::Charstring(b)) => Ok(
            ValueKind::UniversalCharstring(a.concat(&UniversalCharstring::from(b.as_str()))),
        ),
        _ => Err(OpError::operands("&", left, right)),
    }
}

// === Predefined functions ===

fn integer(func: Builtin, value: &ValueKind) -> Result<&BigInt, OpError> {
    match value {
        ValueKind::Integer(i) => Ok(i),
        other => Err(OpError::operand(func.name(), "an integer", other)),
    }
}

fn non_negative(func: Builtin, value: &ValueKind) -> Result<usize, OpError> {
    let i = integer(func, value)?;
    if i.is_negative() {
        return Err(OpError::range(func, format_args!("argument must be non-negative, found {i}")));
    }
    Ok(i.to_usize().unwrap_or(usize::MAX))
}

fn digits_of<'v>(func: Builtin, value: &'v ValueKind, tag: ValueTag) -> Result<&'v str, OpError> {
    match (value, tag) {
        (ValueKind::Bitstring(s), ValueTag::Bitstring)
        | (ValueKind::Hexstring(s), ValueTag::Hexstring)
        | (ValueKind::Octetstring(s), ValueTag::Octetstring)
        | (ValueKind::Charstring(s), ValueTag::Charstring) => Ok(s),
        (other, tag) => Err(OpError::operand(func.name(), tag.describe(), other)),
    }
}

fn pad_left(digits: &str, multiple: usize) -> String {
    let missing = (multiple - digits.len() % multiple) % multiple;
    let mut padded = "0".repeat(missing);
    padded.push_str(digits);
    padded
}

pub(crate) fn bits_to_hex(bits: &str) -> String {
    pad_left(bits, 4)
        .as_bytes()
        .chunks(4)
        .map(|nibble| hex_char(nibble.iter().fold(0, |acc, b| acc * 2 + u32::from(b - b'0'))))
        .collect()
}

fn hex_to_bits(hex: &str) -> String {
    hex.chars().map(|c| format!("{:04b}", digit(c))).collect()
}

fn radix_value(digits: &str, radix: u32) -> BigInt {
    BigInt::parse_bytes(digits.as_bytes(), radix).unwrap_or_default()
}

/// Longest digit string `int2bit`, `int2hex` and `int2oct` produce.
const MAX_FIXED_WIDTH: usize = 1 << 24;

/// `value` in `radix`, left-padded to `width` digits.
fn fixed_width(func: Builtin, value: &BigInt, radix: u32, width: usize) -> Result<String, OpError> {
    if width > MAX_FIXED_WIDTH {
        return Err(OpError::range(
            func,
            format_args!("length {width} exceeds the limit of {MAX_FIXED_WIDTH} digits"),
        ));
    }
    let digits = if value.is_zero() {
        String::new()
    } else {
        value.to_str_radix(radix).to_ascii_uppercase()
    };
    if digits.len() > width {
        return Err(OpError::range(
            func,
            format_args!("value {value} does not fit in {width} digits"),
        ));
    }
    Ok(format!("{}{digits}", "0".repeat(width - digits.len())))
}

fn single_char(func: Builtin, value: &ValueKind) -> Result<u32, OpError> {
    let code = match value {
        ValueKind::Charstring(s) if s.chars().count() == 1 => s.chars().next().map(u32::from),
        ValueKind::UniversalCharstring(s) if s.len() == 1 && func == Builtin::Unichar2Int => {
            s.get(0).map(UniversalChar::code_point)
        }
        ValueKind::Charstring(_) | ValueKind::UniversalCharstring(_) => None,
        other => return Err(OpError::operand(func.name(), "a single character", other)),
    };
    code.ok_or_else(|| OpError::range(func, "argument must be exactly one character long"))
}

fn parse_integer(text: &str) -> Option<BigInt> {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

pub(crate) fn builtin(func: Builtin, args: &[&ValueKind]) -> OpResult {
    let [first, rest @ ..] = args else {
        return Err(OpError::new(
            ErrorCode::E2001,
            format!("`{}` expects {} arguments", func.name(), func.arity()),
        ));
    };
    if args.len() != func.arity() {
        return Err(OpError::new(
            ErrorCode::E2001,
            format!(
                "`{}` expects {} arguments, found {}",
                func.name(),
                func.arity(),
                args.len()
            ),
        ));
    }

    match func {
        Builtin::Bit2Hex => Ok(ValueKind::Hexstring(bits_to_hex(digits_of(func, first, ValueTag::Bitstring)?))),
        Builtin::Bit2Oct => {
            let bits = digits_of(func, first, ValueTag::Bitstring)?;
            Ok(ValueKind::Octetstring(bits_to_hex(&pad_left(bits, 8))))
        }
        Builtin::Bit2Int => Ok(ValueKind::Integer(radix_value(digits_of(func, first, ValueTag::Bitstring)?, 2))),
        Builtin::Bit2Str => Ok(ValueKind::Charstring(digits_of(func, first, ValueTag::Bitstring)?.to_owned())),
        Builtin::Hex2Bit => Ok(ValueKind::Bitstring(hex_to_bits(digits_of(func, first, ValueTag::Hexstring)?))),
        Builtin::Hex2Oct => Ok(ValueKind::Octetstring(pad_left(digits_of(func, first, ValueTag::Hexstring)?, 2))),
        Builtin::Hex2Int => Ok(ValueKind::Integer(radix_value(digits_of(func, first, ValueTag::Hexstring)?, 16))),
        Builtin::Hex2Str => Ok(ValueKind::Charstring(digits_of(func, first, ValueTag::Hexstring)?.to_owned())),
        Builtin::Oct2Bit => Ok(ValueKind::Bitstring(hex_to_bits(digits_of(func, first, ValueTag::Octetstring)?))),
        Builtin::Oct2Hex => Ok(ValueKind::Hexstring(digits_of(func, first, ValueTag::Octetstring)?.to_owned())),
        Builtin::Oct2Int => Ok(ValueKind::Integer(radix_value(digits_of(func, first, ValueTag::Octetstring)?, 16))),
        Builtin::Oct2Str => Ok(ValueKind::Charstring(digits_of(func, first, ValueTag::Octetstring)?.to_owned())),
        Builtin::Oct2Char => {
            digits_of(func, first, ValueTag::Octetstring)?;
            let octets = Units::of(first).map(|u| u.units).unwrap_or_default();
            if let Some(high) = octets.iter().find(|&&o| o > 127) {
                return Err(OpError::range(
                    func,
                    format_args!("octet {high:02X} is not a valid character"),
                ));
            }
            Ok(ValueKind::Charstring(octets.into_iter().filter_map(char::from_u32).collect()))
        }
        Builtin::Char2Oct => {
            let text = digits_of(func, first, ValueTag::Charstring)?;
            let mut hex = String::with_capacity(text.len() * 2);
            for c in text.chars() {
                let code = u32::from(c);
                if code > 255 {
                    return Err(OpError::range(func, format_args!("character `{c}` does not fit in an octet")));
                }
                hex.push(hex_char(code >> 4));
                hex.push(hex_char(code));
            }
            Ok(ValueKind::Octetstring(hex))
        }
        Builtin::Int2Char => {
            let i = integer(func, first)?;
            match i.to_u8().filter(|b| *b <= 127) {
                Some(b) => Ok(ValueKind::Charstring(char::from(b).to_string())),
                None => Err(OpError::range(func, format_args!("argument must be in range 0..127, found {i}"))),
            }
        }
        Builtin::Char2Int | Builtin::Unichar2Int => {
            Ok(ValueKind::Integer(BigInt::from(single_char(func, first)?)))
        }
        Builtin::Int2Unichar => {
            let i = integer(func, first)?;
            match i.to_u32().filter(|c| *c <= 0x7fff_ffff) {
                Some(code) => Ok(ValueKind::UniversalCharstring(
                    [UniversalChar::from_code_point(code)].into_iter().collect(),
                )),
                None => Err(OpError::range(
                    func,
                    format_args!("argument must be in range 0..2147483647, found {i}"),
                )),
            }
        }
        Builtin::Int2Str => Ok(ValueKind::Charstring(integer(func, first)?.to_string())),
        Builtin::Str2Int => {
            let text = digits_of(func, first, ValueTag::Charstring)?;
            parse_integer(text).map(ValueKind::Integer).ok_or_else(|| {
                OpError::new(
                    ErrorCode::E2008,
                    format!("str2int: `{text}` is not a valid integer"),
                )
            })
        }
        Builtin::Int2Float => {
            let i = integer(func, first)?;
            let value = i.to_f64().unwrap_or(if i.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
            Ok(ValueKind::Real(value))
        }
        Builtin::Float2Int => match first {
            ValueKind::Real(r) => BigInt::from_f64(r.trunc())
                .filter(|_| r.is_finite())
                .map(ValueKind::Integer)
                .ok_or_else(|| OpError::range(func, format_args!("argument must be finite, found {r}"))),
            other => Err(OpError::operand(func.name(), "a float", other)),
        },
        Builtin::Int2Bit | Builtin::Int2Hex | Builtin::Int2Oct => {
            let value = integer(func, first)?;
            if value.is_negative() {
                return Err(OpError::range(func, format_args!("value must be non-negative, found {value}")));
            }
            let length = non_negative(func, rest[0])?;
            Ok(match func {
                Builtin::Int2Bit => ValueKind::Bitstring(fixed_width(func, value, 2, length)?),
                Builtin::Int2Hex => ValueKind::Hexstring(fixed_width(func, value, 16, length)?),
                _ => ValueKind::Octetstring(fixed_width(func, value, 16, length.saturating_mul(2))?),
            })
        }
        Builtin::Lengthof => match Units::of(first) {
            Some(units) => Ok(ValueKind::Integer(BigInt::from(units.len()))),
            None => match first.list_values() {
                Some(values) if !values.is_indexed() => Ok(ValueKind::Integer(BigInt::from(values.len()))),
                _ => Err(OpError::operand(func.name(), "a string or a list", first)),
            },
        },
        Builtin::Substr => {
            let Some(units) = Units::of(first) else {
                return Err(OpError::operand(func.name(), "a string", first));
            };
            let index = non_negative(func, rest[0])?;
            let length = non_negative(func, rest[1])?;
            match index.checked_add(length).filter(|end| *end <= units.len()) {
                Some(end) => Ok(units.with_units(units.units[index..end].iter().copied())),
                None => Err(OpError::new(
                    ErrorCode::E2007,
                    format!(
                        "substr: index {index} plus length {length} exceeds the string length {}",
                        units.len()
                    ),
                )),
            }
        }
    }
}
