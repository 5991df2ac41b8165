//! Geometry primitives
//!
//! Lengths are stored as integer nanometres and angles as integer
//! micro-degrees so that the textual clipboard format round-trips exactly.
//! The textual form of both is a decimal number with up to six fractional
//! digits (millimetres resp. degrees).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

const FRACTION_DIGITS: u32 = 6;
const SCALE: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    #[error("Length must be positive: {0}")]
    NotPositive(String),
    #[error("Length must not be negative: {0}")]
    Negative(String),
}

/// Parse a decimal with at most six fractional digits into a scaled integer.
fn parse_fixed(s: &str) -> Result<i64, GeometryError> {
    let invalid = || GeometryError::InvalidNumber(s.to_string());
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac_part.len() > FRACTION_DIGITS as usize {
        return Err(invalid());
    }

    let int_value: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| GeometryError::OutOfRange(s.to_string()))?
    };
    let mut frac_value: i64 = if frac_part.is_empty() { 0 } else { frac_part.parse().map_err(|_| invalid())? };
    frac_value *= 10_i64.pow(FRACTION_DIGITS - frac_part.len() as u32);

    let magnitude = int_value
        .checked_mul(SCALE)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| GeometryError::OutOfRange(s.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Format a scaled integer with trailing zeros trimmed, keeping one
/// fractional digit (`1000000` -> `"1.0"`, `200000` -> `"0.2"`).
fn format_fixed(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let int_part = abs / SCALE as u64;
    let frac = format!("{:06}", abs % SCALE as u64);
    let trimmed = frac.trim_end_matches('0');
    let frac = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{}{}.{}", sign, int_part, frac)
}

/// A signed length in nanometres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Length(i64);

impl Length {
    pub const fn from_nm(nm: i64) -> Self {
        Self(nm)
    }

    pub const fn from_um(um: i64) -> Self {
        Self(um * 1_000)
    }

    pub const fn from_mm(mm: i64) -> Self {
        Self(mm * 1_000_000)
    }

    pub const fn to_nm(self) -> i64 {
        self.0
    }

    pub fn to_mm(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn to_mm_string(self) -> String {
        format_fixed(self.0)
    }

    /// `None` if the sum leaves the representable range.
    pub fn checked_add(self, rhs: Length) -> Option<Length> {
        self.0.checked_add(rhs.0).map(Length)
    }

    pub fn checked_sub(self, rhs: Length) -> Option<Length> {
        self.0.checked_sub(rhs.0).map(Length)
    }
}

impl FromStr for Length {
    type Err = GeometryError;

    /// Parses a millimetre value, e.g. `"0.2"` or `"-12.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s).map(Length)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_mm_string())
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Neg for Length {
    type Output = Length;

    fn neg(self) -> Length {
        Length(-self.0)
    }
}

/// A length strictly greater than zero (trace widths, via sizes, drills).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositiveLength(Length);

impl PositiveLength {
    pub fn new(length: Length) -> Result<Self, GeometryError> {
        if length.to_nm() > 0 {
            Ok(Self(length))
        } else {
            Err(GeometryError::NotPositive(length.to_mm_string()))
        }
    }

    pub fn get(self) -> Length {
        self.0
    }
}

impl FromStr for PositiveLength {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PositiveLength::new(s.parse()?)
    }
}

impl fmt::Display for PositiveLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A length greater than or equal to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnsignedLength(Length);

impl UnsignedLength {
    pub fn new(length: Length) -> Result<Self, GeometryError> {
        if length.to_nm() >= 0 {
            Ok(Self(length))
        } else {
            Err(GeometryError::Negative(length.to_mm_string()))
        }
    }

    pub fn get(self) -> Length {
        self.0
    }
}

impl FromStr for UnsignedLength {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnsignedLength::new(s.parse()?)
    }
}

impl fmt::Display for UnsignedLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A point on the board plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub const fn from_mm(x: i64, y: i64) -> Self {
        Self {
            x: Length::from_mm(x),
            y: Length::from_mm(y),
        }
    }

    pub fn checked_add(self, rhs: Point) -> Option<Point> {
        Some(Point::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    pub fn checked_sub(self, rhs: Point) -> Option<Point> {
        Some(Point::new(self.x.checked_sub(rhs.x)?, self.y.checked_sub(rhs.y)?))
    }

    /// The point moved by `offset`, or `None` if a coordinate overflows.
    pub fn checked_translated(self, offset: Point) -> Option<Point> {
        self.checked_add(offset)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An angle in micro-degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Angle(i64);

impl Angle {
    pub const fn from_micro_deg(udeg: i64) -> Self {
        Self(udeg)
    }

    pub const fn from_deg(deg: i64) -> Self {
        Self(deg * SCALE)
    }

    pub const fn to_micro_deg(self) -> i64 {
        self.0
    }

    pub fn to_deg_string(self) -> String {
        format_fixed(self.0)
    }
}

impl FromStr for Angle {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s).map(Angle)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_deg_string())
    }
}

/// A polygon/outline vertex. `angle` is the arc angle to the next vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Point,
    pub angle: Angle,
}

impl Vertex {
    pub fn new(pos: Point) -> Self {
        Self { pos, angle: Angle::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(pub Vec<Vertex>);

impl Path {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self(vertices)
    }

    /// Closed rectangle outline with its lower-left corner at `origin`.
    pub fn rect(origin: Point, width: Length, height: Length) -> Self {
        let corners = [
            origin,
            origin + Point::new(width, Length::default()),
            origin + Point::new(width, height),
            origin + Point::new(Length::default(), height),
            origin,
        ];
        Self(corners.into_iter().map(Vertex::new).collect())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.0
    }

    /// The path moved by `offset`, or `None` if any vertex overflows.
    pub fn checked_translated(&self, offset: Point) -> Option<Path> {
        self.0
            .iter()
            .map(|v| {
                Some(Vertex {
                    pos: v.pos.checked_translated(offset)?,
                    angle: v.angle,
                })
            })
            .collect::<Option<Vec<_>>>()
            .map(Path)
    }
}
