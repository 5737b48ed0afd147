//! Closed set of page-drawing operators understood by the interpreter.

use serde::{Deserialize, Serialize};

/// A 2x3 affine matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    /// The identity matrix.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build from a slice of exactly six numbers.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    /// Full product `self × other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Vertical scale, falling back to the column length for rotated text.
    pub fn vertical_scale(&self) -> f32 {
        if self.d.abs() > f32::EPSILON {
            self.d
        } else {
            (self.b * self.b + self.d * self.d).sqrt()
        }
    }

    /// Check that every component is finite.
    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.e, self.f]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Font selection (`Tf`).
#[derive(Debug, Clone, PartialEq)]
pub struct SetFont {
    /// Font resource name on the page
    pub resource: String,
    /// Font size in text space
    pub size: f32,
}

/// Line move (`Td` / `TD`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveText {
    pub tx: f32,
    pub ty: f32,
    /// `TD` form: also sets leading to `-ty`
    pub set_leading: bool,
}

/// Glyph-run paint referencing one of the page's text items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowText {
    /// Index into the page's text items
    pub item: usize,
}

/// Image XObject paint (`Do`).
#[derive(Debug, Clone, PartialEq)]
pub struct PaintImage {
    /// Image resource name on the page
    pub resource: String,
}

/// One instruction of a page's drawing program.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `q`
    Save,
    /// `Q`
    Restore,
    /// `cm`
    Transform(Matrix),
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Tf`
    SetFont(SetFont),
    /// `TL`
    SetLeading(f32),
    /// `Tm`
    SetTextMatrix(Matrix),
    /// `Td` / `TD`
    MoveText(MoveText),
    /// `T*`
    NextLine,
    /// `Tj`, `TJ`, `'`, `"`
    ShowText(ShowText),
    /// `Do` on an image XObject
    PaintImage(PaintImage),
}

impl Operator {
    /// Content-stream mnemonic, for log messages.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Operator::Save => "q",
            Operator::Restore => "Q",
            Operator::Transform(_) => "cm",
            Operator::BeginText => "BT",
            Operator::EndText => "ET",
            Operator::SetFont(_) => "Tf",
            Operator::SetLeading(_) => "TL",
            Operator::SetTextMatrix(_) => "Tm",
            Operator::MoveText(m) if m.set_leading => "TD",
            Operator::MoveText(_) => "Td",
            Operator::NextLine => "T*",
            Operator::ShowText(_) => "Tj",
            Operator::PaintImage(_) => "Do",
        }
    }
}
