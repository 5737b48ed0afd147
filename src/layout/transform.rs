//! Graphics transform stack.
//!
//! Only the scale and origin terms of `cm` are tracked: every stack entry
//! contributes its `a`/`d` multiplicatively and its `e`/`f` additively.
//! Shear and rotation terms are carried along but never composed.

use thiserror::Error;

use crate::parser::Matrix;

/// Anomalies reported by [`TransformState`]. Neither aborts a page.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    /// `Q` without a matching `q`
    #[error("restore without matching save")]
    Underflow,
    /// `cm` with NaN or infinite components
    #[error("non-finite transform ignored")]
    NonFinite,
}

/// Active transform plus save/restore stack.
#[derive(Debug, Clone)]
pub struct TransformState {
    /// Root entry first; `None` marks a save with no transform yet
    stack: Vec<Option<Matrix>>,
    active: Matrix,
}

impl TransformState {
    /// Start from the identity transform.
    pub fn new() -> Self {
        Self {
            stack: vec![Some(Matrix::IDENTITY)],
            active: Matrix::IDENTITY,
        }
    }

    /// The transform in effect.
    pub fn active(&self) -> Matrix {
        self.active
    }

    /// Number of open saves.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// `q`: push a placeholder.
    pub fn save(&mut self) {
        self.stack.push(None);
    }

    /// `cm`: fold `m` into the top entry.
    pub fn transform(&mut self, m: &Matrix) -> Result<(), TransformError> {
        if !m.is_finite() {
            return Err(TransformError::NonFinite);
        }
        let top = self.stack.last_mut().ok_or(TransformError::Underflow)?;
        *top = Some(match top.take() {
            Some(mut current) => {
                current.a *= m.a;
                current.d *= m.d;
                current.e += m.e;
                current.f += m.f;
                current
            }
            None => *m,
        });
        self.recompute();
        Ok(())
    }

    /// `Q`: pop one entry and recompute the active transform.
    pub fn restore(&mut self) -> Result<(), TransformError> {
        if self.stack.len() <= 1 {
            return Err(TransformError::Underflow);
        }
        self.stack.pop();
        self.recompute();
        Ok(())
    }

    /// Map a text-space point to page space.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.active.a + self.active.e, y * self.active.d + self.active.f)
    }

    fn recompute(&mut self) {
        let mut active = Matrix::IDENTITY;
        for m in self.stack.iter().flatten() {
            active.a *= m.a;
            active.d *= m.d;
            active.e += m.e;
            active.f += m.f;
        }
        self.active = active;
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new()
    }
}
