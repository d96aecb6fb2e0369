//! Fixed-depth stack of transform matrices

use nalgebra::Matrix4;
use skyglass_core::{Error, Result};

/// Default number of slots in a [`TransformStack`]
pub const DEFAULT_STACK_DEPTH: usize = 16;

/// A bounded stack of saved transforms backed by an array and a fill index.
///
/// `push` stores a copy; `pop` hands it back. Popping an empty stack is
/// [`Error::StackUnderflow`] and pushing onto a full one is
/// [`Error::StackOverflow`].
#[derive(Debug, Clone)]
pub struct TransformStack<const N: usize = DEFAULT_STACK_DEPTH> {
    slots: [Matrix4<f32>; N],
    len: usize,
}

impl<const N: usize> TransformStack<N> {
    pub fn new() -> Self {
        Self {
            slots: [Matrix4::identity(); N],
            len: 0,
        }
    }

    pub fn push(&mut self, matrix: &Matrix4<f32>) -> Result<()> {
        if self.len == N {
            return Err(Error::StackOverflow { capacity: N });
        }
        self.slots[self.len] = *matrix;
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Matrix4<f32>> {
        if self.len == 0 {
            return Err(Error::StackUnderflow);
        }
        self.len -= 1;
        Ok(self.slots[self.len])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for TransformStack<N> {
    fn default() -> Self {
        Self::new()
    }
}
