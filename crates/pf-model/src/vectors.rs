//! Per-degree-of-freedom vectors ordered by the equation index convention.
//!
//! An `EqVector` holds amounts (or balances), a `RateVector` holds rates and
//! `PrimaryVariables` holds the unknowns of one degree of freedom. They share
//! a representation but are distinct types so a rate cannot silently be
//! added to an amount.

use nalgebra::DVector;
use std::marker::PhantomData;
use std::ops::{AddAssign, Index, IndexMut, MulAssign, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primary {}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationVector<K> {
    values: DVector<f64>,
    _kind: PhantomData<K>,
}

pub type EqVector = EquationVector<Amount>;
pub type RateVector = EquationVector<Rate>;
pub type PrimaryVariables = EquationVector<Primary>;

/// Local residual of one element: one `EqVector` per sub-control volume.
pub type LocalBlockVector = Vec<EqVector>;

impl<K> EquationVector<K> {
    pub fn zeros(len: usize) -> Self {
        Self {
            values: DVector::zeros(len),
            _kind: PhantomData,
        }
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            values: DVector::from_vec(values),
            _kind: PhantomData,
        }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self {
            values: DVector::from_column_slice(values),
            _kind: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    pub fn fill(&mut self, value: f64) {
        self.values.fill(value);
    }

    pub fn max_abs(&self) -> f64 {
        self.values.amax()
    }
}

impl EqVector {
    /// Accumulate `rate * scale` into this balance.
    pub fn add_rate(&mut self, rate: &RateVector, scale: f64) {
        debug_assert_eq!(self.len(), rate.len());
        self.values.axpy(scale, &rate.values, 1.0);
    }
}

impl<K> Index<usize> for EquationVector<K> {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

impl<K> IndexMut<usize> for EquationVector<K> {
    fn index_mut(&mut self, idx: usize) -> &mut f64 {
        &mut self.values[idx]
    }
}

impl<K> AddAssign<&EquationVector<K>> for EquationVector<K> {
    fn add_assign(&mut self, rhs: &EquationVector<K>) {
        self.values += &rhs.values;
    }
}

impl<K> SubAssign<&EquationVector<K>> for EquationVector<K> {
    fn sub_assign(&mut self, rhs: &EquationVector<K>) {
        self.values -= &rhs.values;
    }
}

impl<K> MulAssign<f64> for EquationVector<K> {
    fn mul_assign(&mut self, rhs: f64) {
        self.values *= rhs;
    }
}
