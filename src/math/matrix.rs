use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Dense 2D matrix of f64 values, row-major. Cloning copies the data;
/// no two owners ever share a mutable buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data,
        }
    }

    /// Builds an n×1 column matrix from a flat sequence.
    pub fn from_vec(values: Vec<f64>) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    /// Uniform initialization in [-1, 1).
    pub fn uniform<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        res.for_each_mut(|val, _, _| *val = rng.gen::<f64>() * 2.0 - 1.0);
        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal<R: Rng>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Uniform Xavier (Glorot) initialization across ±sqrt(6 / (fan_in + fan_out)).
    ///
    /// Shape: (rows, cols). `cols` is the fan-in, `rows` the fan-out.
    pub fn xavier_uniform<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / (rows + cols) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        res.for_each_mut(|val, _, _| *val = rng.gen::<f64>() * 2.0 * limit - limit);
        res
    }

    /// Normal Xavier (Glorot) initialization: N(0, sqrt(2 / (fan_in + fan_out))).
    ///
    /// Keeps the variance of activations and gradients roughly equal across
    /// layers; recommended before sigmoid/tanh layers.
    pub fn xavier_normal<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / (rows + cols) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        res.for_each_mut(|val, _, _| *val = Matrix::sample_standard_normal(rng) * std_dev);
        res
    }

    /// Uniform He initialization across ±sqrt(6 / fan_in).
    pub fn he_uniform<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        res.for_each_mut(|val, _, _| *val = rng.gen::<f64>() * 2.0 * limit - limit);
        res
    }

    /// Normal He initialization: N(0, sqrt(2 / fan_in)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    pub fn he_normal<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        res.for_each_mut(|val, _, _| *val = Matrix::sample_standard_normal(rng) * std_dev);
        res
    }

    pub fn same_size(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    fn check_same_size(&self, other: &Matrix) -> Result<()> {
        if !self.same_size(other) {
            return Err(Error::DimensionMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }
        Ok(())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix::from_data(
            (self.data)
                .clone()
                .into_iter()
                .map(|row| row.into_iter().map(|x| functor(x)).collect())
                .collect(),
        )
    }

    /// Visits every element mutably together with its row and column index.
    pub fn for_each_mut<F>(&mut self, mut func: F)
    where
        F: FnMut(&mut f64, usize, usize),
    {
        for i in 0..self.rows {
            for j in 0..self.cols {
                func(&mut self.data[i][j], i, j);
            }
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.for_each_mut(|val, _, _| *val = value);
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index]
    }

    pub fn col(&self, index: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[index]).collect()
    }

    pub fn max(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v))
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().flatten().any(|v| v.is_nan())
    }

    pub fn neg(&self) -> Matrix {
        self.map(|v| -v)
    }

    /// Element-wise addition; both operands must share a shape.
    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.check_same_size(rhs)?;
        let mut res = self.clone();
        res.for_each_mut(|val, i, j| *val += rhs.data[i][j]);
        Ok(res)
    }

    /// Element-wise subtraction; both operands must share a shape.
    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.check_same_size(rhs)?;
        let mut res = self.clone();
        res.for_each_mut(|val, i, j| *val -= rhs.data[i][j]);
        Ok(res)
    }

    /// Element-wise (Hadamard) product; both operands must share a shape.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.check_same_size(rhs)?;
        let mut res = self.clone();
        res.for_each_mut(|val, i, j| *val *= rhs.data[i][j]);
        Ok(res)
    }

    /// Element-wise division. Any divisor element that is exactly zero is
    /// reported as an error instead of producing an infinity.
    pub fn div(&self, rhs: &Matrix) -> Result<Matrix> {
        self.check_same_size(rhs)?;
        let mut res = Matrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                let divisor = rhs.data[i][j];
                if divisor == 0.0 {
                    return Err(Error::DivisionByZero);
                }
                res.data[i][j] = self.data[i][j] / divisor;
            }
        }
        Ok(res)
    }

    pub fn add_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v + scalar)
    }

    pub fn sub_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v - scalar)
    }

    pub fn mul_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v * scalar)
    }

    /// Scalar division; a zero divisor is an error, not an infinity.
    pub fn div_scalar(&self, scalar: f64) -> Result<Matrix> {
        if scalar == 0.0 {
            return Err(Error::DivisionByZero);
        }
        Ok(self.map(|v| v / scalar))
    }

    /// Element-wise scalar exponent.
    pub fn pow_scalar(&self, exponent: f64) -> Matrix {
        self.map(|v| v.powf(exponent))
    }

    /// Matrix product. Requires `self.cols == rhs.rows`. The summation runs
    /// over k in order for every output cell, so results are deterministic.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::DimensionMismatch {
                left: (self.rows, self.cols),
                right: (rhs.rows, rhs.cols),
            });
        }
        let mut res = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }
                res.data[i][j] = sum;
            }
        }
        Ok(res)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
