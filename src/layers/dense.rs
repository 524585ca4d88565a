use rand::Rng;
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::persist;

/// Fully-connected affine layer: y = W·x + B.
///
/// Weights are out×in, biases out×1; each parameter has a gradient matrix of
/// the same shape, filled in by `backward`. `last_input` is only valid
/// between a `forward` call and the matching `backward` call.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weights: Matrix,
    pub biases: Matrix,
    grad_weights: Matrix,
    grad_biases: Matrix,
    last_input: Matrix,
}

impl DenseLayer {
    /// Xavier-uniform weights, zero biases.
    pub fn new<R: Rng>(in_count: usize, out_count: usize, rng: &mut R) -> DenseLayer {
        DenseLayer {
            weights: Matrix::xavier_uniform(out_count, in_count, rng),
            biases: Matrix::zeros(out_count, 1),
            grad_weights: Matrix::zeros(out_count, in_count),
            grad_biases: Matrix::zeros(out_count, 1),
            last_input: Matrix::default(),
        }
    }

    pub(crate) fn zeroed(in_count: usize, out_count: usize) -> DenseLayer {
        DenseLayer {
            weights: Matrix::zeros(out_count, in_count),
            biases: Matrix::zeros(out_count, 1),
            grad_weights: Matrix::zeros(out_count, in_count),
            grad_biases: Matrix::zeros(out_count, 1),
            last_input: Matrix::default(),
        }
    }

    /// Builds a layer from explicit parameter matrices. The biases must be a
    /// column with as many rows as the weights.
    pub fn from_parts(weights: Matrix, biases: Matrix) -> Result<DenseLayer> {
        if biases.rows != weights.rows || biases.cols != 1 {
            return Err(Error::DimensionMismatch {
                left: (weights.rows, weights.cols),
                right: (biases.rows, biases.cols),
            });
        }
        Ok(DenseLayer {
            grad_weights: Matrix::zeros(weights.rows, weights.cols),
            grad_biases: Matrix::zeros(biases.rows, 1),
            last_input: Matrix::default(),
            weights,
            biases,
        })
    }

    pub fn in_count(&self) -> usize {
        self.weights.cols
    }

    pub fn out_count(&self) -> usize {
        self.weights.rows
    }

    pub fn params(&self) -> Vec<&Matrix> {
        vec![&self.weights, &self.biases]
    }

    pub fn params_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.weights, &mut self.biases]
    }

    pub fn grads(&self) -> Vec<&Matrix> {
        vec![&self.grad_weights, &self.grad_biases]
    }

    /// y = W·x + B, without touching any stored state.
    pub fn evaluate(&self, input: &Matrix) -> Result<Matrix> {
        self.weights.dot(input)?.add(&self.biases)
    }

    /// Same as `evaluate` but remembers the input for the backward pass.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        self.last_input = input.clone();
        self.evaluate(input)
    }

    /// dW = dy·xᵀ, dB = dy; returns dx = Wᵀ·dy.
    pub fn backward(&mut self, upstream: &Matrix) -> Result<Matrix> {
        self.grad_weights = upstream.dot(&self.last_input.transpose())?;
        self.grad_biases = upstream.clone();
        self.weights.transpose().dot(upstream)
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        persist::write_str(out, "Dense")?;
        persist::write_i32(out, self.in_count() as i32)?;
        persist::write_i32(out, self.out_count() as i32)?;
        persist::write_matrix_values(out, &self.weights)?;
        persist::write_matrix_values(out, &self.biases)?;
        Ok(())
    }

    /// The "Dense" type tag has already been consumed by `Layer::load`.
    pub(crate) fn load<R: Read>(input: &mut R) -> Result<DenseLayer> {
        let in_count = persist::read_i32(input, "dense layer input count")?;
        let out_count = persist::read_i32(input, "dense layer output count")?;
        if in_count < 0 || out_count < 0 {
            return Err(Error::CorruptStream(format!(
                "invalid dense layer shape {out_count}x{in_count}"
            )));
        }
        let mut layer = DenseLayer::zeroed(in_count as usize, out_count as usize);
        persist::read_matrix_values(input, &mut layer.weights, "dense layer weights")?;
        persist::read_matrix_values(input, &mut layer.biases, "dense layer biases")?;
        Ok(layer)
    }
}
