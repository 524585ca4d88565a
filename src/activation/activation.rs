use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Tanh,
    /// Softmax is a vector-valued activation applied to the whole column at
    /// once; it has no element-wise derivative. Its backward path goes
    /// through `softmax_derivative` (or collapses to `predicted - target`
    /// when the network pairs it with cross-entropy).
    Softmax,
}

impl ActivationFunction {
    /// Applies the activation to a whole matrix.
    pub fn apply(&self, input: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Sigmoid => input.map(|x| 1.0 / (1.0 + E.powf(-x))),
            ActivationFunction::ReLU => input.map(|x| if x > 0.0 { x } else { 0.0 }),
            ActivationFunction::Tanh => input.map(|x| x.tanh()),
            ActivationFunction::Softmax => {
                // Subtract the max for numerical stability; the output is unchanged.
                let max = input.max();
                let shifted = input.map(|x| E.powf(x - max));
                let sum = shifted.sum();
                shifted.map(|x| x / sum)
            }
        }
    }

    /// Element-wise derivative computed from the activation's own output:
    /// sigmoid'(x) = y * (1 - y), tanh'(x) = 1 - y², relu'(x) = [y > 0].
    ///
    /// For `Softmax` the layer routes through `softmax_derivative` instead;
    /// returning 1.0 here passes an upstream gradient through unchanged so
    /// the Jacobian is never double-applied.
    pub fn derivative_from_output(&self, output: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Sigmoid => output.map(|y| y * (1.0 - y)),
            ActivationFunction::ReLU => output.map(|y| if y > 0.0 { 1.0 } else { 0.0 }),
            ActivationFunction::Tanh => output.map(|y| 1.0 - y * y),
            ActivationFunction::Softmax => output.map(|_| 1.0),
        }
    }

    /// Name used at the serialization boundary.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Softmax => "softmax",
        }
    }

    pub fn from_name(name: &str) -> Result<ActivationFunction> {
        match name {
            "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "relu" => Ok(ActivationFunction::ReLU),
            "tanh" => Ok(ActivationFunction::Tanh),
            "softmax" => Ok(ActivationFunction::Softmax),
            other => Err(Error::UnknownFunctionName(other.to_string())),
        }
    }
}

/// Jacobian-free softmax gradient, valid for any upstream gradient `dy`:
///
///   grad = y ⊙ (dy − (yᵀ · dy))
///
/// `output` is the softmax output of the forward pass (a column), `upstream`
/// the gradient flowing back into it.
pub fn softmax_derivative(output: &Matrix, upstream: &Matrix) -> Result<Matrix> {
    let weighted = output.transpose().dot(upstream)?;
    output.hadamard(&upstream.sub_scalar(weighted.data[0][0]))
}
