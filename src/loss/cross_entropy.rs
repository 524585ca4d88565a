use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() and the divisor to prevent log(0) and
/// division by zero.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(target[i] * ln(predicted[i] + eps))
    pub fn loss(predicted: &Matrix, target: &Matrix) -> Result<f64> {
        check_shapes(predicted, target)?;
        let mut sum = 0.0;
        for i in 0..predicted.rows {
            for j in 0..predicted.cols {
                sum -= target.data[i][j] * (predicted.data[i][j] + EPS).ln();
            }
        }
        Ok(sum)
    }

    /// Raw derivative: -target[i] / (predicted[i] + eps).
    ///
    /// Only used when the output activation is not Softmax; with a Softmax
    /// output the backward sweep takes the fused `predicted - target` path
    /// and this function is never consulted.
    pub fn derivative(predicted: &Matrix, target: &Matrix) -> Result<Matrix> {
        check_shapes(predicted, target)?;
        let mut res = Matrix::zeros(predicted.rows, predicted.cols);
        for i in 0..predicted.rows {
            for j in 0..predicted.cols {
                res.data[i][j] = -target.data[i][j] / (predicted.data[i][j] + EPS);
            }
        }
        Ok(res)
    }
}

fn check_shapes(predicted: &Matrix, target: &Matrix) -> Result<()> {
    if !predicted.same_size(target) {
        return Err(Error::DimensionMismatch {
            left: (predicted.rows, predicted.cols),
            right: (target.rows, target.cols),
        });
    }
    Ok(())
}
