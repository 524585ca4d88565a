use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - target)²) over the output rows.
    pub fn loss(predicted: &Matrix, target: &Matrix) -> Result<f64> {
        check_shapes(predicted, target)?;
        let n = target.rows as f64;
        let mut sum = 0.0;
        for i in 0..predicted.rows {
            for j in 0..predicted.cols {
                let diff = predicted.data[i][j] - target.data[i][j];
                sum += diff * diff;
            }
        }
        Ok(sum / n)
    }

    /// Per-output gradient: 2/n * (predicted - target).
    pub fn derivative(predicted: &Matrix, target: &Matrix) -> Result<Matrix> {
        check_shapes(predicted, target)?;
        let n = target.rows as f64;
        let mut res = Matrix::zeros(predicted.rows, predicted.cols);
        for i in 0..predicted.rows {
            for j in 0..predicted.cols {
                res.data[i][j] = 2.0 / n * (predicted.data[i][j] - target.data[i][j]);
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
