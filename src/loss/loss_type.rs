use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;

/// Selects which loss function the network trains against.
///
/// - `Mse`          — Mean-squared error; pair with any element-wise output
///   activation.
/// - `CrossEntropy` — Categorical cross-entropy; pair with a Softmax output
///   layer, where the backward sweep collapses the combined gradient to
///   `predicted - target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
}

impl LossType {
    /// Name used at the serialization boundary.
    pub fn name(&self) -> &'static str {
        match self {
            LossType::Mse => "mse",
            LossType::CrossEntropy => "cce",
        }
    }

    pub fn from_name(name: &str) -> Result<LossType> {
        match name {
            "mse" => Ok(LossType::Mse),
            "cce" => Ok(LossType::CrossEntropy),
            other => Err(Error::UnknownFunctionName(other.to_string())),
        }
    }

    /// Scalar loss for one sample.
    pub fn loss(&self, predicted: &Matrix, target: &Matrix) -> Result<f64> {
        match self {
            LossType::Mse => MseLoss::loss(predicted, target),
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, target),
        }
    }

    /// Gradient of the loss with respect to the prediction.
    pub fn derivative(&self, predicted: &Matrix, target: &Matrix) -> Result<Matrix> {
        match self {
            LossType::Mse => MseLoss::derivative(predicted, target),
            LossType::CrossEntropy => CrossEntropyLoss::derivative(predicted, target),
        }
    }
}
