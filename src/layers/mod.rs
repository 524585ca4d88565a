pub mod dense;
pub mod activation;

pub use activation::ActivationLayer;
pub use dense::DenseLayer;

use rand::Rng;
use std::io::{Read, Write};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::persist;

/// Closed set of layer kinds. Every variant honors the same contract:
/// `evaluate` is pure, `forward` additionally stores the state `backward`
/// consumes, and `backward` fills the variant's parameter gradients and
/// returns the gradient for the previous layer. Callers must pair each
/// `forward` with exactly one `backward`.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(DenseLayer),
    Activation(ActivationLayer),
}

impl Layer {
    pub fn dense<R: Rng>(in_count: usize, out_count: usize, rng: &mut R) -> Layer {
        Layer::Dense(DenseLayer::new(in_count, out_count, rng))
    }

    pub fn dense_from(weights: Matrix, biases: Matrix) -> Result<Layer> {
        DenseLayer::from_parts(weights, biases).map(Layer::Dense)
    }

    pub fn activation(count: usize, function: ActivationFunction) -> Layer {
        Layer::Activation(ActivationLayer::new(count, function))
    }

    pub fn in_count(&self) -> usize {
        match self {
            Layer::Dense(layer) => layer.in_count(),
            Layer::Activation(layer) => layer.count(),
        }
    }

    pub fn out_count(&self) -> usize {
        match self {
            Layer::Dense(layer) => layer.out_count(),
            Layer::Activation(layer) => layer.count(),
        }
    }

    /// The activation tag for activation layers, None for dense layers.
    pub fn activation_function(&self) -> Option<ActivationFunction> {
        match self {
            Layer::Dense(_) => None,
            Layer::Activation(layer) => Some(layer.function()),
        }
    }

    /// Trainable parameters in a fixed order (dense: weights then biases).
    pub fn params(&self) -> Vec<&Matrix> {
        match self {
            Layer::Dense(layer) => layer.params(),
            Layer::Activation(_) => Vec::new(),
        }
    }

    pub fn params_mut(&mut self) -> Vec<&mut Matrix> {
        match self {
            Layer::Dense(layer) => layer.params_mut(),
            Layer::Activation(_) => Vec::new(),
        }
    }

    /// Gradients in the same order as `params`.
    pub fn grads(&self) -> Vec<&Matrix> {
        match self {
            Layer::Dense(layer) => layer.grads(),
            Layer::Activation(_) => Vec::new(),
        }
    }

    pub fn evaluate(&self, input: &Matrix) -> Result<Matrix> {
        match self {
            Layer::Dense(layer) => layer.evaluate(input),
            Layer::Activation(layer) => layer.evaluate(input),
        }
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        match self {
            Layer::Dense(layer) => layer.forward(input),
            Layer::Activation(layer) => layer.forward(input),
        }
    }

    pub fn backward(&mut self, upstream: &Matrix) -> Result<Matrix> {
        match self {
            Layer::Dense(layer) => layer.backward(upstream),
            Layer::Activation(layer) => layer.backward(upstream),
        }
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        match self {
            Layer::Dense(layer) => layer.save(out),
            Layer::Activation(layer) => layer.save(out),
        }
    }

    /// Factory loader: reads the type tag and dispatches to the variant.
    pub fn load<R: Read>(input: &mut R) -> Result<Layer> {
        let tag = persist::read_str(input, "layer type tag")?;
        match tag.as_str() {
            "Dense" => Ok(Layer::Dense(DenseLayer::load(input)?)),
            "Activation" => Ok(Layer::Activation(ActivationLayer::load(input)?)),
            other => Err(Error::CorruptStream(format!(
                "unknown layer type tag '{other}'"
            ))),
        }
    }
}
