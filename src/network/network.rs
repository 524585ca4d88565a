use std::io::{Read, Write};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::persist;

/// Ordered composition of layers plus everything that persists with them:
/// the loss selection, the trained-progress counters, and the optimizer
/// moment buffers (one matrix per trainable parameter, per buffer kind).
#[derive(Debug)]
pub struct Network {
    pub layers: Vec<Layer>,
    loss: LossType,
    /// Completed optimizer steps; persisted, never recomputed.
    pub iterations_trained: i32,
    /// Completed epochs; persisted, never recomputed.
    pub epochs_trained: i32,
    /// Momentum velocity, shaped like each layer's parameter set.
    pub(crate) velocity: Vec<Vec<Matrix>>,
    /// Adam first moment.
    pub(crate) first_moment: Vec<Vec<Matrix>>,
    /// Adam second moment.
    pub(crate) second_moment: Vec<Vec<Matrix>>,
}

impl Network {
    /// Creates an empty network; append layers with `add_layer`.
    pub fn new(loss: LossType) -> Network {
        Network {
            layers: Vec::new(),
            loss,
            iterations_trained: 0,
            epochs_trained: 0,
            velocity: Vec::new(),
            first_moment: Vec::new(),
            second_moment: Vec::new(),
        }
    }

    /// Appends a layer and allocates zeroed moment buffers matching its
    /// parameter shapes, keeping buffer shapes in lockstep with the
    /// architecture.
    pub fn add_layer(&mut self, layer: Layer) {
        let shapes: Vec<(usize, usize)> =
            layer.params().iter().map(|p| (p.rows, p.cols)).collect();
        let zeros = |shapes: &[(usize, usize)]| -> Vec<Matrix> {
            shapes.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect()
        };
        self.velocity.push(zeros(&shapes));
        self.first_moment.push(zeros(&shapes));
        self.second_moment.push(zeros(&shapes));
        self.layers.push(layer);
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn set_loss(&mut self, loss: LossType) {
        self.loss = loss;
    }

    /// Scalar loss of one prediction under the configured loss function.
    pub fn loss_value(&self, predicted: &Matrix, target: &Matrix) -> Result<f64> {
        self.loss.loss(predicted, target)
    }

    fn check_input(&self, input: &Matrix) -> Result<()> {
        let first = self.layers.first().ok_or(Error::EmptyNetwork)?;
        if input.rows != first.in_count() || input.cols != 1 {
            return Err(Error::DimensionMismatch {
                left: (input.rows, input.cols),
                right: (first.in_count(), 1),
            });
        }
        Ok(())
    }

    /// Pure inference: chains every layer's `evaluate`; no state retained.
    pub fn run(&self, input: &Matrix) -> Result<Matrix> {
        self.check_input(input)?;
        let mut current = input.clone();
        for layer in &self.layers {
            current = layer.evaluate(&current)?;
        }
        Ok(current)
    }

    /// Chains `forward` calls, leaving every layer's transient state
    /// populated for one subsequent `backward_propagation`.
    pub fn forward_propagation(&mut self, input: &Matrix) -> Result<Matrix> {
        self.check_input(input)?;
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Seeds the output gradient from the loss derivative and folds
    /// `backward` across layers from last to first, filling each layer's
    /// parameter gradients. Returns the gradient with respect to the input.
    ///
    /// A Softmax output layer combined with cross-entropy collapses to the
    /// fused gradient `predicted - target`; the softmax layer's own backward
    /// step is skipped so the Jacobian-free form is not applied on top.
    /// Softmax output with any other loss is rejected.
    pub fn backward_propagation(&mut self, predicted: &Matrix, target: &Matrix) -> Result<Matrix> {
        if self.layers.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        if !predicted.same_size(target) {
            return Err(Error::DimensionMismatch {
                left: (predicted.rows, predicted.cols),
                right: (target.rows, target.cols),
            });
        }

        let softmax_output = self
            .layers
            .last()
            .and_then(|layer| layer.activation_function())
            == Some(ActivationFunction::Softmax);

        let (mut delta, skip_output_layer) = if softmax_output {
            if self.loss != LossType::CrossEntropy {
                return Err(Error::UnsupportedPairing {
                    activation: ActivationFunction::Softmax.name(),
                    loss: self.loss.name(),
                });
            }
            (predicted.sub(target)?, true)
        } else {
            (self.loss.derivative(predicted, target)?, false)
        };

        let upper = self.layers.len() - usize::from(skip_output_layer);
        for layer in self.layers[..upper].iter_mut().rev() {
            delta = layer.backward(&delta)?;
        }
        Ok(delta)
    }

    /// Runs forward + backward for every (input, target) pair, accumulates
    /// each layer's parameter gradients and divides by the batch size. The
    /// result is indexed [layer][parameter] in `Layer::grads` order and is
    /// what the optimizer steps consume; it is recomputed per step, never
    /// cached across steps.
    pub fn average_gradients(&mut self, batch: &[(Matrix, Matrix)]) -> Result<Vec<Vec<Matrix>>> {
        if self.layers.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        let mut accumulated: Vec<Vec<Matrix>> = self
            .layers
            .iter()
            .map(|layer| {
                layer
                    .params()
                    .iter()
                    .map(|p| Matrix::zeros(p.rows, p.cols))
                    .collect()
            })
            .collect();

        for (input, target) in batch {
            let output = self.forward_propagation(input)?;
            self.backward_propagation(&output, target)?;
            for (layer, slots) in self.layers.iter().zip(accumulated.iter_mut()) {
                for (grad, slot) in layer.grads().into_iter().zip(slots.iter_mut()) {
                    *slot = slot.add(grad)?;
                }
            }
        }

        let size = batch.len() as f64;
        for slots in accumulated.iter_mut() {
            for slot in slots.iter_mut() {
                *slot = slot.div_scalar(size)?;
            }
        }
        Ok(accumulated)
    }

    /// Writes the whole network in the fixed binary layout: layer count,
    /// tagged layers, loss name, progress counters, then (optionally) the
    /// momentum velocity and Adam first/second moment buffers.
    pub fn save<W: Write>(&self, out: &mut W, include_training_state: bool) -> Result<()> {
        persist::write_i32(out, self.layers.len() as i32)?;
        for layer in &self.layers {
            layer.save(out)?;
        }
        persist::write_str(out, self.loss.name())?;
        persist::write_i32(out, self.iterations_trained)?;
        persist::write_i32(out, self.epochs_trained)?;
        persist::write_bool(out, include_training_state)?;
        if include_training_state {
            for buffers in [&self.velocity, &self.first_moment, &self.second_moment] {
                for layer_buffers in buffers {
                    for matrix in layer_buffers {
                        persist::write_matrix_values(out, matrix)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Reconstructs a network from a stream written by `save`. The
    /// architecture is decoded first so every following value is read
    /// against a known shape. A fresh network is built and returned; on any
    /// error nothing previously constructed is touched.
    pub fn load<R: Read>(input: &mut R) -> Result<Network> {
        let layer_count = persist::read_i32(input, "layer count")?;
        if layer_count < 0 {
            return Err(Error::CorruptStream(format!(
                "negative layer count {layer_count}"
            )));
        }

        let mut loaded = Vec::with_capacity(layer_count as usize);
        for _ in 0..layer_count {
            loaded.push(Layer::load(input)?);
        }

        let loss_name = persist::read_str(input, "loss function name")?;
        let loss = LossType::from_name(&loss_name)?;

        let mut network = Network::new(loss);
        for layer in loaded {
            network.add_layer(layer);
        }
        network.iterations_trained = persist::read_i32(input, "iterations trained")?;
        network.epochs_trained = persist::read_i32(input, "epochs trained")?;

        if persist::read_bool(input, "training state flag")? {
            let Network {
                velocity,
                first_moment,
                second_moment,
                ..
            } = &mut network;
            for buffers in [velocity, first_moment, second_moment] {
                for layer_buffers in buffers.iter_mut() {
                    for matrix in layer_buffers.iter_mut() {
                        persist::read_matrix_values(input, matrix, "optimizer state")?;
                    }
                }
            }
        }
        Ok(network)
    }
}
