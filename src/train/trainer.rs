use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;

use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::{self, OptimizerKind};
use crate::train::epoch_stats::EpochStats;

/// Drives optimizer steps over a network and its sample set.
///
/// One step: average gradients over the current chunk → update moment
/// buffers → update parameters → increment the iteration counter → invoke
/// the iteration callback. After all chunks of one pass the epoch counter
/// increments and the epoch callback fires.
///
/// The trainer has no persisted state of its own; it is reconstructed per
/// run. Moment buffers live in the network so they survive save/load.
///
/// # Fields
/// - `learning_rate` — step size α for all three optimizers (default 0.001)
/// - `beta`          — momentum decay (default 0.9)
/// - `beta1`/`beta2` — Adam first/second moment decay (defaults 0.9, 0.999)
/// - `epsilon`       — Adam numerical-stability constant (default 1e-8)
/// - `chunk_size`    — samples per optimizer step; `None` means the whole
///   batch, a smaller value partitions it into contiguous chunks (the last
///   chunk may be shorter)
/// - `shuffle`       — permute sample order once per epoch (default true);
///   disable it, or construct via `with_seed`, for reproducible traces
pub struct Trainer<'a> {
    network: &'a mut Network,
    samples: &'a mut Vec<(Matrix, Matrix)>,
    pub learning_rate: f64,
    pub beta: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub chunk_size: Option<usize>,
    pub shuffle: bool,
    /// Invoked after every optimizer step with the updated global iteration
    /// count. Runs inline; must only observe.
    pub iteration_callback: Option<Box<dyn FnMut(i32) + 'a>>,
    /// Invoked after every completed epoch. Runs inline; must only observe.
    pub epoch_callback: Option<Box<dyn FnMut(&EpochStats) + 'a>>,
    rng: StdRng,
}

impl<'a> Trainer<'a> {
    /// A trainer with entropy-seeded shuffling. Use `with_seed` when the
    /// sample order has to be reproducible.
    pub fn new(network: &'a mut Network, samples: &'a mut Vec<(Matrix, Matrix)>) -> Trainer<'a> {
        Trainer::with_rng(network, samples, StdRng::from_entropy())
    }

    pub fn with_seed(
        network: &'a mut Network,
        samples: &'a mut Vec<(Matrix, Matrix)>,
        seed: u64,
    ) -> Trainer<'a> {
        Trainer::with_rng(network, samples, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        network: &'a mut Network,
        samples: &'a mut Vec<(Matrix, Matrix)>,
        rng: StdRng,
    ) -> Trainer<'a> {
        Trainer {
            network,
            samples,
            learning_rate: 0.001,
            beta: 0.9,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            chunk_size: None,
            shuffle: true,
            iteration_callback: None,
            epoch_callback: None,
            rng,
        }
    }

    /// Trains for `epochs` full passes over the sample set.
    pub fn train(&mut self, optimizer: OptimizerKind, epochs: usize) -> Result<()> {
        for epoch in 1..=epochs {
            let epoch_start = Instant::now();

            if self.shuffle {
                self.samples.shuffle(&mut self.rng);
            }

            let chunk = match self.chunk_size {
                Some(size) => size.max(1),
                None => self.samples.len().max(1),
            };

            let mut start = 0;
            while start < self.samples.len() {
                let end = (start + chunk).min(self.samples.len());
                let avg_grads = self.network.average_gradients(&self.samples[start..end])?;
                match optimizer {
                    OptimizerKind::GradientDescent => {
                        optim::gradient_descent(self.network, &avg_grads, self.learning_rate)?
                    }
                    OptimizerKind::Momentum => {
                        optim::momentum(self.network, &avg_grads, self.learning_rate, self.beta)?
                    }
                    OptimizerKind::Adam => optim::adam(
                        self.network,
                        &avg_grads,
                        self.learning_rate,
                        self.beta1,
                        self.beta2,
                        self.epsilon,
                    )?,
                }
                self.network.iterations_trained += 1;
                if let Some(callback) = self.iteration_callback.as_mut() {
                    callback(self.network.iterations_trained);
                }
                start = end;
            }

            self.network.epochs_trained += 1;
            if self.epoch_callback.is_some() {
                let train_loss = mean_loss(self.network, self.samples.as_slice())?;
                let stats = EpochStats {
                    epoch,
                    total_epochs: epochs,
                    train_loss,
                    elapsed_ms: epoch_start.elapsed().as_millis() as u64,
                };
                if let Some(callback) = self.epoch_callback.as_mut() {
                    callback(&stats);
                }
            }
        }
        Ok(())
    }
}

/// Mean loss over the full sample set, inference only.
fn mean_loss(network: &Network, samples: &[(Matrix, Matrix)]) -> Result<f64> {
    if samples.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for (input, target) in samples {
        let output = network.run(input)?;
        total += network.loss_value(&output, target)?;
    }
    Ok(total / samples.len() as f64)
}
