// Optimizer update rules, the trainer state machine, and the XOR
// convergence scenario.

use std::cell::Cell;

use rand::rngs::StdRng;
use rand::SeedableRng;

use lamina::{
    optim, ActivationFunction, Error, Layer, LossType, Matrix, Network, OptimizerKind, Trainer,
};

fn single_weight_network(weight: f64) -> Network {
    let mut network = Network::new(LossType::Mse);
    network.add_layer(
        Layer::dense_from(
            Matrix::from_data(vec![vec![weight]]),
            Matrix::from_vec(vec![0.0]),
        )
        .unwrap(),
    );
    network
}

fn weight_of(network: &Network) -> f64 {
    network.layers[0].params()[0].data[0][0]
}

fn xor_samples() -> Vec<(Matrix, Matrix)> {
    vec![
        (Matrix::from_vec(vec![0.0, 0.0]), Matrix::from_vec(vec![0.0])),
        (Matrix::from_vec(vec![0.0, 1.0]), Matrix::from_vec(vec![1.0])),
        (Matrix::from_vec(vec![1.0, 0.0]), Matrix::from_vec(vec![1.0])),
        (Matrix::from_vec(vec![1.0, 1.0]), Matrix::from_vec(vec![0.0])),
    ]
}

#[test]
fn gradient_descent_applies_theta_minus_alpha_gradient() {
    let mut network = single_weight_network(1.0);
    let avg = vec![vec![
        Matrix::from_data(vec![vec![2.0]]),
        Matrix::from_vec(vec![1.0]),
    ]];
    optim::gradient_descent(&mut network, &avg, 0.5).unwrap();
    assert_eq!(weight_of(&network), 0.0);
    assert_eq!(network.layers[0].params()[1].data[0][0], -0.5);
}

#[test]
fn momentum_accumulates_velocity_across_steps() {
    let mut network = single_weight_network(1.0);
    let avg = vec![vec![
        Matrix::from_data(vec![vec![1.0]]),
        Matrix::from_vec(vec![0.0]),
    ]];

    // v1 = 0.1, v2 = 0.9 * 0.1 + 0.1 = 0.19; with lr = 1 the weight walks
    // 1.0 -> 0.9 -> 0.71.
    optim::momentum(&mut network, &avg, 1.0, 0.9).unwrap();
    assert!((weight_of(&network) - 0.9).abs() < 1e-12);
    optim::momentum(&mut network, &avg, 1.0, 0.9).unwrap();
    assert!((weight_of(&network) - 0.71).abs() < 1e-12);
}

#[test]
fn adam_first_step_moves_by_about_the_learning_rate() {
    // With bias correction at t = 1, m̂ = g and v̂ = g², so the first update
    // is α · g/(|g| + ε) ≈ α · sign(g).
    let mut network = single_weight_network(1.0);
    let avg = vec![vec![
        Matrix::from_data(vec![vec![2.0]]),
        Matrix::from_vec(vec![0.0]),
    ]];
    optim::adam(&mut network, &avg, 0.5, 0.9, 0.999, 1e-8).unwrap();
    assert!(
        (weight_of(&network) - 0.5).abs() < 1e-6,
        "weight was {}",
        weight_of(&network)
    );
}

#[test]
fn trainer_counts_iterations_per_chunk_and_epochs_per_pass() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut network = Network::new(LossType::Mse);
    network.add_layer(Layer::dense(2, 2, &mut rng));
    network.add_layer(Layer::activation(2, ActivationFunction::Sigmoid));
    network.add_layer(Layer::dense(2, 1, &mut rng));

    let mut samples = xor_samples();

    let iteration_calls = Cell::new(0);
    let epoch_calls = Cell::new(0);
    let last_total = Cell::new(0);

    let mut trainer = Trainer::with_seed(&mut network, &mut samples, 17);
    trainer.chunk_size = Some(2);
    trainer.shuffle = false;
    trainer.learning_rate = 0.1;
    trainer.iteration_callback = Some(Box::new(|_| {
        iteration_calls.set(iteration_calls.get() + 1);
    }));
    trainer.epoch_callback = Some(Box::new(|stats| {
        epoch_calls.set(epoch_calls.get() + 1);
        last_total.set(stats.total_epochs);
        assert!(stats.train_loss.is_finite());
    }));
    trainer.train(OptimizerKind::GradientDescent, 3).unwrap();
    drop(trainer);

    // 4 samples in chunks of 2 -> 2 optimizer steps per epoch.
    assert_eq!(iteration_calls.get(), 6);
    assert_eq!(epoch_calls.get(), 3);
    assert_eq!(last_total.get(), 3);
    assert_eq!(network.iterations_trained, 6);
    assert_eq!(network.epochs_trained, 3);
}

#[test]
fn a_short_final_chunk_still_counts_as_a_step() {
    let mut rng = StdRng::seed_from_u64(19);
    let mut network = Network::new(LossType::Mse);
    network.add_layer(Layer::dense(2, 1, &mut rng));

    let mut samples = xor_samples();
    let mut trainer = Trainer::with_seed(&mut network, &mut samples, 19);
    trainer.chunk_size = Some(3);
    trainer.shuffle = false;
    trainer.train(OptimizerKind::GradientDescent, 1).unwrap();
    drop(trainer);

    // Chunks of 3 over 4 samples: one full chunk + one short chunk.
    assert_eq!(network.iterations_trained, 2);
}

#[test]
fn xor_converges_with_plain_gradient_descent() {
    // The canonical scenario: a 2-2-2-1 sigmoid network, learning rate 10,
    // 1000 full-batch gradient-descent iterations, no shuffling.
    let mut rng = StdRng::seed_from_u64(1);
    let mut network = Network::new(LossType::Mse);
    network.add_layer(Layer::dense(2, 2, &mut rng));
    network.add_layer(Layer::activation(2, ActivationFunction::Sigmoid));
    network.add_layer(Layer::dense(2, 2, &mut rng));
    network.add_layer(Layer::activation(2, ActivationFunction::Sigmoid));
    network.add_layer(Layer::dense(2, 1, &mut rng));
    network.add_layer(Layer::activation(1, ActivationFunction::Sigmoid));

    let mut samples = xor_samples();
    let mut trainer = Trainer::with_seed(&mut network, &mut samples, 1);
    trainer.learning_rate = 10.0;
    trainer.shuffle = false;
    trainer.train(OptimizerKind::GradientDescent, 1000).unwrap();
    drop(trainer);

    assert_eq!(network.iterations_trained, 1000);

    let mut total_loss = 0.0;
    let mut correct = 0;
    for (input, target) in &xor_samples() {
        let output = network.run(input).unwrap();
        total_loss += network.loss_value(&output, target).unwrap();
        let on_the_right_side = (output.data[0][0] > 0.5) == (target.data[0][0] > 0.5);
        if on_the_right_side {
            correct += 1;
        }
    }
    let mse = total_loss / 4.0;
    assert!(mse < 0.05, "final MSE {mse} did not drop below 0.05");
    assert!(correct >= 3, "only {correct} of 4 outputs on the correct side");
}

#[test]
fn seeded_training_with_shuffling_is_deterministic() {
    let build = || {
        let mut rng = StdRng::seed_from_u64(29);
        let mut network = Network::new(LossType::Mse);
        network.add_layer(Layer::dense(2, 3, &mut rng));
        network.add_layer(Layer::activation(3, ActivationFunction::Tanh));
        network.add_layer(Layer::dense(3, 1, &mut rng));
        network
    };

    let mut first = build();
    let mut second = build();

    let mut samples_a = xor_samples();
    let mut samples_b = xor_samples();

    let mut trainer = Trainer::with_seed(&mut first, &mut samples_a, 31);
    trainer.chunk_size = Some(1);
    trainer.learning_rate = 0.2;
    trainer.train(OptimizerKind::Momentum, 8).unwrap();
    drop(trainer);

    let mut trainer = Trainer::with_seed(&mut second, &mut samples_b, 31);
    trainer.chunk_size = Some(1);
    trainer.learning_rate = 0.2;
    trainer.train(OptimizerKind::Momentum, 8).unwrap();
    drop(trainer);

    for (input, _) in &xor_samples() {
        assert_eq!(first.run(input).unwrap(), second.run(input).unwrap());
    }
}

#[test]
fn average_gradients_averages_per_sample_gradients() {
    let mut rng = StdRng::seed_from_u64(41);
    let mut network = Network::new(LossType::Mse);
    network.add_layer(Layer::dense(2, 2, &mut rng));
    network.add_layer(Layer::activation(2, ActivationFunction::Sigmoid));
    network.add_layer(Layer::dense(2, 1, &mut rng));

    let samples = xor_samples();
    let batched = network.average_gradients(&samples).unwrap();

    let mut summed: Vec<Vec<Matrix>> = network
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
    for sample in &samples {
        let single = network
            .average_gradients(std::slice::from_ref(sample))
            .unwrap();
        for (acc, grads) in summed.iter_mut().zip(&single) {
            for (slot, grad) in acc.iter_mut().zip(grads) {
                *slot = slot.add(grad).unwrap();
            }
        }
    }

    for (layer_idx, (batch_grads, sum_grads)) in batched.iter().zip(&summed).enumerate() {
        for (param_idx, (batch_grad, sum_grad)) in
            batch_grads.iter().zip(sum_grads).enumerate()
        {
            let mean = sum_grad.div_scalar(samples.len() as f64).unwrap();
            for i in 0..mean.rows {
                for j in 0..mean.cols {
                    assert!(
                        (batch_grad.data[i][j] - mean.data[i][j]).abs() < 1e-12,
                        "batch average diverged at layer {layer_idx} param {param_idx} [{i},{j}]"
                    );
                }
            }
        }
    }
}

#[test]
fn average_gradients_on_an_empty_batch_is_a_division_by_zero() {
    let mut rng = StdRng::seed_from_u64(43);
    let mut network = Network::new(LossType::Mse);
    network.add_layer(Layer::dense(1, 1, &mut rng));
    assert!(matches!(
        network.average_gradients(&[]),
        Err(Error::DivisionByZero)
    ));
}

#[test]
fn training_an_empty_network_fails() {
    let mut network = Network::new(LossType::Mse);
    let mut samples = xor_samples();
    let mut trainer = Trainer::with_seed(&mut network, &mut samples, 47);
    assert!(matches!(
        trainer.train(OptimizerKind::GradientDescent, 1),
        Err(Error::EmptyNetwork)
    ));
}
