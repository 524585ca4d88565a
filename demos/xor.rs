use rand::rngs::StdRng;
use rand::SeedableRng;

use lamina::{ActivationFunction, Layer, LossType, Matrix, Network, OptimizerKind, Trainer};

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    let mut network = Network::new(LossType::Mse);
    network.add_layer(Layer::dense(2, 2, &mut rng));
    network.add_layer(Layer::activation(2, ActivationFunction::Sigmoid));
    network.add_layer(Layer::dense(2, 1, &mut rng));
    network.add_layer(Layer::activation(1, ActivationFunction::Sigmoid));

    let mut samples = vec![
        (Matrix::from_vec(vec![0.0, 0.0]), Matrix::from_vec(vec![0.0])),
        (Matrix::from_vec(vec![0.0, 1.0]), Matrix::from_vec(vec![1.0])),
        (Matrix::from_vec(vec![1.0, 0.0]), Matrix::from_vec(vec![1.0])),
        (Matrix::from_vec(vec![1.0, 1.0]), Matrix::from_vec(vec![0.0])),
    ];

    let mut trainer = Trainer::with_seed(&mut network, &mut samples, 7);
    trainer.learning_rate = 10.0;
    trainer.shuffle = false;
    trainer.epoch_callback = Some(Box::new(|stats| {
        if stats.epoch % 500 == 0 {
            println!("epoch {}: loss = {:.6}", stats.epoch, stats.train_loss);
        }
    }));
    trainer
        .train(OptimizerKind::GradientDescent, 2000)
        .expect("training failed");
    drop(trainer);

    for (input, target) in &samples {
        let output = network.run(input).expect("inference failed");
        println!(
            "{} ^ {} = {:.4} (expected {})",
            input.data[0][0], input.data[1][0], output.data[0][0], target.data[0][0]
        );
    }
}
