// Forward-path behavior: layer evaluation, network chaining, shape failures.

use lamina::{ActivationFunction, Error, Layer, LossType, Matrix, Network};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn two_one_network() -> Network {
    let mut network = Network::new(LossType::Mse);
    network.add_layer(
        Layer::dense_from(
            Matrix::from_data(vec![vec![0.5, -0.25], vec![1.0, 0.75]]),
            Matrix::from_vec(vec![0.1, -0.2]),
        )
        .unwrap(),
    );
    network.add_layer(Layer::activation(2, ActivationFunction::Sigmoid));
    network.add_layer(
        Layer::dense_from(
            Matrix::from_data(vec![vec![0.3, -0.6]]),
            Matrix::from_vec(vec![0.05]),
        )
        .unwrap(),
    );
    network
}

#[test]
fn dense_evaluate_is_affine() {
    let layer = Layer::dense_from(
        Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        Matrix::from_vec(vec![0.5, -0.5]),
    )
    .unwrap();
    let y = layer.evaluate(&Matrix::from_vec(vec![1.0, 1.0])).unwrap();
    assert_eq!(y, Matrix::from_vec(vec![3.5, 6.5]));
}

#[test]
fn activation_layer_applies_the_function() {
    let layer = Layer::activation(3, ActivationFunction::ReLU);
    let y = layer
        .evaluate(&Matrix::from_vec(vec![-1.0, 0.0, 2.0]))
        .unwrap();
    assert_eq!(y, Matrix::from_vec(vec![0.0, 0.0, 2.0]));
}

#[test]
fn activation_layer_rejects_wrong_neuron_count() {
    let layer = Layer::activation(3, ActivationFunction::Tanh);
    assert!(matches!(
        layer.evaluate(&Matrix::from_vec(vec![1.0, 2.0])),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn run_chains_layers_with_known_values() {
    let network = two_one_network();
    let out = network.run(&Matrix::from_vec(vec![1.0, 2.0])).unwrap();

    let h0 = sigmoid(0.5 * 1.0 - 0.25 * 2.0 + 0.1);
    let h1 = sigmoid(1.0 * 1.0 + 0.75 * 2.0 - 0.2);
    let expected = 0.3 * h0 - 0.6 * h1 + 0.05;
    assert!(
        (out.data[0][0] - expected).abs() < 1e-12,
        "run output {} differs from hand-computed {expected}",
        out.data[0][0]
    );
}

#[test]
fn forward_propagation_matches_run() {
    let mut network = two_one_network();
    let input = Matrix::from_vec(vec![-0.3, 0.9]);
    let from_run = network.run(&input).unwrap();
    let from_forward = network.forward_propagation(&input).unwrap();
    assert_eq!(from_run, from_forward);
}

#[test]
fn run_on_an_empty_network_fails() {
    let network = Network::new(LossType::Mse);
    assert!(matches!(
        network.run(&Matrix::from_vec(vec![1.0])),
        Err(Error::EmptyNetwork)
    ));
}

#[test]
fn wrong_input_shape_fails_and_leaves_parameters_unchanged() {
    let network = two_one_network();
    let params_before: Vec<Matrix> = network
        .layers
        .iter()
        .flat_map(|layer| layer.params().into_iter().cloned())
        .collect();

    match network.run(&Matrix::from_vec(vec![1.0, 2.0, 3.0])) {
        Err(Error::DimensionMismatch { left, right }) => {
            assert_eq!(left, (3, 1));
            assert_eq!(right, (2, 1));
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }

    let params_after: Vec<Matrix> = network
        .layers
        .iter()
        .flat_map(|layer| layer.params().into_iter().cloned())
        .collect();
    assert_eq!(params_before, params_after);
}
