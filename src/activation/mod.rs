pub mod activation;

pub use activation::{softmax_derivative, ActivationFunction};
