pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

pub(crate) mod persist;

// Convenience re-exports
pub use error::Error;
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{ActivationLayer, DenseLayer, Layer};
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use loss::loss_type::LossType;
pub use optim::OptimizerKind;
pub use train::epoch_stats::EpochStats;
pub use train::trainer::Trainer;
