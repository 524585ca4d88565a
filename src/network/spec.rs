use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::layers::Layer;
use crate::loss::loss_type::LossType;
use crate::network::network::Network;

/// Describes one layer in a network specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerSpec {
    /// Affine layer mapping `inputs` neurons to `outputs` neurons.
    Dense { inputs: usize, outputs: usize },
    /// Element-wise nonlinearity over `neurons` neurons.
    Activation {
        neurons: usize,
        function: ActivationFunction,
    },
}

/// A fully serializable description of a network architecture plus its
/// training loss type.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights, making it possible to store architecture configurations
/// before training starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Loss function to pair with this network during training.
    pub loss: LossType,
}

impl NetworkSpec {
    /// Builds a freshly initialized network matching this description.
    /// Dense layers get Xavier-uniform weights drawn from `rng`.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Network {
        let mut network = Network::new(self.loss);
        for spec in &self.layers {
            match spec {
                LayerSpec::Dense { inputs, outputs } => {
                    network.add_layer(Layer::dense(*inputs, *outputs, rng));
                }
                LayerSpec::Activation { neurons, function } => {
                    network.add_layer(Layer::activation(*neurons, *function));
                }
            }
        }
        network
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
