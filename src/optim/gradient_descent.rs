use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Plain gradient descent: θ ← θ − α · Ḡ.
///
/// `avg_grads` is the output of `Network::average_gradients`, indexed
/// [layer][parameter] in `Layer::params` order.
pub fn gradient_descent(
    network: &mut Network,
    avg_grads: &[Vec<Matrix>],
    learning_rate: f64,
) -> Result<()> {
    for (layer, grads) in network.layers.iter_mut().zip(avg_grads) {
        for (param, grad) in layer.params_mut().into_iter().zip(grads) {
            *param = param.sub(&grad.mul_scalar(learning_rate))?;
        }
    }
    Ok(())
}
