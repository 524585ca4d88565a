use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Momentum update:
///   v ← β·v + (1−β)·Ḡ
///   θ ← θ − α·v
///
/// The velocity buffers live in the network so they persist with it.
pub fn momentum(
    network: &mut Network,
    avg_grads: &[Vec<Matrix>],
    learning_rate: f64,
    beta: f64,
) -> Result<()> {
    let Network {
        layers, velocity, ..
    } = network;
    for ((layer, layer_velocity), grads) in
        layers.iter_mut().zip(velocity.iter_mut()).zip(avg_grads)
    {
        for ((param, v), grad) in layer
            .params_mut()
            .into_iter()
            .zip(layer_velocity.iter_mut())
            .zip(grads)
        {
            *v = v.mul_scalar(beta).add(&grad.mul_scalar(1.0 - beta))?;
            *param = param.sub(&v.mul_scalar(learning_rate))?;
        }
    }
    Ok(())
}
