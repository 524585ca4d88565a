use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Adam update:
///   m ← β1·m + (1−β1)·Ḡ
///   v ← β2·v + (1−β2)·Ḡ²
///   m̂ = m / (1 − β1^t),  v̂ = v / (1 − β2^t)
///   θ ← θ − α · m̂ / (√v̂ + ε)
///
/// t is the 1-based count of this update, taken from the network's
/// iteration counter before the caller increments it.
pub fn adam(
    network: &mut Network,
    avg_grads: &[Vec<Matrix>],
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
) -> Result<()> {
    let t = network.iterations_trained + 1;
    let c1 = 1.0 - beta1.powi(t);
    let c2 = 1.0 - beta2.powi(t);
    let Network {
        layers,
        first_moment,
        second_moment,
        ..
    } = network;
    for (((layer, layer_m), layer_v), grads) in layers
        .iter_mut()
        .zip(first_moment.iter_mut())
        .zip(second_moment.iter_mut())
        .zip(avg_grads)
    {
        for (((param, m), v), grad) in layer
            .params_mut()
            .into_iter()
            .zip(layer_m.iter_mut())
            .zip(layer_v.iter_mut())
            .zip(grads)
        {
            *m = m.mul_scalar(beta1).add(&grad.mul_scalar(1.0 - beta1))?;
            *v = v
                .mul_scalar(beta2)
                .add(&grad.pow_scalar(2.0).mul_scalar(1.0 - beta2))?;
            let m_hat = m.div_scalar(c1)?;
            let v_hat = v.div_scalar(c2)?;
            let update = m_hat.div(&v_hat.pow_scalar(0.5).add_scalar(epsilon))?;
            *param = param.sub(&update.mul_scalar(learning_rate))?;
        }
    }
    Ok(())
}
