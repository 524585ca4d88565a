use std::io::{Read, Write};

use crate::activation::activation::{softmax_derivative, ActivationFunction};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::persist;

/// Element-wise nonlinearity over a column of `count` neurons. Owns no
/// trainable parameters; `last_output` is only valid between a `forward`
/// call and the matching `backward` call.
#[derive(Debug, Clone)]
pub struct ActivationLayer {
    count: usize,
    function: ActivationFunction,
    last_output: Matrix,
}

impl ActivationLayer {
    pub fn new(count: usize, function: ActivationFunction) -> ActivationLayer {
        ActivationLayer {
            count,
            function,
            last_output: Matrix::default(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn function(&self) -> ActivationFunction {
        self.function
    }

    pub fn evaluate(&self, input: &Matrix) -> Result<Matrix> {
        if input.rows != self.count || input.cols != 1 {
            return Err(Error::DimensionMismatch {
                left: (input.rows, input.cols),
                right: (self.count, 1),
            });
        }
        Ok(self.function.apply(input))
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let output = self.evaluate(input)?;
        self.last_output = output.clone();
        Ok(output)
    }

    /// f'(lastOutput) ⊙ dy, or the Jacobian-free softmax form.
    pub fn backward(&mut self, upstream: &Matrix) -> Result<Matrix> {
        match self.function {
            ActivationFunction::Softmax => softmax_derivative(&self.last_output, upstream),
            function => function
                .derivative_from_output(&self.last_output)
                .hadamard(upstream),
        }
    }

    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        persist::write_str(out, "Activation")?;
        persist::write_i32(out, self.count as i32)?;
        persist::write_str(out, self.function.name())?;
        Ok(())
    }

    /// The "Activation" type tag has already been consumed by `Layer::load`.
    pub(crate) fn load<R: Read>(input: &mut R) -> Result<ActivationLayer> {
        let count = persist::read_i32(input, "activation layer neuron count")?;
        if count < 0 {
            return Err(Error::CorruptStream(format!(
                "invalid activation layer neuron count {count}"
            )));
        }
        let name = persist::read_str(input, "activation function name")?;
        let function = ActivationFunction::from_name(&name)?;
        Ok(ActivationLayer::new(count as usize, function))
    }
}
