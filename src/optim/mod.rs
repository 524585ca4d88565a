pub mod gradient_descent;
pub mod momentum;
pub mod adam;

pub use adam::adam;
pub use gradient_descent::gradient_descent;
pub use momentum::momentum;

/// Selects the parameter update rule applied each optimizer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    GradientDescent,
    Momentum,
    Adam,
}
