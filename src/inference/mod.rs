//! inference — uncertainty of fitted parameters.
//!
//! [`hessian::calc_standard_errors`] computes classical standard errors from
//! the finite-difference observed information at θ̂. The lifetime models
//! call it from `standard_errors` on their fit results and map the θ-space
//! values back to parameter space.

pub mod hessian;

pub use self::hessian::calc_standard_errors;

pub mod prelude {
    pub use super::hessian::calc_standard_errors;
}
