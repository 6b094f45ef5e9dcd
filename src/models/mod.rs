// Domain records and request/response shapes

pub mod exercise;
pub mod plan;
pub mod workout_session;
pub mod notification;
pub mod profile;
pub mod validation;

pub use exercise::*;
pub use plan::*;
pub use workout_session::*;
pub use notification::*;
pub use profile::*;
pub use validation::*;
