pub mod constants;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod track;

pub use encode::*;
pub use error::*;
pub use pipeline::*;
pub use store::*;
pub use track::*;
