pub mod gateway;
pub mod traits;

pub use gateway::HttpGateway;
pub use traits::{GatewayError, ModelGateway, RawModelResponse};
