mod request;
mod response;

pub use request::{LocateKmRequest, PointAtKmRequest, ResolveRequest, ValidateKmRequest};
pub use response::{
    HealthResponse, OutcomeResponse, PositionResponse, ResolveResponse, ValidateKmResponse,
};
