pub mod clientbound_response;
pub mod serverbound_request;

pub use clientbound_response::{
    CLIENTBOUND_RESPONSE_ID, ClientBoundResponse, PlayersJSON, ResponseJSON, VersionJSON,
};
pub use serverbound_request::{SERVERBOUND_REQUEST_ID, ServerBoundRequest};
