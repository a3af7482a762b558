pub mod envelope;
pub mod session;

pub use envelope::{
    Action, Envelope, EnvelopeBody, EnvelopeHeader, GetSidParams, GetTicketParams,
    UpstreamResponse, EXPIRES_IN_SECS,
};
pub use session::{GeoAttributes, SessionContext};
