pub mod upstream;

pub use upstream::{UpstreamClient, UpstreamReply, is_well_formed_json};
