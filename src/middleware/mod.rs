mod error_handler;
pub mod forward;
pub mod session;
pub mod ticket;

pub use error_handler::{log_errors, trace_requests};
pub use forward::{RequestForwarder, forward};
pub use session::{SessionValidator, check_sid, login_redirect};
pub use ticket::{TicketExchanger, check_ticket};
