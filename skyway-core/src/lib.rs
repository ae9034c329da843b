pub mod access;
pub mod booking;
pub mod countdown;
pub mod decimal;
pub mod flight;
pub mod rating;
pub mod reference;
pub mod report;
pub mod search;
pub mod time;
pub mod user;
pub mod validation;
pub mod view;

pub use access::{Access, AppRoute, SessionView};
pub use booking::{Booking, BookingCategory};
pub use countdown::FlightCountdown;
pub use flight::{Flight, FlightStatus};
pub use rating::Rating;
pub use reference::{Airline, Airport};
pub use report::ReportType;
pub use search::{FlightQuery, Page};
pub use user::{Role, User};
pub use view::{ViewState, Visibility};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("Unrecognised timestamp: {0}")]
    InvalidTimestamp(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
pub(crate) mod test_support;
