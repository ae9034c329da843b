//! Which views go stale when a push event arrives.

use super::ServerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefreshTarget {
    AdminDashboard,
    ManagerDashboard,
    FlightsPage,
    MyBookings,
    /// Comment list of one flight.
    FlightComments(i64),
}

impl RefreshTarget {
    /// Does this event invalidate the view?
    pub fn is_affected_by(&self, event: &ServerEvent) -> bool {
        refresh_targets(event).contains(self)
    }
}

pub fn refresh_targets(event: &ServerEvent) -> Vec<RefreshTarget> {
    use RefreshTarget::*;

    match event {
        ServerEvent::RatingCreated(n)
        | ServerEvent::RatingUpdated(n)
        | ServerEvent::RatingDeleted(n) => vec![FlightComments(n.flight_id)],
        // Flight pushes route on the name alone, whatever the payload held.
        _ => match event.name() {
            "new_flight_pending" => vec![AdminDashboard],
            "flight_cancelled" => vec![AdminDashboard, FlightsPage, MyBookings],
            "flight_status_updated" => vec![ManagerDashboard, FlightsPage],
            "flight_started" | "flight_completed" => vec![FlightsPage, MyBookings],
            "flight_deleted" => vec![FlightsPage],
            _ => Vec::new(),
        },
    }
}
