use super::guest::{Attendance, BusDeparture, BusReturn, Guest};

/// Attendance filter used by the dashboard's guest lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Attending,
    NotAttending,
    Pending,
}

impl StatusFilter {
    pub fn title(&self) -> &'static str {
        match self {
            StatusFilter::All => "Total invitados",
            StatusFilter::Attending => "Confirmados",
            StatusFilter::NotAttending => "No asisten",
            StatusFilter::Pending => "Pendientes",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Attending,
            StatusFilter::Attending => StatusFilter::NotAttending,
            StatusFilter::NotAttending => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::All,
        }
    }

    pub fn matches(&self, guest: &Guest) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Attending => guest.attendance() == Attendance::Attending,
            StatusFilter::NotAttending => guest.attendance() == Attendance::NotAttending,
            StatusFilter::Pending => guest.attendance() == Attendance::Unknown,
        }
    }
}

pub fn filter_guests(guests: &[Guest], filter: StatusFilter) -> Vec<&Guest> {
    guests.iter().filter(|g| filter.matches(g)).collect()
}

/// Bus usage for one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusUsage {
    pub total: usize,
    pub madrid: usize,
    pub mostoles: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuestStats {
    pub total: usize,
    pub attending: usize,
    pub not_attending: usize,
    pub pending: usize,
    pub departure: BusUsage,
    pub return_trip: BusUsage,
}

/// Any stored route other than "none" counts towards the bus total, even
/// one that matches neither known route.
fn uses_bus(route: Option<&str>) -> bool {
    route
        .map(str::trim)
        .is_some_and(|r| !r.is_empty() && r != "none")
}

impl GuestStats {
    pub fn from_guests(guests: &[Guest]) -> Self {
        let mut stats = GuestStats {
            total: guests.len(),
            ..Default::default()
        };

        for guest in guests {
            match guest.attendance() {
                Attendance::Attending => stats.attending += 1,
                Attendance::NotAttending => stats.not_attending += 1,
                Attendance::Unknown => stats.pending += 1,
            }

            if uses_bus(guest.bus_departure.as_deref()) {
                stats.departure.total += 1;
            }
            match guest.departure() {
                BusDeparture::FromMadrid => stats.departure.madrid += 1,
                BusDeparture::FromMostoles => stats.departure.mostoles += 1,
                BusDeparture::None => {}
            }

            if uses_bus(guest.bus_return.as_deref()) {
                stats.return_trip.total += 1;
            }
            match guest.return_trip() {
                BusReturn::ToMadrid => stats.return_trip.madrid += 1,
                BusReturn::ToMostoles => stats.return_trip.mostoles += 1,
                BusReturn::None => {}
            }
        }

        stats
    }

    /// Share of guests in a bucket, as a whole percentage.
    pub fn percent(&self, count: usize) -> u16 {
        if self.total == 0 {
            0
        } else {
            ((count * 100 + self.total / 2) / self.total) as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(id: &str, attending: Option<bool>, dep: Option<&str>, ret: Option<&str>) -> Guest {
        let mut g = Guest::new(id, format!("Invitado {}", id), Some("Grupo"));
        g.attending = attending;
        g.bus_departure = dep.map(str::to_string);
        g.bus_return = ret.map(str::to_string);
        g
    }

    #[test]
    fn test_stats_counts_attendance_and_buses() {
        let guests = vec![
            guest("1", Some(true), Some("Salida desde Madrid"), Some("Vuelta a Móstoles")),
            guest("2", Some(true), Some("none"), None),
            guest("3", Some(false), None, None),
            guest("4", None, Some("Salida desde Móstoles"), Some("Vuelta a Madrid")),
        ];

        let stats = GuestStats::from_guests(&guests);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.attending, 2);
        assert_eq!(stats.not_attending, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.departure, BusUsage { total: 2, madrid: 1, mostoles: 1 });
        assert_eq!(stats.return_trip, BusUsage { total: 2, madrid: 1, mostoles: 1 });
        assert_eq!(stats.percent(stats.attending), 50);
    }

    #[test]
    fn test_unknown_routes_count_towards_totals() {
        let guests = vec![
            guest("1", Some(true), Some("Salida desde Alcorcón"), Some("Vuelta a Getafe")),
            guest("2", Some(true), Some("Salida desde Madrid"), Some("")),
        ];

        let stats = GuestStats::from_guests(&guests);
        assert_eq!(stats.departure, BusUsage { total: 2, madrid: 1, mostoles: 0 });
        assert_eq!(stats.return_trip, BusUsage { total: 1, madrid: 0, mostoles: 0 });
    }

    #[test]
    fn test_percent_of_empty_list() {
        assert_eq!(GuestStats::default().percent(0), 0);
    }

    #[test]
    fn test_filter_guests_by_status() {
        let guests = vec![
            guest("1", Some(true), None, None),
            guest("2", None, None, None),
            guest("3", None, None, None),
        ];
        assert_eq!(filter_guests(&guests, StatusFilter::Pending).len(), 2);
        assert_eq!(filter_guests(&guests, StatusFilter::Attending).len(), 1);
        assert_eq!(filter_guests(&guests, StatusFilter::All).len(), 3);
        assert_eq!(StatusFilter::Pending.next(), StatusFilter::All);
    }
}
