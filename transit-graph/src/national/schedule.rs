//! Timetable schedules and their stop events.

use crate::catalogue::StationCatalogue;
use crate::domain::{AtocCode, StationId, TimeNormalizer, Tiploc};

/// One location in a schedule, with raw time tokens.
///
/// Working times (`arrival`/`departure`) are what the train is timed to do;
/// public times are what passengers see. Blank tokens are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingPoint {
    pub tiploc: Option<Tiploc>,
    pub arrival: Option<String>,
    pub departure: Option<String>,
    pub public_arrival: Option<String>,
    pub public_departure: Option<String>,
}

impl TimingPoint {
    /// Passengers can board or alight here.
    pub fn is_public_stop(&self) -> bool {
        self.public_arrival.is_some() || self.public_departure.is_some()
    }

    fn arrival_token(&self) -> Option<&str> {
        self.arrival.as_deref().or(self.public_arrival.as_deref())
    }

    fn departure_token(&self) -> Option<&str> {
        self.departure.as_deref().or(self.public_departure.as_deref())
    }
}

/// One timetabled run of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub operator: AtocCode,
    pub category: String,
    pub locations: Vec<TimingPoint>,
}

/// A public call at a catalogued station, with normalised times.
#[derive(Debug, Clone, PartialEq)]
pub struct StopEvent {
    pub station_id: StationId,
    pub tiploc: Tiploc,
    pub arrival: Option<f64>,
    pub departure: Option<f64>,
}

/// The public stops of a schedule plus its stop ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct StopSequence {
    pub stops: Vec<StopEvent>,
    /// Public stops ÷ catalogued timing points; 0 when there are none.
    pub stop_ratio: f64,
}

impl Schedule {
    /// Build the stop sequence for this schedule.
    ///
    /// Locations missing from the catalogue are ignored entirely. Catalogued
    /// locations count as timing points; those with a public time are stops.
    /// A stop whose times both fail to parse is dropped.
    pub fn stop_events(&self, catalogue: &StationCatalogue) -> StopSequence {
        let mut normalizer = TimeNormalizer::new();
        let mut stops = Vec::new();
        let mut total_points = 0usize;
        let mut public_stops = 0usize;

        for location in &self.locations {
            let Some(tiploc) = location.tiploc.as_ref().filter(|t| catalogue.contains(t)) else {
                continue;
            };

            total_points += 1;
            if !location.is_public_stop() {
                continue;
            }
            public_stops += 1;

            let arrival = normalizer.parse_opt(location.arrival_token());
            let departure = normalizer.parse_opt(location.departure_token());
            if arrival.is_none() && departure.is_none() {
                continue;
            }

            stops.push(StopEvent {
                station_id: tiploc.station_id(),
                tiploc: tiploc.clone(),
                arrival,
                departure,
            });
        }

        let stop_ratio = if total_points == 0 {
            0.0
        } else {
            public_stops as f64 / total_points as f64
        };

        StopSequence { stops, stop_ratio }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn stops_and_ratio() {
        let cat = catalogue(&["AAA", "BBB", "CCC", "DDD"]);
        let s = schedule(
            "GW",
            "XX",
            vec![
                call("AAA", "", "1000"),
                pass("BBB"),
                call("CCC", "1020", "1021"),
                call("DDD", "1040", ""),
            ],
        );

        let seq = s.stop_events(&cat);
        assert_eq!(seq.stops.len(), 3);
        assert_eq!(seq.stop_ratio, 0.75);
        assert_eq!(seq.stops[0].station_id.as_str(), "910GAAA");
        assert_eq!(seq.stops[0].arrival, None);
        assert_eq!(seq.stops[0].departure, Some(600.0));
        assert_eq!(seq.stops[1].arrival, Some(620.0));
    }

    #[test]
    fn uncatalogued_locations_ignored() {
        let cat = catalogue(&["AAA", "CCC"]);
        let s = schedule(
            "GW",
            "XX",
            vec![
                call("AAA", "", "1000"),
                call("ZZZ", "1010", "1011"),
                call("CCC", "1020", ""),
            ],
        );

        let seq = s.stop_events(&cat);
        assert_eq!(seq.stops.len(), 2);
        assert_eq!(seq.stop_ratio, 1.0);
    }

    #[test]
    fn working_time_preferred_over_public() {
        let cat = catalogue(&["AAA"]);
        let mut point = call("AAA", "1000", "1001");
        point.arrival = Some("0959H".to_string());
        let s = schedule("GW", "XX", vec![point]);

        let seq = s.stop_events(&cat);
        assert_eq!(seq.stops[0].arrival, Some(599.5));
    }

    #[test]
    fn unparseable_times_drop_the_stop() {
        let cat = catalogue(&["AAA"]);
        let mut point = call("AAA", "", "");
        point.public_arrival = Some("junk".to_string());
        let s = schedule("GW", "XX", vec![point]);

        let seq = s.stop_events(&cat);
        assert!(seq.stops.is_empty());
        // It still counted as a public stop.
        assert_eq!(seq.stop_ratio, 1.0);
    }

    #[test]
    fn overnight_schedule_rolls_over() {
        let cat = catalogue(&["AAA", "BBB"]);
        let s = schedule(
            "GW",
            "XX",
            vec![call("AAA", "", "2350"), call("BBB", "0010", "")],
        );

        let seq = s.stop_events(&cat);
        assert_eq!(seq.stops[1].arrival, Some(1450.0));
    }

    #[test]
    fn empty_schedule_has_zero_ratio() {
        let s = schedule("GW", "XX", vec![]);
        let seq = s.stop_events(&catalogue(&[]));
        assert!(seq.stops.is_empty());
        assert_eq!(seq.stop_ratio, 0.0);
    }
}
