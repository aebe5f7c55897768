//! Turns one trip container into a departure/arrival pair

use scraper::{ElementRef, Selector};

use crate::{extraction::first_time, model::TimePair};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    Paired(TimePair),
    /// Only one time element was found. The trip can't be used without both ends.
    Incomplete(ExtractionAnomaly),
    Empty,
}

/// A container that had a departure or an arrival but not both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionAnomaly {
    /// Position of the container on the page
    pub container_index: usize,
    pub lone_time: String,
}

/// Takes the first two elements matching `time_selector` whose text holds a
/// time. Anything after the second one is never looked at.
pub fn pair_trip(container: ElementRef, time_selector: &Selector, container_index: usize) -> Pairing {
    let mut times = container
        .select(time_selector)
        .filter_map(|element| first_time(&element.text().collect::<String>()));

    match (times.next(), times.next()) {
        (Some(departure), Some(arrival)) => Pairing::Paired(TimePair { departure, arrival }),
        (Some(lone_time), None) => Pairing::Incomplete(ExtractionAnomaly {
            container_index,
            lone_time,
        }),
        _ => Pairing::Empty,
    }
}
