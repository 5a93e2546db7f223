//! Curated accommodation catalog for northern Pakistan destinations.
//!
//! No hotel-booking API covers these valleys reliably, so the product ships
//! a hand-maintained table instead.

use serde::Serialize;

use safar_types::find_destination;

/// At most this many suggestions per lookup.
const MAX_SUGGESTIONS: usize = 4;

/// How many of the cheapest options to offer when nothing fits the budget.
const CHEAPEST_FALLBACK: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct Hotel {
    pub name: &'static str,
    /// Nightly price in PKR.
    pub price: u32,
    pub kind: &'static str,
    pub rating: f64,
}

/// A hotel as rendered to the client. The price keeps its original
/// thousands-separated string form.
#[derive(Debug, Clone, Serialize)]
pub struct HotelSuggestion {
    pub name: &'static str,
    pub price: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub rating: f64,
}

const CATALOG: &[(&str, &[Hotel])] = &[
    (
        "Hunza Valley",
        &[
            Hotel { name: "Hunza Serena Inn", price: 25_000, kind: "Luxury Hotel", rating: 4.5 },
            Hotel { name: "Eagle's Nest Hotel", price: 18_000, kind: "Mountain Resort", rating: 4.3 },
            Hotel { name: "Hunza View Hotel", price: 12_000, kind: "Mid-range Hotel", rating: 4.1 },
            Hotel { name: "Baltit Fort View Hotel", price: 15_000, kind: "Heritage Hotel", rating: 4.2 },
            Hotel { name: "Hunza Embassy Hotel", price: 8_000, kind: "Budget Hotel", rating: 3.8 },
            Hotel { name: "Hunza Darbar Hotel", price: 10_000, kind: "Traditional Hotel", rating: 3.9 },
        ],
    ),
    (
        "Naran",
        &[
            Hotel { name: "Naran Valley Hotel", price: 12_000, kind: "Mountain Hotel", rating: 4.0 },
            Hotel { name: "Saif-ul-Malook Resort", price: 15_000, kind: "Lake Resort", rating: 4.2 },
            Hotel { name: "Kaghan Valley Hotel", price: 8_000, kind: "Budget Hotel", rating: 3.7 },
            Hotel { name: "Naran Heights Hotel", price: 10_000, kind: "Mid-range Hotel", rating: 3.9 },
            Hotel { name: "Shogran Resort", price: 18_000, kind: "Hill Station Resort", rating: 4.1 },
            Hotel { name: "Siri Paye Hotel", price: 6_000, kind: "Basic Hotel", rating: 3.5 },
        ],
    ),
    (
        "Fairy Meadows",
        &[
            Hotel { name: "Fairy Meadows Cottages", price: 20_000, kind: "Mountain Cottages", rating: 4.4 },
            Hotel { name: "Nanga Parbat Base Camp Lodge", price: 15_000, kind: "Adventure Lodge", rating: 4.2 },
            Hotel { name: "Fairy Meadows Camp", price: 8_000, kind: "Tent Camping", rating: 4.0 },
            Hotel { name: "Raikot Bridge Hotel", price: 10_000, kind: "Gateway Hotel", rating: 3.8 },
            Hotel { name: "Fairy Meadows Guest House", price: 12_000, kind: "Guest House", rating: 4.1 },
        ],
    ),
    (
        "Swat",
        &[
            Hotel { name: "Swat Serena Hotel", price: 22_000, kind: "Luxury Resort", rating: 4.5 },
            Hotel { name: "Malam Jabba Resort", price: 18_000, kind: "Ski Resort", rating: 4.3 },
            Hotel { name: "Kalam Valley Hotel", price: 12_000, kind: "Valley Hotel", rating: 4.0 },
            Hotel { name: "Mingora City Hotel", price: 8_000, kind: "City Hotel", rating: 3.8 },
            Hotel { name: "Swat Continental Hotel", price: 10_000, kind: "Mid-range Hotel", rating: 3.9 },
            Hotel { name: "Green Valley Hotel", price: 6_000, kind: "Budget Hotel", rating: 3.6 },
        ],
    ),
    (
        "Chitral",
        &[
            Hotel { name: "Chitral Serena Hotel", price: 20_000, kind: "Luxury Hotel", rating: 4.4 },
            Hotel { name: "Chitral Inn", price: 12_000, kind: "Traditional Hotel", rating: 4.0 },
            Hotel { name: "Kalash Valley Guest House", price: 8_000, kind: "Cultural Guest House", rating: 3.9 },
            Hotel { name: "Chitral Continental Hotel", price: 10_000, kind: "Mid-range Hotel", rating: 3.8 },
            Hotel { name: "Mastuj Hotel", price: 6_000, kind: "Budget Hotel", rating: 3.5 },
        ],
    ),
    (
        "Skardu",
        &[
            Hotel { name: "Shangrila Resort", price: 25_000, kind: "Luxury Resort", rating: 4.6 },
            Hotel { name: "Skardu Serena Hotel", price: 20_000, kind: "Luxury Hotel", rating: 4.4 },
            Hotel { name: "K2 Resort", price: 18_000, kind: "Adventure Resort", rating: 4.2 },
            Hotel { name: "Skardu Continental Hotel", price: 12_000, kind: "Mid-range Hotel", rating: 4.0 },
            Hotel { name: "Baltoro Hotel", price: 10_000, kind: "Mountain Hotel", rating: 3.9 },
            Hotel { name: "Skardu Inn", price: 8_000, kind: "Budget Hotel", rating: 3.7 },
        ],
    ),
    (
        "Neelam Valley",
        &[
            Hotel { name: "Neelam Valley Resort", price: 15_000, kind: "Valley Resort", rating: 4.2 },
            Hotel { name: "Muzaffarabad Hotel", price: 10_000, kind: "City Hotel", rating: 3.9 },
            Hotel { name: "Keran Resort", price: 12_000, kind: "Riverside Resort", rating: 4.0 },
            Hotel { name: "Sharda Resort", price: 18_000, kind: "Mountain Resort", rating: 4.3 },
            Hotel { name: "Neelam Continental Hotel", price: 8_000, kind: "Mid-range Hotel", rating: 3.8 },
            Hotel { name: "Jhelum Valley Hotel", price: 6_000, kind: "Budget Hotel", rating: 3.6 },
        ],
    ),
];

/// Generic options offered when the destination has no curated entries.
const GENERIC: &[Hotel] = &[
    Hotel { name: "Local Guest House", price: 5_000, kind: "Budget Accommodation", rating: 3.5 },
    Hotel { name: "Mountain Lodge", price: 8_000, kind: "Mid-range Lodge", rating: 3.8 },
    Hotel { name: "Valley Resort", price: 12_000, kind: "Resort", rating: 4.0 },
];

/// Hotel suggestions for a destination within a nightly budget (PKR).
///
/// Unknown destinations get the generic list. When nothing fits the budget,
/// the destination's cheapest options are offered instead — an empty answer
/// helps nobody planning a trip.
pub fn suggestions_for(city: &str, budget: u32) -> Vec<HotelSuggestion> {
    let canonical = find_destination(city).map(|dest| dest.name);
    let hotels = canonical
        .and_then(|name| {
            CATALOG
                .iter()
                .find(|(dest, _)| *dest == name)
                .map(|(_, hotels)| *hotels)
        })
        .unwrap_or(GENERIC);

    let mut affordable: Vec<Hotel> = hotels
        .iter()
        .filter(|hotel| hotel.price <= budget)
        .copied()
        .collect();

    if affordable.is_empty() {
        let mut by_price: Vec<Hotel> = hotels.to_vec();
        by_price.sort_by_key(|hotel| hotel.price);
        affordable = by_price.into_iter().take(CHEAPEST_FALLBACK).collect();
    }

    affordable
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|hotel| HotelSuggestion {
            name: hotel.name,
            price: thousands(hotel.price),
            kind: hotel.kind,
            rating: hotel.rating,
        })
        .collect()
}

/// `25000` -> `"25,000"`.
fn thousands(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
