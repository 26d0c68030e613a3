//! Real Las Vegas / Henderson pickup sites for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap via Overpass API. They are
//! routable with the OSRM Nevada extract.

use collection_router::Point;
use collection_router::model::WasteType;

/// A named collection site.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub waste: WasteType,
}

impl Site {
    pub const fn new(name: &'static str, lat: f64, lng: f64, waste: WasteType) -> Self {
        Self {
            name,
            lat,
            lng,
            waste,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

// ============================================================================
// Depots (collector start points)
// ============================================================================

pub const DEPOTS: &[Site] = &[
    Site::new("Strip Yard", 36.1126, -115.1767, WasteType::Mixed),
    Site::new("Boulder Yard", 36.1070664, -115.0591256, WasteType::Mixed),
    Site::new("Henderson Yard", 36.0614, -115.0631, WasteType::Mixed),
];

// ============================================================================
// Mid-Strip restaurant bins (dense, mostly organic and glass)
// ============================================================================

pub const MID_STRIP_BINS: &[Site] = &[
    Site::new("Marakesh", 36.1177772, -115.1546882, WasteType::Organic),
    Site::new("Satay", 36.1182162, -115.1542982, WasteType::Organic),
    Site::new("Coco's Bakery", 36.1004202, -115.1652380, WasteType::Paper),
    Site::new("Gallagher's", 36.1025514, -115.1742518, WasteType::Glass),
    Site::new("Tilted Kilt", 36.1174596, -115.1705837, WasteType::Glass),
    Site::new("La La Noodle", 36.1041828, -115.1740723, WasteType::Organic),
    Site::new("PBR Grill", 36.1090017, -115.1724402, WasteType::Glass),
    Site::new("mon ami Gabi", 36.1128554, -115.1724137, WasteType::Organic),
    Site::new("Gold mine Bar & Grill", 36.1181288, -115.1629389, WasteType::Metal),
    Site::new("Oyster Bar", 36.1194951, -115.1715059, WasteType::Organic),
    Site::new("Fulton Street Food Hall", 36.1193256, -115.1710575, WasteType::Plastic),
    Site::new("Grimaldi's Pizzeria", 36.1248850, -115.1683540, WasteType::Paper),
];

// ============================================================================
// East side (spread out)
// ============================================================================

pub const EAST_SIDE_BINS: &[Site] = &[
    Site::new("Pei Wei Town Square", 36.0810469, -115.1472694, WasteType::Plastic),
    Site::new("Pei Wei East", 36.0861327, -115.1387345, WasteType::Plastic),
    Site::new("Hello Tokyo", 36.1161627, -115.0902096, WasteType::Organic),
    Site::new("Original Lindo Michoacan", 36.1294005, -115.1135106, WasteType::Organic),
    Site::new("Tomo Sushi", 36.0992464, -115.1142123, WasteType::Organic),
    Site::new("Pizza Hut Boulder", 36.1287535, -115.0931625, WasteType::Paper),
    Site::new("Sushi Twister", 36.1007300, -115.0526259, WasteType::Organic),
    Site::new("Chuck Wagon Restaurant", 36.1072491, -115.0593482, WasteType::Metal),
    Site::new("Viva El Salvador", 36.1013492, -115.0646473, WasteType::Glass),
    Site::new("Roma Pizza", 36.1012461, -115.0753039, WasteType::Paper),
];

// ============================================================================
// Henderson (far from the Strip)
// ============================================================================

pub const HENDERSON_BINS: &[Site] = &[
    Site::new("I Love Sushi Henderson", 35.9916660, -115.1028343, WasteType::Organic),
    Site::new("Islander's Grill", 36.0335058, -114.9856162, WasteType::Glass),
    Site::new("Naga", 36.0137634, -114.9928676, WasteType::Organic),
    Site::new("RibCage", 35.9949754, -115.0999810, WasteType::Metal),
    Site::new("Green Valley Ranch Area", 36.0308, -115.0825, WasteType::Electronic),
];

/// All bins in a fixed order.
#[allow(dead_code)]
pub fn all_bins() -> Vec<Site> {
    let mut all = Vec::with_capacity(32);
    all.extend_from_slice(MID_STRIP_BINS);
    all.extend_from_slice(EAST_SIDE_BINS);
    all.extend_from_slice(HENDERSON_BINS);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_vegas_area() {
        for site in all_bins().iter().chain(DEPOTS) {
            assert!(site.lat > 35.9 && site.lat < 36.3, "{} lat out of range: {}", site.name, site.lat);
            assert!(site.lng > -115.4 && site.lng < -114.8, "{} lng out of range: {}", site.name, site.lng);
        }
    }
}
