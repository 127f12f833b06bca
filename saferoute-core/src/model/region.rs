//! Static catalog of named regions used to pick a graph file.

use geo::{Point, Rect, coord};
use serde::Deserialize;

use crate::geodesy::bbox_contains;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRegion")]
pub struct Region {
    pub name: String,
    pub bounds: Rect<f64>,
}

#[derive(Deserialize)]
struct RawRegion {
    name: String,
    min_lat: f64,
    min_lng: f64,
    max_lat: f64,
    max_lng: f64,
}

impl From<RawRegion> for Region {
    fn from(raw: RawRegion) -> Self {
        Region::new(raw.name, raw.min_lat, raw.min_lng, raw.max_lat, raw.max_lng)
    }
}

impl Region {
    pub fn new(name: impl Into<String>, min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            name: name.into(),
            bounds: Rect::new(
                coord! { x: min_lng, y: min_lat },
                coord! { x: max_lng, y: max_lat },
            ),
        }
    }

    pub fn contains(&self, point: Point<f64>) -> bool {
        bbox_contains(&self.bounds, point)
    }
}

/// Ordered region list. Overlaps are allowed; the first match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn find_region(&self, point: Point<f64>) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(point))
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// District boxes of Bangladesh, alphabetical.
    pub fn bangladesh_districts() -> Self {
        const DISTRICTS: [(&str, f64, f64, f64, f64); 64] = [
            ("Bagerhat", 21.80, 89.40, 22.90, 89.95),
            ("Bandarban", 21.10, 92.15, 22.00, 92.70),
            ("Barguna", 21.80, 89.90, 22.60, 90.30),
            ("Barisal", 22.30, 90.10, 22.90, 90.50),
            ("Bhola", 21.90, 90.50, 22.90, 91.10),
            ("Bogra", 24.50, 88.90, 25.10, 89.60),
            ("Brahmanbaria", 23.60, 90.80, 24.20, 91.30),
            ("Chandpur", 23.00, 90.55, 23.60, 91.00),
            ("Chapai Nawabganj", 24.40, 88.00, 24.90, 88.40),
            ("Chattogram", 21.90, 91.60, 22.80, 92.20),
            ("Chuadanga", 23.30, 88.70, 23.70, 89.10),
            ("Cox's Bazar", 20.85, 91.80, 21.90, 92.30),
            ("Cumilla", 23.20, 90.90, 24.00, 91.30),
            ("Dhaka", 23.60, 90.20, 24.00, 90.60),
            ("Dinajpur", 25.30, 88.40, 26.10, 89.00),
            ("Faridpur", 23.10, 89.50, 23.80, 90.10),
            ("Feni", 22.75, 91.30, 23.15, 91.55),
            ("Gaibandha", 25.00, 89.30, 25.50, 89.70),
            ("Gazipur", 23.90, 90.20, 24.30, 90.60),
            ("Gopalganj", 22.90, 89.80, 23.40, 90.20),
            ("Habiganj", 24.00, 91.10, 24.60, 91.50),
            ("Jamalpur", 24.60, 89.70, 25.30, 90.30),
            ("Jashore", 23.00, 88.80, 23.60, 89.40),
            ("Jhalokati", 22.30, 90.00, 22.70, 90.30),
            ("Jhenaidah", 23.10, 88.90, 23.70, 89.40),
            ("Joypurhat", 24.80, 88.90, 25.20, 89.30),
            ("Khagrachari", 22.90, 91.80, 23.50, 92.30),
            ("Khulna", 22.60, 89.30, 23.10, 89.70),
            ("Kishoreganj", 24.10, 90.70, 24.60, 91.20),
            ("Kurigram", 25.60, 89.30, 26.20, 89.80),
            ("Kushtia", 23.70, 88.90, 24.10, 89.30),
            ("Lakshmipur", 22.60, 90.70, 23.10, 91.10),
            ("Lalmonirhat", 25.80, 89.20, 26.30, 89.60),
            ("Madaripur", 23.00, 89.90, 23.50, 90.30),
            ("Magura", 23.20, 89.20, 23.60, 89.60),
            ("Manikganj", 23.70, 89.90, 24.10, 90.20),
            ("Meherpur", 23.60, 88.50, 23.90, 88.80),
            ("Moulvibazar", 24.10, 91.40, 24.70, 92.00),
            ("Munshiganj", 23.30, 90.30, 23.70, 90.70),
            ("Mymensingh", 24.40, 90.10, 25.00, 90.60),
            ("Naogaon", 24.60, 88.50, 25.10, 89.10),
            ("Narail", 23.00, 89.30, 23.40, 89.70),
            ("Narayanganj", 23.50, 90.40, 23.90, 90.70),
            ("Narsingdi", 23.70, 90.60, 24.10, 91.00),
            ("Natore", 24.20, 88.80, 24.80, 89.30),
            ("Netrokona", 24.60, 90.80, 25.20, 91.20),
            ("Nilphamari", 25.80, 88.80, 26.30, 89.30),
            ("Noakhali", 22.60, 90.90, 23.20, 91.30),
            ("Pabna", 23.70, 89.00, 24.30, 89.60),
            ("Panchagarh", 26.20, 88.30, 26.60, 88.60),
            ("Patuakhali", 21.80, 90.10, 22.60, 90.60),
            ("Pirojpur", 22.30, 89.90, 22.80, 90.30),
            ("Rajbari", 23.40, 89.40, 23.90, 89.80),
            ("Rajshahi", 24.20, 88.40, 24.70, 88.80),
            ("Rangamati", 22.40, 91.80, 23.30, 92.40),
            ("Rangpur", 25.50, 88.90, 25.90, 89.40),
            ("Satkhira", 21.80, 88.90, 22.70, 89.30),
            ("Shariatpur", 23.00, 90.20, 23.50, 90.60),
            ("Sherpur", 24.90, 89.90, 25.30, 90.30),
            ("Sirajganj", 24.10, 89.30, 24.80, 89.90),
            ("Sunamganj", 24.60, 90.90, 25.20, 91.50),
            ("Sylhet", 24.50, 91.60, 25.10, 92.10),
            ("Tangail", 24.00, 89.80, 24.70, 90.40),
            ("Thakurgaon", 25.80, 88.20, 26.30, 88.60),
        ];

        Self::new(
            DISTRICTS
                .iter()
                .map(|&(name, min_lat, min_lng, max_lat, max_lng)| {
                    Region::new(name, min_lat, min_lng, max_lat, max_lng)
                })
                .collect(),
        )
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::bangladesh_districts()
    }
}
