//! Polish city locations for realistic test fixtures.
//!
//! City-centre coordinates, good enough for haversine deadhead estimates
//! between depots.

/// A named place with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const WARSZAWA: Place = Place::new("Warszawa", 52.2297, 21.0122);
pub const KRAKOW: Place = Place::new("Kraków", 50.0647, 19.9450);
pub const LODZ: Place = Place::new("Łódź", 51.7592, 19.4560);
pub const WROCLAW: Place = Place::new("Wrocław", 51.1079, 17.0385);
pub const POZNAN: Place = Place::new("Poznań", 52.4064, 16.9252);
pub const GDANSK: Place = Place::new("Gdańsk", 54.3520, 18.6466);
pub const SZCZECIN: Place = Place::new("Szczecin", 53.4285, 14.5528);
pub const KATOWICE: Place = Place::new("Katowice", 50.2649, 19.0238);
pub const LUBLIN: Place = Place::new("Lublin", 51.2465, 22.5684);
pub const BIALYSTOK: Place = Place::new("Białystok", 53.1325, 23.1688);

/// Regional depots, in location-id order starting at 1.
pub const DEPOTS: &[Place] = &[
    WARSZAWA, KRAKOW, LODZ, WROCLAW, POZNAN, GDANSK, SZCZECIN, KATOWICE, LUBLIN, BIALYSTOK,
];
