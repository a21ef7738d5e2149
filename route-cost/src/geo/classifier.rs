//! Point-to-country classification.
//!
//! Countries are modelled as bounding boxes with an optional refinement
//! predicate. Boxes of neighbouring countries overlap, so rules are
//! evaluated in table order and the first match wins. The ordering lives in
//! [`EUROPEAN_RULES`] as data; a rule placed earlier claims the overlap.
//!
//! The thresholds inside the predicates are coarse straight-line
//! approximations of real borders. Points close to a border can land on
//! the wrong side; the golden-city tests pin the current behaviour.

use crate::domain::{CountryCode, GeoPoint};

/// Axis-aligned latitude/longitude box, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude())
            && (self.min_lng..=self.max_lng).contains(&point.longitude())
    }
}

/// Extra condition a point inside the box must satisfy, as `(lat, lng)`.
pub type Refinement = fn(f64, f64) -> bool;

/// One entry of the ordered classification table.
#[derive(Debug, Clone, Copy)]
pub struct CountryRule {
    pub country: CountryCode,
    pub bounds: BoundingBox,
    pub refine: Option<Refinement>,
}

impl CountryRule {
    const fn boxed(code: [u8; 2], bounds: BoundingBox) -> Self {
        Self {
            country: CountryCode::from_ascii(code),
            bounds,
            refine: None,
        }
    }

    const fn refined(code: [u8; 2], bounds: BoundingBox, refine: Refinement) -> Self {
        Self {
            country: CountryCode::from_ascii(code),
            bounds,
            refine: Some(refine),
        }
    }

    /// True if the point is inside the box and passes the refinement.
    pub fn matches(&self, point: &GeoPoint) -> bool {
        self.bounds.contains(point)
            && self
                .refine
                .is_none_or(|refine| refine(point.latitude(), point.longitude()))
    }
}

/// Classifies points against an ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct GeoCountryClassifier {
    rules: &'static [CountryRule],
}

impl GeoCountryClassifier {
    /// Classifier over a custom rule table.
    pub fn new(rules: &'static [CountryRule]) -> Self {
        Self { rules }
    }

    /// Classifier over the built-in European table.
    pub fn european() -> Self {
        Self::new(EUROPEAN_RULES)
    }

    /// Country of the first matching rule, or `None` outside every region.
    pub fn classify(&self, point: &GeoPoint) -> Option<CountryCode> {
        self.rules
            .iter()
            .find(|rule| rule.matches(point))
            .map(|rule| rule.country)
    }
}

impl Default for GeoCountryClassifier {
    fn default() -> Self {
        Self::european()
    }
}

/// Ordered European classification table.
///
/// Order constraints (earlier wins): CH before AT/DE/FR/IT, AT before CZ,
/// CZ and SK before PL/HU, PL before DE/LT, DK before DE/SE, FR before
/// ES/GB/IT, PT before ES, IE before GB, Baltics before the Nordics,
/// IT before SI/HR, ME and BA before HR, MD before RO.
pub static EUROPEAN_RULES: &[CountryRule] = &[
    CountryRule::boxed(*b"LU", BoundingBox::new(49.44, 50.19, 5.73, 6.53)),
    CountryRule::refined(*b"NL", BoundingBox::new(50.75, 53.56, 3.36, 7.23), netherlands),
    CountryRule::refined(*b"BE", BoundingBox::new(49.49, 51.51, 2.54, 6.41), belgium),
    CountryRule::refined(*b"CH", BoundingBox::new(45.82, 47.81, 5.96, 10.49), switzerland),
    CountryRule::refined(*b"AT", BoundingBox::new(46.37, 49.02, 9.53, 17.16), austria),
    CountryRule::refined(*b"CZ", BoundingBox::new(48.55, 51.06, 12.09, 18.86), czechia),
    CountryRule::refined(*b"SK", BoundingBox::new(47.73, 49.61, 16.83, 22.57), slovakia),
    CountryRule::refined(*b"PL", BoundingBox::new(49.00, 54.84, 14.12, 24.15), poland),
    CountryRule::refined(*b"DK", BoundingBox::new(54.80, 57.75, 8.07, 15.20), denmark),
    CountryRule::refined(*b"DE", BoundingBox::new(47.27, 55.06, 5.87, 15.04), germany),
    CountryRule::refined(*b"FR", BoundingBox::new(42.33, 51.09, -4.79, 8.23), france),
    // Corsica
    CountryRule::boxed(*b"FR", BoundingBox::new(41.33, 43.03, 8.53, 9.57)),
    CountryRule::refined(*b"IT", BoundingBox::new(35.49, 47.09, 6.63, 18.52), italy),
    CountryRule::refined(*b"PT", BoundingBox::new(36.96, 42.15, -9.50, -6.19), portugal),
    CountryRule::refined(*b"ES", BoundingBox::new(35.95, 43.79, -9.30, 4.33), spain),
    CountryRule::refined(*b"IE", BoundingBox::new(51.42, 55.39, -10.48, -5.99), ireland),
    CountryRule::boxed(*b"GB", BoundingBox::new(49.86, 60.86, -8.65, 1.77)),
    CountryRule::refined(*b"EE", BoundingBox::new(57.51, 59.68, 21.76, 28.21), estonia),
    CountryRule::refined(*b"LV", BoundingBox::new(55.67, 58.09, 20.97, 28.24), latvia),
    CountryRule::refined(*b"LT", BoundingBox::new(53.89, 56.45, 20.93, 26.84), lithuania),
    CountryRule::refined(*b"SE", BoundingBox::new(55.33, 69.06, 10.96, 24.17), sweden),
    CountryRule::refined(*b"FI", BoundingBox::new(59.81, 70.09, 20.55, 31.59), finland),
    CountryRule::refined(*b"NO", BoundingBox::new(57.96, 71.19, 4.64, 31.10), norway),
    CountryRule::refined(*b"SI", BoundingBox::new(45.42, 46.88, 13.38, 16.61), slovenia),
    CountryRule::refined(*b"HU", BoundingBox::new(45.74, 48.59, 16.11, 22.90), hungary),
    CountryRule::refined(*b"ME", BoundingBox::new(41.85, 43.56, 18.43, 20.36), montenegro),
    CountryRule::refined(*b"BA", BoundingBox::new(42.56, 45.28, 15.72, 19.62), bosnia),
    CountryRule::boxed(*b"HR", BoundingBox::new(42.39, 46.55, 13.49, 19.45)),
    CountryRule::refined(*b"RS", BoundingBox::new(42.23, 46.19, 18.82, 23.01), serbia),
    CountryRule::refined(*b"MD", BoundingBox::new(45.47, 48.49, 26.62, 30.13), moldova),
    CountryRule::refined(*b"RO", BoundingBox::new(43.62, 48.27, 20.26, 29.69), romania),
    CountryRule::refined(*b"BG", BoundingBox::new(41.24, 44.22, 22.36, 28.61), bulgaria),
    CountryRule::refined(*b"GR", BoundingBox::new(34.80, 41.75, 19.37, 28.25), greece),
];

fn netherlands(lat: f64, lng: f64) -> bool {
    (lat > 51.25 || lng > 5.0) && !(lat < 52.0 && lng > 6.25) && !(lat < 51.0 && lng > 6.0)
}

fn belgium(lat: f64, lng: f64) -> bool {
    if lng >= 6.05 {
        return false;
    }
    // French border runs from Lille down towards the Ardennes.
    if lng < 4.2 {
        lat > 50.75 - (lng - 3.0) * 0.4
    } else if lng < 5.3 {
        lat > 49.9
    } else {
        true
    }
}

fn switzerland(lat: f64, lng: f64) -> bool {
    // Geneva basin north of Haute-Savoie, and Ticino south of the Alps
    let south = lat > 46.1 || (lng > 8.6 && lng < 9.2 && lat > 45.85);
    // Rhine border; Schaffhausen pokes north of it
    let north = lat < 47.6 || (lng > 8.4 && lng < 8.9);
    // Jura slopes north-east away from France
    let jura = lat <= 46.5 || lng > 6.1 + (lat - 46.5) * 0.9;
    // Vorarlberg (AT) and Valtellina / Livigno (IT)
    let east = !(lng > 9.53 && lat > 47.2) && !(lat < 46.35 && lng > 9.3) && !(lng > 10.0 && lat < 46.6);
    south && north && jura && east
}

fn austria(lat: f64, lng: f64) -> bool {
    if lng < 12.0 {
        // Tyrol and Vorarlberg, between Bavaria and South Tyrol
        lat > 46.9 && lat < 47.7
    } else if lng < 12.9 {
        lat > 46.6 && lat < 47.75
    } else if lng < 13.8 {
        lat > 46.5 && lat < 48.3
    } else if lng < 15.0 {
        lat > 46.45 && lat < 48.7
    } else if lng < 16.4 {
        lat > 46.65 && lat < 48.8
    } else {
        // Burgenland and the Vienna basin, short of Bratislava
        lat > 47.75 && lat < 48.8 && !(lng > 17.0 && lat > 48.0)
    }
}

fn czechia(lat: f64, lng: f64) -> bool {
    if lng < 12.5 {
        lat > 49.9 && lat < 50.3
    } else if lng < 13.9 {
        lat > 49.0 && lat < 50.45
    } else if lng < 15.3 {
        lat > 48.6 && lat < 51.06
    } else if lng < 16.9 {
        lat > 48.8 && lat < 50.45
    } else {
        // Moravia, bounded by the Slovak border sloping north-east
        lat > 48.85 + (lng - 17.2) * 0.5 && lat < 50.3 && lng < 18.85
    }
}

fn slovakia(lat: f64, lng: f64) -> bool {
    let south = if lng < 18.9 {
        47.8
    } else if lng < 19.9 {
        48.2
    } else {
        48.45
    };
    let north = if lng < 18.9 { 49.6 } else { 49.25 };
    lat > south && lat < north && lng < 22.15
}

fn poland(lat: f64, lng: f64) -> bool {
    // Oder-Neisse line
    let west = if lat < 52.9 { lng > 14.7 } else { lng > 14.2 };
    let east = if lat > 52.3 {
        lng < 23.6
    } else if lat < 51.0 {
        lng < 23.3
    } else {
        lng < 24.1
    };
    // Kaliningrad and southern Lithuania
    let north = !(lat > 54.35 && lng > 19.6);
    west && east && north
}

fn denmark(lat: f64, lng: f64) -> bool {
    // Skåne across the Øresund, Bornholm further east
    let not_scania = lng < 12.7 || lng > 14.6;
    let not_west_sweden = !(lat > 56.1 && lng > 11.0);
    not_scania && not_west_sweden
}

fn germany(lat: f64, lng: f64) -> bool {
    // Alsace and Lorraine
    !(lat < 49.0 && lng < 7.8) && !(lat < 49.5 && lng < 6.9)
}

fn france(lat: f64, lng: f64) -> bool {
    // English south coast across the Channel
    if lat > 50.0 && lng < 1.4 {
        return false;
    }
    // Piedmont and Liguria, except the Riviera up to Menton
    if lng > 6.9 && lat < 45.9 && !(lng < 7.55 && lat < 43.85) {
        return false;
    }
    // Pyrenees
    if lng < -1.0 {
        lat > 43.05 && !(lat < 43.37 && lng < -1.78)
    } else if lng < 1.5 {
        lat > 42.85
    } else {
        true
    }
}

fn italy(lat: f64, lng: f64) -> bool {
    // Alpine wedge: north of the Brenner belongs to CH/AT
    if lat > 46.95 {
        return false;
    }
    // Slovenia inland
    if lng > 13.9 && lat > 45.4 {
        return false;
    }
    // Istria
    if lng > 13.5 && lat > 44.7 && lat < 45.6 {
        return false;
    }
    // Dalmatian coast across the Adriatic
    if lng > 13.6 && lat < 45.6 && lat > 45.6 - (lng - 13.6) * 1.1 {
        return false;
    }
    // Tunisia
    !(lat < 37.5 && lng < 11.5)
}

fn portugal(lat: f64, lng: f64) -> bool {
    if lat < 38.0 {
        lng < -7.4
    } else if lat < 39.7 {
        lng < -7.0
    } else {
        lng < -6.2
    }
}

fn spain(lat: f64, lng: f64) -> bool {
    // Algerian coast
    !(lat < 37.0 && lng > -1.5)
}

fn ireland(lat: f64, lng: f64) -> bool {
    // Northern Ireland
    !(lat > 54.05 && lng > -7.6)
}

fn estonia(lat: f64, lng: f64) -> bool {
    (lat > 57.75 || lng > 26.5) && !(lng > 27.9 && lat < 59.0)
}

fn latvia(lat: f64, lng: f64) -> bool {
    if lng < 25.5 { lat > 56.25 } else { lat > 55.7 }
}

fn lithuania(lat: f64, lng: f64) -> bool {
    // Kaliningrad oblast and the Belarusian border near Ashmyany
    !(lat < 55.1 && lng < 22.9) && !(lng > 25.8 && lat < 55.0)
}

fn sweden(lat: f64, lng: f64) -> bool {
    let west = if lat < 59.2 {
        11.1
    } else if lat < 61.0 {
        12.0
    } else if lat < 64.0 {
        12.5
    } else if lat < 66.0 {
        14.0
    } else if lat < 67.5 {
        15.8
    } else {
        18.5
    };
    let east = if lat < 65.5 { 21.0 } else { 24.15 };
    lng > west && lng < east
}

fn finland(lat: f64, lng: f64) -> bool {
    // Finnmark wedge of Norway
    if lat > 68.7 {
        return lng > 25.0 && lng < 28.9;
    }
    let east = if lat < 60.9 {
        27.9
    } else if lat < 62.0 {
        29.3
    } else if lat < 64.0 {
        30.5
    } else if lat < 67.0 {
        29.8
    } else {
        29.0
    };
    lng < east
}

fn norway(lat: f64, lng: f64) -> bool {
    // Russia and Finland south of Finnmark
    !(lat < 68.5 && lng > 25.0)
}

fn slovenia(lat: f64, lng: f64) -> bool {
    if lng < 15.3 {
        lat > 45.45
    } else if lng < 15.75 {
        lat > 45.75
    } else {
        lat > 46.35 && lng < 16.6
    }
}

fn hungary(lat: f64, lng: f64) -> bool {
    // Međimurje (HR)
    if lat < 46.45 && lng < 16.9 {
        return false;
    }
    // Vojvodina (RS)
    if lng > 18.8 && lng < 20.3 && lat <= 46.15 {
        return false;
    }
    // Romanian border running north-east
    lng < 20.8 + (lat - 46.2)
}

fn montenegro(lat: f64, lng: f64) -> bool {
    (lat < 43.2 || lng > 19.2) && !(lat < 42.3 && lng > 19.35)
}

fn bosnia(lat: f64, lng: f64) -> bool {
    // North of the Dalmatian coast, south of the Sava, excluding Dubrovnik
    lat < 45.08 && lat > 44.8 - (lng - 15.75) * 0.98 && !(lat < 42.7 && lng < 18.3)
}

fn serbia(lat: f64, lng: f64) -> bool {
    // Banat (RO), the Iron Gates (RO) and Vidin (BG)
    !(lat > 45.45 && lng > 20.9) && !(lat > 44.6 && lng > 21.6) && !(lng > 22.7 && lat < 44.2)
}

fn moldova(lat: f64, lng: f64) -> bool {
    // Prut river
    if lat >= 47.0 {
        lng > 26.8 + (48.3 - lat) * 0.8
    } else {
        lng > 27.9 + (47.0 - lat) * 0.2
    }
}

fn romania(lat: f64, lng: f64) -> bool {
    // Danube border with Bulgaria
    !(lat < 43.88 && lng < 28.0) && !(lng < 23.0 && lat < 44.05)
}

fn bulgaria(lat: f64, lng: f64) -> bool {
    // Eastern Thrace (TR)
    !(lat < 42.0 && lng > 26.3)
}

fn greece(lat: f64, lng: f64) -> bool {
    // Albania, sloping south-west from Korçë
    if lng < 21.1 && lat > 39.7 + (lng - 19.9) * 0.9 {
        return false;
    }
    // North Macedonia
    if lat > 41.0 && lng < 22.95 {
        return false;
    }
    // Anatolian coast
    if lat > 40.8 {
        lng < 26.3
    } else if lat > 38.0 {
        lng < 26.7
    } else {
        !(lat > 36.6 && lat < 37.9 && lng > 27.4)
    }
}
