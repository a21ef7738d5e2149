//! Static pricing configuration.
//!
//! Fuel defaults, flat per-km toll rates, vignette schedules and exchange
//! rates. These are estimates used when the price store has nothing better;
//! they make no claim to tariff accuracy.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{CountryCode, CurrencyCode, FuelType, VehicleClass};

/// Default price per unit for each fuel type, in the reference currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelPrices {
    pub petrol_95: f64,
    pub petrol_98: f64,
    pub diesel: f64,
    pub lpg: f64,
    /// Per kWh.
    pub electric: f64,
}

impl FuelPrices {
    pub const fn new(petrol_95: f64, petrol_98: f64, diesel: f64, lpg: f64, electric: f64) -> Self {
        Self {
            petrol_95,
            petrol_98,
            diesel,
            lpg,
            electric,
        }
    }

    pub fn get(&self, fuel: FuelType) -> f64 {
        match fuel {
            FuelType::Petrol95 => self.petrol_95,
            FuelType::Petrol98 => self.petrol_98,
            FuelType::Diesel => self.diesel,
            FuelType::Lpg => self.lpg,
            FuelType::Electric => self.electric,
        }
    }
}

/// Flat per-km toll rates for light and heavy vehicles.
///
/// A rate of zero means motorways are free (or vignette-only) for that
/// weight class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TollRate {
    pub light_per_km: f64,
    pub heavy_per_km: f64,
}

impl TollRate {
    pub const fn new(light_per_km: f64, heavy_per_km: f64) -> Self {
        Self {
            light_per_km,
            heavy_per_km,
        }
    }

    /// Per-km rate for a class, including its multiplier.
    pub fn per_km(&self, class: VehicleClass) -> f64 {
        let base = if class.is_heavy() {
            self.heavy_per_km
        } else {
            self.light_per_km
        };
        base * class.toll_multiplier()
    }
}

/// A time-boxed road-usage permit.
#[derive(Debug, Clone, PartialEq)]
pub struct VignettePass {
    pub name: String,
    pub price: f64,
    pub currency: CurrencyCode,
    pub classes: Vec<VehicleClass>,
}

impl VignettePass {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        currency: CurrencyCode,
        classes: &[VehicleClass],
    ) -> Self {
        Self {
            name: name.into(),
            price,
            currency,
            classes: classes.to_vec(),
        }
    }

    pub fn covers(&self, class: VehicleClass) -> bool {
        self.classes.contains(&class)
    }
}

/// Result of converting an amount into the reference currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converted {
    pub amount: f64,
    /// Set when no rate was known and the amount passed through at parity.
    pub unknown_currency: Option<CurrencyCode>,
}

/// All static pricing configuration.
#[derive(Debug, Clone)]
pub struct PricingTables {
    reference_currency: CurrencyCode,
    fuel_defaults: HashMap<CountryCode, FuelPrices>,
    regional_fuel_average: FuelPrices,
    toll_rates: HashMap<CountryCode, TollRate>,
    vignettes: HashMap<CountryCode, Vec<VignettePass>>,
    /// Reference-currency value of one unit of each currency.
    exchange_rates: HashMap<CurrencyCode, f64>,
}

const fn cc(code: &[u8; 2]) -> CountryCode {
    CountryCode::from_ascii(*code)
}

const fn cur(code: &[u8; 3]) -> CurrencyCode {
    CurrencyCode::from_ascii(*code)
}

const EUROPEAN_FUEL: &[(CountryCode, FuelPrices)] = &[
    (cc(b"AT"), FuelPrices::new(1.62, 1.78, 1.60, 0.99, 0.45)),
    (cc(b"BA"), FuelPrices::new(1.45, 1.60, 1.42, 0.85, 0.20)),
    (cc(b"BE"), FuelPrices::new(1.75, 1.90, 1.80, 0.80, 0.50)),
    (cc(b"BG"), FuelPrices::new(1.35, 1.55, 1.35, 0.68, 0.30)),
    (cc(b"CH"), FuelPrices::new(1.85, 1.95, 1.95, 1.10, 0.45)),
    (cc(b"CZ"), FuelPrices::new(1.55, 1.70, 1.50, 0.75, 0.45)),
    (cc(b"DE"), FuelPrices::new(1.80, 1.92, 1.70, 1.05, 0.55)),
    (cc(b"DK"), FuelPrices::new(1.95, 2.10, 1.75, 1.10, 0.50)),
    (cc(b"EE"), FuelPrices::new(1.70, 1.80, 1.60, 0.85, 0.40)),
    (cc(b"ES"), FuelPrices::new(1.60, 1.75, 1.50, 0.95, 0.40)),
    (cc(b"FI"), FuelPrices::new(1.90, 2.00, 1.80, 1.20, 0.40)),
    (cc(b"FR"), FuelPrices::new(1.85, 1.95, 1.72, 1.00, 0.45)),
    (cc(b"GB"), FuelPrices::new(1.70, 1.85, 1.75, 0.95, 0.60)),
    (cc(b"GR"), FuelPrices::new(1.90, 2.10, 1.65, 0.95, 0.45)),
    (cc(b"HR"), FuelPrices::new(1.50, 1.65, 1.45, 0.85, 0.35)),
    (cc(b"HU"), FuelPrices::new(1.55, 1.70, 1.58, 0.80, 0.35)),
    (cc(b"IE"), FuelPrices::new(1.80, 1.95, 1.75, 0.95, 0.55)),
    (cc(b"IT"), FuelPrices::new(1.85, 2.00, 1.75, 0.75, 0.60)),
    (cc(b"LT"), FuelPrices::new(1.60, 1.70, 1.55, 0.75, 0.35)),
    (cc(b"LU"), FuelPrices::new(1.60, 1.70, 1.50, 0.85, 0.40)),
    (cc(b"LV"), FuelPrices::new(1.65, 1.75, 1.60, 0.80, 0.40)),
    (cc(b"MD"), FuelPrices::new(1.30, 1.45, 1.25, 0.80, 0.25)),
    (cc(b"ME"), FuelPrices::new(1.50, 1.60, 1.40, 0.90, 0.25)),
    (cc(b"NL"), FuelPrices::new(2.05, 2.15, 1.75, 1.00, 0.55)),
    (cc(b"NO"), FuelPrices::new(2.00, 2.15, 1.85, 1.30, 0.40)),
    (cc(b"PL"), FuelPrices::new(1.50, 1.65, 1.55, 0.70, 0.40)),
    (cc(b"PT"), FuelPrices::new(1.80, 1.95, 1.65, 0.95, 0.40)),
    (cc(b"RO"), FuelPrices::new(1.45, 1.60, 1.50, 0.70, 0.35)),
    (cc(b"RS"), FuelPrices::new(1.60, 1.75, 1.65, 0.85, 0.25)),
    (cc(b"SE"), FuelPrices::new(1.75, 1.85, 1.85, 1.25, 0.45)),
    (cc(b"SI"), FuelPrices::new(1.50, 1.65, 1.55, 0.85, 0.35)),
    (cc(b"SK"), FuelPrices::new(1.65, 1.80, 1.55, 0.75, 0.40)),
];

const EUROPEAN_FUEL_AVERAGE: FuelPrices = FuelPrices::new(1.70, 1.85, 1.62, 0.90, 0.42);

/// Flat per-km rates: (light, heavy).
///
/// A zero light rate means no distance toll for light vehicles. In the
/// vignette countries (AT, BG, CH, CZ, HU, MD, RO, SI, SK) cars, vans and
/// motorcycles are charged the vignette instead, which resolves before this
/// table is consulted.
const EUROPEAN_TOLL_RATES: &[(CountryCode, TollRate)] = &[
    (cc(b"AT"), TollRate::new(0.0, 0.30)),
    (cc(b"BA"), TollRate::new(0.04, 0.12)),
    (cc(b"BE"), TollRate::new(0.0, 0.15)),
    (cc(b"BG"), TollRate::new(0.0, 0.10)),
    (cc(b"CH"), TollRate::new(0.0, 0.75)),
    (cc(b"CZ"), TollRate::new(0.0, 0.20)),
    (cc(b"DE"), TollRate::new(0.0, 0.19)),
    (cc(b"DK"), TollRate::new(0.0, 0.10)),
    (cc(b"EE"), TollRate::new(0.0, 0.05)),
    (cc(b"ES"), TollRate::new(0.05, 0.10)),
    (cc(b"FI"), TollRate::new(0.0, 0.0)),
    (cc(b"FR"), TollRate::new(0.09, 0.25)),
    (cc(b"GB"), TollRate::new(0.01, 0.02)),
    (cc(b"GR"), TollRate::new(0.07, 0.18)),
    (cc(b"HR"), TollRate::new(0.07, 0.20)),
    (cc(b"HU"), TollRate::new(0.0, 0.25)),
    (cc(b"IE"), TollRate::new(0.02, 0.05)),
    (cc(b"IT"), TollRate::new(0.08, 0.16)),
    (cc(b"LT"), TollRate::new(0.0, 0.06)),
    (cc(b"LU"), TollRate::new(0.0, 0.08)),
    (cc(b"LV"), TollRate::new(0.0, 0.06)),
    (cc(b"MD"), TollRate::new(0.0, 0.03)),
    (cc(b"ME"), TollRate::new(0.01, 0.03)),
    (cc(b"NL"), TollRate::new(0.0, 0.08)),
    (cc(b"NO"), TollRate::new(0.06, 0.18)),
    (cc(b"PL"), TollRate::new(0.03, 0.10)),
    (cc(b"PT"), TollRate::new(0.09, 0.20)),
    (cc(b"RO"), TollRate::new(0.0, 0.08)),
    (cc(b"RS"), TollRate::new(0.05, 0.15)),
    (cc(b"SE"), TollRate::new(0.0, 0.06)),
    (cc(b"SI"), TollRate::new(0.0, 0.22)),
    (cc(b"SK"), TollRate::new(0.0, 0.18)),
];

const EUROPEAN_EXCHANGE_RATES: &[(CurrencyCode, f64)] = &[
    (CurrencyCode::EUR, 1.0),
    (cur(b"CHF"), 1.05),
    (cur(b"CZK"), 0.040),
    (cur(b"HUF"), 0.0025),
    (cur(b"RON"), 0.20),
    (cur(b"BGN"), 0.511),
    (cur(b"MDL"), 0.052),
    (cur(b"PLN"), 0.23),
    (cur(b"GBP"), 1.17),
    (cur(b"SEK"), 0.087),
    (cur(b"NOK"), 0.086),
    (cur(b"DKK"), 0.134),
    (cur(b"RSD"), 0.0085),
    (cur(b"BAM"), 0.511),
];

fn european_vignettes() -> HashMap<CountryCode, Vec<VignettePass>> {
    use VehicleClass::{Car, Motorcycle, Van};

    let eur = CurrencyCode::EUR;
    let mut vignettes = HashMap::new();
    vignettes.insert(
        cc(b"AT"),
        vec![
            VignettePass::new("1-day vignette", 8.60, eur, &[Car, Van]),
            VignettePass::new("10-day vignette", 11.50, eur, &[Car, Van]),
            VignettePass::new("1-day motorcycle vignette", 3.40, eur, &[Motorcycle]),
            VignettePass::new("10-day motorcycle vignette", 4.60, eur, &[Motorcycle]),
        ],
    );
    vignettes.insert(
        cc(b"CH"),
        vec![VignettePass::new("annual vignette", 40.0, cur(b"CHF"), &[Car, Van, Motorcycle])],
    );
    vignettes.insert(
        cc(b"CZ"),
        vec![
            VignettePass::new("1-day vignette", 200.0, cur(b"CZK"), &[Car, Van]),
            VignettePass::new("10-day vignette", 270.0, cur(b"CZK"), &[Car, Van]),
        ],
    );
    vignettes.insert(
        cc(b"SK"),
        vec![VignettePass::new("10-day vignette", 12.0, eur, &[Car, Van])],
    );
    vignettes.insert(
        cc(b"HU"),
        vec![
            VignettePass::new("weekly D1 e-vignette", 5450.0, cur(b"HUF"), &[Car]),
            VignettePass::new("weekly motorcycle e-vignette", 2730.0, cur(b"HUF"), &[Motorcycle]),
            VignettePass::new("weekly D2 e-vignette", 10900.0, cur(b"HUF"), &[Van]),
        ],
    );
    vignettes.insert(
        cc(b"SI"),
        vec![
            VignettePass::new("weekly vignette", 16.0, eur, &[Car]),
            VignettePass::new("weekly motorcycle vignette", 8.0, eur, &[Motorcycle]),
            VignettePass::new("weekly 2B vignette", 32.0, eur, &[Van]),
        ],
    );
    vignettes.insert(
        cc(b"RO"),
        vec![
            VignettePass::new("7-day rovinieta", 15.0, cur(b"RON"), &[Car]),
            VignettePass::new("7-day rovinieta (van)", 30.0, cur(b"RON"), &[Van]),
        ],
    );
    vignettes.insert(
        cc(b"BG"),
        vec![
            VignettePass::new("weekend vignette", 10.0, cur(b"BGN"), &[Car, Van]),
            VignettePass::new("weekly vignette", 15.0, cur(b"BGN"), &[Car, Van]),
        ],
    );
    vignettes.insert(
        cc(b"MD"),
        vec![VignettePass::new("7-day vignette", 70.0, cur(b"MDL"), &[Car, Van])],
    );
    vignettes
}

impl PricingTables {
    /// Tables with nothing in them. Every lookup misses.
    pub fn empty(reference_currency: CurrencyCode) -> Self {
        let mut exchange_rates = HashMap::new();
        exchange_rates.insert(reference_currency, 1.0);
        Self {
            reference_currency,
            fuel_defaults: HashMap::new(),
            regional_fuel_average: FuelPrices::new(0.0, 0.0, 0.0, 0.0, 0.0),
            toll_rates: HashMap::new(),
            vignettes: HashMap::new(),
            exchange_rates,
        }
    }

    /// Built-in European tables, in EUR.
    pub fn european() -> Self {
        Self {
            reference_currency: CurrencyCode::EUR,
            fuel_defaults: EUROPEAN_FUEL.iter().copied().collect(),
            regional_fuel_average: EUROPEAN_FUEL_AVERAGE,
            toll_rates: EUROPEAN_TOLL_RATES.iter().copied().collect(),
            vignettes: european_vignettes(),
            exchange_rates: EUROPEAN_EXCHANGE_RATES.iter().copied().collect(),
        }
    }

    /// Replace one country's default fuel prices.
    pub fn with_fuel_default(mut self, country: CountryCode, prices: FuelPrices) -> Self {
        self.fuel_defaults.insert(country, prices);
        self
    }

    /// Replace the regional fuel average.
    pub fn with_regional_fuel_average(mut self, prices: FuelPrices) -> Self {
        self.regional_fuel_average = prices;
        self
    }

    /// Replace one country's flat toll rate.
    pub fn with_toll_rate(mut self, country: CountryCode, rate: TollRate) -> Self {
        self.toll_rates.insert(country, rate);
        self
    }

    /// Remove a country from the flat toll table.
    pub fn without_toll_rate(mut self, country: CountryCode) -> Self {
        self.toll_rates.remove(&country);
        self
    }

    /// Replace one country's vignette schedule.
    pub fn with_vignettes(mut self, country: CountryCode, passes: Vec<VignettePass>) -> Self {
        self.vignettes.insert(country, passes);
        self
    }

    /// Set the reference-currency value of one unit of `currency`.
    pub fn with_exchange_rate(mut self, currency: CurrencyCode, rate: f64) -> Self {
        self.exchange_rates.insert(currency, rate);
        self
    }

    pub fn reference_currency(&self) -> CurrencyCode {
        self.reference_currency
    }

    /// Country default for a fuel, if the country is tabled.
    pub fn fuel_default(&self, country: CountryCode, fuel: FuelType) -> Option<f64> {
        self.fuel_defaults.get(&country).map(|p| p.get(fuel))
    }

    pub fn regional_fuel_average(&self, fuel: FuelType) -> f64 {
        self.regional_fuel_average.get(fuel)
    }

    pub fn toll_rate(&self, country: CountryCode) -> Option<TollRate> {
        self.toll_rates.get(&country).copied()
    }

    /// The cheapest pass covering `class`, with its converted price.
    pub fn cheapest_vignette(
        &self,
        country: CountryCode,
        class: VehicleClass,
    ) -> Option<(&VignettePass, Converted)> {
        self.vignettes
            .get(&country)?
            .iter()
            .filter(|pass| pass.covers(class))
            .map(|pass| (pass, self.convert(pass.price, pass.currency)))
            .min_by(|(_, a), (_, b)| a.amount.total_cmp(&b.amount))
    }

    /// Convert an amount into the reference currency.
    ///
    /// Unknown currencies pass through 1:1 and are flagged.
    pub fn convert(&self, amount: f64, currency: CurrencyCode) -> Converted {
        match self.exchange_rates.get(&currency) {
            Some(rate) => Converted {
                amount: amount * rate,
                unknown_currency: None,
            },
            None => {
                warn!(
                    currency = %currency,
                    reference = %self.reference_currency,
                    "no exchange rate, converting at parity"
                );
                Converted {
                    amount,
                    unknown_currency: Some(currency),
                }
            }
        }
    }
}

impl Default for PricingTables {
    fn default() -> Self {
        Self::european()
    }
}
