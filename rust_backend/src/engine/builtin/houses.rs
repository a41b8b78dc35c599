//! House cusps and angles.
//!
//! Supported systems: Placidus (`P`), Regiomontanus (`R`), Campanus (`C`),
//! Porphyry (`O`), Equal (`E`, `A`) and Whole sign (`W`). Any other letter is
//! computed as Placidus.

use sweph_sys as sys;

use super::astro::{
    asind, atan2d, centuries, cosd, degnorm, delta_t, difdeg, gmst, mean_obliquity, nutation,
    sind, tand,
};
use crate::types::{AngleSet, HouseCusps};

const PLACIDUS_MAX_ITERATIONS: usize = 100;
const PLACIDUS_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HouseSystem {
    Placidus,
    Regiomontanus,
    Campanus,
    Porphyry,
    Equal,
    WholeSign,
}

impl HouseSystem {
    fn from_letter(hsys: u8) -> Self {
        match hsys.to_ascii_uppercase() {
            b'R' => Self::Regiomontanus,
            b'C' => Self::Campanus,
            b'O' => Self::Porphyry,
            b'E' | b'A' => Self::Equal,
            b'W' => Self::WholeSign,
            _ => Self::Placidus,
        }
    }
}

/// Ascendant of the horizon-like great circle with pole height `pole`, for
/// sidereal angle `armc`.
fn ascendant(armc: f64, pole: f64, eps: f64) -> f64 {
    degnorm(atan2d(
        cosd(armc),
        -(sind(armc) * cosd(eps) + tand(pole) * sind(eps)),
    ))
}

/// Ecliptic longitude of the point with right ascension `ra`.
fn ra_to_longitude(ra: f64, eps: f64) -> f64 {
    degnorm(atan2d(sind(ra), cosd(ra) * cosd(eps)))
}

/// Fraction `fraction` of the diurnal (`upper`) or nocturnal semi-arc,
/// solved by fixed-point iteration on the cusp's declination.
fn placidus_cusp(armc: f64, lat: f64, eps: f64, fraction: f64, upper: bool) -> Option<f64> {
    let ra_of = |semi_arc: f64| {
        if upper {
            armc + fraction * semi_arc
        } else {
            armc + 180.0 - fraction * semi_arc
        }
    };

    let mut ra = ra_of(90.0);
    for _ in 0..PLACIDUS_MAX_ITERATIONS {
        let lon = ra_to_longitude(ra, eps);
        let dec = asind(sind(eps) * sind(lon));
        let x = tand(lat) * tand(dec);
        if x.abs() > 1.0 {
            return None;
        }
        let ad = asind(x);
        let semi_arc = if upper { 90.0 + ad } else { 90.0 - ad };
        let next = ra_of(semi_arc);
        let converged = (next - ra).abs() < PLACIDUS_TOLERANCE;
        ra = next;
        if converged {
            break;
        }
    }
    Some(ra_to_longitude(ra, eps))
}

/// Intermediate cusps 2, 3, 11, 12 in that order.
fn intermediate_cusps(
    system: HouseSystem,
    armc: f64,
    lat: f64,
    eps: f64,
    asc: f64,
    mc: f64,
) -> Option<[f64; 4]> {
    match system {
        HouseSystem::Placidus => Some([
            placidus_cusp(armc, lat, eps, 2.0 / 3.0, false)?,
            placidus_cusp(armc, lat, eps, 1.0 / 3.0, false)?,
            placidus_cusp(armc, lat, eps, 1.0 / 3.0, true)?,
            placidus_cusp(armc, lat, eps, 2.0 / 3.0, true)?,
        ]),
        HouseSystem::Regiomontanus => {
            let p1 = atan2d(tand(lat) * 0.5, 1.0);
            let p2 = atan2d(tand(lat) * cosd(30.0), 1.0);
            Some([
                ascendant(armc + 30.0, p2, eps),
                ascendant(armc + 60.0, p1, eps),
                ascendant(armc - 60.0, p1, eps),
                ascendant(armc - 30.0, p2, eps),
            ])
        }
        HouseSystem::Campanus => {
            let p1 = asind(sind(lat) / 2.0);
            let p2 = asind(3f64.sqrt() / 2.0 * sind(lat));
            let cos_lat = cosd(lat);
            let (x1, x2) = if cos_lat.abs() < 1e-12 {
                (90.0, 90.0)
            } else {
                (
                    atan2d(3f64.sqrt(), cos_lat),
                    atan2d(1.0 / 3f64.sqrt(), cos_lat),
                )
            };
            Some([
                ascendant(armc + x2, p2, eps),
                ascendant(armc + x1, p1, eps),
                ascendant(armc - x1, p1, eps),
                ascendant(armc - x2, p2, eps),
            ])
        }
        HouseSystem::Porphyry => Some(porphyry(asc, mc)),
        HouseSystem::Equal => Some([asc + 30.0, asc + 60.0, asc + 300.0, asc + 330.0]),
        HouseSystem::WholeSign => {
            let first = (asc / 30.0).floor() * 30.0;
            Some([first + 30.0, first + 60.0, first + 300.0, first + 330.0])
        }
    }
}

fn porphyry(asc: f64, mc: f64) -> [f64; 4] {
    let upper = degnorm(asc - mc);
    let lower = 180.0 - upper;
    [
        asc + lower / 3.0,
        asc + 2.0 * lower / 3.0,
        mc + upper / 3.0,
        mc + 2.0 * upper / 3.0,
    ]
}

/// Fill `cusps` and `ascmc` for a moment and place. Returns 0, or -1 when
/// Placidus is undefined at this latitude, in which case Porphyry cusps are
/// returned instead.
pub fn houses(
    jd_ut: f64,
    lat: f64,
    lon: f64,
    hsys: u8,
    cusps: &mut HouseCusps,
    ascmc: &mut AngleSet,
) -> i32 {
    let t = centuries(jd_ut + delta_t(jd_ut));
    let (dpsi, deps) = nutation(t);
    let eps = mean_obliquity(t) + deps;
    let armc = degnorm(gmst(jd_ut) + dpsi * cosd(eps) + lon);

    let mc = degnorm(atan2d(sind(armc), cosd(armc) * cosd(eps)));
    let mut asc = ascendant(armc, lat, eps);
    let polar = lat.abs() >= 90.0 - eps;
    if polar && difdeg(asc, mc) < 0.0 {
        asc = degnorm(asc + 180.0);
    }

    let system = HouseSystem::from_letter(hsys);
    let (mid, code) = match intermediate_cusps(system, armc, lat, eps, asc, mc) {
        Some(mid) if !(polar && system == HouseSystem::Placidus) => (mid, sys::OK),
        _ => (porphyry(asc, mc), sys::ERR),
    };

    let (first, tenth) = match system {
        HouseSystem::Equal => (asc, asc + 270.0),
        HouseSystem::WholeSign => {
            let first = (asc / 30.0).floor() * 30.0;
            (first, first + 270.0)
        }
        _ => (asc, mc),
    };

    cusps[0] = 0.0;
    cusps[1] = degnorm(first);
    cusps[2] = degnorm(mid[0]);
    cusps[3] = degnorm(mid[1]);
    cusps[10] = degnorm(tenth);
    cusps[11] = degnorm(mid[2]);
    cusps[12] = degnorm(mid[3]);
    for i in 4..=9 {
        let opposite = if i < 7 { i + 6 } else { i - 6 };
        cusps[i] = degnorm(cusps[opposite] + 180.0);
    }

    let vertex_pole = if lat >= 0.0 { 90.0 - lat } else { -90.0 - lat };
    ascmc[sys::SE_ASC] = asc;
    ascmc[sys::SE_MC] = mc;
    ascmc[sys::SE_ARMC] = armc;
    ascmc[sys::SE_VERTEX] = ascendant(armc + 180.0, vertex_pole, eps);
    ascmc[sys::SE_EQUASC] = ascendant(armc, 0.0, eps);
    ascmc[sys::SE_COASC1] = degnorm(ascendant(armc - 180.0, lat, eps) + 180.0);
    ascmc[sys::SE_COASC2] = ascendant(armc, vertex_pole, eps);
    ascmc[sys::SE_POLASC] = ascendant(armc - 180.0, lat, eps);
    ascmc[8] = 0.0;
    ascmc[9] = 0.0;

    code
}
