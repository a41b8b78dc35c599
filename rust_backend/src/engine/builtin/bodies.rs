//! Analytical positions of the Sun, Moon, planets and lunar points.
//!
//! Sun: low accuracy solar theory. Moon: main periodic terms of the lunar
//! theory. Planets: Keplerian mean elements (valid roughly 1800-2050 to a few
//! arcminutes) with light-time and aberration. Output is ecliptic
//! `[lon, lat, dist]` in degrees and AU.

use sweph_sys as sys;

use super::astro::{
    cartesian_to_spherical, centuries, cosd, degnorm, nutation, precession, sind,
    spherical_to_cartesian, LIGHT_TIME_AU,
};

const KM_PER_AU: f64 = 149_597_870.7;
/// Mean geocentric distance of the Moon in AU, reported for the lunar points
const MEAN_LUNAR_DISTANCE: f64 = 0.002_569_555;
/// Constant of annual aberration
const ABERRATION: f64 = 20.49552 / 3600.0;

/// Frame and correction switches derived from `SEFLG_*` bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Corrections {
    pub heliocentric: bool,
    pub no_light_time: bool,
    pub j2000: bool,
    pub no_nutation: bool,
    pub no_aberration: bool,
}

impl Corrections {
    pub fn from_flags(iflag: i32) -> Self {
        Self {
            heliocentric: iflag & sys::SEFLG_HELCTR != 0,
            no_light_time: iflag & sys::SEFLG_TRUEPOS != 0,
            j2000: iflag & sys::SEFLG_J2000 != 0,
            no_nutation: iflag & sys::SEFLG_NONUT != 0,
            no_aberration: iflag & sys::SEFLG_NOABERR != 0,
        }
    }
}

/// Bodies the analytical theories cover.
pub fn is_supported(ipl: i32) -> bool {
    matches!(
        ipl,
        sys::SE_SUN..=sys::SE_PLUTO
            | sys::SE_MEAN_NODE
            | sys::SE_TRUE_NODE
            | sys::SE_MEAN_APOG
            | sys::SE_EARTH
    )
}

/// Position of `ipl` at `jd_tt` in the requested frame.
pub fn position(ipl: i32, jd_tt: f64, corr: &Corrections) -> [f64; 3] {
    let t = centuries(jd_tt);
    let raw = match ipl {
        sys::SE_SUN => sun(jd_tt, corr),
        sys::SE_MOON => moon(jd_tt, corr),
        sys::SE_MEAN_NODE => [mean_node(t), 0.0, MEAN_LUNAR_DISTANCE],
        sys::SE_TRUE_NODE => [true_node(t), 0.0, MEAN_LUNAR_DISTANCE],
        sys::SE_MEAN_APOG => [degnorm(mean_perigee(t) + 180.0), 0.0, MEAN_LUNAR_DISTANCE],
        sys::SE_EARTH => earth(jd_tt, corr),
        _ => match planet_index(ipl) {
            Some(index) => planet(index, jd_tt, corr),
            None => [0.0; 3],
        },
    };
    to_output_frame(raw, ipl, t, corr)
}

/// Longitudes below are referred to the J2000 equinox for planets and to the
/// mean equinox of date for the Sun, Moon and lunar points; move everything
/// to the requested frame.
fn to_output_frame(mut p: [f64; 3], ipl: i32, t: f64, corr: &Corrections) -> [f64; 3] {
    if p[2] == 0.0 {
        return p;
    }
    let of_date = matches!(
        ipl,
        sys::SE_SUN | sys::SE_MOON | sys::SE_MEAN_NODE | sys::SE_TRUE_NODE | sys::SE_MEAN_APOG
    ) && !(corr.heliocentric && ipl == sys::SE_MOON);

    if corr.j2000 {
        if of_date {
            p[0] = degnorm(p[0] - precession(t));
        }
        return p;
    }
    if !of_date {
        p[0] = degnorm(p[0] + precession(t));
    }
    if !corr.no_nutation {
        p[0] = degnorm(p[0] + nutation(t).0);
    }
    p
}

// ============================================================================
// Sun
// ============================================================================

/// Geometric longitude and radius vector of the Sun, mean equinox of date.
fn sun_geometric(t: f64) -> (f64, f64) {
    let l0 = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
    let m = 357.52911 + 35999.05029 * t - 0.0001537 * t * t;
    let e = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;
    let c = (1.914602 - 0.004817 * t - 0.000014 * t * t) * sind(m)
        + (0.019993 - 0.000101 * t) * sind(2.0 * m)
        + 0.000289 * sind(3.0 * m);
    let nu = m + c;
    let r = 1.000001018 * (1.0 - e * e) / (1.0 + e * cosd(nu));
    (degnorm(l0 + c), r)
}

fn sun(jd_tt: f64, corr: &Corrections) -> [f64; 3] {
    if corr.heliocentric {
        return [0.0; 3];
    }
    let (lon, r) = sun_geometric(centuries(jd_tt));
    let aberration = if corr.no_aberration || corr.no_light_time {
        0.0
    } else {
        -ABERRATION / r
    };
    [degnorm(lon + aberration), 0.0, r]
}

/// Heliocentric Earth, J2000 ecliptic, rectangular.
fn earth_vector(jd_tt: f64) -> [f64; 3] {
    kepler_vector(&ELEMENTS[2], centuries(jd_tt))
}

fn earth(jd_tt: f64, corr: &Corrections) -> [f64; 3] {
    if !corr.heliocentric {
        return [0.0; 3];
    }
    cartesian_to_spherical(earth_vector(jd_tt))
}

// ============================================================================
// Moon
// ============================================================================

struct LunarTerm {
    d: f64,
    m: f64,
    mp: f64,
    f: f64,
    sl: f64,
    sr: f64,
}

const fn lt(d: f64, m: f64, mp: f64, f: f64, sl: f64, sr: f64) -> LunarTerm {
    LunarTerm { d, m, mp, f, sl, sr }
}

const LONGITUDE_TERMS: [LunarTerm; 28] = [
    lt(0.0, 0.0, 1.0, 0.0, 6288774.0, -20905355.0),
    lt(2.0, 0.0, -1.0, 0.0, 1274027.0, -3699111.0),
    lt(2.0, 0.0, 0.0, 0.0, 658314.0, -2955968.0),
    lt(0.0, 0.0, 2.0, 0.0, 213618.0, -569925.0),
    lt(0.0, 1.0, 0.0, 0.0, -185116.0, 48888.0),
    lt(0.0, 0.0, 0.0, 2.0, -114332.0, -3149.0),
    lt(2.0, 0.0, -2.0, 0.0, 58793.0, 246158.0),
    lt(2.0, -1.0, -1.0, 0.0, 57066.0, -152138.0),
    lt(2.0, 0.0, 1.0, 0.0, 53322.0, -170733.0),
    lt(2.0, -1.0, 0.0, 0.0, 45758.0, -204586.0),
    lt(0.0, 1.0, -1.0, 0.0, -40923.0, -129620.0),
    lt(1.0, 0.0, 0.0, 0.0, -34720.0, 108743.0),
    lt(0.0, 1.0, 1.0, 0.0, -30383.0, 104755.0),
    lt(2.0, 0.0, 0.0, -2.0, 15327.0, 10321.0),
    lt(0.0, 0.0, 1.0, 2.0, -12528.0, 0.0),
    lt(0.0, 0.0, 1.0, -2.0, 10980.0, 79661.0),
    lt(4.0, 0.0, -1.0, 0.0, 10675.0, -34782.0),
    lt(0.0, 0.0, 3.0, 0.0, 10034.0, -23210.0),
    lt(4.0, 0.0, -2.0, 0.0, 8548.0, -21636.0),
    lt(2.0, 1.0, -1.0, 0.0, -7888.0, 24208.0),
    lt(2.0, 1.0, 0.0, 0.0, -6766.0, 30824.0),
    lt(1.0, 0.0, -1.0, 0.0, -5163.0, -8379.0),
    lt(1.0, 1.0, 0.0, 0.0, 4987.0, -16675.0),
    lt(2.0, -1.0, 1.0, 0.0, 4036.0, -12831.0),
    lt(2.0, 0.0, 2.0, 0.0, 3994.0, -10445.0),
    lt(4.0, 0.0, 0.0, 0.0, 3861.0, -11650.0),
    lt(2.0, 0.0, -3.0, 0.0, 3665.0, 14403.0),
    lt(0.0, 1.0, -2.0, 0.0, -2689.0, -7003.0),
];

const LATITUDE_TERMS: [LunarTerm; 15] = [
    lt(0.0, 0.0, 0.0, 1.0, 5128122.0, 0.0),
    lt(0.0, 0.0, 1.0, 1.0, 280602.0, 0.0),
    lt(0.0, 0.0, 1.0, -1.0, 277693.0, 0.0),
    lt(2.0, 0.0, 0.0, -1.0, 173237.0, 0.0),
    lt(2.0, 0.0, -1.0, 1.0, 55413.0, 0.0),
    lt(2.0, 0.0, -1.0, -1.0, 46271.0, 0.0),
    lt(2.0, 0.0, 0.0, 1.0, 32573.0, 0.0),
    lt(0.0, 0.0, 2.0, 1.0, 17198.0, 0.0),
    lt(2.0, 0.0, 1.0, -1.0, 9266.0, 0.0),
    lt(0.0, 0.0, 2.0, -1.0, 8822.0, 0.0),
    lt(2.0, -1.0, 0.0, -1.0, 8216.0, 0.0),
    lt(2.0, 0.0, -2.0, -1.0, 4324.0, 0.0),
    lt(2.0, 0.0, 1.0, 1.0, 4200.0, 0.0),
    lt(2.0, 1.0, 0.0, -1.0, -3359.0, 0.0),
    lt(2.0, -1.0, -1.0, 1.0, 2463.0, 0.0),
];

struct LunarArguments {
    l: f64,
    d: f64,
    m: f64,
    mp: f64,
    f: f64,
    e: f64,
}

fn lunar_arguments(t: f64) -> LunarArguments {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    LunarArguments {
        l: 218.3164477 + 481267.88123421 * t - 0.0015786 * t2 + t3 / 538841.0 - t4 / 65194000.0,
        d: 297.8501921 + 445267.1114034 * t - 0.0018819 * t2 + t3 / 545868.0 - t4 / 113065000.0,
        m: 357.5291092 + 35999.0502909 * t - 0.0001536 * t2 + t3 / 24490000.0,
        mp: 134.9633964 + 477198.8675055 * t + 0.0087414 * t2 + t3 / 69699.0 - t4 / 14712000.0,
        f: 93.2720950 + 483202.0175233 * t - 0.0036539 * t2 - t3 / 3526000.0 + t4 / 863310000.0,
        e: 1.0 - 0.002516 * t - 0.0000074 * t2,
    }
}

fn eccentricity_factor(e: f64, m: f64) -> f64 {
    match m.abs() as i32 {
        1 => e,
        2 => e * e,
        _ => 1.0,
    }
}

/// Geocentric Moon, mean equinox of date.
fn moon_geocentric(t: f64) -> [f64; 3] {
    let a = lunar_arguments(t);
    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479264.290 * t;
    let a3 = 313.45 + 481266.484 * t;

    let mut sl = 0.0;
    let mut sr = 0.0;
    for term in &LONGITUDE_TERMS {
        let arg = term.d * a.d + term.m * a.m + term.mp * a.mp + term.f * a.f;
        let factor = eccentricity_factor(a.e, term.m);
        sl += term.sl * factor * sind(arg);
        sr += term.sr * factor * cosd(arg);
    }
    let mut sb = 0.0;
    for term in &LATITUDE_TERMS {
        let arg = term.d * a.d + term.m * a.m + term.mp * a.mp + term.f * a.f;
        sb += term.sl * eccentricity_factor(a.e, term.m) * sind(arg);
    }

    sl += 3958.0 * sind(a1) + 1962.0 * sind(a.l - a.f) + 318.0 * sind(a2);
    sb += -2235.0 * sind(a.l) + 382.0 * sind(a3) + 175.0 * sind(a1 - a.f)
        + 175.0 * sind(a1 + a.f)
        + 127.0 * sind(a.l - a.mp)
        - 115.0 * sind(a.l + a.mp);

    let lon = degnorm(a.l + sl / 1_000_000.0);
    let lat = sb / 1_000_000.0;
    let dist_km = 385000.56 + sr / 1000.0;
    [lon, lat, dist_km / KM_PER_AU]
}

fn moon(jd_tt: f64, corr: &Corrections) -> [f64; 3] {
    let t = centuries(jd_tt);
    let geo = moon_geocentric(t);
    if !corr.heliocentric {
        return geo;
    }
    // heliocentric Moon = Earth + geocentric Moon, both in the J2000 frame
    let geo_j2000 = spherical_to_cartesian(degnorm(geo[0] - precession(t)), geo[1], geo[2]);
    let earth = earth_vector(jd_tt);
    cartesian_to_spherical([
        earth[0] + geo_j2000[0],
        earth[1] + geo_j2000[1],
        earth[2] + geo_j2000[2],
    ])
}

// ============================================================================
// Lunar points
// ============================================================================

fn mean_node(t: f64) -> f64 {
    degnorm(
        125.0445479 - 1934.1362891 * t + 0.0020754 * t * t + t * t * t / 467441.0
            - t * t * t * t / 60616000.0,
    )
}

fn true_node(t: f64) -> f64 {
    let a = lunar_arguments(t);
    degnorm(
        mean_node(t) - 1.4979 * sind(2.0 * (a.d - a.f)) - 0.1500 * sind(a.m)
            - 0.1226 * sind(2.0 * a.d)
            + 0.1176 * sind(2.0 * a.f)
            - 0.0801 * sind(2.0 * (a.mp - a.f)),
    )
}

fn mean_perigee(t: f64) -> f64 {
    degnorm(
        83.3532465 + 4069.0137287 * t - 0.0103200 * t * t - t * t * t / 80053.0
            + t * t * t * t / 18999000.0,
    )
}

// ============================================================================
// Planets
// ============================================================================

/// Mean orbital elements at J2000 and their rates per Julian century:
/// a (AU), e, I, L, longitude of perihelion, longitude of node (degrees).
struct Elements {
    a: [f64; 2],
    e: [f64; 2],
    i: [f64; 2],
    l: [f64; 2],
    peri: [f64; 2],
    node: [f64; 2],
}

const ELEMENTS: [Elements; 9] = [
    // Mercury
    Elements {
        a: [0.38709927, 0.00000037],
        e: [0.20563593, 0.00001906],
        i: [7.00497902, -0.00594749],
        l: [252.25032350, 149472.67411175],
        peri: [77.45779628, 0.16047689],
        node: [48.33076593, -0.12534081],
    },
    // Venus
    Elements {
        a: [0.72333566, 0.00000390],
        e: [0.00677672, -0.00004107],
        i: [3.39467605, -0.00078890],
        l: [181.97909950, 58517.81538729],
        peri: [131.60246718, 0.00268329],
        node: [76.67984255, -0.27769418],
    },
    // Earth-Moon barycentre
    Elements {
        a: [1.00000261, 0.00000562],
        e: [0.01671123, -0.00004392],
        i: [-0.00001531, -0.01294668],
        l: [100.46457166, 35999.37244981],
        peri: [102.93768193, 0.32327364],
        node: [0.0, 0.0],
    },
    // Mars
    Elements {
        a: [1.52371034, 0.00001847],
        e: [0.09339410, 0.00007882],
        i: [1.84969142, -0.00813131],
        l: [-4.55343205, 19140.30268499],
        peri: [-23.94362959, 0.44441088],
        node: [49.55953891, -0.29257343],
    },
    // Jupiter
    Elements {
        a: [5.20288700, -0.00011607],
        e: [0.04838624, -0.00013253],
        i: [1.30439695, -0.00183714],
        l: [34.39644051, 3034.74612775],
        peri: [14.72847983, 0.21252668],
        node: [100.47390909, 0.20469106],
    },
    // Saturn
    Elements {
        a: [9.53667594, -0.00125060],
        e: [0.05386179, -0.00050991],
        i: [2.48599187, 0.00193609],
        l: [49.95424423, 1222.49362201],
        peri: [92.59887831, -0.41897216],
        node: [113.66242448, -0.28867794],
    },
    // Uranus
    Elements {
        a: [19.18916464, -0.00196176],
        e: [0.04725744, -0.00004397],
        i: [0.77263783, -0.00242939],
        l: [313.23810451, 428.48202785],
        peri: [170.95427630, 0.40805281],
        node: [74.01692503, 0.04240589],
    },
    // Neptune
    Elements {
        a: [30.06992276, 0.00026291],
        e: [0.00859048, 0.00005105],
        i: [1.77004347, 0.00035372],
        l: [-55.12002969, 218.45945325],
        peri: [44.96476227, -0.32241464],
        node: [131.78422574, -0.00508664],
    },
    // Pluto
    Elements {
        a: [39.48211675, -0.00031596],
        e: [0.24882730, 0.00005170],
        i: [17.14001206, 0.00004818],
        l: [238.92903833, 145.20780515],
        peri: [224.06891629, -0.04062942],
        node: [110.30393684, -0.01183482],
    },
];

fn planet_index(ipl: i32) -> Option<usize> {
    match ipl {
        sys::SE_MERCURY => Some(0),
        sys::SE_VENUS => Some(1),
        sys::SE_MARS => Some(3),
        sys::SE_JUPITER => Some(4),
        sys::SE_SATURN => Some(5),
        sys::SE_URANUS => Some(6),
        sys::SE_NEPTUNE => Some(7),
        sys::SE_PLUTO => Some(8),
        _ => None,
    }
}

fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let m = mean_anomaly.to_radians();
    let mut ecc = m + e * m.sin();
    for _ in 0..30 {
        let delta = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc
}

/// Heliocentric rectangular coordinates, J2000 ecliptic.
fn kepler_vector(el: &Elements, t: f64) -> [f64; 3] {
    let a = el.a[0] + el.a[1] * t;
    let e = el.e[0] + el.e[1] * t;
    let i = el.i[0] + el.i[1] * t;
    let l = el.l[0] + el.l[1] * t;
    let peri = el.peri[0] + el.peri[1] * t;
    let node = el.node[0] + el.node[1] * t;

    let omega = peri - node;
    let ecc = solve_kepler(degnorm(l - peri), e);
    let xp = a * (ecc.cos() - e);
    let yp = a * (1.0 - e * e).sqrt() * ecc.sin();

    let (so, co) = (sind(omega), cosd(omega));
    let (sn, cn) = (sind(node), cosd(node));
    let (si, ci) = (sind(i), cosd(i));
    [
        (co * cn - so * sn * ci) * xp + (-so * cn - co * sn * ci) * yp,
        (co * sn + so * cn * ci) * xp + (-so * sn + co * cn * ci) * yp,
        (so * si) * xp + (co * si) * yp,
    ]
}

fn planet(index: usize, jd_tt: f64, corr: &Corrections) -> [f64; 3] {
    let el = &ELEMENTS[index];
    if corr.heliocentric {
        return cartesian_to_spherical(kepler_vector(el, centuries(jd_tt)));
    }

    let earth = earth_vector(jd_tt);
    let geocentric_at = |tau: f64| {
        let p = kepler_vector(el, centuries(jd_tt - tau));
        [p[0] - earth[0], p[1] - earth[1], p[2] - earth[2]]
    };

    let mut v = geocentric_at(0.0);
    if !corr.no_light_time {
        for _ in 0..2 {
            let dist = cartesian_to_spherical(v)[2];
            v = geocentric_at(dist * LIGHT_TIME_AU);
        }
    }
    let mut p = cartesian_to_spherical(v);

    if !corr.no_aberration && !corr.no_light_time {
        let sun_lon = degnorm(cartesian_to_spherical(earth)[0] + 180.0);
        let dlon = -ABERRATION * cosd(sun_lon - p[0]) / cosd(p[1]);
        let dlat = -ABERRATION * sind(sun_lon - p[0]) * sind(p[1]);
        p[0] = degnorm(p[0] + dlon);
        p[1] += dlat;
    }
    p
}
