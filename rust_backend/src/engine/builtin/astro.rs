//! Shared low-precision astronomy: time scales, nutation, obliquity,
//! sidereal time and frame rotations. Angles in degrees unless noted.

pub const J2000: f64 = 2451545.0;
pub const DAYS_PER_CENTURY: f64 = 36525.0;
/// Light time for one astronomical unit, in days
pub const LIGHT_TIME_AU: f64 = 0.005_775_518_3;
/// Obliquity of the ecliptic at J2000
pub const OBLIQUITY_J2000: f64 = 23.439_291_1;

pub fn degnorm(x: f64) -> f64 {
    let r = x.rem_euclid(360.0);
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Signed difference `a - b` folded into (-180, 180].
pub fn difdeg(a: f64, b: f64) -> f64 {
    let d = degnorm(a - b);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

pub fn sind(x: f64) -> f64 {
    x.to_radians().sin()
}

pub fn cosd(x: f64) -> f64 {
    x.to_radians().cos()
}

pub fn tand(x: f64) -> f64 {
    x.to_radians().tan()
}

pub fn atan2d(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

pub fn asind(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Julian centuries since J2000.
pub fn centuries(jd: f64) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

/// ΔT = TT - UT in days, from piecewise polynomial fits of the observed
/// and extrapolated values.
pub fn delta_t(jd_ut: f64) -> f64 {
    let y = 2000.0 + (jd_ut - J2000) / 365.25;
    let seconds = if y < 1800.0 || y >= 2150.0 {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    } else if y < 1860.0 {
        let t = y - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t.powi(2) + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if y < 1900.0 {
        let t = y - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t.powi(2) + 0.01680668 * t.powi(3)
            - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233174.0
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
            - 0.000197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    };
    seconds / 86400.0
}

/// Nutation in longitude and obliquity `(Δψ, Δε)`, main terms only.
pub fn nutation(t: f64) -> (f64, f64) {
    let omega = 125.04452 - 1934.136261 * t;
    let l_sun = 280.4665 + 36000.7698 * t;
    let l_moon = 218.3165 + 481267.8813 * t;
    let dpsi = -17.20 * sind(omega) - 1.32 * sind(2.0 * l_sun) - 0.23 * sind(2.0 * l_moon)
        + 0.21 * sind(2.0 * omega);
    let deps = 9.20 * cosd(omega) + 0.57 * cosd(2.0 * l_sun) + 0.10 * cosd(2.0 * l_moon)
        - 0.09 * cosd(2.0 * omega);
    (dpsi / 3600.0, deps / 3600.0)
}

/// Mean obliquity of the ecliptic.
pub fn mean_obliquity(t: f64) -> f64 {
    let arcsec = 21.448 - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t;
    23.0 + 26.0 / 60.0 + arcsec / 3600.0
}

/// General precession in longitude since J2000.
pub fn precession(t: f64) -> f64 {
    (5028.796195 * t + 1.1054348 * t * t) / 3600.0
}

/// Greenwich mean sidereal time for a UT Julian day.
pub fn gmst(jd_ut: f64) -> f64 {
    let t = centuries(jd_ut);
    degnorm(
        280.46061837 + 360.98564736629 * (jd_ut - J2000) + 0.000387933 * t * t
            - t * t * t / 38710000.0,
    )
}

/// Rotate ecliptic `(lon, lat)` into equatorial `(ra, dec)` for obliquity `eps`.
pub fn ecliptic_to_equatorial(lon: f64, lat: f64, eps: f64) -> (f64, f64) {
    let ra = atan2d(sind(lon) * cosd(eps) - tand(lat) * sind(eps), cosd(lon));
    let dec = asind(sind(lat) * cosd(eps) + cosd(lat) * sind(eps) * sind(lon));
    (degnorm(ra), dec)
}

pub fn spherical_to_cartesian(lon: f64, lat: f64, r: f64) -> [f64; 3] {
    [
        r * cosd(lat) * cosd(lon),
        r * cosd(lat) * sind(lon),
        r * sind(lat),
    ]
}

pub fn cartesian_to_spherical(v: [f64; 3]) -> [f64; 3] {
    let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if r == 0.0 {
        return [0.0; 3];
    }
    let lon = degnorm(atan2d(v[1], v[0]));
    let lat = asind(v[2] / r);
    [lon, lat, r]
}
