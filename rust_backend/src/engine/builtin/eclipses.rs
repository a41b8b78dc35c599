//! Global eclipse search over lunations.
//!
//! Every new (solar) or full (lunar) moon is tested with the classical
//! lunation series: the instant of greatest eclipse, the shadow axis distance
//! `γ` and the penumbra/umbra radius `u`, all in Earth radii. Accuracy is a
//! few minutes of time, which is enough to classify and locate eclipses.

use sweph_sys as sys;

use super::astro::{cosd, delta_t, sind};
use crate::engine::ErrorBuffer;
use crate::types::EclipseTimings;

/// Epoch of lunation 0 (new moon of 2000-01-06) and mean synodic month
const LUNATION_EPOCH: f64 = 2451550.09766;
const SYNODIC_MONTH: f64 = 29.530588861;
/// Lunations searched before giving up
const SEARCH_HORIZON: usize = 20_000;
const MINUTES_PER_DAY: f64 = 1440.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EclipseKind {
    Solar,
    Lunar,
}

/// Geometry of one lunation at greatest eclipse.
#[derive(Debug, Clone, Copy)]
struct Lunation {
    /// Greatest eclipse, TT
    jde: f64,
    gamma: f64,
    u: f64,
    /// Hourly motion of the Moon relative to the shadow, Earth radii
    n: f64,
}

fn lunation(k: f64, kind: EclipseKind) -> Option<Lunation> {
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let f = 160.7108 + 390.67050284 * k - 0.0016118 * t2 - 0.00000227 * t3 + 0.000000011 * t4;
    if sind(f).abs() > 0.36 {
        return None;
    }

    let jde = LUNATION_EPOCH + SYNODIC_MONTH * k + 0.00015437 * t2 - 0.000000150 * t3
        + 0.00000000073 * t4;
    let m = 2.5534 + 29.10535670 * k - 0.0000014 * t2 - 0.00000011 * t3;
    let mp = 201.5643 + 385.81693528 * k + 0.0107582 * t2 + 0.00001238 * t3 - 0.000000058 * t4;
    let omega = 124.7746 - 1.56375588 * k + 0.0020672 * t2 + 0.00000215 * t3;
    let e = 1.0 - 0.002516 * t - 0.0000074 * t2;
    let f1 = f - 0.02665 * sind(omega);
    let a1 = 299.77 + 0.107408 * k - 0.009173 * t2;

    let (c_mp, c_m) = match kind {
        EclipseKind::Solar => (-0.4075, 0.1721),
        EclipseKind::Lunar => (-0.4065, 0.1727),
    };
    let correction = c_mp * sind(mp) + c_m * e * sind(m) + 0.0161 * sind(2.0 * mp)
        - 0.0097 * sind(2.0 * f1)
        + 0.0073 * e * sind(mp - m)
        - 0.0050 * e * sind(mp + m)
        - 0.0023 * sind(mp - 2.0 * f1)
        + 0.0021 * e * sind(2.0 * m)
        + 0.0012 * sind(mp + 2.0 * f1)
        + 0.0006 * e * sind(2.0 * mp + m)
        - 0.0004 * sind(3.0 * mp)
        - 0.0003 * e * sind(m + 2.0 * f1)
        + 0.0003 * sind(a1)
        - 0.0002 * e * sind(m - 2.0 * f1)
        - 0.0002 * e * sind(2.0 * mp - m)
        - 0.0002 * sind(omega);

    let p = 0.2070 * e * sind(m) + 0.0024 * e * sind(2.0 * m) - 0.0392 * sind(mp)
        + 0.0116 * sind(2.0 * mp)
        - 0.0073 * e * sind(mp + m)
        + 0.0067 * e * sind(mp - m)
        + 0.0118 * sind(2.0 * f1);
    let q = 5.2207 - 0.0048 * e * cosd(m) + 0.0020 * e * cosd(2.0 * m) - 0.3299 * cosd(mp)
        - 0.0060 * e * cosd(mp + m)
        + 0.0041 * e * cosd(mp - m);
    let w = cosd(f1).abs();
    let gamma = (p * cosd(f1) + q * sind(f1)) * (1.0 - 0.0048 * w);
    let u = 0.0059 + 0.0046 * e * cosd(m) - 0.0182 * cosd(mp) + 0.0004 * cosd(2.0 * mp)
        - 0.0005 * cosd(m + mp);

    Some(Lunation {
        jde: jde + correction,
        gamma,
        u,
        n: 0.5458 + 0.0400 * cosd(mp),
    })
}

/// Half-duration in days of the phase whose shadow radius is `radius`.
fn semi_duration(l: &Lunation, radius: f64) -> f64 {
    let x = radius * radius - l.gamma * l.gamma;
    if x <= 0.0 {
        0.0
    } else {
        60.0 / l.n * x.sqrt() / MINUTES_PER_DAY
    }
}

fn classify_solar(l: &Lunation) -> Option<i32> {
    let g = l.gamma.abs();
    if g > 1.5433 + l.u {
        return None;
    }
    let umbral_type = || {
        if l.u < 0.0 {
            sys::SE_ECL_TOTAL
        } else if l.u > 0.0047 {
            sys::SE_ECL_ANNULAR
        } else if l.u < 0.00464 * (1.0 - l.gamma * l.gamma).max(0.0).sqrt() {
            sys::SE_ECL_ANNULAR_TOTAL
        } else {
            sys::SE_ECL_ANNULAR
        }
    };
    Some(if g < 0.9972 {
        umbral_type() | sys::SE_ECL_CENTRAL
    } else if g < 1.0260 {
        umbral_type() | sys::SE_ECL_NONCENTRAL
    } else {
        sys::SE_ECL_PARTIAL
    })
}

fn classify_lunar(l: &Lunation) -> Option<i32> {
    let g = l.gamma.abs();
    let penumbral = (1.5573 + l.u - g) / 0.5450;
    let umbral = (1.0128 - l.u - g) / 0.5450;
    if penumbral <= 0.0 {
        None
    } else if umbral >= 1.0 {
        Some(sys::SE_ECL_TOTAL)
    } else if umbral > 0.0 {
        Some(sys::SE_ECL_PARTIAL)
    } else {
        Some(sys::SE_ECL_PENUMBRAL)
    }
}

fn solar_timings(l: &Lunation, eclipse_type: i32, tret: &mut EclipseTimings) {
    let max = l.jde - delta_t(l.jde);
    *tret = [0.0; sys::ECLIPSE_TIMES_LEN];
    tret[0] = max;
    let outer = semi_duration(l, 1.5433 + l.u);
    tret[2] = max - outer;
    tret[3] = max + outer;
    if eclipse_type & sys::SE_ECL_PARTIAL == 0 {
        let umbra = semi_duration(l, 1.0 + l.u.abs());
        tret[4] = max - umbra;
        tret[5] = max + umbra;
    }
    if eclipse_type & sys::SE_ECL_CENTRAL != 0 {
        let center = semi_duration(l, 1.0);
        tret[6] = max - center;
        tret[7] = max + center;
    }
}

fn lunar_timings(l: &Lunation, eclipse_type: i32, tret: &mut EclipseTimings) {
    let max = l.jde - delta_t(l.jde);
    *tret = [0.0; sys::ECLIPSE_TIMES_LEN];
    tret[0] = max;
    if eclipse_type & (sys::SE_ECL_PARTIAL | sys::SE_ECL_TOTAL) != 0 {
        let partial = semi_duration(l, 1.0128 - l.u);
        tret[2] = max - partial;
        tret[3] = max + partial;
    }
    if eclipse_type & sys::SE_ECL_TOTAL != 0 {
        let total = semi_duration(l, 0.4678 - l.u);
        tret[4] = max - total;
        tret[5] = max + total;
    }
    let penumbral = semi_duration(l, 1.5573 + l.u);
    tret[6] = max - penumbral;
    tret[7] = max + penumbral;
}

/// Normalize a solar type filter: 0 means every type, a bare
/// central/noncentral request means every umbral type with that geometry.
fn solar_filter(ifltype: i32) -> i32 {
    let geometry = sys::SE_ECL_CENTRAL | sys::SE_ECL_NONCENTRAL;
    let umbral = sys::SE_ECL_TOTAL | sys::SE_ECL_ANNULAR | sys::SE_ECL_ANNULAR_TOTAL;
    let mut filter = ifltype & sys::SE_ECL_ALLTYPES_SOLAR;
    if filter == 0 {
        return sys::SE_ECL_ALLTYPES_SOLAR;
    }
    if filter & !geometry == 0 {
        filter |= umbral;
    }
    if filter & geometry == 0 {
        filter |= geometry;
    }
    filter
}

fn solar_matches(filter: i32, eclipse_type: i32) -> bool {
    let kind = eclipse_type & !(sys::SE_ECL_CENTRAL | sys::SE_ECL_NONCENTRAL);
    let geometry = eclipse_type & (sys::SE_ECL_CENTRAL | sys::SE_ECL_NONCENTRAL);
    filter & kind != 0 && (geometry == 0 || filter & geometry != 0)
}

fn lunar_filter(ifltype: i32) -> Result<i32, &'static str> {
    let filter = ifltype & sys::SE_ECL_ALLTYPES_LUNAR;
    if filter != 0 {
        Ok(filter)
    } else if ifltype & (sys::SE_ECL_ANNULAR | sys::SE_ECL_ANNULAR_TOTAL) != 0 {
        Err("annular lunar eclipses don't exist")
    } else {
        Ok(sys::SE_ECL_ALLTYPES_LUNAR)
    }
}

/// Find the next (or previous, with `backward`) eclipse of `kind` whose
/// maximum lies strictly after (before) `jd_start`, UT.
///
/// Returns the eclipse type bits, or `ERR` with a message in `serr`.
pub fn search(
    kind: EclipseKind,
    jd_start: f64,
    ifltype: i32,
    backward: bool,
    tret: &mut EclipseTimings,
    serr: &mut ErrorBuffer,
) -> i32 {
    let filter = match kind {
        EclipseKind::Solar => solar_filter(ifltype),
        EclipseKind::Lunar => match lunar_filter(ifltype) {
            Ok(filter) => filter,
            Err(message) => {
                serr.write(message);
                return sys::ERR;
            }
        },
    };

    let phase = match kind {
        EclipseKind::Solar => 0.0,
        EclipseKind::Lunar => 0.5,
    };
    let step = if backward { -1.0 } else { 1.0 };
    let mut k = ((jd_start - LUNATION_EPOCH) / SYNODIC_MONTH).floor() + phase - step;

    for _ in 0..SEARCH_HORIZON {
        if let Some(l) = lunation(k, kind) {
            let max_ut = l.jde - delta_t(l.jde);
            let in_range = if backward {
                max_ut < jd_start
            } else {
                max_ut > jd_start
            };
            if in_range {
                let found = match kind {
                    EclipseKind::Solar => classify_solar(&l)
                        .filter(|&ty| solar_matches(filter, ty))
                        .map(|ty| {
                            solar_timings(&l, ty, tret);
                            ty
                        }),
                    EclipseKind::Lunar => classify_lunar(&l)
                        .filter(|&ty| filter & ty != 0)
                        .map(|ty| {
                            lunar_timings(&l, ty, tret);
                            ty
                        }),
                };
                if let Some(eclipse_type) = found {
                    return eclipse_type;
                }
            }
        }
        k += step;
    }

    serr.write("no eclipse found within the search horizon");
    sys::ERR
}
