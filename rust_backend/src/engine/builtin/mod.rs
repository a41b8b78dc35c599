//! Pure-Rust analytical engine (feature `builtin`).
//!
//! A stand-in for builds and tests without the C library, not a replacement
//! for it. Dates are limited to roughly 3000 BC .. AD 3000.
//!
//! Implements the engine contract without the C library: calendar
//! conversions are exact, positions come from analytical theories and are
//! accurate to roughly an arcminute for the Sun and Moon and a few arcminutes
//! for the planets. Requests for file-based ephemerides are served from the
//! analytical theory and flagged with a warning, the same way the C library
//! falls back when its data files are missing.

mod astro;
mod bodies;
mod calendar;
mod eclipses;
mod houses;
mod names;

use sweph_sys as sys;

use self::astro::{delta_t, difdeg, ecliptic_to_equatorial, mean_obliquity};
use self::bodies::Corrections;
use self::eclipses::EclipseKind;
use super::{Engine, ErrorBuffer};
use crate::types::{AngleSet, CelestialPosition, EclipseTimings, HouseCusps};

/// Flags the analytical theories honour; everything else is dropped from
/// the returned flag set.
const SUPPORTED_FLAGS: i32 = sys::SEFLG_SPEED
    | sys::SEFLG_SPEED3
    | sys::SEFLG_HELCTR
    | sys::SEFLG_TRUEPOS
    | sys::SEFLG_J2000
    | sys::SEFLG_NONUT
    | sys::SEFLG_NOGDEFL
    | sys::SEFLG_NOABERR
    | sys::SEFLG_EQUATORIAL
    | sys::SEFLG_RADIANS;

/// Half-width of the central difference used for speeds, in days
const SPEED_STEP: f64 = 0.005;

/// Dates the analytical theories cover, about 3000 BC to AD 3000.
const JD_RANGE: std::ops::RangeInclusive<f64> = 625_000.5..=2_818_000.5;

fn in_range(jd: f64) -> bool {
    JD_RANGE.contains(&jd)
}

fn out_of_range(jd: f64, serr: &mut ErrorBuffer) -> i32 {
    serr.write(&format!(
        "jd {} outside the range of the analytical ephemeris ({} .. {})",
        jd,
        JD_RANGE.start(),
        JD_RANGE.end()
    ));
    sys::ERR
}

#[derive(Debug, Default)]
pub struct BuiltinEngine {
    ephe_path: Option<String>,
}

impl BuiltinEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path recorded by the last `set_ephe_path`; cleared by `close`.
    pub fn ephe_path(&self) -> Option<&str> {
        self.ephe_path.as_deref()
    }

    fn fallback_warning(&self, iflag: i32) -> Option<String> {
        if iflag & sys::SEFLG_MOSEPH != 0 {
            return None;
        }
        Some(match &self.ephe_path {
            Some(path) => format!(
                "ephemeris files in '{}' are not read by this engine; using analytical ephemeris",
                path
            ),
            None => "ephemeris files not available; using analytical ephemeris".to_string(),
        })
    }

    /// `[a, b, r]` in the coordinate system selected by `iflag`, degrees.
    fn coordinates(ipl: i32, jd_tt: f64, iflag: i32, corr: &Corrections) -> [f64; 3] {
        let p = bodies::position(ipl, jd_tt, corr);
        if iflag & sys::SEFLG_EQUATORIAL == 0 || p[2] == 0.0 {
            return p;
        }
        let t = astro::centuries(jd_tt);
        let eps = if corr.j2000 {
            astro::OBLIQUITY_J2000
        } else if corr.no_nutation {
            mean_obliquity(t)
        } else {
            mean_obliquity(t) + astro::nutation(t).1
        };
        let (ra, dec) = ecliptic_to_equatorial(p[0], p[1], eps);
        [ra, dec, p[2]]
    }
}

impl Engine for BuiltinEngine {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn set_ephe_path(&mut self, path: Option<&str>) {
        log::debug!("builtin engine: ephemeris path set to {:?}", path);
        self.ephe_path = path.map(str::to_string);
    }

    fn julday(&self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
        calendar::julday(year, month, day, hour, gregflag)
    }

    fn revjul(&self, jd: f64, gregflag: i32) -> (i32, i32, i32, f64) {
        calendar::revjul(jd, gregflag)
    }

    fn calc_ut(
        &mut self,
        tjd_ut: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut CelestialPosition,
        serr: &mut ErrorBuffer,
    ) -> i32 {
        *xx = [0.0; sys::POSITION_LEN];
        if !bodies::is_supported(ipl) {
            serr.write(&format!(
                "body {} ({}) is not supported by the analytical ephemeris",
                ipl,
                names::planet_name(ipl)
            ));
            return sys::ERR;
        }
        if !in_range(tjd_ut) {
            return out_of_range(tjd_ut, serr);
        }

        let unsupported = iflag & !(SUPPORTED_FLAGS | sys::SEFLG_EPHMASK);
        if unsupported != 0 {
            log::debug!("builtin engine: ignoring flags {:#x}", unsupported);
        }

        let corr = Corrections::from_flags(iflag);
        let jd_tt = tjd_ut + delta_t(tjd_ut);
        let p = Self::coordinates(ipl, jd_tt, iflag, &corr);

        let mut speed = [0.0; 3];
        if iflag & (sys::SEFLG_SPEED | sys::SEFLG_SPEED3) != 0 {
            let before = Self::coordinates(ipl, jd_tt - SPEED_STEP, iflag, &corr);
            let after = Self::coordinates(ipl, jd_tt + SPEED_STEP, iflag, &corr);
            speed = [
                difdeg(after[0], before[0]) / (2.0 * SPEED_STEP),
                (after[1] - before[1]) / (2.0 * SPEED_STEP),
                (after[2] - before[2]) / (2.0 * SPEED_STEP),
            ];
        }

        *xx = [p[0], p[1], p[2], speed[0], speed[1], speed[2]];
        if iflag & sys::SEFLG_RADIANS != 0 {
            for i in [0, 1, 3, 4] {
                xx[i] = xx[i].to_radians();
            }
        }
        if xx.iter().any(|x| !x.is_finite()) {
            *xx = [0.0; sys::POSITION_LEN];
            return out_of_range(tjd_ut, serr);
        }

        if let Some(warning) = self.fallback_warning(iflag) {
            serr.write(&warning);
        }
        (iflag & SUPPORTED_FLAGS & !sys::SEFLG_EPHMASK) | sys::SEFLG_MOSEPH
    }

    fn lun_eclipse_when(
        &mut self,
        tjd_start: f64,
        ifl: i32,
        ifltype: i32,
        tret: &mut EclipseTimings,
        backward: i32,
        serr: &mut ErrorBuffer,
    ) -> i32 {
        *tret = [0.0; sys::ECLIPSE_TIMES_LEN];
        if !in_range(tjd_start) {
            return out_of_range(tjd_start, serr);
        }
        let code = eclipses::search(EclipseKind::Lunar, tjd_start, ifltype, backward != 0, tret, serr);
        if code >= 0 {
            if let Some(warning) = self.fallback_warning(ifl) {
                serr.write(&warning);
            }
        }
        code
    }

    fn sol_eclipse_when_glob(
        &mut self,
        tjd_start: f64,
        ifl: i32,
        ifltype: i32,
        tret: &mut EclipseTimings,
        backward: i32,
        serr: &mut ErrorBuffer,
    ) -> i32 {
        *tret = [0.0; sys::ECLIPSE_TIMES_LEN];
        if !in_range(tjd_start) {
            return out_of_range(tjd_start, serr);
        }
        let code = eclipses::search(EclipseKind::Solar, tjd_start, ifltype, backward != 0, tret, serr);
        if code >= 0 {
            if let Some(warning) = self.fallback_warning(ifl) {
                serr.write(&warning);
            }
        }
        code
    }

    fn houses(
        &mut self,
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: u8,
        cusps: &mut HouseCusps,
        ascmc: &mut AngleSet,
    ) -> i32 {
        if !in_range(tjd_ut) {
            *cusps = [0.0; sys::HOUSE_CUSPS_LEN];
            *ascmc = [0.0; sys::ASCMC_LEN];
            return sys::ERR;
        }
        houses::houses(tjd_ut, geolat, geolon, hsys, cusps, ascmc)
    }

    fn planet_name(&self, ipl: i32) -> String {
        names::planet_name(ipl)
    }

    fn version(&self) -> String {
        format!("builtin {}", env!("CARGO_PKG_VERSION"))
    }

    fn close(&mut self) {
        self.ephe_path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const J2000: f64 = 2451545.0;
    const DEFAULT_FLAGS: i32 = sys::SEFLG_SWIEPH | sys::SEFLG_SPEED;

    fn obliquity_of_date(jd_tt: f64) -> f64 {
        let t = astro::centuries(jd_tt);
        mean_obliquity(t) + astro::nutation(t).1
    }

    fn calc(engine: &mut BuiltinEngine, ipl: i32, iflag: i32) -> (i32, CelestialPosition, ErrorBuffer) {
        let mut xx = [f64::NAN; 6];
        let mut serr = ErrorBuffer::new();
        let code = engine.calc_ut(J2000, ipl, iflag, &mut xx, &mut serr);
        (code, xx, serr)
    }

    #[test]
    fn test_sun_default_flags() {
        let mut engine = BuiltinEngine::new();
        let (code, xx, serr) = calc(&mut engine, sys::SE_SUN, DEFAULT_FLAGS);
        assert_eq!(code, 260);
        assert!((0.0..360.0).contains(&xx[0]));
        // the Sun moves close to one degree per day
        assert_abs_diff_eq!(xx[3], 1.019, epsilon = 0.01);
        assert!(serr.message().is_some());
    }

    #[test]
    fn test_moseph_request_has_no_warning() {
        let mut engine = BuiltinEngine::new();
        let (code, _, serr) = calc(&mut engine, sys::SE_MOON, sys::SEFLG_MOSEPH | sys::SEFLG_SPEED);
        assert_eq!(code, sys::SEFLG_MOSEPH | sys::SEFLG_SPEED);
        assert_eq!(serr.message(), None);
    }

    #[test]
    fn test_unsupported_body() {
        let mut engine = BuiltinEngine::new();
        let (code, xx, serr) = calc(&mut engine, sys::SE_CHIRON, DEFAULT_FLAGS);
        assert_eq!(code, sys::ERR);
        assert_eq!(xx, [0.0; 6]);
        assert!(serr.message().unwrap().contains("Chiron"));
    }

    #[test]
    fn test_radians_and_equatorial() {
        let mut engine = BuiltinEngine::new();
        let (_, deg, _) = calc(&mut engine, sys::SE_MARS, sys::SEFLG_MOSEPH);
        let (_, rad, _) = calc(&mut engine, sys::SE_MARS, sys::SEFLG_MOSEPH | sys::SEFLG_RADIANS);
        assert_abs_diff_eq!(rad[0], deg[0].to_radians(), epsilon = 1e-12);
        assert_eq!(rad[2], deg[2]);

        let (code, eq, _) = calc(&mut engine, sys::SE_MARS, sys::SEFLG_MOSEPH | sys::SEFLG_EQUATORIAL);
        assert_eq!(code & sys::SEFLG_EQUATORIAL, sys::SEFLG_EQUATORIAL);
        let (ra, dec) = ecliptic_to_equatorial(deg[0], deg[1], obliquity_of_date(J2000 + delta_t(J2000)));
        assert_abs_diff_eq!(eq[0], ra, epsilon = 1e-9);
        assert_abs_diff_eq!(eq[1], dec, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range_dates_fail() {
        let mut engine = BuiltinEngine::new();
        let mut xx = [f64::NAN; 6];
        let mut serr = ErrorBuffer::new();
        let code = engine.calc_ut(1e300, sys::SE_SUN, DEFAULT_FLAGS, &mut xx, &mut serr);
        assert_eq!(code, sys::ERR);
        assert_eq!(xx, [0.0; 6]);
        assert!(serr.message().unwrap().contains("outside the range"));

        let mut serr = ErrorBuffer::new();
        let code = engine.calc_ut(f64::NAN, sys::SE_MOON, DEFAULT_FLAGS, &mut xx, &mut serr);
        assert_eq!(code, sys::ERR);
        assert!(xx.iter().all(|x| x.is_finite()));

        let mut tret = [0.0; 10];
        let mut serr = ErrorBuffer::new();
        let code = engine.lun_eclipse_when(-1e12, sys::SEFLG_MOSEPH, 0, &mut tret, 0, &mut serr);
        assert_eq!(code, sys::ERR);
        assert!(serr.message().is_some());

        let mut cusps = [f64::NAN; 13];
        let mut ascmc = [f64::NAN; 10];
        let code = engine.houses(f64::INFINITY, 52.0, 13.4, b'P', &mut cusps, &mut ascmc);
        assert_eq!(code, sys::ERR);
        assert_eq!(cusps, [0.0; 13]);
    }

    #[test]
    fn test_speed_zero_without_flag() {
        let mut engine = BuiltinEngine::new();
        let (_, xx, _) = calc(&mut engine, sys::SE_JUPITER, sys::SEFLG_MOSEPH);
        assert_eq!(&xx[3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_geocentric_earth_is_zero() {
        let mut engine = BuiltinEngine::new();
        let (code, xx, _) = calc(&mut engine, sys::SE_EARTH, DEFAULT_FLAGS);
        assert!(code >= 0);
        assert_eq!(xx, [0.0; 6]);
    }

    #[test]
    fn test_j2000_frame_removes_precession_and_nutation() {
        let mut engine = BuiltinEngine::new();
        let (_, of_date, _) = calc(&mut engine, sys::SE_SATURN, sys::SEFLG_MOSEPH);
        let (_, j2000, _) = calc(&mut engine, sys::SE_SATURN, sys::SEFLG_MOSEPH | sys::SEFLG_J2000);
        let t = astro::centuries(J2000 + delta_t(J2000));
        let expected = astro::precession(t) + astro::nutation(t).0;
        assert_abs_diff_eq!(difdeg(of_date[0], j2000[0]), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_path_is_forgotten_on_close() {
        let mut engine = BuiltinEngine::new();
        engine.set_ephe_path(Some("/tmp/ephe"));
        assert_eq!(engine.ephe_path(), Some("/tmp/ephe"));
        engine.close();
        engine.close();
        assert_eq!(engine.ephe_path(), None);
    }

    #[test]
    fn test_eclipse_wrappers_clear_buffers() {
        let mut engine = BuiltinEngine::new();
        let mut tret = [f64::NAN; 10];
        let mut serr = ErrorBuffer::new();
        let ty = engine.lun_eclipse_when(J2000, sys::SEFLG_MOSEPH, 0, &mut tret, 0, &mut serr);
        assert_eq!(ty, sys::SE_ECL_TOTAL);
        assert!(tret.iter().all(|t| t.is_finite()));
        assert_eq!(tret[1], 0.0);

        let ty = engine.sol_eclipse_when_glob(J2000, sys::SEFLG_MOSEPH, 0, &mut tret, 0, &mut serr);
        assert_eq!(ty, sys::SE_ECL_PARTIAL);
    }

    #[test]
    fn test_version_names_the_engine() {
        let engine = BuiltinEngine::new();
        assert!(engine.version().starts_with("builtin "));
        assert_eq!(engine.planet_name(sys::SE_VENUS), "Venus");
    }
}
