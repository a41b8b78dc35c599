//! The linked Swiss Ephemeris library.
//!
//! Thin safe wrappers over [`sweph_sys`]. Every call hands the library
//! buffers of at least the size it writes, and text returned from
//! library-owned buffers is copied out before the call returns.
//!
//! The library keeps process-wide state, so every call holds
//! [`LIBRARY_LOCK`] regardless of how many engines or sessions exist.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use parking_lot::Mutex;
use sweph_sys as sys;

use super::{Engine, ErrorBuffer};
use crate::types::{AngleSet, CelestialPosition, EclipseTimings, HouseCusps};

/// Serializes every call into the library.
static LIBRARY_LOCK: Mutex<()> = Mutex::new(());

/// Cusp slots written for Gauquelin sectors (`'G'`): 36 sectors plus slot 0.
const GAUQUELIN_CUSPS_LEN: usize = 37;

fn copy_c_string(buf: &[c_char; sys::AS_MAXCH]) -> String {
    // SAFETY: the buffer is zero-initialised and the library NUL-terminates
    // everything it writes into AS_MAXCH-sized buffers
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// Handle to the process-wide library state.
///
/// Several handles may exist; they share the library state and the lock.
#[derive(Debug, Default)]
pub struct NativeEngine {
    _private: (),
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for NativeEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    fn set_ephe_path(&mut self, path: Option<&str>) {
        let _guard = LIBRARY_LOCK.lock();
        match path.map(CString::new) {
            Some(Ok(c_path)) => unsafe { sys::swe_set_ephe_path(c_path.as_ptr()) },
            Some(Err(_)) => {
                log::warn!("ephemeris path contains a NUL byte; using default search path");
                unsafe { sys::swe_set_ephe_path(std::ptr::null()) }
            }
            None => unsafe { sys::swe_set_ephe_path(std::ptr::null()) },
        }
    }

    fn julday(&self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
        let _guard = LIBRARY_LOCK.lock();
        unsafe { sys::swe_julday(year, month, day, hour, gregflag) }
    }

    fn revjul(&self, jd: f64, gregflag: i32) -> (i32, i32, i32, f64) {
        let (mut year, mut month, mut day): (c_int, c_int, c_int) = (0, 0, 0);
        let mut hour = 0.0;
        let _guard = LIBRARY_LOCK.lock();
        unsafe { sys::swe_revjul(jd, gregflag, &mut year, &mut month, &mut day, &mut hour) };
        (year, month, day, hour)
    }

    fn calc_ut(
        &mut self,
        tjd_ut: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut CelestialPosition,
        serr: &mut ErrorBuffer,
    ) -> i32 {
        let _guard = LIBRARY_LOCK.lock();
        unsafe { sys::swe_calc_ut(tjd_ut, ipl, iflag, xx.as_mut_ptr(), serr.as_mut_ptr()) }
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
        let _guard = LIBRARY_LOCK.lock();
        unsafe {
            sys::swe_lun_eclipse_when(
                tjd_start,
                ifl,
                ifltype,
                tret.as_mut_ptr(),
                backward,
                serr.as_mut_ptr(),
            )
        }
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
        let _guard = LIBRARY_LOCK.lock();
        unsafe {
            sys::swe_sol_eclipse_when_glob(
                tjd_start,
                ifl,
                ifltype,
                tret.as_mut_ptr(),
                backward,
                serr.as_mut_ptr(),
            )
        }
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
        // 'G' writes 37 cusps; the scratch buffer is large enough for every system
        let mut scratch = [0.0; GAUQUELIN_CUSPS_LEN];
        let code = {
            let _guard = LIBRARY_LOCK.lock();
            unsafe {
                sys::swe_houses(
                    tjd_ut,
                    geolat,
                    geolon,
                    c_int::from(hsys),
                    scratch.as_mut_ptr(),
                    ascmc.as_mut_ptr(),
                )
            }
        };
        cusps.copy_from_slice(&scratch[..sys::HOUSE_CUSPS_LEN]);
        code
    }

    fn planet_name(&self, ipl: i32) -> String {
        let mut buf = [0 as c_char; sys::AS_MAXCH];
        let _guard = LIBRARY_LOCK.lock();
        unsafe { sys::swe_get_planet_name(ipl, buf.as_mut_ptr()) };
        copy_c_string(&buf)
    }

    fn version(&self) -> String {
        let mut buf = [0 as c_char; sys::AS_MAXCH];
        let _guard = LIBRARY_LOCK.lock();
        unsafe { sys::swe_version(buf.as_mut_ptr()) };
        copy_c_string(&buf)
    }

    fn close(&mut self) {
        let _guard = LIBRARY_LOCK.lock();
        unsafe { sys::swe_close() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauquelin_sectors_fit_the_cusp_buffer() {
        let mut engine = NativeEngine::new();
        let mut cusps = [f64::NAN; sys::HOUSE_CUSPS_LEN];
        let mut ascmc = [f64::NAN; sys::ASCMC_LEN];
        for hsys in [b'G', b'g'] {
            let code = engine.houses(2451545.0, 52.0, 13.4, hsys, &mut cusps, &mut ascmc);
            assert!(code >= 0);
            assert!(cusps[1..].iter().all(|c| (0.0..360.0).contains(c)));
        }
    }

    #[test]
    fn test_separate_engines_share_the_library() {
        let handles: Vec<_> = (0..4i32)
            .map(|i| {
                std::thread::spawn(move || {
                    let mut engine = NativeEngine::new();
                    let mut xx = [0.0; sys::POSITION_LEN];
                    let mut serr = ErrorBuffer::new();
                    let jd = 2451545.0 + f64::from(i);
                    engine.calc_ut(jd, sys::SE_SUN, sys::SEFLG_MOSEPH, &mut xx, &mut serr)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap() >= 0);
        }
    }
}
