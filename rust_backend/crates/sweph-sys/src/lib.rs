//! # sweph-sys
//!
//! Low-level FFI bindings to the Swiss Ephemeris C library (`libswe`).
//!
//! This crate provides the raw, unsafe `swe_*` functions together with the
//! numeric constants of `swephexp.h`. For a safe API use the `sweph-bridge`
//! crate instead.
//!
//! ## Safety
//!
//! All functions in this crate are unsafe. Callers must ensure:
//! - Output buffers have at least the documented length (6 for `xx`, 10 for
//!   `tret`/`ascmc`, 13 for `cusps`, [`AS_MAXCH`] for message buffers)
//! - Strings are NUL-terminated
//! - Calls are serialized: the library keeps process-wide mutable state
//!
//! ## Example
//!
//! ```rust,ignore
//! use sweph_sys::*;
//! use std::ffi::CStr;
//! use std::os::raw::c_char;
//!
//! unsafe {
//!     let mut buf = [0 as c_char; AS_MAXCH];
//!     swe_version(buf.as_mut_ptr());
//!     println!("Swiss Ephemeris {}", CStr::from_ptr(buf.as_ptr()).to_string_lossy());
//! }
//! ```

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_double, c_int};

// ============================================================================
// Return Codes and Buffer Sizes
// ============================================================================

pub const OK: i32 = 0;
pub const ERR: i32 = -1;

/// Size of every message/name buffer passed to the library
pub const AS_MAXCH: usize = 256;

/// Output buffer lengths fixed by the C API
pub const POSITION_LEN: usize = 6;
pub const ECLIPSE_TIMES_LEN: usize = 10;
pub const HOUSE_CUSPS_LEN: usize = 13;
pub const ASCMC_LEN: usize = 10;

// ============================================================================
// Calendar Flags
// ============================================================================

pub const SE_JUL_CAL: i32 = 0;
pub const SE_GREG_CAL: i32 = 1;

// ============================================================================
// Body Identifiers
// ============================================================================

pub const SE_ECL_NUT: i32 = -1;
pub const SE_SUN: i32 = 0;
pub const SE_MOON: i32 = 1;
pub const SE_MERCURY: i32 = 2;
pub const SE_VENUS: i32 = 3;
pub const SE_MARS: i32 = 4;
pub const SE_JUPITER: i32 = 5;
pub const SE_SATURN: i32 = 6;
pub const SE_URANUS: i32 = 7;
pub const SE_NEPTUNE: i32 = 8;
pub const SE_PLUTO: i32 = 9;
pub const SE_MEAN_NODE: i32 = 10;
pub const SE_TRUE_NODE: i32 = 11;
pub const SE_MEAN_APOG: i32 = 12;
pub const SE_OSCU_APOG: i32 = 13;
pub const SE_EARTH: i32 = 14;
pub const SE_CHIRON: i32 = 15;
pub const SE_PHOLUS: i32 = 16;
pub const SE_CERES: i32 = 17;
pub const SE_PALLAS: i32 = 18;
pub const SE_JUNO: i32 = 19;
pub const SE_VESTA: i32 = 20;
pub const SE_INTP_APOG: i32 = 21;
pub const SE_INTP_PERG: i32 = 22;
pub const SE_NPLANETS: i32 = 23;

pub const SE_FICT_OFFSET: i32 = 40;
pub const SE_FICT_MAX: i32 = 999;
pub const SE_AST_OFFSET: i32 = 10000;
pub const SE_FIXSTAR: i32 = -10;

// ============================================================================
// Computation Flags
// ============================================================================

pub const SEFLG_JPLEPH: i32 = 1;
pub const SEFLG_SWIEPH: i32 = 2;
pub const SEFLG_MOSEPH: i32 = 4;
pub const SEFLG_HELCTR: i32 = 8;
pub const SEFLG_TRUEPOS: i32 = 16;
pub const SEFLG_J2000: i32 = 32;
pub const SEFLG_NONUT: i32 = 64;
pub const SEFLG_SPEED3: i32 = 128;
pub const SEFLG_SPEED: i32 = 256;
pub const SEFLG_NOGDEFL: i32 = 512;
pub const SEFLG_NOABERR: i32 = 1024;
pub const SEFLG_EQUATORIAL: i32 = 2048;
pub const SEFLG_XYZ: i32 = 4096;
pub const SEFLG_RADIANS: i32 = 8192;
pub const SEFLG_BARYCTR: i32 = 16384;
pub const SEFLG_TOPOCTR: i32 = 32 * 1024;
pub const SEFLG_SIDEREAL: i32 = 64 * 1024;

/// Mask of the three ephemeris selector bits
pub const SEFLG_EPHMASK: i32 = SEFLG_JPLEPH | SEFLG_SWIEPH | SEFLG_MOSEPH;

// ============================================================================
// Eclipse Type Bits
// ============================================================================

pub const SE_ECL_CENTRAL: i32 = 1;
pub const SE_ECL_NONCENTRAL: i32 = 2;
pub const SE_ECL_TOTAL: i32 = 4;
pub const SE_ECL_ANNULAR: i32 = 8;
pub const SE_ECL_PARTIAL: i32 = 16;
pub const SE_ECL_ANNULAR_TOTAL: i32 = 32;
pub const SE_ECL_PENUMBRAL: i32 = 64;
pub const SE_ECL_ALLTYPES_SOLAR: i32 = SE_ECL_CENTRAL
    | SE_ECL_NONCENTRAL
    | SE_ECL_TOTAL
    | SE_ECL_ANNULAR
    | SE_ECL_PARTIAL
    | SE_ECL_ANNULAR_TOTAL;
pub const SE_ECL_ALLTYPES_LUNAR: i32 = SE_ECL_TOTAL | SE_ECL_PARTIAL | SE_ECL_PENUMBRAL;

// ============================================================================
// AscMc Slots
// ============================================================================

pub const SE_ASC: usize = 0;
pub const SE_MC: usize = 1;
pub const SE_ARMC: usize = 2;
pub const SE_VERTEX: usize = 3;
pub const SE_EQUASC: usize = 4;
pub const SE_COASC1: usize = 5;
pub const SE_COASC2: usize = 6;
pub const SE_POLASC: usize = 7;

// ============================================================================
// FFI Function Declarations
// ============================================================================

extern "C" {
    // Configuration and lifecycle
    pub fn swe_set_ephe_path(path: *const c_char);
    pub fn swe_close();
    pub fn swe_version(s: *mut c_char) -> *mut c_char;

    // Calendar
    pub fn swe_julday(
        year: c_int,
        month: c_int,
        day: c_int,
        hour: c_double,
        gregflag: c_int,
    ) -> c_double;

    pub fn swe_revjul(
        jd: c_double,
        gregflag: c_int,
        jyear: *mut c_int,
        jmon: *mut c_int,
        jday: *mut c_int,
        jut: *mut c_double,
    );

    // Positions
    pub fn swe_calc_ut(
        tjd_ut: c_double,
        ipl: i32,
        iflag: i32,
        xx: *mut c_double,
        serr: *mut c_char,
    ) -> i32;

    pub fn swe_get_planet_name(ipl: c_int, spname: *mut c_char) -> *mut c_char;

    // Eclipses
    pub fn swe_lun_eclipse_when(
        tjd_start: c_double,
        ifl: i32,
        ifltype: i32,
        tret: *mut c_double,
        backward: i32,
        serr: *mut c_char,
    ) -> i32;

    pub fn swe_sol_eclipse_when_glob(
        tjd_start: c_double,
        ifl: i32,
        ifltype: i32,
        tret: *mut c_double,
        backward: i32,
        serr: *mut c_char,
    ) -> i32;

    // Houses
    pub fn swe_houses(
        tjd_ut: c_double,
        geolat: c_double,
        geolon: c_double,
        hsys: c_int,
        cusps: *mut c_double,
        ascmc: *mut c_double,
    ) -> c_int;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeris_mask_covers_selectors() {
        assert_eq!(SEFLG_EPHMASK, 7);
        assert_eq!(SEFLG_SWIEPH | SEFLG_SPEED, 258);
    }

    #[test]
    fn test_eclipse_type_masks() {
        assert_eq!(SE_ECL_ALLTYPES_LUNAR, 4 | 16 | 64);
        assert_eq!(SE_ECL_ALLTYPES_SOLAR & SE_ECL_PENUMBRAL, 0);
    }

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(POSITION_LEN, 6);
        assert_eq!(ECLIPSE_TIMES_LEN, 10);
        assert_eq!(HOUSE_CUSPS_LEN, 13);
        assert_eq!(ASCMC_LEN, 10);
        assert_eq!(AS_MAXCH, 256);
    }
}
