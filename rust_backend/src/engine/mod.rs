//! The external ephemeris engine as seen from the boundary.
//!
//! [`Engine`] mirrors the C contract one-to-one: fixed-size output buffers,
//! a 256-byte message buffer and `i32` return codes where a negative value
//! means failure. Nothing in this module interprets results; translation into
//! [`crate::error::BridgeError`] happens in [`crate::adapter`].
//!
//! - [`NativeEngine`]: the linked Swiss Ephemeris library (feature `native`)
//! - [`BuiltinEngine`]: analytical stand-in for builds and tests without the
//!   library (feature `builtin`)

#[cfg(feature = "builtin")]
pub mod builtin;
#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "builtin")]
pub use builtin::BuiltinEngine;
#[cfg(feature = "native")]
pub use native::NativeEngine;

use std::fmt;
use std::os::raw::c_char;

use sweph_sys as sys;

use crate::types::{AngleSet, CelestialPosition, EclipseTimings, HouseCusps};

/// Side-channel message buffer of the C API (`char serr[AS_MAXCH]`).
///
/// The engine writes a NUL-terminated diagnostic into it; a fresh buffer is
/// used for every call so no message outlives the call that produced it.
#[derive(Clone)]
pub struct ErrorBuffer {
    buf: [u8; sys::AS_MAXCH],
}

impl ErrorBuffer {
    pub fn new() -> Self {
        Self {
            buf: [0; sys::AS_MAXCH],
        }
    }

    /// Overwrite the buffer, truncating to `AS_MAXCH - 1` bytes on a char
    /// boundary.
    pub fn write(&mut self, message: &str) {
        let mut end = message.len().min(sys::AS_MAXCH - 1);
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        self.buf = [0; sys::AS_MAXCH];
        self.buf[..end].copy_from_slice(&message.as_bytes()[..end]);
    }

    pub fn clear(&mut self) {
        self.buf[0] = 0;
    }

    /// Copy the message out; `None` when the buffer is empty or blank.
    pub fn message(&self) -> Option<String> {
        let len = self.buf.iter().position(|&b| b == 0).unwrap_or(self.buf.len());
        let text = String::from_utf8_lossy(&self.buf[..len]);
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut c_char {
        self.buf.as_mut_ptr().cast()
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorBuffer").field(&self.message()).finish()
    }
}

/// The ephemeris engine contract.
///
/// Implementations may hold process-wide state and are not reentrant;
/// [`crate::session::Session`] serializes access.
pub trait Engine: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// `None` selects the engine's built-in default search behaviour.
    fn set_ephe_path(&mut self, path: Option<&str>);

    fn julday(&self, year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64;

    fn revjul(&self, jd: f64, gregflag: i32) -> (i32, i32, i32, f64);

    fn calc_ut(
        &mut self,
        tjd_ut: f64,
        ipl: i32,
        iflag: i32,
        xx: &mut CelestialPosition,
        serr: &mut ErrorBuffer,
    ) -> i32;

    fn lun_eclipse_when(
        &mut self,
        tjd_start: f64,
        ifl: i32,
        ifltype: i32,
        tret: &mut EclipseTimings,
        backward: i32,
        serr: &mut ErrorBuffer,
    ) -> i32;

    fn sol_eclipse_when_glob(
        &mut self,
        tjd_start: f64,
        ifl: i32,
        ifltype: i32,
        tret: &mut EclipseTimings,
        backward: i32,
        serr: &mut ErrorBuffer,
    ) -> i32;

    /// No diagnostic text is produced for this call.
    fn houses(
        &mut self,
        tjd_ut: f64,
        geolat: f64,
        geolon: f64,
        hsys: u8,
        cusps: &mut HouseCusps,
        ascmc: &mut AngleSet,
    ) -> i32;

    /// Canonical name of a body id, copied out of any engine-owned buffer.
    fn planet_name(&self, ipl: i32) -> String;

    fn version(&self) -> String;

    /// Release file handles and caches. Must tolerate repeated calls.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_buffer_round_trip() {
        let mut serr = ErrorBuffer::new();
        assert_eq!(serr.message(), None);
        serr.write("no eclipse found");
        assert_eq!(serr.message().as_deref(), Some("no eclipse found"));
        serr.clear();
        assert_eq!(serr.message(), None);
    }

    #[test]
    fn test_error_buffer_truncates_long_messages() {
        let mut serr = ErrorBuffer::new();
        let long = "é".repeat(400);
        serr.write(&long);
        let message = serr.message().unwrap();
        assert!(message.len() < sys::AS_MAXCH);
        assert!(message.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_error_buffer_overwrite_leaves_no_tail() {
        let mut serr = ErrorBuffer::new();
        serr.write("a much longer first message");
        serr.write("short");
        assert_eq!(serr.message().as_deref(), Some("short"));
    }
}
