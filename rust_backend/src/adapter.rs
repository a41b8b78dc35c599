//! Numeric Engine Adapter: one typed function per engine capability.
//!
//! Each call allocates fresh, exactly-sized output buffers and a fresh
//! message buffer, invokes the engine and runs the return code through
//! [`check_return_code`]. Values are passed through untouched.

use crate::engine::{Engine, ErrorBuffer};
use crate::error::{check_return_code, BridgeResult, HOUSES_FAILED};
use crate::types::{
    CalendarDate, CalendarSystem, EclipseResult, HouseResult, JulianDay, PositionResult,
};

pub fn set_ephe_path(engine: &mut dyn Engine, path: Option<&str>) {
    engine.set_ephe_path(path);
}

pub fn julday(
    engine: &dyn Engine,
    year: i32,
    month: i32,
    day: i32,
    hour: f64,
    calendar: CalendarSystem,
) -> JulianDay {
    engine.julday(year, month, day, hour, calendar.flag())
}

pub fn revjul(engine: &dyn Engine, jd: JulianDay, calendar: CalendarSystem) -> CalendarDate {
    let (year, month, day, hour) = engine.revjul(jd, calendar.flag());
    CalendarDate::new(year, month, day, hour)
}

pub fn calc_ut(
    engine: &mut dyn Engine,
    tjd_ut: JulianDay,
    ipl: i32,
    iflag: i32,
) -> BridgeResult<PositionResult> {
    let mut position = [0.0; sweph_sys::POSITION_LEN];
    let mut serr = ErrorBuffer::new();
    let code = engine.calc_ut(tjd_ut, ipl, iflag, &mut position, &mut serr);
    let flags = check_return_code(code, &serr, None)?;
    Ok(PositionResult { position, flags })
}

pub fn lun_eclipse_when(
    engine: &mut dyn Engine,
    tjd_start: JulianDay,
    ifl: i32,
    ifltype: i32,
    backward: bool,
) -> BridgeResult<EclipseResult> {
    let mut times = [0.0; sweph_sys::ECLIPSE_TIMES_LEN];
    let mut serr = ErrorBuffer::new();
    let code = engine.lun_eclipse_when(
        tjd_start,
        ifl,
        ifltype,
        &mut times,
        i32::from(backward),
        &mut serr,
    );
    let eclipse_type = check_return_code(code, &serr, None)?;
    Ok(EclipseResult {
        eclipse_type,
        times,
    })
}

pub fn sol_eclipse_when_glob(
    engine: &mut dyn Engine,
    tjd_start: JulianDay,
    ifl: i32,
    ifltype: i32,
    backward: bool,
) -> BridgeResult<EclipseResult> {
    let mut times = [0.0; sweph_sys::ECLIPSE_TIMES_LEN];
    let mut serr = ErrorBuffer::new();
    let code = engine.sol_eclipse_when_glob(
        tjd_start,
        ifl,
        ifltype,
        &mut times,
        i32::from(backward),
        &mut serr,
    );
    let eclipse_type = check_return_code(code, &serr, None)?;
    Ok(EclipseResult {
        eclipse_type,
        times,
    })
}

/// The engine gives no diagnostic for house failures, so the message is
/// always [`HOUSES_FAILED`].
pub fn houses(
    engine: &mut dyn Engine,
    tjd_ut: JulianDay,
    geolat: f64,
    geolon: f64,
    hsys: u8,
) -> BridgeResult<HouseResult> {
    let mut cusps = [0.0; sweph_sys::HOUSE_CUSPS_LEN];
    let mut ascmc = [0.0; sweph_sys::ASCMC_LEN];
    let code = engine.houses(tjd_ut, geolat, geolon, hsys, &mut cusps, &mut ascmc);
    check_return_code(code, &ErrorBuffer::new(), Some(HOUSES_FAILED))?;
    Ok(HouseResult { cusps, ascmc })
}

pub fn planet_name(engine: &dyn Engine, ipl: i32) -> String {
    engine.planet_name(ipl)
}

pub fn version(engine: &dyn Engine) -> String {
    engine.version()
}

pub fn close(engine: &mut dyn Engine) {
    engine.close();
}
