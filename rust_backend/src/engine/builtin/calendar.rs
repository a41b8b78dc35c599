//! Julian day <-> calendar date, Gregorian or Julian calendar.

use sweph_sys as sys;

pub fn julday(year: i32, month: i32, day: i32, hour: f64, gregflag: i32) -> f64 {
    let mut u = f64::from(year);
    if month < 3 {
        u -= 1.0;
    }
    let u0 = u + 4712.0;
    let mut u1 = f64::from(month) + 1.0;
    if u1 < 4.0 {
        u1 += 12.0;
    }
    let mut jd = (u0 * 365.25).floor() + (30.6 * u1 + 0.000001).floor() + f64::from(day)
        + hour / 24.0
        - 63.5;

    if gregflag == sys::SE_GREG_CAL {
        let mut u2 = (u.abs() / 100.0).floor() - (u.abs() / 400.0).floor();
        if u < 0.0 {
            u2 = -u2;
        }
        jd = jd - u2 + 2.0;
        if u < 0.0 && u / 100.0 == (u / 100.0).floor() && u / 400.0 != (u / 400.0).floor() {
            jd -= 1.0;
        }
    }
    jd
}

pub fn revjul(jd: f64, gregflag: i32) -> (i32, i32, i32, f64) {
    let mut u0 = jd + 32082.5;
    if gregflag == sys::SE_GREG_CAL {
        let mut u1 = u0 + (u0 / 36525.0).floor() - (u0 / 146100.0).floor() - 38.0;
        if jd >= 1830691.5 {
            u1 += 1.0;
        }
        u0 = u0 + (u1 / 36525.0).floor() - (u1 / 146100.0).floor() - 38.0;
    }
    let u2 = (u0 + 123.0).floor();
    let u3 = ((u2 - 122.2) / 365.25).floor();
    let u4 = ((u2 - (365.25 * u3).floor()) / 30.6001).floor();

    let mut month = (u4 - 1.0) as i32;
    if month > 12 {
        month -= 12;
    }
    let day = (u2 - (365.25 * u3).floor() - (30.6001 * u4).floor()) as i32;
    let year = (u3 + ((u4 - 2.0) / 12.0).floor() - 4800.0) as i32;
    let hour = (jd - (jd + 0.5).floor() + 0.5) * 24.0;
    (year, month, day, hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_j2000_epoch() {
        assert_eq!(julday(2000, 1, 1, 12.0, sys::SE_GREG_CAL), 2451545.0);
        assert_eq!(revjul(2451545.0, sys::SE_GREG_CAL), (2000, 1, 1, 12.0));
    }

    #[test]
    fn test_julian_calendar_offset() {
        // 1582-10-15 Gregorian is 1582-10-05 Julian
        let greg = julday(1582, 10, 15, 0.0, sys::SE_GREG_CAL);
        let jul = julday(1582, 10, 5, 0.0, sys::SE_JUL_CAL);
        assert_eq!(greg, jul);
        assert_eq!(greg, 2299160.5);
    }

    #[test]
    fn test_negative_years() {
        let jd = julday(-4712, 1, 1, 12.0, sys::SE_JUL_CAL);
        assert_abs_diff_eq!(jd, 0.0, epsilon = 1e-9);
        let (y, m, d, h) = revjul(0.0, sys::SE_JUL_CAL);
        assert_eq!((y, m, d), (-4712, 1, 1));
        assert_abs_diff_eq!(h, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_leap_day_round_trip() {
        let jd = julday(2024, 2, 29, 6.25, sys::SE_GREG_CAL);
        let (y, m, d, h) = revjul(jd, sys::SE_GREG_CAL);
        assert_eq!((y, m, d), (2024, 2, 29));
        assert_abs_diff_eq!(h, 6.25, epsilon = 1e-6);
    }
}
