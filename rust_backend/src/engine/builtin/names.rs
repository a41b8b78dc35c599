//! Canonical body names.

use sweph_sys as sys;

const PLANETS: [&str; 23] = [
    "Sun",
    "Moon",
    "Mercury",
    "Venus",
    "Mars",
    "Jupiter",
    "Saturn",
    "Uranus",
    "Neptune",
    "Pluto",
    "mean Node",
    "true Node",
    "mean Apogee",
    "osc. Apogee",
    "Earth",
    "Chiron",
    "Pholus",
    "Ceres",
    "Pallas",
    "Juno",
    "Vesta",
    "intp. Apogee",
    "intp. Perigee",
];

const FICTITIOUS: [&str; 19] = [
    "Cupido",
    "Hades",
    "Zeus",
    "Kronos",
    "Apollon",
    "Admetos",
    "Vulkanus",
    "Poseidon",
    "Isis",
    "Nibiru",
    "Harrington",
    "Leverrier",
    "Adams",
    "Lowell",
    "Pickering",
    "Vulcan",
    "White Moon",
    "Proserpina",
    "Waldemath",
];

pub fn planet_name(ipl: i32) -> String {
    match ipl {
        sys::SE_ECL_NUT => "Ecl. Nut.".to_string(),
        sys::SE_FIXSTAR => "fixed star".to_string(),
        id if (sys::SE_SUN..sys::SE_NPLANETS).contains(&id) => PLANETS[id as usize].to_string(),
        id if id >= sys::SE_FICT_OFFSET
            && ((id - sys::SE_FICT_OFFSET) as usize) < FICTITIOUS.len() =>
        {
            FICTITIOUS[(id - sys::SE_FICT_OFFSET) as usize].to_string()
        }
        // minor planets are reported by catalogue number
        id if id > sys::SE_AST_OFFSET => (id - sys::SE_AST_OFFSET).to_string(),
        id => id.to_string(),
    }
}
