//! Swiss Ephemeris host bindings.
//!
//! One engine, two hosts. Arguments from either host are resolved against a
//! shared signature table ([`resolver`]), executed under the process-wide
//! [`session`] lock ([`dispatch`]), and rendered into host values through a
//! [`marshal::HostMarshal`]:
//!
//! - [`python`]: in-process extension module (feature `python`)
//! - [`sandbox`]: JSON message surface plus a flat C ABI for sandboxed VMs
//!
//! The engine itself sits behind [`engine::Engine`]. The `native` feature
//! links the C library through `sweph-sys` and becomes the default engine
//! when enabled. The `builtin` feature (on by default) provides an
//! analytical stand-in so the crate builds and tests without the library.

#[cfg(not(any(feature = "builtin", feature = "native")))]
compile_error!("enable at least one engine feature: `builtin` or `native`");

pub mod adapter;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod marshal;
pub mod resolver;
pub mod sandbox;
pub mod session;
pub mod types;

#[cfg(feature = "python")]
pub mod python;


pub use config::{BridgeConfig, ClosePolicy, EngineKind};
#[cfg(feature = "builtin")]
pub use engine::BuiltinEngine;
#[cfg(feature = "native")]
pub use engine::NativeEngine;
pub use engine::{Engine, ErrorBuffer};
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use marshal::{HostMarshal, Outcome};
pub use resolver::{Call, HostValue, Operation, Primitive};
pub use sandbox::SandboxModule;
pub use session::{Session, SharedSession};
pub use types::{
    CalendarDate, CalendarSystem, EclipseResult, HouseResult, JulianDay, PositionResult,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module entry point.
#[cfg(feature = "python")]
#[pymodule]
fn sweph_bridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register_operation_functions(m)?;
    python::register_module_items(m)?;
    Ok(())
}
