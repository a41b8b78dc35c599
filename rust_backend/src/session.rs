//! Configuration State Manager.
//!
//! A [`Session`] owns the engine together with the process-wide ephemeris
//! path and the open/closed lifecycle. Both hosts reach the engine only
//! through the [`SharedSession`] returned by [`global`], whose mutex
//! serializes every call into the non-reentrant engine.

use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::adapter;
use crate::config::{BridgeConfig, EngineKind};
#[cfg(feature = "builtin")]
use crate::engine::BuiltinEngine;
use crate::engine::Engine;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{
    CalendarDate, CalendarSystem, EclipseResult, HouseResult, JulianDay, PositionResult,
};

pub use crate::config::ClosePolicy;

/// Session shared by every caller in the process
pub type SharedSession = Arc<Mutex<Session>>;

static GLOBAL_SESSION: Lazy<SharedSession> = Lazy::new(|| {
    let session = BridgeConfig::from_env()
        .context("Failed to load bridge configuration")
        .and_then(|config| Session::from_config(&config))
        .unwrap_or_else(|e| {
            log::warn!("{:#}; using the default engine with default settings", e);
            Session::default()
        });
    shared(session)
});

/// The process-wide session, created from configuration on first use.
pub fn global() -> SharedSession {
    Arc::clone(&GLOBAL_SESSION)
}

pub fn shared(session: Session) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// The linked library when present, otherwise the analytical engine.
fn default_engine() -> Box<dyn Engine> {
    #[cfg(feature = "native")]
    {
        Box::new(crate::engine::NativeEngine::new())
    }
    #[cfg(not(feature = "native"))]
    {
        Box::new(BuiltinEngine::new())
    }
}

pub struct Session {
    engine: Box<dyn Engine>,
    ephe_path: Option<String>,
    default_path: Option<String>,
    closed: bool,
    policy: ClosePolicy,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine.name())
            .field("ephe_path", &self.ephe_path)
            .field("default_path", &self.default_path)
            .field("closed", &self.closed)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Session {
    /// Open a session, applying `default_path` to the engine when set.
    pub fn new(
        mut engine: Box<dyn Engine>,
        default_path: Option<String>,
        policy: ClosePolicy,
    ) -> Self {
        if let Some(path) = default_path.as_deref() {
            engine.set_ephe_path(Some(path));
        }
        log::debug!(
            "Opened {} engine session (path: {:?}, after close: {:?})",
            engine.name(),
            default_path,
            policy
        );
        Self {
            engine,
            ephe_path: default_path.clone(),
            default_path,
            closed: false,
            policy,
        }
    }

    #[cfg(feature = "builtin")]
    pub fn builtin() -> Self {
        Self::new(Box::new(BuiltinEngine::new()), None, ClosePolicy::default())
    }

    pub fn from_config(config: &BridgeConfig) -> anyhow::Result<Self> {
        let engine: Box<dyn Engine> = match config.engine.kind {
            #[cfg(feature = "builtin")]
            EngineKind::Builtin => Box::new(BuiltinEngine::new()),
            #[cfg(not(feature = "builtin"))]
            EngineKind::Builtin => {
                anyhow::bail!("engine 'builtin' requires building with the `builtin` feature")
            }
            #[cfg(feature = "native")]
            EngineKind::Native => Box::new(crate::engine::NativeEngine::new()),
            #[cfg(not(feature = "native"))]
            EngineKind::Native => {
                anyhow::bail!("engine 'native' requires building with the `native` feature")
            }
        };
        Ok(Self::new(
            engine,
            config.engine.ephe_path.clone(),
            config.engine.after_close,
        ))
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Path currently applied to the engine; `None` means the engine default.
    pub fn ephe_path(&self) -> Option<&str> {
        self.ephe_path.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn policy(&self) -> ClosePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ClosePolicy) {
        self.policy = policy;
    }

    fn ensure_open(&mut self) -> BridgeResult<&mut dyn Engine> {
        if self.closed {
            match self.policy {
                ClosePolicy::Reject => return Err(BridgeError::closed()),
                ClosePolicy::Reinitialize => {
                    log::info!(
                        "Reinitializing {} engine after close (path: {:?})",
                        self.engine.name(),
                        self.default_path
                    );
                    if let Some(path) = self.default_path.as_deref() {
                        self.engine.set_ephe_path(Some(path));
                    }
                    self.ephe_path = self.default_path.clone();
                    self.closed = false;
                }
            }
        }
        Ok(self.engine.as_mut())
    }

    /// Replace the search path; reopens a closed session.
    pub fn set_ephe_path(&mut self, path: Option<&str>) {
        log::info!("Setting ephemeris path to {:?}", path);
        adapter::set_ephe_path(self.engine.as_mut(), path);
        self.ephe_path = path.map(str::to_string);
        self.closed = false;
    }

    pub fn julday(
        &mut self,
        year: i32,
        month: i32,
        day: i32,
        hour: f64,
        calendar: CalendarSystem,
    ) -> BridgeResult<JulianDay> {
        let engine = self.ensure_open()?;
        Ok(adapter::julday(engine, year, month, day, hour, calendar))
    }

    pub fn revjul(&mut self, jd: JulianDay, calendar: CalendarSystem) -> BridgeResult<CalendarDate> {
        let engine = self.ensure_open()?;
        Ok(adapter::revjul(engine, jd, calendar))
    }

    pub fn calc_ut(&mut self, tjd_ut: JulianDay, ipl: i32, iflag: i32) -> BridgeResult<PositionResult> {
        adapter::calc_ut(self.ensure_open()?, tjd_ut, ipl, iflag)
    }

    pub fn lun_eclipse_when(
        &mut self,
        tjd_start: JulianDay,
        ifl: i32,
        ifltype: i32,
        backward: bool,
    ) -> BridgeResult<EclipseResult> {
        adapter::lun_eclipse_when(self.ensure_open()?, tjd_start, ifl, ifltype, backward)
    }

    pub fn sol_eclipse_when_glob(
        &mut self,
        tjd_start: JulianDay,
        ifl: i32,
        ifltype: i32,
        backward: bool,
    ) -> BridgeResult<EclipseResult> {
        adapter::sol_eclipse_when_glob(self.ensure_open()?, tjd_start, ifl, ifltype, backward)
    }

    pub fn houses(
        &mut self,
        tjd_ut: JulianDay,
        geolat: f64,
        geolon: f64,
        hsys: u8,
    ) -> BridgeResult<HouseResult> {
        adapter::houses(self.ensure_open()?, tjd_ut, geolat, geolon, hsys)
    }

    pub fn planet_name(&mut self, ipl: i32) -> BridgeResult<String> {
        let engine = self.ensure_open()?;
        Ok(adapter::planet_name(engine, ipl))
    }

    pub fn version(&mut self) -> BridgeResult<String> {
        let engine = self.ensure_open()?;
        Ok(adapter::version(engine))
    }

    /// Release engine resources. Closing a closed session does nothing.
    pub fn close(&mut self) {
        if self.closed {
            log::debug!("close on an already closed session ignored");
            return;
        }
        log::info!("Closing {} engine", self.engine.name());
        adapter::close(self.engine.as_mut());
        self.ephe_path = None;
        self.closed = true;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(default_engine(), None, ClosePolicy::default())
    }
}
