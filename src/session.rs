//! The explicit runtime context every boundary-crossing operation goes through.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::bridge::{Engine, ForeignValue, JuliaEngine, RefId, Request};
use crate::config::SessionConfig;
use crate::errors::{PssfssError, Result};

static GLOBAL: OnceLock<Arc<Session>> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = parking_lot::const_mutex(());

/// Owner of one foreign engine.
///
/// Boundary crossings are serialised: at most one request is in flight at a time.
pub struct Session {
    engine: Mutex<Box<dyn Engine>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Starts a Julia engine with `config`.
    pub fn start(config: &SessionConfig) -> Result<Arc<Self>> {
        Ok(Self::with_engine(JuliaEngine::start(config)?))
    }

    /// Wraps an already running engine.
    pub fn with_engine<E: Engine + 'static>(engine: E) -> Arc<Self> {
        Arc::new(Self {
            engine: Mutex::new(Box::new(engine)),
        })
    }

    /// Process-wide session, started from the environment on first use.
    pub fn global() -> Result<Arc<Self>> {
        Self::global_with(|| Self::start(&SessionConfig::from_env()?))
    }

    /// Process-wide session, created by `init` on first use.
    ///
    /// Later calls return the same session without invoking their `init`. A failed
    /// initialisation leaves the slot empty so a later call can retry.
    pub fn global_with<F>(init: F) -> Result<Arc<Self>>
    where
        F: FnOnce() -> Result<Arc<Self>>,
    {
        if let Some(session) = GLOBAL.get() {
            return Ok(Arc::clone(session));
        }
        let _guard = GLOBAL_INIT.lock();
        if let Some(session) = GLOBAL.get() {
            return Ok(Arc::clone(session));
        }
        let session = init()?;
        Ok(Arc::clone(GLOBAL.get_or_init(|| session)))
    }

    /// Performs one raw boundary crossing.
    pub fn request(&self, request: &Request) -> Result<ForeignValue> {
        let operation = request.operation();
        debug!(%operation, "boundary crossing");
        self.engine
            .lock()
            .request(request)
            .map_err(|err| PssfssError::from_engine(operation, err))
    }

    /// Performs `request` and takes ownership of the foreign object it returns.
    pub(crate) fn retain(self: &Arc<Self>, request: &Request) -> Result<ForeignRef> {
        let value = self.request(request)?;
        let id = value
            .as_ref_id()
            .ok_or_else(|| PssfssError::unexpected("foreign reference", value.kind()))?;
        Ok(ForeignRef {
            session: Arc::clone(self),
            id,
        })
    }
}

/// Exclusive owner of one object retained by the foreign engine.
///
/// The object is released when this value is dropped.
pub struct ForeignRef {
    session: Arc<Session>,
    id: RefId,
}

impl ForeignRef {
    /// Identifier of the retained object.
    #[must_use]
    pub const fn id(&self) -> RefId {
        self.id
    }

    /// Session the object lives in.
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Boundary representation of the reference.
    #[must_use]
    pub const fn to_foreign(&self) -> ForeignValue {
        ForeignValue::Ref(self.id)
    }

    /// Fails unless the object was retained by `session`.
    ///
    /// Reference ids are per-engine counters, so an id sent to another engine would
    /// name an unrelated object.
    pub(crate) fn ensure_in(&self, session: &Arc<Session>) -> Result<()> {
        if Arc::ptr_eq(&self.session, session) {
            Ok(())
        } else {
            Err(PssfssError::unexpected(
                "object retained by the calling session",
                format!("object {} from another session", self.id),
            ))
        }
    }

    /// Calls `function` with this object as the first argument.
    pub(crate) fn call(&self, function: &str, mut rest: Vec<ForeignValue>) -> Result<ForeignValue> {
        rest.insert(0, self.to_foreign());
        self.session.request(&Request::call(function, rest))
    }

    /// Reads one field of the object.
    pub(crate) fn field(&self, field: &str, stringify: bool) -> Result<ForeignValue> {
        self.session.request(&Request::GetField {
            target: self.id,
            field: field.to_owned(),
            stringify,
        })
    }
}

impl fmt::Debug for ForeignRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ForeignRef").field(&self.id).finish()
    }
}

impl Drop for ForeignRef {
    fn drop(&mut self) {
        if let Err(err) = self.session.request(&Request::Release { target: self.id }) {
            warn!(object = %self.id, %err, "failed to release foreign object");
        }
    }
}
