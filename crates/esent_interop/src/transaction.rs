//! Session transactions.

use std::marker::PhantomData;

use esent_native::grbit::{CommitTransactionGrbit, RollbackTransactionGrbit};
use esent_native::SessionHandle;
use tracing::{debug, warn};

use crate::error::{InteropError, InteropResult};
use crate::resource::ResourceState;
use crate::session::Session;
use crate::Api;

/// A transaction on a [`Session`], rolled back on drop unless committed.
///
/// After a commit or rollback the same value can [`begin`](Self::begin) a
/// new transaction. Transactions nest in the engine; each `Transaction`
/// covers one level.
///
/// The engine binds a transaction to the thread that began it, so a
/// `Transaction` cannot be sent to another thread:
///
/// ```compile_fail
/// use esent_interop::{Api, Instance, Session};
///
/// let api = Api::in_memory();
/// let mut instance = Instance::new(&api, "threads").unwrap();
/// instance.init().unwrap();
/// let session = Session::new(&instance).unwrap();
/// let transaction = session.begin_transaction().unwrap();
/// std::thread::scope(|scope| {
///     scope.spawn(move || drop(transaction));
/// });
/// ```
#[derive(Debug)]
pub struct Transaction<'s> {
    api: &'s Api,
    sesid: SessionHandle,
    state: ResourceState,
    _not_send: PhantomData<*const ()>,
}

impl<'s> Transaction<'s> {
    /// Begins a transaction on `session`.
    pub fn new(session: &'s Session<'_>) -> InteropResult<Self> {
        let mut transaction = Self {
            api: session.api(),
            sesid: session.sesid()?,
            state: ResourceState::new("transaction"),
            _not_send: PhantomData,
        };
        transaction.begin()?;
        Ok(transaction)
    }

    /// True between a begin and the matching commit or rollback.
    #[must_use]
    pub fn is_in_transaction(&self) -> bool {
        self.state.has_resource()
    }

    /// Begins a new transaction after a commit or rollback.
    pub fn begin(&mut self) -> InteropResult<()> {
        self.state.check_not_disposed()?;
        if self.state.has_resource() {
            return Err(InteropError::invalid_argument("transaction is already active"));
        }
        self.api.begin_transaction(self.sesid)?;
        self.state.resource_was_allocated()?;
        debug!(sesid = %self.sesid, "began transaction");
        Ok(())
    }

    /// Commits the transaction.
    ///
    /// With [`CommitTransactionGrbit::LAZY_FLUSH`] the commit returns before
    /// the log is flushed, trading durability for latency.
    pub fn commit(&mut self, grbit: CommitTransactionGrbit) -> InteropResult<()> {
        self.active()?;
        self.api.commit_transaction(self.sesid, grbit)?;
        self.state.resource_was_released()?;
        let lazy = grbit.contains(CommitTransactionGrbit::LAZY_FLUSH);
        debug!(sesid = %self.sesid, lazy, "committed transaction");
        Ok(())
    }

    /// Undoes the changes made in the transaction.
    pub fn rollback(&mut self) -> InteropResult<()> {
        self.active()?;
        self.api.rollback(self.sesid, RollbackTransactionGrbit::NONE)?;
        self.state.resource_was_released()?;
        debug!(sesid = %self.sesid, "rolled back transaction");
        Ok(())
    }

    fn active(&self) -> InteropResult<()> {
        self.state.check_not_disposed()?;
        if !self.state.has_resource() {
            return Err(InteropError::invalid_argument("no transaction is active"));
        }
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        let (api, sesid) = (self.api, self.sesid);
        if self.state.has_resource() {
            warn!(%sesid, "transaction dropped without commit; rolling back");
        }
        let result = self.state.dispose(|state| {
            api.rollback(sesid, RollbackTransactionGrbit::NONE)?;
            state.resource_was_released()
        });
        if let Err(error) = result {
            warn!(%error, %sesid, "failed to roll back transaction");
        }
    }
}
