//! Iteration over the engine's temporary result tables.

use std::fmt;

use esent_native::{SessionHandle, TableHandle};
use tracing::{debug, warn};

use crate::error::InteropResult;
use crate::Api;

type Projector<'a, T> = Box<dyn FnMut(&Api, SessionHandle, TableHandle) -> InteropResult<T> + 'a>;

/// Iterates a temporary table, projecting each row into a `T`.
///
/// The cursor is positioned before the first row on the first call to
/// `next`. The projector reads the current row and may move forward itself
/// to consume rows that belong to the same item. The temporary table is
/// closed when iteration ends, when the projector fails, or on drop.
pub struct TableEnumerator<'a, T> {
    api: Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    record_count: u32,
    project: Projector<'a, T>,
    started: bool,
    open: bool,
}

impl<'a, T> TableEnumerator<'a, T> {
    /// Takes ownership of the temporary table `tableid`.
    pub fn new(
        api: &Api,
        sesid: SessionHandle,
        tableid: TableHandle,
        record_count: u32,
        project: impl FnMut(&Api, SessionHandle, TableHandle) -> InteropResult<T> + 'a,
    ) -> Self {
        Self {
            api: api.clone(),
            sesid,
            tableid,
            record_count,
            project: Box::new(project),
            started: false,
            open: true,
        }
    }

    /// Number of rows the engine reported for the table.
    #[must_use]
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    /// The temporary table being enumerated.
    #[must_use]
    pub fn tableid(&self) -> TableHandle {
        self.tableid
    }

    fn advance(&mut self) -> InteropResult<Option<T>> {
        if !self.started {
            self.started = true;
            self.api.move_before_first(self.sesid, self.tableid)?;
        }
        if !self.api.try_move_next(self.sesid, self.tableid)? {
            return Ok(None);
        }
        (self.project)(&self.api, self.sesid, self.tableid).map(Some)
    }

    fn close(&mut self) -> InteropResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        debug!(tableid = %self.tableid, "closing temporary table");
        self.api.close_table(self.sesid, self.tableid)?;
        Ok(())
    }
}

impl<T> Iterator for TableEnumerator<'_, T> {
    type Item = InteropResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.open {
            return None;
        }
        match self.advance() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => self.close().err().map(Err),
            Err(error) => {
                if let Err(close_error) = self.close() {
                    warn!(%close_error, "failed to close temporary table");
                }
                Some(Err(error))
            }
        }
    }
}

impl<T> Drop for TableEnumerator<'_, T> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(%error, tableid = %self.tableid, "failed to close temporary table");
        }
    }
}

impl<T> fmt::Debug for TableEnumerator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEnumerator")
            .field("sesid", &self.sesid)
            .field("tableid", &self.tableid)
            .field("record_count", &self.record_count)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteropError;
    use crate::test_support::Fixture;
    use esent_native::err;
    use esent_native::grbit::RetrieveColumnGrbit;

    fn column_names<'a>(f: &Fixture) -> TableEnumerator<'a, String> {
        let list = f.api.get_table_column_info(f.sesid, f.tableid, None).unwrap();
        TableEnumerator::new(
            &f.api,
            f.sesid,
            list.tableid,
            list.record_count,
            move |api, sesid, tableid| {
                let name = api.retrieve_column_string(
                    sesid,
                    tableid,
                    list.columnid_column_name,
                    esent_native::CodePage::ASCII,
                    RetrieveColumnGrbit::NONE,
                )?;
                Ok(name.unwrap_or_default())
            },
        )
    }

    #[test]
    fn rows_are_projected_in_order() {
        let f = Fixture::new();
        let names: Vec<String> = column_names(&f).collect::<InteropResult<_>>().unwrap();
        assert_eq!(names.len(), column_names(&f).record_count() as usize);
        assert!(names.iter().any(|n| n == "key"));
        assert!(names.iter().any(|n| n == "counter"));
    }

    #[test]
    fn exhausted_enumerator_closes_the_table() {
        let f = Fixture::new();
        let mut names = column_names(&f);
        let tableid = names.tableid();
        for name in names.by_ref() {
            name.unwrap();
        }
        assert!(names.next().is_none());
        assert!(f.api.close_table(f.sesid, tableid).unwrap_err().is(err::INVALID_TABLE_ID));
    }

    #[test]
    fn dropped_enumerator_closes_the_table() {
        let f = Fixture::new();
        let mut names = column_names(&f);
        let tableid = names.tableid();
        names.next().unwrap().unwrap();
        drop(names);
        assert!(f.api.close_table(f.sesid, tableid).unwrap_err().is(err::INVALID_TABLE_ID));
    }

    #[test]
    fn projector_errors_end_iteration() {
        let f = Fixture::new();
        let list = f.api.get_table_column_info(f.sesid, f.tableid, None).unwrap();
        let mut rows = TableEnumerator::new(
            &f.api,
            f.sesid,
            list.tableid,
            list.record_count,
            |_, _, _| {
                Err::<(), _>(InteropError::invalid_argument("bad row"))
            },
        );
        assert!(matches!(rows.next(), Some(Err(InteropError::InvalidArgument { .. }))));
        assert!(rows.next().is_none());
        assert!(f.api.close_table(f.sesid, list.tableid).unwrap_err().is(err::INVALID_TABLE_ID));
    }
}
