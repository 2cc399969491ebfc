//! Read model trait for report views.

/// A read model providing query access to derived planning data.
///
/// Read models are rebuilt from a planning snapshot every time they are
/// requested; they hold no state of their own.
pub trait ReadModel: Send + Sync {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// Returns the number of rows in this read model.
    fn count(&self) -> usize;

    /// Returns true if the read model has no rows.
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
