use chrono::{DateTime, Utc};

/// An integration message crossing the sync boundary.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **versioned** (payload schema evolution)
/// - stamped with **business time**, never the wall clock of the run
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "pos.payment.completed").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
