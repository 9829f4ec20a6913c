use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A bearer capability with a hard expiry.
///
/// A capability is live at `now` iff `now < expire_at`; the expiry instant
/// itself is already dead.
pub trait Capability: Clone + Send + Sync + 'static {
    /// Human-readable kind used in rejection messages
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    fn expire_at(&self) -> DateTime<Utc>;

    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expire_at()
    }
}
