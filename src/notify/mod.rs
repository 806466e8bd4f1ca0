use crate::core::{Collection, EntityId, MutationKind};
use log::{error, info};

/// Outcome surface for the UI layer. The engine reports; it renders nothing.
pub trait NotificationSink: Send + Sync {
    /// A mutation completed and its cache effect is reconciled.
    /// `resolved_id` is the server-assigned id for creates, the target id
    /// otherwise.
    fn mutation_succeeded(
        &self,
        collection: Collection,
        kind: MutationKind,
        resolved_id: EntityId,
    );

    /// A mutation failed and its cache effect has been rolled back.
    fn mutation_failed(&self, collection: Collection, kind: MutationKind, message: &str);
}

/// Fire-and-forget hook for the scroll/flash side effect on newly created
/// rows. Failing to locate the row is the collaborator's concern, not the
/// engine's.
pub trait HighlightSink: Send + Sync {
    fn entity_created(&self, collection: Collection, id: EntityId);
}

/// Default sink: routes outcomes to the logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn mutation_succeeded(
        &self,
        collection: Collection,
        kind: MutationKind,
        resolved_id: EntityId,
    ) {
        info!("{kind} on '{collection}' succeeded (id {resolved_id})");
    }

    fn mutation_failed(&self, collection: Collection, kind: MutationKind, message: &str) {
        error!("{kind} on '{collection}' failed: {message}");
    }
}

impl HighlightSink for LogSink {
    fn entity_created(&self, collection: Collection, id: EntityId) {
        info!("new entity {collection}/{id} ready for highlight");
    }
}
