use uuid::Uuid;

/// What kind of resource a failed lookup was after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    /// A page or card document.
    Document,
    /// A comment in any of its homes (page, post, thread, card block).
    Comment,
    /// A forum post.
    Post,
    /// A proposal.
    Proposal,
    /// A reward.
    Bounty,
    /// A poll.
    Vote,
}

/// Why processing an event stopped.
///
/// Failures are scoped to the one event being dispatched; callers are
/// expected to log and move on to the next event rather than stop consuming.
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// A resource the handler needed no longer exists.
    #[error("{kind} {id} not found")]
    NotFound {
        /// What the handler was looking for.
        kind: ResourceKind,
        /// The id that failed to resolve.
        id: Uuid,
    },
    /// The notification store rejected a write for a reason other than
    /// the notification already existing.
    #[error(transparent)]
    Store(#[from] crate::store::NotificationStoreError),
    /// A collaborator read (entities or preferences) failed.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl FanoutError {
    pub(crate) fn not_found(kind: ResourceKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_resource() {
        let id = Uuid::now_v7();
        let error = FanoutError::not_found(ResourceKind::Proposal, id);
        assert_eq!(error.to_string(), format!("proposal {id} not found"));
    }
}
