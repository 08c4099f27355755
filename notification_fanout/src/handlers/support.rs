//! Shared fixtures for handler tests.

use std::sync::Arc;

use chrono::Utc;
use model_events::{DocumentEntity, PostEntity, SpaceEntity, UserEntity, WebhookEnvelope, WebhookEvent};
use uuid::Uuid;

use crate::memory::MemoryStore;
use crate::NotificationFanout;

pub(crate) fn engine(store: &Arc<MemoryStore>) -> NotificationFanout {
    NotificationFanout::new(
        Arc::clone(store) as _,
        Arc::clone(store) as _,
        Arc::clone(store) as _,
        Arc::clone(store) as _,
    )
}

pub(crate) fn envelope(space_id: Uuid, event: WebhookEvent) -> WebhookEnvelope {
    WebhookEnvelope {
        space_id,
        created_at: Utc::now(),
        event,
    }
}

pub(crate) fn user(id: Uuid) -> UserEntity {
    UserEntity {
        id,
        username: format!("user-{id}"),
        avatar: None,
    }
}

pub(crate) fn space(id: Uuid) -> SpaceEntity {
    SpaceEntity {
        id,
        name: "Acme".to_owned(),
        domain: "acme".to_owned(),
        avatar: None,
    }
}

pub(crate) fn page(id: Uuid, author_id: Uuid) -> DocumentEntity {
    DocumentEntity {
        id,
        title: "Roadmap".to_owned(),
        author: user(author_id),
    }
}

pub(crate) fn post(id: Uuid, category_id: Uuid, author_id: Uuid) -> PostEntity {
    PostEntity {
        id,
        title: "Release retro".to_owned(),
        category_id,
        author: user(author_id),
    }
}
