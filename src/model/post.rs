use super::Resource;
use crate::core::{Collection, EntityId};
use serde::{Deserialize, Serialize};

/// A post record as served by the collection API. `body` is optional on the
/// wire; `user_id` serializes under its wire name `userId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: EntityId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: EntityId,
}

/// Payload for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: EntityId,
}

/// Field-level patch for a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
}

impl Resource for Post {
    const COLLECTION: Collection = Collection::Posts;
    type Draft = NewPost;
    type Patch = PostPatch;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_draft(draft: &NewPost, id: EntityId) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            body: draft.body.clone(),
            user_id: draft.user_id,
        }
    }

    fn apply_patch(&mut self, patch: &PostPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(body) = &patch.body {
            self.body = Some(body.clone());
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
    }
}
