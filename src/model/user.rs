use super::Resource;
use crate::core::{Collection, EntityId};
use serde::{Deserialize, Serialize};

/// A user record as served by the collection API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Field-level patch for a user; `None` fields are left untouched and are
/// omitted from the wire payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Resource for User {
    const COLLECTION: Collection = Collection::Users;
    type Draft = NewUser;
    type Patch = UserPatch;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_draft(draft: &NewUser, id: EntityId) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            username: draft.username.clone(),
            email: draft.email.clone(),
        }
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
    }
}
