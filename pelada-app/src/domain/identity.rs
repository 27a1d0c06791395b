use crate::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub username: String,
}

/// Outcome of resolving a connection credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    User(UserIdentity),
    Anonymous,
}

impl Identity {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}
