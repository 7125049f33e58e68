/// Verified identity of the caller, rebuilt from the session token on every
/// request. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: i64,
}

impl Principal {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}
