use super::{EntityStore, StoreError};
use crate::models::{User, UserRole};

impl EntityStore<User> {
    pub async fn by_role(&self, role: UserRole) -> Result<Vec<User>, StoreError> {
        self.select(self.latency().query, |u| u.role == role).await
    }
}
