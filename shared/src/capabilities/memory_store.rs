use std::collections::HashMap;
use tracing::{debug, warn};

use super::user_store::{LedgerReceipt, UserStoreError, UserStoreOperation, UserStoreOutput};
use crate::event::Credentials;
use crate::model::{User, UserId};

/// In-process user store with the same contract a shell-side store must honour.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: HashMap<UserId, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut store = Self::new();
        for user in users {
            store.insert(user);
        }
        store
    }

    pub fn insert(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id.clone(), user)
    }

    pub fn get(&self, user_id: &UserId) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn balance(&self, user_id: &UserId) -> Option<u32> {
        self.users.get(user_id).map(|u| u.points)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Resolves one capability request against the store.
    pub fn handle(
        &mut self,
        operation: &UserStoreOperation,
    ) -> Result<UserStoreOutput, UserStoreError> {
        match operation {
            UserStoreOperation::Login { credentials } => {
                self.login(credentials).map(UserStoreOutput::LoggedIn)
            }
            UserStoreOperation::DeductPoints { user_id, amount } => self
                .deduct_points(user_id, *amount)
                .map(UserStoreOutput::Ledger),
            UserStoreOperation::AddPoints { user_id, amount } => {
                self.add_points(user_id, *amount).map(UserStoreOutput::Ledger)
            }
            UserStoreOperation::DeleteUser { user_id } => {
                self.delete_user(user_id).map(|()| UserStoreOutput::Deleted)
            }
        }
    }

    pub fn login(&self, credentials: &Credentials) -> Result<User, UserStoreError> {
        let user = self
            .users
            .get(&credentials.user_id)
            .ok_or(UserStoreError::InvalidCredentials)?;

        match &user.password {
            Some(stored) if stored == &credentials.password => {
                debug!(user_id = %user.id, "login accepted");
                Ok(user.clone().without_password())
            }
            _ => {
                warn!(user_id = %credentials.user_id, "login rejected");
                Err(UserStoreError::InvalidCredentials)
            }
        }
    }

    pub fn deduct_points(
        &mut self,
        user_id: &UserId,
        amount: u32,
    ) -> Result<LedgerReceipt, UserStoreError> {
        let user = self.user_mut(user_id)?;
        let balance = user
            .points
            .checked_sub(amount)
            .ok_or(UserStoreError::InsufficientFunds {
                balance: user.points,
                requested: amount,
            })?;
        user.points = balance;
        Ok(LedgerReceipt { balance })
    }

    pub fn add_points(
        &mut self,
        user_id: &UserId,
        amount: u32,
    ) -> Result<LedgerReceipt, UserStoreError> {
        let user = self.user_mut(user_id)?;
        let balance = user
            .points
            .checked_add(amount)
            .ok_or_else(|| UserStoreError::Rejected {
                reason: "balance overflow".into(),
            })?;
        user.points = balance;
        Ok(LedgerReceipt { balance })
    }

    pub fn delete_user(&mut self, user_id: &UserId) -> Result<(), UserStoreError> {
        self.users
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| UserStoreError::UserNotFound {
                user_id: user_id.clone(),
            })
    }

    fn user_mut(&mut self, user_id: &UserId) -> Result<&mut User, UserStoreError> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| UserStoreError::UserNotFound {
                user_id: user_id.clone(),
            })
    }
}
