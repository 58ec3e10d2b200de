//! User record store: credentials, points ledger and account removal.
//!
//! Every operation either applies in full or not at all, and the reply is typed.
//! Ledger operations answer with the post-operation balance so the core can mirror it.

use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Credentials;
use crate::model::{User, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStoreOperation {
    Login { credentials: Credentials },
    DeductPoints { user_id: UserId, amount: u32 },
    AddPoints { user_id: UserId, amount: u32 },
    DeleteUser { user_id: UserId },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub balance: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStoreOutput {
    LoggedIn(User),
    Ledger(LedgerReceipt),
    Deleted,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: u32, requested: u32 },

    #[error("rejected: {reason}")]
    Rejected { reason: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

pub type UserStoreResult = Result<UserStoreOutput, UserStoreError>;

impl Operation for UserStoreOperation {
    type Output = UserStoreResult;
}

#[derive(crux_core::macros::Capability)]
pub struct UserStore<Ev> {
    context: CapabilityContext<UserStoreOperation, Ev>,
}

impl<Ev> UserStore<Ev> {
    pub fn new(context: CapabilityContext<UserStoreOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> UserStore<Ev>
where
    Ev: Send + 'static,
{
    pub fn login<F>(&self, credentials: Credentials, make_event: F)
    where
        F: FnOnce(Result<User, UserStoreError>) -> Ev + Send + 'static,
    {
        self.request(UserStoreOperation::Login { credentials }, move |output| {
            make_event(output.and_then(|out| match out {
                UserStoreOutput::LoggedIn(user) => Ok(user),
                other => Err(unexpected("login", &other)),
            }))
        });
    }

    pub fn deduct_points<F>(&self, user_id: UserId, amount: u32, make_event: F)
    where
        F: FnOnce(Result<LedgerReceipt, UserStoreError>) -> Ev + Send + 'static,
    {
        self.request(UserStoreOperation::DeductPoints { user_id, amount }, move |output| {
            make_event(output.and_then(|out| expect_receipt("deduct_points", out)))
        });
    }

    pub fn add_points<F>(&self, user_id: UserId, amount: u32, make_event: F)
    where
        F: FnOnce(Result<LedgerReceipt, UserStoreError>) -> Ev + Send + 'static,
    {
        self.request(UserStoreOperation::AddPoints { user_id, amount }, move |output| {
            make_event(output.and_then(|out| expect_receipt("add_points", out)))
        });
    }

    pub fn delete_user<F>(&self, user_id: UserId, make_event: F)
    where
        F: FnOnce(Result<(), UserStoreError>) -> Ev + Send + 'static,
    {
        self.request(UserStoreOperation::DeleteUser { user_id }, move |output| {
            make_event(output.and_then(|out| match out {
                UserStoreOutput::Deleted => Ok(()),
                other => Err(unexpected("delete_user", &other)),
            }))
        });
    }

    fn request<F>(&self, operation: UserStoreOperation, make_event: F)
    where
        F: FnOnce(UserStoreResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(output));
        });
    }
}

fn expect_receipt(op: &str, output: UserStoreOutput) -> Result<LedgerReceipt, UserStoreError> {
    match output {
        UserStoreOutput::Ledger(receipt) => Ok(receipt),
        other => Err(unexpected(op, &other)),
    }
}

fn unexpected(op: &str, output: &UserStoreOutput) -> UserStoreError {
    UserStoreError::Rejected {
        reason: format!("unexpected reply to {op}: {output:?}"),
    }
}
