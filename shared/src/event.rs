use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::capabilities::{IntelligenceError, LedgerReceipt, UserStoreError};
use crate::config::WizardConfig;
use crate::model::{
    BudgetLevel, RequestId, TransportType, TripAnalysis, TripPlanResponse, User, UserId,
};

// --- Password wrapper: redacts Debug, zeroizes on Drop ---

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub user_id: UserId,
    pub password: Password,
}

// --- Events ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Session
    Configure(Box<WizardConfig>),
    LoginRequested {
        user_id: String,
        password: Password,
    },
    LogoutRequested,
    DeleteAccountRequested,
    DeleteAccountConfirmed,
    DeleteAccountCancelled,
    DismissError,

    // Trip flow
    StartRequested,
    AddressesSubmitted {
        origin: String,
        destination: String,
    },
    UnlockConfirmed,
    WatchAdRequested,
    AdCompleted,
    AdCancelled,
    DurationSelected {
        days: u32,
        travelers: u32,
    },
    TransportSelected {
        transport: TransportType,
    },
    BudgetSelected {
        budget: BudgetLevel,
    },
    BackRequested,
    ResetRequested,

    // Capability responses: produced by the core only, never sent by the shell
    #[serde(skip)]
    LoginResponse {
        request_id: RequestId,
        result: Box<Result<User, UserStoreError>>,
    },
    #[serde(skip)]
    AnalysisResponse {
        request_id: RequestId,
        result: Box<Result<TripAnalysis, IntelligenceError>>,
    },
    #[serde(skip)]
    PlanResponse {
        request_id: RequestId,
        result: Box<Result<TripPlanResponse, IntelligenceError>>,
    },
    #[serde(skip)]
    UnlockResponse {
        request_id: RequestId,
        result: Result<LedgerReceipt, UserStoreError>,
    },
    #[serde(skip)]
    AdRewardResponse {
        request_id: RequestId,
        result: Result<LedgerReceipt, UserStoreError>,
    },
    #[serde(skip)]
    DeleteAccountResponse {
        request_id: RequestId,
        result: Result<(), UserStoreError>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::LoginRequested { .. } => "login_requested",
            Self::LogoutRequested => "logout_requested",
            Self::DeleteAccountRequested => "delete_account_requested",
            Self::DeleteAccountConfirmed => "delete_account_confirmed",
            Self::DeleteAccountCancelled => "delete_account_cancelled",
            Self::DismissError => "dismiss_error",
            Self::StartRequested => "start_requested",
            Self::AddressesSubmitted { .. } => "addresses_submitted",
            Self::UnlockConfirmed => "unlock_confirmed",
            Self::WatchAdRequested => "watch_ad_requested",
            Self::AdCompleted => "ad_completed",
            Self::AdCancelled => "ad_cancelled",
            Self::DurationSelected { .. } => "duration_selected",
            Self::TransportSelected { .. } => "transport_selected",
            Self::BudgetSelected { .. } => "budget_selected",
            Self::BackRequested => "back_requested",
            Self::ResetRequested => "reset_requested",
            Self::LoginResponse { .. } => "login_response",
            Self::AnalysisResponse { .. } => "analysis_response",
            Self::PlanResponse { .. } => "plan_response",
            Self::UnlockResponse { .. } => "unlock_response",
            Self::AdRewardResponse { .. } => "ad_reward_response",
            Self::DeleteAccountResponse { .. } => "delete_account_response",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::Configure(_)
                | Self::LoginResponse { .. }
                | Self::AnalysisResponse { .. }
                | Self::PlanResponse { .. }
                | Self::UnlockResponse { .. }
                | Self::AdRewardResponse { .. }
                | Self::DeleteAccountResponse { .. }
        )
    }
}
