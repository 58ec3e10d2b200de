#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod points;
pub mod view;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, WizardConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::{Credentials, Event, Password};
pub use model::{
    Accommodation, Activity, BudgetLevel, DayItinerary, FoodRecommendation, Model, RequestId,
    Step, TransportDetails, TransportType, TripAnalysis, TripFormData, TripPlanResponse, User,
    UserId,
};
pub use points::PointsPolicy;
pub use view::{HeaderView, PointCheckView, Screen, ViewModel};

pub const DEFAULT_DAYS: u32 = 3;
pub const DEFAULT_TRAVELERS: u32 = 2;
pub const MAX_PLACE_LENGTH: usize = 200;
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_PLAN_TIMEOUT: Duration = Duration::from_secs(120);
pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    LoginFailure,
    AnalysisFailure,
    PlanGenerationFailure,
    InsufficientPoints,
    TransactionFailure,
    RewardFailure,
    AccountDeletionFailure,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::LoginFailure => "LOGIN_FAILED",
            Self::AnalysisFailure => "ANALYSIS_FAILED",
            Self::PlanGenerationFailure => "PLANNING_FAILED",
            Self::InsufficientPoints => "INSUFFICIENT_POINTS",
            Self::TransactionFailure => "TRANSACTION_FAILED",
            Self::RewardFailure => "REWARD_FAILED",
            Self::AccountDeletionFailure => "ACCOUNT_DELETION_FAILED",
        }
    }

    /// Fatal kinds abandon the trip in progress and park the flow on the error step.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::AnalysisFailure | Self::PlanGenerationFailure)
    }

    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Please check your input and try again.",
            Self::LoginFailure => "Login failed. Please try again.",
            Self::AnalysisFailure => "Analysis failed. Please try again.",
            Self::PlanGenerationFailure => "Planning failed. Please try again.",
            Self::InsufficientPoints => "Insufficient points.",
            Self::TransactionFailure => "Transaction failed.",
            Self::RewardFailure => "Reward could not be credited. Please try again.",
            Self::AccountDeletionFailure => "Account deletion failed. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Validation).with_internal(e.to_string())
    }
}
