//! Trip intelligence: the external text-generation service that validates a route
//! and writes the final plan.
//!
//! The shell owns the transport and the deadline. Each operation carries the timeout
//! the core expects the shell to enforce; a call that outlives it must come back as
//! [`IntelligenceError::Timeout`].

use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{TripAnalysis, TripFormData, TripPlanResponse};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntelligenceOperation {
    AnalyzeRoute {
        origin: String,
        destination: String,
        timeout_ms: u64,
    },
    GeneratePlan {
        form: TripFormData,
        timeout_ms: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntelligenceOutput {
    Analysis(TripAnalysis),
    Plan(TripPlanResponse),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntelligenceError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("request rejected: {reason}")]
    Rejected { reason: String },
}

pub type IntelligenceResult = Result<IntelligenceOutput, IntelligenceError>;

impl Operation for IntelligenceOperation {
    type Output = IntelligenceResult;
}

#[derive(crux_core::macros::Capability)]
pub struct TripIntelligence<Ev> {
    context: CapabilityContext<IntelligenceOperation, Ev>,
}

impl<Ev> TripIntelligence<Ev> {
    pub fn new(context: CapabilityContext<IntelligenceOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> TripIntelligence<Ev>
where
    Ev: Send + 'static,
{
    pub fn analyze_route<F>(
        &self,
        origin: String,
        destination: String,
        timeout_ms: u64,
        make_event: F,
    ) where
        F: FnOnce(Result<TripAnalysis, IntelligenceError>) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(IntelligenceOperation::AnalyzeRoute {
                    origin,
                    destination,
                    timeout_ms,
                })
                .await;
            ctx.update_app(make_event(expect_analysis(output)));
        });
    }

    pub fn generate_plan<F>(&self, form: TripFormData, timeout_ms: u64, make_event: F)
    where
        F: FnOnce(Result<TripPlanResponse, IntelligenceError>) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(IntelligenceOperation::GeneratePlan { form, timeout_ms })
                .await;
            ctx.update_app(make_event(expect_plan(output)));
        });
    }
}

fn expect_analysis(output: IntelligenceResult) -> Result<TripAnalysis, IntelligenceError> {
    match output? {
        IntelligenceOutput::Analysis(analysis) => Ok(analysis),
        IntelligenceOutput::Plan(_) => Err(IntelligenceError::InvalidResponse {
            reason: "expected a route analysis, got a plan".into(),
        }),
    }
}

fn expect_plan(output: IntelligenceResult) -> Result<TripPlanResponse, IntelligenceError> {
    match output? {
        IntelligenceOutput::Plan(plan) => Ok(plan),
        IntelligenceOutput::Analysis(_) => Err(IntelligenceError::InvalidResponse {
            reason: "expected a plan, got a route analysis".into(),
        }),
    }
}
