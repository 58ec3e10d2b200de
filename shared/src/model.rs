use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::WizardConfig;
use crate::event::Password;
use crate::{AppError, DEFAULT_DAYS, DEFAULT_TRAVELERS};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(UserId);
typed_id!(RequestId);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

// --- Wizard steps ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Auth,
    Admin,
    Landing,
    Inputs,
    Analyzing,
    PointCheck,
    AdWatch,
    DurationSelection,
    Transport,
    Budget,
    Loading,
    Results,
    Error,
}

impl Step {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Admin => "admin",
            Self::Landing => "landing",
            Self::Inputs => "inputs",
            Self::Analyzing => "analyzing",
            Self::PointCheck => "point_check",
            Self::AdWatch => "ad_watch",
            Self::DurationSelection => "duration_selection",
            Self::Transport => "transport",
            Self::Budget => "budget",
            Self::Loading => "loading",
            Self::Results => "results",
            Self::Error => "error",
        }
    }

    /// The user header (id, balance, logout, delete) is hidden on the auth and admin screens.
    #[must_use]
    pub const fn shows_header(self) -> bool {
        !matches!(self, Self::Auth | Self::Admin)
    }

    #[must_use]
    pub const fn needs_analysis(self) -> bool {
        matches!(
            self,
            Self::PointCheck | Self::AdWatch | Self::DurationSelection | Self::Transport
        )
    }

    #[must_use]
    pub const fn can_reset(self) -> bool {
        matches!(self, Self::Results | Self::Error)
    }

    /// Target of the "back" control, for the steps that offer one.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::DurationSelection => Some(Self::Inputs),
            Self::Transport => Some(Self::DurationSelection),
            Self::Budget => Some(Self::Transport),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Trip form ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransportType {
    #[default]
    Car,
    Train,
    Flight,
    Bus,
}

impl TransportType {
    pub const ALL: [Self; 4] = [Self::Car, Self::Train, Self::Flight, Self::Bus];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Train => "Train",
            Self::Flight => "Flight",
            Self::Bus => "Bus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetLevel {
    #[serde(rename = "Low Cost")]
    Low,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "Luxury")]
    High,
}

impl BudgetLevel {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Cost",
            Self::Medium => "Medium",
            Self::High => "Luxury",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripFormData {
    pub origin: String,
    pub destination: String,
    pub transport: TransportType,
    pub days: u32,
    pub travelers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetLevel>,
}

impl Default for TripFormData {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            transport: TransportType::Car,
            days: DEFAULT_DAYS,
            travelers: DEFAULT_TRAVELERS,
            budget: None,
        }
    }
}

impl TripFormData {
    /// Fully populated once a budget has been chosen.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.origin.is_empty()
            && !self.destination.is_empty()
            && self.days > 0
            && self.travelers > 0
            && self.budget.is_some()
    }
}

// --- Route analysis ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripAnalysis {
    pub valid_transports: Vec<TransportType>,
    pub min_days: u32,
    pub max_days: u32,
    pub is_international: bool,
    #[serde(default)]
    pub corrected_origin: String,
    #[serde(default)]
    pub corrected_destination: String,
    #[serde(default)]
    pub reasoning: String,
}

impl TripAnalysis {
    /// Midpoint of the recommended range, rounded up, never below one day.
    #[must_use]
    pub fn recommended_days(&self) -> u32 {
        self.min_days
            .saturating_add(self.max_days)
            .div_ceil(2)
            .max(1)
    }

    /// An empty list means the service did not restrict the modes.
    #[must_use]
    pub fn allows(&self, transport: TransportType) -> bool {
        self.valid_transports.is_empty() || self.valid_transports.contains(&transport)
    }

    #[must_use]
    pub fn origin_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(&self.corrected_origin).unwrap_or(fallback)
    }

    #[must_use]
    pub fn destination_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(&self.corrected_destination).unwrap_or(fallback)
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

// --- Generated plan ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    pub name: String,
    pub description: String,
    pub estimated_cost: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub time: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayItinerary {
    /// 1-indexed.
    pub day: u32,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecommendation {
    pub dish_name: String,
    pub restaurant_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDetails {
    pub mode: String,
    pub cost_breakdown: String,
    pub total_cost: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResponse {
    pub destination_name: String,
    pub currency_symbol: String,
    pub grand_total: String,
    pub local_transport_tip: String,
    pub accommodations: Vec<Accommodation>,
    pub itinerary: Vec<DayItinerary>,
    pub food: Vec<FoodRecommendation>,
    pub transport_details: TransportDetails,
}

impl TripPlanResponse {
    /// Itinerary days in ascending order, whatever order the service returned them in.
    #[must_use]
    pub fn ordered_itinerary(&self) -> Vec<DayItinerary> {
        let mut days = self.itinerary.clone();
        days.sort_by_key(|d| d.day);
        days
    }
}

// --- Session ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,
    pub points: u32,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// The session mirror never holds the credential.
    #[must_use]
    pub fn without_password(mut self) -> Self {
        self.password = None;
        self
    }

    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.points >= cost
    }
}

// --- Outstanding capability requests ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Login,
    Analysis,
    Plan,
    Unlock { cost: u32 },
    AdReward { amount: u32 },
    DeleteAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub id: RequestId,
    pub kind: CallKind,
}

// --- Model ---

#[derive(Debug)]
pub struct Model {
    pub step: Step,
    pub user: Option<User>,
    pub form: TripFormData,
    pub analysis: Option<TripAnalysis>,
    pub plan: Option<TripPlanResponse>,
    pub error: Option<AppError>,
    pub notice: Option<String>,
    pub confirming_deletion: bool,
    pub pending: Option<PendingCall>,
    pub config: WizardConfig,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            step: Step::Auth,
            user: None,
            form: TripFormData::default(),
            analysis: None,
            plan: None,
            error: None,
            notice: None,
            confirming_deletion: false,
            pending: None,
            config: WizardConfig::default(),
        }
    }
}

impl Model {
    /// Moves to `to`, except into a paywall or detail step without a route analysis.
    pub fn transition(&mut self, to: Step) {
        if to.needs_analysis() && self.analysis.is_none() {
            warn!(from = %self.step, to = %to, "transition refused without analysis");
            return;
        }
        if self.step != to {
            info!(from = %self.step, to = %to, "step transition");
        }
        self.step = to;
    }

    pub fn set_error(&mut self, error: AppError) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn balance(&self) -> Option<u32> {
        self.user.as_ref().map(|u| u.points)
    }

    /// Points needed to unlock the current route. Shared by the paywall view and the confirm guard.
    #[must_use]
    pub fn unlock_cost(&self) -> Option<u32> {
        self.analysis
            .as_ref()
            .map(|analysis| self.config.points.unlock_cost(analysis))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts tracking a capability call. Closes any open deletion prompt.
    pub fn begin_call(&mut self, kind: CallKind) -> RequestId {
        let id = RequestId::generate();
        self.confirming_deletion = false;
        self.pending = Some(PendingCall {
            id: id.clone(),
            kind,
        });
        id
    }

    /// Claims the pending call if `id` is the one outstanding. Anything else is a stale resolution.
    pub fn settle(&mut self, id: &RequestId) -> Option<PendingCall> {
        match &self.pending {
            Some(pending) if &pending.id == id => self.pending.take(),
            _ => None,
        }
    }

    pub fn reset_trip(&mut self) {
        self.form = TripFormData::default();
        self.analysis = None;
        self.plan = None;
        self.error = None;
        self.pending = None;
    }

    pub fn end_session(&mut self) {
        self.user = None;
        self.confirming_deletion = false;
        self.reset_trip();
        self.transition(Step::Auth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(min_days: u32, max_days: u32) -> TripAnalysis {
        TripAnalysis {
            valid_transports: vec![TransportType::Car, TransportType::Train],
            min_days,
            max_days,
            is_international: false,
            corrected_origin: String::new(),
            corrected_destination: String::new(),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_form_defaults() {
        let form = TripFormData::default();
        assert_eq!(form.origin, "");
        assert_eq!(form.destination, "");
        assert_eq!(form.transport, TransportType::Car);
        assert_eq!(form.days, 3);
        assert_eq!(form.travelers, 2);
        assert!(form.budget.is_none());
        assert!(!form.is_complete());
    }

    #[test]
    fn test_recommended_days_rounds_up() {
        assert_eq!(analysis(2, 5).recommended_days(), 4);
        assert_eq!(analysis(3, 3).recommended_days(), 3);
        assert_eq!(analysis(1, 2).recommended_days(), 2);
    }

    #[test]
    fn test_recommended_days_never_zero() {
        assert_eq!(analysis(0, 0).recommended_days(), 1);
    }

    #[test]
    fn test_allows_only_listed_modes() {
        let a = analysis(1, 2);
        assert!(a.allows(TransportType::Train));
        assert!(!a.allows(TransportType::Flight));

        let open = TripAnalysis {
            valid_transports: vec![],
            ..analysis(1, 2)
        };
        assert!(open.allows(TransportType::Flight));
    }

    #[test]
    fn test_corrected_names_fall_back_when_blank() {
        let mut a = analysis(1, 2);
        assert_eq!(a.origin_or("paris"), "paris");
        a.corrected_origin = "Paris, France".into();
        a.corrected_destination = "   ".into();
        assert_eq!(a.origin_or("paris"), "Paris, France");
        assert_eq!(a.destination_or("rome"), "rome");
    }

    #[test]
    fn test_step_header_exclusion() {
        assert!(!Step::Auth.shows_header());
        assert!(!Step::Admin.shows_header());
        assert!(Step::Landing.shows_header());
        assert!(Step::Results.shows_header());
    }

    #[test]
    fn test_step_previous() {
        assert_eq!(Step::DurationSelection.previous(), Some(Step::Inputs));
        assert_eq!(Step::Transport.previous(), Some(Step::DurationSelection));
        assert_eq!(Step::Budget.previous(), Some(Step::Transport));
        assert_eq!(Step::PointCheck.previous(), None);
    }

    #[test]
    fn test_settle_rejects_unknown_request() {
        let mut model = Model::default();
        let id = model.begin_call(CallKind::Analysis);

        assert!(model.settle(&RequestId::generate()).is_none());
        assert!(model.is_busy());

        let settled = model.settle(&id).expect("pending call");
        assert_eq!(settled.kind, CallKind::Analysis);
        assert!(!model.is_busy());
        assert!(model.settle(&id).is_none());
    }

    #[test]
    fn test_begin_call_closes_deletion_prompt() {
        let mut model = Model {
            confirming_deletion: true,
            ..Model::default()
        };
        model.begin_call(CallKind::Plan);
        assert!(!model.confirming_deletion);
    }

    #[test]
    fn test_transition_needs_analysis_for_paywall() {
        let mut model = Model {
            step: Step::Inputs,
            ..Model::default()
        };
        model.transition(Step::PointCheck);
        assert_eq!(model.step, Step::Inputs);

        model.analysis = Some(analysis(2, 4));
        model.transition(Step::PointCheck);
        assert_eq!(model.step, Step::PointCheck);
    }

    #[test]
    fn test_end_session_clears_everything() {
        let mut model = Model::default();
        model.user = Some(User {
            id: UserId::new("ana"),
            password: None,
            points: 10,
            is_admin: false,
        });
        model.form.origin = "Lyon".into();
        model.analysis = Some(analysis(1, 3));
        model.confirming_deletion = true;
        model.begin_call(CallKind::Plan);
        model.transition(Step::Loading);

        model.end_session();

        assert_eq!(model.step, Step::Auth);
        assert!(model.user.is_none());
        assert!(model.analysis.is_none());
        assert!(model.pending.is_none());
        assert!(!model.confirming_deletion);
        assert_eq!(model.form, TripFormData::default());
    }

    #[test]
    fn test_budget_wire_labels() {
        let json = serde_json::to_string(&BudgetLevel::Low).expect("serialize");
        assert_eq!(json, "\"Low Cost\"");
        let parsed: BudgetLevel = serde_json::from_str("\"Luxury\"").expect("deserialize");
        assert_eq!(parsed, BudgetLevel::High);
    }

    #[test]
    fn test_analysis_accepts_service_json() {
        let json = r#"{
            "validTransports": ["Car", "Flight"],
            "minDays": 2,
            "maxDays": 5,
            "isInternational": true,
            "correctedOrigin": "Berlin, Germany",
            "correctedDestination": "Paris, France",
            "reasoning": "Long distance"
        }"#;
        let parsed: TripAnalysis = serde_json::from_str(json).expect("deserialize");
        assert!(parsed.is_international);
        assert_eq!(parsed.valid_transports, vec![TransportType::Car, TransportType::Flight]);
        assert_eq!(parsed.recommended_days(), 4);
    }
}
