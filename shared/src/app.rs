use tracing::{debug, info, instrument, warn};

use crate::capabilities::{Capabilities, IntelligenceError, LedgerReceipt, UserStoreError};
use crate::config::WizardConfig;
use crate::event::{Credentials, Event, Password};
use crate::model::{
    BudgetLevel, CallKind, Model, RequestId, Step, TransportType, TripAnalysis,
    TripPlanResponse, User, UserId,
};
use crate::view::ViewModel;
use crate::{AppError, ErrorKind, MAX_PLACE_LENGTH};

pub const ACCOUNT_GONE_NOTICE: &str = "Account deleted or not found. Logging you out.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";

/// Whether an event changed anything the shell needs to redraw.
enum Outcome {
    Changed,
    Ignored(&'static str),
}

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    #[instrument(skip_all, fields(event = event.name(), step = %model.step))]
    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        if event.is_user_initiated() {
            debug!("user intent");
        }

        match Self::handle(event, model, caps) {
            Outcome::Changed => caps.render.render(),
            Outcome::Ignored(reason) => debug!(reason, "event ignored"),
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::project(model)
    }
}

impl App {
    fn handle(event: Event, model: &mut Model, caps: &Capabilities) -> Outcome {
        match event {
            Event::Configure(config) => Self::configure(*config, model),
            Event::LoginRequested { user_id, password } => {
                Self::request_login(&user_id, password, model, caps)
            }
            Event::LogoutRequested => Self::logout(model),
            Event::DeleteAccountRequested => Self::open_delete_confirmation(model),
            Event::DeleteAccountCancelled => {
                if !model.confirming_deletion {
                    return Outcome::Ignored("no deletion to cancel");
                }
                model.confirming_deletion = false;
                Outcome::Changed
            }
            Event::DeleteAccountConfirmed => Self::request_deletion(model, caps),
            Event::DismissError => {
                if model.error.as_ref().is_some_and(AppError::is_fatal) {
                    return Outcome::Ignored("fatal errors are cleared by reset");
                }
                if model.error.is_none() && model.notice.is_none() {
                    return Outcome::Ignored("nothing to dismiss");
                }
                model.clear_error();
                model.notice = None;
                Outcome::Changed
            }

            Event::StartRequested => {
                if model.step != Step::Landing {
                    return Outcome::Ignored("not on landing");
                }
                model.clear_error();
                model.notice = None;
                model.transition(Step::Inputs);
                Outcome::Changed
            }
            Event::AddressesSubmitted {
                origin,
                destination,
            } => Self::request_analysis(&origin, &destination, model, caps),
            Event::UnlockConfirmed => Self::request_unlock(model, caps),
            Event::WatchAdRequested => Self::open_ad(model),
            Event::AdCompleted => Self::request_ad_reward(model, caps),
            Event::AdCancelled => {
                if model.step != Step::AdWatch {
                    return Outcome::Ignored("no ad playing");
                }
                model.transition(Step::PointCheck);
                Outcome::Changed
            }
            Event::DurationSelected { days, travelers } => {
                Self::select_duration(days, travelers, model)
            }
            Event::TransportSelected { transport } => Self::select_transport(transport, model),
            Event::BudgetSelected { budget } => Self::request_plan(budget, model, caps),
            Event::BackRequested => match model.step.previous() {
                Some(previous) if !model.is_busy() => {
                    model.clear_error();
                    model.transition(previous);
                    Outcome::Changed
                }
                Some(_) => Outcome::Ignored("request in flight"),
                None => Outcome::Ignored("no previous step"),
            },
            Event::ResetRequested => {
                if !model.step.can_reset() {
                    return Outcome::Ignored("reset only offered on results or error");
                }
                model.reset_trip();
                model.transition(Step::Landing);
                Outcome::Changed
            }

            Event::LoginResponse { request_id, result } => {
                Self::on_login(&request_id, *result, model)
            }
            Event::AnalysisResponse { request_id, result } => {
                Self::on_analysis(&request_id, *result, model)
            }
            Event::PlanResponse { request_id, result } => {
                Self::on_plan(&request_id, *result, model)
            }
            Event::UnlockResponse { request_id, result } => {
                Self::on_unlock(&request_id, result, model)
            }
            Event::AdRewardResponse { request_id, result } => {
                Self::on_ad_reward(&request_id, result, model)
            }
            Event::DeleteAccountResponse { request_id, result } => {
                Self::on_deletion(&request_id, result, model)
            }
        }
    }

    // --- Session ---

    fn configure(config: WizardConfig, model: &mut Model) -> Outcome {
        if !matches!(model.step, Step::Auth | Step::Landing | Step::Admin) {
            return Outcome::Ignored("configuration locked while a trip is in progress");
        }
        if let Err(e) = config.validate() {
            warn!(error = %e, "configuration rejected");
            model.set_error(e.into());
            return Outcome::Changed;
        }
        info!(
            national_cost = config.points.national_cost,
            international_cost = config.points.international_cost,
            ad_reward = config.points.ad_reward,
            "configuration applied"
        );
        model.config = config;
        Outcome::Changed
    }

    fn request_login(
        user_id: &str,
        password: Password,
        model: &mut Model,
        caps: &Capabilities,
    ) -> Outcome {
        if model.step != Step::Auth {
            return Outcome::Ignored("already signed in");
        }
        if model.is_busy() {
            return Outcome::Ignored("login in flight");
        }

        let user_id = user_id.trim();
        if user_id.is_empty() {
            model.set_error(
                AppError::new(ErrorKind::Validation).with_message("Please enter your user id."),
            );
            return Outcome::Changed;
        }

        model.clear_error();
        model.notice = None;
        let request_id = model.begin_call(CallKind::Login);
        let credentials = Credentials {
            user_id: UserId::new(user_id),
            password,
        };
        caps.user_store.login(credentials, move |result| Event::LoginResponse {
            request_id,
            result: Box::new(result),
        });
        Outcome::Changed
    }

    fn on_login(
        request_id: &RequestId,
        result: Result<User, UserStoreError>,
        model: &mut Model,
    ) -> Outcome {
        if model.settle(request_id).is_none() {
            return Outcome::Ignored("stale login resolution");
        }

        match result {
            Ok(user) => {
                let user = user.without_password();
                info!(user_id = %user.id, is_admin = user.is_admin, "login succeeded");
                let next = if user.is_admin {
                    Step::Admin
                } else {
                    Step::Landing
                };
                model.user = Some(user);
                model.clear_error();
                model.transition(next);
            }
            Err(UserStoreError::InvalidCredentials) => {
                warn!("login rejected");
                model.set_error(
                    AppError::new(ErrorKind::LoginFailure).with_message(INVALID_CREDENTIALS_MESSAGE),
                );
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                model.set_error(AppError::new(ErrorKind::LoginFailure).with_internal(e.to_string()));
            }
        }
        Outcome::Changed
    }

    fn logout(model: &mut Model) -> Outcome {
        if model.step == Step::Auth && !model.is_authenticated() {
            return Outcome::Ignored("not signed in");
        }
        if let Some(user) = &model.user {
            info!(user_id = %user.id, "logout");
        }
        model.notice = None;
        model.end_session();
        Outcome::Changed
    }

    fn open_delete_confirmation(model: &mut Model) -> Outcome {
        let Some(user) = &model.user else {
            return Outcome::Ignored("not signed in");
        };
        if user.is_admin || !model.step.shows_header() {
            return Outcome::Ignored("account deletion not offered here");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }
        model.confirming_deletion = true;
        Outcome::Changed
    }

    fn request_deletion(model: &mut Model, caps: &Capabilities) -> Outcome {
        if !model.confirming_deletion {
            return Outcome::Ignored("deletion not confirmed");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }
        let Some(user_id) = model.user.as_ref().map(|u| u.id.clone()) else {
            return Outcome::Ignored("not signed in");
        };

        model.confirming_deletion = false;
        let request_id = model.begin_call(CallKind::DeleteAccount);
        caps.user_store
            .delete_user(user_id, move |result| Event::DeleteAccountResponse {
                request_id,
                result,
            });
        Outcome::Changed
    }

    fn on_deletion(
        request_id: &RequestId,
        result: Result<(), UserStoreError>,
        model: &mut Model,
    ) -> Outcome {
        if model.settle(request_id).is_none() {
            return Outcome::Ignored("stale deletion resolution");
        }

        match result {
            Ok(()) => {
                info!("account deleted");
                model.notice = None;
                model.end_session();
            }
            Err(UserStoreError::UserNotFound { user_id }) => {
                warn!(%user_id, "account already absent, logging out");
                model.end_session();
                model.notice = Some(ACCOUNT_GONE_NOTICE.to_string());
            }
            Err(e) => {
                warn!(error = %e, "account deletion failed");
                model.set_error(
                    AppError::new(ErrorKind::AccountDeletionFailure).with_internal(e.to_string()),
                );
            }
        }
        Outcome::Changed
    }

    // --- Route analysis ---

    fn request_analysis(
        origin: &str,
        destination: &str,
        model: &mut Model,
        caps: &Capabilities,
    ) -> Outcome {
        if model.step != Step::Inputs {
            return Outcome::Ignored("addresses only accepted on inputs");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }

        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            model.set_error(
                AppError::new(ErrorKind::Validation)
                    .with_message("Please enter both an origin and a destination."),
            );
            return Outcome::Changed;
        }
        if origin.chars().count() > MAX_PLACE_LENGTH
            || destination.chars().count() > MAX_PLACE_LENGTH
        {
            model.set_error(AppError::new(ErrorKind::Validation).with_message(format!(
                "Place names must be at most {MAX_PLACE_LENGTH} characters."
            )));
            return Outcome::Changed;
        }

        model.form.origin = origin.to_string();
        model.form.destination = destination.to_string();
        model.analysis = None;
        model.clear_error();

        let request_id = model.begin_call(CallKind::Analysis);
        model.transition(Step::Analyzing);
        caps.intelligence.analyze_route(
            origin.to_string(),
            destination.to_string(),
            model.config.analysis_timeout_ms,
            move |result| Event::AnalysisResponse {
                request_id,
                result: Box::new(result),
            },
        );
        Outcome::Changed
    }

    fn on_analysis(
        request_id: &RequestId,
        result: Result<TripAnalysis, IntelligenceError>,
        model: &mut Model,
    ) -> Outcome {
        if model.settle(request_id).is_none() {
            return Outcome::Ignored("stale analysis resolution");
        }

        match result {
            Ok(analysis) => {
                model.form.origin = analysis.origin_or(&model.form.origin).to_string();
                model.form.destination = analysis.destination_or(&model.form.destination).to_string();
                info!(
                    is_international = analysis.is_international,
                    min_days = analysis.min_days,
                    max_days = analysis.max_days,
                    "route analysed"
                );
                model.analysis = Some(analysis);
                model.transition(Step::PointCheck);
            }
            Err(e) => {
                warn!(error = %e, "route analysis failed");
                model.set_error(AppError::new(ErrorKind::AnalysisFailure).with_internal(e.to_string()));
                model.transition(Step::Error);
            }
        }
        Outcome::Changed
    }

    // --- Points paywall ---

    fn request_unlock(model: &mut Model, caps: &Capabilities) -> Outcome {
        if model.step != Step::PointCheck {
            return Outcome::Ignored("nothing to unlock");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }
        let (Some(user), Some(cost)) = (&model.user, model.unlock_cost()) else {
            return Outcome::Ignored("missing session or analysis");
        };

        if !user.can_afford(cost) {
            info!(balance = user.points, cost, "unlock refused locally");
            model.set_error(AppError::new(ErrorKind::InsufficientPoints));
            return Outcome::Changed;
        }

        let user_id = user.id.clone();
        model.clear_error();
        let request_id = model.begin_call(CallKind::Unlock { cost });
        caps.user_store
            .deduct_points(user_id, cost, move |result| Event::UnlockResponse {
                request_id,
                result,
            });
        Outcome::Changed
    }

    fn on_unlock(
        request_id: &RequestId,
        result: Result<LedgerReceipt, UserStoreError>,
        model: &mut Model,
    ) -> Outcome {
        let Some(call) = model.settle(request_id) else {
            return Outcome::Ignored("stale unlock resolution");
        };
        let CallKind::Unlock { cost } = call.kind else {
            return Outcome::Ignored("resolution does not match pending unlock");
        };

        match result {
            Ok(receipt) => {
                let expected = model.balance().and_then(|b| b.checked_sub(cost));
                Self::adopt_balance(model, expected, receipt.balance);
                if let Some(analysis) = &model.analysis {
                    model.form.days = analysis.recommended_days();
                }
                info!(cost, balance = receipt.balance, "trip unlocked");
                model.clear_error();
                model.transition(Step::DurationSelection);
            }
            Err(UserStoreError::InsufficientFunds { balance, requested }) => {
                warn!(balance, requested, "store refused deduction");
                Self::adopt_balance(model, None, balance);
                model.set_error(AppError::new(ErrorKind::InsufficientPoints));
            }
            Err(e) => {
                warn!(error = %e, "deduction failed");
                model.set_error(
                    AppError::new(ErrorKind::TransactionFailure).with_internal(e.to_string()),
                );
            }
        }
        Outcome::Changed
    }

    fn open_ad(model: &mut Model) -> Outcome {
        if model.step != Step::PointCheck {
            return Outcome::Ignored("ads only offered on the paywall");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }
        let (Some(user), Some(cost)) = (&model.user, model.unlock_cost()) else {
            return Outcome::Ignored("missing session or analysis");
        };
        if user.can_afford(cost) {
            return Outcome::Ignored("balance already covers unlock");
        }
        model.clear_error();
        model.transition(Step::AdWatch);
        Outcome::Changed
    }

    fn request_ad_reward(model: &mut Model, caps: &Capabilities) -> Outcome {
        if model.step != Step::AdWatch {
            return Outcome::Ignored("no ad playing");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }
        let Some(user_id) = model.user.as_ref().map(|u| u.id.clone()) else {
            return Outcome::Ignored("not signed in");
        };

        let amount = model.config.points.ad_reward;
        let request_id = model.begin_call(CallKind::AdReward { amount });
        model.transition(Step::PointCheck);
        caps.user_store
            .add_points(user_id, amount, move |result| Event::AdRewardResponse {
                request_id,
                result,
            });
        Outcome::Changed
    }

    fn on_ad_reward(
        request_id: &RequestId,
        result: Result<LedgerReceipt, UserStoreError>,
        model: &mut Model,
    ) -> Outcome {
        let Some(call) = model.settle(request_id) else {
            return Outcome::Ignored("stale ad reward resolution");
        };
        let CallKind::AdReward { amount } = call.kind else {
            return Outcome::Ignored("resolution does not match pending reward");
        };

        match result {
            Ok(receipt) => {
                let expected = model.balance().and_then(|b| b.checked_add(amount));
                Self::adopt_balance(model, expected, receipt.balance);
                info!(amount, balance = receipt.balance, "ad reward credited");
                model.clear_error();
            }
            Err(e) => {
                warn!(error = %e, amount, "ad reward failed");
                model.set_error(AppError::new(ErrorKind::RewardFailure).with_internal(e.to_string()));
            }
        }
        Outcome::Changed
    }

    /// The store's balance wins; a mismatch means something else touched the record.
    fn adopt_balance(model: &mut Model, expected: Option<u32>, actual: u32) {
        let Some(user) = model.user.as_mut() else {
            return;
        };
        if let Some(expected) = expected {
            if expected != actual {
                warn!(expected, actual, "store balance differs from local mirror");
            }
        }
        user.points = actual;
    }

    // --- Trip details ---

    fn select_duration(days: u32, travelers: u32, model: &mut Model) -> Outcome {
        if model.step != Step::DurationSelection {
            return Outcome::Ignored("duration not being selected");
        }
        if days == 0 || travelers == 0 {
            model.set_error(
                AppError::new(ErrorKind::Validation)
                    .with_message("Days and travelers must be at least 1."),
            );
            return Outcome::Changed;
        }
        model.form.days = days;
        model.form.travelers = travelers;
        model.clear_error();
        model.transition(Step::Transport);
        Outcome::Changed
    }

    fn select_transport(transport: TransportType, model: &mut Model) -> Outcome {
        if model.step != Step::Transport {
            return Outcome::Ignored("transport not being selected");
        }
        let allowed = match &model.analysis {
            Some(analysis) => analysis.allows(transport),
            None => true,
        };
        if !allowed {
            model.set_error(
                AppError::new(ErrorKind::Validation)
                    .with_message("That transport mode is not available for this route."),
            );
            return Outcome::Changed;
        }
        model.form.transport = transport;
        model.clear_error();
        model.transition(Step::Budget);
        Outcome::Changed
    }

    // --- Plan generation ---

    fn request_plan(budget: BudgetLevel, model: &mut Model, caps: &Capabilities) -> Outcome {
        if model.step != Step::Budget {
            return Outcome::Ignored("budget not being selected");
        }
        if model.is_busy() {
            return Outcome::Ignored("request in flight");
        }

        model.form.budget = Some(budget);
        model.plan = None;
        model.clear_error();
        let request_id = model.begin_call(CallKind::Plan);
        model.transition(Step::Loading);
        caps.intelligence.generate_plan(
            model.form.clone(),
            model.config.plan_timeout_ms,
            move |result| Event::PlanResponse {
                request_id,
                result: Box::new(result),
            },
        );
        Outcome::Changed
    }

    fn on_plan(
        request_id: &RequestId,
        result: Result<TripPlanResponse, IntelligenceError>,
        model: &mut Model,
    ) -> Outcome {
        if model.settle(request_id).is_none() {
            return Outcome::Ignored("stale plan resolution");
        }

        match result {
            Ok(plan) => {
                info!(
                    destination = %plan.destination_name,
                    days = plan.itinerary.len(),
                    "plan generated"
                );
                model.plan = Some(plan);
                model.clear_error();
                model.transition(Step::Results);
            }
            Err(e) => {
                warn!(error = %e, "plan generation failed");
                model.plan = None;
                model.set_error(
                    AppError::new(ErrorKind::PlanGenerationFailure).with_internal(e.to_string()),
                );
                model.transition(Step::Error);
            }
        }
        Outcome::Changed
    }
}
