//! Step views: a pure projection of [`Model`] for the shell to draw.
//!
//! Every step maps to exactly one [`Screen`]. Steps that need data the model does not
//! hold fall back to [`Screen::Error`] instead of rendering a half-empty page.

use serde::{Deserialize, Serialize};

use crate::model::{
    Accommodation, BudgetLevel, DayItinerary, FoodRecommendation, Model, Step, TransportDetails,
    TransportType, TripAnalysis,
};

const MISSING_DATA_MESSAGE: &str = "Something went wrong. Please start over.";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub step: Step,
    pub screen: Screen,
    pub header: Option<HeaderView>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub confirm_delete: bool,
    pub busy: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HeaderView {
    pub user_id: String,
    pub points: u32,
    pub points_label: String,
    pub can_delete_account: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Screen {
    Auth,
    Admin {
        user_id: String,
    },
    Landing,
    Inputs {
        origin: String,
        destination: String,
    },
    Analyzing {
        origin: String,
        destination: String,
    },
    PointCheck(PointCheckView),
    AdWatch {
        reward: u32,
        reward_label: String,
    },
    DurationSelection {
        destination: String,
        min_days: u32,
        max_days: u32,
        days: u32,
        travelers: u32,
    },
    Transport {
        options: Vec<TransportOption>,
        reasoning: String,
    },
    Budget {
        options: Vec<BudgetOption>,
    },
    Loading {
        destination: String,
    },
    Results(ResultsView),
    Error {
        message: String,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PointCheckView {
    pub origin: String,
    pub destination: String,
    pub is_international: bool,
    pub trip_label: String,
    pub cost: u32,
    pub balance: u32,
    pub can_afford: bool,
    pub shortfall: u32,
    pub ad_reward: u32,
    pub ads_needed: u32,
    pub unlock_label: String,
    pub watch_ad_label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransportOption {
    pub transport: TransportType,
    pub label: String,
    pub available: bool,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BudgetOption {
    pub budget: BudgetLevel,
    pub label: String,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ResultsView {
    pub destination_name: String,
    pub currency_symbol: String,
    pub grand_total: String,
    pub local_transport_tip: String,
    pub days: u32,
    pub travelers: u32,
    pub transport_label: String,
    pub budget_label: String,
    pub accommodations: Vec<Accommodation>,
    pub itinerary: Vec<DayItinerary>,
    pub food: Vec<FoodRecommendation>,
    pub transport_details: TransportDetails,
}

impl ViewModel {
    #[must_use]
    pub fn project(model: &Model) -> Self {
        Self {
            step: model.step,
            screen: screen(model),
            header: header(model),
            error: model
                .error
                .as_ref()
                .map(|e| e.user_facing_message().to_string()),
            notice: model.notice.clone(),
            confirm_delete: model.confirming_deletion,
            busy: model.is_busy(),
        }
    }
}

fn header(model: &Model) -> Option<HeaderView> {
    let user = model.user.as_ref()?;
    if !model.step.shows_header() {
        return None;
    }
    Some(HeaderView {
        user_id: user.id.to_string(),
        points: user.points,
        points_label: format!("{} pts", user.points),
        can_delete_account: !user.is_admin && !model.is_busy(),
    })
}

fn screen(model: &Model) -> Screen {
    match model.step {
        Step::Auth => Screen::Auth,
        Step::Admin => match &model.user {
            Some(user) => Screen::Admin {
                user_id: user.id.to_string(),
            },
            None => missing_data(),
        },
        Step::Landing => Screen::Landing,
        Step::Inputs => Screen::Inputs {
            origin: model.form.origin.clone(),
            destination: model.form.destination.clone(),
        },
        Step::Analyzing => Screen::Analyzing {
            origin: model.form.origin.clone(),
            destination: model.form.destination.clone(),
        },
        Step::PointCheck => point_check(model).map_or_else(missing_data, Screen::PointCheck),
        Step::AdWatch => {
            let reward = model.config.points.ad_reward;
            Screen::AdWatch {
                reward,
                reward_label: format!("+{reward} pts"),
            }
        }
        Step::DurationSelection => match &model.analysis {
            Some(analysis) => Screen::DurationSelection {
                destination: analysis.destination_or(&model.form.destination).to_string(),
                min_days: analysis.min_days,
                max_days: analysis.max_days,
                days: model.form.days,
                travelers: model.form.travelers,
            },
            None => missing_data(),
        },
        Step::Transport => match &model.analysis {
            Some(analysis) => Screen::Transport {
                options: transport_options(analysis, model.form.transport),
                reasoning: analysis.reasoning.clone(),
            },
            None => missing_data(),
        },
        Step::Budget => Screen::Budget {
            options: BudgetLevel::ALL
                .iter()
                .map(|&budget| BudgetOption {
                    budget,
                    label: budget.label().to_string(),
                    selected: model.form.budget == Some(budget),
                })
                .collect(),
        },
        Step::Loading => Screen::Loading {
            destination: model.form.destination.clone(),
        },
        Step::Results => match &model.plan {
            Some(plan) => Screen::Results(ResultsView {
                destination_name: plan.destination_name.clone(),
                currency_symbol: plan.currency_symbol.clone(),
                grand_total: plan.grand_total.clone(),
                local_transport_tip: plan.local_transport_tip.clone(),
                days: model.form.days,
                travelers: model.form.travelers,
                transport_label: model.form.transport.label().to_string(),
                budget_label: model
                    .form
                    .budget
                    .map(|b| b.label().to_string())
                    .unwrap_or_default(),
                accommodations: plan.accommodations.clone(),
                itinerary: plan.ordered_itinerary(),
                food: plan.food.clone(),
                transport_details: plan.transport_details.clone(),
            }),
            None => missing_data(),
        },
        Step::Error => Screen::Error {
            message: model.error.as_ref().map_or_else(
                || MISSING_DATA_MESSAGE.to_string(),
                |e| e.user_facing_message().to_string(),
            ),
        },
    }
}

fn point_check(model: &Model) -> Option<PointCheckView> {
    let user = model.user.as_ref()?;
    let analysis = model.analysis.as_ref()?;
    let decision = model.config.points.decide(analysis, user.points);
    let cost = decision.cost();
    let shortfall = cost.saturating_sub(user.points);

    Some(PointCheckView {
        origin: analysis.origin_or(&model.form.origin).to_string(),
        destination: analysis.destination_or(&model.form.destination).to_string(),
        is_international: analysis.is_international,
        trip_label: if analysis.is_international {
            "International Trip".into()
        } else {
            "National Trip".into()
        },
        cost,
        balance: user.points,
        can_afford: decision.is_affordable(),
        shortfall,
        ad_reward: model.config.points.ad_reward,
        ads_needed: model.config.points.ads_needed(analysis, user.points),
        unlock_label: format!("Unlock Plan (-{cost} pts)"),
        watch_ad_label: format!("Watch Ad (+{} pts)", model.config.points.ad_reward),
    })
}

fn transport_options(analysis: &TripAnalysis, selected: TransportType) -> Vec<TransportOption> {
    TransportType::ALL
        .iter()
        .map(|&transport| TransportOption {
            transport,
            label: transport.label().to_string(),
            available: analysis.allows(transport),
            selected: transport == selected,
        })
        .collect()
}

fn missing_data() -> Screen {
    Screen::Error {
        message: MISSING_DATA_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, UserId};
    use crate::{AppError, ErrorKind};

    fn user(points: u32, is_admin: bool) -> User {
        User {
            id: UserId::new("ana"),
            password: None,
            points,
            is_admin,
        }
    }

    fn analysis(is_international: bool) -> TripAnalysis {
        TripAnalysis {
            valid_transports: vec![TransportType::Train],
            min_days: 2,
            max_days: 5,
            is_international,
            corrected_origin: "Lyon, France".into(),
            corrected_destination: "Turin, Italy".into(),
            reasoning: "Alpine rail link".into(),
        }
    }

    #[test]
    fn test_header_hidden_on_auth_and_admin() {
        let mut model = Model {
            user: Some(user(10, true)),
            step: Step::Admin,
            ..Model::default()
        };
        assert!(ViewModel::project(&model).header.is_none());

        model.step = Step::Landing;
        let header = ViewModel::project(&model).header.expect("header");
        assert!(!header.can_delete_account);
        assert_eq!(header.points_label, "10 pts");
    }

    #[test]
    fn test_delete_control_hidden_while_busy() {
        let mut model = Model {
            user: Some(user(10, false)),
            step: Step::Analyzing,
            ..Model::default()
        };
        model.begin_call(crate::model::CallKind::Analysis);

        let header = ViewModel::project(&model).header.expect("header");
        assert!(!header.can_delete_account);
    }

    #[test]
    fn test_point_check_screen() {
        let model = Model {
            user: Some(user(40, false)),
            analysis: Some(analysis(true)),
            step: Step::PointCheck,
            ..Model::default()
        };

        match ViewModel::project(&model).screen {
            Screen::PointCheck(view) => {
                assert_eq!(view.cost, 100);
                assert_eq!(view.trip_label, "International Trip");
                assert!(!view.can_afford);
                assert_eq!(view.shortfall, 60);
                assert_eq!(view.ads_needed, 2);
                assert_eq!(view.origin, "Lyon, France");
                assert_eq!(view.watch_ad_label, "Watch Ad (+50 pts)");
            }
            other => panic!("unexpected screen {other:?}"),
        }
    }

    #[test]
    fn test_missing_analysis_falls_back_to_error() {
        let model = Model {
            user: Some(user(40, false)),
            step: Step::Transport,
            ..Model::default()
        };
        assert_eq!(
            ViewModel::project(&model).screen,
            Screen::Error {
                message: MISSING_DATA_MESSAGE.into()
            }
        );
    }

    #[test]
    fn test_transport_options_mark_availability() {
        let options = transport_options(&analysis(false), TransportType::Train);
        assert_eq!(options.len(), 4);
        let train = options
            .iter()
            .find(|o| o.transport == TransportType::Train)
            .expect("train");
        assert!(train.available && train.selected);
        assert!(options
            .iter()
            .filter(|o| o.transport != TransportType::Train)
            .all(|o| !o.available));
    }

    #[test]
    fn test_error_screen_shows_message() {
        let model = Model {
            step: Step::Error,
            error: Some(AppError::new(ErrorKind::AnalysisFailure)),
            ..Model::default()
        };
        let view = ViewModel::project(&model);
        assert_eq!(
            view.screen,
            Screen::Error {
                message: "Analysis failed. Please try again.".into()
            }
        );
    }

    #[test]
    fn test_screen_is_tagged() {
        let json = serde_json::to_value(Screen::Loading {
            destination: "Rome".into(),
        })
        .expect("serialize");
        assert_eq!(json["type"], "loading");
        assert_eq!(json["destination"], "Rome");
    }
}
