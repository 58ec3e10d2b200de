#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_core::Request;
use tripwise::capabilities::{
    IntelligenceOperation, IntelligenceOutput, IntelligenceResult, MemoryUserStore,
    UserStoreOperation,
};
use tripwise::{
    Accommodation, Activity, App, DayItinerary, Effect, Event, FoodRecommendation, Model,
    Password, TransportDetails, TransportType, TripAnalysis, TripPlanResponse, User, UserId,
    ViewModel,
};

/// Plays the shell: answers store requests from an in-memory store and holds
/// intelligence requests until the test answers them.
pub struct Shell {
    pub app: AppTester<App, Effect>,
    pub model: Model,
    pub store: MemoryUserStore,
    pub auto_store: bool,
    pub held_store: Vec<Request<UserStoreOperation>>,
    pub held_intelligence: Vec<Request<IntelligenceOperation>>,
    pub renders: usize,
}

impl Shell {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
            store: MemoryUserStore::with_users(users),
            auto_store: true,
            held_store: Vec::new(),
            held_intelligence: Vec::new(),
            renders: 0,
        }
    }

    pub fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        self.process(update.effects);
    }

    pub fn view(&self) -> ViewModel {
        self.app.view(&self.model)
    }

    pub fn login(&mut self, user_id: &str, password: &str) {
        self.send(Event::LoginRequested {
            user_id: user_id.into(),
            password: Password::new(password),
        });
    }

    pub fn answer_intelligence(&mut self, output: IntelligenceResult) {
        assert!(
            !self.held_intelligence.is_empty(),
            "no intelligence request outstanding"
        );
        let request = self.held_intelligence.remove(0);
        self.answer_intelligence_request(request, output);
    }

    pub fn answer_intelligence_request(
        &mut self,
        mut request: Request<IntelligenceOperation>,
        output: IntelligenceResult,
    ) {
        let update = self
            .app
            .resolve(&mut request, output)
            .expect("resolve intelligence request");
        self.process(update.effects);
        for event in update.events {
            self.send(event);
        }
    }

    /// Answers the oldest held store request from the in-memory store.
    pub fn release_store(&mut self) {
        assert!(!self.held_store.is_empty(), "no store request outstanding");
        let request = self.held_store.remove(0);
        self.resolve_store(request);
    }

    fn resolve_store(&mut self, mut request: Request<UserStoreOperation>) {
        let output = self.store.handle(&request.operation);
        let update = self
            .app
            .resolve(&mut request, output)
            .expect("resolve store request");
        self.process(update.effects);
        for event in update.events {
            self.send(event);
        }
    }

    fn process(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Render(_) => self.renders += 1,
                Effect::UserStore(request) if self.auto_store => self.resolve_store(request),
                Effect::UserStore(request) => self.held_store.push(request),
                Effect::TripIntelligence(request) => self.held_intelligence.push(request),
            }
        }
    }

    pub fn balance(&self) -> Option<u32> {
        self.model.user.as_ref().map(|u| u.points)
    }

    pub fn error_message(&self) -> Option<String> {
        self.view().error
    }
}

pub fn traveller(id: &str, points: u32) -> User {
    User {
        id: UserId::new(id),
        password: Some(Password::new("pw")),
        points,
        is_admin: false,
    }
}

pub fn admin(id: &str) -> User {
    User {
        is_admin: true,
        ..traveller(id, 0)
    }
}

pub fn route(is_international: bool) -> TripAnalysis {
    TripAnalysis {
        valid_transports: vec![TransportType::Car, TransportType::Train],
        min_days: 2,
        max_days: 5,
        is_international,
        corrected_origin: "Madrid, Spain".into(),
        corrected_destination: if is_international {
            "Lisbon, Portugal".into()
        } else {
            "Seville, Spain".into()
        },
        reasoning: "Well connected by road and rail".into(),
    }
}

pub fn analysis_ok(is_international: bool) -> IntelligenceResult {
    Ok(IntelligenceOutput::Analysis(route(is_international)))
}

pub fn plan() -> TripPlanResponse {
    let day = |day: u32, location: &str| DayItinerary {
        day,
        activities: vec![Activity {
            time: "09:00".into(),
            location: location.into(),
            description: "Walking tour".into(),
        }],
    };

    TripPlanResponse {
        destination_name: "Seville".into(),
        currency_symbol: "€".into(),
        grand_total: "€640".into(),
        local_transport_tip: "Use the Sevici bikes".into(),
        accommodations: vec![Accommodation {
            name: "Hotel Alfonso".into(),
            description: "Central".into(),
            estimated_cost: "€120/night".into(),
        }],
        itinerary: vec![day(2, "Alcázar"), day(1, "Cathedral"), day(3, "Triana")],
        food: vec![FoodRecommendation {
            dish_name: "Salmorejo".into(),
            restaurant_name: "Bodega Santa Cruz".into(),
            description: "Cold tomato soup".into(),
        }],
        transport_details: TransportDetails {
            mode: "Train".into(),
            cost_breakdown: "2 x €60 return".into(),
            total_cost: "€120".into(),
            notes: "AVE high speed".into(),
        },
    }
}

pub fn plan_ok() -> IntelligenceResult {
    Ok(IntelligenceOutput::Plan(plan()))
}
