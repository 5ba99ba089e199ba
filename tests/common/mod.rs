// tests/common/mod.rs

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use trivia_backend::{
    config::{Config, GameSettings},
    models::{
        contest::{Contest, ContestUser, Leader, Team, TeamId},
        question::{Answer, Direction, Question, Topic},
        session::{Session, SessionSettings},
        user::UserProfile,
    },
    routes,
    state::AppState,
    store::MemoryStore,
    utils::jwt::sign_jwt,
};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";
pub const SESSION_TOKEN: &str = "session-me";
pub const CONTEST_ID: &str = "contest-1";
pub const TOPIC_ID: i64 = 10;

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub token: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(&self.token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn start_quiz(&self) -> serde_json::Value {
        let response = self
            .post("/api/quiz/start", serde_json::json!({ "contestId": CONTEST_ID }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.unwrap()
    }

    pub async fn answer(&self, body: serde_json::Value) -> reqwest::Response {
        self.post("/api/quiz/answer", body).await
    }

    pub async fn next_question(&self) -> reqwest::Response {
        self.post("/api/quiz/next-question", serde_json::json!({})).await
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        game_settings_path: None,
        contest_update_attempts: 3,
        topic_cache_ttl_secs: 60,
        port: 0,
    }
}

/// Questions of the default topic: answer 2 is correct, hints cost 2, revealing costs 5.
pub fn question(id: i64) -> Question {
    Question {
        id,
        topic_id: TOPIC_ID,
        text: format!("Question {}?", id),
        answers: vec![
            Answer {
                text: "No".to_string(),
                correct: false,
            },
            Answer {
                text: "Yes".to_string(),
                correct: true,
            },
            Answer {
                text: "Maybe".to_string(),
                correct: false,
            },
            Answer {
                text: "Sometimes".to_string(),
                correct: false,
            },
        ],
        hint_cost: Some(2),
        answer_cost: Some(5),
        correct_count: 0,
        wrong_count: 0,
    }
}

pub fn leader(user_id: &str) -> Leader {
    Leader {
        user_id: user_id.to_string(),
        name: user_id.to_uppercase(),
        avatar: format!("{}.png", user_id),
    }
}

fn contest_user(team: TeamId, score: i64) -> ContestUser {
    let mut team_scores = [0, 0];
    team_scores[team.index()] = score;
    ContestUser {
        team,
        score,
        team_scores,
        last_played: None,
    }
}

/// "me" has joined team 0 without scoring yet. "rival" leads the contest and team 1
/// with 1000, so team 0 starts far behind.
pub fn contest() -> Contest {
    let users = HashMap::from([
        ("me".to_string(), contest_user(TeamId::First, 0)),
        ("rival".to_string(), contest_user(TeamId::Second, 1000)),
    ]);
    Contest {
        id: CONTEST_ID.to_string(),
        name: "Cats vs Dogs".to_string(),
        score: 1000,
        teams: [
            Team {
                score: 0,
                leader: None,
            },
            Team {
                score: 1000,
                leader: Some(leader("rival")),
            },
        ],
        users,
        leader: Some(leader("rival")),
        version: 0,
    }
}

pub fn session() -> Session {
    Session {
        id: SESSION_TOKEN.to_string(),
        user_id: "me".to_string(),
        facebook_user_id: "fb-me".to_string(),
        name: "ME".to_string(),
        avatar: "me.png".to_string(),
        score: 0,
        xp: 0,
        rank: 1,
        settings: SessionSettings::default(),
        features: Vec::new(),
        quiz: None,
    }
}

fn profile(id: &str, score: i64, friends: &[&str]) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        facebook_user_id: format!("fb-{}", id),
        name: id.to_uppercase(),
        avatar: format!("{}.png", id),
        score,
        xp: 0,
        rank: 1,
        friends: friends.iter().map(|f| f.to_string()).collect(),
    }
}

/// Seeds the store with one topic of `question_count` questions, the contest, the
/// session, and "me" with friends "pal" (100 points) and "ace" (5000 points).
pub async fn seed(store: &MemoryStore, question_count: i64) {
    store
        .insert_topic(Topic {
            id: TOPIC_ID,
            name: "General".to_string(),
            force_direction: None,
        })
        .await;
    for id in 1..=question_count {
        store.insert_question(question(id)).await;
    }
    store.insert_contest(contest()).await;
    store.insert_session(session()).await;
    store.insert_user(profile("me", 0, &["pal", "ace"])).await;
    store.insert_user(profile("pal", 100, &[])).await;
    store.insert_user(profile("ace", 5000, &[])).await;
}

pub async fn spawn_app_with(store: Arc<MemoryStore>, game: GameSettings) -> TestApp {
    let config = test_config();
    let token = sign_jwt(SESSION_TOKEN, &config.jwt_secret, config.jwt_expiration).unwrap();
    let state = AppState::new(store.clone(), config, game);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        token,
        client: reqwest::Client::new(),
    }
}

/// Spawns the app over a store seeded with 20 questions and the default game settings.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    seed(&store, 20).await;
    spawn_app_with(store, GameSettings::default()).await
}

pub fn rtl_topic(id: i64) -> Topic {
    Topic {
        id,
        name: "Forced".to_string(),
        force_direction: Some(Direction::Rtl),
    }
}
