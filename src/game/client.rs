// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::config::IntelligenceLevel;
use super::transport::{Reply, Transport};
use crate::{text, Action, BoardState, LegalActions, WireAction};

const INITIAL_BOARD: &str = "api/initial-board";
const ACTIONS: &str = "api/actions";
const RESULT: &str = "api/result";
const DECISION: &str = "api/decision";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Could not reach the engine: {0}")]
    Unreachable(String),
    #[error("Engine answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Engine reply to {0} could not be read")]
    Malformed(&'static str),
}

/// A submission was refused because another is still outstanding.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("A request to the engine is already outstanding")]
pub struct Busy;

/// Single-slot in-flight state. At most one guard exists at a time.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn acquire(&self) -> Result<InFlightGuard<'_>, Busy> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.0))
            .map_err(|_| Busy)
    }
}

#[derive(Debug)]
pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The engine's own move, as returned by `api/decision`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub board: BoardState,
    /// Positive favours black.
    pub minimax_value: f64,
    pub nodes_expanded: u64,
    pub time_taken: Option<Duration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDecision {
    result_board: String,
    #[serde(default)]
    minimax_value: f64,
    #[serde(default)]
    num_nodes_expanded: u64,
    #[serde(default)]
    time_taken: Option<serde_json::Value>,
}

/// Talks to the engine service. Every operation is one attempt; failures
/// are returned, never retried.
pub struct GameClient<T> {
    transport: T,
    in_flight: InFlight,
}

impl<T: Transport> GameClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            in_flight: InFlight::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// True while a submission or decision request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    #[instrument(skip(self))]
    pub async fn fetch_initial_position(&self) -> Result<BoardState> {
        let reply = self.exchange(INITIAL_BOARD, self.transport.get(INITIAL_BOARD, &[])).await?;
        let board = text::decode(&reply.body).context(ServiceError::Malformed(INITIAL_BOARD))?;
        info!(pieces = board.pieces().count(), "initial position");
        Ok(board)
    }

    /// The engine's legal actions for `board`. Not cached: the list is only
    /// good for the board it was asked about.
    #[instrument(skip_all)]
    pub async fn fetch_legal_actions(&self, board: &BoardState) -> Result<LegalActions> {
        let encoded = text::encode(board);
        let query = [("board", encoded.as_str())];
        let reply = self.exchange(ACTIONS, self.transport.get(ACTIONS, &query)).await?;
        let wire: Vec<WireAction> =
            serde_json::from_str(&reply.body).context(ServiceError::Malformed(ACTIONS))?;
        let legal = LegalActions::from_wire(wire).context(ServiceError::Malformed(ACTIONS))?;
        info!(actions = legal.len(), "legal actions");
        Ok(legal)
    }

    /// Sends `action` played on `board` and returns the board the engine
    /// answers with.
    ///
    /// # Errors
    ///
    /// Before anything is sent: an `ActionError` when `board` does not hold
    /// the moving piece on its origin, `Busy` while another submission is
    /// outstanding. Afterwards: a `ServiceError`.
    #[instrument(skip_all, fields(action = %action))]
    pub async fn submit_action(&self, board: &BoardState, action: &Action) -> Result<BoardState> {
        action.check(board)?;
        let _guard = self.in_flight.acquire()?;
        let body = serde_json::json!({
            "board": text::encode(board),
            "action": WireAction::from(action),
        });
        let reply = self.exchange(RESULT, self.transport.post_json(RESULT, &body)).await?;
        let next = text::decode(&reply.body).context(ServiceError::Malformed(RESULT))?;
        info!("action applied");
        Ok(next)
    }

    /// Asks the engine to move on `board`. Shares the in-flight slot with
    /// `submit_action`.
    #[instrument(skip(self, board))]
    pub async fn request_decision(
        &self,
        board: &BoardState,
        intelligence: IntelligenceLevel,
    ) -> Result<Decision> {
        let _guard = self.in_flight.acquire()?;
        let encoded = text::encode(board);
        let level = intelligence.to_string();
        let query = [("intelligenceLevel", level.as_str()), ("board", encoded.as_str())];
        let reply = self.exchange(DECISION, self.transport.get(DECISION, &query)).await?;
        let wire: WireDecision =
            serde_json::from_str(&reply.body).context(ServiceError::Malformed(DECISION))?;
        let board = text::decode(&wire.result_board).context(ServiceError::Malformed(DECISION))?;
        let decision = Decision {
            board,
            minimax_value: wire.minimax_value,
            nodes_expanded: wire.num_nodes_expanded,
            time_taken: wire
                .time_taken
                .and_then(|value| value.as_f64())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        };
        info!(
            minimax = decision.minimax_value,
            nodes = decision.nodes_expanded,
            "engine decided"
        );
        Ok(decision)
    }

    async fn exchange<F>(&self, path: &'static str, request: F) -> Result<Reply>
    where
        F: std::future::Future<Output = Result<Reply>>,
    {
        let reply = match request.await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(path, error = %e, "engine unreachable");
                return Err(e.context(ServiceError::Unreachable(path.to_string())));
            }
        };
        if !reply.is_success() {
            warn!(path, status = reply.status, "engine refused");
            return Err(ServiceError::Status {
                status: reply.status,
                body: reply.body,
            }
            .into());
        }
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{ActionError, FormatError, Material, Square};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;
    use Square::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Request {
        Get(String, Vec<(String, String)>),
        Post(String, serde_json::Value),
    }

    /// Answers from a queue and records what it was asked.
    #[derive(Default)]
    pub(crate) struct Scripted {
        replies: Mutex<VecDeque<Result<Reply>>>,
        requests: Mutex<Vec<Request>>,
        hold: Option<Arc<Notify>>,
    }

    impl Scripted {
        pub(crate) fn new<I: IntoIterator<Item = Result<Reply>>>(replies: I) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                ..Default::default()
            }
        }
        pub(crate) fn held(mut self, hold: Arc<Notify>) -> Self {
            self.hold = Some(hold);
            self
        }
        pub(crate) fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
        async fn answer(&self, request: Request) -> Result<Reply> {
            self.requests.lock().unwrap().push(request);
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("connection refused")))
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Reply> {
            let query = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.answer(Request::Get(path.to_string(), query)).await
        }
        async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<Reply> {
            self.answer(Request::Post(path.to_string(), body.clone())).await
        }
    }

    pub(crate) fn standard_text() -> String {
        text::encode(&BoardState::standard())
    }

    fn after_e4() -> BoardState {
        let mut board = BoardState::standard();
        board.remove(E2);
        board.place(E4, Material::WP);
        board
    }

    #[tokio::test]
    async fn test_initial_position() {
        let client = GameClient::new(Scripted::new([Ok(Reply::ok(standard_text()))]));
        let board = client.fetch_initial_position().await.unwrap();
        assert_eq!(board, BoardState::standard());
        for (square, _) in board.pieces() {
            assert!([0, 1, 6, 7].contains(&square.y()));
        }
        assert_eq!(
            client.transport().requests(),
            vec![Request::Get(INITIAL_BOARD.to_string(), vec![])]
        );
    }
    #[tokio::test]
    async fn test_initial_position_bad_status() {
        let reply = Reply {
            status: 503,
            body: "down".to_string(),
        };
        let client = GameClient::new(Scripted::new([Ok(reply)]));
        let err = client.fetch_initial_position().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ServiceError>(),
            Some(&ServiceError::Status {
                status: 503,
                body: "down".to_string()
            })
        );
    }
    #[tokio::test]
    async fn test_initial_position_garbled() {
        let client = GameClient::new(Scripted::new([Ok(Reply::ok("♜♞♝\n"))]));
        let err = client.fetch_initial_position().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ServiceError>(),
            Some(&ServiceError::Malformed(INITIAL_BOARD))
        );
        assert!(err.downcast_ref::<FormatError>().is_some());
    }
    #[tokio::test]
    async fn test_unreachable() {
        let client = GameClient::new(Scripted::new([]));
        let err = client.fetch_initial_position().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Unreachable(_))
        ));
    }
    #[tokio::test]
    async fn test_legal_actions() {
        let json = r#"[
            {"piece": {"icon": "♙", "x": 4, "y": 6}, "x": 4, "y": 5},
            {"piece": {"icon": "♙", "x": 4, "y": 6}, "x": 4, "y": 4}
        ]"#;
        let client = GameClient::new(Scripted::new([Ok(Reply::ok(json))]));
        let legal = client.fetch_legal_actions(&BoardState::standard()).await.unwrap();
        assert!(legal.allows(E2, E3));
        assert!(legal.allows(E2, E4));
        assert_eq!(legal.len(), 2);
        assert_eq!(
            client.transport().requests(),
            vec![Request::Get(
                ACTIONS.to_string(),
                vec![("board".to_string(), standard_text())]
            )]
        );
    }
    #[tokio::test]
    async fn test_legal_actions_malformed() {
        let client = GameClient::new(Scripted::new([
            Ok(Reply::ok("{\"not\": \"a list\"}")),
            Ok(Reply::ok(r#"[{"piece": {"icon": "♙", "x": 4, "y": 6}, "x": 4, "y": 8}]"#)),
        ]));
        let board = BoardState::standard();
        for _ in 0..2 {
            let err = client.fetch_legal_actions(&board).await.unwrap_err();
            assert_eq!(err.downcast_ref::<ServiceError>(), Some(&ServiceError::Malformed(ACTIONS)));
        }
    }
    #[tokio::test]
    async fn test_submit_action() {
        let next = text::encode(&after_e4());
        let client = GameClient::new(Scripted::new([Ok(Reply::ok(next))]));
        let board = BoardState::standard();
        let action = Action::on(&board, E2, E4).unwrap();
        let result = client.submit_action(&board, &action).await.unwrap();
        assert_eq!(result, after_e4());
        assert!(!client.is_busy());
        let expected = serde_json::json!({
            "board": standard_text(),
            "action": {"piece": {"icon": "♙", "x": 4, "y": 6}, "x": 4, "y": 4},
        });
        assert_eq!(
            client.transport().requests(),
            vec![Request::Post(RESULT.to_string(), expected)]
        );
    }
    #[tokio::test]
    async fn test_submit_without_origin_piece_sends_nothing() {
        let client = GameClient::new(Scripted::new([]));
        let action = Action::new(Material::WP, E4, E5);
        let err = client
            .submit_action(&BoardState::standard(), &action)
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ActionError>(), Some(&ActionError::MissingOrigin(E4)));
        assert!(client.transport().requests().is_empty());
    }
    #[tokio::test]
    async fn test_failed_submit_releases_slot() {
        let client = GameClient::new(Scripted::new([Ok(Reply {
            status: 404,
            body: "A piece at (4, 6) not found".to_string(),
        })]));
        let board = BoardState::standard();
        let action = Action::on(&board, E2, E4).unwrap();
        assert!(client.submit_action(&board, &action).await.is_err());
        assert!(!client.is_busy());
    }
    #[tokio::test]
    async fn test_second_submit_refused_while_outstanding() {
        let hold = Arc::new(Notify::new());
        let next = text::encode(&after_e4());
        let transport = Scripted::new([Ok(Reply::ok(next))]).held(hold.clone());
        let client = GameClient::new(transport);
        let board = BoardState::standard();
        let action = Action::on(&board, E2, E4).unwrap();

        let first = client.submit_action(&board, &action);
        let second = async {
            assert!(client.is_busy());
            let result = client.submit_action(&board, &action).await;
            hold.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), after_e4());
        assert_eq!(second.unwrap_err().downcast_ref::<Busy>(), Some(&Busy));
        assert_eq!(client.transport().requests().len(), 1);
        assert!(!client.is_busy());
    }
    #[tokio::test]
    async fn test_decision() {
        let reply = serde_json::json!({
            "resultBoard": text::encode(&after_e4()),
            "minimaxValue": -0.5,
            "numNodesExpanded": 1234,
            "timeTaken": 1.5,
            "actionTaken": {"piece": "♟"},
        });
        let client = GameClient::new(Scripted::new([Ok(Reply::ok(reply.to_string()))]));
        let level = IntelligenceLevel::try_new(3).unwrap();
        let decision = client
            .request_decision(&BoardState::standard(), level)
            .await
            .unwrap();
        assert_eq!(decision.board, after_e4());
        assert_eq!(decision.minimax_value, -0.5);
        assert_eq!(decision.nodes_expanded, 1234);
        assert_eq!(decision.time_taken, Some(Duration::from_millis(1500)));
        assert_eq!(
            client.transport().requests(),
            vec![Request::Get(
                DECISION.to_string(),
                vec![
                    ("intelligenceLevel".to_string(), "3".to_string()),
                    ("board".to_string(), standard_text()),
                ]
            )]
        );
    }
    #[tokio::test]
    async fn test_decision_tolerates_missing_stats() {
        let reply = serde_json::json!({
            "resultBoard": standard_text(),
            "timeTaken": "PT1.5S",
        });
        let client = GameClient::new(Scripted::new([Ok(Reply::ok(reply.to_string()))]));
        let decision = client
            .request_decision(&BoardState::standard(), IntelligenceLevel::default())
            .await
            .unwrap();
        assert_eq!(decision.minimax_value, 0.0);
        assert_eq!(decision.time_taken, None);
    }
}
