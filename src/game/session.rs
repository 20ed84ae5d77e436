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

use anyhow::Result;
use tracing::{error, info, warn};

use super::client::{Busy, GameClient};
use super::config::IntelligenceLevel;
use super::gesture::{ActionBuilder, DragPayload, DropOutcome, DropTarget, Rejection};
use super::transport::Transport;
use crate::{Action, ActionError, BoardState, LegalActions, Square};

/// Something for the user to see besides the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Rejected(Rejection),
    Failed(&'static str),
    Thinking(bool),
    Score(f64),
}

pub const MOVE_FAILED: &str = "move could not be processed";
pub const ENGINE_UNREACHABLE: &str = "could not reach the engine";

/// Where the session shows things. `draw` must finish drawing before it
/// returns.
pub trait Renderer {
    fn draw(&mut self, board: &BoardState);
    fn notify(&mut self, notice: Notice);
}

/// One game against the engine.
///
/// The session owns the current board. It is replaced only by a board the
/// engine sent back, and a failed exchange leaves it as it was.
pub struct Session<T, R> {
    client: GameClient<T>,
    renderer: R,
    builder: ActionBuilder,
    board: Option<BoardState>,
    legal: Option<LegalActions>,
    reply: Option<IntelligenceLevel>,
    score: Option<f64>,
}

impl<T: Transport, R: Renderer> Session<T, R> {
    pub fn new(client: GameClient<T>, renderer: R) -> Self {
        Self {
            client,
            renderer,
            builder: ActionBuilder::new(),
            board: None,
            legal: None,
            reply: None,
            score: None,
        }
    }

    /// After each accepted move, ask the engine for its move at `level`.
    pub fn with_engine_reply(mut self, level: IntelligenceLevel) -> Self {
        self.reply = Some(level);
        self
    }

    pub fn board(&self) -> Option<&BoardState> {
        self.board.as_ref()
    }

    pub fn legal_actions(&self) -> Option<&LegalActions> {
        self.legal.as_ref()
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn client(&self) -> &GameClient<T> {
        &self.client
    }

    pub fn is_busy(&self) -> bool {
        self.client.is_busy()
    }

    pub async fn start(&mut self) -> Result<()> {
        match self.client.fetch_initial_position().await {
            Ok(board) => {
                self.show(board);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "no initial position");
                self.renderer.notify(Notice::Failed(ENGINE_UNREACHABLE));
                Err(e)
            }
        }
    }

    /// Fetches the legal actions for the board on screen. On failure the
    /// drop check is skipped until the next successful fetch.
    pub async fn refresh_legal_actions(&mut self) -> Result<()> {
        let Some(board) = self.board else {
            return Ok(());
        };
        self.legal = None;
        let legal = self.client.fetch_legal_actions(&board).await?;
        self.legal = Some(legal);
        Ok(())
    }

    pub fn begin_drag(&mut self, from: Square) -> Result<DragPayload, Rejection> {
        let result = match self.board {
            Some(board) => self.builder.begin_drag(&board, from, self.client.is_busy()),
            None => Err(Rejection::NoBoard),
        };
        if let Err(rejection) = result {
            self.renderer.notify(Notice::Rejected(rejection));
        }
        result
    }

    /// Completes a gesture. Local rejections are returned as
    /// `DropOutcome::Rejected` and never reach the engine; an `Err` means
    /// the engine exchange failed and the board was kept.
    pub async fn drop_on(
        &mut self,
        payload: Option<DragPayload>,
        target: DropTarget,
    ) -> Result<DropOutcome> {
        let outcome = self.builder.drop(payload, target, self.legal.as_ref());
        match outcome {
            DropOutcome::Rejected(rejection) => {
                self.renderer.notify(Notice::Rejected(rejection));
                Ok(outcome)
            }
            DropOutcome::Accepted(action) => match self.submit(action).await? {
                Some(rejection) => Ok(DropOutcome::Rejected(rejection)),
                None => Ok(outcome),
            },
        }
    }

    async fn submit(&mut self, action: Action) -> Result<Option<Rejection>> {
        let Some(board) = self.board else {
            self.renderer.notify(Notice::Rejected(Rejection::NoBoard));
            return Ok(Some(Rejection::NoBoard));
        };
        match self.client.submit_action(&board, &action).await {
            Ok(next) => {
                info!(%action, "move accepted");
                self.show(next);
            }
            Err(e) => {
                if let Some(rejection) = local_rejection(&e) {
                    warn!(%rejection, "move not sent");
                    self.renderer.notify(Notice::Rejected(rejection));
                    return Ok(Some(rejection));
                }
                error!(error = %e, "move failed");
                self.renderer.notify(Notice::Failed(MOVE_FAILED));
                return Err(e);
            }
        }
        if let Some(level) = self.reply {
            self.engine_reply(level).await?;
        }
        Ok(None)
    }

    async fn engine_reply(&mut self, level: IntelligenceLevel) -> Result<()> {
        let Some(board) = self.board else {
            return Ok(());
        };
        self.renderer.notify(Notice::Thinking(true));
        let result = self.client.request_decision(&board, level).await;
        self.renderer.notify(Notice::Thinking(false));
        match result {
            Ok(decision) => {
                self.score = Some(decision.minimax_value);
                self.show(decision.board);
                self.renderer.notify(Notice::Score(decision.minimax_value));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "engine did not reply");
                self.renderer.notify(Notice::Failed(ENGINE_UNREACHABLE));
                Err(e)
            }
        }
    }

    fn show(&mut self, board: BoardState) {
        self.legal = None;
        self.board = Some(board);
        self.renderer.draw(&board);
    }
}

fn local_rejection(e: &anyhow::Error) -> Option<Rejection> {
    if e.downcast_ref::<Busy>().is_some() {
        return Some(Rejection::Busy);
    }
    match e.downcast_ref::<ActionError>()? {
        ActionError::MissingOrigin(square) => Some(Rejection::EmptySquare(*square)),
        ActionError::OriginMismatch { .. } => Some(Rejection::MalformedGesture),
    }
}
