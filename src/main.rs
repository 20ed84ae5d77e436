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
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use glyph_chess::{
    BoardState, Config, DropTarget, GameClient, HttpTransport, IntelligenceLevel, Notice,
    Projection, Renderer, Session, Square,
};

/// Play against a remote engine from the terminal.
///
/// You play white. Moves are typed as `x1 y1 x2 y2`, with (0, 0) the top
/// left square.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Engine service root; overrides AI_SERVER_HOST
    #[arg(long)]
    host: Option<String>,
    /// Engine strength, 0 to 4; overrides AI_INTELLIGENCE_LEVEL
    #[arg(long)]
    intelligence: Option<u8>,
    /// Do not ask the engine to answer each move
    #[arg(long)]
    no_reply: bool,
}

struct Terminal {
    projection: Projection,
}

impl Renderer for Terminal {
    fn draw(&mut self, board: &BoardState) {
        self.projection.draw(board);
        println!("{}", self.projection);
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Rejected(rejection) => println!("{rejection}"),
            Notice::Failed(message) => println!("Error: {message}"),
            Notice::Thinking(true) => println!("Thinking..."),
            Notice::Thinking(false) => {}
            Notice::Score(value) => println!("Minimax value: {value:.2} (positive favours black)"),
        }
    }
}

fn parse_move(line: &str) -> Option<(Square, Square)> {
    let coords: Vec<i64> = line
        .split_whitespace()
        .map(|part| part.parse().ok())
        .collect::<Option<_>>()?;
    match coords[..] {
        [x1, y1, x2, y2] => Some((
            Square::try_from_coords(x1, y1).ok()?,
            Square::try_from_coords(x2, y2).ok()?,
        )),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env(args.host.as_deref())?;
    if let Some(level) = args.intelligence {
        config.intelligence = IntelligenceLevel::try_new(level)?;
    }

    let transport = HttpTransport::new(config.host.clone(), config.timeout)?;
    let terminal = Terminal {
        projection: Projection::new(),
    };
    let mut session = Session::new(GameClient::new(transport), terminal);
    if !args.no_reply {
        session = session.with_engine_reply(config.intelligence);
    }
    session.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "quit" {
            break;
        }
        let Some((from, to)) = parse_move(line) else {
            println!("Expecting x1 y1 x2 y2, or quit");
            continue;
        };
        if let Err(e) = session.refresh_legal_actions().await {
            warn!(error = %e, "playing without a legal move list");
        }
        let Ok(payload) = session.begin_drag(from) else {
            continue;
        };
        let target = DropTarget::from_id(&to.to_string());
        if let Err(e) = session.drop_on(Some(payload), target).await {
            warn!(error = %e, "move failed");
        }
    }
    Ok(())
}
