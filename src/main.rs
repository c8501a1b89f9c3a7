//! Terminal game runner (default binary).
//!
//! Single player by default. With `--multi [HOST:PORT]` it connects to the
//! relay, waits for an opponent and mirrors both boards side by side.
//!
//! Flags: `--multi [ADDR]`, `--seed N`.

use std::net::SocketAddr;
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use tetris_duel::core::{seed_from_time, EngineConfig, GameState};
use tetris_duel::input::{handle_key_event, is_soft_drop_key, should_quit, SoftDropLatch};
use tetris_duel::relay::{RelayClient, ServerConfig, ServerMessage};
use tetris_duel::term::{DuelView, FrameBuffer, GameView, OpponentBoard, TerminalRenderer, Viewport};
use tetris_duel::types::{GameAction, TICK_MS};

#[derive(Debug, Default)]
struct Args {
    /// `Some` in multiplayer mode.
    relay: Option<SocketAddr>,
    seed: Option<u32>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Args::default();
        let mut it = std::env::args().skip(1).peekable();

        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--multi" => {
                    let addr = match it.next_if(|next| !next.starts_with("--")) {
                        Some(addr) => addr
                            .parse()
                            .with_context(|| format!("invalid relay address {}", addr))?,
                        None => ServerConfig::from_env().socket_addr()?,
                    };
                    args.relay = Some(addr);
                }
                "--seed" => {
                    let value = it.next().context("--seed needs a value")?;
                    args.seed = Some(value.parse().context("--seed must be a u32")?);
                }
                other => bail!("unknown argument {}", other),
            }
        }

        Ok(args)
    }
}

/// Live relay connection. Owns the runtime its tasks run on.
struct Duel {
    client: RelayClient,
    events: std_mpsc::Receiver<ServerMessage>,
    view: DuelView,
    won_sent: bool,
    _runtime: tokio::runtime::Runtime,
}

impl Duel {
    fn connect(addr: SocketAddr) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (client, mut events) = runtime.block_on(RelayClient::connect(addr))?;

        // The game loop is synchronous; forward server messages over a std channel.
        let (tx, rx) = std_mpsc::channel();
        runtime.spawn(async move {
            while let Ok(Some(msg)) = events.next_event().await {
                if tx.send(msg).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            client,
            events: rx,
            view: DuelView {
                waiting: true,
                opponent: None,
            },
            won_sent: false,
            _runtime: runtime,
        })
    }

    /// Apply pending server messages. Returns true if the local game changed.
    fn poll(&mut self, game: &mut GameState) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.events.try_recv() {
            match msg {
                ServerMessage::Waiting => self.view.waiting = true,
                ServerMessage::Start { .. } => {
                    self.view.waiting = false;
                    self.view.opponent = None;
                    self.won_sent = false;
                    game.start();
                    changed = true;
                }
                ServerMessage::OpponentState(state) => {
                    self.view.opponent = Some(OpponentBoard {
                        stage: state.stage.to_stage(),
                        score: state.score,
                        rows: state.rows,
                        game_over: state.game_over,
                    });
                }
                ServerMessage::GameOverWin => {
                    self.won_sent = true;
                    game.finish(true);
                    changed = true;
                }
                ServerMessage::GameOverLose => {
                    game.finish(false);
                    changed = true;
                }
                ServerMessage::Error { .. } => {}
            }
        }
        changed
    }

    /// Publish the local board, and claim the win once.
    fn publish(&mut self, game: &GameState) -> Result<()> {
        self.client.send_state(&game.snapshot())?;
        if game.won() && !self.won_sent {
            self.client.send_won()?;
            self.won_sent = true;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse()?;
    let seed = args.seed.unwrap_or_else(seed_from_time);
    let mut game = GameState::new(EngineConfig::with_seed(seed));

    // Connect before entering raw mode so failures print normally.
    let mut duel = match args.relay {
        Some(addr) => Some(Duel::connect(addr)?),
        None => {
            game.start();
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut game, duel.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, game: &mut GameState, mut duel: Option<&mut Duel>) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut soft_drop = SoftDropLatch::new();

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        let mut changed = match duel.as_deref_mut() {
            Some(duel) => duel.poll(game),
            None => false,
        };

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let duel_view = duel.as_deref().map(|d| &d.view);
        view.render_into(&mut fb, &game.snapshot(), duel_view, Viewport::new(w, h));
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if should_quit(key) {
                            return Ok(());
                        }

                        if is_soft_drop_key(key.code) {
                            if soft_drop.press() {
                                game.set_soft_drop(true);
                                changed = true;
                            }
                        } else if let Some(action) = handle_key_event(key) {
                            // A match result is final; restarts only come from the relay.
                            let allowed = !(duel.is_some() && action == GameAction::Restart);
                            if allowed && game.apply_action(action) {
                                changed = true;
                            }
                        }
                    }
                    KeyEventKind::Release => {
                        if is_soft_drop_key(key.code) && soft_drop.release() {
                            game.set_soft_drop(false);
                            changed = true;
                        }
                    }
                },
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            if !term.reports_key_release() && soft_drop.update(TICK_MS) {
                game.set_soft_drop(false);
            }

            if game.tick(TICK_MS) {
                changed = true;
            }
        }

        if changed {
            if let Some(duel) = duel.as_deref_mut() {
                duel.publish(game)?;
            }
        }
    }
}
