use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::{Mutex, MutexGuard};

use crate::game::utils::{evaluate, parse_guess};
use crate::models::{broadcast, types, Event, GameState, Message, Socket};
use crate::server::{Dispatcher, EventHandler};

/// Game ids are drawn from `0..GAME_ID_SPACE`.
const GAME_ID_SPACE: u32 = 1_000_000;

const WIN_MESSAGE: &str = "Correct! You won!";
const FORFEIT_MESSAGE: &str = "You won. The other player disconnected.";

/// Owns every running guessing game.
pub struct GameManager {
    games: Mutex<HashMap<u32, GameState>>,
    answers: RangeInclusive<i64>,
}

/// What a guess did to its game, decided under the registry lock and acted
/// on after it is released.
enum Resolution {
    Won { answer: i64, opponents: Vec<Socket> },
    Hint(&'static str),
}

impl GameManager {
    pub fn new(answers: RangeInclusive<i64>) -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            answers,
        }
    }

    #[cfg(test)]
    pub(crate) fn active_games(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self, game_id: u32) -> bool {
        self.lock().contains_key(&game_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, GameState>> {
        self.games.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn start(&self, players: &[Socket]) {
        if players.is_empty() {
            return;
        }
        if self.answers.is_empty() {
            warn!("No game started: answer range {:?} is empty", self.answers);
            return;
        }
        let mut rng = rand::thread_rng();
        let answer = rng.gen_range(self.answers.clone());
        let id = {
            let mut games = self.lock();
            let id = loop {
                let candidate = rng.gen_range(0..GAME_ID_SPACE);
                if !games.contains_key(&candidate) {
                    break candidate;
                }
            };
            games.insert(
                id,
                GameState {
                    id,
                    answer,
                    players: players.to_vec(),
                },
            );
            id
        };

        info!("Game {} started with {} players", id, players.len());
        debug!("Game {} answer is {}", id, answer);
        broadcast(players, &Message::guess_prompt(id));
    }

    fn guess(&self, event: &Event, socket: &Socket) {
        let Some(id) = event.id("gameId").and_then(|id| u32::try_from(id).ok()) else {
            return;
        };
        let guess = parse_guess(event.json("guess"));

        let resolution = {
            let mut games = self.lock();
            let Some(game) = games.get(&id) else {
                return;
            };
            if !game.has_player(socket) {
                return;
            }
            match evaluate(guess, game.answer).feedback() {
                Some(hint) => Resolution::Hint(hint),
                None => {
                    let opponents = game.opponents(socket).cloned().collect();
                    let answer = game.answer;
                    games.remove(&id);
                    Resolution::Won { answer, opponents }
                }
            }
        };

        match resolution {
            Resolution::Hint(hint) => socket.notify(&Message::feedback(hint)),
            Resolution::Won { answer, opponents } => {
                info!("Player {} won game {}", socket.id(), id);
                socket.notify(&Message::victory(WIN_MESSAGE));
                broadcast(
                    &opponents,
                    &Message::loss(format!("You lost. The number was {}", answer)),
                );
            }
        }
    }

    fn drop_player(&self, socket: &Socket) {
        let forfeited: Vec<GameState> = {
            let mut games = self.lock();
            let ids: Vec<u32> = games
                .values()
                .filter(|g| g.has_player(socket))
                .map(|g| g.id)
                .collect();
            ids.iter().filter_map(|id| games.remove(id)).collect()
        };

        for game in forfeited {
            info!("Game {} forfeited by {}", game.id, socket.id());
            let winners: Vec<Socket> = game.opponents(socket).cloned().collect();
            broadcast(&winners, &Message::victory(FORFEIT_MESSAGE));
        }
    }
}

impl EventHandler for GameManager {
    fn process(&self, event: &Event, _dispatcher: &Dispatcher) {
        match event.event_type.as_str() {
            types::GAME_START => self.start(event.players()),
            types::GUESS => {
                if let Some(socket) = event.origin.as_ref() {
                    self.guess(event, socket);
                }
            }
            types::DISCONNECTED => {
                if let Some(socket) = event.origin.as_ref() {
                    self.drop_player(socket);
                }
            }
            _ => {}
        }
    }
}
