use crate::models::Socket;

/// One guessing session between the players of a resolved match
pub struct GameState {
    pub id: u32,
    pub answer: i64,
    pub players: Vec<Socket>,
}

impl GameState {
    pub fn has_player(&self, socket: &Socket) -> bool {
        self.players.contains(socket)
    }

    /// Every player except `socket`
    pub fn opponents<'a>(&'a self, socket: &'a Socket) -> impl Iterator<Item = &'a Socket> + 'a {
        self.players.iter().filter(move |player| *player != socket)
    }
}
