use actix::dev::ToEnvelope;
use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::SocketError;
use crate::models::{AppState, CloseConnection, Connection, Event, Message, OutboundText, Socket};

/// One client connection. Owns the read loop and is the only writer to its
/// WebSocket.
pub struct PlayerWebSocket {
    pub id: Uuid,
    pub app_state: web::Data<AppState>,
    socket: Option<Socket>,
}

/// [`Connection`] that forwards frames to a connection actor's mailbox.
struct ActorConnection<A: Actor> {
    addr: Addr<A>,
}

impl<A> Connection for ActorConnection<A>
where
    A: Actor + Handler<OutboundText> + Handler<CloseConnection>,
    A::Context: ToEnvelope<A, OutboundText> + ToEnvelope<A, CloseConnection>,
{
    fn send_text(&self, id: Uuid, text: String) -> Result<(), SocketError> {
        if !self.addr.connected() {
            return Err(SocketError::Closed(id));
        }
        // Unbounded: a burst of frames must not be dropped on a full mailbox.
        self.addr.do_send(OutboundText(text));
        Ok(())
    }

    fn close(&self) {
        self.addr.do_send(CloseConnection);
    }
}

impl PlayerWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_state,
            socket: None,
        }
    }

    fn handle_text(&self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(socket) = self.socket.clone() else {
            return;
        };
        match serde_json::from_str::<Message>(text) {
            Ok(message) => {
                debug!("Received {} from {}", message.message_type, self.id);
                self.app_state
                    .dispatcher
                    .dispatch(Event::from_message(message, socket));
            }
            Err(e) => {
                warn!("Error parsing message from {}: {}", self.id, e);
                reply(ctx, &Message::error(format!("Invalid message format: {}", e)));
            }
        }
    }
}

/// Writes straight to this connection, bypassing the mailbox.
fn reply(ctx: &mut ws::WebsocketContext<PlayerWebSocket>, message: &Message) {
    match serde_json::to_string(message) {
        Ok(text) => ctx.text(text),
        Err(e) => warn!("Failed to serialize {}: {}", message.message_type, e),
    }
}

impl Actor for PlayerWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let socket = Socket::with_id(
            self.id,
            ActorConnection {
                addr: ctx.address(),
            },
        );
        let total_sessions = self.app_state.register(socket.clone());
        self.socket = Some(socket);

        info!("WebSocket connection started: {}", self.id);
        info!("Total active sessions: {}", total_sessions);
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        if let Some(socket) = self.socket.take() {
            self.app_state.dispatcher.disconnect(&socket);
        }
        let total_sessions = self.app_state.unregister(&self.id);
        info!("WebSocket connection closed: {}", self.id);
        info!("Total active sessions: {}", total_sessions);
    }
}

impl Handler<OutboundText> for PlayerWebSocket {
    type Result = ();

    fn handle(&mut self, msg: OutboundText, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl Handler<CloseConnection> for PlayerWebSocket {
    type Result = ();

    fn handle(&mut self, _: CloseConnection, ctx: &mut Self::Context) {
        ctx.close(None);
        ctx.stop();
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                reply(ctx, &Message::error("Binary messages are not supported".to_string()));
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("Protocol error on {}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let ws = PlayerWebSocket::new(app_state);
    info!("New WebSocket connection request: {}", ws.id);
    ws::start(ws, &req, stream)
}
