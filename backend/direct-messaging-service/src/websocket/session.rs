use std::time::Instant;

use actix::{
    Actor, ActorContext, ActorFutureExt, AsyncContext, Running, StreamHandler, WrapFuture,
};
use actix_web_actors::ws;
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use super::{DeliveryChannel, RealtimeRouter, RoutedEvent, WsInboundEvent, WsOutboundEvent};
use crate::config::WebSocketConfig;

pub mod codes {
    pub const MALFORMED_FRAME: &str = "MALFORMED_FRAME";
    pub const NOT_JOINED: &str = "NOT_JOINED";
    pub const FORBIDDEN_ROOM: &str = "FORBIDDEN_ROOM";
    pub const SENDER_MISMATCH: &str = "SENDER_MISMATCH";
    pub const INVALID_ENVELOPE: &str = "INVALID_ENVELOPE";
    pub const UNSUPPORTED_FRAME: &str = "UNSUPPORTED_FRAME";
}

/// Connection state: `Connected -> Joined -> (closed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connected,
    Joined(Uuid),
}

/// What a validated inbound frame asks the router to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join(Uuid),
    Route(RoutedEvent),
}

/// Parse and authorize one text frame for a connection owned by `caller_id`.
///
/// Rejections carry the error frame to send back; the connection stays open.
pub fn interpret_frame(
    text: &str,
    caller_id: Uuid,
    state: ChannelState,
    max_ciphertext_bytes: usize,
) -> Result<Command, WsOutboundEvent> {
    let event: WsInboundEvent = serde_json::from_str(text)
        .map_err(|e| WsOutboundEvent::error(codes::MALFORMED_FRAME, e.to_string()))?;

    let routed = match event {
        WsInboundEvent::Join { user_id } => {
            if user_id != caller_id {
                return Err(WsOutboundEvent::error(
                    codes::FORBIDDEN_ROOM,
                    "a connection may only join its own room",
                ));
            }
            return Ok(Command::Join(user_id));
        }
        other => match other.into_routed() {
            Some(routed) => routed,
            None => {
                return Err(WsOutboundEvent::error(
                    codes::UNSUPPORTED_FRAME,
                    "frame cannot be routed",
                ))
            }
        },
    };

    if state == ChannelState::Connected {
        return Err(WsOutboundEvent::error(
            codes::NOT_JOINED,
            "join before sending events",
        ));
    }
    if routed.sender_id() != caller_id {
        return Err(WsOutboundEvent::error(
            codes::SENDER_MISMATCH,
            "sender_id must be the connected user",
        ));
    }
    if let RoutedEvent::Message(message) = &routed {
        message
            .fields
            .validate(max_ciphertext_bytes)
            .map_err(|e| WsOutboundEvent::error(codes::INVALID_ENVELOPE, e.to_string()))?;
    }

    Ok(Command::Route(routed))
}

/// Payload routed to this connection by another one
struct Delivery(String);

/// WebSocket actor for one authenticated connection
pub struct WsSession {
    caller_id: Uuid,
    state: ChannelState,
    channel: DeliveryChannel,
    deliveries: Option<UnboundedReceiver<String>>,
    router: RealtimeRouter,
    config: WebSocketConfig,
    max_ciphertext_bytes: usize,
    hb: Instant,
}

impl WsSession {
    pub fn new(
        caller_id: Uuid,
        router: RealtimeRouter,
        config: WebSocketConfig,
        max_ciphertext_bytes: usize,
    ) -> Self {
        let (channel, deliveries) = DeliveryChannel::open();
        Self {
            caller_id,
            state: ChannelState::Connected,
            channel,
            deliveries: Some(deliveries),
            router,
            config,
            max_ciphertext_bytes,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.config.client_timeout;
        ctx.run_interval(self.config.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.hb) > timeout {
                tracing::warn!(caller_id = %act.caller_id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send_event(ctx: &mut ws::WebsocketContext<Self>, event: &WsOutboundEvent) {
        match serde_json::to_string(event) {
            Ok(text) => ctx.text(text),
            Err(e) => tracing::error!(error = %e, "Failed to encode outbound frame"),
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let command =
            match interpret_frame(text, self.caller_id, self.state, self.max_ciphertext_bytes) {
                Ok(command) => command,
                Err(rejection) => {
                    tracing::debug!(caller_id = %self.caller_id, ?rejection, "Rejected frame");
                    Self::send_event(ctx, &rejection);
                    return;
                }
            };

        let router = self.router.clone();
        match command {
            Command::Join(user_id) => {
                let channel = self.channel.clone();
                // wait() holds back later frames until this one is done
                ctx.wait(
                    async move { router.join(&channel, user_id).await }
                        .into_actor(self)
                        .map(move |_, act, ctx| {
                            act.state = ChannelState::Joined(user_id);
                            Self::send_event(ctx, &WsOutboundEvent::Joined { user_id });
                        }),
                );
            }
            Command::Route(event) => {
                let kind = event.kind();
                let recipient_id = event.recipient_id();
                ctx.wait(
                    async move { router.route(&event).await }
                        .into_actor(self)
                        .map(move |delivered, act, _| {
                            tracing::debug!(
                                caller_id = %act.caller_id,
                                %recipient_id,
                                kind,
                                delivered,
                                "Event routed"
                            );
                        }),
                );
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(caller_id = %self.caller_id, channel = ?self.channel.id(), "WebSocket session started");
        self.hb(ctx);
        if let Some(rx) = self.deliveries.take() {
            ctx.add_stream(UnboundedReceiverStream::new(rx).map(Delivery));
        }
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        let router = self.router.clone();
        let channel = self.channel.id();
        actix::spawn(async move {
            router.leave(channel).await;
        });
        Running::Stop
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(caller_id = %self.caller_id, "WebSocket session stopped");
    }
}

impl StreamHandler<Delivery> for WsSession {
    fn handle(&mut self, delivery: Delivery, ctx: &mut Self::Context) {
        ctx.text(delivery.0);
    }

    // The session owns a sender, so this only happens during shutdown
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                Self::send_event(
                    ctx,
                    &WsOutboundEvent::error(codes::UNSUPPORTED_FRAME, "binary frames are not supported"),
                );
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(caller_id = %self.caller_id, ?reason, "WebSocket close received");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::warn!(caller_id = %self.caller_id, error = %e, "WebSocket protocol error");
                ctx.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAX: usize = 1024;

    fn message_frame(sender: Uuid, recipient: Uuid, iv_hex: String) -> String {
        json!({
            "type": "message",
            "sender_id": sender,
            "recipient_id": recipient,
            "ciphertext_hex": "beef",
            "iv_hex": iv_hex,
            "salt_hex": "11".repeat(32),
            "auth_tag_hex": "22".repeat(16),
        })
        .to_string()
    }

    fn error_code(result: Result<Command, WsOutboundEvent>) -> String {
        match result {
            Err(WsOutboundEvent::Error { code, .. }) => code,
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[test]
    fn test_join_own_room() {
        let me = Uuid::new_v4();
        let frame = json!({"type": "join", "user_id": me}).to_string();
        assert_eq!(
            interpret_frame(&frame, me, ChannelState::Connected, MAX),
            Ok(Command::Join(me))
        );
    }

    #[test]
    fn test_join_foreign_room_rejected() {
        let frame = json!({"type": "join", "user_id": Uuid::new_v4()}).to_string();
        let result = interpret_frame(&frame, Uuid::new_v4(), ChannelState::Connected, MAX);
        assert_eq!(error_code(result), codes::FORBIDDEN_ROOM);
    }

    #[test]
    fn test_events_before_join_rejected() {
        let me = Uuid::new_v4();
        let frame = message_frame(me, Uuid::new_v4(), "00".repeat(16));
        let result = interpret_frame(&frame, me, ChannelState::Connected, MAX);
        assert_eq!(error_code(result), codes::NOT_JOINED);
    }

    #[test]
    fn test_spoofed_sender_rejected() {
        let me = Uuid::new_v4();
        let frame = message_frame(Uuid::new_v4(), me, "00".repeat(16));
        let result = interpret_frame(&frame, me, ChannelState::Joined(me), MAX);
        assert_eq!(error_code(result), codes::SENDER_MISMATCH);
    }

    #[test]
    fn test_bad_envelope_rejected() {
        let me = Uuid::new_v4();
        let frame = message_frame(me, Uuid::new_v4(), "00".repeat(8));
        let result = interpret_frame(&frame, me, ChannelState::Joined(me), MAX);
        assert_eq!(error_code(result), codes::INVALID_ENVELOPE);
    }

    #[test]
    fn test_garbage_rejected() {
        let me = Uuid::new_v4();
        let result = interpret_frame("{not json", me, ChannelState::Joined(me), MAX);
        assert_eq!(error_code(result), codes::MALFORMED_FRAME);
    }

    #[test]
    fn test_joined_events_are_routed() {
        let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());

        let frame = message_frame(me, peer, "00".repeat(16));
        match interpret_frame(&frame, me, ChannelState::Joined(me), MAX) {
            Ok(Command::Route(event)) => assert_eq!(event.recipient_id(), peer),
            other => panic!("expected route, got {other:?}"),
        }

        let typing = json!({
            "type": "typing_status", "sender_id": me, "recipient_id": peer, "is_typing": false
        })
        .to_string();
        assert!(matches!(
            interpret_frame(&typing, me, ChannelState::Joined(me), MAX),
            Ok(Command::Route(RoutedEvent::TypingStatus(_)))
        ));
    }
}
