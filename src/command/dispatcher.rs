//! Command-name to handler dispatch
//!
//! The registry is an explicit table built at startup mapping exact,
//! case-sensitive command names to handler functions; there is no runtime
//! discovery. Handler errors are absorbed here and translated into bare
//! outcomes, so one misbehaving command can never take down another.

use crate::command::handlers::{self, CommandContext};
use crate::command::payload::SerializedRoomData;
use crate::error::{CoordinatorError, Result};
use crate::types::Identity;
use futures::future::BoxFuture;
use std::collections::HashMap;
use tracing::{error, warn};

/// Outcome of dispatching a command; the transport layer maps these onto
/// bare status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    BadRequest,
    Unauthorized,
    NotFound,
}

impl CommandOutcome {
    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            CommandOutcome::Success => "success",
            CommandOutcome::BadRequest => "bad_request",
            CommandOutcome::Unauthorized => "unauthorized",
            CommandOutcome::NotFound => "not_found",
        }
    }
}

type HandlerFn = for<'a> fn(
    &'a CommandContext,
    &'a Identity,
    &'a SerializedRoomData,
) -> BoxFuture<'a, Result<()>>;

/// Resolves inbound command names and invokes their handlers
pub struct MatchCommandDispatcher {
    ctx: CommandContext,
    registry: HashMap<&'static str, HandlerFn>,
}

impl MatchCommandDispatcher {
    /// Build the dispatcher with one handler registered per command name
    pub fn new(ctx: CommandContext) -> Self {
        let mut registry: HashMap<&'static str, HandlerFn> = HashMap::new();
        registry.insert("CreateRoom", |c, i, p| {
            Box::pin(handlers::create_room(c, i, p))
        });
        registry.insert("UpdateRoomData", |c, i, p| {
            Box::pin(handlers::update_room_data(c, i, p))
        });
        registry.insert("UpdatePlayersInRoom", |c, i, p| {
            Box::pin(handlers::update_players_in_room(c, i, p))
        });
        registry.insert("FindBestRoom", |c, i, p| {
            Box::pin(handlers::find_best_room(c, i, p))
        });

        Self { ctx, registry }
    }

    /// Registered command names, for startup logging
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.registry.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolve `command` exactly (case-sensitive) and run its handler
    pub async fn dispatch(
        &self,
        command: &str,
        identity: &Identity,
        payload: &SerializedRoomData,
    ) -> CommandOutcome {
        let handler = match self.registry.get(command) {
            Some(handler) => handler,
            None => {
                let error = CoordinatorError::UnknownCommand {
                    name: command.to_string(),
                };
                return Self::outcome_for_error(command, identity, error.into());
            }
        };

        match handler(&self.ctx, identity, payload).await {
            Ok(()) => CommandOutcome::Success,
            Err(e) => Self::outcome_for_error(command, identity, e),
        }
    }

    fn outcome_for_error(
        command: &str,
        identity: &Identity,
        error: anyhow::Error,
    ) -> CommandOutcome {
        match error.downcast_ref::<CoordinatorError>() {
            Some(CoordinatorError::InvalidPayload { reason }) => {
                warn!(
                    "{} from '{}' rejected: {}",
                    command, identity.username, reason
                );
                CommandOutcome::BadRequest
            }
            Some(CoordinatorError::NoActiveRoom) => {
                warn!(
                    "{} from '{}' rejected: caller has no active room",
                    command, identity.username
                );
                CommandOutcome::BadRequest
            }
            Some(CoordinatorError::NotRoomHost { room_id }) => {
                warn!(
                    "{} from '{}' rejected: not host of room {}",
                    command, identity.username, room_id
                );
                CommandOutcome::Unauthorized
            }
            Some(CoordinatorError::UnknownCommand { name }) => {
                warn!("Unknown match command '{}' from '{}'", name, identity.username);
                CommandOutcome::NotFound
            }
            Some(CoordinatorError::NoCandidateRooms) => CommandOutcome::NotFound,
            _ => {
                // Anything unexpected stays local to this command.
                error!("{} from '{}' failed: {}", command, identity.username, error);
                CommandOutcome::BadRequest
            }
        }
    }
}
