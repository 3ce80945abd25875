use bevy::prelude::Entity;
use thiserror::Error;

use crate::game::NationId;

/// Fatal turn-level failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("AI controller for {nation} is registered on {expected:?} but the game has it on {found:?}")]
    IntegrityViolation {
        nation: NationId,
        expected: Entity,
        found: Entity,
    },
    #[error("{0} is not part of the current game")]
    UnknownFaction(NationId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntelligenceError {
    #[error("no strength report available for {0}")]
    Unavailable(NationId),
}

/// Why a carrier cannot take a transportable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CargoError {
    #[error("transportable has no source location")]
    MissingSource,
    #[error("transportable has no destination")]
    MissingDestination,
    #[error("carrier cannot reach the pickup location")]
    NoPathToSource,
    #[error("carrier cannot reach the destination")]
    NoPathToDestination,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("unit {0:?} has no mission to execute")]
    NoMission(Entity),
    #[error("mission step for {unit:?} failed: {reason}")]
    StepFailed { unit: Entity, reason: String },
}

/// A remote action that had no effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("request refused: {0}")]
    Refused(String),
    #[error("request produced no new unit")]
    NoEffect,
}
