//! Dispatch and completion
//!
//! A collaborator call either fails to dispatch (`Err(DispatchError)`) or
//! hands back a [`DispatchOutcome`]: a pending result that later resolves to
//! a [`Completion`] carrying the boundary event name and the payload or
//! [`CollaboratorError`].

use crate::error::CollaboratorError;
use crate::event::{EventName, Operation};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Resolved result of one collaborator call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    /// `FEATURE_ACTION_COMPLETE` or `FEATURE_ACTION_ERROR`
    pub event: EventName,
    /// Payload or failure
    pub result: Result<T, CollaboratorError>,
}

impl<T> Completion<T> {
    /// Successful completion
    #[must_use]
    pub fn success(operation: Operation, value: T) -> Self {
        Self {
            event: operation.complete(),
            result: Ok(value),
        }
    }

    /// Failed completion
    #[must_use]
    pub fn failure(operation: Operation, error: CollaboratorError) -> Self {
        Self {
            event: operation.error(),
            result: Err(error),
        }
    }

    /// Build from a result, picking the matching event
    #[must_use]
    pub fn from_result(operation: Operation, result: Result<T, CollaboratorError>) -> Self {
        match result {
            Ok(value) => Self::success(operation, value),
            Err(error) => Self::failure(operation, error),
        }
    }

    /// Whether the call succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Drop the event name
    ///
    /// # Errors
    /// The collaborator failure, if any
    pub fn into_result(self) -> Result<T, CollaboratorError> {
        self.result
    }
}

/// Accepted call whose result is still pending
#[derive(Debug)]
pub struct DispatchOutcome<T> {
    operation: Operation,
    receiver: oneshot::Receiver<Completion<T>>,
}

impl<T> DispatchOutcome<T> {
    /// Operation this outcome belongs to
    #[inline]
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Wait for the completion
    ///
    /// A responder dropped without answering yields a `Dropped` failure.
    pub async fn wait(self) -> Completion<T> {
        match self.receiver.await {
            Ok(completion) => completion,
            Err(_) => Completion::failure(self.operation, CollaboratorError::Dropped),
        }
    }

    /// Take the completion if it has already arrived
    pub fn try_complete(&mut self) -> Option<Completion<T>> {
        match self.receiver.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                Some(Completion::failure(self.operation, CollaboratorError::Dropped))
            }
        }
    }
}

/// Sending half held by the collaborator
#[derive(Debug)]
pub struct Responder<T> {
    operation: Operation,
    sender: oneshot::Sender<Completion<T>>,
}

impl<T> Responder<T> {
    /// Deliver the result; returns false if nobody is listening any more
    pub fn respond(self, result: Result<T, CollaboratorError>) -> bool {
        let completion = Completion::from_result(self.operation, result);
        let event = completion.event;
        let delivered = self.sender.send(completion).is_ok();
        if !delivered {
            tracing::debug!(%event, "completion receiver gone");
        }
        delivered
    }
}

/// Create a linked responder / outcome pair
#[must_use]
pub fn channel<T>(operation: Operation) -> (Responder<T>, DispatchOutcome<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Responder { operation, sender },
        DispatchOutcome {
            operation,
            receiver,
        },
    )
}
