//! Background write queue.
//!
//! Every mutation coming from a study session goes through one worker task
//! that applies them in submission order. Question writes always carry the
//! full learner state, so a later write can never be undone by an earlier one
//! finishing late.

use qb_db::{Store, models::Question};
use tokio::sync::{mpsc, oneshot};

use crate::{
    error::CoreError,
    evaluate::{AnswerOutcome, persist_answer},
};

#[derive(Debug)]
enum WriteOp {
    SaveQuestion(Box<Question>),
    RecordAnswer {
        outcome: Box<AnswerOutcome>,
        done: oneshot::Sender<Result<(), CoreError>>,
    },
    SavePosition {
        bank_id: String,
        position: u32,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the write worker, cheap to clone
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl WriteQueue {
    /// Spawn the worker. It runs until every handle has been dropped.
    pub fn spawn(store: Store) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx));
        Self { tx }
    }

    /// Queue a full learner-state write without waiting for it.
    pub fn save_question(&self, question: Question) {
        if self.tx.send(WriteOp::SaveQuestion(Box::new(question))).is_err() {
            tracing::error!("Write queue closed, question update dropped");
        }
    }

    /// Queue a graded submission and wait until it is stored.
    pub async fn record_answer(&self, outcome: AnswerOutcome) -> Result<(), CoreError> {
        let (done, wait) = oneshot::channel();
        self.tx
            .send(WriteOp::RecordAnswer {
                outcome: Box::new(outcome),
                done,
            })
            .map_err(|_| CoreError::State("write queue closed"))?;

        wait.await
            .map_err(|_| CoreError::State("write queue stopped before acknowledging"))?
    }

    /// Queue a session position write without waiting for it.
    pub fn save_position(&self, bank_id: &str, position: u32) {
        let op = WriteOp::SavePosition {
            bank_id: bank_id.to_string(),
            position,
        };
        if self.tx.send(op).is_err() {
            tracing::error!(bank_id, position, "Write queue closed, position dropped");
        }
    }

    /// Wait until everything queued so far has been applied.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(WriteOp::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run_writer(store: Store, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            WriteOp::SaveQuestion(question) => match store.update_question(&question).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(question_id = %question.id, "Question gone, update skipped");
                }
                Err(e) => {
                    tracing::error!(question_id = %question.id, "Failed to save question: {e}");
                }
            },
            WriteOp::RecordAnswer { outcome, done } => {
                let result = persist_answer(&store, &outcome).await;
                if let Err(e) = &result {
                    tracing::error!(
                        question_id = %outcome.question.id,
                        "Failed to record answer: {e}"
                    );
                }
                // The submitter may have given up waiting
                let _ = done.send(result);
            }
            WriteOp::SavePosition { bank_id, position } => {
                match store.update_last_position(&bank_id, position).await {
                    Ok(_) => {
                        tracing::trace!(bank_id, position, "Saved position");
                    }
                    Err(e) => {
                        tracing::error!(bank_id, "Failed to save position: {e}");
                    }
                }
            }
            WriteOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Write queue stopped");
}
