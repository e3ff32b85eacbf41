use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    Result, StoreError,
    transaction::{Database, Row, SqlValue, Transaction},
};

/// A statement a transaction was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

/// How a transaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Open,
    Committed,
    RolledBack,
}

/// Everything one transaction did.
#[derive(Debug, Clone)]
pub struct SessionLog {
    pub statements: Vec<Statement>,
    pub outcome: SessionOutcome,
    pub rollback_calls: usize,
}

enum Response {
    Rows(Vec<Row>),
    Fail(String),
}

struct Rule {
    pattern: String,
    response: Response,
}

#[derive(Default)]
struct ScriptState {
    queries: Vec<Rule>,
    execute_failures: Vec<Rule>,
    delays: Vec<(String, Duration)>,
    begin_failure: Option<String>,
    commit_failure: Option<String>,
    rollback_failure: Option<String>,
    sessions: Vec<SessionLog>,
}

impl ScriptState {
    fn delay_for(&self, sql: &str) -> Option<Duration> {
        self.delays
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, delay)| *delay)
    }
}

/// In-memory store driver with scripted responses, for testing.
///
/// Responses are matched by substring against the SQL text; the first rule
/// registered for a matching pattern wins. Queries without a matching rule
/// return no rows and statements without a failure rule affect one row.
/// Every transaction is logged so tests can assert what ran and whether it
/// was committed.
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedDatabase {
    /// Creates a driver with no scripted behaviour.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        lock(&self.state)
    }

    /// Answers queries containing `pattern` with `rows`.
    pub fn set_query_rows(&self, pattern: &str, rows: Vec<Row>) {
        self.state().queries.push(Rule {
            pattern: pattern.to_string(),
            response: Response::Rows(rows),
        });
    }

    /// Fails queries containing `pattern`.
    pub fn fail_query(&self, pattern: &str, message: &str) {
        self.state().queries.push(Rule {
            pattern: pattern.to_string(),
            response: Response::Fail(message.to_string()),
        });
    }

    /// Fails statements containing `pattern`.
    pub fn fail_execute(&self, pattern: &str, message: &str) {
        self.state().execute_failures.push(Rule {
            pattern: pattern.to_string(),
            response: Response::Fail(message.to_string()),
        });
    }

    /// Delays queries and statements containing `pattern`.
    pub fn delay(&self, pattern: &str, delay: Duration) {
        self.state().delays.push((pattern.to_string(), delay));
    }

    pub fn fail_begin(&self, message: &str) {
        self.state().begin_failure = Some(message.to_string());
    }

    pub fn fail_commit(&self, message: &str) {
        self.state().commit_failure = Some(message.to_string());
    }

    pub fn fail_rollback(&self, message: &str) {
        self.state().rollback_failure = Some(message.to_string());
    }

    /// Returns the log of every transaction opened so far.
    pub fn sessions(&self) -> Vec<SessionLog> {
        self.state().sessions.clone()
    }

    /// Returns the statements of committed transactions, in order.
    pub fn committed_statements(&self) -> Vec<Statement> {
        self.state()
            .sessions
            .iter()
            .filter(|session| session.outcome == SessionOutcome::Committed)
            .flat_map(|session| session.statements.iter().cloned())
            .collect()
    }

    pub fn commit_count(&self) -> usize {
        self.count(SessionOutcome::Committed)
    }

    pub fn rollback_count(&self) -> usize {
        self.count(SessionOutcome::RolledBack)
    }

    fn count(&self, outcome: SessionOutcome) -> usize {
        self.state()
            .sessions
            .iter()
            .filter(|session| session.outcome == outcome)
            .count()
    }
}

fn lock(state: &Mutex<ScriptState>) -> MutexGuard<'_, ScriptState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Database for ScriptedDatabase {
    type Transaction = ScriptedTransaction;

    async fn begin(&self) -> Result<ScriptedTransaction> {
        let mut state = self.state();
        if let Some(message) = &state.begin_failure {
            return Err(StoreError::Driver(message.clone()));
        }

        state.sessions.push(SessionLog {
            statements: Vec::new(),
            outcome: SessionOutcome::Open,
            rollback_calls: 0,
        });
        Ok(ScriptedTransaction {
            state: Arc::clone(&self.state),
            session: state.sessions.len() - 1,
            finished: false,
        })
    }
}

/// A transaction opened by [`ScriptedDatabase`].
pub struct ScriptedTransaction {
    state: Arc<Mutex<ScriptState>>,
    session: usize,
    finished: bool,
}

impl ScriptedTransaction {
    /// Logs the statement and picks its scripted delay.
    fn record(&self, sql: &str, args: &[SqlValue]) -> Result<Option<Duration>> {
        if self.finished {
            return Err(StoreError::TransactionFinished);
        }
        let mut state = lock(&self.state);
        state.sessions[self.session].statements.push(Statement {
            sql: sql.to_string(),
            args: args.to_vec(),
        });
        Ok(state.delay_for(sql))
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.finished = true;
        lock(&self.state).sessions[self.session].outcome = outcome;
    }
}

async fn wait(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Transaction for ScriptedTransaction {
    async fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<u64> {
        let delay = self.record(statement, args)?;
        wait(delay).await;

        let failure = lock(&self.state)
            .execute_failures
            .iter()
            .find(|rule| statement.contains(rule.pattern.as_str()))
            .and_then(|rule| match &rule.response {
                Response::Fail(message) => Some(message.clone()),
                Response::Rows(_) => None,
            });
        match failure {
            Some(message) => Err(StoreError::Driver(message)),
            None => Ok(1),
        }
    }

    async fn query(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>> {
        let delay = self.record(statement, args)?;
        wait(delay).await;

        let state = lock(&self.state);
        match state
            .queries
            .iter()
            .find(|rule| statement.contains(rule.pattern.as_str()))
            .map(|rule| &rule.response)
        {
            Some(Response::Rows(rows)) => Ok(rows.clone()),
            Some(Response::Fail(message)) => Err(StoreError::Driver(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn commit(&mut self) -> Result<()> {
        if self.finished {
            return Err(StoreError::TransactionFinished);
        }
        let failure = lock(&self.state).commit_failure.clone();
        match failure {
            Some(message) => {
                self.finish(SessionOutcome::RolledBack);
                Err(StoreError::Driver(message))
            }
            None => {
                self.finish(SessionOutcome::Committed);
                Ok(())
            }
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        let failure = {
            let mut state = lock(&self.state);
            state.sessions[self.session].rollback_calls += 1;
            state.rollback_failure.clone()
        };
        if self.finished {
            return Ok(());
        }
        // A failed rollback still leaves nothing committed.
        self.finish(SessionOutcome::RolledBack);
        match failure {
            Some(message) => Err(StoreError::Driver(message)),
            None => Ok(()),
        }
    }
}

impl Drop for ScriptedTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(SessionOutcome::RolledBack);
        }
    }
}
