#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Read};
use std::path::Path;
use std::rc::Rc;
use std::sync::Mutex;

use data_import::database::{Connection, Transaction};
use data_import::error::DatabaseResult;
use data_import::observability::PipelineObserver;
use data_import::pipeline::RunStage;
use data_import::DatabaseError;

/// What reached the fake database.
#[derive(Debug, Default, Clone)]
pub struct Journal {
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    /// Statements from committed transactions only.
    pub committed: Vec<String>,
    /// `(copy statement, csv payload)` from committed transactions only.
    pub copied: Vec<(String, String)>,
}

/// In-memory stand-in for a database session.
///
/// Work is buffered per transaction and only lands in the journal on commit.
#[derive(Debug, Clone, Default)]
pub struct FakeConnection {
    pub journal: Rc<RefCell<Journal>>,
    /// Fail any statement containing this text.
    pub fail_on: Option<String>,
}

impl FakeConnection {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Default::default()
        }
    }
}

impl Connection for FakeConnection {
    fn begin(&mut self) -> DatabaseResult<Box<dyn Transaction + '_>> {
        self.journal.borrow_mut().begins += 1;
        Ok(Box::new(FakeTransaction {
            journal: Rc::clone(&self.journal),
            fail_on: self.fail_on.clone(),
            statements: Vec::new(),
            copied: Vec::new(),
        }))
    }
}

struct FakeTransaction {
    journal: Rc<RefCell<Journal>>,
    fail_on: Option<String>,
    statements: Vec<String>,
    copied: Vec<(String, String)>,
}

impl FakeTransaction {
    fn check(&self, statement: &str) -> DatabaseResult<()> {
        match &self.fail_on {
            Some(needle) if statement.contains(needle.as_str()) => {
                Err(DatabaseError::Io(io::Error::other("injected failure")))
            }
            _ => Ok(()),
        }
    }
}

impl Transaction for FakeTransaction {
    fn execute(&mut self, statement: &str) -> DatabaseResult<()> {
        self.check(statement)?;
        self.statements.push(statement.to_string());
        Ok(())
    }

    fn copy_in(&mut self, statement: &str, source: &mut dyn Read) -> DatabaseResult<u64> {
        self.check(statement)?;
        let mut payload = String::new();
        source.read_to_string(&mut payload)?;
        let rows = payload.lines().count().saturating_sub(1) as u64;
        self.statements.push(statement.to_string());
        self.copied.push((statement.to_string(), payload));
        Ok(rows)
    }

    fn commit(self: Box<Self>) -> DatabaseResult<()> {
        let mut journal = self.journal.borrow_mut();
        journal.commits += 1;
        journal.committed.extend(self.statements.iter().cloned());
        journal.copied.extend(self.copied.iter().cloned());
        Ok(())
    }

    fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        self.journal.borrow_mut().rollbacks += 1;
        Ok(())
    }
}

/// Observer that records the stages it is told about.
#[derive(Default)]
pub struct StageRecorder {
    pub stages: Mutex<Vec<RunStage>>,
}

impl StageRecorder {
    pub fn stages(&self) -> Vec<RunStage> {
        self.stages.lock().unwrap().clone()
    }
}

impl PipelineObserver for StageRecorder {
    fn on_stage(&self, stage: RunStage) {
        self.stages.lock().unwrap().push(stage);
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

pub const CONFIG_JSON: &str = r#"{
  "database": {
    "host": "localhost",
    "database": "test_db",
    "user": "test_user",
    "password": "test_password",
    "port": 5432
  }
}"#;
