//! Shared helpers for integration tests.

use pgcursor::{DbResult, GenericClient, Value};
use std::sync::Mutex;

/// A client that records statements instead of talking to Postgres.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl RecordingClient {
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> (String, Vec<Value>) {
        self.calls().pop().expect("no statement dispatched")
    }
}

impl GenericClient for RecordingClient {
    type Row = Vec<Value>;

    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Vec<Value>>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
        Ok(vec![args.to_vec()])
    }
}

pub fn text(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}
