#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use payout_batcher::{
    credentials::{error::CredentialError, PassphraseSource},
    events::{EventSink, PayoutEvent},
    rpc::{classify, RawOutcome, RemoteLedger, RpcError},
};

/// In-memory node that answers from scripted outcomes and records every call.
///
/// Outcomes keyed on the first argument are replayed on every matching call,
/// queued outcomes are consumed in order. Unscripted `walletpassphrase` and
/// `walletlock` calls succeed with `null`.
#[derive(Default)]
pub struct ScriptedLedger {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    queued: Mutex<HashMap<String, VecDeque<RawOutcome>>>,
    keyed: Mutex<HashMap<(String, String), RawOutcome>>,
}

impl ScriptedLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: &str, outcome: RawOutcome) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub fn respond_for(&self, method: &str, first_arg: &str, outcome: RawOutcome) {
        self.keyed
            .lock()
            .unwrap()
            .insert((method.to_string(), first_arg.to_string()), outcome);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, args)| args)
            .collect()
    }

    fn outcome_for(&self, method: &str, args: &[Value]) -> RawOutcome {
        if let Some(first) = args.first().and_then(Value::as_str) {
            let key = (method.to_string(), first.to_string());
            if let Some(outcome) = self.keyed.lock().unwrap().get(&key) {
                return outcome.clone();
            }
        }
        if let Some(outcome) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        match method {
            "walletpassphrase" | "walletlock" => RawOutcome::result(Value::Null),
            _ => RawOutcome::Unreachable(format!("no scripted response for {method}")),
        }
    }
}

#[async_trait]
impl RemoteLedger for ScriptedLedger {
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, RpcError> {
        let outcome = self.outcome_for(method, &args);
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args));
        classify(outcome)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PayoutEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<PayoutEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event names in emission order, e.g. `["unlocked", "success", "locked", "done"]`.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|event| match event {
                PayoutEvent::Unlocked { .. } => "unlocked",
                PayoutEvent::Locked => "locked",
                PayoutEvent::Success { .. } => "success",
                PayoutEvent::Failure { .. } => "failure",
                PayoutEvent::Done => "done",
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PayoutEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Passphrase source that counts how often it was asked.
pub struct CountingPassphrase {
    passphrase: String,
    asked: AtomicUsize,
}

impl CountingPassphrase {
    pub fn new(passphrase: &str) -> Arc<Self> {
        Arc::new(Self {
            passphrase: passphrase.to_string(),
            asked: AtomicUsize::new(0),
        })
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PassphraseSource for CountingPassphrase {
    async fn passphrase(&self) -> Result<String, CredentialError> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.passphrase.clone())
    }
}
