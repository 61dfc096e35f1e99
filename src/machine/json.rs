//! Model file format.
//!
//! A model is a JSON object with a `state` array and an optional `defs`
//! object. Each state has an optional `id` and a `trans` array; each
//! transition names its destination (`to`, by id or by index) plus optional
//! `in`, `out` and `weight` fields. Omitted labels mean the empty token and
//! an omitted weight means 1. `defs` keeps file order, and that order
//! assigns parameter ordinals.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{Machine, MachineState, MachineTransition};
use crate::error::ModelError;
use crate::expr::json::{expr_from_value, expr_to_value};
use crate::expr::{self, Expr};

#[derive(Deserialize)]
struct MachineDoc {
    state: Vec<StateDoc>,
    #[serde(default)]
    defs: Map<String, Value>,
}

#[derive(Deserialize)]
struct StateDoc {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    trans: Vec<TransDoc>,
}

#[derive(Deserialize)]
struct TransDoc {
    to: StateRef,
    #[serde(default, rename = "in")]
    input: Option<String>,
    #[serde(default, rename = "out")]
    output: Option<String>,
    #[serde(default)]
    weight: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StateRef {
    Index(usize),
    Name(String),
}

impl Machine {
    pub fn load(path: impl AsRef<Path>) -> Result<Machine, ModelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Machine::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Machine, ModelError> {
        let doc: MachineDoc =
            serde_json::from_str(text).map_err(|e| ModelError::Syntax {
                msg: e.to_string(),
                line: e.line(),
                column: e.column(),
            })?;
        doc.into_machine()
    }

    pub fn to_json_value(&self) -> Value {
        let state: Vec<Value> = self
            .states
            .iter()
            .map(|s| {
                let mut obj = Map::new();
                if let Some(name) = &s.name {
                    obj.insert("id".to_string(), json!(name));
                }
                obj.insert(
                    "trans".to_string(),
                    Value::Array(s.trans.iter().map(|t| self.trans_to_value(t)).collect()),
                );
                Value::Object(obj)
            })
            .collect();
        let mut doc = Map::new();
        doc.insert("state".to_string(), Value::Array(state));
        if !self.defs.is_empty() {
            let mut defs = Map::new();
            for (name, body) in &self.defs {
                defs.insert(name.clone(), expr_to_value(body));
            }
            doc.insert("defs".to_string(), Value::Object(defs));
        }
        Value::Object(doc)
    }

    fn trans_to_value(&self, t: &MachineTransition) -> Value {
        let mut obj = Map::new();
        let dest_name = self.states.get(t.dest).and_then(|s| s.name.as_ref());
        obj.insert(
            "to".to_string(),
            match dest_name {
                Some(name) => json!(name),
                None => json!(t.dest),
            },
        );
        if !t.input_empty() {
            obj.insert("in".to_string(), json!(t.input.as_deref().unwrap_or("")));
        }
        if !t.output_empty() {
            obj.insert("out".to_string(), json!(t.output.as_deref().unwrap_or("")));
        }
        if *t.weight != Expr::Int(1) {
            obj.insert("weight".to_string(), expr_to_value(&t.weight));
        }
        Value::Object(obj)
    }
}

impl MachineDoc {
    fn into_machine(self) -> Result<Machine, ModelError> {
        let n_states = self.state.len();
        let mut index_of: HashMap<String, usize> = HashMap::new();
        for (i, s) in self.state.iter().enumerate() {
            if let Some(id) = &s.id {
                if index_of.insert(id.clone(), i).is_some() {
                    return Err(ModelError::DuplicateStateId(id.clone()));
                }
            }
        }

        let mut states = Vec::with_capacity(n_states);
        for s in self.state {
            let mut trans = Vec::with_capacity(s.trans.len());
            for t in s.trans {
                let dest = match &t.to {
                    StateRef::Index(i) => {
                        if *i >= n_states {
                            return Err(ModelError::StateOutOfRange {
                                index: *i,
                                n_states,
                            });
                        }
                        *i
                    }
                    StateRef::Name(name) => *index_of
                        .get(name)
                        .ok_or_else(|| ModelError::UnknownState(name.clone()))?,
                };
                let weight = match &t.weight {
                    Some(v) => expr_from_value(v)?,
                    None => expr::one(),
                };
                trans.push(MachineTransition::new(t.input, t.output, dest, weight));
            }
            states.push(MachineState { name: s.id, trans });
        }

        let mut defs = Vec::with_capacity(self.defs.len());
        for (name, body) in &self.defs {
            defs.push((name.clone(), expr_from_value(body)?));
        }
        Ok(Machine { states, defs })
    }
}

// ─── Tests ────────────────────────────────────────────────────────
