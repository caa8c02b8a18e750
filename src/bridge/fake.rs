//! In-process stand-in for the foreign engine used by unit tests.
//!
//! It records every request and mimics the PSSFSS answers the host layer relies on:
//! sheets with a two-triangle square mesh, analysis results keyed by frequency, output
//! requests split on whitespace and row-major result tables.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::engine::{Engine, EngineError, Request};
use super::value::{ForeignValue, RefId};
use crate::math::CScalar;

pub(crate) const SHEET_STYLES: [&str; 13] = [
    "diagstrip",
    "rectstrip",
    "polyring",
    "pixels",
    "sympixels",
    "splitring",
    "loadedcross",
    "jerusalemcross",
    "manji",
    "meander",
    "sinuous",
    "pecsheet",
    "pmcsheet",
];

#[derive(Debug, Clone)]
pub(crate) enum FakeObject {
    Sheet {
        style: String,
        units: String,
        class: char,
        kwargs: Vec<(String, ForeignValue)>,
    },
    Results {
        frequencies: Vec<f64>,
    },
    Outputs(Vec<String>),
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub requests: Vec<Request>,
    pub objects: HashMap<RefId, FakeObject>,
    next: u64,
    /// Functions that raise a foreign error when called.
    pub failing: Vec<String>,
}

impl FakeState {
    pub fn is_live(&self, id: RefId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn calls_to(&self, function: &str) -> Vec<&Request> {
        self.requests
            .iter()
            .filter(|r| matches!(r, Request::Call { function: f, .. } if f == function))
            .collect()
    }

    fn store(&mut self, object: FakeObject) -> ForeignValue {
        self.next += 1;
        let id = RefId(self.next);
        self.objects.insert(id, object);
        ForeignValue::Ref(id)
    }

    fn object(&self, value: Option<&ForeignValue>) -> Result<&FakeObject, EngineError> {
        value
            .and_then(ForeignValue::as_ref_id)
            .and_then(|id| self.objects.get(&id))
            .ok_or_else(|| EngineError::Foreign("KeyError: key not found".into()))
    }
}

pub(crate) struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

fn ints(values: &[i64]) -> ForeignValue {
    ForeignValue::IntArray(values.to_vec())
}

fn int_table(rows: &[&[i64]]) -> ForeignValue {
    ForeignValue::Table(
        rows.iter()
            .map(|row| row.iter().map(|&v| ForeignValue::Int(v)).collect())
            .collect(),
    )
}

fn sheet_field(style: &str, units: &str, class: char, field: &str) -> Result<ForeignValue, EngineError> {
    let empty = matches!(style, "pecsheet" | "pmcsheet");
    let value = match field {
        "units" => ForeignValue::Str(units.to_owned()),
        "s₁" => ForeignValue::Array(vec![1.0, 0.0]),
        "s₂" => ForeignValue::Array(vec![0.0, 1.0]),
        "class" => ForeignValue::Char(class),
        "info" => ForeignValue::Str(format!("{style} test mesh")),
        "style" => ForeignValue::Str(style.to_owned()),
        _ if empty => match field {
            "e1" | "e2" => ints(&[]),
            "fv" | "fe" => ForeignValue::Table(Vec::new()),
            "ρ" => ForeignValue::Vector(Vec::new()),
            other => return Err(EngineError::Foreign(format!("type RWGSheet has no field {other}"))),
        },
        "e1" => ints(&[1, 2, 3, 4, 1]),
        "e2" => ints(&[2, 3, 4, 1, 3]),
        "fv" => int_table(&[&[1, 1], &[2, 3], &[3, 4]]),
        "fe" => int_table(&[&[1, 5], &[2, 3], &[5, 4]]),
        "ρ" => ForeignValue::Vector(vec![
            ForeignValue::Array(vec![0.0, 0.0]),
            ForeignValue::Array(vec![1.0, 0.0]),
            ForeignValue::Array(vec![1.0, 1.0]),
            ForeignValue::Array(vec![0.0, 1.0]),
        ]),
        other => return Err(EngineError::Foreign(format!("type RWGSheet has no field {other}"))),
    };
    Ok(value)
}

/// Deterministic value the fake reports for one output field at one frequency.
pub(crate) fn fake_output(field: &str, fghz: f64) -> ForeignValue {
    match field {
        "fghz" | "FGHz" => ForeignValue::Float(fghz),
        "s11db(te,te)" => ForeignValue::Float(-7.922_095_13),
        "s11ang(te,te)" => ForeignValue::Float(-131.168_178_47),
        f if f.starts_with("s11(") => ForeignValue::Complex(CScalar::new(-0.26, -0.30)),
        other => ForeignValue::Float(other.len() as f64 + fghz / 100.0),
    }
}

impl FakeEngine {
    fn call(
        state: &mut FakeState,
        function: &str,
        args: &[ForeignValue],
        kwargs: &[(String, ForeignValue)],
        retain: bool,
    ) -> Result<ForeignValue, EngineError> {
        if state.failing.iter().any(|f| f == function) {
            return Err(EngineError::Foreign(format!("ArgumentError: {function} rejected its arguments")));
        }
        if SHEET_STYLES.contains(&function) {
            let units = kwargs
                .iter()
                .find(|(k, _)| k == "units")
                .and_then(|(_, v)| v.as_str())
                .unwrap_or("mm")
                .to_owned();
            let class = kwargs
                .iter()
                .find_map(|(k, v)| match (k.as_str(), v) {
                    ("class", ForeignValue::Char(c)) => Some(*c),
                    _ => None,
                })
                .unwrap_or('J');
            let object = FakeObject::Sheet {
                style: function.to_owned(),
                units,
                class,
                kwargs: kwargs.to_vec(),
            };
            return Ok(if retain { state.store(object) } else { ForeignValue::Nothing });
        }
        match function {
            "edgecount" | "facecount" | "nodecount" => {
                let FakeObject::Sheet { style, .. } = state.object(args.first())? else {
                    return Err(EngineError::Foreign("MethodError: not a sheet".into()));
                };
                let empty = matches!(style.as_str(), "pecsheet" | "pmcsheet");
                let count = match (function, empty) {
                    (_, true) => 0,
                    ("edgecount", _) => 5,
                    ("facecount", _) => 2,
                    _ => 4,
                };
                Ok(ForeignValue::Int(count))
            }
            "repr" => {
                let FakeObject::Sheet { style, .. } = state.object(args.first())? else {
                    return Err(EngineError::Foreign("MethodError: not a sheet".into()));
                };
                Ok(ForeignValue::Str(format!("RWGSheet: style={style}")))
            }
            "export_sheet" => {
                state.object(args.get(1))?;
                match args.get(2).and_then(ForeignValue::as_str) {
                    Some("STL_ASCII" | "STL_BINARY") => Ok(ForeignValue::Nothing),
                    other => Err(EngineError::Foreign(format!("UndefVarError: {other:?} not defined"))),
                }
            }
            "analyze" => {
                let frequencies = match args.get(1) {
                    Some(ForeignValue::Float(f)) => vec![*f],
                    Some(ForeignValue::Int(f)) => vec![*f as f64],
                    Some(ForeignValue::Array(fs)) => fs.clone(),
                    _ => return Err(EngineError::Foreign("MethodError: bad flist".into())),
                };
                if let Some(ForeignValue::Vector(strata)) = args.first() {
                    for entry in strata {
                        if let ForeignValue::Ref(_) = entry {
                            state.object(Some(entry))?;
                        }
                    }
                }
                let object = FakeObject::Results { frequencies };
                Ok(if retain { state.store(object) } else { ForeignValue::Nothing })
            }
            "length" => match state.object(args.first())? {
                FakeObject::Outputs(fields) => Ok(ForeignValue::Int(fields.len() as i64)),
                FakeObject::Results { frequencies } => Ok(ForeignValue::Int(frequencies.len() as i64)),
                FakeObject::Sheet { .. } => Err(EngineError::Foreign("MethodError: length(::RWGSheet)".into())),
            },
            "extract_result" => {
                let FakeObject::Results { frequencies } = state.object(args.first())?.clone() else {
                    return Err(EngineError::Foreign("MethodError: not a result".into()));
                };
                let FakeObject::Outputs(fields) = state.object(args.get(1))?.clone() else {
                    return Err(EngineError::Foreign("MethodError: not an output request".into()));
                };
                Ok(ForeignValue::Table(
                    frequencies
                        .iter()
                        .map(|&f| fields.iter().map(|field| fake_output(field, f)).collect())
                        .collect(),
                ))
            }
            "res2tep" | "res2fresnel" => {
                match args.first() {
                    Some(ForeignValue::Str(_)) => {}
                    other => {
                        state.object(other)?;
                    }
                }
                Ok(ForeignValue::Nothing)
            }
            other => Err(EngineError::Foreign(format!("UndefVarError: `{other}` not defined"))),
        }
    }
}

impl Engine for FakeEngine {
    fn request(&mut self, request: &Request) -> Result<ForeignValue, EngineError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        match request {
            Request::Call {
                function,
                args,
                kwargs,
                retain,
            } => Self::call(&mut state, function, args, kwargs, *retain),
            Request::GetField {
                target,
                field,
                stringify,
            } => match state.objects.get(target) {
                Some(FakeObject::Sheet {
                    style, units, class, ..
                }) => {
                    let value = sheet_field(style, units, *class, field)?;
                    Ok(if *stringify && !matches!(value, ForeignValue::Str(_)) {
                        ForeignValue::Str(format!("{value:?}"))
                    } else {
                        value
                    })
                }
                _ => Err(EngineError::Foreign(format!("KeyError: key {} not found", target.0))),
            },
            Request::Outputs { spec } => {
                let fields = spec.split_whitespace().map(str::to_owned).collect();
                Ok(state.store(FakeObject::Outputs(fields)))
            }
            Request::Doc { name } => Ok(ForeignValue::Str(format!("```\n{name}(...)\n```\n\nDocs for {name}."))),
            Request::Release { target } => {
                state.objects.remove(target);
                Ok(ForeignValue::Nothing)
            }
        }
    }
}
