//! Engine backed by a persistent `julia` child process.
//!
//! The child runs [`DRIVER`], which loads PSSFSS and answers one JSON request per line
//! on stdin with one JSON response per line on stdout. Everything the engine itself
//! prints to stdout is redirected to stderr so it cannot corrupt the protocol stream.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::engine::{Engine, EngineError, Request};
use super::value::ForeignValue;
use crate::config::SessionConfig;
use crate::errors::PssfssError;

/// Packages the driver needs in the active Julia project.
pub const REQUIRED_PACKAGES: [&str; 2] = ["PSSFSS", "JSON3"];

const INSTALL_SCRIPT: &str = r#"
if VERSION < v"1.10"
    println(stderr, "julia $(VERSION) is older than the required 1.10")
    exit(3)
end
import Pkg
for pkg in ARGS
    Base.find_package(pkg) === nothing && Pkg.add(pkg)
end
"#;

/// Driver script evaluated by the child process.
pub const DRIVER: &str = r#"
if VERSION < v"1.10"
    println(stdout, "{\"id\":0,\"err\":\"julia $(VERSION) is older than the required 1.10\"}")
    exit(3)
end

import JSON3
import REPL
using PSSFSS

const PROTOCOL = stdout
redirect_stdout(stderr)

const OBJECTS = Dict{Int,Any}()
const NEXT_ID = Ref(0)

function retain(x)
    NEXT_ID[] += 1
    OBJECTS[NEXT_ID[]] = x
    return Dict("ref" => NEXT_ID[])
end

resolve(name) = getfield(Main, Symbol(String(name)))

# JSON has no Inf or NaN literals.
wire(x::Float64) = isfinite(x) ? x : isnan(x) ? "NaN" : x > 0 ? "Inf" : "-Inf"
unwire(x::AbstractString) = parse(Float64, x)
unwire(x) = Float64(x)

decode_kwargs(list) = Pair{Symbol,Any}[Symbol(String(p[1])) => decode(p[2]) for p in list]

function decode(v)
    if v isa AbstractString
        v == "nothing" && return nothing
        error("unexpected bare value $(v)")
    end
    tag, x = only(pairs(v))
    tag === :bool && return Bool(x)
    tag === :int && return Int(x)
    tag === :float && return unwire(x)
    tag === :complex && return complex(unwire(x[1]), unwire(x[2]))
    tag === :char && return only(String(x))
    tag === :str && return String(x)
    (tag === :global || tag === :unit) && return resolve(x)
    tag === :quantity && return unwire(x[:value]) * resolve(x[:unit])
    tag === :array && return Float64[unwire(e) for e in x]
    tag === :int_array && return Int[Int(e) for e in x]
    tag === :vector && return Any[decode(e) for e in x]
    if tag === :named_tuple
        names = Tuple(Symbol(String(p[1])) for p in x)
        return NamedTuple{names}(Tuple(decode(p[2]) for p in x))
    end
    tag === :ref && return OBJECTS[Int(x)]
    tag === :construct && return resolve(x[:function])(; decode_kwargs(x[:kwargs])...)
    error("unsupported value tag $(tag)")
end

encode(::Nothing) = "nothing"
encode(x::Bool) = Dict("bool" => x)
encode(x::Integer) = Dict("int" => Int(x))
encode(x::Real) = Dict("float" => wire(Float64(x)))
encode(x::Complex) = Dict("complex" => Any[wire(Float64(real(x))), wire(Float64(imag(x)))])
encode(x::AbstractChar) = Dict("char" => string(x))
encode(x::AbstractString) = Dict("str" => String(x))
encode(x::Symbol) = Dict("str" => String(x))
encode(x::AbstractVector{<:AbstractFloat}) = Dict("array" => Any[wire(Float64(e)) for e in x])
encode(x::AbstractVector{<:Integer}) = Dict("int_array" => Int.(x))
encode(x::AbstractVector) = Dict("vector" => Any[encode(e) for e in x])
encode(x::AbstractMatrix) = Dict("table" => [Any[encode(e) for e in row] for row in eachrow(x)])
encode(x) = retain(x)

function handle(req)
    op = String(req[:op])
    if op == "call"
        f = resolve(req[:function])
        args = Any[decode(a) for a in req[:args]]
        result = f(args...; decode_kwargs(req[:kwargs])...)
        return req[:retain] ? retain(result) : encode(result)
    elseif op == "get_field"
        x = getfield(OBJECTS[Int(req[:target])], Symbol(String(req[:field])))
        return req[:stringify] ? encode(string(x)) : encode(x)
    elseif op == "outputs"
        return retain(Core.eval(Main, Meta.parse("@outputs " * String(req[:spec]))))
    elseif op == "doc"
        return encode(string(REPL.doc(resolve(req[:name]))))
    elseif op == "release"
        delete!(OBJECTS, Int(req[:target]))
        return "nothing"
    end
    error("unknown op $(op)")
end

function respond(payload)
    println(PROTOCOL, JSON3.write(payload))
    flush(PROTOCOL)
end

function main()
    respond(Dict("id" => 0, "ok" => Dict("str" => "ready")))
    for line in eachline(stdin)
        isempty(strip(line)) && continue
        id = 0
        try
            req = JSON3.read(line)
            id = Int(req[:id])
            respond(Dict("id" => id, "ok" => handle(req)))
        catch err
            respond(Dict("id" => id, "err" => sprint(showerror, err)))
        end
    end
end

main()
"#;

#[derive(Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    request: &'a Request,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    ok: Option<ForeignValue>,
    #[serde(default)]
    err: Option<String>,
}

impl Response {
    fn into_result(self) -> Result<ForeignValue, EngineError> {
        match (self.ok, self.err) {
            (_, Some(message)) => Err(EngineError::Foreign(message)),
            (Some(value), None) => Ok(value),
            (None, None) => Err(EngineError::Protocol(format!(
                "response {} carries neither `ok` nor `err`",
                self.id
            ))),
        }
    }
}

/// PSSFSS running in a child `julia` process.
#[derive(Debug)]
pub struct JuliaEngine {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl JuliaEngine {
    /// Resolves packages (when enabled), spawns the driver and waits for its handshake.
    pub fn start(config: &SessionConfig) -> Result<Self, PssfssError> {
        if config.auto_install {
            install_packages(config)?;
        }

        info!(julia = %config.julia.display(), threads = %config.threads, "starting julia engine");
        let mut child = base_command(config)
            .arg(format!("--threads={}", config.threads))
            .arg("-e")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                PssfssError::Initialization(format!(
                    "cannot spawn `{}`: {err}",
                    config.julia.display()
                ))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(PssfssError::Initialization("julia pipes unavailable".to_owned()));
        };
        let mut engine = Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            next_id: 1,
        };

        let greeting = engine
            .read_response()
            .and_then(Response::into_result)
            .map_err(|err| PssfssError::Initialization(format!("driver handshake failed: {err}")))?;
        if greeting.as_str() != Some("ready") {
            return Err(PssfssError::Initialization(format!(
                "unexpected driver greeting: {greeting:?}"
            )));
        }
        info!("julia engine ready");
        Ok(engine)
    }

    fn read_response(&mut self) -> Result<Response, EngineError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(EngineError::Closed);
            }
            if !line.trim().is_empty() {
                break;
            }
        }
        serde_json::from_str(line.trim_end())
            .map_err(|err| EngineError::Protocol(format!("malformed response: {err}")))
    }

    fn exchange(&mut self, id: u64, line: &str, request: &Request) -> Result<ForeignValue, EngineError> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::Closed)?;
        stdin.write_all(line.as_bytes())?;
        stdin.flush()?;
        debug!(id, op = %request.operation(), "request sent");

        let response = self.read_response()?;
        if response.id != id {
            return Err(EngineError::Protocol(format!(
                "response id {} does not match request id {id}",
                response.id
            )));
        }
        response.into_result()
    }
}

impl Engine for JuliaEngine {
    fn request(&mut self, request: &Request) -> Result<ForeignValue, EngineError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_string(&Envelope { id, request })
            .map_err(|err| EngineError::Protocol(format!("unserializable request: {err}")))?;
        line.push('\n');

        let outcome = self.exchange(id, &line, request);
        if let Err(err @ (EngineError::Io(_) | EngineError::Protocol(_) | EngineError::Closed)) = &outcome {
            // Later responses could be paired with the wrong requests.
            if self.stdin.take().is_some() {
                warn!(%err, "julia engine out of step; closing it");
            }
        }
        outcome
    }
}

impl Drop for JuliaEngine {
    fn drop(&mut self) {
        // Closing stdin ends the driver's read loop.
        drop(self.stdin.take());
        if let Err(err) = self.child.wait() {
            warn!(%err, "failed to reap julia engine");
        }
    }
}

fn base_command(config: &SessionConfig) -> Command {
    let mut cmd = Command::new(&config.julia);
    cmd.arg("--startup-file=no");
    if let Some(project) = &config.project {
        cmd.arg(format!("--project={}", project.display()));
    }
    cmd
}

fn install_packages(config: &SessionConfig) -> Result<(), PssfssError> {
    info!(packages = ?REQUIRED_PACKAGES, "resolving julia packages");
    let status = base_command(config)
        .arg("-e")
        .arg(INSTALL_SCRIPT)
        .args(REQUIRED_PACKAGES)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|err| {
            PssfssError::Initialization(format!("cannot run `{}`: {err}", config.julia.display()))
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(PssfssError::Initialization(format!(
            "package resolution exited with {status}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::value::RefId;

    #[test]
    fn envelope_flattens_request_fields() {
        let request = Request::Release { target: RefId(3) };
        let json = serde_json::to_string(&Envelope { id: 9, request: &request }).expect("serializable");
        assert_eq!(json, r#"{"id":9,"op":"release","target":3}"#);
    }

    #[test]
    fn response_error_wins_over_value() {
        let raw = r#"{"id":4,"err":"UndefKeywordError: keyword argument `P` not assigned"}"#;
        let response: Response = serde_json::from_str(raw).expect("parsable");
        assert!(matches!(response.into_result(), Err(EngineError::Foreign(msg)) if msg.contains("`P`")));
    }

    #[test]
    fn response_without_payload_is_a_protocol_error() {
        let response: Response = serde_json::from_str(r#"{"id":2}"#).expect("parsable");
        assert!(matches!(response.into_result(), Err(EngineError::Protocol(_))));
    }

    #[test]
    fn missing_executable_is_an_initialisation_error() {
        let config = SessionConfig::default()
            .with_julia("/nonexistent/pssfss-link/julia")
            .with_auto_install(false);
        assert!(matches!(JuliaEngine::start(&config), Err(PssfssError::Initialization(_))));
    }
}

#[cfg(all(test, unix))]
mod transport_tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    const READY: &str = r#"echo '{"id":0,"ok":{"str":"ready"}}'"#;

    /// Installs a shell script in place of `julia` that replays scripted protocol lines.
    fn scripted(lines: &[&str]) -> (TempDir, SessionConfig) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("julia");
        fs::write(&path, format!("#!/bin/sh\n{}\n", lines.join("\n"))).expect("script written");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("script executable");
        let config = SessionConfig::default().with_julia(path).with_auto_install(false);
        (dir, config)
    }

    fn edgecount() -> Request {
        Request::call("edgecount", vec![ForeignValue::Ref(crate::bridge::RefId(1))])
    }

    #[test]
    fn answers_are_paired_with_requests_after_the_handshake() {
        let (dir, config) = scripted(&[
            READY,
            r#"read -r line; printf '%s\n' "$line" > "$(dirname "$0")/seen""#,
            r#"echo '{"id":1,"ok":{"float":"-Inf"}}'"#,
            "read -r line",
        ]);
        let mut engine = JuliaEngine::start(&config).expect("handshake");
        let value = engine.request(&edgecount()).expect("answer");
        assert_eq!(value, ForeignValue::Float(f64::NEG_INFINITY));

        let seen = fs::read_to_string(dir.path().join("seen")).expect("request recorded");
        assert_eq!(
            seen.trim_end(),
            r#"{"id":1,"op":"call","function":"edgecount","args":[{"ref":1}],"kwargs":[],"retain":false}"#
        );
    }

    #[test]
    fn foreign_errors_leave_the_engine_usable() {
        let (_dir, config) = scripted(&[
            READY,
            "read -r line",
            r#"echo '{"id":1,"err":"MethodError: no method matching edgecount(::Int64)"}'"#,
            "read -r line",
            r#"echo '{"id":2,"ok":{"int":5}}'"#,
            "read -r line",
        ]);
        let mut engine = JuliaEngine::start(&config).expect("handshake");
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Foreign(msg)) if msg.contains("MethodError")));
        assert_eq!(engine.request(&edgecount()).expect("second answer"), ForeignValue::Int(5));
    }

    #[test]
    fn end_of_stream_closes_the_engine() {
        let (_dir, config) = scripted(&[READY, "read -r line", "exit 0"]);
        let mut engine = JuliaEngine::start(&config).expect("handshake");
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Closed)));
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Closed)));
    }

    #[test]
    fn mismatched_ids_close_the_engine() {
        let (_dir, config) = scripted(&[
            READY,
            "read -r line",
            r#"echo '{"id":7,"ok":"nothing"}'"#,
            "read -r line",
            r#"echo '{"id":2,"ok":"nothing"}'"#,
        ]);
        let mut engine = JuliaEngine::start(&config).expect("handshake");
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Protocol(msg)) if msg.contains("id 7")));
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Closed)));
    }

    #[test]
    fn malformed_lines_close_the_engine() {
        let (_dir, config) = scripted(&[READY, "read -r line", "echo 'not json'", "read -r line"]);
        let mut engine = JuliaEngine::start(&config).expect("handshake");
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Protocol(msg)) if msg.contains("malformed")));
        assert!(matches!(engine.request(&edgecount()), Err(EngineError::Closed)));
    }

    #[test]
    fn wrong_greeting_fails_initialisation() {
        let (_dir, config) = scripted(&[r#"echo '{"id":0,"ok":{"str":"hello"}}'"#]);
        let err = JuliaEngine::start(&config).expect_err("bad greeting");
        assert!(matches!(err, PssfssError::Initialization(msg) if msg.contains("greeting")));
    }

    #[test]
    fn silent_exit_fails_initialisation() {
        let (_dir, config) = scripted(&["exit 1"]);
        let err = JuliaEngine::start(&config).expect_err("no greeting");
        assert!(matches!(err, PssfssError::Initialization(msg) if msg.contains("handshake")));
    }

    #[test]
    fn outdated_julia_is_reported_at_start() {
        let (_dir, config) = scripted(&[
            r#"echo '{"id":0,"err":"julia 1.9.4 is older than the required 1.10"}'"#,
            "exit 3",
        ]);
        let err = JuliaEngine::start(&config).expect_err("too old");
        assert!(matches!(err, PssfssError::Initialization(msg) if msg.contains("older than the required 1.10")));
    }

    #[test]
    fn driver_checks_the_julia_version_first() {
        let gate = DRIVER.trim_start();
        assert!(gate.starts_with(r#"if VERSION < v"1.10""#));
        assert!(INSTALL_SCRIPT.trim_start().starts_with(r#"if VERSION < v"1.10""#));
    }
}
