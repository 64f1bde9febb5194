//! Purpose: Hold top-level CLI command dispatch for `primer`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Output envelopes and exit code semantics stay unchanged.
//! Invariants: The demo prints exactly three lines in fixed order.

use super::*;

pub(super) fn dispatch_command(
    command: Option<Command>,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command.unwrap_or(Command::Demo { json: false }) {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "primer", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Demo { json } => {
            run_demo(json);
            Ok(RunOutcome::ok())
        }
        Command::Add { a, b, json } => {
            emit_binary_op("add", a, b, ops::add(a, b), json);
            Ok(RunOutcome::ok())
        }
        Command::Mul { a, b, json } => {
            emit_binary_op("mul", a, b, ops::multiply(a, b), json);
            Ok(RunOutcome::ok())
        }
        Command::Greet { name, json } => {
            let result = ops::greet(&name);
            if json {
                emit_json(json!({ "op": "greet", "name": name, "result": result }));
            } else {
                println!("{result}");
            }
            Ok(RunOutcome::ok())
        }
        Command::Bench {
            iters,
            rounds,
            format,
            out,
        } => {
            let format = BenchFormat::parse(&format)?;
            if cfg!(debug_assertions) {
                emit_notice(&bench_debug_notice(), color_mode);
            }
            bench::run_bench(
                BenchArgs {
                    iters,
                    rounds,
                    format,
                    out,
                },
                env!("CARGO_PKG_VERSION"),
            )?;
            Ok(RunOutcome::ok())
        }
    }
}

fn run_demo(json: bool) {
    let sum = ops::add(2, 3);
    let product = ops::multiply(4, 5);
    let greeting = ops::greet("World");
    if json {
        emit_json(json!({
            "demo": { "add": sum, "multiply": product, "greet": greeting }
        }));
    } else {
        println!("{sum}");
        println!("{product}");
        println!("{greeting}");
    }
}

fn emit_binary_op(op: &str, a: i64, b: i64, result: i64, json: bool) {
    if json {
        emit_json(json!({ "op": op, "a": a, "b": b, "result": result }));
    } else {
        println!("{result}");
    }
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("primer {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "primer",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn bench_debug_notice() -> Notice {
    let mut details = Map::new();
    details.insert("profile".to_string(), Value::from("debug"));
    Notice {
        kind: "debug-build".to_string(),
        time: notice_time_now().unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string()),
        cmd: "bench".to_string(),
        message: "debug build; timings are not representative".to_string(),
        details,
    }
}
