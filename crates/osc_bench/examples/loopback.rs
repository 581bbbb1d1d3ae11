//! Runs the benchmark over the in-process two-rank window and prints what rank `:0` and rank
//! `:1` would have printed. Options come from the JSON document given as the first argument, if
//! any. Use `RUST_LOG=debug` to see every epoch step.

use {
    osc_bench::{run_suite, BenchOptions, BenchError},
    osc_sim::SimWorld,
    tracing_subscriber::EnvFilter,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = match std::env::args().nth(1) {
        Some(json) => BenchOptions::from_json(&json),
        None => Ok(BenchOptions {
            iterations: 100,
            warmup: 10,
            colored: true,
            ..BenchOptions::default()
        }),
    };
    let options = match options {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let outcome = SimWorld::new(options.max_message_size).run(|win| {
        let mut out = Vec::new();
        let outcome = run_suite(win, &options, &mut out)?;
        Ok::<_, BenchError>((outcome.exit_code(), String::from_utf8_lossy(&out).into_owned()))
    });
    let outputs = match outcome {
        Ok(outcome) => outcome.outputs,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut exit_code = 0;
    for output in outputs {
        match output {
            Ok((code, text)) => {
                print!("{text}");
                exit_code = exit_code.max(code);
            }
            Err(err) => {
                eprintln!("{err}");
                exit_code = 1;
            }
        }
    }
    std::process::exit(exit_code);
}
