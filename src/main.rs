use modoshi::{deconjugate_verbose_with, Deconjugator, Options, RuleTable};
use std::io::{self, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let opts = Options { use_cache: !config.no_cache };

    let run = match &config.rules_path {
        Some(path) => {
            let table = match RuleTable::from_path(path) {
                Ok(table) => table,
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            };
            Deconjugator::new(table).run_with_metrics(&config.input, &opts)
        }
        None => deconjugate_verbose_with(&config.input, &opts),
    };

    if config.json {
        match serde_json::to_string_pretty(&run.forms) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}", config.input);
    for form in &run.forms {
        if form.is_identity() {
            continue;
        }
        let tags = form.tags.join(", ");
        if form.process.is_empty() {
            println!("  {}  [{tags}]", form.text);
        } else {
            println!("  {}  [{tags}]  {}", form.text, form.process_display());
        }
    }
    if config.verbose {
        eprintln!(
            "{} forms in {:?} ({} passes{})",
            run.forms.len(),
            run.metrics.total,
            run.metrics.search.passes.len(),
            if run.metrics.cache_hit { ", cached" } else { "" }
        );
    }
}

struct CliConfig {
    input: String,
    rules_path: Option<String>,
    no_cache: bool,
    json: bool,
    verbose: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut rules_path: Option<String> = None;
    let mut no_cache = false;
    let mut json = false;
    let mut verbose = false;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("modoshi {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--json" => json = true,
            "--no-cache" => no_cache = true,
            "--verbose" | "-v" => verbose = true,
            "--rules" => {
                let value = args.next().ok_or_else(|| "error: --rules expects a path".to_string())?;
                rules_path = Some(value);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--rules=") => {
                rules_path = Some(arg.trim_start_matches("--rules=").to_string());
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };
    let input = input.trim().to_string();

    if input.is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, rules_path, no_cache, json, verbose })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "modoshi {version}

Japanese deconjugation engine CLI. Prints every plausible dictionary form
for an inflected surface string, with its tag chain and derivation trail.

Usage:
  modoshi [OPTIONS] [--] <input...>
  modoshi [OPTIONS] --input <text>

Options:
  -i, --input <text>   Input text to deconjugate. If omitted, reads remaining
                       args or stdin when no args are provided.
  --rules <path>       Use a rule file instead of the bundled table.
  --no-cache           Bypass the result cache.
  --json               Emit the full result set as JSON.
  -v, --verbose        Print pass/timing summary to stderr.
  -h, --help           Show this help message.
  -V, --version        Print version information.

Exit codes:
  0  Success.
  1  Rule table or output failure.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
