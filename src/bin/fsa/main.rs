//! Command line front end for the automata and regex constructions.

mod workspace;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use fsa_toolkit::automata::{
    automaton_to_regex, compile, eliminate_epsilon, isomorphism, isomorphism_dot, Automaton,
};
use fsa_toolkit::pipeline::{
    brzozowski, describe_language, determinize_co_deterministic, minimal_dfa, minimize_regex,
    regex_to_minimal_dfa,
};
use fsa_toolkit::re::{parse, ReBuilder};
use log::{error, info};

use workspace::{Error, Workspace};

#[derive(Parser)]
#[command(about, version)]
struct Opts {
    /// Directory containing input automata and regexes
    #[arg(long, global = true, default_value = "inputs")]
    inputs: PathBuf,
    /// Directory for resulting automata and regexes
    #[arg(long, global = true, default_value = "outputs")]
    outputs: PathBuf,
    /// Directory for DOT renderings
    #[arg(long, global = true, default_value = "dots")]
    dots: PathBuf,
    /// Directory for PNG images
    #[arg(long, global = true, default_value = "images")]
    images: PathBuf,
    /// Render every DOT file to PNG with the graphviz `dot` executable
    #[arg(long, global = true)]
    png: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Determinize a co-deterministic, co-accessible automaton with one final state, which yields its minimal DFA
    CoDeterministic { name: String },
    /// Minimize an automaton with Brzozowski's algorithm
    Brzozowski { name: String },
    /// Minimize an automaton by determinizing and refining partitions
    Minimal { name: String },
    /// Run co-deterministic, brzozowski and minimal on the same automaton
    All { name: String },
    /// Check whether two automata from the outputs directory are isomorphic
    Isomorphic { first: String, second: String },
    /// Compile a regex to its minimal DFA, keeping every intermediate automaton
    RegexToDfa { name: String },
    /// Render an automaton as DOT
    Image { name: String },
    /// Convert an automaton into a regex by state elimination
    NfaToRegex { name: String },
    /// Rewrite a regex as the regex of its minimal DFA
    Standardize { name: String },
    /// Canonicalize a regex through its simplified AST and minimal DFA
    MinimizeRegex { name: String },
}

/// Reads the input automaton and draws it as `nfa_<name>`.
fn input(ws: &Workspace, name: &str) -> Result<Automaton, Error> {
    let a = ws.read_input(name)?;
    ws.draw_automaton("nfa_", name, &a)?;
    Ok(a)
}

fn report(what: &str, regex: &str) {
    println!("{}: {}", what, describe_language(regex));
}

fn run(ws: &Workspace, cmd: Cmd) -> Result<(), Error> {
    match cmd {
        Cmd::CoDeterministic { name } => {
            let a = input(ws, &name)?;
            ws.write_automaton("pro_", &name, &determinize_co_deterministic(&a))?;
        }
        Cmd::Brzozowski { name } => {
            let a = input(ws, &name)?;
            ws.write_automaton("bro_", &name, &brzozowski(&a))?;
        }
        Cmd::Minimal { name } => {
            let a = input(ws, &name)?;
            ws.write_automaton("min_", &name, &minimal_dfa(&a))?;
        }
        Cmd::All { name } => {
            let a = input(ws, &name)?;
            ws.write_automaton("pro_", &name, &determinize_co_deterministic(&a))?;
            ws.write_automaton("bro_", &name, &brzozowski(&a))?;
            ws.write_automaton("min_", &name, &minimal_dfa(&a))?;
        }
        Cmd::Isomorphic { first, second } => {
            let a = ws.read_output(&first)?;
            let b = ws.read_output(&second)?;
            match isomorphism(&a, &b) {
                Some(mapping) => {
                    println!("{} and {} are isomorphic", first, second);
                    for (p, q) in &mapping {
                        println!("  {} -> {}", p, q);
                    }
                    let dot = isomorphism_dot(&a, &b, &mapping).map_err(|source| Error::Io {
                        path: PathBuf::from("<dot>"),
                        source,
                    })?;
                    ws.write_dot("iso_", &format!("{}_vs_{}", first, second), &dot)?;
                }
                None => println!("{} and {} are not isomorphic", first, second),
            }
        }
        Cmd::RegexToDfa { name } => {
            let regex = ws.read_regex(&name)?;
            let automata = regex_to_minimal_dfa(&regex)?;
            ws.write_automaton("enfa_", &name, &automata.enfa)?;
            ws.write_automaton("nfa_", &name, &automata.nfa)?;
            ws.write_automaton("min_", &name, &automata.min)?;
        }
        Cmd::Image { name } => {
            let a = ws.read_input(&name)?;
            ws.draw_automaton("automaton_", &name, &a)?;
        }
        Cmd::NfaToRegex { name } => {
            let a = ws.read_input(&name)?;
            let regex = automaton_to_regex(&a);
            ws.write_text("regex_", &name, &regex)?;
            report("regex", &regex);
        }
        Cmd::Standardize { name } => {
            let regex = ws.read_regex(&name)?;
            let automata = regex_to_minimal_dfa(&regex)?;
            ws.write_automaton("enfa_", &name, &automata.enfa)?;
            ws.write_automaton("nfa_", &name, &automata.nfa)?;
            ws.write_automaton("min_", &name, &automata.min)?;
            let standard = automaton_to_regex(&automata.min);
            ws.write_text("std_regex_", &name, &standard)?;
            report("standardized regex", &standard);
        }
        Cmd::MinimizeRegex { name } => {
            let regex = ws.read_regex(&name)?;
            info!("minimizing regex '{}'", regex);
            let minimized = minimize_regex(&regex);
            ws.write_text("min_regex_", &name, &minimized)?;
            // the automaton of the result, not of the input
            let mut builder = ReBuilder::default();
            let enfa = compile(&parse(&minimized, &mut builder));
            let automaton = minimal_dfa(&eliminate_epsilon(&enfa));
            ws.write_automaton("min_regex_automaton_", &name, &automaton)?;
            report("minimized regex", &minimized);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();
    let ws = Workspace {
        inputs: opts.inputs,
        outputs: opts.outputs,
        dots: opts.dots,
        images: opts.images,
        png: opts.png,
    };
    match run(&ws, opts.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
