// Copyright [2022] [Mark Benvenuto]
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use human_panic::setup_panic;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod filter;
mod parser;
mod snapshot;
mod types;
mod walker;

use snapshot::{Collector, Snapshot, PROC_ROOT};

// Dump the environment and command line of every running process as json
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mount point of the process information filesystem
    #[arg(short, long, default_value = PROC_ROOT)]
    root: PathBuf,

    /// Maximum directory depth to walk below the root
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Pretty print the json output
    #[arg(short, long)]
    pretty: bool,

    /// Verbose
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(args: &Args) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(if args.verbose { "debug" } else { "info" })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(())
}

fn to_json(snapshot: &Snapshot, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(snapshot)
    } else {
        serde_json::to_string(snapshot)
    }
}

/// Run one collection, reporting an unreachable root as an empty snapshot.
fn collect_or_empty(collector: &Collector) -> Snapshot {
    match collector.collect() {
        Ok(snapshot) => {
            if snapshot.is_empty() {
                warn!("no process records collected");
            }
            snapshot
        }
        Err(err) => {
            error!("walking {} failed: {}", collector.root().display(), err);
            Snapshot::default()
        }
    }
}

fn main() -> Result<()> {
    setup_panic!();

    let args = Args::parse();
    setup_logging(&args)?;

    let collector = Collector::new(&args.root).with_max_depth(args.max_depth);
    let snapshot = collect_or_empty(&collector);

    for rec in snapshot.records() {
        debug!(
            "pid {}: {} env, {} args",
            rec.pid,
            rec.environment.as_ref().map_or(0, Vec::len),
            rec.command_line.as_ref().map_or(0, Vec::len)
        );
    }

    match to_json(&snapshot, args.pretty) {
        Ok(json) => println!("{}", json),
        Err(err) => error!("serializing snapshot failed: {}", err),
    }

    Ok(())
}
