//! Standalone replay tool
//!
//! Feeds a text log (logcat -v epoch format) through the signal engine once and
//! prints every record that changed the published snapshot, followed by a summary.
//!
//! Usage:
//!   replay_log <log_file.txt> [--limit <count>]
//!
//! Example:
//!   replay_log drive.log --limit 5000

use livemap_decoder::{
    FileSource, KnownTag, LiveMapData, LogHandle, LogSource, MemoryParams, ReadOutcome,
    SignalEngine,
};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <log_file.txt> [--limit <count>]", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut limit: Option<usize> = None;
    let mut i = 2;
    while i < args.len() {
        if args[i] == "--limit" && i + 1 < args.len() {
            limit = args[i + 1].parse().ok();
            i += 2;
        } else {
            eprintln!("Unknown argument: {}", args[i]);
            std::process::exit(1);
        }
    }

    let mut source = FileSource::new(&path);
    let mut handle = match source.open(None) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = SignalEngine::default();
    let mut params = MemoryParams::new();
    let mut previous = LiveMapData::default();
    let mut total = 0usize;
    let mut changes = 0usize;
    let mut roles: HashMap<KnownTag, usize> = HashMap::new();

    while let ReadOutcome::Record(record) = handle.next_record() {
        if limit.is_some_and(|limit| total >= limit) {
            break;
        }
        total += 1;

        let role = KnownTag::classify(&record.tag, &engine.config().tags);
        *roles.entry(role).or_insert(0) += 1;

        let data = engine.process(&record, &mut params);
        if data != previous {
            changes += 1;
            println!(
                "{} {:<20} limit={:>4} dist={:>5} sign={:>4} turn={:>3}@{:<5}",
                record.timestamp.format("%H:%M:%S%.3f"),
                record.tag,
                data.speed_limit,
                data.speed_limit_distance,
                data.safety_sign,
                data.turn_info,
                data.distance_to_turn
            );
            previous = data;
        }
    }

    println!("\n=== REPLAY SUMMARY ===");
    println!("Records processed: {}", total);
    println!("Snapshot changes: {}", changes);
    let mut sorted: Vec<_> = roles.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    for (role, count) in sorted {
        println!("  {:?}: {}", role, count);
    }
}
