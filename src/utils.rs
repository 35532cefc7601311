use std::io::Read;

use crate::process::{Phase, Process};

/// Reads the process list as one whitespace-separated token stream: records
/// are `(arrivalTime, pid, burst, io, repeat)` 5-tuples and may span lines.
/// Consecutive records sharing a pid become successive behavior phases of a
/// single process. The first token that fails to parse, or a trailing record
/// with fewer than five fields, ends ingestion.
pub fn read_process_list(mut input: impl Read) -> Vec<Process> {
    let mut contents = String::new();
    if input.read_to_string(&mut contents).is_err() {
        return Vec::new();
    }

    let mut fields = contents.split_whitespace().map(str::parse::<usize>);
    let mut processes: Vec<Process> = Vec::new();
    loop {
        let mut record = [0usize; 5];
        for slot in record.iter_mut() {
            match fields.next() {
                Some(Ok(value)) => *slot = value,
                _ => return processes,
            }
        }
        let [arrival_time, pid, burst, io, repeat] = record;
        let phase = Phase { burst, io, repeat };
        match processes.last_mut() {
            Some(prev) if prev.pid == pid => prev.next_phases.push_back(phase),
            _ => processes.push(Process::new(arrival_time, pid, phase)),
        }
    }
}
