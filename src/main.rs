use clap::{App, Arg};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader};

// Flag state for the optional diagnostic trace, shared with the scheduler
// through the q_trace! macro below.
#[derive(Debug, Default)]
struct Flags {
    q_option: bool,
}

thread_local!(static TFLAGS: RefCell<Flags> = RefCell::new(Flags::default()));

// prints the queue contents after every tick
macro_rules! q_trace {
    ($($arg:tt)*) => {
        crate::TFLAGS.with(|tflags| {
            let tflags = tflags.borrow();
            if tflags.q_option {
                println!("{}", format_args!($($arg)*));
            }
        });
    };
}

mod process;
mod queue;
mod scheduler;
mod utils;

use scheduler::Scheduler;
use utils::read_process_list;

fn main() {
    let matches = App::new("Four-level MLFQ scheduler simulator")
        .version("1.0")
        .arg(
            Arg::with_name("queues")
                .short('q')
                .help("dump queue contents after every tick")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("inputfile")
                .help("process list file (reads stdin when omitted)")
                .index(1),
        )
        .get_matches();

    TFLAGS.with(|tflags| {
        tflags.borrow_mut().q_option = matches.is_present("queues");
    });

    let processes = match matches.value_of("inputfile") {
        Some(path) => {
            let file = File::open(path).expect(&format!("Failed to open file: {}", path));
            read_process_list(BufReader::new(file))
        }
        None => read_process_list(io::stdin()),
    };

    let mut scheduler = Scheduler::new(processes);
    scheduler.run();
    print_summary(&scheduler);
}

fn print_summary(scheduler: &Scheduler) {
    println!();
    for proc in scheduler.terminated() {
        println!(
            "PID {:5}: arrived {:5}, used {:5} CPU ticks",
            proc.pid, proc.arrival_time, proc.cpu_usage
        );
    }
    println!("NULL process: used {:5} CPU ticks", scheduler.null_usage());
}
