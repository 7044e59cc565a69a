//! Core types for the simulation engine

use serde::{Deserialize, Serialize};

/// Process identifier: index into the simulator's process arena, assigned in
/// order of first appearance in the input.
pub type Pid = usize;

/// Lifecycle state of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Created,
    Ready,
    Running,
    Blocked,
    Done,
}

/// A simulated process
///
/// The static attributes are fixed at admission; the evolving counters mutate
/// as the process transitions; the output fields are written at terminal
/// transitions and reported at the end of the run.
#[derive(Debug, Clone)]
pub struct Process {
    // Static attributes
    pub pid: Pid,
    pub arrival_time: u64,
    pub total_cpu_time: u64,
    pub cpu_burst_max: u64,
    pub io_burst_max: u64,
    /// Drawn from the oracle at admission; in `[1, maxprio]`
    pub static_prio: i32,

    // Evolving counters
    pub remaining_cpu_time: u64,
    /// Unused tail of a CPU burst cut short by quantum expiry or preemption;
    /// 0 means the next RUNNING entry draws a fresh burst.
    pub remaining_burst_time: u64,
    /// In `[-1, maxprio-1]`; -1 is the transient "just demoted" level.
    pub dynamic_prio: i32,
    /// Timestamp of the last state entry; basis for waiting/busy accounting.
    pub state_entry_time: u64,
    /// Absolute time at which the pending RUNNING-exit event is scheduled.
    pub stop_running_time: u64,

    // Output fields
    pub finishing_time: u64,
    pub turnaround_time: u64,
    pub io_waiting_time: u64,
    pub cpu_waiting_time: u64,
}

impl Process {
    pub fn new(
        pid: Pid,
        arrival_time: u64,
        total_cpu_time: u64,
        cpu_burst_max: u64,
        io_burst_max: u64,
        static_prio: i32,
    ) -> Self {
        Process {
            pid,
            arrival_time,
            total_cpu_time,
            cpu_burst_max,
            io_burst_max,
            static_prio,
            remaining_cpu_time: total_cpu_time,
            remaining_burst_time: 0,
            dynamic_prio: static_prio - 1,
            state_entry_time: arrival_time,
            stop_running_time: 0,
            finishing_time: 0,
            turnaround_time: 0,
            io_waiting_time: 0,
            cpu_waiting_time: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_process_derives_evolving_fields() {
        let p = Process::new(3, 40, 100, 10, 5, 2);
        assert_eq!(p.remaining_cpu_time, 100);
        assert_eq!(p.remaining_burst_time, 0);
        assert_eq!(p.dynamic_prio, 1);
        assert_eq!(p.state_entry_time, 40);
        assert_eq!(p.finishing_time, 0);
    }
}
