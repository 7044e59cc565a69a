//! Discrete-event simulation loop
//!
//! Drains the event queue in `(time, insertion)` order, applies state
//! transitions to the process arena, consults the scheduling policy, and
//! accumulates the utilization totals reported at the end of the run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::des::{Event, EventQueue};
use crate::policies::SchedulingPolicy;
use crate::random::RandomOracle;
use crate::types::{Pid, Process, State};
use crate::workload::ProcessSpec;

/// Per-process completion statistics, in admission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub pid: Pid,
    pub arrival_time: u64,
    pub total_cpu_time: u64,
    pub cpu_burst_max: u64,
    pub io_burst_max: u64,
    pub static_prio: i32,
    pub finishing_time: u64,
    pub turnaround_time: u64,
    pub io_waiting_time: u64,
    pub cpu_waiting_time: u64,
}

impl From<&Process> for ProcessStats {
    fn from(p: &Process) -> Self {
        ProcessStats {
            pid: p.pid,
            arrival_time: p.arrival_time,
            total_cpu_time: p.total_cpu_time,
            cpu_burst_max: p.cpu_burst_max,
            io_burst_max: p.io_burst_max,
            static_prio: p.static_prio,
            finishing_time: p.finishing_time,
            turnaround_time: p.turnaround_time,
            io_waiting_time: p.io_waiting_time,
            cpu_waiting_time: p.cpu_waiting_time,
        }
    }
}

/// Result of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scheduler: String,
    pub processes: Vec<ProcessStats>,
    /// Timestamp of the last event; the simulation end.
    pub finish_time: u64,
    pub cpu_utilization: f64,
    pub io_utilization: f64,
    pub avg_turnaround: f64,
    pub avg_cpu_waiting: f64,
    /// Completed processes per 100 time units.
    pub throughput: f64,
}

/// Discrete-event simulator
pub struct Simulator {
    current_time: u64,
    event_queue: EventQueue,
    /// Owns every process; events and runqueues refer back by pid.
    processes: Vec<Process>,
    policy: Box<dyn SchedulingPolicy>,
    oracle: RandomOracle,
    running: Option<Pid>,

    // Metrics
    cpu_busy_time: u64,
    io_busy_time: u64,
    /// Processes currently in BLOCKED; io_busy_time grows over the union of
    /// their intervals, not the sum.
    io_active: usize,
    io_busy_since: u64,
}

impl Simulator {
    pub fn new(policy: Box<dyn SchedulingPolicy>, oracle: RandomOracle) -> Self {
        Simulator {
            current_time: 0,
            event_queue: EventQueue::new(),
            processes: Vec::new(),
            policy,
            oracle,
            running: None,
            cpu_busy_time: 0,
            io_busy_time: 0,
            io_active: 0,
            io_busy_since: 0,
        }
    }

    /// Admit a process. The static priority is drawn here, before any burst
    /// randomness, so the k-th admitted process consumes the k-th oracle
    /// value.
    pub fn admit(&mut self, spec: ProcessSpec) {
        let pid = self.processes.len();
        let static_prio = self.oracle.next(self.policy.maxprio() as u64) as i32;
        let process = Process::new(
            pid,
            spec.arrival_time,
            spec.total_cpu_time,
            spec.cpu_burst_max,
            spec.io_burst_max,
            static_prio,
        );
        self.event_queue.push(Event::new(
            spec.arrival_time,
            pid,
            State::Created,
            State::Ready,
        ));
        self.processes.push(process);
    }

    /// Run until the event queue drains, then collect the report data.
    pub fn run(&mut self) -> SimulationResult {
        let mut reschedule = false;

        while let Some(event) = self.event_queue.pop() {
            self.current_time = event.time;
            debug!(
                "t={}: pid {} {:?} -> {:?}",
                event.time, event.pid, event.from, event.to
            );

            self.settle_departure(&event);

            match event.to {
                State::Ready => {
                    self.handle_ready(event.pid);
                    reschedule = true;
                }
                State::Running => self.handle_running(event.pid),
                State::Blocked => {
                    self.handle_blocked(event.pid);
                    reschedule = true;
                }
                State::Done => {
                    self.handle_done(event.pid);
                    reschedule = true;
                }
                State::Created => unreachable!("no event transitions into Created"),
            }

            self.processes[event.pid].state_entry_time = self.current_time;

            if reschedule {
                // Same-timestamp events are observable to the policy before
                // it picks the next runner.
                if self.event_queue.next_time() == Some(self.current_time) {
                    continue;
                }
                reschedule = false;
                if self.running.is_none() {
                    if let Some(pid) = self.policy.next() {
                        self.running = Some(pid);
                        self.event_queue.push(Event::new(
                            self.current_time,
                            pid,
                            State::Ready,
                            State::Running,
                        ));
                    }
                }
            }
        }

        self.collect_results()
    }

    /// Utilization accounting keyed on the state being left.
    fn settle_departure(&mut self, event: &Event) {
        match event.from {
            State::Running => {
                let entered = self.processes[event.pid].state_entry_time;
                self.cpu_busy_time += self.current_time - entered;
            }
            State::Blocked => {
                self.io_active -= 1;
                if self.io_active == 0 {
                    self.io_busy_time += self.current_time - self.io_busy_since;
                }
            }
            _ => {}
        }
    }

    fn handle_ready(&mut self, pid: Pid) {
        self.policy.add(&mut self.processes[pid]);

        if self.processes[pid].remaining_burst_time > 0 {
            // Tail of an expired quantum: the process left the CPU.
            self.running = None;
        } else if self.policy.preemptive() {
            // Fresh arrival from CREATED or BLOCKED may steal the CPU.
            if let Some(victim) = self.running {
                let wins = self.policy.test_preempt(
                    &self.processes[victim],
                    &self.processes[pid],
                    self.current_time,
                );
                if wins {
                    debug!("t={}: pid {} preempts pid {}", self.current_time, pid, victim);
                    // The victim's pending RUNNING-exit event is stale now;
                    // the preemption event below supersedes it.
                    self.event_queue.remove_for(victim);
                    self.event_queue.push(Event::new(
                        self.current_time,
                        victim,
                        State::Running,
                        State::Ready,
                    ));
                    let unused = self.processes[victim].stop_running_time - self.current_time;
                    let victim_proc = &mut self.processes[victim];
                    victim_proc.remaining_burst_time += unused;
                    victim_proc.remaining_cpu_time += unused;
                    victim_proc.stop_running_time = self.current_time;
                }
            }
        }
    }

    fn handle_running(&mut self, pid: Pid) {
        let quantum = self.policy.quantum();
        let now = self.current_time;

        let proc = &mut self.processes[pid];
        proc.cpu_waiting_time += now - proc.state_entry_time;

        // Slice selection: resume a carried burst or draw a fresh one, then
        // cap at the quantum.
        let mut slice;
        let preempt_after;
        if proc.remaining_burst_time > 0 {
            if proc.remaining_burst_time > quantum {
                slice = quantum;
                proc.remaining_burst_time -= quantum;
                preempt_after = true;
            } else {
                slice = proc.remaining_burst_time;
                proc.remaining_burst_time = 0;
                preempt_after = false;
            }
        } else {
            let burst = self.oracle.next(proc.cpu_burst_max);
            if burst > quantum {
                slice = quantum;
                proc.remaining_burst_time = burst - quantum;
                preempt_after = true;
            } else {
                slice = burst;
                preempt_after = false;
            }
        }

        let target = if proc.remaining_cpu_time <= slice {
            slice = proc.remaining_cpu_time;
            proc.remaining_burst_time = 0;
            proc.remaining_cpu_time = 0;
            State::Done
        } else if preempt_after {
            proc.remaining_cpu_time -= slice;
            State::Ready
        } else {
            proc.remaining_cpu_time -= slice;
            State::Blocked
        };
        proc.stop_running_time = now + slice;

        self.event_queue
            .push(Event::new(now + slice, pid, State::Running, target));
    }

    fn handle_blocked(&mut self, pid: Pid) {
        self.running = None;

        self.io_active += 1;
        if self.io_active == 1 {
            self.io_busy_since = self.current_time;
        }

        let proc = &mut self.processes[pid];
        let duration = self.oracle.next(proc.io_burst_max);
        proc.io_waiting_time += duration;

        self.event_queue.push(Event::new(
            self.current_time + duration,
            pid,
            State::Blocked,
            State::Ready,
        ));
    }

    fn handle_done(&mut self, pid: Pid) {
        self.running = None;
        let proc = &mut self.processes[pid];
        proc.finishing_time = self.current_time;
        proc.turnaround_time = self.current_time - proc.arrival_time;
    }

    fn collect_results(&self) -> SimulationResult {
        let count = self.processes.len();
        let finish_time = self.current_time;

        let (cpu_utilization, io_utilization, avg_turnaround, avg_cpu_waiting, throughput) =
            if count == 0 || finish_time == 0 {
                (0.0, 0.0, 0.0, 0.0, 0.0)
            } else {
                let finish = finish_time as f64;
                let n = count as f64;
                let turnaround: u64 = self.processes.iter().map(|p| p.turnaround_time).sum();
                let cpu_waiting: u64 = self.processes.iter().map(|p| p.cpu_waiting_time).sum();
                (
                    100.0 * self.cpu_busy_time as f64 / finish,
                    100.0 * self.io_busy_time as f64 / finish,
                    turnaround as f64 / n,
                    cpu_waiting as f64 / n,
                    100.0 * n / finish,
                )
            };

        SimulationResult {
            scheduler: self.policy.name(),
            processes: self.processes.iter().map(ProcessStats::from).collect(),
            finish_time,
            cpu_utilization,
            io_utilization,
            avg_turnaround,
            avg_cpu_waiting,
            throughput,
        }
    }
}
