//! Scheduling policies for the ready queue
//!
//! Each policy decides how READY processes are enqueued and selected, how
//! long a quantum is, and whether a newly-ready process preempts the running
//! one. The simulation loop talks to all of them through
//! [`SchedulingPolicy`].

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::SimulatorError;
use crate::types::{Pid, Process};

/// Effectively-infinite quantum for the non-preemptive policies.
pub const UNBOUNDED_QUANTUM: u64 = 10_000;

/// Priority-level count when the scheduler argument does not override it.
pub const DEFAULT_MAXPRIO: i32 = 4;

/// Ready-queue discipline
pub trait SchedulingPolicy {
    /// Insert a READY process into the runqueue. May rewrite
    /// `dynamic_prio` (priority aging).
    fn add(&mut self, proc: &mut Process);

    /// Remove and return the next process to run, if any.
    fn next(&mut self) -> Option<Pid>;

    /// Whether `arriving` should preempt `running` mid-slice. Only the
    /// preemptive priority policy ever returns true.
    fn test_preempt(&self, running: &Process, arriving: &Process, now: u64) -> bool {
        let _ = (running, arriving, now);
        false
    }

    /// Maximum CPU slice before the process is sent back to READY.
    fn quantum(&self) -> u64 {
        UNBOUNDED_QUANTUM
    }

    /// Number of priority levels; bounds the static-priority draw.
    fn maxprio(&self) -> i32 {
        DEFAULT_MAXPRIO
    }

    /// True only for the preemptive priority policy; gates the preemption
    /// test in the simulation loop.
    fn preemptive(&self) -> bool {
        false
    }

    /// Report header, e.g. `FCFS` or `RR 5`.
    fn name(&self) -> String;
}

/// First-come first-served: plain FIFO.
#[derive(Debug, Default)]
pub struct FcfsPolicy {
    ready: VecDeque<Pid>,
}

impl FcfsPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for FcfsPolicy {
    fn add(&mut self, proc: &mut Process) {
        self.ready.push_back(proc.pid);
    }

    fn next(&mut self) -> Option<Pid> {
        self.ready.pop_front()
    }

    fn name(&self) -> String {
        "FCFS".into()
    }
}

/// Last-come first-served: stack.
#[derive(Debug, Default)]
pub struct LcfsPolicy {
    ready: Vec<Pid>,
}

impl LcfsPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for LcfsPolicy {
    fn add(&mut self, proc: &mut Process) {
        self.ready.push(proc.pid);
    }

    fn next(&mut self) -> Option<Pid> {
        self.ready.pop()
    }

    fn name(&self) -> String {
        "LCFS".into()
    }
}

/// Shortest remaining time first. Selection order only; the running process
/// is never preempted.
#[derive(Debug, Default)]
pub struct SrtfPolicy {
    /// Sorted by remaining CPU time at insertion, stable on equal keys.
    ready: VecDeque<(Pid, u64)>,
}

impl SrtfPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for SrtfPolicy {
    fn add(&mut self, proc: &mut Process) {
        // Insert after every entry with a key <= ours so equal keys keep
        // arrival order.
        let key = proc.remaining_cpu_time;
        let pos = self
            .ready
            .iter()
            .position(|&(_, rem)| rem > key)
            .unwrap_or(self.ready.len());
        self.ready.insert(pos, (proc.pid, key));
    }

    fn next(&mut self) -> Option<Pid> {
        self.ready.pop_front().map(|(pid, _)| pid)
    }

    fn name(&self) -> String {
        "SRTF".into()
    }
}

/// Round-robin: FIFO with a finite quantum.
#[derive(Debug)]
pub struct RoundRobinPolicy {
    ready: VecDeque<Pid>,
    quantum: u64,
}

impl RoundRobinPolicy {
    pub fn new(quantum: u64) -> Self {
        RoundRobinPolicy {
            ready: VecDeque::new(),
            quantum,
        }
    }
}

impl SchedulingPolicy for RoundRobinPolicy {
    fn add(&mut self, proc: &mut Process) {
        self.ready.push_back(proc.pid);
    }

    fn next(&mut self) -> Option<Pid> {
        self.ready.pop_front()
    }

    fn quantum(&self) -> u64 {
        self.quantum
    }

    fn name(&self) -> String {
        format!("RR {}", self.quantum)
    }
}

/// Priority scheduler with an active/expired queue pair, optionally
/// preemptive (PRIO and PREPRIO differ only in the preemption test).
///
/// Each table holds one FIFO per dynamic-priority level. A process that
/// burns through a full quantum drops one level on re-entry; on falling off
/// the bottom it is reset to `static_prio - 1` and parked on the expired
/// table until the active table runs dry.
#[derive(Debug)]
pub struct PrioPolicy {
    active: Vec<VecDeque<Pid>>,
    expired: Vec<VecDeque<Pid>>,
    quantum: u64,
    maxprio: i32,
    preemptive: bool,
}

impl PrioPolicy {
    pub fn new(quantum: u64, maxprio: i32) -> Self {
        Self::with_preemption(quantum, maxprio, false)
    }

    pub fn preemptive(quantum: u64, maxprio: i32) -> Self {
        Self::with_preemption(quantum, maxprio, true)
    }

    fn with_preemption(quantum: u64, maxprio: i32, preemptive: bool) -> Self {
        let levels = maxprio.max(1) as usize;
        PrioPolicy {
            active: vec![VecDeque::new(); levels],
            expired: vec![VecDeque::new(); levels],
            quantum,
            maxprio,
            preemptive,
        }
    }

    fn take_highest(levels: &mut [VecDeque<Pid>]) -> Option<Pid> {
        levels.iter_mut().rev().find_map(|queue| queue.pop_front())
    }
}

impl SchedulingPolicy for PrioPolicy {
    fn add(&mut self, proc: &mut Process) {
        if proc.remaining_burst_time > 0 {
            // Came back mid-burst from an expired quantum: demote.
            proc.dynamic_prio -= 1;
            if proc.dynamic_prio == -1 {
                proc.dynamic_prio = proc.static_prio - 1;
                self.expired[proc.dynamic_prio as usize].push_back(proc.pid);
                return;
            }
        } else {
            // From CREATED or BLOCKED: priority resets.
            proc.dynamic_prio = proc.static_prio - 1;
        }
        self.active[proc.dynamic_prio as usize].push_back(proc.pid);
    }

    fn next(&mut self) -> Option<Pid> {
        if let Some(pid) = Self::take_highest(&mut self.active) {
            return Some(pid);
        }
        // Active table is dry: the expired table becomes the active one.
        std::mem::swap(&mut self.active, &mut self.expired);
        Self::take_highest(&mut self.active)
    }

    fn test_preempt(&self, running: &Process, arriving: &Process, now: u64) -> bool {
        self.preemptive
            && running.dynamic_prio < arriving.dynamic_prio
            && now < running.stop_running_time
    }

    fn quantum(&self) -> u64 {
        self.quantum
    }

    fn maxprio(&self) -> i32 {
        self.maxprio
    }

    fn preemptive(&self) -> bool {
        self.preemptive
    }

    fn name(&self) -> String {
        if self.preemptive {
            format!("PREPRIO {}", self.quantum)
        } else {
            format!("PRIO {}", self.quantum)
        }
    }
}

/// Parsed scheduler specification (the `-s` argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedSpec {
    Fcfs,
    Lcfs,
    Srtf,
    RoundRobin { quantum: u64 },
    Prio { quantum: u64, maxprio: i32 },
    PrePrio { quantum: u64, maxprio: i32 },
}

impl SchedSpec {
    /// Instantiate the policy this spec describes.
    pub fn build(&self) -> Box<dyn SchedulingPolicy> {
        match *self {
            SchedSpec::Fcfs => Box::new(FcfsPolicy::new()),
            SchedSpec::Lcfs => Box::new(LcfsPolicy::new()),
            SchedSpec::Srtf => Box::new(SrtfPolicy::new()),
            SchedSpec::RoundRobin { quantum } => Box::new(RoundRobinPolicy::new(quantum)),
            SchedSpec::Prio { quantum, maxprio } => Box::new(PrioPolicy::new(quantum, maxprio)),
            SchedSpec::PrePrio { quantum, maxprio } => {
                Box::new(PrioPolicy::preemptive(quantum, maxprio))
            }
        }
    }
}

/// Parse `<quantum>[:<maxprio>]` for the R/P/E forms.
fn parse_quantum_spec(spec: &str, rest: &str) -> Result<(u64, i32), SimulatorError> {
    let (quantum_str, maxprio) = match rest.split_once(':') {
        Some((q, mp)) => {
            let maxprio = mp
                .parse::<i32>()
                .ok()
                .filter(|&mp| mp > 0)
                .ok_or_else(|| SimulatorError::sched_spec(spec, "maxprio must be a positive integer"))?;
            (q, maxprio)
        }
        None => (rest, DEFAULT_MAXPRIO),
    };
    let quantum = quantum_str
        .parse::<u64>()
        .ok()
        .filter(|&q| q > 0)
        .ok_or_else(|| SimulatorError::sched_spec(spec, "quantum must be a positive integer"))?;
    Ok((quantum, maxprio))
}

impl FromStr for SchedSpec {
    type Err = SimulatorError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut chars = spec.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| SimulatorError::sched_spec(spec, "empty specification"))?;
        let rest = chars.as_str();

        match prefix {
            'F' | 'L' | 'S' => {
                if !rest.is_empty() {
                    return Err(SimulatorError::sched_spec(spec, "unexpected trailing characters"));
                }
                Ok(match prefix {
                    'F' => SchedSpec::Fcfs,
                    'L' => SchedSpec::Lcfs,
                    _ => SchedSpec::Srtf,
                })
            }
            'R' => {
                if rest.contains(':') {
                    return Err(SimulatorError::sched_spec(spec, "round-robin takes no maxprio"));
                }
                let (quantum, _) = parse_quantum_spec(spec, rest)?;
                Ok(SchedSpec::RoundRobin { quantum })
            }
            'P' => {
                let (quantum, maxprio) = parse_quantum_spec(spec, rest)?;
                Ok(SchedSpec::Prio { quantum, maxprio })
            }
            'E' => {
                let (quantum, maxprio) = parse_quantum_spec(spec, rest)?;
                Ok(SchedSpec::PrePrio { quantum, maxprio })
            }
            other => Err(SimulatorError::sched_spec(
                spec,
                format!("unknown scheduler '{other}', expected F, L, S, R, P or E"),
            )),
        }
    }
}

impl fmt::Display for SchedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SchedSpec::Fcfs => write!(f, "F"),
            SchedSpec::Lcfs => write!(f, "L"),
            SchedSpec::Srtf => write!(f, "S"),
            SchedSpec::RoundRobin { quantum } => write!(f, "R{quantum}"),
            SchedSpec::Prio { quantum, maxprio } => write!(f, "P{quantum}:{maxprio}"),
            SchedSpec::PrePrio { quantum, maxprio } => write!(f, "E{quantum}:{maxprio}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_with(pid: Pid, remaining: u64, static_prio: i32) -> Process {
        let mut p = Process::new(pid, 0, remaining, 10, 5, static_prio);
        p.remaining_cpu_time = remaining;
        p
    }

    #[test]
    fn fcfs_is_fifo() {
        let mut policy = FcfsPolicy::new();
        let mut a = proc_with(0, 10, 1);
        let mut b = proc_with(1, 10, 1);
        policy.add(&mut a);
        policy.add(&mut b);
        assert_eq!(policy.next(), Some(0));
        assert_eq!(policy.next(), Some(1));
        assert_eq!(policy.next(), None);
    }

    #[test]
    fn lcfs_is_lifo() {
        let mut policy = LcfsPolicy::new();
        let mut a = proc_with(0, 10, 1);
        let mut b = proc_with(1, 10, 1);
        policy.add(&mut a);
        policy.add(&mut b);
        assert_eq!(policy.next(), Some(1));
        assert_eq!(policy.next(), Some(0));
    }

    #[test]
    fn srtf_orders_by_remaining_time() {
        let mut policy = SrtfPolicy::new();
        let mut long = proc_with(0, 30, 1);
        let mut short = proc_with(1, 5, 1);
        let mut mid = proc_with(2, 10, 1);
        policy.add(&mut long);
        policy.add(&mut short);
        policy.add(&mut mid);
        assert_eq!(policy.next(), Some(1));
        assert_eq!(policy.next(), Some(2));
        assert_eq!(policy.next(), Some(0));
    }

    #[test]
    fn srtf_keeps_arrival_order_on_equal_keys() {
        let mut policy = SrtfPolicy::new();
        let mut a = proc_with(0, 10, 1);
        let mut b = proc_with(1, 10, 1);
        let mut c = proc_with(2, 10, 1);
        policy.add(&mut a);
        policy.add(&mut b);
        policy.add(&mut c);
        assert_eq!(policy.next(), Some(0));
        assert_eq!(policy.next(), Some(1));
        assert_eq!(policy.next(), Some(2));
    }

    #[test]
    fn round_robin_reports_its_quantum() {
        let policy = RoundRobinPolicy::new(5);
        assert_eq!(policy.quantum(), 5);
        assert_eq!(policy.name(), "RR 5");
        assert!(!policy.preemptive());
    }

    #[test]
    fn default_quantum_is_effectively_infinite() {
        assert_eq!(FcfsPolicy::new().quantum(), UNBOUNDED_QUANTUM);
        assert_eq!(SrtfPolicy::new().maxprio(), DEFAULT_MAXPRIO);
    }

    #[test]
    fn prio_resets_dynamic_prio_on_fresh_entry() {
        let mut policy = PrioPolicy::new(2, 4);
        let mut p = proc_with(0, 10, 3);
        p.dynamic_prio = 0;
        policy.add(&mut p); // no carry: reset
        assert_eq!(p.dynamic_prio, 2);
        assert_eq!(policy.next(), Some(0));
    }

    #[test]
    fn prio_demotes_on_quantum_expiry() {
        let mut policy = PrioPolicy::new(2, 4);
        let mut p = proc_with(0, 10, 3);
        p.remaining_burst_time = 4; // mid-burst re-entry
        policy.add(&mut p);
        assert_eq!(p.dynamic_prio, 1);
        assert_eq!(policy.next(), Some(0));
    }

    #[test]
    fn prio_routes_to_expired_when_falling_off_the_bottom() {
        let mut policy = PrioPolicy::new(2, 4);
        let mut low = proc_with(0, 10, 1);
        low.dynamic_prio = 0;
        low.remaining_burst_time = 4;
        policy.add(&mut low); // 0 -> -1 -> expired at static_prio-1
        assert_eq!(low.dynamic_prio, 0);

        let mut fresh = proc_with(1, 10, 1);
        policy.add(&mut fresh);
        // The fresh arrival is on the active table and wins; the expired one
        // only surfaces after the swap.
        assert_eq!(policy.next(), Some(1));
        assert_eq!(policy.next(), Some(0));
        assert_eq!(policy.next(), None);
    }

    #[test]
    fn prio_scans_highest_level_first() {
        let mut policy = PrioPolicy::new(2, 4);
        let mut low = proc_with(0, 10, 1);
        let mut high = proc_with(1, 10, 4);
        policy.add(&mut low);
        policy.add(&mut high);
        assert_eq!(policy.next(), Some(1));
        assert_eq!(policy.next(), Some(0));
    }

    #[test]
    fn preprio_preempts_on_higher_priority_and_future_stop() {
        let policy = PrioPolicy::preemptive(2, 4);
        let mut running = proc_with(0, 10, 1);
        running.dynamic_prio = 0;
        running.stop_running_time = 10;
        let mut arriving = proc_with(1, 10, 4);
        arriving.dynamic_prio = 3;

        assert!(policy.test_preempt(&running, &arriving, 5));
        // Runner already at its stop time: nothing left to steal.
        assert!(!policy.test_preempt(&running, &arriving, 10));
        // Equal priority never preempts.
        arriving.dynamic_prio = 0;
        assert!(!policy.test_preempt(&running, &arriving, 5));
    }

    #[test]
    fn plain_prio_never_preempts() {
        let policy = PrioPolicy::new(2, 4);
        let mut running = proc_with(0, 10, 1);
        running.stop_running_time = 10;
        let arriving = proc_with(1, 10, 4);
        assert!(!policy.preemptive());
        assert!(!policy.test_preempt(&running, &arriving, 5));
    }

    #[test]
    fn sched_spec_parses_all_forms() {
        assert_eq!("F".parse::<SchedSpec>().unwrap(), SchedSpec::Fcfs);
        assert_eq!("L".parse::<SchedSpec>().unwrap(), SchedSpec::Lcfs);
        assert_eq!("S".parse::<SchedSpec>().unwrap(), SchedSpec::Srtf);
        assert_eq!(
            "R4".parse::<SchedSpec>().unwrap(),
            SchedSpec::RoundRobin { quantum: 4 }
        );
        assert_eq!(
            "P10".parse::<SchedSpec>().unwrap(),
            SchedSpec::Prio { quantum: 10, maxprio: 4 }
        );
        assert_eq!(
            "E5:6".parse::<SchedSpec>().unwrap(),
            SchedSpec::PrePrio { quantum: 5, maxprio: 6 }
        );
    }

    #[test]
    fn sched_spec_rejects_bad_input() {
        assert!("".parse::<SchedSpec>().is_err());
        assert!("X".parse::<SchedSpec>().is_err());
        assert!("R".parse::<SchedSpec>().is_err());
        assert!("R0".parse::<SchedSpec>().is_err());
        assert!("Rx".parse::<SchedSpec>().is_err());
        assert!("P".parse::<SchedSpec>().is_err());
        assert!("P5:0".parse::<SchedSpec>().is_err());
        assert!("F2".parse::<SchedSpec>().is_err());
        assert!("R2:4".parse::<SchedSpec>().is_err());
    }

    #[test]
    fn built_policies_report_their_headers() {
        assert_eq!(SchedSpec::Fcfs.build().name(), "FCFS");
        assert_eq!(SchedSpec::RoundRobin { quantum: 7 }.build().name(), "RR 7");
        assert_eq!(
            SchedSpec::Prio { quantum: 3, maxprio: 4 }.build().name(),
            "PRIO 3"
        );
        let preprio = SchedSpec::PrePrio { quantum: 3, maxprio: 5 }.build();
        assert_eq!(preprio.name(), "PREPRIO 3");
        assert!(preprio.preemptive());
        assert_eq!(preprio.maxprio(), 5);
    }
}
