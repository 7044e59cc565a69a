//! Textual report rendering
//!
//! Scheduler header, one fixed-width line per process in admission order,
//! then the aggregate `SUM:` line.

use kairos_core::SimulationResult;

pub fn render(result: &SimulationResult) -> String {
    let mut out = String::new();

    out.push_str(&result.scheduler);
    out.push('\n');

    for p in &result.processes {
        out.push_str(&format!(
            "{:04}: {:4} {:4} {:4} {:4} {:1} | {:5} {:5} {:5} {:5}\n",
            p.pid,
            p.arrival_time,
            p.total_cpu_time,
            p.cpu_burst_max,
            p.io_burst_max,
            p.static_prio,
            p.finishing_time,
            p.turnaround_time,
            p.io_waiting_time,
            p.cpu_waiting_time,
        ));
    }

    out.push_str(&format!(
        "SUM: {} {:.2} {:.2} {:.2} {:.2} {:.3}\n",
        result.finish_time,
        result.cpu_utilization,
        result.io_utilization,
        result.avg_turnaround,
        result.avg_cpu_waiting,
        result.throughput,
    ));

    out
}
