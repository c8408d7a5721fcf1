use crate::commands::{CheckReport, PlaceholderProposals};
use colored::Colorize;

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render_proposals(&self, results: &[PlaceholderProposals]) -> String {
        let mut out = String::new();
        for result in results {
            let header = format!("?{} ({})", result.var, result.placeholder);
            out.push_str(&self.paint_header(&header));
            out.push('\n');
            if result.proposals.is_empty() {
                out.push_str("  ");
                out.push_str(&self.paint_dim("no proposals"));
                out.push('\n');
            }
            for proposal in &result.proposals {
                out.push_str(&format!("  {proposal}\n"));
            }
        }
        out
    }

    pub fn render_check(&self, reports: &[CheckReport]) -> String {
        let mut out = String::new();
        for report in reports {
            let status = if report.passed {
                self.paint_status("ok", true)
            } else {
                self.paint_status("FAILED", false)
            };
            out.push_str(&format!("{} ... {status}", report.name));
            if let Some(stats) = &report.stats {
                out.push_str(&format!(
                    " ({} rounds, {} literals, {} us)",
                    stats.rounds,
                    stats.inserted_literals,
                    stats.total_micros()
                ));
            }
            out.push('\n');
            if let Some(error) = &report.error {
                out.push_str(&format!("  {error}\n"));
            } else if !report.passed {
                if let Some(program) = &report.program {
                    out.push_str(&format!("  completed to {program}\n"));
                }
            }
        }
        let passed = reports.iter().filter(|report| report.passed).count();
        out.push_str(&format!("\n{passed} of {} fixtures passed\n", reports.len()));
        out
    }

    fn paint_header(&self, text: &str) -> String {
        if self.color { text.bold().to_string() } else { text.to_string() }
    }

    fn paint_dim(&self, text: &str) -> String {
        if self.color { text.dimmed().to_string() } else { text.to_string() }
    }

    fn paint_status(&self, text: &str, ok: bool) -> String {
        match (self.color, ok) {
            (false, _) => text.to_string(),
            (true, true) => text.green().bold().to_string(),
            (true, false) => text.red().bold().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/report_tests.rs"]
mod tests;
