//! Text-mode display logic for the domain-watch CLI.
//!
//! Colored result lines, endpoint listings, import progress and update
//! reports. Uses only the `console` crate.

use console::{pad_str, style, Alignment};
use domain_watch_lib::{
    classify_record, DomainRecord, DomainStatus, Endpoints, ImportLog, ImportStatus,
    LookupOutcome, SourceCheck, StepOutcome, UpdateReport,
};
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

// ── Lookups ──────────────────────────────────────────────────────────────────

/// Print one lookup result line, with registration details when resolved.
pub fn print_lookup(domain: &str, outcome: &LookupOutcome, debug: bool) {
    let padded_domain = pad_str(domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    match outcome {
        LookupOutcome::Available(record) => {
            println!(
                "  {}  {}",
                style(&padded_domain).white(),
                style("AVAILABLE").green().bold(),
            );
            if debug {
                print_source(record);
            }
        }
        LookupOutcome::Resolved(record) => {
            let status = classify_record(record);
            println!(
                "  {}  {}  {}",
                style(&padded_domain).white(),
                status_label(status),
                style(format_record(record)).dim(),
            );
            if debug {
                print_source(record);
            }
        }
        LookupOutcome::Failed(e) => {
            println!(
                "  {}  {}  {}",
                style(&padded_domain).white(),
                style("ERROR").yellow(),
                style(e.to_string()).dim(),
            );
        }
    }
}

fn status_label(status: DomainStatus) -> console::StyledObject<&'static str> {
    match status {
        DomainStatus::Available => style("AVAILABLE").green().bold(),
        DomainStatus::Active => style("ACTIVE").red().bold(),
        DomainStatus::ExpiringSoon => style("EXPIRING SOON").magenta().bold(),
        DomainStatus::Expired => style("EXPIRED").cyan().bold(),
        DomainStatus::Error => style("UNKNOWN").yellow(),
    }
}

fn print_source(record: &DomainRecord) {
    println!(
        "    {} answered by {}",
        style("└─").dim(),
        record.whois_server,
    );
}

/// One-line summary of a registration record.
pub fn format_record(record: &DomainRecord) -> String {
    let mut parts = vec![format!("Registrar: {}", record.registrar)];

    if let Some(created) = &record.creation_date {
        parts.push(format!("Created: {}", created));
    }
    if let Some(expires) = &record.expiration_date {
        parts.push(format!("Expires: {}", expires));
    }
    if !record.nameservers.is_empty() {
        parts.push(format!("NS: {}", record.nameservers.join(", ")));
    }

    parts.join(" | ")
}

/// Print the tally after a multi-domain lookup.
pub fn print_lookup_summary(results: &[(String, LookupOutcome)], duration: Duration) {
    let available = results.iter().filter(|(_, o)| o.is_available()).count();
    let failed = results
        .iter()
        .filter(|(_, o)| matches!(o, LookupOutcome::Failed(_)))
        .count();
    let registered = results.len() - available - failed;

    println!(
        "{} {} looked up in {:.1}s: {} available, {} registered, {} failed",
        style("Summary:").bold(),
        results.len(),
        duration.as_secs_f64(),
        style(available).green(),
        style(registered).red(),
        style(failed).yellow(),
    );
}

// ── Discovery ────────────────────────────────────────────────────────────────

pub fn print_endpoints(tld: &str, endpoints: &Endpoints) {
    println!("{}", style(tld).bold());
    println!(
        "  {}  {}",
        pad_str("RDAP", 6, Alignment::Left, None),
        endpoints
            .rdap_url
            .as_deref()
            .map(|u| style(u.to_string()).green())
            .unwrap_or_else(|| style("-".to_string()).dim()),
    );
    println!(
        "  {}  {}",
        pad_str("WHOIS", 6, Alignment::Left, None),
        endpoints
            .whois_server
            .as_deref()
            .map(|w| style(w.to_string()).green())
            .unwrap_or_else(|| style("-".to_string()).dim()),
    );
}

// ── Imports ──────────────────────────────────────────────────────────────────

/// Print the result of one import invocation.
pub fn print_step(outcome: &StepOutcome) {
    let log = outcome.log();
    match outcome {
        StepOutcome::Completed(_) => println!(
            "{} {} import {} completed",
            style("✓").green().bold(),
            log.import_type,
            log.id,
        ),
        StepOutcome::InProgress(_) => println!(
            "{} {} import {} in progress; run again with --session {}",
            style("…").cyan().bold(),
            log.import_type,
            log.id,
            log.id,
        ),
    }
    print_counts(log);
}

/// Print a stored import log.
pub fn print_import_log(log: &ImportLog) {
    let status = match log.status {
        ImportStatus::Running => style(log.status.to_string()).cyan(),
        ImportStatus::Completed => style(log.status.to_string()).green(),
        ImportStatus::Failed => style(log.status.to_string()).red(),
    };

    println!("{} {} ({})", style(format!("Import {}", log.id)).bold(), log.import_type, status);
    println!("  Started:   {}", log.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(completed) = log.completed_at {
        println!("  Finished:  {}", completed.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(version) = &log.version {
        println!("  Version:   {}", version);
    }
    if let Some(publication) = &log.iana_publication_date {
        println!("  Published: {}", publication);
    }
    print_counts(log);
    if let Some(message) = &log.error_message {
        println!("  {} {}", style("Error:").red().bold(), message);
    }
}

fn print_counts(log: &ImportLog) {
    let counts = &log.counts;
    println!(
        "  {} total, {} new, {} updated, {} failed",
        counts.total,
        style(counts.new).green(),
        style(counts.updated).cyan(),
        if counts.failed > 0 {
            style(counts.failed).yellow()
        } else {
            style(counts.failed).dim()
        },
    );
}

// ── Update checks ────────────────────────────────────────────────────────────

pub fn print_update_report(report: &UpdateReport) {
    print_source_check("TLD list", &report.tld_list);
    print_source_check("RDAP bootstrap", &report.rdap);
    println!();
    if report.needs_update {
        println!("{}", style("Updates available; run `domain-watch import all`").yellow().bold());
    } else {
        println!("{}", style("Directory is up to date").green());
    }
}

fn print_source_check(label: &str, check: &SourceCheck) {
    let marker = if check.changed {
        style("changed").yellow().bold()
    } else {
        style("unchanged").dim()
    };
    println!(
        "  {}  {}  (current: {}, imported: {})",
        pad_str(label, 16, Alignment::Left, None),
        marker,
        check.current.as_deref().unwrap_or("unknown"),
        check.last_imported.as_deref().unwrap_or("never"),
    );
}
