use crate::model::{PackageConflict, ScanReport};
use anyhow::Result;
use std::collections::BTreeMap;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Package")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Origin")]
    origin: String,
}

#[derive(Tabled)]
struct ConflictRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Kept")]
    kept: String,
    #[tabled(rename = "Dropped")]
    dropped: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.packages.is_empty() {
        println!("No packages found.");
    } else {
        println!("Found {} packages:", report.packages.len());
        println!();

        let rows: Vec<PackageRow> = report
            .packages
            .iter()
            .map(|p| PackageRow {
                name: truncate(p.name(), 60),
                version: p.version().unwrap_or("-").to_string(),
                origin: truncate(&p.origin_name(), 40),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if !report.conflicts.is_empty() {
        println!();
        println!("Found {} version conflicts:", report.conflicts.len());
        println!();

        let rows: Vec<ConflictRow> = report.conflicts.iter().map(conflict_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    println!();
    print_summary(report);

    Ok(())
}

fn conflict_row(conflict: &PackageConflict) -> ConflictRow {
    let (kept, dropped) = if conflict.replaced {
        (&conflict.incoming, &conflict.current)
    } else {
        (&conflict.current, &conflict.incoming)
    };
    let describe = |p: &crate::model::ExportPackage| {
        format!("{} ({})", p.version().unwrap_or("-"), truncate(&p.origin_name(), 30))
    };
    ConflictRow {
        package: truncate(&conflict.package, 50),
        kept: describe(kept),
        dropped: describe(dropped),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn print_summary(report: &ScanReport) {
    let mut by_origin: BTreeMap<String, usize> = BTreeMap::new();
    for pkg in &report.packages {
        *by_origin.entry(pkg.origin_name()).or_default() += 1;
    }

    let unversioned = report.packages.len() - report.versioned_count();

    println!("Summary:");
    if unversioned > 0 {
        println!(
            "  Total packages: {} ({} without version)",
            report.packages.len(),
            unversioned
        );
    } else {
        println!("  Total packages: {}", report.packages.len());
    }
    if by_origin.len() > 1 {
        println!("  Locations: {}", by_origin.len());
    }
    if !report.conflicts.is_empty() {
        println!("  Conflicts: {}", report.conflicts.len());
    }
}
