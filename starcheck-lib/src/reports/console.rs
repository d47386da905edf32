use super::common::{self, Confidence, NAME_WIDTH, TABLE_WIDTH, VALUE_WIDTH};
use super::ReportableRepo;
use crate::Result;
use crate::trust::{OVERALL_NAME, Report};
use core::fmt::Write;
use owo_colors::OwoColorize;

pub fn generate<W: Write>(repo: &ReportableRepo, verbose: bool, use_colors: bool, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}: {} of {} stargazers scanned", repo.repo, repo.scanned, repo.population)?;
    writeln!(writer)?;

    if verbose && let Some(strata) = &repo.trust.strata {
        write_heading(&format!("First {} stargazers", strata.first_users), use_colors, writer)?;
        write_table(&strata.first, true, use_colors, writer)?;
        writeln!(writer)?;

        write_heading(&format!("{} remaining stargazers", strata.remaining_users), use_colors, writer)?;
        write_table(&strata.remaining, true, use_colors, writer)?;
        writeln!(writer)?;

        write_heading("All stargazers", use_colors, writer)?;
    }

    write_table(&repo.trust.report, verbose, use_colors, writer)
}

fn write_heading<W: Write>(heading: &str, use_colors: bool, writer: &mut W) -> Result<()> {
    if use_colors {
        writeln!(writer, "{}", heading.bold())?;
    } else {
        writeln!(writer, "{heading}")?;
    }

    Ok(())
}

fn write_table<W: Write>(report: &Report, verbose: bool, use_colors: bool, writer: &mut W) -> Result<()> {
    writeln!(writer, "{:<NAME_WIDTH$}{:<VALUE_WIDTH$}Trust", "Averages", "Score")?;
    writeln!(writer, "{:<NAME_WIDTH$}{:<VALUE_WIDTH$}-----", "--------", "-----")?;

    for (kind, factor) in &report.factors {
        write_row(&kind.to_string(), factor.value, factor.trust, use_colors, writer)?;
    }

    if let Some(percentiles) = &report.percentiles {
        for (p, factor) in percentiles {
            write_row(&common::percentile_name(*p), factor.value, factor.trust, use_colors, writer)?;
        }
    } else if verbose {
        writeln!(writer, "Not enough stargazers to compute percentiles")?;
    }

    writeln!(writer, "{}", "-".repeat(TABLE_WIDTH))?;
    writeln!(
        writer,
        "{:<width$}{}",
        format!("{OVERALL_NAME}:"),
        grade(report.overall.trust, use_colors),
        width = NAME_WIDTH + VALUE_WIDTH
    )?;

    Ok(())
}

fn write_row<W: Write>(name: &str, value: f64, trust: f64, use_colors: bool, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "{:<NAME_WIDTH$}{:<VALUE_WIDTH$}{}",
        format!("{name}:"),
        common::format_value(value),
        grade(trust, use_colors)
    )?;

    Ok(())
}

fn grade(trust: f64, use_colors: bool) -> String {
    let letter = common::letter_grade(trust).to_string();
    if !use_colors {
        return letter;
    }

    match common::confidence(trust) {
        Confidence::Low => letter.red().bold().to_string(),
        Confidence::Medium => letter.yellow().bold().to_string(),
        Confidence::High => letter.green().bold().to_string(),
    }
}
