use super::{ReportableRepo, common};
use crate::Result;
use crate::trust::{Report, TrustFactor};
use core::fmt::Write;
use serde_json::json;

#[expect(unused_results, reason = "Map::insert never overwrites here")]
pub fn generate<W: Write>(repo: &ReportableRepo, writer: &mut W) -> Result<()> {
    let mut output = serde_json::Map::new();
    output.insert("repository".to_string(), json!(repo.repo.to_string()));
    output.insert("stargazers".to_string(), json!(repo.population));
    output.insert("scanned".to_string(), json!(repo.scanned));
    output.insert("exhaustive".to_string(), json!(repo.exhaustive));

    if let serde_json::Value::Object(report) = report_to_json(&repo.trust.report) {
        output.extend(report);
    }

    if let Some(strata) = &repo.trust.strata {
        let mut first = report_to_json(&strata.first);
        first["stargazers"] = json!(strata.first_users);
        let mut remaining = report_to_json(&strata.remaining);
        remaining["stargazers"] = json!(strata.remaining_users);

        output.insert("strata".to_string(), json!({ "first": first, "remaining": remaining }));
    }

    write!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

#[expect(unused_results, reason = "Map::insert never overwrites here")]
fn report_to_json(report: &Report) -> serde_json::Value {
    let mut factors = serde_json::Map::new();
    for (kind, factor) in &report.factors {
        factors.insert(kind.to_string(), factor_to_json(factor));
    }

    let mut obj = serde_json::Map::new();
    obj.insert("factors".to_string(), json!(factors));

    if let Some(percentiles) = &report.percentiles {
        let mut entries = serde_json::Map::new();
        for (p, factor) in percentiles {
            entries.insert(p.to_string(), factor_to_json(factor));
        }
        obj.insert("percentiles".to_string(), json!(entries));
    }

    obj.insert(
        "overall".to_string(),
        json!({
            "trust": report.overall.trust,
            "grade": common::letter_grade(report.overall.trust).to_string(),
        }),
    );

    json!(obj)
}

fn factor_to_json(factor: &TrustFactor) -> serde_json::Value {
    json!({
        "value": factor.value,
        "trust": factor.trust,
        "grade": common::letter_grade(factor.trust).to_string(),
    })
}
