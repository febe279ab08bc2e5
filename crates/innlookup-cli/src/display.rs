//! Vertical card display for enrichment records.
//!
//! Groups the summary into sections the way the registry extract reads:
//! who the entity is, how it is registered, then its classifier codes.

use innlookup_core::{EnrichmentRecord, Summary};

// ── Section groupings ──

type Row<'a> = (&'static str, &'a str);

fn identity(s: &Summary) -> [Row<'_>; 3] {
    [
        ("Full name", s.full_name.as_str()),
        ("Short name", s.short_name.as_str()),
        ("OPF code", s.opf_code.as_str()),
    ]
}

fn registration(s: &Summary) -> [Row<'_>; 5] {
    [
        ("INN", s.inn.as_str()),
        ("KPP", s.kpp.as_str()),
        ("OGRN", s.ogrn.as_str()),
        ("Registration date", s.registration_date.as_str()),
        ("Region code", s.region_code.as_str()),
    ]
}

fn classifiers(s: &Summary) -> [Row<'_>; 5] {
    [
        ("OKVED (primary)", s.okved_code.as_str()),
        ("OKPO", s.okpo.as_str()),
        ("OKATO", s.okato.as_str()),
        ("OKFS", s.okfs.as_str()),
        ("OKOGU", s.okogu.as_str()),
    ]
}

// ── Public API ──

/// Render one lookup result as a card headed by the INN that was asked for.
pub fn render_card(input: &str, record: &EnrichmentRecord) -> String {
    let mut out = format!("=== {input} ===\n");
    match record {
        EnrichmentRecord::Found { summary, .. } => {
            render_section(&mut out, "Identity", &identity(summary));
            render_section(&mut out, "Registration", &registration(summary));
            render_section(&mut out, "Classifiers", &classifiers(summary));
        }
        EnrichmentRecord::Failed(err) => {
            out.push_str(&format!("  error ({}): {}\n", err.kind(), err));
        }
    }
    out
}

fn render_section(out: &mut String, header: &str, rows: &[Row<'_>]) {
    out.push_str(header);
    out.push('\n');
    for (label, value) in rows {
        out.push_str(&format!("  {:<20} {}\n", label, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innlookup_core::LookupError;
    use serde_json::json;

    #[test]
    fn found_record_lists_every_field() {
        let mut summary = Summary::default();
        summary.full_name = "Example Org".into();
        summary.okpo = "12345678".into();
        let record = EnrichmentRecord::Found {
            raw: json!({}),
            summary,
        };

        let card = render_card("7707083893", &record);
        assert!(card.starts_with("=== 7707083893 ===\n"));
        assert!(card.contains("  Full name            Example Org\n"));
        assert!(card.contains("  OKPO                 12345678\n"));
        assert!(card.contains("  OKOGU                -\n"));
        assert_eq!(card.lines().count(), 1 + (1 + 3) + (1 + 5) + (1 + 5));
    }

    #[test]
    fn failed_record_shows_error() {
        let record = EnrichmentRecord::from(LookupError::InvalidIdentifier("123".into()));
        let card = render_card("123", &record);
        assert!(card.contains("error (invalid_identifier)"));
    }
}
