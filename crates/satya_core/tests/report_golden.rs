use pretty_assertions::assert_eq;
use satya_core::domain::{FirstSeen, Forensics, RiskLevel, SpreadPattern};
use satya_core::report::{
    parse_model_reply, synthesis_fallback, system_fallback, system_fallback_text, RiskReport,
};

fn golden() -> &'static str {
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/reports/high_risk.txt"
    ))
}

fn bleach_report() -> RiskReport {
    RiskReport {
        risk: RiskLevel::High,
        gist: "Drinking bleach does not cure COVID-19 and can be fatal.".to_string(),
        reasons: vec![
            "Bleach is a corrosive poison".to_string(),
            "No health agency endorses this treatment".to_string(),
            "The claim has been debunked by multiple fact-checkers".to_string(),
        ],
        forensics: Forensics::new(
            FirstSeen::Date("Mar 12, 2020".to_string()),
            SpreadPattern::Wide,
        ),
        action: "Don't forward this".to_string(),
    }
}

#[test]
fn render_matches_golden_report() {
    assert_eq!(bleach_report().render(), golden());
}

#[test]
fn golden_report_parses_back_to_the_same_sections() {
    let sections = parse_model_reply(golden()).expect("parse");
    let report = sections.into_report(bleach_report().forensics);
    assert_eq!(report, bleach_report());
}

#[test]
fn fallback_reports_are_distinguishable() {
    let trace = Forensics::failed(SpreadPattern::SearchUnavailable);
    let synthesis = synthesis_fallback(&trace).render();
    let system = system_fallback_text();

    assert_ne!(synthesis, system);
    for text in [&synthesis, &system] {
        assert!(text.starts_with("🟡 MEDIUM RISK\n\n**The Gist:** "));
        assert!(text.contains("**Why?**\n• "));
        assert!(text.contains("**🔍 Trace Report:**\n📅 First Seen: Unknown\n"));
    }
    assert!(synthesis.contains("📊 How it's Spreading: Search unavailable"));
    assert!(system.contains("📊 How it's Spreading: Unable to trace spread pattern"));
    assert!(system.ends_with("**Action:** Check with trusted sources before sharing"));
    assert_eq!(system_fallback().reasons.len(), 2);
}

#[test]
fn spread_classification_thresholds() {
    assert_eq!(SpreadPattern::classify(0), SpreadPattern::Limited);
    assert_eq!(SpreadPattern::classify(1), SpreadPattern::Limited);
    assert_eq!(SpreadPattern::classify(2), SpreadPattern::Few);
    assert_eq!(SpreadPattern::classify(3), SpreadPattern::Few);
    assert_eq!(SpreadPattern::classify(4), SpreadPattern::Wide);
    assert!(!SpreadPattern::Wide.is_failure());
    assert!(SpreadPattern::NoCredential.is_failure());
}
