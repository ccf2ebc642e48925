use caseflow_core::types::TemplateKind;

#[test]
fn test_all_sets_are_named_uniquely() {
    let sets = caseflow_domains::all_prompt_sets();
    let mut names: Vec<&str> = sets.iter().map(|p| p.name.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), sets.len());
}

#[test]
fn test_aliases_resolve() {
    assert_eq!(caseflow_domains::get_prompt_set("legal").unwrap().name, "collection");
    assert_eq!(caseflow_domains::get_prompt_set("es").unwrap().name, "collection_es");
    assert!(caseflow_domains::get_prompt_set("nonexistent").is_none());
}

#[test]
fn test_analysis_prompts_embed_case_text() {
    for set in caseflow_domains::all_prompt_sets() {
        let rendered = set.analysis.render(&[("case_text", "RESOLUTION 12 OF 2020")]);
        assert!(rendered.contains("RESOLUTION 12 OF 2020"), "{}", set.name);
        assert!(!rendered.contains("{case_text}"), "{}", set.name);
        for key in ["debtor_name", "status_flag", "remarks", "enforceability_date"] {
            assert!(set.analysis.user.contains(key), "{} missing {key}", set.name);
        }
    }
}

#[test]
fn test_drafting_prompts_describe_markup() {
    for set in caseflow_domains::all_prompt_sets() {
        for kind in [TemplateKind::PaymentOrder, TemplateKind::LegalDiagnostic] {
            let system = &set.drafting(kind).system;
            assert!(system.contains("`# `"), "{} {kind:?}", set.name);
            assert!(system.contains("**"), "{} {kind:?}", set.name);
        }
    }
}

#[test]
fn test_payment_order_uses_record_fields() {
    let set = caseflow_domains::get_prompt_set("collection").unwrap();
    let rendered = set.payment_order.render(&[
        ("debtor_name", "ACME S.A.S."),
        ("total_amount", "$ 4.500.000"),
    ]);
    assert!(rendered.contains("Debtor: ACME S.A.S."));
    assert!(rendered.contains("Amount: $ 4.500.000"));
}

#[test]
fn test_diagnostic_embeds_analysis_json() {
    let set = caseflow_domains::get_prompt_set("collection").unwrap();
    let rendered = set
        .legal_diagnostic
        .render(&[("analysis_json", r#"{"status_flag": "RED"}"#)]);
    assert!(rendered.contains(r#"{"status_flag": "RED"}"#));
}
