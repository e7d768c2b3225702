use super::*;

use clap::ValueEnum;

#[test]
fn catalog_lists_every_template_once() {
    let names: Vec<&str> = templates().iter().map(|template| template.name).collect();
    assert_eq!(names.len(), 8);
    for name in &names {
        assert_eq!(
            names.iter().filter(|candidate| candidate == &name).count(),
            1,
            "duplicate template name {name}"
        );
    }
}

#[test]
fn fixed_templates_build_without_parameters() {
    for template in templates() {
        if !template.requires.is_empty() {
            continue;
        }
        let built = build_prompt(template.name, &PromptParams::default())
            .expect("template without required parameters");
        assert!(!built.text.is_empty());
        assert_eq!(built.aspect_ratio, template.aspect_ratio);
    }
}

#[test]
fn hero_banner_carries_shared_style() {
    let built = build_prompt("hero-banner", &PromptParams::default()).expect("no parameters");
    assert!(built.text.contains(STYLE_BASE));
    assert!(built.text.ends_with(STYLE_SUFFIX));
    assert_eq!(built.aspect_ratio, "16:9");
}

#[test]
fn unknown_template_error_lists_the_catalog() {
    let err = build_prompt("poster", &PromptParams::default()).expect_err("not in catalog");
    let message = err.to_string();
    assert!(message.contains("unknown template 'poster'"));
    assert!(message.contains("hero-banner"));
    assert!(message.contains("card-background"));
}

#[test]
fn feature_banner_requires_a_feature() {
    let err =
        build_prompt("feature-banner", &PromptParams::default()).expect_err("feature required");
    assert!(matches!(
        err,
        ArtError::MissingParameter {
            template: "feature-banner",
            parameter: "feature",
        }
    ));
}

#[test]
fn blank_feature_counts_as_missing() {
    let params = PromptParams {
        feature: Some("   "),
        ..Default::default()
    };
    let err = build_prompt("feature-banner", &params).expect_err("blank feature");
    assert!(matches!(err, ArtError::MissingParameter { parameter: "feature", .. }));
}

#[test]
fn feature_banner_substitutes_the_feature_name() {
    let params = PromptParams {
        feature: Some("AI Interview"),
        ..Default::default()
    };
    let built = build_prompt("feature-banner", &params).expect("feature supplied");
    assert!(built.text.contains("abstract representation of AI Interview"));
    assert!(!built.text.contains(FEATURE_PLACEHOLDER));
    assert_eq!(built.aspect_ratio, "3:1");
}

#[test]
fn substitute_feature_falls_back_to_the_default() {
    assert_eq!(
        substitute_feature("theme of [FEATURE]", None),
        format!("theme of {DEFAULT_FEATURE}")
    );
    assert_eq!(
        substitute_feature("no placeholder here", Some("Ignored")),
        "no placeholder here"
    );
}

#[test]
fn interview_banner_requires_a_mode() {
    let err =
        build_prompt("interview-banner", &PromptParams::default()).expect_err("mode required");
    assert!(matches!(
        err,
        ArtError::MissingParameter {
            template: "interview-banner",
            parameter: "mode",
        }
    ));
}

#[test]
fn interview_banner_varies_by_mode() {
    let template = find_template("interview-banner").expect("catalog entry");
    let prompts = match template.source {
        PromptSource::ByMode(prompts) => prompts,
        PromptSource::Fixed(_) => panic!("interview-banner should vary by mode"),
    };
    assert_ne!(prompts.human_human, prompts.bot_human);
    assert_ne!(prompts.bot_human, prompts.bot_bot);

    for (mode, expected) in [
        (InterviewMode::HumanHuman, prompts.human_human),
        (InterviewMode::BotHuman, prompts.bot_human),
        (InterviewMode::BotBot, prompts.bot_bot),
    ] {
        let params = PromptParams {
            mode: Some(mode),
            ..Default::default()
        };
        let built = build_prompt("interview-banner", &params).expect("mode supplied");
        assert_eq!(built.text, expected);
        assert_eq!(built.aspect_ratio, "16:9");
    }
}

#[test]
fn interview_modes_use_kebab_case_values() {
    let names: Vec<String> = InterviewMode::value_variants()
        .iter()
        .map(|mode| {
            mode.to_possible_value()
                .expect("modes are not skipped")
                .get_name()
                .to_string()
        })
        .collect();
    assert_eq!(names, ["human-human", "bot-human", "bot-bot"]);
}

#[test]
fn art_direction_is_added_to_unstyled_prompts() {
    let styled = apply_art_direction("a quiet reading nook");
    assert_eq!(
        styled,
        format!("a quiet reading nook, {STYLE_BASE}, --style raw")
    );
}

#[test]
fn art_direction_leaves_styled_prompts_alone() {
    let prompt = "minimal shapes --style expressive";
    assert_eq!(apply_art_direction(prompt), prompt);

    let shouting = "minimal shapes --STYLE RAW";
    assert_eq!(apply_art_direction(shouting), shouting);
}

#[test]
fn art_direction_is_idempotent() {
    let once = apply_art_direction("abstract waves");
    let twice = apply_art_direction(&once);
    assert_eq!(once, twice);
}
