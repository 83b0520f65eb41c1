use serde_json::{Value, json};

use super::*;

fn uri() -> Url {
    Url::parse("file:///project/LoginActivityTest.java").unwrap()
}

#[test]
fn parses_every_command() {
    let u = json!(uri());
    assert_eq!(
        SelectorCommand::parse(TOGGLE_SUPPRESSION, &[u.clone(), json!("test_login")]),
        Ok(SelectorCommand::ToggleSuppression {
            uri: uri(),
            name: "test_login".into(),
        })
    );
    assert_eq!(
        SelectorCommand::parse(SET_SUPPRESSED, &[u.clone(), json!("test_login"), json!(false)]),
        Ok(SelectorCommand::SetSuppressed {
            uri: uri(),
            name: "test_login".into(),
            suppressed: false,
        })
    );
    assert_eq!(
        SelectorCommand::parse(SET_ALL_SUPPRESSED, &[u.clone(), json!(true)]),
        Ok(SelectorCommand::SetAllSuppressed {
            uri: uri(),
            suppressed: true,
        })
    );
    assert_eq!(
        SelectorCommand::parse(NAVIGATE, &[u.clone(), json!("test_cart")]),
        Ok(SelectorCommand::Navigate {
            uri: uri(),
            name: "test_cart".into(),
        })
    );
    assert_eq!(
        SelectorCommand::parse(FILTER, &[u.clone(), json!("LOG")]),
        Ok(SelectorCommand::Filter {
            uri: uri(),
            pattern: "LOG".into(),
        })
    );
    assert_eq!(
        SelectorCommand::parse(REFRESH, &[u]),
        Ok(SelectorCommand::Refresh {
            uri: uri(),
        })
    );
}

#[test]
fn filter_pattern_defaults_to_empty() {
    let u = json!(uri());
    for args in [vec![u.clone()], vec![u.clone(), Value::Null]] {
        let command = SelectorCommand::parse(FILTER, &args).unwrap();
        assert_eq!(
            command,
            SelectorCommand::Filter {
                uri: uri(),
                pattern: String::new(),
            }
        );
        assert_eq!(command.uri(), &uri());
    }
}

#[test]
fn rejects_unknown_command() {
    assert_eq!(
        SelectorCommand::parse("testSelector.explode", &[]),
        Err(CommandError::Unknown("testSelector.explode".into()))
    );
}

#[test]
fn reports_missing_argument() {
    assert_eq!(
        SelectorCommand::parse(TOGGLE_SUPPRESSION, &[json!(uri())]),
        Err(CommandError::MissingArgument {
            command: TOGGLE_SUPPRESSION,
            index: 1,
            expected: "test name",
        })
    );
}

#[test]
fn reports_invalid_argument() {
    let error = SelectorCommand::parse(SET_ALL_SUPPRESSED, &[json!(uri()), json!("yes")]).unwrap_err();
    assert!(matches!(
        error,
        CommandError::InvalidArgument {
            command: SET_ALL_SUPPRESSED,
            index: 1,
            expected: "boolean",
            ..
        }
    ));

    let error = SelectorCommand::parse(REFRESH, &[json!("not a uri")]).unwrap_err();
    assert!(matches!(error, CommandError::InvalidArgument { index: 0, .. }));
    assert!(error.to_string().starts_with("`testSelector.refresh` argument 0"));
}
