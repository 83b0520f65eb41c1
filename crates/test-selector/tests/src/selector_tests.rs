use super::*;

const TEXT: &str = "public class LoginTest {\n\t@Suppress\n\tpublic void test_login() {}\n\tpublic void test_logout() {}\n\tpublic void test_cart() {}\n}\n";

async fn populated(text: &str) -> TestSelector {
    let selector = TestSelector::default();
    selector.populate(text.into()).await;
    selector
}

#[tokio::test]
async fn operations_fail_before_population() {
    let selector = TestSelector::default();
    let mut buffer = TEXT.to_string();
    assert!(selector.state().is_loading());
    assert_eq!(
        selector.toggle_suppression(&mut buffer, "test_login"),
        Err(SelectorError::UnknownDeclaration("test_login".to_string()))
    );
    assert!(selector.filter("log").is_empty());
    assert_eq!(selector.set_all_suppressed(&mut buffer, true), Ok(Vec::new()));
}

#[tokio::test]
async fn toggle_then_repopulate_observes_new_state() {
    let selector = populated(TEXT).await;
    let mut buffer = TEXT.to_string();

    selector.toggle_suppression(&mut buffer, "test_login").unwrap();
    selector.toggle_suppression(&mut buffer, "test_cart").unwrap();
    // The index is not patched in place.
    assert!(selector.index().lookup("test_login").unwrap().suppressed);

    selector.populate(buffer.as_str().into()).await;
    let index = selector.index();
    assert!(!index.lookup("test_login").unwrap().suppressed);
    assert!(index.lookup("test_cart").unwrap().suppressed);
    assert!(!index.lookup("test_logout").unwrap().suppressed);
}

#[tokio::test]
async fn select_all_and_none() {
    let selector = populated(TEXT).await;
    let mut buffer = TEXT.to_string();

    let edits = selector.set_all_suppressed(&mut buffer, true).unwrap();
    assert_eq!(edits.len(), 2);
    selector.populate(buffer.as_str().into()).await;
    assert_eq!(selector.population().unwrap().result.suppressed_count(), 3);

    selector.set_all_suppressed(&mut buffer, false).unwrap();
    selector.populate(buffer.as_str().into()).await;
    assert_eq!(selector.population().unwrap().result.suppressed_count(), 0);
}

#[tokio::test]
async fn navigate_and_plan() {
    let selector = populated(TEXT).await;
    let location = selector.navigate_to(TEXT, "test_cart").unwrap();
    assert_eq!(location.line, 4);

    let edit = selector.plan_suppression(TEXT, "test_cart", true).unwrap().unwrap();
    assert_eq!(edit.at_offset, location.offset);
    assert_eq!(selector.plan_suppression(TEXT, "test_login", true).unwrap(), None);
}

#[tokio::test]
async fn filter_is_remembered_and_cleared_with_state() {
    let selector = populated(TEXT).await;
    assert_eq!(selector.filter("LOG"), ["test_login", "test_logout"]);
    assert_eq!(selector.filter("log("), ["test_login", "test_logout"]);
    assert_eq!(selector.visible_names(), ["test_login", "test_logout"]);
    assert_eq!(selector.filter(""), ["test_login", "test_logout", "test_cart"]);

    selector.filter("cart");
    selector.clear();
    assert!(matches!(selector.state(), PopulationState::Empty));
    assert!(selector.visible_names().is_empty());
    selector.populate(TEXT.into()).await;
    assert_eq!(selector.visible_names().len(), 3);
}

#[tokio::test]
async fn junit_framework() {
    let selector = TestSelector::with_framework(TestFramework::Junit);
    let text = "public class A extends TestCase {\n  @Ignore\n  public void testSlow() {}\n  public void testFast() {}\n}\n";
    selector.populate(text.into()).await;
    let population = selector.population().unwrap();
    assert_eq!(population.result.names().collect::<Vec<_>>(), ["testSlow", "testFast"]);
    assert_eq!(population.result.suppressed_count(), 1);
    assert_eq!(selector.patterns().marker_text(), "\t@Ignore");
}
