use rusqlite::Connection;
use suggestion_core::db::open_db_in_memory;
use suggestion_core::{
    Category, FaultKind, HierarchyService, NewCategory, NewSuggestion, NewTopic,
    SqliteHierarchyRepository, Topic,
};

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> HierarchyService<SqliteHierarchyRepository<'_>> {
    HierarchyService::new(SqliteHierarchyRepository::try_new(conn).unwrap())
}

fn count_where(conn: &Connection, sql: &str, id: i64) -> i64 {
    conn.query_row(sql, [id], |row| row.get(0)).unwrap()
}

/// Builds one topic with two categories of two suggestions each.
fn seed(
    service: &HierarchyService<SqliteHierarchyRepository<'_>>,
    label: &str,
) -> (Topic, Vec<Category>) {
    let topic = service
        .create_topic(NewTopic::new(label, "seeded"))
        .unwrap();
    let mut categories = Vec::new();
    for name in ["Keep", "Change"] {
        let category = service
            .create_category(NewCategory::new(name, topic.id))
            .unwrap();
        for content in ["first", "second"] {
            service
                .create_suggestion(NewSuggestion::new(name, content, category.id))
                .unwrap();
        }
        categories.push(category);
    }
    (topic, categories)
}

#[test]
fn deleting_topic_removes_its_categories_and_suggestions() {
    let conn = setup();
    let service = service(&conn);
    let (doomed, doomed_categories) = seed(&service, "doomed");
    let (kept, _) = seed(&service, "kept");

    assert_eq!(service.delete_topic(doomed.id).unwrap(), 1);

    assert_eq!(
        count_where(&conn, "SELECT COUNT(*) FROM categories WHERE topic_id = ?1;", doomed.id),
        0
    );
    for category in &doomed_categories {
        assert_eq!(
            count_where(
                &conn,
                "SELECT COUNT(*) FROM suggestions WHERE category_id = ?1;",
                category.id
            ),
            0
        );
    }

    let kept_tree = service.get_topic_tree(kept.id).unwrap();
    assert_eq!(kept_tree.categories.len(), 2);
    assert!(kept_tree
        .categories
        .iter()
        .all(|category| category.suggestions.len() == 2));
}

#[test]
fn deleting_category_removes_only_its_suggestions() {
    let conn = setup();
    let service = service(&conn);
    let (topic, categories) = seed(&service, "retro");

    assert_eq!(service.delete_category(categories[0].id).unwrap(), 1);

    assert_eq!(
        count_where(
            &conn,
            "SELECT COUNT(*) FROM suggestions WHERE category_id = ?1;",
            categories[0].id
        ),
        0
    );
    let tree = service.get_topic_tree(topic.id).unwrap();
    assert_eq!(tree.categories.len(), 1);
    assert_eq!(tree.categories[0].category.id, categories[1].id);
    assert_eq!(tree.categories[0].suggestions.len(), 2);
}

#[test]
fn deleting_suggestion_removes_single_row() {
    let conn = setup();
    let service = service(&conn);
    let (topic, categories) = seed(&service, "retro");
    let tree = service.get_topic_tree(topic.id).unwrap();
    let target = tree.categories[0].suggestions[0].id;

    assert_eq!(service.delete_suggestion(target).unwrap(), 1);

    let tree = service.get_topic_tree(topic.id).unwrap();
    assert_eq!(tree.categories[0].category.id, categories[0].id);
    assert_eq!(tree.categories[0].suggestions.len(), 1);
    assert!(tree.categories[0]
        .suggestions
        .iter()
        .all(|suggestion| suggestion.id != target));
}

#[test]
fn deleting_missing_ids_twice_succeeds_and_changes_nothing() {
    let conn = setup();
    let service = service(&conn);
    seed(&service, "retro");

    for _ in 0..2 {
        assert_eq!(service.delete_topic(999).unwrap(), 0);
        assert_eq!(service.delete_category(999).unwrap(), 0);
        assert_eq!(service.delete_suggestion(999).unwrap(), 0);
    }

    assert_eq!(service.get_topics().unwrap().len(), 1);
    assert_eq!(
        count_where(&conn, "SELECT COUNT(*) FROM suggestions WHERE id > ?1;", 0),
        4
    );
}

#[test]
fn delete_rejects_non_positive_ids() {
    let conn = setup();
    let service = service(&conn);

    assert_eq!(
        service.delete_topic(0).unwrap_err().kind(),
        FaultKind::MalformedInput
    );
    assert_eq!(
        service.delete_category(-5).unwrap_err().kind(),
        FaultKind::MalformedInput
    );
}
